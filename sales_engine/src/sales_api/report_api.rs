use std::fmt::Debug;

use chrono::NaiveDate;
use log::*;
use sales_common::DateRange;

use crate::{
    db_types::OrderRecord,
    helpers::LocalClock,
    report::{aggregate, ReportSnapshot},
    sales_api::errors::ReportError,
    traits::OrderStore,
};

/// Computes reports from the order store.
pub struct ReportApi<B> {
    db: B,
    clock: LocalClock,
}

impl<B> Debug for ReportApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ReportApi ({:?})", self.clock)
    }
}

impl<B: Clone> Clone for ReportApi<B> {
    fn clone(&self) -> Self {
        Self { db: self.db.clone(), clock: self.clock }
    }
}

impl<B> ReportApi<B> {
    pub fn new(db: B, clock: LocalClock) -> Self {
        Self { db, clock }
    }

    pub fn clock(&self) -> &LocalClock {
        &self.clock
    }
}

impl<B> ReportApi<B>
where B: OrderStore
{
    /// The report for `user_id` over `range`. Fails with [`ReportError::EmptyRange`] when the user has no orders in
    /// the range.
    pub async fn compute(&self, user_id: i64, range: &DateRange) -> Result<ReportSnapshot, ReportError> {
        let rows = self.db.fetch_orders(user_id, range).await?;
        if rows.is_empty() {
            debug!("📊️ No orders for user #{user_id} in {range}");
            return Err(ReportError::EmptyRange { user_id, range: *range });
        }
        let snapshot = aggregate(range, &rows);
        info!(
            "📊️ Report for user #{user_id} over {range}: {} orders, revenue {:.2}, net profit {:.2}",
            snapshot.kpis.order_count, snapshot.kpis.revenue, snapshot.kpis.net_profit
        );
        Ok(snapshot)
    }

    /// Today's report, where "today" is the current local calendar day.
    pub async fn compute_daily(&self, user_id: i64) -> Result<ReportSnapshot, ReportError> {
        self.compute_daily_for(user_id, self.clock.today()).await
    }

    pub async fn compute_daily_for(&self, user_id: i64, day: NaiveDate) -> Result<ReportSnapshot, ReportError> {
        self.compute(user_id, &DateRange::single(day)).await
    }

    /// The user's orders in `range`, most recent first.
    pub async fn list_orders(&self, user_id: i64, range: &DateRange) -> Result<Vec<OrderRecord>, ReportError> {
        let mut rows = self.db.fetch_orders(user_id, range).await?;
        rows.reverse();
        Ok(rows)
    }
}

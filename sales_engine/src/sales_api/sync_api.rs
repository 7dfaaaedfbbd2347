use std::{fmt::Debug, sync::Arc};

use log::*;
use sales_common::{DateRange, Secret};
use tokio::sync::mpsc;

use crate::{
    db_types::ARP_COMMERCE,
    helpers::LocalClock,
    live::{BroadcastOutcome, Broadcaster, PushMessage, RefreshQueue},
    normalizer::normalize_value,
    sales_api::{
        errors::{ReportError, SyncError},
        report_api::ReportApi,
        sync_objects::{CycleSummary, SyncSummary},
    },
    traits::{SalesDatabase, SalesFeed},
};

/// `SyncApi` runs the sync pipeline for one user or for every integrated user: fetch the day's sales from the feed,
/// normalize them, upsert them into the order store, recompute the daily report and push it if it changed.
pub struct SyncApi<B, F> {
    db: B,
    feed: F,
    reports: ReportApi<B>,
    broadcaster: Arc<Broadcaster>,
    refresh: Option<RefreshQueue>,
    house_user_id: Option<i64>,
}

impl<B, F> Debug for SyncApi<B, F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SyncApi (house user: {:?})", self.house_user_id)
    }
}

impl<B: Clone, F> SyncApi<B, F> {
    pub fn new(db: B, feed: F, broadcaster: Arc<Broadcaster>, clock: LocalClock) -> Self {
        let reports = ReportApi::new(db.clone(), clock);
        Self { db, feed, reports, broadcaster, refresh: None, house_user_id: None }
    }

    /// The user whose daily report the scheduler also publishes as the house report. `None` disables it.
    pub fn with_house_user(mut self, user_id: Option<i64>) -> Self {
        self.house_user_id = user_id;
        self
    }

    /// Manual syncs queue a background report refresh here.
    pub fn with_refresh_queue(mut self, queue: RefreshQueue) -> Self {
        self.refresh = Some(queue);
        self
    }
}

impl<B, F> SyncApi<B, F> {
    pub fn reports(&self) -> &ReportApi<B> {
        &self.reports
    }

    pub fn broadcaster(&self) -> &Arc<Broadcaster> {
        &self.broadcaster
    }

    pub fn house_user_id(&self) -> Option<i64> {
        self.house_user_id
    }
}

impl<B, F> SyncApi<B, F>
where
    B: SalesDatabase,
    F: SalesFeed,
{
    /// Fetches, normalizes and stores the user's sales for `range`, using the user's stored credential.
    pub async fn sync_user(&self, user_id: i64, range: &DateRange) -> Result<SyncSummary, SyncError> {
        let credential =
            self.db.get_credential(user_id, ARP_COMMERCE).await?.ok_or(SyncError::MissingCredential(user_id))?;
        self.sync_with_credential(user_id, range, &credential).await
    }

    async fn sync_with_credential(
        &self,
        user_id: i64,
        range: &DateRange,
        credential: &Secret<String>,
    ) -> Result<SyncSummary, SyncError> {
        debug!("🔄️ Syncing sales of user #{user_id} for {range}");
        let raw = self.feed.fetch_sales(user_id, range, credential).await?;
        let normalized = normalize_value(raw)?;
        let upsert = self.db.upsert_orders(user_id, &normalized.records).await?;
        let summary = SyncSummary {
            user_id,
            range: *range,
            received: normalized.records.len(),
            rejected: normalized.rejected.len(),
            inserted: upsert.written,
            skipped: upsert.skipped,
        };
        info!(
            "🔄️ Synced user #{user_id} for {range}: {} stored, {} rejected, {} skipped",
            summary.inserted, summary.rejected, summary.skipped
        );
        Ok(summary)
    }

    /// A sync requested by the user.
    ///
    /// `date` is `DD/MM/YYYY` or `DD/MM/YYYY/DD/MM/YYYY`. Explicit dates are moved forward by one day to line up with
    /// the feed's day boundary. Without a date, the adjusted day is synced. On success a background refresh of the
    /// user's daily report is queued.
    pub async fn sync_now(&self, user_id: i64, date: Option<&str>) -> Result<SyncSummary, SyncError> {
        let range = match date.map(str::trim).filter(|d| !d.is_empty()) {
            Some(d) => DateRange::parse_br(d)?.shift_forward(1),
            None => DateRange::single(self.reports.clock().adjusted_day()),
        };
        let summary = self.sync_user(user_id, &range).await?;
        if let Some(queue) = &self.refresh {
            queue.request(user_id);
        }
        Ok(summary)
    }

    /// Recomputes the user's daily report and pushes it if it changed. Returns `None` if there was nothing to report.
    pub async fn publish_daily(&self, user_id: i64) -> Option<BroadcastOutcome> {
        match self.reports.compute_daily(user_id).await {
            Ok(snapshot) => Some(self.broadcaster.maybe_broadcast(user_id, snapshot)),
            Err(ReportError::EmptyRange { .. }) => {
                debug!("🔄️ No sales today for user #{user_id}. Nothing to push.");
                None
            },
            Err(e) => {
                error!("🔄️ Could not compute the daily report for user #{user_id}. {e}");
                None
            },
        }
    }

    /// One polling cycle for a live user. Feed failures are logged and the report is recomputed from what is already
    /// stored.
    pub async fn refresh_user(&self, user_id: i64) -> Option<BroadcastOutcome> {
        let range = DateRange::single(self.reports.clock().adjusted_day());
        match self.sync_user(user_id, &range).await {
            Ok(_) => {},
            Err(SyncError::MissingCredential(_)) => debug!("🔄️ User #{user_id} has no integration. Using stored data."),
            Err(e) => warn!("🔄️ Sync for user #{user_id} failed. Using stored data. {e}"),
        }
        self.publish_daily(user_id).await
    }

    /// The `daily_report_initial` message for a new connection, computed fresh. The change-gate cache is left alone.
    pub async fn initial_message(&self, user_id: i64) -> Option<PushMessage> {
        match self.reports.compute_daily(user_id).await {
            Ok(snapshot) => Some(PushMessage::initial(snapshot)),
            Err(ReportError::EmptyRange { .. }) => None,
            Err(e) => {
                error!("🔄️ Could not compute the initial report for user #{user_id}. {e}");
                None
            },
        }
    }

    /// One scheduler cycle: sync every user with an ARP Commerce integration, one after the other, pushing each user's
    /// daily report if it changed. Then publish the house report.
    pub async fn run_scheduled_cycle(&self) -> CycleSummary {
        let mut summary = CycleSummary::default();
        let integrations = match self.db.list_users_with_integration(ARP_COMMERCE).await {
            Ok(integrations) => integrations,
            Err(e) => {
                error!("🔄️ Could not list integrations. Skipping this cycle. {e}");
                return summary;
            },
        };
        if integrations.is_empty() {
            debug!("🔄️ No active integrations. Nothing to sync.");
            return summary;
        }
        summary.users = integrations.len();
        let range = DateRange::single(self.reports.clock().adjusted_day());
        for integration in integrations {
            let user_id = integration.user_id;
            match self.sync_with_credential(user_id, &range, &integration.token).await {
                Ok(_) => summary.synced += 1,
                Err(e) => {
                    warn!("🔄️ Scheduled sync for user #{user_id} failed. {e}");
                    summary.failed += 1;
                },
            }
            if self.publish_daily(user_id).await.is_some_and(|o| o.was_pushed()) {
                summary.pushed += 1;
            }
        }
        summary.house = self.publish_house().await;
        info!(
            "🔄️ Sync cycle complete. {} users, {} synced, {} failed, {} reports pushed",
            summary.users, summary.synced, summary.failed, summary.pushed
        );
        summary
    }

    /// Recomputes the house report and pushes it to the house user's connections if it changed.
    pub async fn publish_house(&self) -> Option<BroadcastOutcome> {
        let house_user = self.house_user_id?;
        match self.reports.compute_daily(house_user).await {
            Ok(snapshot) => Some(self.broadcaster.maybe_broadcast_house(house_user, snapshot)),
            Err(ReportError::EmptyRange { .. }) => {
                debug!("🔄️ No house sales today. Nothing to push.");
                None
            },
            Err(e) => {
                error!("🔄️ Could not compute the house report. {e}");
                None
            },
        }
    }

    /// Serves refresh requests until every [`RefreshQueue`] handle is dropped.
    pub async fn run_refresh_worker(&self, mut requests: mpsc::Receiver<i64>) {
        info!("🔁️ Refresh worker started");
        while let Some(user_id) = requests.recv().await {
            trace!("🔁️ Refreshing the daily report of user #{user_id}");
            self.publish_daily(user_id).await;
        }
        info!("🔁️ Refresh worker stopped");
    }
}

use sales_common::DateRange;
use serde::{Deserialize, Serialize};

use crate::{
    db_types::{NewOrderRecord, OrderId, OrderRecord},
    traits::StoreError,
};

/// The outcome of a batch upsert. Skipped records were logged and left out; the rest of the batch was committed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpsertSummary {
    pub written: usize,
    pub skipped: usize,
}

#[allow(async_fn_in_trait)]
pub trait OrderStore {
    /// Inserts or replaces every record, keyed by `(order_id, user_id)`.
    ///
    /// Payment timestamps are converted from the feed's clock to local time on the way in. The batch is committed
    /// atomically, but a failure on a single record only skips that record.
    async fn upsert_orders(&self, user_id: i64, records: &[NewOrderRecord]) -> Result<UpsertSummary, StoreError>;

    /// All of the user's orders whose local payment date falls inside `range`, oldest first, joined with the user's
    /// niche mapping.
    async fn fetch_orders(&self, user_id: i64, range: &DateRange) -> Result<Vec<OrderRecord>, StoreError>;

    async fn fetch_order(&self, user_id: i64, order_id: &OrderId) -> Result<Option<OrderRecord>, StoreError>;
}

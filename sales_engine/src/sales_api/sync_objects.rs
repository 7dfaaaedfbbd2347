use sales_common::DateRange;
use serde::Serialize;

use crate::live::BroadcastOutcome;

/// The outcome of one fetch, normalize and upsert pass for a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SyncSummary {
    pub user_id: i64,
    pub range: DateRange,
    /// Orders that passed validation.
    pub received: usize,
    /// Orders rejected by the normalizer.
    pub rejected: usize,
    /// Orders inserted or replaced in the store.
    #[serde(rename = "inserted_count")]
    pub inserted: usize,
    /// Valid orders the store could not write.
    pub skipped: usize,
}

/// What a scheduled sync cycle did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleSummary {
    pub users: usize,
    pub synced: usize,
    pub failed: usize,
    pub pushed: usize,
    pub house: Option<BroadcastOutcome>,
}

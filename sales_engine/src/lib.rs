//! Sales Engine
//!
//! The sales engine keeps a per-user store of marketplace orders in sync with the commerce platform's sales feed and
//! turns those orders into profitability reports for the dashboard.
//!
//! The library is divided into these sections:
//! 1. Storage ([`mod@sqlite`] and the contracts in [`mod@traits`]). The engine only talks to the store through the
//!    traits, so the SQLite backend can be swapped for a test double. The row types live in [`mod@db_types`].
//! 2. The normalizer ([`mod@normalizer`]), which validates raw feed payloads into typed order records.
//! 3. Report aggregation ([`mod@report`]), a pure function from order rows to a [`report::ReportSnapshot`].
//! 4. Live delivery ([`mod@live`]): the connection registry, the change-gated broadcaster and the refresh queue.
//! 5. The public API ([`mod@sales_api`]). [`ReportApi`] computes reports and [`SyncApi`] drives the whole
//!    fetch, store and push pipeline. The server's scheduler, pollers and endpoints all call into these.
pub mod db_types;
pub mod helpers;
pub mod live;
pub mod normalizer;
pub mod report;
mod sales_api;
#[cfg(feature = "sqlite")]
pub mod sqlite;
pub mod traits;

#[cfg(any(feature = "test_utils", test))]
pub mod test_utils;

pub use sales_api::{
    errors::{ReportError, SyncError},
    report_api::ReportApi,
    sync_api::SyncApi,
    sync_objects::{CycleSummary, SyncSummary},
};
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteDatabase;
pub use traits::{
    FetchError,
    IntegrationStore,
    NicheStore,
    OrderStore,
    SalesDatabase,
    SalesFeed,
    StoreError,
    UpsertSummary,
};

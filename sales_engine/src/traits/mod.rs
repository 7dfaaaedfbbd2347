//! # Backend and collaborator contracts
//!
//! The engine never talks to SQLite or to the commerce platform directly. Everything goes through the traits in this
//! module, so that backends (and test doubles) can be swapped freely.
//!
//! * [`OrderStore`] persists normalized orders and reads them back joined with the niche mapping.
//! * [`NicheStore`] is the read side of the SKU to niche mapping, plus a minimal assign operation.
//! * [`IntegrationStore`] holds the per-user provider credentials.
//! * [`SalesDatabase`] bundles the three for the APIs that need all of them.
//! * [`SalesFeed`] is the external source of raw sales data.
mod integration_store;
mod niche_store;
mod order_store;
mod sales_feed;

pub use integration_store::IntegrationStore;
pub use niche_store::NicheStore;
pub use order_store::{OrderStore, UpsertSummary};
pub use sales_feed::{FetchError, SalesFeed};
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        StoreError::DatabaseError(e.to_string())
    }
}

/// Everything the sync and report pipeline needs from a backend.
pub trait SalesDatabase: OrderStore + NicheStore + IntegrationStore + Clone {}

use sales_common::{DateRange, Secret};
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum FetchError {
    #[error("The credential was rejected or is malformed: {0}")]
    InvalidCredential(String),
    #[error("Could not reach the sales feed: {0}")]
    Transport(String),
    #[error("The sales feed answered with status {status}: {message}")]
    Upstream { status: u16, message: String },
    #[error("The sales feed sent an unreadable response: {0}")]
    Malformed(String),
}

/// A source of raw sales data for one user.
///
/// Implementations are expected to retry transient failures themselves. Whatever they return as an error is final for
/// the current cycle.
#[allow(async_fn_in_trait)]
pub trait SalesFeed {
    async fn fetch_sales(
        &self,
        user_id: i64,
        range: &DateRange,
        credential: &Secret<String>,
    ) -> Result<Value, FetchError>;
}

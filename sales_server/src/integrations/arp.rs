//! Plugs the ARP Commerce client into the engine as its [`SalesFeed`].
use arp_tools::{ArpApi, ArpApiError};
use sales_common::{DateRange, Secret};
use sales_engine::{FetchError, SalesFeed};
use serde_json::Value;

#[derive(Clone)]
pub struct ArpSalesFeed {
    api: ArpApi,
}

impl ArpSalesFeed {
    pub fn new(api: ArpApi) -> Self {
        Self { api }
    }
}

impl SalesFeed for ArpSalesFeed {
    async fn fetch_sales(
        &self,
        _user_id: i64,
        range: &DateRange,
        credential: &Secret<String>,
    ) -> Result<Value, FetchError> {
        // The session cookie already identifies the user, so no user_id goes on the query string.
        self.api.fetch_sales(range, credential, None).await.map_err(to_fetch_error)
    }
}

fn to_fetch_error(e: ArpApiError) -> FetchError {
    match e {
        ArpApiError::InvalidCredential(s) => FetchError::InvalidCredential(s),
        ArpApiError::Initialization(s) | ArpApiError::RestResponseError(s) => FetchError::Transport(s),
        ArpApiError::JsonError(s) => FetchError::Malformed(s),
        ArpApiError::QueryError { status, message } => match status {
            401 | 403 => FetchError::InvalidCredential(message),
            _ => FetchError::Upstream { status, message },
        },
    }
}

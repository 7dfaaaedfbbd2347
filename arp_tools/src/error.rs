use thiserror::Error;

#[derive(Debug, Error)]
pub enum ArpApiError {
    #[error("Could not initialize client: {0}")]
    Initialization(String),
    #[error("The session credential is missing or malformed: {0}")]
    InvalidCredential(String),
    #[error("Invalid REST response: {0}")]
    RestResponseError(String),
    #[error("Could not deserialize JSON: {0}")]
    JsonError(String),
    #[error("Query failed. Error {status}. {message}")]
    QueryError { status: u16, message: String },
}

impl ArpApiError {
    /// Transport failures, rate limiting and server-side (5xx) errors are worth another attempt. Everything else will
    /// fail the same way again.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::RestResponseError(_) => true,
            Self::QueryError { status, .. } => *status >= 500 || *status == 429,
            Self::Initialization(_) | Self::InvalidCredential(_) | Self::JsonError(_) => false,
        }
    }
}

use actix_web::{
    error::ResponseError,
    http::{header::ContentType, StatusCode},
    HttpResponse,
};
use sales_common::DateRangeError;
use sales_engine::{FetchError, ReportError, StoreError, SyncError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Could not initialize server. {0}")]
    InitializeError(String),
    #[error("An error occurred on the backend of the server. {0}")]
    BackendError(String),
    #[error("An I/O error happened in the server. {0}")]
    IOError(#[from] std::io::Error),
    #[error("UnspecifiedError. {0}")]
    Unspecified(String),
    #[error("The request does not identify a user. {0}")]
    Unauthenticated(String),
    #[error("Invalid request. {0}")]
    InvalidRequest(String),
    #[error("No data found. {0}")]
    NoRecordFound(String),
    #[error("User #{0} has no active ARP Commerce integration")]
    MissingIntegration(i64),
    #[error("The sales feed failed. {0}")]
    FeedError(String),
    #[error("The session for the sales feed was rejected. {0}")]
    FeedCredentialRejected(String),
}

impl ResponseError for ServerError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::InitializeError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::BackendError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::IOError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Unspecified(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            Self::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Self::NoRecordFound(_) => StatusCode::NOT_FOUND,
            Self::MissingIntegration(_) => StatusCode::BAD_REQUEST,
            Self::FeedError(_) => StatusCode::BAD_GATEWAY,
            Self::FeedCredentialRejected(_) => StatusCode::UNAUTHORIZED,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .insert_header(ContentType::json())
            .body(serde_json::json!({ "error": self.to_string() }).to_string())
    }
}

impl From<DateRangeError> for ServerError {
    fn from(e: DateRangeError) -> Self {
        Self::InvalidRequest(e.to_string())
    }
}

impl From<StoreError> for ServerError {
    fn from(e: StoreError) -> Self {
        Self::BackendError(e.to_string())
    }
}

impl From<FetchError> for ServerError {
    fn from(e: FetchError) -> Self {
        match e {
            FetchError::InvalidCredential(s) => Self::FeedCredentialRejected(s),
            e => Self::FeedError(e.to_string()),
        }
    }
}

impl From<ReportError> for ServerError {
    fn from(e: ReportError) -> Self {
        match e {
            ReportError::EmptyRange { .. } => Self::NoRecordFound(e.to_string()),
            ReportError::StoreError(e) => e.into(),
        }
    }
}

impl From<SyncError> for ServerError {
    fn from(e: SyncError) -> Self {
        match e {
            SyncError::MissingCredential(user_id) => Self::MissingIntegration(user_id),
            SyncError::InvalidDate(e) => e.into(),
            SyncError::FetchError(e) => e.into(),
            SyncError::ValidationError(e) => Self::FeedError(e.to_string()),
            SyncError::StoreError(e) => e.into(),
        }
    }
}

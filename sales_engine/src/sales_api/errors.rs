use sales_common::{DateRange, DateRangeError};
use thiserror::Error;

use crate::{
    normalizer::ValidationError,
    traits::{FetchError, StoreError},
};

#[derive(Debug, Clone, Error)]
pub enum ReportError {
    #[error("There are no orders for user #{user_id} in {range}")]
    EmptyRange { user_id: i64, range: DateRange },
    #[error("Could not read orders. {0}")]
    StoreError(#[from] StoreError),
}

#[derive(Debug, Clone, Error)]
pub enum SyncError {
    #[error("User #{0} has no active ARP Commerce integration")]
    MissingCredential(i64),
    #[error("{0}")]
    InvalidDate(#[from] DateRangeError),
    #[error("Could not fetch sales. {0}")]
    FetchError(#[from] FetchError),
    #[error("The sales payload was rejected. {0}")]
    ValidationError(#[from] ValidationError),
    #[error("Could not store orders. {0}")]
    StoreError(#[from] StoreError),
}

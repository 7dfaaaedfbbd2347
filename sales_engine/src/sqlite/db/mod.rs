//! # SQLite Database methods
//!
//! Low-level SQLite interactions for the sales engine.
//!
//! These are plain functions that accept a `&mut SqliteConnection`. Callers obtain a connection from the pool, or open
//! a transaction and pass `&mut *tx`, without the functions needing to know which.
use std::str::FromStr;

use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    SqlitePool,
};

mod errors;
pub mod integrations;
pub mod niches;
pub mod orders;

pub use errors::SqliteDatabaseError;

/// Opens a pool on `url`, creating the database file if it does not exist yet.
pub async fn new_pool(url: &str, max_connections: u32) -> Result<SqlitePool, SqliteDatabaseError> {
    let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
    let pool = SqlitePoolOptions::new().max_connections(max_connections).connect_with(options).await?;
    Ok(pool)
}

//! SQLite backend for the sales engine.
mod sqlite_impl;

pub mod db;
pub use sqlite_impl::SqliteDatabase;

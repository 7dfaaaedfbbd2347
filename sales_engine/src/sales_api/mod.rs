//! # Sales engine public API
//!
//! * [`report_api`] computes report snapshots and order listings from the order store.
//! * [`sync_api`] drives the pipeline: fetch from the feed, normalize, upsert, recompute and push. The background
//!   scheduler, the per-user pollers and the manual sync endpoint all go through it.
//!
//! Both APIs are created by handing them a backend that implements the traits they need:
//!
//! ```rust,ignore
//! use sales_engine::{ReportApi, SqliteDatabase};
//! let db = SqliteDatabase::new_with_url("sqlite://data/sales_store.db", 5).await?;
//! let reports = ReportApi::new(db, LocalClock::default());
//! let today = reports.compute_daily(user_id).await?;
//! ```
pub mod errors;
pub mod report_api;
pub mod sync_api;
pub mod sync_objects;

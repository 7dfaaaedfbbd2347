//! Client for the ARP Commerce sales feed.
//!
//! The feed exposes a single endpoint, `GET /sells?r=<date range>`, authenticated with the merchant's `session`
//! cookie. The response body is returned as raw JSON; interpreting its shape is the caller's job.
mod api;
mod config;
mod error;
mod helpers;

pub use api::ArpApi;
pub use config::ArpConfig;
pub use error::ArpApiError;
pub use helpers::backoff_delay;

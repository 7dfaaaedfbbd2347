//! # Sales server
//! This crate hosts the HTTP and WebSocket front end of the sales report engine. It is responsible for:
//! * Running the background scheduler that keeps every integrated user's orders in sync with ARP Commerce.
//! * Serving reports and order listings for the authenticated user.
//! * Streaming each connected user's daily report over a WebSocket, with a poller per live user.
//!
//! ## Configuration
//! The server is configured via environment variables. See [config](config/index.html) for more information.
//!
//! ## Routes
//! * `/health`: A health check route that returns a 200 OK response.
//! * `POST /api/sync`: Syncs the caller's sales now.
//! * `GET /api/reports`, `GET /api/reports/daily`: Report snapshots.
//! * `GET /api/orders`: The caller's stored orders.
//! * `GET /ws/daily_report`: Live daily report.
pub mod cli;
pub mod config;
pub mod data_objects;
pub mod errors;
pub mod identity;
pub mod integrations;
pub mod live_session;
pub mod routes;
pub mod server;
pub mod workers;

#[cfg(test)]
mod endpoint_tests;

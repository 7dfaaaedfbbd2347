use std::time::Duration;

use log::*;

pub const DEFAULT_ARP_BASE_URL: &str = "https://app.arpcommerce.com.br";
const DEFAULT_MAX_ATTEMPTS: u32 = 2;
const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct ArpConfig {
    /// Scheme and host of the feed, without a trailing slash.
    pub base_url: String,
    /// Total number of attempts per fetch, including the first one. Never less than 1.
    pub max_attempts: u32,
    pub min_backoff: Duration,
    pub max_backoff: Duration,
    pub request_timeout: Duration,
}

impl Default for ArpConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_ARP_BASE_URL.to_string(),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            min_backoff: Duration::from_secs(4),
            max_backoff: Duration::from_secs(10),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl ArpConfig {
    pub fn new_from_env_or_default() -> Self {
        let base_url = std::env::var("SALES_ARP_BASE_URL")
            .map(|s| s.trim_end_matches('/').to_string())
            .unwrap_or_else(|_| {
                info!("SALES_ARP_BASE_URL not set, using {DEFAULT_ARP_BASE_URL}");
                DEFAULT_ARP_BASE_URL.to_string()
            });
        let max_attempts = std::env::var("SALES_ARP_MAX_ATTEMPTS")
            .ok()
            .and_then(|s| {
                s.parse::<u32>()
                    .map_err(|e| warn!("Invalid SALES_ARP_MAX_ATTEMPTS value '{s}': {e}. Using the default."))
                    .ok()
            })
            .unwrap_or(DEFAULT_MAX_ATTEMPTS)
            .max(1);
        let timeout = std::env::var("SALES_ARP_TIMEOUT")
            .ok()
            .and_then(|s| {
                s.parse::<u64>()
                    .map_err(|e| warn!("Invalid SALES_ARP_TIMEOUT value '{s}': {e}. Using the default."))
                    .ok()
            })
            .unwrap_or(DEFAULT_TIMEOUT_SECS);
        Self { base_url, max_attempts, request_timeout: Duration::from_secs(timeout), ..Default::default() }
    }

    /// A configuration with no waiting between attempts. Handy for tests.
    pub fn without_backoff(mut self) -> Self {
        self.min_backoff = Duration::ZERO;
        self.max_backoff = Duration::ZERO;
        self
    }
}

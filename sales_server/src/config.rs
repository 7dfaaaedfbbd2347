use std::{env, fmt::Display, str::FromStr, time::Duration};

use arp_tools::ArpConfig;
use log::*;
use sales_common::helpers::parse_optional_id;

const DEFAULT_SALES_HOST: &str = "127.0.0.1";
const DEFAULT_SALES_PORT: u16 = 8370;
const DEFAULT_DATABASE_URL: &str = "sqlite://data/sales_store.db";
const DEFAULT_SYNC_INTERVAL: Duration = Duration::from_secs(3600);
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(180);
const DEFAULT_HOUSE_USER_ID: i64 = 1;
const DEFAULT_LOCAL_UTC_OFFSET: i32 = -3;
const DEFAULT_PUSH_BUFFER: usize = 16;
const DEFAULT_REFRESH_QUEUE: usize = 64;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    /// Settings for the ARP Commerce sales feed client.
    pub arp: ArpConfig,
    /// How often the background scheduler syncs every integrated user.
    pub sync_interval: Duration,
    /// How often a live user's report is refreshed while it has open connections.
    pub poll_interval: Duration,
    /// The user whose daily report is also published as the house report. `None` disables the house report.
    pub house_user_id: Option<i64>,
    /// Offset of the local wall clock from UTC, in hours.
    pub local_utc_offset: i32,
    /// Messages each live connection can have queued before pushes to it are dropped.
    pub push_buffer: usize,
    /// Pending report refreshes before new requests are dropped.
    pub refresh_queue: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_SALES_HOST.to_string(),
            port: DEFAULT_SALES_PORT,
            database_url: DEFAULT_DATABASE_URL.to_string(),
            arp: ArpConfig::default(),
            sync_interval: DEFAULT_SYNC_INTERVAL,
            poll_interval: DEFAULT_POLL_INTERVAL,
            house_user_id: Some(DEFAULT_HOUSE_USER_ID),
            local_utc_offset: DEFAULT_LOCAL_UTC_OFFSET,
            push_buffer: DEFAULT_PUSH_BUFFER,
            refresh_queue: DEFAULT_REFRESH_QUEUE,
        }
    }
}

impl ServerConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self { host: host.to_string(), port, ..Default::default() }
    }

    pub fn from_env_or_default() -> Self {
        let host = env::var("SALES_HOST").ok().unwrap_or_else(|| DEFAULT_SALES_HOST.into());
        let port = parse_env("SALES_PORT", DEFAULT_SALES_PORT);
        let database_url = env::var("SALES_DATABASE_URL").ok().unwrap_or_else(|| {
            warn!("🪛️ SALES_DATABASE_URL is not set. Using the default, {DEFAULT_DATABASE_URL}.");
            DEFAULT_DATABASE_URL.into()
        });
        let arp = ArpConfig::new_from_env_or_default();
        let sync_interval = parse_seconds("SALES_SYNC_INTERVAL", DEFAULT_SYNC_INTERVAL);
        let poll_interval = parse_seconds("SALES_POLL_INTERVAL", DEFAULT_POLL_INTERVAL);
        let house_user_id = match env::var("SALES_HOUSE_USER_ID") {
            Ok(s) => parse_optional_id(&s).unwrap_or_else(|e| {
                error!("🪛️ SALES_HOUSE_USER_ID: {e} Using the default, {DEFAULT_HOUSE_USER_ID}, instead.");
                Some(DEFAULT_HOUSE_USER_ID)
            }),
            Err(_) => Some(DEFAULT_HOUSE_USER_ID),
        };
        if house_user_id.is_none() {
            info!("🪛️ The house report is disabled.");
        }
        let local_utc_offset = parse_env("SALES_LOCAL_UTC_OFFSET", DEFAULT_LOCAL_UTC_OFFSET);
        let push_buffer = parse_env("SALES_PUSH_BUFFER", DEFAULT_PUSH_BUFFER).max(1);
        let refresh_queue = parse_env("SALES_REFRESH_QUEUE", DEFAULT_REFRESH_QUEUE).max(1);
        Self {
            host,
            port,
            database_url,
            arp,
            sync_interval,
            poll_interval,
            house_user_id,
            local_utc_offset,
            push_buffer,
            refresh_queue,
        }
    }
}

fn parse_env<T>(name: &str, default: T) -> T
where
    T: FromStr + Display,
    T::Err: Display,
{
    match env::var(name) {
        Ok(s) => s.trim().parse::<T>().unwrap_or_else(|e| {
            error!("🪛️ {s} is not a valid value for {name}. {e} Using the default, {default}, instead.");
            default
        }),
        Err(_) => default,
    }
}

/// Intervals are whole seconds. Zero is not a valid interval.
fn parse_seconds(name: &str, default: Duration) -> Duration {
    match parse_env(name, default.as_secs()) {
        0 => {
            warn!("🪛️ {name} cannot be zero. Using the default, {}s, instead.", default.as_secs());
            default
        },
        secs => Duration::from_secs(secs),
    }
}

use std::{fmt::Debug, future::Future, panic::AssertUnwindSafe, sync::Arc, time::Duration};

use futures::FutureExt;
use log::*;
use tokio::{
    task::JoinHandle,
    time::{interval_at, Instant},
};

/// Starts the polling task for a live user. The first poll happens one `interval` after the start, since a new
/// connection already gets a fresh report.
///
/// The task runs until it is aborted, which the connection registry does when the user's last connection goes away.
pub fn start_user_poller<P, Fut>(user_id: i64, interval: Duration, poll: P) -> JoinHandle<()>
where
    P: Fn(i64) -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    tokio::spawn(async move {
        let mut timer = interval_at(Instant::now() + interval, interval);
        debug!("🔁️ Poller for user #{user_id} started");
        loop {
            timer.tick().await;
            trace!("🔁️ Polling for user #{user_id}");
            if AssertUnwindSafe(poll(user_id)).catch_unwind().await.is_err() {
                error!("🔁️ A poll for user #{user_id} panicked. Trying again at the next interval.");
            }
        }
    })
}

/// Starts a user's poller. Handed to the connection registry when a user connects for the first time.
#[derive(Clone)]
pub struct PollerSpawner {
    spawn: Arc<dyn Fn(i64) -> JoinHandle<()> + Send + Sync>,
}

impl Debug for PollerSpawner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PollerSpawner")
    }
}

impl PollerSpawner {
    pub fn new<S>(spawn: S) -> Self
    where S: Fn(i64) -> JoinHandle<()> + Send + Sync + 'static {
        Self { spawn: Arc::new(spawn) }
    }

    pub fn spawn(&self, user_id: i64) -> JoinHandle<()> {
        (self.spawn)(user_id)
    }
}

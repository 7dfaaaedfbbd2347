use std::{future::Future, time::Duration};

use log::*;
use sales_engine::CycleSummary;
use tokio::{task::JoinHandle, time::MissedTickBehavior};

/// Starts the sync scheduler. Do not await the returned JoinHandle, as it will run indefinitely.
///
/// `run_cycle` is called once per `interval`, starting immediately. Each cycle runs in its own task, so a cycle that
/// panics is logged and the scheduler carries on with the next one.
pub fn start_sync_scheduler<C, Fut>(interval: Duration, run_cycle: C) -> JoinHandle<()>
where
    C: Fn() -> Fut + Send + 'static,
    Fut: Future<Output = CycleSummary> + Send + 'static,
{
    tokio::spawn(async move {
        let mut timer = tokio::time::interval(interval);
        timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
        info!("🕰️ Sync scheduler started. Syncing every {}s", interval.as_secs());
        loop {
            timer.tick().await;
            debug!("🕰️ Running scheduled sync");
            match tokio::spawn(run_cycle()).await {
                Ok(summary) => trace!("🕰️ Scheduled sync finished: {summary:?}"),
                Err(e) => error!("🕰️ The scheduled sync failed unexpectedly. {e}"),
            }
        }
    })
}

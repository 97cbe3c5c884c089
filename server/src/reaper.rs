//! Background sweep that evicts sessions nobody joined

use crate::registry::Registry;
use log::info;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};

/// Spawns the reaper task
///
/// Every `sweep_interval` it removes sessions that have waited longer than
/// `idle_timeout` for a second player.
pub fn spawn(registry: Registry) -> JoinHandle<()> {
    tokio::spawn(async move {
        let config = *registry.config();
        let mut sweep = interval(config.sweep_interval);
        sweep.set_missed_tick_behavior(MissedTickBehavior::Delay);

        // The first tick fires immediately and would never find anything
        sweep.tick().await;

        loop {
            sweep.tick().await;

            for code in registry.reap_idle(config.idle_timeout).await {
                info!("Session {} removed due to inactivity", code);
            }
        }
    })
}

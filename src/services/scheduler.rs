//! In-process trigger for periodic collection.

use crate::services::Collector;
use std::time::Duration;
use tokio::{
    task::JoinHandle,
    time::{MissedTickBehavior, interval},
};
use tracing::{info, warn};

/// Run `collector` every `every_seconds`, starting immediately.
///
/// Returns `None` when the interval is zero (schedule disabled). Ticks missed
/// while a collection is still running are skipped, not queued.
pub fn spawn_collection_schedule(collector: Collector, every_seconds: u64) -> Option<JoinHandle<()>> {
    if every_seconds == 0 {
        info!("Collection schedule disabled");
        return None;
    }

    info!(
        city = %collector.city(),
        interval_seconds = every_seconds,
        "Starting collection schedule"
    );

    Some(tokio::spawn(async move {
        let mut ticker = interval(Duration::from_secs(every_seconds));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            ticker.tick().await;
            let response = collector.handle().await;
            if response.status_code == 200 {
                info!(
                    next_run_in_seconds = every_seconds,
                    "Finished collection, waiting for next run"
                );
            } else {
                warn!(message = %response.message, "Collection run failed");
            }
        }
    }))
}

//! Price Eviction Task
//!
//! Background task that periodically removes prices older than the
//! configured retention window.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::service::TradePriceService;

/// Removes every price quoted more than `retention` ago.
///
/// Returns the number of prices removed. A retention reaching past the
/// earliest representable time removes nothing.
pub fn evict_expired(service: &dyn TradePriceService, retention: chrono::Duration) -> usize {
    match Utc::now().checked_sub_signed(retention) {
        Some(cutoff) => service.expire_older_than(cutoff),
        None => {
            warn!(
                "Retention of {} days is out of range, nothing evicted",
                retention.num_days()
            );
            0
        }
    }
}

/// Spawns a background task that periodically evicts stale prices.
///
/// The task runs in an infinite loop, sleeping for `interval` between
/// eviction runs. Eviction never blocks concurrent readers or writers.
///
/// # Arguments
/// * `service` - Shared price service
/// * `retention` - How long a price stays valid after its timestamp
/// * `interval` - Time between eviction runs
///
/// # Returns
/// A JoinHandle for the spawned task, which can be used to abort the task
/// during graceful shutdown.
///
/// # Example
/// ```ignore
/// let handle = spawn_eviction_task(service.clone(), chrono::Duration::days(30), Duration::from_secs(3600));
/// // Later, during shutdown:
/// handle.abort();
/// ```
pub fn spawn_eviction_task(
    service: Arc<dyn TradePriceService>,
    retention: chrono::Duration,
    interval: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!(
            "Starting price eviction task: retention {} days, interval {:?}",
            retention.num_days(),
            interval
        );

        loop {
            tokio::time::sleep(interval).await;

            let removed = evict_expired(service.as_ref(), retention);

            if removed > 0 {
                info!("Price eviction: removed {} stale prices", removed);
            } else {
                debug!("Price eviction: no stale prices found");
            }
        }
    })
}

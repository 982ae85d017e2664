//! Expiry Sweeper Task
//!
//! Background task that periodically removes expired entries from an
//! expiring map, so keys that are set once and never read do not pile up.

use std::sync::Weak;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::map::ExpiringMap;

// == Sweeper Handle ==
/// Owned handle to a running sweeper.
///
/// Stopping is a one-way transition: a stopped sweeper cannot be restarted,
/// but the map it served stays usable.
#[derive(Debug)]
pub struct SweeperHandle {
    token: CancellationToken,
    task: JoinHandle<()>,
}

impl SweeperHandle {
    /// Signals the sweeper to stop. Idempotent and never blocks.
    pub fn stop(&self) {
        if !self.token.is_cancelled() {
            debug!("Stopping expiry sweeper");
            self.token.cancel();
        }
    }

    /// Whether a stop was requested or the task already exited.
    pub fn is_stopped(&self) -> bool {
        self.token.is_cancelled() || self.task.is_finished()
    }

    /// Whether the sweeper task has fully exited.
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    #[cfg(test)]
    pub(crate) fn cancellation_token(&self) -> CancellationToken {
        self.token.clone()
    }
}

/// Spawns a sweeper for `map` on `runtime`, waking every `period`.
///
/// The first sweep runs one full period after spawning. The task holds only
/// a weak reference; the map cancels it when dropped.
pub(crate) fn spawn_sweeper<T>(
    runtime: &Handle,
    map: Weak<ExpiringMap<T>>,
    period: Duration,
) -> SweeperHandle
where
    T: Send + 'static,
{
    let token = CancellationToken::new();
    let task = runtime.spawn(run_sweeper(map, period, token.clone()));

    SweeperHandle { token, task }
}

async fn run_sweeper<T>(map: Weak<ExpiringMap<T>>, period: Duration, token: CancellationToken)
where
    T: Send + 'static,
{
    info!(?period, "Starting expiry sweeper");

    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick completes immediately.
    ticker.tick().await;

    loop {
        tokio::select! {
            _ = token.cancelled() => {
                info!("Expiry sweeper stopped");
                break;
            }
            _ = ticker.tick() => {
                // Not upgradable while the map is still being built or is
                // being dropped; dropping cancels the token.
                let Some(map) = map.upgrade() else {
                    continue;
                };
                let removed = map.sweep_expired();

                if removed > 0 {
                    info!(removed, "Expiry sweep removed expired entries");
                } else {
                    debug!("Expiry sweep found no expired entries");
                }
            }
        }
    }
}

//! Periodic pinglist reload.

use std::time::Duration;

use tokio::sync::broadcast;
use tokio::time::MissedTickBehavior;

use crate::pinglist_store::{PinglistSource, PinglistStore};

/// Reload `store` from `source` every `period`, starting immediately.
///
/// Reload failures are logged and retried on the next tick. Returns when
/// `shutdown` fires or its sender is dropped. Shutdown is only observed
/// between reloads, so a reload that has started always finishes.
pub async fn refresh_loop<S: PinglistSource>(
    store: PinglistStore,
    source: S,
    period: Duration,
    mut shutdown: broadcast::Receiver<()>,
) {
    let mut interval = tokio::time::interval(period.max(Duration::from_secs(1)));
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    tracing::info!(period_secs = period.as_secs(), "pinglist refresh starting");

    loop {
        tokio::select! {
            _ = interval.tick() => {}
            _ = shutdown.recv() => {
                tracing::info!("pinglist refresh stopped");
                return;
            }
        }

        if let Err(e) = store.reload(&source).await {
            tracing::error!(error = %e, "error loading pinglist");
        }
    }
}

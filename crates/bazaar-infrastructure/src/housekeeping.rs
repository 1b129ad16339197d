//! Idle-session housekeeping.

use bazaar_core::session::SessionStore;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Spawns a background task that removes sessions idle beyond `threshold`,
/// checking every `every`.
///
/// Removal is silent: the swept chat gets no notice, and its next inbound
/// event simply starts a fresh session. Sessions whose lock is held are
/// mid-event and skipped by the store.
pub fn spawn_idle_sweeper(
    store: Arc<SessionStore>,
    threshold: chrono::Duration,
    every: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            let removed = store.remove_idle(threshold).await;
            if !removed.is_empty() {
                tracing::debug!("swept {} idle session(s)", removed.len());
            }
        }
    })
}

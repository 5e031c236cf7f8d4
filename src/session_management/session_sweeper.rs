use std::sync::Arc;

use log::{debug, info, warn};
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};

use crate::session_management::session_store::SessionStore;
use crate::session_management::DEFAULT_CHECK_PERIOD;

/// Spawns a task that calls `prune` on `store` once per check period.
///
/// The first sweep runs immediately. The task never finishes on its own;
/// abort the returned handle to stop it.
pub fn spawn_sweeper(store: Arc<dyn SessionStore>) -> JoinHandle<()> {
    let mut period = store.check_period();
    if period.is_zero() {
        warn!(
            "Session check period is zero, falling back to {:?}",
            DEFAULT_CHECK_PERIOD
        );
        period = DEFAULT_CHECK_PERIOD;
    }
    info!("Starting session sweeper (every {:?})", period);

    tokio::spawn(async move {
        let mut interval = time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            let removed = store.prune();
            if removed > 0 {
                info!("Purged {} stale session(s)", removed);
            } else {
                debug!("No stale sessions to purge");
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session_management::MemorySessionStore;
    use serde_json::json;
    use std::time::Duration;

    #[tokio::test(start_paused = true)]
    async fn sweeper_purges_on_every_period() {
        let _ = env_logger::builder().is_test(true).try_init();
        let store = Arc::new(MemorySessionStore::new(
            Duration::from_secs(60),
            chrono::Duration::zero(),
        ));
        store.set("a", json!({}));
        store.set("b", json!({}));
        assert_eq!(store.len(), 2);

        let handle = spawn_sweeper(store.clone());

        // first tick fires right away
        time::sleep(Duration::from_millis(1)).await;
        assert_eq!(store.len(), 0);

        store.set("c", json!({}));
        assert_eq!(store.len(), 1);
        time::sleep(Duration::from_secs(60)).await;
        assert_eq!(store.len(), 0);

        handle.abort();
        assert!(handle.await.unwrap_err().is_cancelled());
    }

    #[tokio::test(start_paused = true)]
    async fn sweeper_keeps_live_sessions() {
        let store = Arc::new(MemorySessionStore::new(
            Duration::from_secs(60),
            chrono::Duration::hours(1),
        ));
        store.set("a", json!({ "account_id": 1 }));

        let handle = spawn_sweeper(store.clone());
        time::sleep(Duration::from_secs(61)).await;
        assert!(store.get("a").is_some());
        handle.abort();
    }
}

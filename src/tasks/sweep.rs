//! Expiry Sweep Task
//!
//! Optional background task that actively removes expired entries. Without it
//! expired entries hold their bytes until the next read of their key.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::CacheEngine;

/// Spawns a task that purges expired entries every `interval_secs` seconds.
///
/// Each pass takes the engine's write lock, so a purge is atomic with respect
/// to every other cache operation.
///
/// # Arguments
/// * `cache` - Shared engine
/// * `interval_secs` - Seconds between passes
///
/// # Returns
/// A JoinHandle that can be aborted during shutdown.
///
/// # Example
/// ```ignore
/// let cache = Arc::new(RwLock::new(CacheEngine::new(1024 * 1024)));
/// let sweep_handle = spawn_sweep_task(cache.clone(), 30);
/// // Later, during shutdown:
/// sweep_handle.abort();
/// ```
pub fn spawn_sweep_task(cache: Arc<RwLock<CacheEngine>>, interval_secs: u64) -> JoinHandle<()> {
    let interval = Duration::from_secs(interval_secs);

    tokio::spawn(async move {
        info!(
            "Starting expiry sweep task with interval of {} seconds",
            interval_secs
        );

        loop {
            tokio::time::sleep(interval).await;

            let removed = {
                let mut engine = cache.write().await;
                engine.purge_expired()
            };

            if removed > 0 {
                info!("Expiry sweep: removed {} expired entries", removed);
            } else {
                debug!("Expiry sweep: no expired entries found");
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{ManualClock, SetOptions};

    fn shared_engine(clock: &ManualClock) -> Arc<RwLock<CacheEngine>> {
        Arc::new(RwLock::new(
            CacheEngine::new(1024).with_clock(clock.clone()),
        ))
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweep_removes_expired_entries() {
        let clock = ManualClock::new(0);
        let cache = shared_engine(&clock);
        {
            let mut engine = cache.write().await;
            engine.set("expire_soon", "v", SetOptions::new().ttl(1)).unwrap();
            engine.set("long_lived", "v", SetOptions::new().ttl(3600)).unwrap();
        }

        let handle = spawn_sweep_task(cache.clone(), 1);
        clock.set(5_000);
        tokio::time::sleep(Duration::from_millis(1_500)).await;

        {
            let engine = cache.read().await;
            assert!(!engine.contains("expire_soon"));
            assert!(engine.contains("long_lived"));
            assert_eq!(engine.stats().expirations, 1);
            assert_eq!(engine.stats().misses, 0);
        }

        handle.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweep_preserves_live_entries() {
        let clock = ManualClock::new(0);
        let cache = shared_engine(&clock);
        cache
            .write()
            .await
            .set("k", "v", SetOptions::new().ttl(60))
            .unwrap();

        let handle = spawn_sweep_task(cache.clone(), 1);
        tokio::time::sleep(Duration::from_millis(3_500)).await;

        assert!(cache.read().await.contains("k"));
        handle.abort();
    }

    #[tokio::test]
    async fn test_sweep_can_be_aborted() {
        let cache = Arc::new(RwLock::new(CacheEngine::new(1024)));

        let handle = spawn_sweep_task(cache, 1);
        handle.abort();

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(handle.is_finished(), "Task should be finished after abort");
    }
}

//! Background expiry of idle conversations.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::manager::ChatMemoryManager;
use super::repository::{ChatRepository, TopicRepository};

/// Run `sweep_expired` every `interval` until `cancel` fires.
///
/// Admission already sweeps on every miss; this keeps memory bounded for
/// conversations that simply go quiet.
pub fn spawn_sweeper<C, T>(
    manager: Arc<ChatMemoryManager<C, T>>,
    interval: Duration,
    cancel: CancellationToken,
) -> JoinHandle<()>
where
    C: ChatRepository + 'static,
    T: TopicRepository + 'static,
{
    let period = interval.max(Duration::from_secs(1));

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately.
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    debug!("Conversation sweeper stopped");
                    break;
                }
                _ = ticker.tick() => {
                    let removed = manager.sweep_expired();
                    if removed > 0 {
                        info!(removed, remaining = manager.len(), "Expired idle conversations");
                    }
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use aula_types::config::MemoryConfig;

    use super::*;
    use crate::chat::testing::InMemoryStore;

    #[tokio::test(start_paused = true)]
    async fn test_sweeper_expires_idle_conversations() {
        let store = InMemoryStore::default();
        let config = MemoryConfig {
            timeout_secs: 100,
            ..MemoryConfig::default()
        };
        let manager = Arc::new(ChatMemoryManager::new(store.clone(), store, config));
        manager.get_conversation("u1", "t1").await.unwrap();

        let cancel = CancellationToken::new();
        let handle = spawn_sweeper(Arc::clone(&manager), Duration::from_secs(30), cancel.clone());

        tokio::time::sleep(Duration::from_secs(90)).await;
        assert!(manager.contains("u1", "t1"));

        tokio::time::sleep(Duration::from_secs(45)).await;
        assert!(!manager.contains("u1", "t1"));

        cancel.cancel();
        handle.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweeper_stops_on_cancel() {
        let store = InMemoryStore::default();
        let manager = Arc::new(ChatMemoryManager::new(
            store.clone(),
            store,
            MemoryConfig::default(),
        ));

        let cancel = CancellationToken::new();
        let handle = spawn_sweeper(manager, Duration::from_secs(60), cancel.clone());
        cancel.cancel();

        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("sweeper should stop promptly")
            .unwrap();
    }
}

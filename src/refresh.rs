//! Background dataset loading
//!
//! Loads run on spawned tokio tasks and report back over an mpsc channel. Each
//! load carries the [`RequestToken`] it was issued with so the app can drop
//! results that a newer load has superseded.

use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::warn;

use crate::data::{Dataset, Filters};
use crate::fetch::{CachePolicy, Loaded, RequestToken};
use crate::loader::{DatasetData, Loader};

/// Messages sent from background loads to the main app
#[derive(Debug, Clone)]
pub enum LoadMessage {
    /// A load finished with data
    Loaded {
        dataset: Dataset,
        token: RequestToken,
        loaded: Loaded<DatasetData>,
    },
    /// A load failed and no cached data was available
    Failed {
        dataset: Dataset,
        token: RequestToken,
        error: String,
    },
}

impl LoadMessage {
    pub fn dataset(&self) -> Dataset {
        match self {
            LoadMessage::Loaded { dataset, .. } | LoadMessage::Failed { dataset, .. } => *dataset,
        }
    }

    pub fn token(&self) -> RequestToken {
        match self {
            LoadMessage::Loaded { token, .. } | LoadMessage::Failed { token, .. } => *token,
        }
    }
}

/// One load the app wants started
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadRequest {
    pub dataset: Dataset,
    pub filters: Filters,
    pub policy: CachePolicy,
    pub token: RequestToken,
}

/// Handle for starting loads and receiving their results
pub struct LoadHandle {
    /// Channel for receiving load messages
    pub receiver: mpsc::Receiver<LoadMessage>,
    sender: mpsc::Sender<LoadMessage>,
}

impl LoadHandle {
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::channel(32);
        Self { receiver, sender }
    }

    /// Spawns a task that runs `request` and reports the outcome
    pub fn spawn(&self, loader: Arc<Loader>, request: LoadRequest) {
        let tx = self.sender.clone();
        tokio::spawn(async move {
            let LoadRequest {
                dataset,
                filters,
                policy,
                token,
            } = request;

            let message = match loader.load(dataset, &filters, policy).await {
                Ok(loaded) => LoadMessage::Loaded {
                    dataset,
                    token,
                    loaded,
                },
                Err(e) => {
                    warn!(dataset = %dataset, error = %e, "Dataset load failed");
                    LoadMessage::Failed {
                        dataset,
                        token,
                        error: e.to_string(),
                    }
                }
            };

            // The receiver is gone only when the app is shutting down
            let _ = tx.send(message).await;
        });
    }
}

impl Default for LoadHandle {
    fn default() -> Self {
        Self::new()
    }
}

/// Checks for pending load messages without blocking
///
/// # Returns
/// * `Some(LoadMessage)` if a message was available
/// * `None` if no messages are pending
pub fn try_recv(handle: &mut LoadHandle) -> Option<LoadMessage> {
    handle.receiver.try_recv().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{CacheTtl, MemoryStore, TtlCache};
    use crate::config::{Config, Environment};
    use crate::data::BackendClient;
    use crate::fetch::{Origin, RequestTracker};
    use crate::loader::SharedStore;

    fn loader(store: SharedStore) -> Arc<Loader> {
        let config = Config {
            environment: Environment::Local,
            api_url: "http://127.0.0.1:1".to_string(),
            page_size: 100,
            mint_editions_page_size: 20,
        };
        Arc::new(Loader::new(
            BackendClient::new(config.api_url.clone()),
            store,
            &config,
        ))
    }

    #[test]
    fn test_no_messages_before_any_load() {
        let mut handle = LoadHandle::new();
        assert!(try_recv(&mut handle).is_none());
    }

    #[tokio::test]
    async fn test_spawned_load_reports_cached_data() {
        let store: SharedStore = Arc::new(MemoryStore::new());
        TtlCache::with_class(Arc::clone(&store), CacheTtl::Analytics)
            .set("story_data_cache_all_all", &Vec::<crate::data::StoryStat>::new());
        let mut handle = LoadHandle::new();
        let token = RequestTracker::new().issue();

        handle.spawn(
            loader(store),
            LoadRequest {
                dataset: Dataset::Story,
                filters: Filters::default(),
                policy: CachePolicy::PreferCache,
                token,
            },
        );

        let message = handle.receiver.recv().await.expect("Should receive a message");
        assert_eq!(message.dataset(), Dataset::Story);
        assert_eq!(message.token(), token);
        match message {
            LoadMessage::Loaded { loaded, .. } => assert_eq!(loaded.origin, Origin::Cache),
            other => panic!("Expected Loaded, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_spawned_load_reports_failure() {
        let mut handle = LoadHandle::new();
        let token = RequestTracker::new().issue();

        handle.spawn(
            loader(Arc::new(MemoryStore::new())),
            LoadRequest {
                dataset: Dataset::Users,
                filters: Filters::default(),
                policy: CachePolicy::PreferCache,
                token,
            },
        );

        let message = handle.receiver.recv().await.expect("Should receive a message");
        assert!(matches!(message, LoadMessage::Failed { dataset: Dataset::Users, .. }));
    }
}

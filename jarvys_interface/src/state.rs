//! Shared state handed to every handler and background task.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use chrono::Utc;
use tracing::warn;

use crate::aggregator::SnapshotAggregator;
use crate::config::Config;
use crate::embedding::EmbeddingClient;
use crate::relay::UpdateRelay;
use crate::sources::{DatastoreMetrics, DatastoreRegistry, ProcessStatusProbe};
use crate::store::DatastoreClient;
use crate::suggestions::SuggestionBoard;
use crate::types::Snapshot;

pub struct AppState {
    pub config: Config,
    pub relay: Arc<UpdateRelay>,
    pub aggregator: SnapshotAggregator<ProcessStatusProbe, DatastoreMetrics, DatastoreRegistry>,
    pub store: Option<Arc<DatastoreClient>>,
    pub embeddings: Option<EmbeddingClient>,
    pub suggestions: SuggestionBoard,
    message_counter: AtomicU64,
}

impl AppState {
    pub fn new(config: Config) -> Arc<Self> {
        let store = DatastoreClient::from_config(&config).map(Arc::new);
        let embeddings = config
            .openai_api_key
            .clone()
            .and_then(|key| EmbeddingClient::new(key, &config.openai_base_url, config.source_timeout));
        let relay = Arc::new(UpdateRelay::new(
            config.log_ring_capacity,
            config.source_timeout,
        ));
        let aggregator = SnapshotAggregator::new(
            ProcessStatusProbe::new(config.orchestrator_process.clone()),
            DatastoreMetrics::new(store.clone()),
            DatastoreRegistry::new(store.clone()),
            config.source_timeout,
        );
        Arc::new(Self {
            config,
            relay,
            aggregator,
            store,
            embeddings,
            suggestions: SuggestionBoard::new(),
            message_counter: AtomicU64::new(1),
        })
    }

    /// The snapshot served to polls: the cached one when it is fresh,
    /// otherwise a recompute that also refills the cache.
    pub async fn current_snapshot(&self) -> Snapshot {
        if let Some(snapshot) = self
            .relay
            .fresh_snapshot(self.config.freshness_window)
            .await
        {
            return snapshot;
        }
        let viewers = self.relay.viewer_count().await;
        let snapshot = self.aggregator.produce_snapshot(viewers).await;
        self.relay.store_snapshot(snapshot.clone()).await;
        snapshot
    }

    /// One tick of the background publisher: pull fresh suggestions, build a
    /// snapshot, push it to every attached viewer.
    pub async fn refresh_and_publish(&self) {
        if let Some(store) = &self.store {
            match store.pending_suggestions().await {
                Ok(rows) => self.suggestions.merge(rows).await,
                Err(err) => warn!(source = "suggestions", error = %err, "suggestion refresh failed"),
            }
        }
        let viewers = self.relay.viewer_count().await;
        let snapshot = self.aggregator.produce_snapshot(viewers).await;
        self.relay.publish_snapshot(snapshot).await;
    }

    /// Process-unique chat message id.
    pub fn next_message_id(&self) -> String {
        let n = self.message_counter.fetch_add(1, Ordering::Relaxed);
        format!("msg_{}_{n}", Utc::now().timestamp_millis())
    }
}

//! Hosted datastore client (Supabase REST). Every call carries its own
//! timeout so a hung datastore can never hang the aggregator or a handler.

use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::{Client, ClientBuilder};
use serde_json::{json, Value};
use tracing::warn;

use crate::config::Config;
use crate::error::SourceError;
use crate::types::{AgentInfo, ChatMessage, MemoryHit, MetricRecord, Suggestion};

const METRICS_TABLE: &str = "jarvys_metrics";
const AGENTS_TABLE: &str = "jarvys_agents_status";
const MEMORY_TABLE: &str = "jarvys_memory";
const CHAT_TABLE: &str = "orchestrator_chat";
const SUGGESTIONS_TABLE: &str = "orchestrator_suggestions";
const VALIDATIONS_TABLE: &str = "task_validations";
const PRIORITIES_TABLE: &str = "task_priorities";

pub struct DatastoreClient {
    base: String,
    key: String,
    http: Client,
}

impl DatastoreClient {
    /// Returns None when the datastore is not configured; callers degrade.
    pub fn from_config(config: &Config) -> Option<Self> {
        let base = config.supabase_url.clone()?;
        let key = config.supabase_key.clone()?;
        let http = ClientBuilder::new()
            .timeout(config.source_timeout)
            .build()
            .ok()?;
        Some(Self {
            base: base.trim_end_matches('/').to_string(),
            key,
            http,
        })
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base, table)
    }

    fn rpc_url(&self, function: &str) -> String {
        format!("{}/rest/v1/rpc/{}", self.base, function)
    }

    async fn insert(&self, table: &str, row: &Value) -> Result<(), SourceError> {
        let resp = self
            .http
            .post(self.table_url(table))
            .header("apikey", &self.key)
            .bearer_auth(&self.key)
            .json(row)
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(SourceError::Unreachable(format!(
                "{table} insert returned {}",
                resp.status()
            )));
        }
        Ok(())
    }

    async fn select(&self, table: &str, query: &[(&str, String)]) -> Result<Value, SourceError> {
        let resp = self
            .http
            .get(self.table_url(table))
            .header("apikey", &self.key)
            .bearer_auth(&self.key)
            .query(query)
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(SourceError::Unreachable(format!(
                "{table} select returned {}",
                resp.status()
            )));
        }
        Ok(resp.json().await?)
    }

    /// Metric records with `created_at >= cutoff`, newest first.
    pub async fn metrics_since(
        &self,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<MetricRecord>, SourceError> {
        let value = self
            .select(
                METRICS_TABLE,
                &[
                    ("select", "*".to_string()),
                    (
                        "created_at",
                        format!("gte.{}", cutoff.to_rfc3339_opts(SecondsFormat::Secs, true)),
                    ),
                    ("order", "created_at.desc".to_string()),
                ],
            )
            .await?;
        serde_json::from_value(value).map_err(|e| SourceError::Malformed(e.to_string()))
    }

    pub async fn insert_metric(&self, record: &MetricRecord) -> Result<(), SourceError> {
        let row = serde_json::to_value(record)
            .map_err(|e| SourceError::Malformed(e.to_string()))?;
        self.insert(METRICS_TABLE, &row).await
    }

    pub async fn agents(&self) -> Result<Vec<AgentInfo>, SourceError> {
        let value = self
            .select(AGENTS_TABLE, &[("select", "*".to_string())])
            .await?;
        serde_json::from_value(value).map_err(|e| SourceError::Malformed(e.to_string()))
    }

    pub async fn pending_suggestions(&self) -> Result<Vec<Suggestion>, SourceError> {
        let value = self
            .select(
                SUGGESTIONS_TABLE,
                &[
                    ("select", "*".to_string()),
                    ("status", "eq.pending".to_string()),
                    ("order", "created_at.desc".to_string()),
                    ("limit", "20".to_string()),
                ],
            )
            .await?;
        serde_json::from_value(value).map_err(|e| SourceError::Malformed(e.to_string()))
    }

    pub async fn insert_chat(&self, message: &ChatMessage) -> Result<(), SourceError> {
        let row = json!({
            "message": message.message,
            "sender": message.sender,
            "timestamp": message.timestamp,
            "type": "user_to_orchestrator",
            "status": message.status,
        });
        self.insert(CHAT_TABLE, &row).await
    }

    pub async fn insert_validation(
        &self,
        task_id: &str,
        action: &str,
        priority: Option<u8>,
        comment: Option<&str>,
    ) -> Result<(), SourceError> {
        let row = json!({
            "task_id": task_id,
            "action": action,
            "priority": priority,
            "comment": comment,
            "timestamp": Utc::now(),
            "validator": "dashboard_user",
        });
        self.insert(VALIDATIONS_TABLE, &row).await
    }

    pub async fn upsert_priority(
        &self,
        task_id: &str,
        priority: u8,
        notes: Option<&str>,
    ) -> Result<(), SourceError> {
        let row = json!({
            "task_id": task_id,
            "priority": priority,
            "notes": notes,
            "updated_at": Utc::now(),
        });
        let resp = self
            .http
            .post(self.table_url(PRIORITIES_TABLE))
            .header("apikey", &self.key)
            .bearer_auth(&self.key)
            .header("Prefer", "resolution=merge-duplicates")
            .json(&row)
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(SourceError::Unreachable(format!(
                "priority upsert returned {}",
                resp.status()
            )));
        }
        Ok(())
    }

    /// Stores a memory record. The embedding is optional; the content commits
    /// either way.
    pub async fn insert_memory(
        &self,
        content: &str,
        agent_source: Option<&str>,
        memory_type: Option<&str>,
        user_context: Option<&str>,
        importance_score: f64,
        embedding: Option<&[f32]>,
    ) -> Result<(), SourceError> {
        let mut row = json!({
            "content": content,
            "agent_source": agent_source,
            "memory_type": memory_type,
            "user_context": user_context,
            "importance_score": importance_score,
        });
        if let Some(vector) = embedding {
            row["embedding"] = json!(vector);
        }
        self.insert(MEMORY_TABLE, &row).await
    }

    /// Vector search through the datastore's `search_memory` RPC, falling
    /// back to a plain substring match when the RPC is unavailable.
    pub async fn search_memory(
        &self,
        query: &str,
        user_context: Option<&str>,
        limit: usize,
    ) -> Result<Vec<MemoryHit>, SourceError> {
        match self.search_memory_rpc(query, user_context, limit).await {
            Ok(hits) => Ok(hits),
            Err(err) => {
                warn!(error = %err, "vector search unavailable, using substring match");
                self.search_memory_substring(query, limit).await
            }
        }
    }

    async fn search_memory_rpc(
        &self,
        query: &str,
        user_context: Option<&str>,
        limit: usize,
    ) -> Result<Vec<MemoryHit>, SourceError> {
        let resp = self
            .http
            .post(self.rpc_url("search_memory"))
            .header("apikey", &self.key)
            .bearer_auth(&self.key)
            .json(&json!({
                "query_text": query,
                "user_ctx": user_context,
                "match_threshold": 0.8,
                "match_count": limit,
            }))
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(SourceError::Unreachable(format!(
                "search_memory rpc returned {}",
                resp.status()
            )));
        }
        let value: Value = resp.json().await?;
        serde_json::from_value(value).map_err(|e| SourceError::Malformed(e.to_string()))
    }

    async fn search_memory_substring(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<MemoryHit>, SourceError> {
        let value = self
            .select(
                MEMORY_TABLE,
                &[
                    ("select", "*".to_string()),
                    ("content", format!("ilike.*{}*", query.replace(' ', "*"))),
                    ("order", "created_at.desc".to_string()),
                    ("limit", limit.to_string()),
                ],
            )
            .await?;
        serde_json::from_value(value).map_err(|e| SourceError::Malformed(e.to_string()))
    }
}

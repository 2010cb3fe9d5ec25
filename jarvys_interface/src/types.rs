//! Wire types shared with dashboard viewers and reporting agents.
//! Keep this module minimal and stable; it defines the JSON contract.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Orchestrator process health as seen by the status probe.
/// `Unknown` means the probe itself failed, not that the process is down.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OrchestratorState {
    Running,
    Stopped,
    Error,
    Unknown,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct OrchestratorStatus {
    pub status: OrchestratorState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pid: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cpu_percent: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memory_mb: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uptime: Option<String>,
}

impl OrchestratorStatus {
    /// Probe failure: every measurement is absent, never zero.
    pub fn unknown() -> Self {
        Self {
            status: OrchestratorState::Unknown,
            pid: None,
            cpu_percent: None,
            memory_mb: None,
            uptime: None,
        }
    }

    pub fn stopped() -> Self {
        Self {
            status: OrchestratorState::Stopped,
            pid: None,
            cpu_percent: None,
            memory_mb: None,
            uptime: None,
        }
    }
}

/// Counters over the trailing 24h metric window.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct ActivitySummary {
    pub recent_commits: u64,
    pub recent_tasks: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_activity: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AgentInfo {
    pub agent_name: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub environment: Option<String>,
}

/// Cost/latency aggregates over the trailing window. Zero-record windows
/// report success_rate = 1 and avg_response_time_ms = 0, never NaN.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct MetricsSummary {
    pub daily_cost_usd: f64,
    pub daily_calls: u64,
    pub avg_response_time_ms: f64,
    pub success_rate: f64,
}

impl Default for MetricsSummary {
    fn default() -> Self {
        Self {
            daily_cost_usd: 0.0,
            daily_calls: 0,
            avg_response_time_ms: 0.0,
            success_rate: 1.0,
        }
    }
}

/// The unit broadcast to viewers: one aggregated, point-in-time view.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Snapshot {
    pub timestamp: DateTime<Utc>,
    pub orchestrator: OrchestratorStatus,
    pub activity: ActivitySummary,
    pub agents: Vec<AgentInfo>,
    pub metrics: MetricsSummary,
    pub connected_viewers: usize,
}

/// One observed event from a reporting agent. `created_at` is set by the
/// interface on ingestion, never by the caller.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct MetricRecord {
    pub agent_type: String,
    pub event_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tokens_used: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost_usd: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_time_ms: Option<f64>,
    pub success: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SuggestionStatus {
    Pending,
    Approved,
    Rejected,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Suggestion {
    pub id: String,
    pub title: String,
    pub description: String,
    pub priority: u8,
    pub status: SuggestionStatus,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_effort: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ChatStatus {
    Pending,
    Sent,
    Received,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ChatMessage {
    pub id: String,
    pub message: String,
    pub sender: String,
    pub timestamp: DateTime<Utc>,
    pub status: ChatStatus,
}

/// Memory record stored through `/api/memory`. The embedding is attached
/// best-effort; its absence is a warning, not a failure.
#[derive(Debug, Deserialize, Clone)]
pub struct MemoryInsert {
    pub content: String,
    #[serde(default)]
    pub agent_source: Option<String>,
    #[serde(default)]
    pub memory_type: Option<String>,
    #[serde(default)]
    pub user_context: Option<String>,
    #[serde(default)]
    pub importance_score: Option<f64>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct MemoryHit {
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub importance_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Messages pushed to attached viewer channels, tagged the way the
/// dashboards consume them: `{"type": ..., "data": ...}`.
#[derive(Debug, Serialize, Clone)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum WsEvent {
    InitialStatus(Snapshot),
    StatusUpdate(Snapshot),
    ChatReceived(ChatMessage),
    LogsUpdate(Vec<String>),
    Pong,
}

/// Requests a viewer may send over its channel.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ViewerRequest {
    Ping,
    RequestStatus,
}

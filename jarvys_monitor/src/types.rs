//! Types that mirror the interface's JSON schema.

use chrono::{DateTime, Utc};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct OrchestratorStatus {
    pub status: String,
    pub pid: Option<u32>,
    pub cpu_percent: Option<f32>,
    pub memory_mb: Option<f64>,
    pub uptime: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ActivitySummary {
    pub recent_commits: u64,
    pub recent_tasks: u64,
    pub last_activity: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AgentInfo {
    pub agent_name: String,
    pub status: String,
    pub environment: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct MetricsSummary {
    pub daily_cost_usd: f64,
    pub daily_calls: u64,
    pub avg_response_time_ms: f64,
    pub success_rate: f64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Snapshot {
    pub timestamp: DateTime<Utc>,
    pub orchestrator: OrchestratorStatus,
    pub activity: ActivitySummary,
    pub agents: Vec<AgentInfo>,
    pub metrics: MetricsSummary,
    pub connected_viewers: usize,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ChatMessage {
    pub id: String,
    pub message: String,
    pub sender: String,
    pub timestamp: DateTime<Utc>,
    pub status: String,
}

/// Messages pushed by the interface: `{"type": ..., "data": ...}`.
#[derive(Debug, Deserialize, Clone)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum DashboardEvent {
    InitialStatus(Snapshot),
    StatusUpdate(Snapshot),
    ChatReceived(ChatMessage),
    LogsUpdate(Vec<String>),
    Pong,
}

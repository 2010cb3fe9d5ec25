//! Snapshot assembly: combines the status probe, the metric window, and the
//! agent registry into one normalized view. Never fails: each source
//! degrades independently to its documented default.

use chrono::Utc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::warn;

use crate::sources::{metrics_window, AgentRegistry, MetricsSource, StatusSource};
use crate::types::{
    ActivitySummary, AgentInfo, MetricRecord, MetricsSummary, OrchestratorStatus, Snapshot,
};

pub struct SnapshotAggregator<S, M, R> {
    status: S,
    metrics: M,
    registry: R,
    source_timeout: Duration,
}

impl<S: StatusSource, M: MetricsSource, R: AgentRegistry> SnapshotAggregator<S, M, R> {
    pub fn new(status: S, metrics: M, registry: R, source_timeout: Duration) -> Self {
        Self {
            status,
            metrics,
            registry,
            source_timeout,
        }
    }

    /// Builds a Snapshot from whatever the sources can deliver right now.
    /// A failed or hung source contributes its default, never an error.
    pub async fn produce_snapshot(&self, connected_viewers: usize) -> Snapshot {
        let orchestrator = match timeout(self.source_timeout, self.status.orchestrator_status())
            .await
        {
            Ok(Ok(status)) => status,
            Ok(Err(err)) => {
                warn!(source = "status", error = %err, "status probe failed");
                OrchestratorStatus::unknown()
            }
            Err(_) => {
                warn!(source = "status", "status probe timed out");
                OrchestratorStatus::unknown()
            }
        };

        let cutoff = Utc::now() - metrics_window();
        let records = match timeout(self.source_timeout, self.metrics.records_since(cutoff)).await
        {
            Ok(Ok(records)) => records,
            Ok(Err(err)) => {
                warn!(source = "metrics", error = %err, "metric window read failed");
                Vec::new()
            }
            Err(_) => {
                warn!(source = "metrics", "metric window read timed out");
                Vec::new()
            }
        };

        let agents = match timeout(self.source_timeout, self.registry.agents()).await {
            Ok(Ok(agents)) if !agents.is_empty() => agents,
            Ok(Ok(_)) => default_agents(),
            Ok(Err(err)) => {
                warn!(source = "registry", error = %err, "agent registry read failed");
                default_agents()
            }
            Err(_) => {
                warn!(source = "registry", "agent registry read timed out");
                default_agents()
            }
        };

        Snapshot {
            timestamp: Utc::now(),
            orchestrator,
            activity: summarize_activity(&records),
            agents,
            metrics: summarize_metrics(&records),
            connected_viewers,
        }
    }
}

/// Fixed fallback roster so the snapshot shape never varies when the
/// registry is unreachable.
pub fn default_agents() -> Vec<AgentInfo> {
    vec![
        AgentInfo {
            agent_name: "JARVYS_DEV".to_string(),
            status: "offline".to_string(),
            environment: Some("Cloud".to_string()),
        },
        AgentInfo {
            agent_name: "JARVYS_AI".to_string(),
            status: "offline".to_string(),
            environment: Some("Local".to_string()),
        },
    ]
}

/// Window aggregates. An empty window means "all succeeded, nothing took
/// time": success_rate 1, avg 0, never a division by zero.
pub fn summarize_metrics(records: &[MetricRecord]) -> MetricsSummary {
    if records.is_empty() {
        return MetricsSummary::default();
    }
    let count = records.len() as f64;
    // Records are validated non-negative at ingestion; re-filter here so a
    // foreign writer can't push the aggregates negative.
    let cost: f64 = records
        .iter()
        .filter_map(|r| r.cost_usd)
        .filter(|c| c.is_finite() && *c >= 0.0)
        .sum();
    let response_total: f64 = records
        .iter()
        .filter_map(|r| r.response_time_ms)
        .filter(|t| t.is_finite() && *t >= 0.0)
        .sum();
    let successes = records.iter().filter(|r| r.success).count() as f64;
    MetricsSummary {
        daily_cost_usd: cost,
        daily_calls: records.len() as u64,
        avg_response_time_ms: response_total / count,
        success_rate: successes / count,
    }
}

pub fn summarize_activity(records: &[MetricRecord]) -> ActivitySummary {
    let recent_commits = records
        .iter()
        .filter(|r| r.event_type == "commit")
        .count() as u64;
    let recent_tasks = records
        .iter()
        .filter(|r| r.event_type.contains("task"))
        .count() as u64;
    let last_activity = records.iter().filter_map(|r| r.created_at).max();
    ActivitySummary {
        recent_commits,
        recent_tasks,
        last_activity,
    }
}

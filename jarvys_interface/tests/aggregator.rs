//! Snapshot assembly under source failure: every degrade path must yield
//! its documented default, never an error or a zeroed measurement.

use chrono::{DateTime, TimeZone, Utc};
use std::time::Duration;

use jarvys_interface::aggregator::{
    default_agents, summarize_activity, summarize_metrics, SnapshotAggregator,
};
use jarvys_interface::error::SourceError;
use jarvys_interface::sources::{AgentRegistry, MetricsSource, StatusSource};
use jarvys_interface::types::{
    AgentInfo, MetricRecord, OrchestratorState, OrchestratorStatus,
};

struct GoodStatus;
impl StatusSource for GoodStatus {
    async fn orchestrator_status(&self) -> Result<OrchestratorStatus, SourceError> {
        Ok(OrchestratorStatus {
            status: OrchestratorState::Running,
            pid: Some(42),
            cpu_percent: Some(1.5),
            memory_mb: Some(128.0),
            uptime: Some("3h7m".to_string()),
        })
    }
}

struct FailingStatus;
impl StatusSource for FailingStatus {
    async fn orchestrator_status(&self) -> Result<OrchestratorStatus, SourceError> {
        Err(SourceError::Unreachable("probe exploded".to_string()))
    }
}

struct HungStatus;
impl StatusSource for HungStatus {
    async fn orchestrator_status(&self) -> Result<OrchestratorStatus, SourceError> {
        std::future::pending().await
    }
}

struct EmptyMetrics;
impl MetricsSource for EmptyMetrics {
    async fn records_since(
        &self,
        _cutoff: DateTime<Utc>,
    ) -> Result<Vec<MetricRecord>, SourceError> {
        Ok(Vec::new())
    }
}

struct FailingMetrics;
impl MetricsSource for FailingMetrics {
    async fn records_since(
        &self,
        _cutoff: DateTime<Utc>,
    ) -> Result<Vec<MetricRecord>, SourceError> {
        Err(SourceError::NotConfigured)
    }
}

struct SomeAgents;
impl AgentRegistry for SomeAgents {
    async fn agents(&self) -> Result<Vec<AgentInfo>, SourceError> {
        Ok(vec![AgentInfo {
            agent_name: "JARVYS_DEV".to_string(),
            status: "online".to_string(),
            environment: Some("Cloud".to_string()),
        }])
    }
}

struct FailingAgents;
impl AgentRegistry for FailingAgents {
    async fn agents(&self) -> Result<Vec<AgentInfo>, SourceError> {
        Err(SourceError::Unreachable("registry down".to_string()))
    }
}

struct NoAgents;
impl AgentRegistry for NoAgents {
    async fn agents(&self) -> Result<Vec<AgentInfo>, SourceError> {
        Ok(Vec::new())
    }
}

fn record(event_type: &str, cost: Option<f64>, rt: Option<f64>, success: bool) -> MetricRecord {
    MetricRecord {
        agent_type: "JARVYS_DEV".to_string(),
        event_type: event_type.to_string(),
        service: None,
        model: None,
        tokens_used: None,
        cost_usd: cost,
        response_time_ms: rt,
        success,
        created_at: Some(Utc.with_ymd_and_hms(2026, 8, 25, 12, 0, 0).unwrap()),
    }
}

const TIMEOUT: Duration = Duration::from_millis(200);

#[tokio::test]
async fn healthy_sources_produce_full_snapshot() {
    let agg = SnapshotAggregator::new(GoodStatus, EmptyMetrics, SomeAgents, TIMEOUT);
    let snap = agg.produce_snapshot(3).await;
    assert_eq!(snap.orchestrator.status, OrchestratorState::Running);
    assert_eq!(snap.orchestrator.pid, Some(42));
    assert_eq!(snap.connected_viewers, 3);
    assert_eq!(snap.agents.len(), 1);
    assert_eq!(snap.agents[0].status, "online");
}

#[tokio::test]
async fn failed_probe_yields_unknown_with_absent_measurements() {
    let agg = SnapshotAggregator::new(FailingStatus, EmptyMetrics, SomeAgents, TIMEOUT);
    let snap = agg.produce_snapshot(0).await;
    assert_eq!(snap.orchestrator.status, OrchestratorState::Unknown);
    assert!(snap.orchestrator.pid.is_none());
    assert!(snap.orchestrator.cpu_percent.is_none());
    assert!(snap.orchestrator.memory_mb.is_none());
    assert!(snap.orchestrator.uptime.is_none());
}

#[tokio::test(start_paused = true)]
async fn hung_probe_is_cut_off_and_degrades_to_unknown() {
    let agg = SnapshotAggregator::new(HungStatus, EmptyMetrics, SomeAgents, TIMEOUT);
    let snap = agg.produce_snapshot(0).await;
    assert_eq!(snap.orchestrator.status, OrchestratorState::Unknown);
}

#[tokio::test]
async fn failed_metrics_window_degrades_to_empty_summary() {
    let agg = SnapshotAggregator::new(GoodStatus, FailingMetrics, SomeAgents, TIMEOUT);
    let snap = agg.produce_snapshot(0).await;
    assert_eq!(snap.metrics.daily_calls, 0);
    assert_eq!(snap.metrics.daily_cost_usd, 0.0);
    assert_eq!(snap.metrics.avg_response_time_ms, 0.0);
    assert_eq!(snap.metrics.success_rate, 1.0);
}

#[tokio::test]
async fn failed_registry_degrades_to_fixed_offline_roster() {
    let agg = SnapshotAggregator::new(GoodStatus, EmptyMetrics, FailingAgents, TIMEOUT);
    let snap = agg.produce_snapshot(0).await;
    assert_eq!(snap.agents.len(), 2);
    assert_eq!(snap.agents[0].agent_name, "JARVYS_DEV");
    assert_eq!(snap.agents[1].agent_name, "JARVYS_AI");
    assert!(snap.agents.iter().all(|a| a.status == "offline"));
}

#[tokio::test]
async fn empty_registry_also_uses_the_fixed_roster() {
    let agg = SnapshotAggregator::new(GoodStatus, EmptyMetrics, NoAgents, TIMEOUT);
    let snap = agg.produce_snapshot(0).await;
    assert_eq!(snap.agents.len(), default_agents().len());
}

#[test]
fn metrics_summary_aggregates_cost_latency_and_success() {
    let records = vec![
        record("api_call", Some(0.02), Some(100.0), true),
        record("api_call", Some(0.03), Some(300.0), true),
        record("task_run", None, None, false),
    ];
    let summary = summarize_metrics(&records);
    assert!((summary.daily_cost_usd - 0.05).abs() < 1e-9);
    assert_eq!(summary.daily_calls, 3);
    // Sum divided by record count, absent latencies contribute nothing.
    assert!((summary.avg_response_time_ms - (400.0 / 3.0)).abs() < 1e-9);
    assert!((summary.success_rate - (2.0 / 3.0)).abs() < 1e-9);
}

#[test]
fn negative_or_nonfinite_values_cannot_drag_aggregates_below_zero() {
    let records = vec![
        record("api_call", Some(-5.0), Some(f64::NAN), true),
        record("api_call", Some(0.01), Some(50.0), true),
    ];
    let summary = summarize_metrics(&records);
    assert!(summary.daily_cost_usd >= 0.0);
    assert!(summary.avg_response_time_ms >= 0.0);
}

#[test]
fn timeout_error_message_names_no_duration() {
    assert_eq!(SourceError::Timeout.to_string(), "source timed out");
}

#[test]
fn activity_counts_commits_and_tasks() {
    let records = vec![
        record("commit", None, None, true),
        record("commit", None, None, true),
        record("task_completed", None, None, true),
        record("api_call", None, None, true),
    ];
    let activity = summarize_activity(&records);
    assert_eq!(activity.recent_commits, 2);
    assert_eq!(activity.recent_tasks, 1);
    assert!(activity.last_activity.is_some());
}

//! External sources queried by the aggregator, behind traits so the
//! aggregator can degrade uniformly and tests can substitute failures.

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use std::future::Future;
use std::sync::Arc;
use sysinfo::{ProcessRefreshKind, ProcessesToUpdate, System, UpdateKind};
use tokio::sync::Mutex;

use crate::error::SourceError;
use crate::store::DatastoreClient;
use crate::types::{AgentInfo, MetricRecord, OrchestratorState, OrchestratorStatus};

pub trait StatusSource: Send + Sync {
    fn orchestrator_status(
        &self,
    ) -> impl Future<Output = Result<OrchestratorStatus, SourceError>> + Send;
}

pub trait MetricsSource: Send + Sync {
    fn records_since(
        &self,
        cutoff: DateTime<Utc>,
    ) -> impl Future<Output = Result<Vec<MetricRecord>, SourceError>> + Send;
}

pub trait AgentRegistry: Send + Sync {
    fn agents(&self) -> impl Future<Output = Result<Vec<AgentInfo>, SourceError>> + Send;
}

/// Scans the local process table for the orchestrator, the way the
/// dashboards report pid/CPU/memory/uptime.
pub struct ProcessStatusProbe {
    sys: Mutex<System>,
    process_name: String,
}

impl ProcessStatusProbe {
    pub fn new(process_name: String) -> Self {
        Self {
            sys: Mutex::new(System::new()),
            process_name,
        }
    }
}

impl StatusSource for ProcessStatusProbe {
    async fn orchestrator_status(&self) -> Result<OrchestratorStatus, SourceError> {
        let mut sys = self.sys.lock().await;
        let kind = ProcessRefreshKind::nothing()
            .with_cpu()
            .with_memory()
            .with_cmd(UpdateKind::Always);
        sys.refresh_processes_specifics(ProcessesToUpdate::All, true, kind);

        for process in sys.processes().values() {
            let name_match = process
                .name()
                .to_string_lossy()
                .contains(&self.process_name);
            let cmd_match = process
                .cmd()
                .iter()
                .any(|arg| arg.to_string_lossy().contains(&self.process_name));
            if name_match || cmd_match {
                let memory_mb = process.memory() as f64 / (1024.0 * 1024.0);
                return Ok(OrchestratorStatus {
                    status: OrchestratorState::Running,
                    pid: Some(process.pid().as_u32()),
                    cpu_percent: Some(process.cpu_usage()),
                    memory_mb: Some((memory_mb * 10.0).round() / 10.0),
                    uptime: Some(format_uptime(process.run_time())),
                });
            }
        }
        Ok(OrchestratorStatus::stopped())
    }
}

fn format_uptime(seconds: u64) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    format!("{hours}h{minutes}m")
}

/// Metric window reads backed by the hosted datastore.
pub struct DatastoreMetrics {
    store: Option<Arc<DatastoreClient>>,
}

impl DatastoreMetrics {
    pub fn new(store: Option<Arc<DatastoreClient>>) -> Self {
        Self { store }
    }
}

impl MetricsSource for DatastoreMetrics {
    async fn records_since(
        &self,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<MetricRecord>, SourceError> {
        let store = self.store.as_ref().ok_or(SourceError::NotConfigured)?;
        store.metrics_since(cutoff).await
    }
}

/// Agent roster reads backed by the hosted datastore.
pub struct DatastoreRegistry {
    store: Option<Arc<DatastoreClient>>,
}

impl DatastoreRegistry {
    pub fn new(store: Option<Arc<DatastoreClient>>) -> Self {
        Self { store }
    }
}

impl AgentRegistry for DatastoreRegistry {
    async fn agents(&self) -> Result<Vec<AgentInfo>, SourceError> {
        let store = self.store.as_ref().ok_or(SourceError::NotConfigured)?;
        store.agents().await
    }
}

/// Trailing window applied to metric reads at query time.
pub fn metrics_window() -> ChronoDuration {
    ChronoDuration::hours(24)
}

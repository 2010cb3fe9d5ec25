//! JARVYS command interface: aggregates orchestrator status, metrics, and
//! agent state into snapshots, and fans them out to dashboard viewers over
//! HTTP and WebSocket.

pub mod aggregator;
pub mod api;
pub mod config;
pub mod embedding;
pub mod error;
pub mod logs;
pub mod relay;
pub mod sources;
pub mod state;
pub mod store;
pub mod suggestions;
pub mod types;
pub mod ws;

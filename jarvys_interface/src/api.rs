//! HTTP surface: the explicit route table plus every request handler.
//! Every route except /health requires the shared-secret bearer token
//! when one is configured.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{info, warn};

use crate::config::Config;
use crate::error::ApiError;
use crate::state::AppState;
use crate::suggestions::ValidateOutcome;
use crate::types::{ChatMessage, ChatStatus, MetricRecord, SuggestionStatus, WsEvent};
use crate::ws::ws_handler;

const ENDPOINTS: &[&str] = &[
    "GET /",
    "GET /health",
    "GET /status",
    "GET /suggestions",
    "GET /logs",
    "POST /chat",
    "POST /validate",
    "POST /priority",
    "GET /api/metrics",
    "POST /api/metrics",
    "POST /api/memory",
    "POST /api/memory/search",
    "GET /ws",
];

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/status", get(status))
        .route("/suggestions", get(suggestions))
        .route("/logs", get(logs))
        .route("/chat", post(chat))
        .route("/validate", post(validate))
        .route("/priority", post(priority))
        .route("/api/metrics", get(metrics_summary).post(ingest_metric))
        .route("/api/memory", post(memory_insert))
        .route("/api/memory/search", post(memory_search))
        .route("/ws", get(ws_handler))
        .fallback(not_found)
        .with_state(state)
}

/// Shared-secret check. With no token configured the interface is open,
/// which is only sane on a loopback deployment.
pub fn require_auth(config: &Config, headers: &HeaderMap) -> Result<(), ApiError> {
    let Some(token) = &config.auth_token else {
        return Ok(());
    };
    let presented = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));
    match presented {
        Some(value) if value == token => Ok(()),
        _ => Err(ApiError::Auth),
    }
}

/// State-changing actions push a fresh snapshot without waiting for the
/// periodic tick. Runs off the request path so the caller's acknowledgment
/// is not delayed by source calls.
fn publish_soon(state: &Arc<AppState>) {
    let state = state.clone();
    tokio::spawn(async move {
        state.refresh_and_publish().await;
    });
}

fn body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    match payload {
        Ok(Json(value)) => Ok(value),
        Err(rejection) => Err(ApiError::Validation(rejection.body_text())),
    }
}

async fn root(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Value>, ApiError> {
    require_auth(&state.config, &headers)?;
    Ok(Json(json!({
        "service": "JARVYS Command Interface",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "active",
        "endpoints": ENDPOINTS,
    })))
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok", "timestamp": Utc::now() }))
}

async fn status(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    require_auth(&state.config, &headers)?;
    Ok(Json(state.current_snapshot().await))
}

async fn suggestions(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Value>, ApiError> {
    require_auth(&state.config, &headers)?;
    let mut list = state.suggestions.all().await;
    // Fresh process, nothing merged yet: seed from the datastore on demand.
    if list.is_empty() {
        if let Some(store) = &state.store {
            match store.pending_suggestions().await {
                Ok(rows) => {
                    state.suggestions.merge(rows).await;
                    list = state.suggestions.all().await;
                }
                Err(err) => warn!(source = "suggestions", error = %err, "suggestion read failed"),
            }
        }
    }
    Ok(Json(json!({ "suggestions": list })))
}

async fn logs(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Value>, ApiError> {
    require_auth(&state.config, &headers)?;
    let lines = state.relay.log_tail().await;
    Ok(Json(json!({
        "count": lines.len(),
        "logs": lines,
        "timestamp": Utc::now(),
    })))
}

#[derive(Deserialize)]
struct ChatRequest {
    message: String,
    #[serde(default)]
    timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    user_id: Option<String>,
}

async fn chat(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    require_auth(&state.config, &headers)?;
    let req = body(payload)?;
    let text = req.message.trim();
    if text.is_empty() {
        return Err(ApiError::Validation("message must not be empty".to_string()));
    }
    let mut message = ChatMessage {
        id: state.next_message_id(),
        message: text.to_string(),
        sender: req.user_id.unwrap_or_else(|| "user".to_string()),
        timestamp: req.timestamp.unwrap_or_else(Utc::now),
        status: ChatStatus::Pending,
    };
    if let Some(store) = &state.store {
        match store.insert_chat(&message).await {
            Ok(()) => message.status = ChatStatus::Sent,
            Err(err) => warn!(source = "chat", error = %err, "chat persist failed"),
        }
    }
    state.relay.broadcast(&WsEvent::ChatReceived(message.clone())).await;
    publish_soon(&state);
    info!(event = "chat_accepted", message_id = %message.id);
    Ok(Json(json!({ "success": true, "message_id": message.id })))
}

#[derive(Deserialize)]
struct ValidateRequest {
    task_id: String,
    action: String,
    #[serde(default)]
    priority: Option<u8>,
    #[serde(default)]
    comment: Option<String>,
}

async fn validate(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    payload: Result<Json<ValidateRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    require_auth(&state.config, &headers)?;
    let req = body(payload)?;
    let target = match req.action.as_str() {
        "approve" => SuggestionStatus::Approved,
        "reject" => SuggestionStatus::Rejected,
        other => {
            return Err(ApiError::Validation(format!(
                "action must be approve or reject, got {other:?}"
            )))
        }
    };
    if let Some(priority) = req.priority {
        if !(1..=3).contains(&priority) {
            return Err(ApiError::Validation("priority must be 1..=3".to_string()));
        }
    }

    let outcome = state
        .suggestions
        .validate(&req.task_id, target, req.priority)
        .await;
    let (status, applied) = match &outcome {
        ValidateOutcome::Applied(s) => (Some(s.status), true),
        ValidateOutcome::Noop(s) => (Some(s.status), false),
        ValidateOutcome::Unknown => (None, false),
    };

    // Record the decision even for ids this process has never seen; the
    // orchestrator reconciles against its own task list.
    if !matches!(&outcome, ValidateOutcome::Noop(_)) {
        if let Some(store) = &state.store {
            if let Err(err) = store
                .insert_validation(&req.task_id, &req.action, req.priority, req.comment.as_deref())
                .await
            {
                warn!(source = "validate", error = %err, "validation persist failed");
            }
        }
    }
    if applied {
        publish_soon(&state);
    }
    info!(event = "suggestion_validated", task_id = %req.task_id, action = %req.action);
    Ok(Json(json!({
        "success": true,
        "task_id": req.task_id,
        "status": status,
    })))
}

#[derive(Deserialize)]
struct PriorityRequest {
    task_id: String,
    priority: u8,
    #[serde(default)]
    notes: Option<String>,
}

async fn priority(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    payload: Result<Json<PriorityRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    require_auth(&state.config, &headers)?;
    let req = body(payload)?;
    if !(1..=3).contains(&req.priority) {
        return Err(ApiError::Validation("priority must be 1..=3".to_string()));
    }
    let mut warning = None;
    match &state.store {
        Some(store) => {
            if let Err(err) = store
                .upsert_priority(&req.task_id, req.priority, req.notes.as_deref())
                .await
            {
                warn!(source = "priority", error = %err, "priority persist failed");
                warning = Some(err.to_string());
            }
        }
        None => warning = Some("datastore not configured".to_string()),
    }
    let mut response = json!({ "success": true, "task_id": req.task_id });
    if let Some(warning) = warning {
        response["warning"] = json!(warning);
    }
    Ok(Json(response))
}

async fn metrics_summary(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    require_auth(&state.config, &headers)?;
    Ok(Json(state.current_snapshot().await.metrics))
}

/// Reporting agents must never be back-pressured: storage failures come
/// back as a success with a warning, never an error status.
async fn ingest_metric(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    payload: Result<Json<MetricRecord>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    require_auth(&state.config, &headers)?;
    let mut record = body(payload)?;
    validate_metric(&record)?;
    record.created_at = Some(Utc::now());

    let mut warning = None;
    match &state.store {
        Some(store) => {
            if let Err(err) = store.insert_metric(&record).await {
                warn!(source = "metrics", error = %err, "metric persist failed");
                warning = Some(err.to_string());
            }
        }
        None => warning = Some("datastore not configured".to_string()),
    }
    let mut response = json!({ "success": true });
    if let Some(warning) = warning {
        response["warning"] = json!(warning);
    }
    Ok(Json(response))
}

fn validate_metric(record: &MetricRecord) -> Result<(), ApiError> {
    if record.agent_type.trim().is_empty() {
        return Err(ApiError::Validation("agent_type must not be empty".to_string()));
    }
    if record.event_type.trim().is_empty() {
        return Err(ApiError::Validation("event_type must not be empty".to_string()));
    }
    for (field, value) in [
        ("cost_usd", record.cost_usd),
        ("response_time_ms", record.response_time_ms),
    ] {
        if let Some(v) = value {
            if !v.is_finite() || v < 0.0 {
                return Err(ApiError::Validation(format!(
                    "{field} must be a non-negative number"
                )));
            }
        }
    }
    Ok(())
}

async fn memory_insert(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    payload: Result<Json<crate::types::MemoryInsert>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    require_auth(&state.config, &headers)?;
    let req = body(payload)?;
    if req.content.trim().is_empty() {
        return Err(ApiError::Validation("content must not be empty".to_string()));
    }
    let store = state
        .store
        .as_ref()
        .ok_or_else(|| anyhow::anyhow!("datastore not configured"))?;

    // Embedding is best-effort; the content commits with or without it.
    let mut embedding_failed = false;
    let embedding = match &state.embeddings {
        Some(client) => match client.embed(&req.content).await {
            Ok(vector) => Some(vector),
            Err(err) => {
                warn!(source = "embedding", error = %err, "embedding generation failed");
                embedding_failed = true;
                None
            }
        },
        None => None,
    };

    store
        .insert_memory(
            &req.content,
            req.agent_source.as_deref(),
            req.memory_type.as_deref(),
            req.user_context.as_deref(),
            req.importance_score.unwrap_or(0.5),
            embedding.as_deref(),
        )
        .await
        .map_err(|err| anyhow::anyhow!("memory insert failed: {err}"))?;

    let mut response = json!({
        "success": true,
        "embedding_generated": embedding.is_some(),
    });
    if embedding_failed {
        response["warning"] = json!("Embedding failed");
    }
    Ok(Json(response))
}

#[derive(Deserialize)]
struct MemorySearchRequest {
    query: String,
    #[serde(default)]
    user_context: Option<String>,
    #[serde(default)]
    limit: Option<usize>,
}

async fn memory_search(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    payload: Result<Json<MemorySearchRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    require_auth(&state.config, &headers)?;
    let req = body(payload)?;
    let store = state
        .store
        .as_ref()
        .ok_or_else(|| anyhow::anyhow!("datastore not configured"))?;
    let hits = store
        .search_memory(
            &req.query,
            req.user_context.as_deref(),
            req.limit.unwrap_or(10).min(50),
        )
        .await
        .map_err(|err| anyhow::anyhow!("memory search failed: {err}"))?;
    Ok(Json(json!({ "results": hits })))
}

async fn not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "error": "not found", "endpoints": ENDPOINTS })),
    )
}

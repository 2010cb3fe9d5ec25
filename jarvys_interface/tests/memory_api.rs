//! Memory writes against a stub datastore and embedding provider: the
//! content must commit even when embedding generation fails, and the
//! response must say whether a vector was attached.

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};

use jarvys_interface::api;
use jarvys_interface::config::Config;
use jarvys_interface::state::AppState;

const TOKEN: &str = "test-secret";

type Rows = Arc<Mutex<Vec<Value>>>;

#[derive(Clone)]
struct StubState {
    rows: Rows,
    fail_embeddings: bool,
}

async fn stub_insert(State(stub): State<StubState>, Json(body): Json<Value>) -> StatusCode {
    stub.rows.lock().unwrap().push(body);
    StatusCode::CREATED
}

async fn stub_embeddings(State(stub): State<StubState>) -> Result<Json<Value>, StatusCode> {
    if stub.fail_embeddings {
        return Err(StatusCode::INTERNAL_SERVER_ERROR);
    }
    Ok(Json(json!({ "data": [{ "embedding": [0.1, 0.2, 0.3] }] })))
}

/// One listener playing both external roles: the datastore REST surface
/// and the embedding provider.
async fn spawn_stub(fail_embeddings: bool) -> (String, Rows) {
    let rows: Rows = Arc::new(Mutex::new(Vec::new()));
    let app = Router::new()
        .route("/rest/v1/jarvys_memory", post(stub_insert))
        .route("/v1/embeddings", post(stub_embeddings))
        .with_state(StubState {
            rows: rows.clone(),
            fail_embeddings,
        });
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind stub");
    let base = format!("http://{}", listener.local_addr().expect("stub addr"));
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve stub");
    });
    (base, rows)
}

async fn spawn_interface(stub_base: &str) -> String {
    let config = Config {
        auth_token: Some(TOKEN.to_string()),
        supabase_url: Some(stub_base.to_string()),
        supabase_key: Some("stub-key".to_string()),
        openai_api_key: Some("stub-key".to_string()),
        openai_base_url: format!("{stub_base}/v1"),
        orchestrator_process: "jarvys_test_no_such_process".to_string(),
        ..Config::default()
    };
    let state = AppState::new(config);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind interface");
    let base = format!("http://{}", listener.local_addr().expect("addr"));
    tokio::spawn(async move {
        axum::serve(listener, api::router(state)).await.expect("serve");
    });
    base
}

#[tokio::test]
async fn embedding_failure_still_commits_the_content() {
    let (stub_base, rows) = spawn_stub(true).await;
    let base = spawn_interface(&stub_base).await;

    let resp = reqwest::Client::new()
        .post(format!("{base}/api/memory"))
        .bearer_auth(TOKEN)
        .json(&json!({ "content": "remember the milk" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["success"], true);
    assert_eq!(body["embedding_generated"], false);
    assert_eq!(body["warning"], "Embedding failed");

    let rows = rows.lock().unwrap();
    assert_eq!(rows.len(), 1, "content row must still be inserted");
    assert_eq!(rows[0]["content"], "remember the milk");
    assert!(rows[0].get("embedding").is_none());
}

#[tokio::test]
async fn successful_embedding_is_attached_to_the_row() {
    let (stub_base, rows) = spawn_stub(false).await;
    let base = spawn_interface(&stub_base).await;

    let resp = reqwest::Client::new()
        .post(format!("{base}/api/memory"))
        .bearer_auth(TOKEN)
        .json(&json!({ "content": "vector me", "importance_score": 0.9 }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["success"], true);
    assert_eq!(body["embedding_generated"], true);
    assert!(body.get("warning").is_none());

    let rows = rows.lock().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["embedding"].as_array().unwrap().len(), 3);
    assert_eq!(rows[0]["importance_score"], 0.9);
}

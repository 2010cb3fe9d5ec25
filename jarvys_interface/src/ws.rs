//! Live viewer endpoint. Each connection gets its own relay channel; a
//! write task drains the channel into the socket while the read loop
//! answers pings and on-demand status requests.

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;
use tracing::{debug, info};

use crate::api::require_auth;
use crate::state::AppState;
use crate::types::{ViewerRequest, WsEvent};

pub async fn ws_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    ws: WebSocketUpgrade,
) -> Response {
    if let Err(err) = require_auth(&state.config, &headers) {
        return err.into_response();
    }
    ws.on_upgrade(move |socket| handle_socket(state, socket))
}

async fn handle_socket(state: Arc<AppState>, socket: WebSocket) {
    let initial = state.current_snapshot().await;
    let mut handle = state.relay.attach(initial).await;
    let conn_id = handle.id;

    let (mut sink, mut stream) = socket.split();
    let writer = tokio::spawn(async move {
        while let Some(text) = handle.rx.recv().await {
            if sink.send(Message::Text(text)).await.is_err() {
                break;
            }
        }
        let _ = sink.close().await;
    });

    while let Some(Ok(msg)) = stream.next().await {
        match msg {
            Message::Text(text) => match serde_json::from_str::<ViewerRequest>(&text) {
                Ok(ViewerRequest::Ping) => {
                    state.relay.send_to(conn_id, &WsEvent::Pong).await;
                }
                Ok(ViewerRequest::RequestStatus) => {
                    let snapshot = state.current_snapshot().await;
                    state
                        .relay
                        .send_to(conn_id, &WsEvent::StatusUpdate(snapshot))
                        .await;
                }
                Err(err) => {
                    debug!(conn_id, error = %err, "ignoring unrecognized viewer message");
                }
            },
            Message::Close(_) => break,
            _ => {}
        }
    }

    // Detach drops the relay's sender, which ends the writer's recv loop.
    state.relay.detach(conn_id).await;
    let _ = writer.await;
    info!(event = "viewer_closed", conn_id);
}

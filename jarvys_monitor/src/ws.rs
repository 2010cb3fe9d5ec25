//! WebSocket client helpers for the interface's /ws endpoint.

use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::{connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream};

use crate::types::DashboardEvent;

pub type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// What the event loop saw on the socket this tick.
pub enum Incoming {
    Event(DashboardEvent),
    Idle,
    Closed,
}

// Connect to the interface, attaching the bearer token when one is set
pub async fn connect(url: &str, token: Option<&str>) -> anyhow::Result<WsStream> {
    let mut request = url.into_client_request()?;
    if let Some(token) = token {
        request
            .headers_mut()
            .insert("Authorization", format!("Bearer {token}").parse()?);
    }
    let (ws, _) = connect_async(request).await?;
    Ok(ws)
}

pub async fn request_status(ws: &mut WsStream) -> bool {
    ws.send(Message::Text(r#"{"type":"request_status"}"#.into()))
        .await
        .is_ok()
}

pub async fn send_ping(ws: &mut WsStream) -> bool {
    ws.send(Message::Text(r#"{"type":"ping"}"#.into()))
        .await
        .is_ok()
}

// Wait up to `wait` for the next pushed event
pub async fn next_event(ws: &mut WsStream, wait: std::time::Duration) -> Incoming {
    match tokio::time::timeout(wait, ws.next()).await {
        Err(_) => Incoming::Idle,
        Ok(None) => Incoming::Closed,
        Ok(Some(Err(_))) => Incoming::Closed,
        Ok(Some(Ok(Message::Text(json)))) => match serde_json::from_str(&json) {
            Ok(event) => Incoming::Event(event),
            Err(_) => Incoming::Idle,
        },
        Ok(Some(Ok(Message::Close(_)))) => Incoming::Closed,
        Ok(Some(Ok(_))) => Incoming::Idle,
    }
}

// Re-export SinkExt/StreamExt for call sites
use futures_util::{SinkExt, StreamExt};

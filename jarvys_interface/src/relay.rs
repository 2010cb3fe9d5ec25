//! Viewer fan-out: the registry of attached channels, the latest-snapshot
//! cache, and the bounded log ring. Broadcast iterates a copy of the channel
//! set, so a detach mid-broadcast can never corrupt iteration, and a dead
//! channel is detached without affecting the others.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;
use tokio::sync::{mpsc, RwLock};
use tokio::time::{timeout, Duration};
use tracing::{info, warn};

use crate::types::{Snapshot, WsEvent};

const CHANNEL_BUFFER: usize = 64;

/// One attached viewer. Dropping the handle (or calling detach) ends the
/// channel; detaching twice is a no-op.
pub struct ChannelHandle {
    pub id: u64,
    pub rx: mpsc::Receiver<String>,
}

struct CachedSnapshot {
    snapshot: Snapshot,
    produced_at: Instant,
}

pub struct UpdateRelay {
    channels: RwLock<HashMap<u64, mpsc::Sender<String>>>,
    next_id: AtomicU64,
    latest: RwLock<Option<CachedSnapshot>>,
    logs: RwLock<VecDeque<String>>,
    log_capacity: usize,
    send_timeout: Duration,
}

impl UpdateRelay {
    pub fn new(log_capacity: usize, send_timeout: Duration) -> Self {
        Self {
            channels: RwLock::new(HashMap::new()),
            next_id: AtomicU64::new(1),
            latest: RwLock::new(None),
            logs: RwLock::new(VecDeque::with_capacity(log_capacity)),
            log_capacity,
            send_timeout,
        }
    }

    /// Registers a new viewer channel. The `initial_status` message is queued
    /// before the channel joins the broadcast set, so it is always the first
    /// thing a viewer receives. The count only reflects this viewer in
    /// snapshots produced after attach.
    pub async fn attach(&self, initial: Snapshot) -> ChannelHandle {
        let (tx, rx) = mpsc::channel(CHANNEL_BUFFER);
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        if let Ok(text) = serde_json::to_string(&WsEvent::InitialStatus(initial)) {
            // Freshly created channel with free capacity: cannot block.
            let _ = tx.send(text).await;
        }
        self.channels.write().await.insert(id, tx);
        info!(event = "viewer_attached", conn_id = id);
        ChannelHandle { id, rx }
    }

    /// Idempotent: detaching an already-detached channel is a no-op.
    pub async fn detach(&self, id: u64) {
        if self.channels.write().await.remove(&id).is_some() {
            info!(event = "viewer_detached", conn_id = id);
        }
    }

    pub async fn viewer_count(&self) -> usize {
        self.channels.read().await.len()
    }

    /// Fire-and-forget delivery to every attached channel. A failed or slow
    /// channel is detached; the rest still receive the message.
    pub async fn broadcast(&self, event: &WsEvent) {
        let text = match serde_json::to_string(event) {
            Ok(text) => text,
            Err(err) => {
                warn!(error = %err, "unserializable broadcast dropped");
                return;
            }
        };
        let targets: Vec<(u64, mpsc::Sender<String>)> = {
            let channels = self.channels.read().await;
            channels.iter().map(|(id, tx)| (*id, tx.clone())).collect()
        };
        for (id, tx) in targets {
            match timeout(self.send_timeout, tx.send(text.clone())).await {
                Ok(Ok(())) => {}
                _ => {
                    warn!(event = "send_error", conn_id = id);
                    self.detach(id).await;
                }
            }
        }
    }

    /// Bounded direct send to a single channel, used for ping replies and
    /// per-viewer status requests.
    pub async fn send_to(&self, id: u64, event: &WsEvent) {
        let Ok(text) = serde_json::to_string(event) else {
            return;
        };
        let tx = { self.channels.read().await.get(&id).cloned() };
        if let Some(tx) = tx {
            match timeout(self.send_timeout, tx.send(text)).await {
                Ok(Ok(())) => {}
                _ => {
                    warn!(event = "send_error", conn_id = id);
                    self.detach(id).await;
                }
            }
        }
    }

    /// Replaces the cached snapshot atomically, then fans it out.
    pub async fn publish_snapshot(&self, snapshot: Snapshot) {
        self.store_snapshot(snapshot.clone()).await;
        self.broadcast(&WsEvent::StatusUpdate(snapshot)).await;
    }

    /// Cache-only update, used by the poll path when it recomputes.
    pub async fn store_snapshot(&self, snapshot: Snapshot) {
        *self.latest.write().await = Some(CachedSnapshot {
            snapshot,
            produced_at: Instant::now(),
        });
    }

    /// The cached snapshot, if one exists no older than `max_age`.
    pub async fn fresh_snapshot(&self, max_age: Duration) -> Option<Snapshot> {
        let latest = self.latest.read().await;
        latest
            .as_ref()
            .filter(|cached| cached.produced_at.elapsed() <= max_age)
            .map(|cached| cached.snapshot.clone())
    }

    pub async fn latest_snapshot(&self) -> Option<Snapshot> {
        let latest = self.latest.read().await;
        latest.as_ref().map(|cached| cached.snapshot.clone())
    }

    /// Appends log lines, discarding the oldest beyond the retained bound,
    /// and broadcasts the resulting tail (most-recent-last).
    pub async fn push_logs(&self, lines: Vec<String>) {
        if lines.is_empty() {
            return;
        }
        let tail = {
            let mut logs = self.logs.write().await;
            for line in lines {
                if logs.len() == self.log_capacity {
                    logs.pop_front();
                }
                logs.push_back(line);
            }
            logs.iter().cloned().collect::<Vec<_>>()
        };
        self.broadcast(&WsEvent::LogsUpdate(tail)).await;
    }

    pub async fn log_tail(&self) -> Vec<String> {
        self.logs.read().await.iter().cloned().collect()
    }
}

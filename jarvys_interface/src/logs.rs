//! Orchestrator log tailer. Polls the configured file and feeds complete
//! new lines into the relay's bounded ring, which broadcasts a logs_update.

use std::io::SeekFrom;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncSeekExt};
use tokio::time::Duration;
use tracing::warn;

use crate::relay::UpdateRelay;

const POLL_INTERVAL: Duration = Duration::from_secs(2);

pub async fn tail_into_relay(path: PathBuf, relay: Arc<UpdateRelay>) {
    let mut offset: u64 = 0;
    let mut interval = tokio::time::interval(POLL_INTERVAL);
    loop {
        interval.tick().await;
        let len = match tokio::fs::metadata(&path).await {
            Ok(meta) => meta.len(),
            // Absent until the orchestrator first writes; keep polling.
            Err(_) => continue,
        };
        if len < offset {
            // Truncated or rotated; start over from the top.
            offset = 0;
        }
        if len == offset {
            continue;
        }
        match read_new_lines(&path, offset).await {
            Ok((lines, new_offset)) => {
                offset = new_offset;
                relay.push_logs(lines).await;
            }
            Err(err) => {
                warn!(source = "logs", error = %err, "log read failed");
            }
        }
    }
}

/// Reads from `offset` to the end of the file, returning only complete
/// lines. A trailing partial line stays unread until its newline arrives.
pub async fn read_new_lines(path: &Path, offset: u64) -> std::io::Result<(Vec<String>, u64)> {
    let mut file = tokio::fs::File::open(path).await?;
    file.seek(SeekFrom::Start(offset)).await?;
    let mut buf = Vec::new();
    file.read_to_end(&mut buf).await?;

    let Some(last_newline) = buf.iter().rposition(|&b| b == b'\n') else {
        return Ok((Vec::new(), offset));
    };
    let complete = &buf[..=last_newline];
    let lines = String::from_utf8_lossy(complete)
        .lines()
        .map(str::to_string)
        .collect();
    Ok((lines, offset + complete.len() as u64))
}

//! Snapshot subscription over the server's WebSocket channel.

use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{debug, info, warn};

use songsync_core::messages::msg_types;
use songsync_core::{ClientMessage, ServerMessage, Track};

use crate::error::ViewerError;

/// A live stream of catalog snapshots.
///
/// A transport failure yields one empty snapshot, after which the stream
/// ends. Dropping the subscription closes the connection.
pub struct Subscription {
    snapshots: mpsc::Receiver<Vec<Track>>,
    task: JoinHandle<()>,
}

impl Subscription {
    /// Wait for the next snapshot. `None` once the connection is gone.
    pub async fn next_snapshot(&mut self) -> Option<Vec<Track>> {
        self.snapshots.recv().await
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Turn an `http://` base URL into the server's WebSocket endpoint.
pub fn ws_url(base_url: &str) -> String {
    let base = base_url.trim_end_matches('/');
    let base = if let Some(rest) = base.strip_prefix("https://") {
        format!("wss://{}", rest)
    } else if let Some(rest) = base.strip_prefix("http://") {
        format!("ws://{}", rest)
    } else {
        base.to_string()
    };
    format!("{}/ws", base)
}

/// Connect to `ws_url`, ask for the catalog, and stream every snapshot
/// carrying `event_name`.
pub fn subscribe(ws_url: impl Into<String>, event_name: impl Into<String>) -> Subscription {
    let (tx, rx) = mpsc::channel(16);
    let ws_url = ws_url.into();
    let event_name = event_name.into();

    let task = tokio::spawn(async move {
        if let Err(e) = run(&ws_url, &event_name, &tx).await {
            warn!("Catalog subscription to {} failed: {}", ws_url, e);
            let _ = tx.send(Vec::new()).await;
        }
    });

    Subscription {
        snapshots: rx,
        task,
    }
}

async fn run(
    ws_url: &str,
    event_name: &str,
    tx: &mpsc::Sender<Vec<Track>>,
) -> Result<(), ViewerError> {
    let (mut ws, _) = connect_async(ws_url).await?;
    info!("Subscribed to {}", ws_url);

    let request = serde_json::to_string(&ClientMessage::new(msg_types::GET_MUSIC_LIST))?;
    ws.send(Message::Text(request.into())).await?;

    while let Some(frame) = ws.next().await {
        let text = match frame? {
            Message::Text(text) => text,
            Message::Close(_) => break,
            _ => continue,
        };
        let msg: ServerMessage = match serde_json::from_str(&text) {
            Ok(msg) => msg,
            Err(e) => {
                debug!("Ignoring undecodable frame: {}", e);
                continue;
            }
        };
        if let Some(tracks) = msg.as_snapshot(event_name) {
            if tx.send(tracks).await.is_err() {
                break;
            }
        } else if msg.msg_type == msg_types::ERROR {
            warn!("Server reported error: {}", msg.payload);
        }
    }

    info!("Subscription to {} closed", ws_url);
    Ok(())
}

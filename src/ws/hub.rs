//! Registry of connected viewers.
//!
//! Each viewer has two lanes. Snapshots go into a `watch` slot that holds
//! only the newest one, so a slow viewer skips stale snapshots but always
//! ends on the latest. Direct replies (pong, errors) go through a small
//! bounded queue. Nothing here ever waits on a viewer.

use std::collections::HashMap;

use tokio::sync::{mpsc, watch, RwLock};
use tracing::debug;
use uuid::Uuid;

use songsync_core::ServerMessage;

pub type ConnectionId = Uuid;

/// Error type for targeted sends.
#[derive(Debug, Clone, PartialEq)]
pub enum SendError {
    /// No viewer with this id is registered.
    NotConnected,
    /// The viewer's queue is closed (it disconnected).
    Disconnected,
    /// The viewer's reply queue is full.
    Full,
}

/// Outcome of a broadcast.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BroadcastReport {
    pub delivered: usize,
    pub dropped: usize,
}

struct ConnectionEntry {
    replies: mpsc::Sender<ServerMessage>,
    snapshots: watch::Sender<Option<ServerMessage>>,
}

/// Receiving end of one viewer's lanes.
pub struct ViewerQueue {
    replies: mpsc::Receiver<ServerMessage>,
    snapshots: watch::Receiver<Option<ServerMessage>>,
}

impl ViewerQueue {
    /// Wait for the next message. Pending replies go first. `None` once the
    /// viewer has been unregistered.
    pub async fn recv(&mut self) -> Option<ServerMessage> {
        loop {
            tokio::select! {
                biased;
                reply = self.replies.recv() => return reply,
                changed = self.snapshots.changed() => {
                    changed.ok()?;
                    if let Some(msg) = self.snapshots.borrow_and_update().clone() {
                        return Some(msg);
                    }
                }
            }
        }
    }

    /// Take the next message if one is ready.
    pub fn try_recv(&mut self) -> Option<ServerMessage> {
        if let Ok(reply) = self.replies.try_recv() {
            return Some(reply);
        }
        if self.snapshots.has_changed().unwrap_or(false) {
            return self.snapshots.borrow_and_update().clone();
        }
        None
    }
}

pub struct ConnectionHub {
    connections: RwLock<HashMap<ConnectionId, ConnectionEntry>>,
    capacity: usize,
}

impl Default for ConnectionHub {
    fn default() -> Self {
        Self::new(32)
    }
}

impl ConnectionHub {
    /// `capacity` bounds each viewer's reply queue.
    pub fn new(capacity: usize) -> Self {
        Self {
            connections: RwLock::new(HashMap::new()),
            capacity: capacity.max(1),
        }
    }

    /// Register a new viewer.
    ///
    /// Returns its id and the queue the caller forwards to the socket.
    pub async fn register(&self) -> (ConnectionId, ViewerQueue) {
        let (replies_tx, replies_rx) = mpsc::channel(self.capacity);
        let (snapshots_tx, snapshots_rx) = watch::channel(None);
        let id = Uuid::new_v4();
        self.connections.write().await.insert(
            id,
            ConnectionEntry {
                replies: replies_tx,
                snapshots: snapshots_tx,
            },
        );
        (
            id,
            ViewerQueue {
                replies: replies_rx,
                snapshots: snapshots_rx,
            },
        )
    }

    pub async fn unregister(&self, id: ConnectionId) {
        self.connections.write().await.remove(&id);
    }

    /// Queue a direct reply to one viewer.
    pub async fn send_to(&self, id: ConnectionId, message: ServerMessage) -> Result<(), SendError> {
        let conns = self.connections.read().await;
        let entry = conns.get(&id).ok_or(SendError::NotConnected)?;
        entry.replies.try_send(message).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => SendError::Full,
            mpsc::error::TrySendError::Closed(_) => SendError::Disconnected,
        })
    }

    /// Replace one viewer's pending snapshot.
    pub async fn send_snapshot_to(
        &self,
        id: ConnectionId,
        message: ServerMessage,
    ) -> Result<(), SendError> {
        let conns = self.connections.read().await;
        let entry = conns.get(&id).ok_or(SendError::NotConnected)?;
        entry
            .snapshots
            .send(Some(message))
            .map_err(|_| SendError::Disconnected)
    }

    /// Replace the pending snapshot of every registered viewer.
    pub async fn broadcast(&self, message: ServerMessage) -> BroadcastReport {
        let mut report = BroadcastReport::default();
        let mut closed = Vec::new();

        {
            let conns = self.connections.read().await;
            for (id, entry) in conns.iter() {
                if entry.snapshots.send(Some(message.clone())).is_ok() {
                    report.delivered += 1;
                } else {
                    report.dropped += 1;
                    closed.push(*id);
                }
            }
        }

        if !closed.is_empty() {
            let mut conns = self.connections.write().await;
            for id in &closed {
                conns.remove(id);
            }
            debug!("Pruned {} closed viewer connections", closed.len());
        }

        report
    }

    pub async fn connection_count(&self) -> usize {
        self.connections.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_broadcast_reaches_every_viewer() {
        let hub = ConnectionHub::new(8);
        let (_, mut rx1) = hub.register().await;
        let (_, mut rx2) = hub.register().await;

        let report = hub.broadcast(ServerMessage::empty("tick")).await;

        assert_eq!(report, BroadcastReport { delivered: 2, dropped: 0 });
        assert_eq!(rx1.try_recv().unwrap().msg_type, "tick");
        assert_eq!(rx2.try_recv().unwrap().msg_type, "tick");
        assert!(rx1.try_recv().is_none());
    }

    #[tokio::test]
    async fn test_slow_viewer_ends_on_latest_snapshot() {
        let hub = ConnectionHub::new(1);
        let (_, mut slow) = hub.register().await;
        let (_, mut live) = hub.register().await;

        for n in 1..=5 {
            let report = hub.broadcast(ServerMessage::empty(format!("v{}", n))).await;
            assert_eq!(report, BroadcastReport { delivered: 2, dropped: 0 });
            assert_eq!(live.try_recv().unwrap().msg_type, format!("v{}", n));
        }

        // Older unread snapshots are superseded, the newest survives.
        assert_eq!(slow.recv().await.unwrap().msg_type, "v5");
        assert!(slow.try_recv().is_none());
    }

    #[tokio::test]
    async fn test_replies_come_before_snapshot() {
        let hub = ConnectionHub::new(4);
        let (id, mut rx) = hub.register().await;

        hub.broadcast(ServerMessage::empty("snapshot")).await;
        hub.send_to(id, ServerMessage::empty("pong")).await.unwrap();

        assert_eq!(rx.recv().await.unwrap().msg_type, "pong");
        assert_eq!(rx.recv().await.unwrap().msg_type, "snapshot");
    }

    #[tokio::test]
    async fn test_full_reply_queue() {
        let hub = ConnectionHub::new(1);
        let (id, _rx) = hub.register().await;

        hub.send_to(id, ServerMessage::empty("pong")).await.unwrap();
        assert_eq!(
            hub.send_to(id, ServerMessage::empty("pong")).await,
            Err(SendError::Full)
        );
        // A full reply queue does not block snapshots.
        assert_eq!(hub.broadcast(ServerMessage::empty("tick")).await.delivered, 1);
    }

    #[tokio::test]
    async fn test_closed_viewers_are_pruned() {
        let hub = ConnectionHub::new(4);
        let (_, rx) = hub.register().await;
        let (_, mut live) = hub.register().await;
        drop(rx);

        let report = hub.broadcast(ServerMessage::empty("tick")).await;

        assert_eq!(report, BroadcastReport { delivered: 1, dropped: 1 });
        assert_eq!(hub.connection_count().await, 1);
        assert!(live.try_recv().is_some());
    }

    #[tokio::test]
    async fn test_send_to() {
        let hub = ConnectionHub::new(4);
        let (id, mut rx) = hub.register().await;

        hub.send_to(id, ServerMessage::empty("pong")).await.unwrap();
        assert_eq!(rx.try_recv().unwrap().msg_type, "pong");

        hub.send_snapshot_to(id, ServerMessage::empty("snapshot"))
            .await
            .unwrap();
        assert_eq!(rx.try_recv().unwrap().msg_type, "snapshot");

        hub.unregister(id).await;
        assert_eq!(
            hub.send_to(id, ServerMessage::empty("pong")).await,
            Err(SendError::NotConnected)
        );
        assert!(rx.recv().await.is_none());
    }
}

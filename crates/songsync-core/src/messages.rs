//! WebSocket message envelopes shared by the server and viewers.
//!
//! Every frame is a JSON object `{"type": ..., "payload": ...}`. Catalog
//! snapshots use a configurable event name; the other types are fixed.

use serde::{Deserialize, Serialize};

use crate::track::Track;

/// Event name used for catalog snapshots unless configured otherwise.
pub const DEFAULT_SNAPSHOT_EVENT: &str = "updateMusicList";

/// Server -> Client message envelope.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServerMessage {
    #[serde(rename = "type")]
    pub msg_type: String,
    pub payload: serde_json::Value,
}

impl ServerMessage {
    pub fn new(msg_type: impl Into<String>, payload: impl Serialize) -> Self {
        Self {
            msg_type: msg_type.into(),
            payload: serde_json::to_value(payload).unwrap_or(serde_json::Value::Null),
        }
    }

    pub fn empty(msg_type: impl Into<String>) -> Self {
        Self {
            msg_type: msg_type.into(),
            payload: serde_json::Value::Null,
        }
    }

    /// Full catalog snapshot under the given event name.
    pub fn snapshot(event_name: &str, tracks: &[Track]) -> Self {
        Self::new(event_name, tracks)
    }

    /// Decode the payload as a snapshot if this message carries `event_name`.
    pub fn as_snapshot(&self, event_name: &str) -> Option<Vec<Track>> {
        if self.msg_type != event_name {
            return None;
        }
        serde_json::from_value(self.payload.clone()).ok()
    }
}

/// Client -> Server message envelope.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClientMessage {
    #[serde(rename = "type")]
    pub msg_type: String,
    #[serde(default)]
    pub payload: serde_json::Value,
}

impl ClientMessage {
    pub fn new(msg_type: impl Into<String>) -> Self {
        Self {
            msg_type: msg_type.into(),
            payload: serde_json::Value::Null,
        }
    }
}

/// Payloads of the non-snapshot messages.
pub mod system {
    use serde::{Deserialize, Serialize};

    /// Sent once right after the connection is established.
    #[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
    pub struct Connected {
        pub connection_id: String,
    }

    #[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
    pub struct Error {
        pub code: String,
        pub message: String,
    }

    impl Error {
        pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
            Self {
                code: code.into(),
                message: message.into(),
            }
        }
    }
}

/// Reserved message type constants.
pub mod msg_types {
    /// Sent by server on successful connection.
    pub const CONNECTED: &str = "connected";
    /// Viewer asks for the catalog right now.
    pub const GET_MUSIC_LIST: &str = "getMusicList";
    pub const PING: &str = "ping";
    pub const PONG: &str = "pong";
    pub const ERROR: &str = "error";
}

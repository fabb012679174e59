//! WebSocket push channel for catalog snapshots.

pub mod handler;
pub mod hub;

pub use hub::{BroadcastReport, ConnectionHub, ConnectionId, SendError, ViewerQueue};

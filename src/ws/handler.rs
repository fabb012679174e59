//! WebSocket route handler.
//!
//! Handles upgrade, the message loop, and cleanup.

use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::Response,
};
use futures::{
    stream::{SplitSink, SplitStream},
    SinkExt, StreamExt,
};
use tracing::{debug, error, info};

use songsync_core::messages::{msg_types, system};
use songsync_core::{ClientMessage, ServerMessage};

use super::hub::{ConnectionId, ViewerQueue};
use crate::service::SyncService;
use crate::state::AppState;

/// Route handler for `GET /ws`.
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state.service))
}

async fn handle_socket(socket: WebSocket, service: Arc<SyncService>) {
    let (id, outgoing_rx) = service.hub().register().await;
    info!("Viewer connected: {}", id);

    let (ws_sink, ws_stream) = socket.split();

    let connected = ServerMessage::new(
        msg_types::CONNECTED,
        system::Connected {
            connection_id: id.to_string(),
        },
    );

    let outgoing_handle = tokio::spawn(forward_outgoing(ws_sink, outgoing_rx, connected));

    process_incoming(ws_stream, id, &service).await;

    info!("Viewer disconnected: {}", id);
    outgoing_handle.abort();
    service.hub().unregister(id).await;
}

/// Forward messages from the viewer's queue to the socket.
async fn forward_outgoing(
    mut ws_sink: SplitSink<WebSocket, Message>,
    mut outgoing_rx: ViewerQueue,
    initial_msg: ServerMessage,
) {
    if send_json(&mut ws_sink, &initial_msg).await.is_err() {
        return;
    }

    while let Some(msg) = outgoing_rx.recv().await {
        if send_json(&mut ws_sink, &msg).await.is_err() {
            break;
        }
    }
}

async fn send_json(
    ws_sink: &mut SplitSink<WebSocket, Message>,
    msg: &ServerMessage,
) -> Result<(), axum::Error> {
    match serde_json::to_string(msg) {
        Ok(json) => ws_sink.send(Message::Text(json.into())).await,
        Err(e) => {
            error!("Failed to serialize WebSocket message: {}", e);
            Ok(())
        }
    }
}

async fn process_incoming(
    mut ws_stream: SplitStream<WebSocket>,
    id: ConnectionId,
    service: &SyncService,
) {
    while let Some(result) = ws_stream.next().await {
        match result {
            Ok(Message::Text(text)) => match serde_json::from_str::<ClientMessage>(&text) {
                Ok(msg) => handle_client_message(id, msg, service).await,
                Err(e) => {
                    debug!("Failed to parse viewer message: {}", e);
                    reply_error(
                        id,
                        service,
                        "parse_error",
                        format!("Invalid message format: {}", e),
                    )
                    .await;
                }
            },
            Ok(Message::Close(_)) => break,
            // Ping/pong frames are answered by the protocol layer.
            Ok(_) => {}
            Err(e) => {
                debug!("WebSocket error for viewer {}: {}", id, e);
                break;
            }
        }
    }
}

async fn handle_client_message(id: ConnectionId, msg: ClientMessage, service: &SyncService) {
    match msg.msg_type.as_str() {
        msg_types::GET_MUSIC_LIST => {
            service.list_for(id).await;
        }
        msg_types::PING => {
            if let Err(e) = service
                .hub()
                .send_to(id, ServerMessage::empty(msg_types::PONG))
                .await
            {
                debug!("Could not answer ping from viewer {}: {:?}", id, e);
            }
        }
        other => {
            reply_error(
                id,
                service,
                "unknown_type",
                format!("Unknown message type: {}", other),
            )
            .await;
        }
    }
}

async fn reply_error(id: ConnectionId, service: &SyncService, code: &str, message: String) {
    let msg = ServerMessage::new(msg_types::ERROR, system::Error::new(code, message));
    if let Err(e) = service.hub().send_to(id, msg).await {
        debug!("Could not send {} error to viewer {}: {:?}", code, id, e);
    }
}

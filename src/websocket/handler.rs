//! WebSocket Handler
//!
//! Handles WebSocket upgrade requests and manages the connection lifecycle.
//! Each connection holds one toast listener slot for its lifetime.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Query, State,
    },
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::mpsc;
use uuid::Uuid;

use super::messages::{ClientMessage, ServerMessage};
use crate::api::error::ApiResult;
use crate::api::extract::{authenticate, CurrentUser};
use crate::api::AppState;
use crate::notify::ToastHub;

/// Query parameters for the upgrade request
///
/// Browsers cannot set headers on a WebSocket handshake, so the session
/// token may also come as `?token=`.
#[derive(Debug, Default, Deserialize)]
pub struct WsParams {
    pub token: Option<String>,
}

/// WebSocket upgrade handler
///
/// Upgrades the HTTP connection and starts streaming toast snapshots.
/// Anonymous connections see public toasts only; an invalid `token` is
/// rejected with 401 before the upgrade.
pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    Query(params): Query<WsParams>,
    current: Option<CurrentUser>,
) -> ApiResult<Response> {
    let viewer = match (current, params.token) {
        (Some(current), _) => Some(current.user.id),
        (None, Some(token)) => Some(authenticate(&state, token).await?.user.id),
        (None, None) => None,
    };
    let hub = state.toasts.clone();
    Ok(ws.on_upgrade(move |socket| handle_socket(socket, hub, viewer)))
}

/// Serialize a server message into a text frame
fn to_frame(message: &ServerMessage) -> Option<Message> {
    match serde_json::to_string(message) {
        Ok(text) => Some(Message::Text(text)),
        Err(e) => {
            tracing::error!(error = %e, "Failed to serialize message");
            None
        }
    }
}

/// Handle an established WebSocket connection
async fn handle_socket(socket: WebSocket, hub: ToastHub, viewer: Option<String>) {
    let (mut sender, mut receiver) = socket.split();

    let mut listener = match hub.listen_as(viewer.as_deref()) {
        Ok(listener) => listener,
        Err(e) => {
            tracing::warn!(error = %e, "Rejected WebSocket connection");
            let error_msg = ServerMessage::Error {
                message: e.to_string(),
            };
            if let Some(frame) = to_frame(&error_msg) {
                let _ = sender.send(frame).await;
            }
            return;
        }
    };

    let connection_id = Uuid::new_v4().to_string();

    // Connected message, then the toasts already showing
    let greeting = [
        ServerMessage::Connected {
            connection_id: connection_id.clone(),
        },
        ServerMessage::Toasts {
            toasts: hub.snapshot_for(viewer.as_deref()).await,
        },
    ];
    for message in &greeting {
        let Some(frame) = to_frame(message) else {
            continue;
        };
        if sender.send(frame).await.is_err() {
            tracing::debug!(connection_id = %connection_id, "Failed to send greeting");
            return;
        }
    }

    tracing::debug!(
        connection_id = %connection_id,
        listeners = hub.listener_count(),
        "WebSocket connected"
    );

    // Replies to this connection only (pong, errors)
    let (tx, mut rx) = mpsc::unbounded_channel::<ServerMessage>();

    let conn_id_for_send = connection_id.clone();

    // Task to forward toast snapshots and replies to the WebSocket
    let mut send_task = tokio::spawn(async move {
        loop {
            let message = tokio::select! {
                reply = rx.recv() => match reply {
                    Some(reply) => reply,
                    None => break,
                },
                toasts = listener.recv() => match toasts {
                    Some(toasts) => ServerMessage::Toasts { toasts },
                    None => break,
                },
            };

            let Some(frame) = to_frame(&message) else {
                continue;
            };
            if sender.send(frame).await.is_err() {
                tracing::debug!(
                    connection_id = %conn_id_for_send,
                    "WebSocket send failed, closing connection"
                );
                break;
            }
        }
    });

    let hub_for_recv = hub.clone();
    let conn_id_for_recv = connection_id.clone();

    // Task to receive messages from WebSocket and handle them
    let mut recv_task = tokio::spawn(async move {
        while let Some(result) = receiver.next().await {
            match result {
                Ok(msg) => {
                    let keep_open = handle_ws_message(
                        &hub_for_recv,
                        viewer.as_deref(),
                        &tx,
                        &conn_id_for_recv,
                        msg,
                    )
                    .await;
                    if !keep_open {
                        break;
                    }
                }
                Err(e) => {
                    tracing::debug!(
                        connection_id = %conn_id_for_recv,
                        error = %e,
                        "WebSocket receive error"
                    );
                    break;
                }
            }
        }
    });

    // Wait for either task to complete
    tokio::select! {
        _ = &mut send_task => {
            recv_task.abort();
        }
        _ = &mut recv_task => {
            send_task.abort();
        }
    }

    tracing::debug!(connection_id = %connection_id, "WebSocket disconnected");
}

/// Handle a received WebSocket message
///
/// Returns false if the connection should be closed.
async fn handle_ws_message(
    hub: &ToastHub,
    viewer: Option<&str>,
    tx: &mpsc::UnboundedSender<ServerMessage>,
    connection_id: &str,
    message: Message,
) -> bool {
    match message {
        Message::Text(text) => {
            match serde_json::from_str::<ClientMessage>(&text) {
                Ok(client_msg) => {
                    let reply = handle_client_message(hub, viewer, connection_id, client_msg).await;
                    if let Some(reply) = reply {
                        let _ = tx.send(reply);
                    }
                }
                Err(e) => {
                    tracing::debug!(
                        connection_id = %connection_id,
                        error = %e,
                        text = %text,
                        "Invalid client message"
                    );
                    // Keep the connection open
                    let _ = tx.send(ServerMessage::Error {
                        message: format!("Invalid message format: {}", e),
                    });
                }
            }
            true
        }
        Message::Binary(_) => {
            let _ = tx.send(ServerMessage::Error {
                message: "Binary messages not supported".to_string(),
            });
            true
        }
        // Axum answers pings itself
        Message::Ping(_) | Message::Pong(_) => true,
        Message::Close(_) => {
            tracing::debug!(connection_id = %connection_id, "Client requested close");
            false
        }
    }
}

/// Handle a parsed client message, returning a direct reply if any
///
/// A successful dismiss has no reply: every listener, this one included,
/// gets the new snapshot from the hub.
async fn handle_client_message(
    hub: &ToastHub,
    viewer: Option<&str>,
    connection_id: &str,
    message: ClientMessage,
) -> Option<ServerMessage> {
    match message {
        ClientMessage::Dismiss { id } => match hub.dismiss_as(viewer, &id).await {
            Ok(()) => None,
            Err(e) => {
                tracing::debug!(connection_id = %connection_id, error = %e, "Dismiss failed");
                Some(ServerMessage::Error {
                    message: e.to_string(),
                })
            }
        },
        ClientMessage::Ping => Some(ServerMessage::Pong),
    }
}

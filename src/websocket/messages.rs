//! WebSocket Message Types
//!
//! Defines all message types for WebSocket communication between
//! portal clients and the rewards server.

use serde::{Deserialize, Serialize};

use crate::notify::Toast;

/// Messages sent from client to server
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Close a toast before it expires
    Dismiss {
        /// Toast id as delivered in a `toasts` snapshot
        id: String,
    },
    /// Ping for keepalive
    Ping,
}

/// Messages sent from server to client
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Connection established
    Connected {
        /// Unique connection identifier
        connection_id: String,
    },
    /// Full list of toasts currently showing
    Toasts { toasts: Vec<Toast> },
    /// Pong response to ping
    Pong,
    /// Error message
    Error {
        /// Error description
        message: String,
    },
}

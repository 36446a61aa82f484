//! WebSocket Toast Streaming
//!
//! Pushes the toast queue to portal clients as it changes.
//!
//! ## Architecture
//!
//! - **Handler**: Handles WebSocket upgrade and message processing
//! - **Messages**: Defines client and server message formats
//!
//! The queue itself lives in [`crate::notify::ToastHub`]; every connection
//! is one listener on it.
//!
//! ## Protocol
//!
//! Signing in is optional. A session token in the `Authorization` header or
//! a `?token=` query parameter adds the member's own toasts to the public
//! ones.
//!
//! On connect the server sends `connected` followed by a `toasts` snapshot.
//! A new `toasts` snapshot follows every change the connection can see (new
//! toast, expiry, dismissal). Clients may send `{"type": "dismiss", "id": "3"}`
//! or `{"type": "ping"}`.
//!
//! ## Example
//!
//! ```javascript
//! // Browser
//! const ws = new WebSocket(`ws://localhost:8090/api/v1/ws?token=${token}`);
//!
//! ws.onmessage = (event) => {
//!   const msg = JSON.parse(event.data);
//!   if (msg.type === 'toasts') render(msg.toasts);
//! };
//! ```

mod handler;
mod messages;

pub use handler::websocket_handler;
pub use messages::{ClientMessage, ServerMessage};

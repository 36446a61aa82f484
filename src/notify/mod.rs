//! Toast notifications
//!
//! - **hub**: Shared toast list with expiry and snapshot broadcasting
//! - **toast**: Toast message types

mod hub;
mod toast;

pub use hub::{HubError, ToastConfig, ToastHub, ToastListener};
pub use toast::{Toast, ToastKind};

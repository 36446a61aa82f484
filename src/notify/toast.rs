//! Toast message types

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ToastKind {
    #[default]
    Success,
    Error,
}

impl fmt::Display for ToastKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ToastKind::Success => write!(f, "success"),
            ToastKind::Error => write!(f, "error"),
        }
    }
}

/// An ephemeral notification
///
/// A toast with an owner is only shown to that member's sessions; one
/// without is shown to everyone.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Toast {
    pub id: String,
    pub title: String,
    pub message: String,
    #[serde(rename = "type")]
    pub kind: ToastKind,
    #[serde(skip)]
    pub owner: Option<String>,
}

impl Toast {
    pub fn new(
        id: u64,
        title: impl Into<String>,
        message: impl Into<String>,
        kind: ToastKind,
    ) -> Self {
        Self {
            id: id.to_string(),
            title: title.into(),
            message: message.into(),
            kind,
            owner: None,
        }
    }

    pub fn owned_by(mut self, owner: Option<&str>) -> Self {
        self.owner = owner.map(str::to_string);
        self
    }

    pub fn visible_to(&self, viewer: Option<&str>) -> bool {
        match &self.owner {
            None => true,
            Some(owner) => viewer == Some(owner.as_str()),
        }
    }
}

/// Toasts from `toasts` that `viewer` may see
pub fn visible(toasts: &[Toast], viewer: Option<&str>) -> Vec<Toast> {
    toasts
        .iter()
        .filter(|t| t.visible_to(viewer))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_shape() {
        let toast = Toast::new(3, "Booking confirmed", "See you soon", ToastKind::Success);
        let json = serde_json::to_value(&toast).unwrap();
        assert_eq!(json["id"], "3");
        assert_eq!(json["type"], "success");
        assert_eq!(ToastKind::Error.to_string(), "error");
    }

    #[test]
    fn test_owner_is_private() {
        let public = Toast::new(1, "Success", "Submitted", ToastKind::Success);
        let private = Toast::new(2, "Booking confirmed", "KR12345", ToastKind::Success)
            .owned_by(Some("user-1"));

        assert!(public.visible_to(None));
        assert!(private.visible_to(Some("user-1")));
        assert!(!private.visible_to(Some("user-2")));
        assert!(!private.visible_to(None));

        let json = serde_json::to_value(&private).unwrap();
        assert!(json.get("owner").is_none());

        let shown = visible(&[public, private], Some("user-2"));
        assert_eq!(shown.len(), 1);
        assert_eq!(shown[0].id, "1");
    }
}

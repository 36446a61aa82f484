//! Toast Hub
//!
//! Process-wide list of toasts. Every change (a new toast, an expiry, a
//! dismissal) sends a snapshot of the full list over a tokio broadcast
//! channel; each listener sees only the toasts visible to its viewer.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::{broadcast, RwLock};

use super::toast::{visible, Toast, ToastKind};

/// Configuration for the toast hub
#[derive(Debug, Clone)]
pub struct ToastConfig {
    /// How long a toast stays visible
    pub ttl: Duration,
    /// Most toasts kept at once; the oldest is dropped first
    pub capacity: usize,
    /// Most concurrent listeners (WebSocket clients)
    pub max_listeners: usize,
    /// Capacity of the broadcast channel
    pub broadcast_capacity: usize,
}

impl Default for ToastConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(5),
            capacity: 20,
            max_listeners: 1000,
            broadcast_capacity: 256,
        }
    }
}

/// Cheap to clone; clones share the same list
#[derive(Clone)]
pub struct ToastHub {
    inner: Arc<Inner>,
}

struct Inner {
    toasts: RwLock<Vec<Toast>>,
    counter: AtomicU64,
    listeners: AtomicUsize,
    tx: broadcast::Sender<Vec<Toast>>,
    config: ToastConfig,
}

/// A listener slot; the count is released on drop
pub struct ToastListener {
    rx: broadcast::Receiver<Vec<Toast>>,
    hub: Arc<Inner>,
    viewer: Option<String>,
    last: Option<Vec<Toast>>,
}

impl ToastListener {
    /// Wait for the next snapshot that changes what this viewer sees
    ///
    /// A lagging listener skips straight to the newest snapshots.
    pub async fn recv(&mut self) -> Option<Vec<Toast>> {
        loop {
            match self.rx.recv().await {
                Ok(snapshot) => {
                    let shown = visible(&snapshot, self.viewer.as_deref());
                    if self.last.as_ref() == Some(&shown) {
                        continue;
                    }
                    self.last = Some(shown.clone());
                    return Some(shown);
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::debug!(skipped, "Toast listener lagged");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}

impl Drop for ToastListener {
    fn drop(&mut self) {
        self.hub.listeners.fetch_sub(1, Ordering::SeqCst);
    }
}

impl ToastHub {
    pub fn new(config: ToastConfig) -> Self {
        let (tx, _) = broadcast::channel(config.broadcast_capacity.max(1));
        Self {
            inner: Arc::new(Inner {
                toasts: RwLock::new(Vec::new()),
                counter: AtomicU64::new(0),
                listeners: AtomicUsize::new(0),
                tx,
                config,
            }),
        }
    }

    pub fn config(&self) -> &ToastConfig {
        &self.inner.config
    }

    /// Raw snapshot stream with no listener accounting
    pub fn subscribe(&self) -> broadcast::Receiver<Vec<Toast>> {
        self.inner.tx.subscribe()
    }

    /// Claim a listener slot for public toasts only
    pub fn listen(&self) -> Result<ToastListener, HubError> {
        self.listen_as(None)
    }

    /// Claim a listener slot for `viewer`'s toasts plus public ones
    pub fn listen_as(&self, viewer: Option<&str>) -> Result<ToastListener, HubError> {
        let max = self.inner.config.max_listeners;
        let claimed = self
            .inner
            .listeners
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| {
                (n < max).then_some(n + 1)
            });
        if claimed.is_err() {
            return Err(HubError::TooManyListeners(max));
        }
        Ok(ToastListener {
            rx: self.inner.tx.subscribe(),
            hub: Arc::clone(&self.inner),
            viewer: viewer.map(str::to_string),
            last: None,
        })
    }

    pub fn listener_count(&self) -> usize {
        self.inner.listeners.load(Ordering::SeqCst)
    }

    /// Show a toast to everyone and schedule its expiry
    pub async fn toast(
        &self,
        title: impl Into<String>,
        message: impl Into<String>,
        kind: ToastKind,
    ) -> Toast {
        self.toast_for(None, title, message, kind).await
    }

    /// Show a toast to `owner`'s sessions only, or to everyone when `None`
    pub async fn toast_for(
        &self,
        owner: Option<&str>,
        title: impl Into<String>,
        message: impl Into<String>,
        kind: ToastKind,
    ) -> Toast {
        let id = self.inner.counter.fetch_add(1, Ordering::SeqCst) + 1;
        let toast = Toast::new(id, title, message, kind).owned_by(owner);

        let snapshot = {
            let mut toasts = self.inner.toasts.write().await;
            toasts.push(toast.clone());
            let excess = toasts.len().saturating_sub(self.inner.config.capacity.max(1));
            if excess > 0 {
                toasts.drain(..excess);
            }
            toasts.clone()
        };
        self.notify(snapshot);

        tracing::debug!(toast_id = %toast.id, kind = %toast.kind, "Toast shown");

        let hub = self.clone();
        let id = toast.id.clone();
        let ttl = self.inner.config.ttl;
        tokio::spawn(async move {
            tokio::time::sleep(ttl).await;
            hub.remove(&id, |_| true).await;
        });

        toast
    }

    pub async fn success(&self, title: impl Into<String>, message: impl Into<String>) -> Toast {
        self.toast(title, message, ToastKind::Success).await
    }

    pub async fn error(&self, title: impl Into<String>, message: impl Into<String>) -> Toast {
        self.toast(title, message, ToastKind::Error).await
    }

    /// Remove a toast before it expires
    pub async fn dismiss(&self, id: &str) -> Result<(), HubError> {
        if self.remove(id, |_| true).await {
            Ok(())
        } else {
            Err(HubError::ToastNotFound(id.to_string()))
        }
    }

    /// Remove a toast `viewer` can see; others read as not found
    pub async fn dismiss_as(&self, viewer: Option<&str>, id: &str) -> Result<(), HubError> {
        if self.remove(id, |t| t.visible_to(viewer)).await {
            Ok(())
        } else {
            Err(HubError::ToastNotFound(id.to_string()))
        }
    }

    /// Every toast currently showing, whoever owns it
    pub async fn snapshot(&self) -> Vec<Toast> {
        self.inner.toasts.read().await.clone()
    }

    pub async fn snapshot_for(&self, viewer: Option<&str>) -> Vec<Toast> {
        visible(&self.inner.toasts.read().await, viewer)
    }

    /// Returns whether a matching toast was still present
    async fn remove<F>(&self, id: &str, allowed: F) -> bool
    where
        F: Fn(&Toast) -> bool,
    {
        let snapshot = {
            let mut toasts = self.inner.toasts.write().await;
            let Some(index) = toasts.iter().position(|t| t.id == id && allowed(t)) else {
                return false;
            };
            toasts.remove(index);
            toasts.clone()
        };
        self.notify(snapshot);
        true
    }

    fn notify(&self, snapshot: Vec<Toast>) {
        // No listeners is fine
        let _ = self.inner.tx.send(snapshot);
    }
}

impl Default for ToastHub {
    fn default() -> Self {
        Self::new(ToastConfig::default())
    }
}

/// Errors that can occur in the toast hub
#[derive(Debug, Error)]
pub enum HubError {
    #[error("Too many listeners (limit: {0})")]
    TooManyListeners(usize),

    #[error("Toast not found: {0}")]
    ToastNotFound(String),
}

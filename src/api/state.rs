//! Application State
//!
//! Shared state accessible by all API handlers.
//! Wrapped in Arc for thread-safe sharing across async tasks.

use chrono::{NaiveDate, Utc};
use std::sync::Arc;
use std::time::Instant;

use super::error::{ApiError, ApiResult};
use crate::auth::{AuthConfig, AuthService};
use crate::config::Config;
use crate::notify::{ToastConfig, ToastHub};
use crate::rewards::RewardsService;
use crate::store::Store;

/// Shared application state for all handlers
#[derive(Clone)]
pub struct AppState {
    /// Persistent store for accounts, member records and registrations
    pub store: Arc<Store>,
    /// Account and session management
    pub auth: Arc<AuthService>,
    /// Membership, ledger, bookings, wallet and settings
    pub rewards: Arc<RewardsService>,
    /// Process-wide toast queue
    pub toasts: ToastHub,
    /// API configuration
    pub config: Arc<ApiConfig>,
    /// Server start time for uptime tracking
    pub start_time: Instant,
}

impl AppState {
    /// Create state with default auth and toast settings
    pub fn new(store: Arc<Store>, config: ApiConfig) -> Self {
        Self::with_settings(store, config, AuthConfig::default(), ToastConfig::default())
    }

    pub fn with_settings(
        store: Arc<Store>,
        config: ApiConfig,
        auth: AuthConfig,
        toasts: ToastConfig,
    ) -> Self {
        Self {
            auth: Arc::new(AuthService::new(Arc::clone(&store), auth)),
            rewards: Arc::new(RewardsService::new(Arc::clone(&store))),
            toasts: ToastHub::new(toasts),
            store,
            config: Arc::new(config),
            start_time: Instant::now(),
        }
    }

    /// Build state from the loaded configuration file
    pub fn from_config(store: Arc<Store>, config: &Config) -> Self {
        Self::with_settings(
            store,
            ApiConfig::from(config),
            config.auth.auth_config(),
            config.notifications.toast_config(),
        )
    }

    /// Get server uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    /// Calendar date used for tier, ledger and booking rules
    pub fn today(&self) -> NaiveDate {
        Utc::now().date_naive()
    }

    /// Run store-backed work on the blocking thread pool
    ///
    /// The store is a single SQLite connection behind a mutex; its calls
    /// must not run on the async workers.
    pub async fn blocking<T, F>(self: &Arc<Self>, work: F) -> ApiResult<T>
    where
        F: FnOnce(&AppState) -> ApiResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let state = Arc::clone(self);
        tokio::task::spawn_blocking(move || work(&state))
            .await
            .map_err(|e| ApiError::Internal(format!("Store task failed: {}", e)))?
    }
}

/// API server configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Request timeout in milliseconds
    pub request_timeout_ms: u64,
    /// Maximum request body size in bytes
    pub max_body_size: usize,
    /// Allowed CORS origins; empty means permissive
    pub cors_origins: Vec<String>,
    /// Load demo bookings and points for every new account
    pub seed_new_members: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8090,
            request_timeout_ms: 30_000,
            max_body_size: 1024 * 1024, // 1MB
            cors_origins: Vec::new(),
            seed_new_members: false,
        }
    }
}

impl From<&Config> for ApiConfig {
    fn from(config: &Config) -> Self {
        Self {
            host: config.api.host.clone(),
            port: config.api.port,
            request_timeout_ms: config.api.request_timeout_secs * 1000,
            cors_origins: config.api.cors_origins.clone(),
            seed_new_members: config.demo.seed_new_members,
            ..Default::default()
        }
    }
}

impl ApiConfig {
    /// Create config with custom host and port
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Default::default()
        }
    }

    /// Get the socket address string
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_blocking_runs_store_work() {
        let store = Arc::new(Store::in_memory().unwrap());
        let state = Arc::new(AppState::new(store, ApiConfig::default()));

        state.blocking(|s| Ok(s.store.ping()?)).await.unwrap();

        let err = state
            .blocking(|s| Ok(s.auth.current_user("no-such-token")?))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized(_)));
    }

    #[test]
    fn test_api_config_addr() {
        assert_eq!(ApiConfig::new("127.0.0.1", 9000).addr(), "127.0.0.1:9000");
        assert_eq!(ApiConfig::default().request_timeout_ms, 30_000);
    }
}

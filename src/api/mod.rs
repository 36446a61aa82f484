//! Kuriftu Rewards REST API
//!
//! HTTP API layer for the rewards portal, built with Axum. Member routes
//! take an `Authorization: Bearer <token>` header obtained from signup or
//! login.
//!
//! # Endpoints
//!
//! ## Auth
//! - `POST /api/v1/auth/signup` - Create an account
//! - `POST /api/v1/auth/login` - Sign in
//! - `POST /api/v1/auth/logout` - Sign out
//! - `GET /api/v1/auth/me` - Current profile
//!
//! ## Membership
//! - `GET /api/v1/membership` - Tier, points and progress
//! - `GET /api/v1/tiers` - Tier catalog
//! - `GET /api/v1/recommendations` - Experiences and offers
//!
//! ## Points
//! - `GET /api/v1/points` - Point history (search, type, range)
//! - `GET /api/v1/points/export` - Point history as CSV
//!
//! ## Bookings
//! - `GET /api/v1/bookings` - Bookings (search, status, location)
//! - `POST /api/v1/bookings` - Book a stay
//! - `POST /api/v1/bookings/:id/cancel` - Cancel a stay
//!
//! ## Payments
//! - `GET /api/v1/payment-methods` - List cards
//! - `POST /api/v1/payment-methods` - Add a card
//! - `POST /api/v1/payment-methods/:id/default` - Set the default card
//! - `DELETE /api/v1/payment-methods/:id` - Remove a card
//! - `GET /api/v1/payments/transactions` - Charge history
//!
//! ## Settings
//! - `GET /api/v1/settings` - Preferences
//! - `PUT /api/v1/settings` - Save preferences
//!
//! ## Registrations
//! - `POST /api/v1/registrations/:kind` - Bed, spa or dining form
//!
//! ## Notifications
//! - `GET /api/v1/notifications` - Current toasts
//! - `DELETE /api/v1/notifications/:id` - Dismiss a toast
//! - `GET /api/v1/ws` - Live toast stream
//!
//! ## Health
//! - `GET /health/live` - Liveness probe
//! - `GET /health/ready` - Readiness probe
//! - `GET /health` - Full health status
//!
//! # Example
//!
//! ```rust,ignore
//! use kuriftu::api::{serve, ApiConfig, AppState};
//! use kuriftu::store::Store;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = Arc::new(Store::open(std::path::Path::new("./data"))?);
//!     let config = ApiConfig::default();
//!
//!     let state = AppState::new(store, config.clone());
//!     serve(state, &config).await?;
//!
//!     Ok(())
//! }
//! ```

pub mod dto;
pub mod error;
pub mod extract;
pub mod routes;
pub mod state;

pub use error::{ApiError, ApiResult};
pub use extract::CurrentUser;
pub use state::{ApiConfig, AppState};

use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::websocket::websocket_handler;

/// How often expired sessions are swept from the store
const SESSION_SWEEP_INTERVAL: Duration = Duration::from_secs(15 * 60);

/// Build the API router with all routes and middleware
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        // Auth routes
        .route("/auth/signup", post(routes::auth::sign_up))
        .route("/auth/login", post(routes::auth::login))
        .route("/auth/logout", post(routes::auth::logout))
        .route("/auth/me", get(routes::auth::me))
        // Membership routes
        .route("/membership", get(routes::membership::get_membership))
        .route("/tiers", get(routes::membership::list_tiers))
        .route("/recommendations", get(routes::membership::get_recommendations))
        // Point history routes
        .route("/points", get(routes::points::list_points))
        .route("/points/export", get(routes::points::export_points))
        // Booking routes
        .route(
            "/bookings",
            get(routes::bookings::list_bookings).post(routes::bookings::create_booking),
        )
        .route("/bookings/:id/cancel", post(routes::bookings::cancel_booking))
        // Payment routes
        .route(
            "/payment-methods",
            get(routes::payments::list_payment_methods).post(routes::payments::add_payment_method),
        )
        .route(
            "/payment-methods/:id/default",
            post(routes::payments::set_default_payment_method),
        )
        .route(
            "/payment-methods/:id",
            delete(routes::payments::remove_payment_method),
        )
        .route(
            "/payments/transactions",
            get(routes::payments::list_payment_transactions),
        )
        // Settings routes
        .route(
            "/settings",
            get(routes::settings::get_settings).put(routes::settings::update_settings),
        )
        // Registration forms
        .route(
            "/registrations/:kind",
            post(routes::registrations::submit_registration),
        )
        // Notification routes
        .route("/notifications", get(routes::notifications::list_notifications))
        .route(
            "/notifications/:id",
            delete(routes::notifications::dismiss_notification),
        )
        .layer(DefaultBodyLimit::max(state.config.max_body_size))
        // WebSocket route
        .route("/ws", get(websocket_handler));

    let health_routes = Router::new()
        .route("/live", get(routes::health::liveness))
        .route("/ready", get(routes::health::readiness))
        .route("/", get(routes::health::full_health));

    let cors = cors_layer(&state.config.cors_origins);
    let timeout = Duration::from_millis(state.config.request_timeout_ms);

    // Create shared state
    let shared_state = Arc::new(state);

    Router::new()
        .nest("/api/v1", api_routes)
        .nest("/health", health_routes)
        .layer(TimeoutLayer::new(timeout))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(shared_state)
}

/// Permissive when no origins are configured
fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() {
        return CorsLayer::permissive();
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Start the API server
pub async fn serve(state: AppState, config: &ApiConfig) -> Result<(), ApiError> {
    let sweeper = spawn_session_sweeper(state.clone());
    let router = build_router(state);

    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Kuriftu API listening on {}", addr);

    let result = axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| ApiError::Internal(format!("Server error: {}", e)));

    sweeper.abort();
    result?;

    tracing::info!("Kuriftu API shut down gracefully");
    Ok(())
}

/// Periodically delete expired sessions
fn spawn_session_sweeper(state: AppState) -> tokio::task::JoinHandle<()> {
    let state = Arc::new(state);
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(SESSION_SWEEP_INTERVAL);
        loop {
            interval.tick().await;
            match state.blocking(|s| Ok(s.auth.purge_expired()?)).await {
                Ok(0) => {}
                Ok(purged) => tracing::info!(purged, "Purged expired sessions"),
                Err(e) => tracing::warn!(error = %e, "Session sweep failed"),
            }
        }
    })
}

/// Wait for shutdown signal
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install signal handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}

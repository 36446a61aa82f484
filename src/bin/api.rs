//! Kuriftu Rewards API Server
//!
//! Run with: cargo run --bin kuriftu-api
//!
//! # Configuration
//!
//! Reads `config.toml` from the first of:
//! - `$KURIFTU_CONFIG`
//! - `~/.config/kuriftu/config.toml`
//! - `/etc/kuriftu/config.toml`
//! - `./config.toml`
//!
//! Environment variables override file values:
//! - `KURIFTU_DATA_DIR`: Database directory (default: ~/.kuriftu)
//! - `KURIFTU_API_HOST`: Host to bind to (default: 0.0.0.0)
//! - `KURIFTU_API_PORT`: Port to listen on (default: 8090)
//! - `KURIFTU_SESSION_TTL_HOURS`: Session lifetime (default: 24)
//! - `KURIFTU_TOAST_TTL_MS`: Toast lifetime (default: 5000)
//! - `KURIFTU_SEED_DEMO`: Seed demo records for new members (default: false)
//! - `KURIFTU_LOG_LEVEL`, `KURIFTU_LOG_FORMAT`: Logging (default: info, pretty)
//! - `RUST_LOG`: Full filter directive, wins over the log level

use kuriftu::api::{serve, AppState};
use kuriftu::config::Config;
use kuriftu::store::Store;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = match std::env::var("KURIFTU_CONFIG") {
        Ok(path) => Config::load_with_env(&PathBuf::from(path))?,
        Err(_) => Config::load_default(),
    };

    // Initialize tracing
    let json = config.logging.is_json();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.logging.default_filter().into()),
        )
        .with(json.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!json).then(|| tracing_subscriber::fmt::layer()))
        .init();

    tracing::info!("Starting Kuriftu API server v{}", env!("CARGO_PKG_VERSION"));

    let data_dir = config.data_dir();
    tracing::info!("Data directory: {:?}", data_dir);
    tracing::info!("Seed demo members: {}", config.demo.seed_new_members);

    let store = Arc::new(Store::open(&data_dir)?);
    let stats = store.stats()?;
    tracing::info!(
        users = stats.users,
        sessions = stats.sessions,
        registrations = stats.registrations,
        "Store opened"
    );

    let state = AppState::from_config(store, &config);
    let api_config = Arc::clone(&state.config);

    tracing::info!("Starting server on {}", api_config.addr());
    serve(state, &api_config).await?;

    tracing::info!("Kuriftu API server stopped");
    Ok(())
}

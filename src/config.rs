//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and `KURIFTU_*` environment variable overrides.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::auth::AuthConfig;
use crate::notify::ToastConfig;

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub auth: AuthSection,

    #[serde(default)]
    pub notifications: NotificationsConfig,

    #[serde(default)]
    pub demo: DemoConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Database location
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
}

fn default_data_dir() -> String {
    dirs::data_local_dir()
        .map(|p| p.join("kuriftu").to_string_lossy().to_string())
        .unwrap_or_else(|| "./kuriftu_data".to_string())
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

/// API server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Empty means any origin
    #[serde(default)]
    pub cors_origins: Vec<String>,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8090
}

fn default_request_timeout() -> u64 {
    30
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: Vec::new(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

/// Session settings
#[derive(Debug, Clone, Deserialize)]
pub struct AuthSection {
    #[serde(default = "default_session_ttl")]
    pub session_ttl_hours: u64,
}

fn default_session_ttl() -> u64 {
    24
}

impl Default for AuthSection {
    fn default() -> Self {
        Self {
            session_ttl_hours: default_session_ttl(),
        }
    }
}

impl AuthSection {
    pub fn auth_config(&self) -> AuthConfig {
        AuthConfig {
            session_ttl: chrono::Duration::hours(self.session_ttl_hours as i64),
            ..Default::default()
        }
    }
}

/// Toast hub settings
#[derive(Debug, Clone, Deserialize)]
pub struct NotificationsConfig {
    #[serde(default = "default_toast_ttl")]
    pub toast_ttl_ms: u64,

    #[serde(default = "default_toast_capacity")]
    pub capacity: usize,

    #[serde(default = "default_max_listeners")]
    pub max_listeners: usize,
}

fn default_toast_ttl() -> u64 {
    5000 // 5 seconds
}

fn default_toast_capacity() -> usize {
    20
}

fn default_max_listeners() -> usize {
    1000
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self {
            toast_ttl_ms: default_toast_ttl(),
            capacity: default_toast_capacity(),
            max_listeners: default_max_listeners(),
        }
    }
}

impl NotificationsConfig {
    pub fn toast_config(&self) -> ToastConfig {
        ToastConfig {
            ttl: Duration::from_millis(self.toast_ttl_ms),
            capacity: self.capacity,
            max_listeners: self.max_listeners,
            ..Default::default()
        }
    }
}

/// Demo data
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DemoConfig {
    /// Give every new account the portal's sample bookings and ledger
    #[serde(default)]
    pub seed_new_members: bool,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl LoggingConfig {
    /// Filter directive used when `RUST_LOG` is unset
    pub fn default_filter(&self) -> String {
        format!("kuriftu={},tower_http=debug", self.level)
    }

    pub fn is_json(&self) -> bool {
        self.format.eq_ignore_ascii_case("json")
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Ok(config)
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from default locations or environment
    pub fn load_default() -> Self {
        let config_paths = [
            dirs::config_dir().map(|p| p.join("kuriftu").join("config.toml")),
            Some(PathBuf::from("/etc/kuriftu/config.toml")),
            Some(PathBuf::from("./config.toml")),
        ];

        for path_opt in config_paths.iter().flatten() {
            if path_opt.exists() {
                match Self::load_with_env(path_opt) {
                    Ok(config) => {
                        tracing::info!("Loaded config from {:?}", path_opt);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path_opt, e);
                    }
                }
            }
        }

        tracing::info!("Using default config with environment overrides");
        Self::from_env()
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) {
        if let Ok(data_dir) = std::env::var("KURIFTU_DATA_DIR") {
            self.storage.data_dir = data_dir;
        }

        if let Ok(host) = std::env::var("KURIFTU_API_HOST") {
            self.api.host = host;
        }
        if let Some(port) = env_parse("KURIFTU_API_PORT") {
            self.api.port = port;
        }

        if let Some(hours) = env_parse("KURIFTU_SESSION_TTL_HOURS") {
            self.auth.session_ttl_hours = hours;
        }
        if let Some(ms) = env_parse("KURIFTU_TOAST_TTL_MS") {
            self.notifications.toast_ttl_ms = ms;
        }
        if let Some(seed) = env_parse("KURIFTU_SEED_DEMO") {
            self.demo.seed_new_members = seed;
        }

        if let Ok(level) = std::env::var("KURIFTU_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(format) = std::env::var("KURIFTU_LOG_FORMAT") {
            self.logging.format = format;
        }
    }

    /// Database directory with a leading `~` expanded
    pub fn data_dir(&self) -> PathBuf {
        match self.storage.data_dir.strip_prefix("~/") {
            Some(rest) => dirs::home_dir()
                .map(|home| home.join(rest))
                .unwrap_or_else(|| PathBuf::from(&self.storage.data_dir)),
            None => PathBuf::from(&self.storage.data_dir),
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.trim().parse().ok())
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# Kuriftu Rewards Configuration
#
# Environment variables override these settings:
# - KURIFTU_DATA_DIR
# - KURIFTU_API_HOST
# - KURIFTU_API_PORT
# - KURIFTU_SESSION_TTL_HOURS
# - KURIFTU_TOAST_TTL_MS
# - KURIFTU_SEED_DEMO
# - KURIFTU_LOG_LEVEL
# - KURIFTU_LOG_FORMAT

[storage]
# Directory holding kuriftu.db
data_dir = "~/.local/share/kuriftu"

[api]
# API server host
host = "0.0.0.0"

# API server port
port = 8090

# Allowed CORS origins (empty allows any)
cors_origins = []

# Request timeout in seconds
request_timeout_secs = 30

[auth]
# How long a login session stays valid
session_ttl_hours = 24

[notifications]
# How long a toast stays visible (ms)
toast_ttl_ms = 5000

# Most toasts shown at once
capacity = 20

# Most concurrent live listeners
max_listeners = 1000

[demo]
# Load sample bookings, points and cards for every new account
seed_new_members = false

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.api.port, 8090);
        assert_eq!(config.auth.session_ttl_hours, 24);
        assert_eq!(config.notifications.toast_ttl_ms, 5000);
        assert!(!config.demo.seed_new_members);
        assert_eq!(
            config.logging.default_filter(),
            "kuriftu=info,tower_http=debug"
        );
    }

    #[test]
    fn test_generated_config_parses() {
        let config: Config = toml::from_str(&generate_default_config()).unwrap();
        assert_eq!(config.api.port, 8090);
        assert_eq!(config.storage.data_dir, "~/.local/share/kuriftu");
        assert_eq!(config.notifications.capacity, 20);
        assert!(config.api.cors_origins.is_empty());
    }

    #[test]
    fn test_load_partial_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[api]\nport = 9000\n\n[notifications]\ntoast_ttl_ms = 250\n\n[logging]\nformat = \"json\""
        )
        .unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.api.port, 9000);
        assert_eq!(config.api.host, "0.0.0.0");
        assert!(config.logging.is_json());

        let toasts = config.notifications.toast_config();
        assert_eq!(toasts.ttl, Duration::from_millis(250));
        assert_eq!(
            config.auth.auth_config().session_ttl,
            chrono::Duration::hours(24)
        );
    }

    #[test]
    fn test_load_errors() {
        let missing = Config::load(Path::new("/nonexistent/kuriftu.toml"));
        assert!(matches!(missing, Err(ConfigError::Io { .. })));

        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[api\nport = ").unwrap();
        assert!(matches!(
            Config::load(file.path()),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn test_env_override() {
        std::env::set_var("KURIFTU_SESSION_TTL_HOURS", "2");
        let config = Config::from_env();
        std::env::remove_var("KURIFTU_SESSION_TTL_HOURS");
        assert_eq!(config.auth.session_ttl_hours, 2);
    }

    #[test]
    fn test_data_dir_expands_home() {
        let mut config = Config::default();
        config.storage.data_dir = "/srv/kuriftu".to_string();
        assert_eq!(config.data_dir(), PathBuf::from("/srv/kuriftu"));

        config.storage.data_dir = "~/kuriftu".to_string();
        assert!(config.data_dir().ends_with("kuriftu"));
    }
}

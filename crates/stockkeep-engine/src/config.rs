//! # Engine Configuration
//!
//! Configuration management for the transaction engine.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     STOCKKEEP_DB_PATH=/data/stockkeep.db                               │
//! │     STOCKKEEP_AMEND_POLICY=rebalance                                   │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/stockkeep/stockkeep.toml (Linux)                         │
//! │     ~/Library/Application Support/com.stockkeep.stockkeep/... (macOS)  │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # stockkeep.toml
//! [database]
//! path = "/var/lib/stockkeep/stockkeep.db"
//! max_connections = 5
//! acquire_timeout_secs = 30
//! busy_timeout_ms = 5000
//!
//! [ledger]
//! amend_policy = "record_only"  # record_only | rebalance
//!
//! [logging]
//! filter = "info,stockkeep=debug,sqlx=warn"
//! ```
//!
//! ## Environment Variables
//! | Variable                      | Field                         |
//! |-------------------------------|-------------------------------|
//! | `STOCKKEEP_DB_PATH`           | `database.path`               |
//! | `STOCKKEEP_MAX_CONNECTIONS`   | `database.max_connections`    |
//! | `STOCKKEEP_BUSY_TIMEOUT_MS`   | `database.busy_timeout_ms`    |
//! | `STOCKKEEP_AMEND_POLICY`      | `ledger.amend_policy`         |
//! | `STOCKKEEP_LOG`               | `logging.filter`              |

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

use stockkeep_core::AmendPolicy;
use stockkeep_db::DbConfig;

/// Default tracing filter directives.
pub const DEFAULT_LOG_FILTER: &str = "info,stockkeep=debug,sqlx=warn";

// =============================================================================
// Errors
// =============================================================================

/// Configuration load/save failures.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

// =============================================================================
// Sections
// =============================================================================

/// Store settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseSettings {
    /// SQLite file path. `:memory:` opens a throwaway database.
    pub path: PathBuf,

    pub max_connections: u32,

    /// Seconds to wait for a free pool connection.
    pub acquire_timeout_secs: u64,

    /// Milliseconds SQLite waits on a lock held by another writer.
    pub busy_timeout_ms: u64,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        DatabaseSettings {
            path: default_database_path(),
            max_connections: 5,
            acquire_timeout_secs: 30,
            busy_timeout_ms: 5000,
        }
    }
}

/// Ledger behaviour switches.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerSettings {
    pub amend_policy: AmendPolicy,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// `tracing_subscriber::EnvFilter` directives, used when `RUST_LOG` is unset.
    pub filter: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        LoggingSettings {
            filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

// =============================================================================
// Engine Config
// =============================================================================

/// Complete engine configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub database: DatabaseSettings,

    #[serde(default)]
    pub ledger: LedgerSettings,

    #[serde(default)]
    pub logging: LoggingSettings,
}

impl EngineConfig {
    /// Creates a config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Config for a throwaway in-memory database.
    pub fn in_memory() -> Self {
        let mut config = Self::default();
        config.database.path = PathBuf::from(":memory:");
        config.database.max_connections = 1;
        config
    }

    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (stockkeep.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> ConfigResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading engine config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = Self::from_toml(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load engine config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Parses a TOML document. Missing sections and fields take defaults.
    pub fn from_toml(contents: &str) -> ConfigResult<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Saves configuration to file.
    pub fn save(&self, config_path: Option<PathBuf>) -> ConfigResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| ConfigError::Invalid("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents)?;

        info!(?path, "Engine config saved");
        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.database.path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("database.path must not be empty".into()));
        }

        if self.database.max_connections == 0 {
            return Err(ConfigError::Invalid(
                "database.max_connections must be greater than 0".into(),
            ));
        }

        if self.database.acquire_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "database.acquire_timeout_secs must be greater than 0".into(),
            ));
        }

        if self.logging.filter.trim().is_empty() {
            return Err(ConfigError::Invalid("logging.filter must not be empty".into()));
        }

        Ok(())
    }

    /// Applies `STOCKKEEP_*` environment variable overrides.
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Applies overrides from any key lookup (environment in production).
    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(path) = lookup("STOCKKEEP_DB_PATH") {
            debug!(path = %path, "Overriding database path from environment");
            self.database.path = PathBuf::from(path);
        }

        if let Some(max) = lookup("STOCKKEEP_MAX_CONNECTIONS") {
            match max.parse::<u32>() {
                Ok(n) => self.database.max_connections = n,
                Err(_) => warn!(value = %max, "Ignoring invalid STOCKKEEP_MAX_CONNECTIONS"),
            }
        }

        if let Some(busy) = lookup("STOCKKEEP_BUSY_TIMEOUT_MS") {
            match busy.parse::<u64>() {
                Ok(ms) => self.database.busy_timeout_ms = ms,
                Err(_) => warn!(value = %busy, "Ignoring invalid STOCKKEEP_BUSY_TIMEOUT_MS"),
            }
        }

        if let Some(policy) = lookup("STOCKKEEP_AMEND_POLICY") {
            match policy.parse::<AmendPolicy>() {
                Ok(parsed) => {
                    debug!(policy = %policy, "Overriding amend policy from environment");
                    self.ledger.amend_policy = parsed;
                }
                Err(e) => warn!(error = %e, "Ignoring invalid STOCKKEEP_AMEND_POLICY"),
            }
        }

        if let Some(filter) = lookup("STOCKKEEP_LOG") {
            self.logging.filter = filter;
        }
    }

    /// Returns the default config file path.
    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "stockkeep", "stockkeep")
            .map(|dirs| dirs.config_dir().join("stockkeep.toml"))
    }

    /// Store settings in the shape the pool expects.
    pub fn db_config(&self) -> DbConfig {
        let base = if self.database.path.as_os_str() == ":memory:" {
            DbConfig::in_memory()
        } else {
            DbConfig::new(self.database.path.clone())
                .max_connections(self.database.max_connections)
        };

        base.acquire_timeout(Duration::from_secs(self.database.acquire_timeout_secs))
            .busy_timeout(Duration::from_millis(self.database.busy_timeout_ms))
    }
}

/// Platform data directory, falling back to the working directory.
fn default_database_path() -> PathBuf {
    directories::ProjectDirs::from("com", "stockkeep", "stockkeep")
        .map(|dirs| dirs.data_dir().join("stockkeep.db"))
        .unwrap_or_else(|| PathBuf::from("stockkeep.db"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults_are_valid() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.ledger.amend_policy, AmendPolicy::RecordOnly);
        assert_eq!(config.database.busy_timeout_ms, 5000);
        assert_eq!(config.logging.filter, DEFAULT_LOG_FILTER);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = EngineConfig::from_toml(
            r#"
            [database]
            path = "/tmp/shop.db"
            busy_timeout_ms = 250

            [ledger]
            amend_policy = "rebalance"
            "#,
        )
        .unwrap();

        assert_eq!(config.database.path, PathBuf::from("/tmp/shop.db"));
        assert_eq!(config.database.busy_timeout_ms, 250);
        assert_eq!(config.database.max_connections, 5);
        assert_eq!(config.ledger.amend_policy, AmendPolicy::Rebalance);

        let db = config.db_config();
        assert_eq!(db.busy_timeout, Duration::from_millis(250));
        assert!(!db.is_in_memory());
    }

    #[test]
    fn test_bad_toml_is_rejected() {
        let result = EngineConfig::from_toml("[ledger]\namend_policy = \"sometimes\"");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_validate_rejects_zero_connections() {
        let mut config = EngineConfig::default();
        config.database.max_connections = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_overrides() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("STOCKKEEP_DB_PATH", "/srv/stock.db"),
            ("STOCKKEEP_AMEND_POLICY", "rebalance"),
            ("STOCKKEEP_MAX_CONNECTIONS", "not-a-number"),
            ("STOCKKEEP_LOG", "debug"),
        ]);

        let mut config = EngineConfig::default();
        config.apply_overrides(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.database.path, PathBuf::from("/srv/stock.db"));
        assert_eq!(config.ledger.amend_policy, AmendPolicy::Rebalance);
        assert_eq!(config.database.max_connections, 5);
        assert_eq!(config.logging.filter, "debug");
    }

    #[test]
    fn test_save_and_load_file() {
        let path = std::env::temp_dir().join(format!(
            "stockkeep-config-test-{}.toml",
            std::process::id()
        ));

        let mut config = EngineConfig::in_memory();
        config.ledger.amend_policy = AmendPolicy::Rebalance;
        config.save(Some(path.clone())).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let loaded = EngineConfig::from_toml(&contents).unwrap();
        assert_eq!(loaded, config);
        assert!(loaded.db_config().is_in_memory());

        let _ = std::fs::remove_file(&path);
    }
}

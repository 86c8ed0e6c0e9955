//! # Application Configuration
//!
//! Stores application configuration loaded at startup.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     BIZLENS_DB_PATH=/srv/bizlens/bizlens.db                            │
//! │     BIZLENS_MAX_UPLOAD_BYTES=5242880                                   │
//! │     BIZLENS_DB_MAX_CONNECTIONS=8                                       │
//! │                                                                         │
//! │  2. TOML Config File (--config PATH, or the platform default)          │
//! │     ~/.config/bizlens/bizlens.toml (Linux)                             │
//! │     ~/Library/Application Support/com.bizlens.bizlens/bizlens.toml     │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     platform data dir, 10 MiB uploads, 5 connections                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # bizlens.toml
//! db_path = "/srv/bizlens/bizlens.db"
//! max_upload_bytes = 5242880
//! db_max_connections = 8
//! ```
//!
//! Configuration is read-only after loading.

use std::path::{Path, PathBuf};

use bizlens_core::MAX_UPLOAD_BYTES;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

/// Config file name inside the platform config directory.
pub const CONFIG_FILE_NAME: &str = "bizlens.toml";

/// Database file name inside the platform data directory.
pub const DB_FILE_NAME: &str = "bizlens.db";

pub const ENV_DB_PATH: &str = "BIZLENS_DB_PATH";
pub const ENV_MAX_UPLOAD_BYTES: &str = "BIZLENS_MAX_UPLOAD_BYTES";
pub const ENV_DB_MAX_CONNECTIONS: &str = "BIZLENS_DB_MAX_CONNECTIONS";

// =============================================================================
// Errors
// =============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Could not read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Could not parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Environment variable {var} has invalid value '{value}'")]
    InvalidEnv { var: String, value: String },

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Could not determine the platform data directory")]
    NoPlatformDirs,
}

// =============================================================================
// AppConfig
// =============================================================================

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppConfig {
    /// SQLite database file.
    pub db_path: PathBuf,

    /// Upload ceiling in bytes. Never above [`MAX_UPLOAD_BYTES`].
    pub max_upload_bytes: usize,

    /// Pool size for the database.
    pub db_max_connections: u32,
}

/// Fields a TOML file may set. Absent fields keep the lower layer.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    db_path: Option<PathBuf>,
    max_upload_bytes: Option<usize>,
    db_max_connections: Option<u32>,
}

impl AppConfig {
    /// Defaults with the database placed at `db_path`.
    pub fn with_db_path(db_path: impl Into<PathBuf>) -> Self {
        AppConfig {
            db_path: db_path.into(),
            max_upload_bytes: MAX_UPLOAD_BYTES,
            db_max_connections: 5,
        }
    }

    /// Loads configuration from the platform default locations.
    ///
    /// `explicit` is the `--config` path: it must exist. Without it the
    /// platform config file is used when present.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let dirs =
            ProjectDirs::from("com", "bizlens", "bizlens").ok_or(ConfigError::NoPlatformDirs)?;

        let defaults = AppConfig::with_db_path(dirs.data_dir().join(DB_FILE_NAME));
        let (file, required) = match explicit {
            Some(path) => (path.to_path_buf(), true),
            None => (dirs.config_dir().join(CONFIG_FILE_NAME), false),
        };

        AppConfig::load_layers(defaults, &file, required, |var| std::env::var(var).ok())
    }

    /// Applies the file layer, then the environment layer, then validates.
    pub fn load_layers(
        defaults: AppConfig,
        file: &Path,
        file_required: bool,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let mut config = defaults;

        if file_required || file.exists() {
            config.apply_file(file)?;
        } else {
            debug!(path = %file.display(), "No config file, using defaults");
        }

        config.apply_env(env)?;
        config.validate()?;

        info!(
            db_path = %config.db_path.display(),
            max_upload_bytes = config.max_upload_bytes,
            db_max_connections = config.db_max_connections,
            "Configuration loaded"
        );
        Ok(config)
    }

    fn apply_file(&mut self, path: &Path) -> Result<(), ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let file: FileConfig = toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        if let Some(db_path) = file.db_path {
            self.db_path = db_path;
        }
        if let Some(max) = file.max_upload_bytes {
            self.max_upload_bytes = max;
        }
        if let Some(max) = file.db_max_connections {
            self.db_max_connections = max;
        }

        debug!(path = %path.display(), "Config file applied");
        Ok(())
    }

    fn apply_env(&mut self, env: impl Fn(&str) -> Option<String>) -> Result<(), ConfigError> {
        if let Some(path) = env(ENV_DB_PATH) {
            self.db_path = PathBuf::from(path);
        }
        if let Some(value) = env(ENV_MAX_UPLOAD_BYTES) {
            self.max_upload_bytes = parse_env(ENV_MAX_UPLOAD_BYTES, &value)?;
        }
        if let Some(value) = env(ENV_DB_MAX_CONNECTIONS) {
            self.db_max_connections = parse_env(ENV_DB_MAX_CONNECTIONS, &value)?;
        }
        Ok(())
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.db_path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("db_path must not be empty".into()));
        }
        if !(1..=MAX_UPLOAD_BYTES).contains(&self.max_upload_bytes) {
            return Err(ConfigError::Invalid(format!(
                "max_upload_bytes must be between 1 and {}",
                MAX_UPLOAD_BYTES
            )));
        }
        if self.db_max_connections == 0 {
            return Err(ConfigError::Invalid(
                "db_max_connections must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

fn parse_env<T: std::str::FromStr>(var: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidEnv {
        var: var.to_string(),
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    fn temp_file(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!(
            "bizlens-config-{}-{}.toml",
            name,
            std::process::id()
        ));
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_defaults_without_file() {
        let missing = std::env::temp_dir().join("bizlens-does-not-exist.toml");
        let config =
            AppConfig::load_layers(AppConfig::with_db_path("/tmp/a.db"), &missing, false, no_env)
                .unwrap();

        assert_eq!(config, AppConfig::with_db_path("/tmp/a.db"));
        assert_eq!(config.max_upload_bytes, MAX_UPLOAD_BYTES);
    }

    #[test]
    fn test_explicit_file_must_exist() {
        let missing = std::env::temp_dir().join("bizlens-missing-explicit.toml");
        let err =
            AppConfig::load_layers(AppConfig::with_db_path("/tmp/a.db"), &missing, true, no_env)
                .unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn test_env_overrides_file() {
        let file = temp_file(
            "layers",
            "db_path = \"/srv/file.db\"\nmax_upload_bytes = 2048\ndb_max_connections = 3\n",
        );
        let env: HashMap<&str, &str> =
            HashMap::from([(ENV_DB_PATH, "/srv/env.db"), (ENV_DB_MAX_CONNECTIONS, "9")]);

        let config = AppConfig::load_layers(
            AppConfig::with_db_path("/tmp/a.db"),
            &file,
            true,
            |var| env.get(var).map(|v| v.to_string()),
        )
        .unwrap();

        assert_eq!(config.db_path, PathBuf::from("/srv/env.db"));
        assert_eq!(config.max_upload_bytes, 2048);
        assert_eq!(config.db_max_connections, 9);
        std::fs::remove_file(file).ok();
    }

    #[test]
    fn test_unknown_file_key_is_rejected() {
        let file = temp_file("unknown", "db_pth = \"/typo.db\"\n");
        let err =
            AppConfig::load_layers(AppConfig::with_db_path("/tmp/a.db"), &file, true, no_env)
                .unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        std::fs::remove_file(file).ok();
    }

    #[test]
    fn test_bad_env_number() {
        let missing = std::env::temp_dir().join("bizlens-none.toml");
        let err = AppConfig::load_layers(
            AppConfig::with_db_path("/tmp/a.db"),
            &missing,
            false,
            |var| (var == ENV_MAX_UPLOAD_BYTES).then(|| "lots".to_string()),
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnv { ref var, .. } if var == ENV_MAX_UPLOAD_BYTES));
    }

    #[test]
    fn test_upload_ceiling_cannot_be_raised() {
        let missing = std::env::temp_dir().join("bizlens-none.toml");
        let too_big = (MAX_UPLOAD_BYTES + 1).to_string();
        let err = AppConfig::load_layers(
            AppConfig::with_db_path("/tmp/a.db"),
            &missing,
            false,
            |var| (var == ENV_MAX_UPLOAD_BYTES).then(|| too_big.clone()),
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_empty_db_path_is_invalid() {
        let missing = std::env::temp_dir().join("bizlens-none.toml");
        let err = AppConfig::load_layers(AppConfig::with_db_path(""), &missing, false, no_env)
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }
}

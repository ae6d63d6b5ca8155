//! Application state management for onetime config directories
//!
//! A config directory (`~/.onetime` unless overridden) holds `config.toml`
//! and, for the SQLite backend, `db.sqlite`.

use std::net::SocketAddr;
use std::{fs, path::PathBuf};

use serde::{Deserialize, Serialize};
use url::Url;

use crate::ServiceConfig;

pub const APP_NAME: &str = "onetime";
pub const CONFIG_FILE_NAME: &str = "config.toml";
pub const DB_FILE_NAME: &str = "db.sqlite";
pub const DEFAULT_API_LISTEN_ADDR: &str = "0.0.0.0:5000";

/// Where secrets are kept between create and fetch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Process memory; secrets are lost on restart
    #[default]
    Memory,
    /// SQLite database in the config directory
    Sqlite,
}

/// Configuration stored in config.toml
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Listen address for the API server
    pub api_listen_addr: String,
    /// Origin of the frontend that may call the API cross-origin; also the
    /// base of generated share links
    #[serde(default)]
    pub frontend_url: Option<String>,
    #[serde(default)]
    pub storage: StorageBackend,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_listen_addr: DEFAULT_API_LISTEN_ADDR.to_string(),
            frontend_url: None,
            storage: StorageBackend::Memory,
        }
    }
}

impl AppConfig {
    pub fn listen_addr(&self) -> Result<SocketAddr, AppStateError> {
        self.api_listen_addr
            .parse()
            .map_err(|_| AppStateError::InvalidListenAddr(self.api_listen_addr.clone()))
    }

    pub fn frontend_url(&self) -> Result<Option<Url>, AppStateError> {
        self.frontend_url
            .as_deref()
            .map(|s| Url::parse(s).map_err(|_| AppStateError::InvalidFrontendUrl(s.to_string())))
            .transpose()
    }
}

/// Application state representing a onetime config directory
#[derive(Debug, Clone)]
pub struct AppState {
    /// Path to the config directory (~/.onetime or custom)
    pub onetime_dir: PathBuf,
    /// Path to the SQLite database (only used by the sqlite backend)
    pub db_path: PathBuf,
    /// Path to the config file
    pub config_path: PathBuf,
    /// Loaded configuration
    pub config: AppConfig,
}

impl AppState {
    /// Get the config directory path (custom or default ~/.onetime)
    pub fn onetime_dir(custom_path: Option<PathBuf>) -> Result<PathBuf, AppStateError> {
        if let Some(path) = custom_path {
            return Ok(path);
        }

        let home = dirs::home_dir().ok_or(AppStateError::NoHomeDirectory)?;
        Ok(home.join(format!(".{}", APP_NAME)))
    }

    /// Initialize a new config directory
    pub fn init(
        custom_path: Option<PathBuf>,
        config: Option<AppConfig>,
    ) -> Result<Self, AppStateError> {
        let onetime_dir = Self::onetime_dir(custom_path)?;

        if onetime_dir.join(CONFIG_FILE_NAME).exists() {
            return Err(AppStateError::AlreadyInitialized);
        }

        let config = config.unwrap_or_default();
        // Fail before touching the filesystem
        config.listen_addr()?;
        config.frontend_url()?;

        fs::create_dir_all(&onetime_dir)?;

        let config_path = onetime_dir.join(CONFIG_FILE_NAME);
        fs::write(&config_path, toml::to_string_pretty(&config)?)?;

        Ok(Self {
            db_path: onetime_dir.join(DB_FILE_NAME),
            onetime_dir,
            config_path,
            config,
        })
    }

    /// Load existing state from the config directory
    pub fn load(custom_path: Option<PathBuf>) -> Result<Self, AppStateError> {
        let onetime_dir = Self::onetime_dir(custom_path)?;
        let config_path = onetime_dir.join(CONFIG_FILE_NAME);

        if !config_path.exists() {
            return Err(AppStateError::NotInitialized);
        }

        let config_toml = fs::read_to_string(&config_path)?;
        let config: AppConfig = toml::from_str(&config_toml)?;

        Ok(Self {
            db_path: onetime_dir.join(DB_FILE_NAME),
            onetime_dir,
            config_path,
            config,
        })
    }

    /// Load state, or fall back to defaults rooted at the config directory
    /// when it has not been initialized
    pub fn load_or_default(custom_path: Option<PathBuf>) -> Result<Self, AppStateError> {
        match Self::load(custom_path.clone()) {
            Ok(state) => Ok(state),
            Err(AppStateError::NotInitialized) => {
                let onetime_dir = Self::onetime_dir(custom_path)?;
                Ok(Self {
                    db_path: onetime_dir.join(DB_FILE_NAME),
                    config_path: onetime_dir.join(CONFIG_FILE_NAME),
                    onetime_dir,
                    config: AppConfig::default(),
                })
            }
            Err(e) => Err(e),
        }
    }

    /// Convert to ServiceConfig for the daemon
    pub fn to_service_config(&self) -> Result<ServiceConfig, AppStateError> {
        let sqlite_path = match self.config.storage {
            StorageBackend::Sqlite => Some(self.db_path.clone()),
            StorageBackend::Memory => None,
        };

        Ok(ServiceConfig {
            api_listen_addr: self.config.listen_addr()?,
            storage: self.config.storage,
            sqlite_path,
            frontend_url: self.config.frontend_url()?,
            log_level: tracing::Level::INFO,
            log_dir: None,
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AppStateError {
    #[error("onetime directory not initialized. Run 'onetime init' first or use --config-path")]
    NotInitialized,

    #[error("onetime directory already initialized")]
    AlreadyInitialized,

    #[error("no home directory found")]
    NoHomeDirectory,

    #[error("invalid listen address: {0}")]
    InvalidListenAddr(String),

    #[error("invalid frontend url: {0}")]
    InvalidFrontendUrl(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    #[error("TOML deserialization error: {0}")]
    TomlDe(#[from] toml::de::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("onetime");

        let config = AppConfig {
            api_listen_addr: "127.0.0.1:7000".to_string(),
            frontend_url: Some("https://secrets.example.com".to_string()),
            storage: StorageBackend::Sqlite,
        };
        let state = AppState::init(Some(path.clone()), Some(config)).unwrap();
        assert!(state.config_path.exists());

        let loaded = AppState::load(Some(path.clone())).unwrap();
        assert_eq!(loaded.config.api_listen_addr, "127.0.0.1:7000");
        assert_eq!(loaded.config.storage, StorageBackend::Sqlite);

        let service = loaded.to_service_config().unwrap();
        assert_eq!(service.api_listen_addr.port(), 7000);
        assert_eq!(service.sqlite_path, Some(path.join(DB_FILE_NAME)));
        assert_eq!(
            service.frontend_url.unwrap().as_str(),
            "https://secrets.example.com/"
        );

        assert!(matches!(
            AppState::init(Some(path), None),
            Err(AppStateError::AlreadyInitialized)
        ));
    }

    #[test]
    fn test_load_uninitialized() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing");

        assert!(matches!(
            AppState::load(Some(path.clone())),
            Err(AppStateError::NotInitialized)
        ));

        let state = AppState::load_or_default(Some(path)).unwrap();
        assert_eq!(state.config.storage, StorageBackend::Memory);
        assert!(state.to_service_config().unwrap().sqlite_path.is_none());
    }

    #[test]
    fn test_init_rejects_bad_listen_addr() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig {
            api_listen_addr: "not an address".to_string(),
            ..AppConfig::default()
        };
        assert!(matches!(
            AppState::init(Some(dir.path().to_path_buf()), Some(config)),
            Err(AppStateError::InvalidListenAddr(_))
        ));
    }

    #[test]
    fn test_minimal_config_file() {
        let config: AppConfig = toml::from_str(r#"api_listen_addr = "0.0.0.0:5000""#).unwrap();
        assert_eq!(config.storage, StorageBackend::Memory);
        assert!(config.frontend_url.is_none());
    }
}

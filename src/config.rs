//! Configuration management for the LAN transfer server
//!
//! Values come from built-in defaults, then an optional `config.toml`,
//! then `LAN_TRANSFER_*` environment variables. Everything is read once
//! at startup.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_FILE: &str = "config.toml";
pub const ENV_PREFIX: &str = "LAN_TRANSFER";

const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 5000;
const DEFAULT_MAX_FILE_SIZE_MB: u64 = 1024;
const DEFAULT_MAX_REQUEST_SIZE_MB: u64 = 4096;
const BYTES_PER_MB: u64 = 1024 * 1024;

/// Server configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Address to listen on. Environment: LAN_TRANSFER_BIND_ADDRESS
    pub bind_address: String,

    /// TCP port to listen on. Environment: LAN_TRANSFER_PORT
    pub port: u16,

    /// Directory all uploads are stored in and served from.
    /// Environment: LAN_TRANSFER_STORAGE_ROOT
    pub storage_root: String,

    /// Largest single file accepted, in MB
    pub max_file_size_mb: u64,

    /// Largest upload request body accepted, in MB
    pub max_request_size_mb: u64,
}

impl ServerConfig {
    /// Load configuration from `config.toml` in the working directory, if present
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(Path::new(DEFAULT_CONFIG_FILE))
    }

    /// Load configuration with `path` as the optional TOML layer
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .set_default("bind_address", DEFAULT_BIND_ADDRESS)?
            .set_default("port", i64::from(DEFAULT_PORT))?
            .set_default(
                "storage_root",
                default_storage_root().to_string_lossy().to_string(),
            )?
            .set_default("max_file_size_mb", DEFAULT_MAX_FILE_SIZE_MB as i64)?
            .set_default("max_request_size_mb", DEFAULT_MAX_REQUEST_SIZE_MB as i64)?
            .add_source(File::from(path).required(false))
            .add_source(Environment::with_prefix(ENV_PREFIX))
            .build()?;

        let config: ServerConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Configuration with defaults and the given root, for embedding and tests
    pub fn with_storage_root(storage_root: impl AsRef<Path>) -> Self {
        Self {
            bind_address: DEFAULT_BIND_ADDRESS.to_string(),
            port: DEFAULT_PORT,
            storage_root: storage_root.as_ref().to_string_lossy().to_string(),
            max_file_size_mb: DEFAULT_MAX_FILE_SIZE_MB,
            max_request_size_mb: DEFAULT_MAX_REQUEST_SIZE_MB,
        }
    }

    /// Validation for all configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.port == 0 {
            return Err(ConfigError::Message("port cannot be 0".into()));
        }

        if self.storage_root.trim().is_empty() {
            return Err(ConfigError::Message("storage_root cannot be empty".into()));
        }

        if self.max_file_size_mb == 0 {
            return Err(ConfigError::Message(
                "max_file_size_mb must be greater than 0".into(),
            ));
        }

        if self.max_request_size_mb < self.max_file_size_mb {
            return Err(ConfigError::Message(
                "max_request_size_mb must be at least max_file_size_mb".into(),
            ));
        }

        if self.max_file_size_mb.checked_mul(BYTES_PER_MB).is_none() {
            return Err(ConfigError::Message("max_file_size_mb is too large".into()));
        }

        let request_bytes = self
            .max_request_size_mb
            .checked_mul(BYTES_PER_MB)
            .ok_or_else(|| ConfigError::Message("max_request_size_mb is too large".into()))?;
        if usize::try_from(request_bytes).is_err() {
            return Err(ConfigError::Message(
                "max_request_size_mb does not fit in memory addressing on this platform".into(),
            ));
        }

        self.socket_addr()?;

        Ok(())
    }

    /// Bind address and port as a socket address
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.bind_address, self.port)
            .parse()
            .map_err(|e| ConfigError::Message(format!("invalid bind_address: {e}")))
    }

    /// Get storage root as PathBuf
    pub fn storage_root_path(&self) -> PathBuf {
        PathBuf::from(&self.storage_root)
    }

    /// Get maximum file size in bytes
    pub fn max_file_size_bytes(&self) -> u64 {
        self.max_file_size_mb.saturating_mul(BYTES_PER_MB)
    }

    /// Get maximum request body size in bytes
    pub fn max_request_size_bytes(&self) -> usize {
        usize::try_from(self.max_request_size_mb.saturating_mul(BYTES_PER_MB)).unwrap_or(usize::MAX)
    }
}

/// `~/Desktop/uploads`, falling back to `./uploads` when there is no home
pub fn default_storage_root() -> PathBuf {
    dirs::desktop_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join("Desktop")))
        .map(|desktop| desktop.join("uploads"))
        .unwrap_or_else(|| PathBuf::from("uploads"))
}

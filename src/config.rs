//! Configuration management for the library server
//!
//! Separates startup configuration (requires restart) from runtime
//! configuration (environment-overridable limits).

use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Complete server configuration with startup/runtime separation
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(flatten)]
    pub startup: StartupConfig,

    #[serde(flatten)]
    pub runtime: RuntimeConfig,
}

/// Configuration that requires server restart to take effect
#[derive(Debug, Deserialize, Clone)]
pub struct StartupConfig {
    /// IP address to bind the HTTP listener (restart required)
    pub bind_address: String,

    /// Port for the HTTP listener (restart required)
    pub port: u16,

    /// Root directory served by the library (restart required)
    pub library_root: String,

    /// Admin password checked by the login endpoint (restart required)
    pub admin_password: String,
}

/// Configuration that can be overridden per deployment
#[derive(Debug, Deserialize, Clone)]
pub struct RuntimeConfig {
    /// Maximum concurrent connections
    /// Environment: LIBRARY_MAX_CLIENTS
    pub max_clients: usize,

    /// Maximum file upload size in MB
    /// Environment: LIBRARY_MAX_FILE_SIZE_MB
    pub max_file_size_mb: u64,
}

/// Thread-safe runtime configuration wrapper
pub type SharedRuntimeConfig = Arc<RwLock<RuntimeConfig>>;

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            startup: StartupConfig {
                bind_address: "127.0.0.1".to_string(),
                port: 3000,
                library_root: "./LibraryFolder".to_string(),
                admin_password: "misoloveeggs".to_string(),
            },
            runtime: RuntimeConfig {
                max_clients: 16,
                max_file_size_mb: 50,
            },
        }
    }
}

impl ServerConfig {
    /// Load configuration from config.toml with environment overrides.
    ///
    /// Every key has a built-in default so a bare checkout still starts
    /// without a config file.
    pub fn load() -> Result<Self, config::ConfigError> {
        let defaults = Self::default();

        let settings = Config::builder()
            .set_default("bind_address", defaults.startup.bind_address)?
            .set_default("port", defaults.startup.port as i64)?
            .set_default("library_root", defaults.startup.library_root)?
            .set_default("admin_password", defaults.startup.admin_password)?
            .set_default("max_clients", defaults.runtime.max_clients as i64)?
            .set_default("max_file_size_mb", defaults.runtime.max_file_size_mb as i64)?
            .add_source(File::with_name("config").required(false))
            .add_source(Environment::with_prefix("LIBRARY"))
            .build()?;

        let config: ServerConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Split into startup (immutable) and runtime (mutable) parts
    pub fn split(self) -> (StartupConfig, SharedRuntimeConfig) {
        let runtime = Arc::new(RwLock::new(self.runtime));
        (self.startup, runtime)
    }

    /// Validation for all configuration values
    fn validate(&self) -> Result<(), config::ConfigError> {
        if self.startup.port == 0 {
            return Err(config::ConfigError::Message("Port cannot be 0".into()));
        }

        if self.startup.library_root.is_empty() {
            return Err(config::ConfigError::Message(
                "library_root cannot be empty".into(),
            ));
        }

        if self.startup.admin_password.is_empty() {
            return Err(config::ConfigError::Message(
                "admin_password cannot be empty".into(),
            ));
        }

        if self.runtime.max_clients == 0 {
            return Err(config::ConfigError::Message(
                "max_clients must be greater than 0".into(),
            ));
        }

        if self.runtime.max_file_size_mb == 0 {
            return Err(config::ConfigError::Message(
                "max_file_size_mb must be greater than 0".into(),
            ));
        }

        Ok(())
    }
}

impl StartupConfig {
    /// Get bind address and port as a socket address string
    pub fn listen_socket(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }

    /// Get the library root as PathBuf
    pub fn library_root_path(&self) -> PathBuf {
        PathBuf::from(&self.library_root)
    }

    /// Virtual name of the library root, as it appears in request paths
    pub fn virtual_root(&self) -> String {
        self.library_root_path()
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "LibraryFolder".to_string())
    }
}

impl RuntimeConfig {
    /// Get maximum file size in bytes
    pub fn max_file_size_bytes(&self) -> u64 {
        self.max_file_size_mb * 1024 * 1024
    }
}

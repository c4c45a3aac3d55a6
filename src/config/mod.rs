// Required external crates for configuration management and serialization
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default directory searched for `default.toml` and `local.toml`
pub const DEFAULT_CONFIG_DIR: &str = "config";

/// Connection settings for the model registry service
#[derive(Debug, Deserialize, Clone)]
pub struct RegistryConfig {
    /// Registry host name or address
    pub host: String,
    /// Registry port
    pub port: u16,
    /// How long to wait for the initial connection, in seconds
    pub dial_timeout_secs: u64,
    /// Items requested per page when listing versions and artifacts
    pub page_size: u32,
}

impl RegistryConfig {
    /// `host:port` of the registry endpoint
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn dial_timeout(&self) -> Duration {
        Duration::from_secs(self.dial_timeout_secs)
    }
}

/// Configuration for application logging
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    pub level: String,
    /// Optional directory for a daily-rolling log file; stderr when unset
    pub file: Option<PathBuf>,
}

/// Main settings struct that contains all configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    /// Registry-related settings
    pub registry: RegistryConfig,
    /// Logging-related settings
    pub logging: LoggingConfig,
}

/// Values given on the command line that take precedence over every other source
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub host: Option<String>,
    pub port: Option<u16>,
}

impl Settings {
    /// Loads settings from the following sources, highest precedence first:
    /// 1. Command-line overrides
    /// 2. Environment variables prefixed with MRCTL_ (e.g. `MRCTL_REGISTRY__HOST`)
    /// 3. Local config file (`local.toml`) if present
    /// 4. Default config file (`default.toml`) if present
    /// 5. Built-in defaults
    pub fn load(config_dir: &Path, overrides: &Overrides) -> Result<Self, ConfigError> {
        let default_config = config_dir.join("default.toml");
        let local_config = config_dir.join("local.toml");

        let settings = Config::builder()
            .set_default("registry.host", "localhost")?
            .set_default("registry.port", 8080_i64)?
            .set_default("registry.dial_timeout_secs", 5_i64)?
            .set_default("registry.page_size", 100_i64)?
            .set_default("logging.level", "info")?
            .add_source(File::from(default_config).required(false))
            .add_source(File::from(local_config).required(false))
            .add_source(
                Environment::with_prefix("MRCTL")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override_option("registry.host", overrides.host.clone())?
            .set_override_option("registry.port", overrides.port.map(i64::from))?
            .build()?
            .try_deserialize::<Settings>()?;

        // Validate settings after loading
        settings.validate()?;

        Ok(settings)
    }

    /// Validate configuration values
    fn validate(&self) -> Result<(), ConfigError> {
        if self.registry.host.trim().is_empty() {
            return Err(ConfigError::Message("registry host must not be empty".to_string()));
        }

        if self.registry.port == 0 {
            return Err(ConfigError::Message(
                "Port must be between 1 and 65535, got: 0".to_string()
            ));
        }

        if self.registry.dial_timeout_secs == 0 {
            return Err(ConfigError::Message(
                "dial_timeout_secs must be greater than 0".to_string()
            ));
        }

        if self.registry.page_size == 0 {
            return Err(ConfigError::Message(
                "page_size must be greater than 0".to_string()
            ));
        }

        // Validate logging level
        match self.logging.level.to_lowercase().as_str() {
            "error" | "warn" | "info" | "debug" | "trace" => Ok(()),
            _ => Err(ConfigError::Message(
                format!("Invalid logging level: {}. Must be one of: error, warn, info, debug, trace",
                    self.logging.level)
            )),
        }?;

        // Create log file directory if configured and doesn't exist
        if let Some(log_dir) = &self.logging.file {
            if !log_dir.exists() {
                std::fs::create_dir_all(log_dir).map_err(|e| {
                    ConfigError::Message(format!(
                        "Failed to create log directory at {}: {}",
                        log_dir.display(), e
                    ))
                })?;
            }
        }

        Ok(())
    }
}

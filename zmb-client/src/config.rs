//! Configuration for the ZMB client.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use zmb_common::config::{LoggingConfig, ZenohConfig};
use zmb_common::Address;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    Parse(#[from] json5::Error),
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Complete client configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Zenoh connection settings
    #[serde(default)]
    pub zenoh: ZenohConfig,

    /// Responder selection and call settings
    #[serde(default)]
    pub client: ClientSection,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Client-specific settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientSection {
    /// Responder address: `<key-expr>[@<locator>,...]`
    #[serde(default = "default_address")]
    pub address: String,

    /// Transport-level query timeout in milliseconds (Zenoh default if unset)
    #[serde(default)]
    pub timeout_ms: Option<u64>,
}

fn default_address() -> String {
    format!("{}/modbus", zmb_common::KEY_PREFIX)
}

impl Default for ClientSection {
    fn default() -> Self {
        Self {
            address: default_address(),
            timeout_ms: None,
        }
    }
}

impl ClientSection {
    /// Parsed responder address.
    pub fn address(&self) -> Result<Address, ConfigError> {
        self.address
            .parse()
            .map_err(|e: zmb_common::Error| ConfigError::Validation(e.to_string()))
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }
}

impl ClientConfig {
    /// Load configuration from a JSON5 file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: ClientConfig = json5::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.client.address()?;

        if self.client.timeout_ms == Some(0) {
            return Err(ConfigError::Validation(
                "timeout_ms must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }
}

//! Configuration for the reference responder.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;
use zmb_common::config::{LoggingConfig, ZenohConfig};
use zmb_common::{Address, Value};

use crate::store::{DataType, MemoryStore};

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

/// Complete responder configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponderConfig {
    /// Zenoh connection settings
    #[serde(default)]
    pub zenoh: ZenohConfig,

    /// Responder-specific settings
    pub responder: ResponderSection,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Key expression and initial data points.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponderSection {
    /// Key expression to answer queries on (default: "zmb/modbus")
    #[serde(default = "default_key_expr")]
    pub key_expr: String,

    /// Initial point values, keyed by path (`/device/slave/point`)
    #[serde(default)]
    pub points: BTreeMap<String, Value>,

    /// Paths that reject writes
    #[serde(default)]
    pub read_only: Vec<String>,

    /// Register type of numeric points; writes outside its range are refused
    #[serde(default)]
    pub data_types: BTreeMap<String, DataType>,
}

fn default_key_expr() -> String {
    format!("{}/modbus", zmb_common::KEY_PREFIX)
}

impl ResponderConfig {
    /// Load configuration from a JSON5 file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: ResponderConfig = json5::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        Address::new(self.responder.key_expr.as_str())
            .map_err(|e| ConfigError::Validation(e.to_string()))?;

        for (path, value) in &self.responder.points {
            if !path.starts_with('/') || path.len() < 2 {
                return Err(ConfigError::Validation(format!(
                    "Point path '{}' must start with '/'",
                    path
                )));
            }
            if !value.is_finite() {
                return Err(ConfigError::Validation(format!(
                    "Point '{}' must hold a finite value",
                    path
                )));
            }
        }

        for path in &self.responder.read_only {
            if !self.responder.points.contains_key(path) {
                return Err(ConfigError::Validation(format!(
                    "Read-only path '{}' is not a configured point",
                    path
                )));
            }
        }

        for (path, data_type) in &self.responder.data_types {
            let Some(value) = self.responder.points.get(path) else {
                return Err(ConfigError::Validation(format!(
                    "Typed path '{}' is not a configured point",
                    path
                )));
            };
            if !data_type.accepts(*value) {
                return Err(ConfigError::Validation(format!(
                    "Initial value {} of '{}' does not fit {}",
                    value, path, data_type
                )));
            }
        }

        Ok(())
    }

    /// Build the in-memory store described by this configuration.
    pub fn build_store(&self) -> MemoryStore {
        let mut store: MemoryStore = self
            .responder
            .points
            .iter()
            .map(|(path, value)| (path.clone(), *value))
            .collect();

        for path in &self.responder.read_only {
            store.mark_read_only(path);
        }

        for (path, data_type) in &self.responder.data_types {
            store.set_data_type(path, *data_type);
        }

        store
    }
}

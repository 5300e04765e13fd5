//! Engine configuration
//!
//! Loaded from a JSON file; every field has a default so an empty object
//! is a valid configuration.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use tracing::info;
use types::numeric::Quantity;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Configuration for the matching engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// First order id the allocator hands out (0 is reserved)
    pub first_order_id: u64,
    /// Maximum levels per side returned by GetStatus; None means all
    pub status_depth: Option<usize>,
    /// Largest quantity accepted on Add or Modify; None means no limit
    pub max_order_quantity: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            first_order_id: 1,
            status_depth: None,
            max_order_quantity: None,
        }
    }
}

impl EngineConfig {
    /// Parse and validate a JSON configuration
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON configuration file
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config = Self::from_json_str(&raw)?;

        info!(
            path = %path.display(),
            first_order_id = config.first_order_id,
            status_depth = ?config.status_depth,
            max_order_quantity = ?config.max_order_quantity,
            "Engine config loaded"
        );
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.first_order_id == 0 {
            return Err(ConfigError::Invalid("first_order_id must be at least 1".to_string()));
        }
        if self.status_depth == Some(0) {
            return Err(ConfigError::Invalid("status_depth must be positive when set".to_string()));
        }
        if self.max_order_quantity == Some(0) {
            return Err(ConfigError::Invalid("max_order_quantity must be positive when set".to_string()));
        }
        if self.max_order_quantity.is_some_and(|max| max > Quantity::MAX.lots()) {
            return Err(ConfigError::Invalid(format!(
                "max_order_quantity must not exceed {}",
                Quantity::MAX
            )));
        }
        Ok(())
    }
}

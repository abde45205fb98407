//! Configuration loading
//!
//! One optional TOML file feeds every binary; each crate deserializes the
//! tables it cares about and ignores the rest.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

use crate::errors::{ModelError, Result};

/// Base monthly price used when no configuration overrides it
pub const DEFAULT_BASE_PRICE: u32 = 46;

/// Premium pricing parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuoteConfig {
    pub base_price: u32,
}

impl Default for QuoteConfig {
    fn default() -> Self {
        Self {
            base_price: DEFAULT_BASE_PRICE,
        }
    }
}

impl QuoteConfig {
    pub fn validate(&self) -> Result<()> {
        if self.base_price == 0 {
            return Err(ModelError::Config("base_price must be positive".to_string()));
        }
        Ok(())
    }
}

/// Prediction-side view of the configuration file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PawtectionConfig {
    pub quote: QuoteConfig,
}

impl PawtectionConfig {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config: Self = read_toml(path)?;
        config.quote.validate()?;
        Ok(config)
    }
}

/// Read and deserialize a TOML file.
pub fn read_toml<T: DeserializeOwned, P: AsRef<Path>>(path: P) -> Result<T> {
    let path = path.as_ref();
    info!("Loading configuration from {}", path.display());

    let content = std::fs::read_to_string(path)
        .map_err(|e| ModelError::Config(format!("failed to read {}: {e}", path.display())))?;

    toml::from_str(&content)
        .map_err(|e| ModelError::Config(format!("failed to parse {}: {e}", path.display())))
}

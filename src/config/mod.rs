//! Configuration management
//!
//! This module handles loading and validation of all client configuration.

pub mod models;
pub mod validation;

pub use models::*;
pub use validation::Validate;

use crate::utils::error::{Result, WoundsightError};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

/// Environment variable naming a config file to load
const CONFIG_PATH_VAR: &str = "WOUNDSIGHT_CONFIG";

/// Main configuration struct for the client
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP transport settings
    pub http: HttpSettings,
    /// Request retry settings
    pub retry: RetrySettings,
    /// Client cache settings
    pub cache: CacheSettings,
    /// Backend health check settings
    pub health: HealthSettings,
    /// Analysis workflow settings
    pub analysis: AnalysisSettings,
    /// Error handling settings
    pub errors: ErrorHandlingSettings,
    /// Logging settings
    pub logging: LoggingSettings,
}

impl Config {
    /// Load configuration from a YAML file
    pub async fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading configuration from: {:?}", path);

        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| WoundsightError::config(format!("Failed to read config file: {}", e)))?;

        let config: Self = serde_yaml::from_str(&content)
            .map_err(|e| WoundsightError::config(format!("Failed to parse config: {}", e)))?;

        config.validate()?;

        debug!("Configuration loaded successfully");
        Ok(config)
    }

    /// Load configuration from `WOUNDSIGHT`-prefixed environment
    /// variables, e.g. `WOUNDSIGHT__HTTP__BASE_URL`
    pub fn from_env() -> Result<Self> {
        info!("Loading configuration from environment variables");

        let source = config::Environment::with_prefix("WOUNDSIGHT")
            .separator("__")
            .try_parsing(true)
            .list_separator(",")
            .with_list_parse_key("health.endpoints");

        let config: Self = config::Config::builder()
            .add_source(source)
            .build()
            .map_err(|e| WoundsightError::config(format!("Failed to read environment: {}", e)))?
            .try_deserialize()
            .map_err(|e| {
                WoundsightError::config(format!("Failed to parse environment config: {}", e))
            })?;

        config.validate()?;
        Ok(config)
    }

    /// Load from an explicit file, the file named by `WOUNDSIGHT_CONFIG`,
    /// or the environment, in that order of preference
    pub async fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::from_file(path).await;
        }
        if let Ok(path) = std::env::var(CONFIG_PATH_VAR) {
            return Self::from_file(path).await;
        }
        Self::from_env()
    }

    /// Validate the entire configuration
    pub fn validate(&self) -> Result<()> {
        debug!("Validating configuration");

        self.http
            .validate()
            .map_err(|e| WoundsightError::config(format!("HTTP config error: {}", e)))?;
        self.retry
            .validate()
            .map_err(|e| WoundsightError::config(format!("Retry config error: {}", e)))?;
        self.cache
            .validate()
            .map_err(|e| WoundsightError::config(format!("Cache config error: {}", e)))?;
        self.health
            .validate()
            .map_err(|e| WoundsightError::config(format!("Health config error: {}", e)))?;
        self.analysis
            .validate()
            .map_err(|e| WoundsightError::config(format!("Analysis config error: {}", e)))?;
        self.errors
            .validate()
            .map_err(|e| WoundsightError::config(format!("Error handling config error: {}", e)))?;
        self.logging
            .validate()
            .map_err(|e| WoundsightError::config(format!("Logging config error: {}", e)))?;

        debug!("Configuration validation completed");
        Ok(())
    }
}

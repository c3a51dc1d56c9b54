//! # WoundSight Core
//!
//! Client core for a patient-facing wound analysis app. Wraps the
//! analysis backend behind a resilient client with caching, health
//! checking, retries, and structured error handling.
//!
//! ## Features
//!
//! - **Analysis Workflow**: Upload a wound photo and get a normalized
//!   diagnosis, severity, treatment plan, and doctor recommendations
//! - **Client Cache**: LRU cache with TTLs, tag invalidation, and
//!   optional disk persistence across restarts
//! - **Health Checking**: Ordered fallback endpoints with short-lived
//!   verdict caching
//! - **Resilient Transport**: Bounded request concurrency, jittered
//!   exponential backoff, and fast failure on non-retryable errors
//! - **Error Handling**: Uniform classification of failures into user
//!   messages, retry policy, and a capped in-memory error log
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use woundsight_core::{AnalysisRequest, Config, ProgressReporter, WoundsightClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load(None).await?;
//!     let client = WoundsightClient::new(config).await?;
//!
//!     let image = tokio::fs::read("wound.jpg").await?;
//!     let request = AnalysisRequest::new(image).with_location("CA");
//!     let result = client
//!         .analysis()
//!         .analyze(request, &ProgressReporter::disabled())
//!         .await?;
//!
//!     println!("{} ({:?})", result.condition, result.severity);
//!     client.shutdown().await;
//!     Ok(())
//! }
//! ```

#![allow(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod core;
pub mod storage;
pub mod utils;

// Re-export main types
pub use crate::config::Config;
pub use crate::core::analysis::{
    AnalysisRequest, AnalysisResult, AnalysisService, AnalysisStage, ProgressReporter,
    WoundSeverity,
};
pub use crate::core::cache::{CacheStats, CacheStore};
pub use crate::core::health::{HealthChecker, HealthReport, HealthStatus};
pub use crate::utils::error::{
    ErrorHandler, ErrorStats, ProcessedError, Result, WoundsightError,
};

use crate::core::analysis::HttpAnalysisBackend;
use crate::storage::SnapshotStore;
use crate::utils::error::ErrorHandlerSettings;
use crate::utils::net::{ApiClient, RequestQueue};
use std::sync::Arc;
use tracing::{info, warn};

/// Top-level client that wires the cache, error handler, health checker,
/// and analysis workflow together
pub struct WoundsightClient {
    config: Arc<Config>,
    cache: Arc<CacheStore>,
    errors: Arc<ErrorHandler>,
    health: Arc<HealthChecker>,
    queue: Arc<RequestQueue>,
    analysis: Arc<AnalysisService>,
}

impl WoundsightClient {
    /// Create a client from a configuration
    pub async fn new(config: Config) -> Result<Self> {
        info!("Initializing WoundSight client");
        config.validate()?;

        let cache = if config.cache.enable_persistence {
            CacheStore::with_snapshot(
                config.cache.clone(),
                SnapshotStore::new(&config.cache.persist_path),
            )?
        } else {
            CacheStore::new(config.cache.clone())?
        };
        let cache = Arc::new(cache);

        if config.cache.enable_persistence {
            if let Err(e) = cache.load_persisted().await {
                warn!("Could not restore persisted cache: {}", e);
            }
        }
        cache.start_maintenance();

        let errors = Arc::new(ErrorHandler::new(ErrorHandlerSettings {
            base_delay: config.errors.retry_base_delay(),
            log_limit: config.errors.log_limit,
        }));

        let queue = Arc::new(RequestQueue::new(config.http.max_concurrent_requests));
        let client = Arc::new(ApiClient::new(
            &config.http,
            &config.retry,
            Arc::clone(&queue),
        )?);
        let health = Arc::new(HealthChecker::new(&config.health)?);

        let backend = Arc::new(HttpAnalysisBackend::new(client));
        let analysis = Arc::new(AnalysisService::new(
            backend,
            Arc::clone(&cache),
            Arc::clone(&errors),
            Arc::clone(&health),
            config.analysis.clone(),
        ));

        info!("WoundSight client initialized");
        Ok(Self {
            config: Arc::new(config),
            cache,
            errors,
            health,
            queue,
            analysis,
        })
    }

    /// Client configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Analysis workflow service
    pub fn analysis(&self) -> &AnalysisService {
        &self.analysis
    }

    /// Client cache
    pub fn cache(&self) -> &CacheStore {
        &self.cache
    }

    /// Error handler and its log
    pub fn errors(&self) -> &ErrorHandler {
        &self.errors
    }

    /// Backend health checker
    pub fn health(&self) -> &HealthChecker {
        &self.health
    }

    /// Request queue shared by all backend calls
    pub fn queue(&self) -> &RequestQueue {
        &self.queue
    }

    /// Flush cache state and stop background tasks
    pub async fn shutdown(&self) {
        info!("Shutting down WoundSight client");
        self.cache.shutdown().await;
    }
}

// Version information
/// Current version of the crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
/// Name of the crate
pub const NAME: &str = env!("CARGO_PKG_NAME");
/// Description of the crate
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

/// Client build information
#[derive(Debug, Clone)]
pub struct BuildInfo {
    /// Version number
    pub version: &'static str,
    /// Unix timestamp of the build
    pub build_time: &'static str,
    /// Git commit hash
    pub git_hash: &'static str,
    /// Rust version used for the build
    pub rust_version: &'static str,
}

impl Default for BuildInfo {
    fn default() -> Self {
        Self {
            version: VERSION,
            build_time: env!("BUILD_TIME"),
            git_hash: env!("GIT_HASH"),
            rust_version: env!("RUST_VERSION"),
        }
    }
}

/// Build information captured at compile time
pub fn build_info() -> BuildInfo {
    BuildInfo::default()
}

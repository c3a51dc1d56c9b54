//! Configuration data models
//!
//! This module defines all configuration structures used throughout the
//! client. Every field has a default so a partial file or empty
//! environment still yields a working configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// HTTP transport configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpSettings {
    /// Base URL of the analysis backend
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// User-Agent header sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// TCP connect timeout in milliseconds
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
    /// Default per-request deadline in milliseconds
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    /// Maximum number of backend requests in flight at once
    #[serde(default = "default_max_concurrent_requests")]
    pub max_concurrent_requests: usize,
}

impl HttpSettings {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            user_agent: default_user_agent(),
            connect_timeout_ms: default_connect_timeout_ms(),
            request_timeout_ms: default_request_timeout_ms(),
            max_concurrent_requests: default_max_concurrent_requests(),
        }
    }
}

/// Retry behavior for transient request failures
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrySettings {
    /// Total attempts per request, including the first
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Delay before the first retry in milliseconds
    #[serde(default = "default_retry_base_delay_ms")]
    pub base_delay_ms: u64,
    /// Upper bound on the backoff delay in milliseconds
    #[serde(default = "default_retry_max_delay_ms")]
    pub max_delay_ms: u64,
}

impl RetrySettings {
    pub fn base_delay(&self) -> Duration {
        Duration::from_millis(self.base_delay_ms)
    }

    pub fn max_delay(&self) -> Duration {
        Duration::from_millis(self.max_delay_ms)
    }
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            base_delay_ms: default_retry_base_delay_ms(),
            max_delay_ms: default_retry_max_delay_ms(),
        }
    }
}

/// Client cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheSettings {
    /// Maximum number of entries before eviction starts
    #[serde(default = "default_cache_max_size")]
    pub max_size: usize,
    /// Default entry TTL in milliseconds
    #[serde(default = "default_cache_ttl_ms")]
    pub default_ttl_ms: u64,
    /// How often the background sweeper drops expired entries
    #[serde(default = "default_cleanup_interval_ms")]
    pub cleanup_interval_ms: u64,
    /// Persist the cache to disk across restarts
    #[serde(default)]
    pub enable_persistence: bool,
    /// Snapshot file path used when persistence is enabled
    #[serde(default = "default_persist_path")]
    pub persist_path: String,
    /// Debounce window for snapshot writes in milliseconds; zero writes
    /// through on every change
    #[serde(default = "default_persist_debounce_ms")]
    pub persist_debounce_ms: u64,
}

impl CacheSettings {
    pub fn default_ttl(&self) -> Duration {
        Duration::from_millis(self.default_ttl_ms)
    }

    pub fn cleanup_interval(&self) -> Duration {
        Duration::from_millis(self.cleanup_interval_ms)
    }

    pub fn persist_debounce(&self) -> Duration {
        Duration::from_millis(self.persist_debounce_ms)
    }
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            max_size: default_cache_max_size(),
            default_ttl_ms: default_cache_ttl_ms(),
            cleanup_interval_ms: default_cleanup_interval_ms(),
            enable_persistence: false,
            persist_path: default_persist_path(),
            persist_debounce_ms: default_persist_debounce_ms(),
        }
    }
}

/// Backend health checking configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthSettings {
    /// Endpoints probed in order until one answers
    #[serde(default = "default_health_endpoints")]
    pub endpoints: Vec<String>,
    /// Per-probe timeout in milliseconds
    #[serde(default = "default_health_timeout_ms")]
    pub timeout_ms: u64,
    /// How long a health verdict is reused before re-probing
    #[serde(default = "default_health_cache_ttl_ms")]
    pub cache_ttl_ms: u64,
    /// Probes slower than this are reported as degraded
    #[serde(default = "default_degraded_threshold_ms")]
    pub degraded_threshold_ms: u64,
}

impl HealthSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_millis(self.cache_ttl_ms)
    }
}

impl Default for HealthSettings {
    fn default() -> Self {
        Self {
            endpoints: default_health_endpoints(),
            timeout_ms: default_health_timeout_ms(),
            cache_ttl_ms: default_health_cache_ttl_ms(),
            degraded_threshold_ms: default_degraded_threshold_ms(),
        }
    }
}

/// Analysis workflow configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisSettings {
    /// Base deadline for the combined analysis call in milliseconds
    #[serde(default = "default_analysis_base_timeout_ms")]
    pub base_timeout_ms: u64,
    /// Extra deadline per MiB of image data in milliseconds
    #[serde(default = "default_analysis_timeout_per_mib_ms")]
    pub timeout_per_mib_ms: u64,
    /// Lower bound on the computed deadline in milliseconds
    #[serde(default = "default_analysis_min_timeout_ms")]
    pub min_timeout_ms: u64,
    /// Upper bound on the computed deadline in milliseconds
    #[serde(default = "default_analysis_max_timeout_ms")]
    pub max_timeout_ms: u64,
    /// How long analysis results stay cached in milliseconds
    #[serde(default = "default_result_ttl_ms")]
    pub result_ttl_ms: u64,
    /// How long treatment plans and doctor lists stay cached in
    /// milliseconds
    #[serde(default = "default_reference_ttl_ms")]
    pub reference_ttl_ms: u64,
}

impl AnalysisSettings {
    /// Deadline for a combined analysis call, scaled by the image size
    /// and clamped to the configured bounds
    pub fn timeout_for_payload(&self, payload_bytes: usize) -> Duration {
        let mib = payload_bytes as f64 / (1024.0 * 1024.0);
        let ms = self.base_timeout_ms as f64 + mib * self.timeout_per_mib_ms as f64;
        let clamped = ms.max(self.min_timeout_ms as f64).min(self.max_timeout_ms as f64);
        Duration::from_millis(clamped as u64)
    }

    pub fn result_ttl(&self) -> Duration {
        Duration::from_millis(self.result_ttl_ms)
    }

    pub fn reference_ttl(&self) -> Duration {
        Duration::from_millis(self.reference_ttl_ms)
    }
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            base_timeout_ms: default_analysis_base_timeout_ms(),
            timeout_per_mib_ms: default_analysis_timeout_per_mib_ms(),
            min_timeout_ms: default_analysis_min_timeout_ms(),
            max_timeout_ms: default_analysis_max_timeout_ms(),
            result_ttl_ms: default_result_ttl_ms(),
            reference_ttl_ms: default_reference_ttl_ms(),
        }
    }
}

/// Error handler configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorHandlingSettings {
    /// Delay before the first retry of a failed operation in milliseconds
    #[serde(default = "default_error_retry_base_delay_ms")]
    pub retry_base_delay_ms: u64,
    /// Maximum number of processed errors kept in the in-memory log
    #[serde(default = "default_error_log_limit")]
    pub log_limit: usize,
}

impl ErrorHandlingSettings {
    pub fn retry_base_delay(&self) -> Duration {
        Duration::from_millis(self.retry_base_delay_ms)
    }
}

impl Default for ErrorHandlingSettings {
    fn default() -> Self {
        Self {
            retry_base_delay_ms: default_error_retry_base_delay_ms(),
            log_limit: default_error_log_limit(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Log level filter, overridden by RUST_LOG when set
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Output format, either "pretty" or "json"
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

/// Default backend base URL
pub fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}

/// Default User-Agent header
pub fn default_user_agent() -> String {
    format!("woundsight-core/{}", env!("CARGO_PKG_VERSION"))
}

/// Default TCP connect timeout
pub fn default_connect_timeout_ms() -> u64 {
    5_000
}

/// Default per-request deadline
pub fn default_request_timeout_ms() -> u64 {
    30_000
}

/// Default request concurrency limit
pub fn default_max_concurrent_requests() -> usize {
    4
}

/// Default total attempts per request
pub fn default_max_attempts() -> u32 {
    3
}

/// Default delay before the first request retry
pub fn default_retry_base_delay_ms() -> u64 {
    500
}

/// Default backoff delay ceiling
pub fn default_retry_max_delay_ms() -> u64 {
    10_000
}

/// Default cache capacity
pub fn default_cache_max_size() -> usize {
    100
}

/// Default cache entry TTL (five minutes)
pub fn default_cache_ttl_ms() -> u64 {
    300_000
}

/// Default expired entry sweep interval
pub fn default_cleanup_interval_ms() -> u64 {
    60_000
}

/// Default snapshot file path
pub fn default_persist_path() -> String {
    "woundsight_cache.json".to_string()
}

/// Default snapshot write debounce
pub fn default_persist_debounce_ms() -> u64 {
    2_000
}

/// Default health probe endpoints
pub fn default_health_endpoints() -> Vec<String> {
    vec![default_base_url()]
}

/// Default per-probe timeout
pub fn default_health_timeout_ms() -> u64 {
    3_000
}

/// Default health verdict TTL
pub fn default_health_cache_ttl_ms() -> u64 {
    30_000
}

/// Default degraded latency threshold
pub fn default_degraded_threshold_ms() -> u64 {
    1_500
}

/// Default base analysis deadline
pub fn default_analysis_base_timeout_ms() -> u64 {
    30_000
}

/// Default extra deadline per MiB of image
pub fn default_analysis_timeout_per_mib_ms() -> u64 {
    10_000
}

/// Default analysis deadline floor
pub fn default_analysis_min_timeout_ms() -> u64 {
    15_000
}

/// Default analysis deadline ceiling (two minutes)
pub fn default_analysis_max_timeout_ms() -> u64 {
    120_000
}

/// Default analysis result TTL (thirty minutes)
pub fn default_result_ttl_ms() -> u64 {
    1_800_000
}

/// Default reference data TTL (one hour)
pub fn default_reference_ttl_ms() -> u64 {
    3_600_000
}

/// Default delay before the first operation retry
pub fn default_error_retry_base_delay_ms() -> u64 {
    1_000
}

/// Default processed error log capacity
pub fn default_error_log_limit() -> usize {
    500
}

/// Default log level
pub fn default_log_level() -> String {
    "info".to_string()
}

/// Default log format
pub fn default_log_format() -> String {
    "pretty".to_string()
}

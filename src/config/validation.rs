//! Configuration validation
//!
//! This module provides validation logic for all configuration structures.

use super::models::*;
use url::Url;

/// Validation trait for configuration structures
pub trait Validate {
    fn validate(&self) -> Result<(), String>;
}

fn check_endpoint_url(url_str: &str, context: &str) -> Result<(), String> {
    let url =
        Url::parse(url_str).map_err(|e| format!("{} has invalid URL format: {}", context, e))?;

    match url.scheme() {
        "http" | "https" => {}
        scheme => {
            return Err(format!(
                "{} must use http:// or https:// scheme, got: {}",
                context, scheme
            ));
        }
    }

    if url.host_str().is_none() {
        return Err(format!("{} URL must have a host", context));
    }

    Ok(())
}

impl Validate for HttpSettings {
    fn validate(&self) -> Result<(), String> {
        check_endpoint_url(&self.base_url, "base_url")?;
        if self.user_agent.is_empty() {
            return Err("user_agent cannot be empty".to_string());
        }
        if self.connect_timeout_ms == 0 {
            return Err("connect_timeout_ms must be greater than 0".to_string());
        }
        if self.request_timeout_ms == 0 {
            return Err("request_timeout_ms must be greater than 0".to_string());
        }
        if self.max_concurrent_requests == 0 {
            return Err("max_concurrent_requests must be greater than 0".to_string());
        }
        Ok(())
    }
}

impl Validate for RetrySettings {
    fn validate(&self) -> Result<(), String> {
        if self.max_attempts == 0 {
            return Err("max_attempts must be at least 1".to_string());
        }
        if self.base_delay_ms == 0 {
            return Err("base_delay_ms must be greater than 0".to_string());
        }
        if self.max_delay_ms < self.base_delay_ms {
            return Err("max_delay_ms cannot be smaller than base_delay_ms".to_string());
        }
        Ok(())
    }
}

impl Validate for CacheSettings {
    fn validate(&self) -> Result<(), String> {
        if self.max_size == 0 {
            return Err("max_size must be at least 1".to_string());
        }
        if self.default_ttl_ms == 0 {
            return Err("default_ttl_ms must be greater than 0".to_string());
        }
        if self.cleanup_interval_ms == 0 {
            return Err("cleanup_interval_ms must be greater than 0".to_string());
        }
        if self.enable_persistence && self.persist_path.is_empty() {
            return Err("persist_path cannot be empty when persistence is enabled".to_string());
        }
        Ok(())
    }
}

impl Validate for HealthSettings {
    fn validate(&self) -> Result<(), String> {
        if self.endpoints.is_empty() {
            return Err("at least one health endpoint must be configured".to_string());
        }
        for endpoint in &self.endpoints {
            check_endpoint_url(endpoint, "health endpoint")?;
        }
        if self.timeout_ms == 0 {
            return Err("timeout_ms must be greater than 0".to_string());
        }
        if self.cache_ttl_ms == 0 {
            return Err("cache_ttl_ms must be greater than 0".to_string());
        }
        Ok(())
    }
}

impl Validate for AnalysisSettings {
    fn validate(&self) -> Result<(), String> {
        if self.base_timeout_ms == 0 {
            return Err("base_timeout_ms must be greater than 0".to_string());
        }
        if self.min_timeout_ms == 0 {
            return Err("min_timeout_ms must be greater than 0".to_string());
        }
        if self.max_timeout_ms < self.min_timeout_ms {
            return Err("max_timeout_ms cannot be smaller than min_timeout_ms".to_string());
        }
        if self.result_ttl_ms == 0 || self.reference_ttl_ms == 0 {
            return Err("cache TTLs must be greater than 0".to_string());
        }
        Ok(())
    }
}

impl Validate for ErrorHandlingSettings {
    fn validate(&self) -> Result<(), String> {
        if self.retry_base_delay_ms == 0 {
            return Err("retry_base_delay_ms must be greater than 0".to_string());
        }
        if self.log_limit == 0 {
            return Err("log_limit must be at least 1".to_string());
        }
        Ok(())
    }
}

impl Validate for LoggingSettings {
    fn validate(&self) -> Result<(), String> {
        if self.level.is_empty() {
            return Err("level cannot be empty".to_string());
        }
        if !matches!(self.format.as_str(), "pretty" | "json") {
            return Err(format!(
                "unknown log format '{}', expected pretty or json",
                self.format
            ));
        }
        Ok(())
    }
}

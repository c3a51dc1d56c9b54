//! Health status types and reports
//!
//! Core types describing the reachability of the analysis backend.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Backend health levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HealthStatus {
    /// Backend responded promptly
    Healthy,
    /// Backend responded, but slower than the degraded threshold
    Degraded,
    /// No health endpoint responded
    Unreachable,
}

impl HealthStatus {
    /// Check if the status allows analysis requests. A degraded backend
    /// still accepts work; only an unreachable one blocks it.
    pub fn allows_requests(&self) -> bool {
        !matches!(self, HealthStatus::Unreachable)
    }
}

/// Health check report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthReport {
    /// Health status
    pub status: HealthStatus,
    /// The endpoint that answered, when one did
    pub endpoint: Option<String>,
    /// Response time in milliseconds
    pub response_time_ms: u64,
    /// Timestamp of the check
    pub checked_at: DateTime<Utc>,
    /// Error message when unreachable
    pub error: Option<String>,
}

impl HealthReport {
    /// Create a healthy report
    pub fn healthy(endpoint: &str, response_time_ms: u64) -> Self {
        Self {
            status: HealthStatus::Healthy,
            endpoint: Some(endpoint.to_string()),
            response_time_ms,
            checked_at: Utc::now(),
            error: None,
        }
    }

    /// Create a degraded report
    pub fn degraded(endpoint: &str, response_time_ms: u64) -> Self {
        Self {
            status: HealthStatus::Degraded,
            endpoint: Some(endpoint.to_string()),
            response_time_ms,
            checked_at: Utc::now(),
            error: None,
        }
    }

    /// Create an unreachable report
    pub fn unreachable(error: String) -> Self {
        Self {
            status: HealthStatus::Unreachable,
            endpoint: None,
            response_time_ms: 0,
            checked_at: Utc::now(),
            error: Some(error),
        }
    }
}

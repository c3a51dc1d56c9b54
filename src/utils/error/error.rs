//! Error types for the WoundSight client core
//!
//! This module defines the crate-wide error type and its conversions.

use super::processed::ProcessedError;
use thiserror::Error;

/// Result type alias for the crate
pub type Result<T> = std::result::Result<T, WoundsightError>;

/// Main error type for the client core
#[derive(Error, Debug)]
pub enum WoundsightError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Cache errors
    #[error("Cache error: {0}")]
    Cache(String),

    /// Persistent storage errors
    #[error("Storage error: {0}")]
    Storage(String),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Connection-level transport failures
    #[error("Network error: {0}")]
    Network(String),

    /// Deadline or transport timeouts
    #[error("Request timeout: {0}")]
    Timeout(String),

    /// Non-success HTTP responses from the analysis backend
    #[error("API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    /// Backend failed its health probe on every configured endpoint
    #[error("Backend unreachable: {0}")]
    BackendUnreachable(String),

    /// A concurrent analysis for the same thread is already running
    #[error("Analysis already in progress for thread {0}")]
    AnalysisInProgress(String),

    /// Analysis workflow failures
    #[error("Analysis error: {0}")]
    Analysis(String),

    /// Response parsing errors
    #[error("Parsing error: {0}")]
    Parsing(String),

    /// Internal errors
    #[error("Internal error: {0}")]
    Internal(String),

    /// A failure that has been classified by the error handler
    #[error("{0}")]
    Processed(Box<ProcessedError>),
}

/// Helper functions for creating specific errors
impl WoundsightError {
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config(message.into())
    }

    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation(message.into())
    }

    pub fn cache<S: Into<String>>(message: S) -> Self {
        Self::Cache(message.into())
    }

    pub fn storage<S: Into<String>>(message: S) -> Self {
        Self::Storage(message.into())
    }

    pub fn network<S: Into<String>>(message: S) -> Self {
        Self::Network(message.into())
    }

    pub fn timeout<S: Into<String>>(message: S) -> Self {
        Self::Timeout(message.into())
    }

    pub fn api<S: Into<String>>(status: u16, message: S) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    pub fn unreachable<S: Into<String>>(message: S) -> Self {
        Self::BackendUnreachable(message.into())
    }

    pub fn analysis<S: Into<String>>(message: S) -> Self {
        Self::Analysis(message.into())
    }

    pub fn parsing<S: Into<String>>(message: S) -> Self {
        Self::Parsing(message.into())
    }

    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal(message.into())
    }
}

impl WoundsightError {
    /// HTTP status carried by this error, if any
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Statuses the transport retries with backoff
    pub fn is_retryable_status(status: u16) -> bool {
        matches!(status, 500 | 502 | 503 | 504 | 408 | 429)
    }

    /// Statuses that terminate a call immediately, since retrying cannot
    /// change an authorization or not-found outcome
    pub fn is_fast_fail_status(status: u16) -> bool {
        matches!(status, 401 | 403 | 404 | 422)
    }

    /// Whether the transport retry loop may re-attempt after this failure.
    /// Deadline timeouts are deliberately excluded; whether to retry a
    /// timed-out operation is the caller's decision.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Network(_) => true,
            Self::Api { status, .. } => Self::is_retryable_status(*status),
            _ => false,
        }
    }
}

impl From<reqwest::Error> for WoundsightError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout(format!("request timed out: {}", err))
        } else if err.is_connect() {
            Self::Network(format!("network error: connection failed: {}", err))
        } else if err.is_decode() {
            Self::Parsing(format!("failed to decode response: {}", err))
        } else {
            Self::Network(format!("network error: {}", err))
        }
    }
}

impl From<ProcessedError> for WoundsightError {
    fn from(err: ProcessedError) -> Self {
        Self::Processed(Box::new(err))
    }
}

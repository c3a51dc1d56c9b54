//! Failure classification
//!
//! Maps arbitrary failures onto a fixed taxonomy with per-category defaults
//! for severity, retryability, and user-facing guidance. Classification is a
//! pure function over a normalized descriptor so it can be tested in
//! isolation from the transport layer.

use super::error::WoundsightError;
use serde::Serialize;
use std::fmt;

/// Error taxonomy used across the client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ErrorKind {
    Network,
    Timeout,
    Authentication,
    Validation,
    Server,
    Client,
    Unknown,
}

impl ErrorKind {
    /// Stable wire name for logs and the error log
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Network => "NETWORK_ERROR",
            Self::Timeout => "TIMEOUT_ERROR",
            Self::Authentication => "AUTHENTICATION_ERROR",
            Self::Validation => "VALIDATION_ERROR",
            Self::Server => "SERVER_ERROR",
            Self::Client => "CLIENT_ERROR",
            Self::Unknown => "UNKNOWN_ERROR",
        }
    }

    pub fn default_severity(&self) -> ErrorSeverity {
        match self {
            Self::Authentication | Self::Server => ErrorSeverity::High,
            Self::Validation => ErrorSeverity::Low,
            Self::Network | Self::Timeout | Self::Client | Self::Unknown => ErrorSeverity::Medium,
        }
    }

    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Network | Self::Timeout | Self::Server | Self::Unknown
        )
    }

    pub fn default_max_retries(&self) -> u32 {
        match self {
            Self::Network => 3,
            Self::Timeout => 2,
            Self::Server => 2,
            Self::Unknown => 1,
            Self::Authentication | Self::Validation | Self::Client => 0,
        }
    }

    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Network => {
                "Connection problem. Please check your internet connection and try again."
            }
            Self::Timeout => "The request took too long. Please try again.",
            Self::Authentication => "Your session is no longer valid. Please sign in again.",
            Self::Validation => {
                "Some of the provided information is invalid. Please review and try again."
            }
            Self::Server => {
                "The service is temporarily unavailable. Please try again in a few minutes."
            }
            Self::Client => "The request could not be completed. Please try again.",
            Self::Unknown => "Something went wrong. Please try again.",
        }
    }

    pub fn suggestions(&self) -> &'static [&'static str] {
        match self {
            Self::Network => &[
                "Check your internet connection",
                "Try again in a few moments",
                "Switch to a more stable network if possible",
            ],
            Self::Timeout => &[
                "Try again",
                "Use a smaller photo if you are uploading one",
                "Check your connection speed",
            ],
            Self::Authentication => &[
                "Sign in again",
                "Contact support if the problem persists",
            ],
            Self::Validation => &[
                "Review the highlighted fields",
                "Make sure the photo is in a supported format",
            ],
            Self::Server => &[
                "Wait a few minutes and try again",
                "Contact support if the outage continues",
            ],
            Self::Client => &[
                "Refresh and try again",
                "Update the app to the latest version",
            ],
            Self::Unknown => &[
                "Try again",
                "Restart the app if the problem persists",
            ],
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Severity attached to every processed error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ErrorSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }
}

impl fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalized view of a failure, fed to [`classify`]
#[derive(Debug, Clone, Default, Serialize)]
pub struct ErrorDescriptor {
    /// Source error name, when one exists (e.g. the enum variant)
    pub name: Option<String>,
    /// Raw technical message
    pub message: String,
    /// HTTP status, when the failure came from a response
    pub status_code: Option<u16>,
}

impl ErrorDescriptor {
    pub fn new<S: Into<String>>(message: S) -> Self {
        Self {
            name: None,
            message: message.into(),
            status_code: None,
        }
    }

    pub fn with_name<S: Into<String>>(mut self, name: S) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status_code = Some(status);
        self
    }
}

impl From<&str> for ErrorDescriptor {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

impl From<String> for ErrorDescriptor {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}

impl From<&WoundsightError> for ErrorDescriptor {
    fn from(err: &WoundsightError) -> Self {
        let name = match err {
            WoundsightError::Config(_) => "Config",
            WoundsightError::Validation(_) => "Validation",
            WoundsightError::Cache(_) => "Cache",
            WoundsightError::Storage(_) => "Storage",
            WoundsightError::Serialization(_) => "Serialization",
            WoundsightError::Yaml(_) => "Yaml",
            WoundsightError::Io(_) => "Io",
            WoundsightError::Network(_) => "Network",
            WoundsightError::Timeout(_) => "Timeout",
            WoundsightError::Api { .. } => "Api",
            WoundsightError::BackendUnreachable(_) => "BackendUnreachable",
            WoundsightError::AnalysisInProgress(_) => "AnalysisInProgress",
            WoundsightError::Analysis(_) => "Analysis",
            WoundsightError::Parsing(_) => "Parsing",
            WoundsightError::Internal(_) => "Internal",
            WoundsightError::Processed(_) => "Processed",
        };
        Self {
            name: Some(name.to_string()),
            message: err.to_string(),
            status_code: err.status_code(),
        }
    }
}

/// Classify a failure into the taxonomy.
///
/// Rules are checked in order and the first match wins. Each rule matches on
/// the status code when one is present, otherwise on case-insensitive
/// substrings of the message and name. Never fails; anything unmatched falls
/// through to [`ErrorKind::Unknown`].
pub fn classify(descriptor: &ErrorDescriptor) -> ErrorKind {
    let message = descriptor.message.to_lowercase();
    let name = descriptor
        .name
        .as_deref()
        .map(str::to_lowercase)
        .unwrap_or_default();
    let status = descriptor.status_code;

    // 1. Network: fetch-level failures and connection errors
    if message.contains("failed to fetch")
        || message.contains("network error")
        || message.contains("err_network")
        || (name == "typeerror" && message.contains("fetch"))
    {
        return ErrorKind::Network;
    }

    // 2. Timeout: deadlines and aborted requests
    if status == Some(408)
        || message.contains("timeout")
        || message.contains("timed out")
        || message.contains("aborted")
        || name == "aborterror"
    {
        return ErrorKind::Timeout;
    }

    // 3. Authentication: authorization-class failures
    if matches!(status, Some(401) | Some(403))
        || message.contains("401")
        || message.contains("403")
        || message.contains("unauthorized")
        || message.contains("forbidden")
        || message.contains("authentication")
    {
        return ErrorKind::Authentication;
    }

    // 4. Validation: input-shape failures
    if status == Some(422)
        || message.contains("validation")
        || message.contains("invalid")
        || message.contains("required")
        || message.contains("format")
    {
        return ErrorKind::Validation;
    }

    // 5. Server: backend-side failures
    if matches!(status, Some(s) if (500..=599).contains(&s))
        || message.contains("500")
        || message.contains("502")
        || message.contains("503")
        || message.contains("504")
        || message.contains("internal server error")
    {
        return ErrorKind::Server;
    }

    // 6. Client: remaining request-side failures
    if matches!(status, Some(s) if (400..=499).contains(&s))
        || message.contains("400")
        || message.contains("404")
        || message.contains("bad request")
        || message.contains("not found")
    {
        return ErrorKind::Client;
    }

    // 7. Everything else
    ErrorKind::Unknown
}

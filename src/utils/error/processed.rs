//! Processed error records
//!
//! A [`ProcessedError`] is the enriched form of a failure after
//! classification: stable id, taxonomy kind, severity, retry budget, and a
//! user-facing message. These records are what the error log stores and what
//! callers surface to the UI layer.

use super::classify::{classify, ErrorDescriptor, ErrorKind, ErrorSeverity};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use uuid::Uuid;

/// Where and when a failure happened
#[derive(Debug, Clone, Serialize)]
pub struct ErrorContext {
    pub component: Option<String>,
    pub action: Option<String>,
    pub user_id: Option<String>,
    pub url: Option<String>,
    pub user_agent: Option<String>,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub additional: HashMap<String, Value>,
}

impl ErrorContext {
    pub fn new<S: Into<String>>(component: S, action: S) -> Self {
        Self {
            component: Some(component.into()),
            action: Some(action.into()),
            ..Self::default()
        }
    }

    pub fn with_user_id<S: Into<String>>(mut self, user_id: S) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    pub fn with_url<S: Into<String>>(mut self, url: S) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn with_detail<S: Into<String>>(mut self, key: S, value: Value) -> Self {
        self.additional.insert(key.into(), value);
        self
    }
}

impl Default for ErrorContext {
    fn default() -> Self {
        Self {
            component: None,
            action: None,
            user_id: None,
            url: None,
            user_agent: None,
            timestamp: Utc::now(),
            additional: HashMap::new(),
        }
    }
}

/// Per-call overrides for the classified defaults
#[derive(Debug, Clone, Default)]
pub struct ProcessOptions {
    pub severity: Option<ErrorSeverity>,
    pub retryable: Option<bool>,
    pub max_retries: Option<u32>,
    pub user_message: Option<String>,
}

impl ProcessOptions {
    pub fn with_severity(mut self, severity: ErrorSeverity) -> Self {
        self.severity = Some(severity);
        self
    }

    pub fn with_retryable(mut self, retryable: bool) -> Self {
        self.retryable = Some(retryable);
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = Some(max_retries);
        self
    }

    pub fn with_user_message<S: Into<String>>(mut self, message: S) -> Self {
        self.user_message = Some(message.into());
        self
    }
}

/// A classified and enriched failure record
#[derive(Debug, Clone, Serialize, thiserror::Error)]
#[error("[{kind}] {technical_message}")]
pub struct ProcessedError {
    pub id: Uuid,
    pub kind: ErrorKind,
    pub severity: ErrorSeverity,
    pub retryable: bool,
    pub retry_count: u32,
    pub max_retries: u32,
    pub user_message: String,
    pub technical_message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
    pub suggestions: Vec<String>,
    pub context: ErrorContext,
}

impl ProcessedError {
    /// Classify a descriptor and build the full record, applying any
    /// per-call overrides on top of the kind's defaults.
    pub fn from_descriptor(
        descriptor: ErrorDescriptor,
        context: ErrorContext,
        options: ProcessOptions,
    ) -> Self {
        let kind = classify(&descriptor);
        Self {
            id: Uuid::new_v4(),
            kind,
            severity: options.severity.unwrap_or_else(|| kind.default_severity()),
            retryable: options.retryable.unwrap_or_else(|| kind.is_retryable()),
            max_retries: options
                .max_retries
                .unwrap_or_else(|| kind.default_max_retries()),
            user_message: options
                .user_message
                .unwrap_or_else(|| kind.user_message().to_string()),
            technical_message: descriptor.message,
            status_code: descriptor.status_code,
            suggestions: kind.suggestions().iter().map(|s| s.to_string()).collect(),
            retry_count: 0,
            context,
        }
    }
}

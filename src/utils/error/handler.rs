//! Central error handler
//!
//! Funnels every failure through one place: classification, severity-based
//! logging, an in-memory error log with stats, retry orchestration with
//! exponential backoff, and optional fallback execution for calls that have
//! a degraded answer available.

use super::classify::{ErrorDescriptor, ErrorSeverity};
use super::error::{Result, WoundsightError};
use super::processed::{ErrorContext, ProcessOptions, ProcessedError};
use dashmap::DashMap;
use parking_lot::RwLock;
use serde::Serialize;
use serde_json::json;
use std::collections::{HashMap, VecDeque};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Receiver for processed errors, e.g. a crash reporter in production builds
pub trait ErrorSink: Send + Sync {
    fn report(&self, error: &ProcessedError);
}

/// Tunables for the handler
#[derive(Debug, Clone)]
pub struct ErrorHandlerSettings {
    /// First retry delay; doubles on each subsequent retry
    pub base_delay: Duration,
    /// Maximum number of records kept in the in-memory log
    pub log_limit: usize,
}

impl Default for ErrorHandlerSettings {
    fn default() -> Self {
        Self {
            base_delay: Duration::from_secs(1),
            log_limit: 500,
        }
    }
}

/// Aggregate view over the recent error log
#[derive(Debug, Clone, Serialize)]
pub struct ErrorStats {
    pub total: usize,
    pub by_kind: HashMap<String, usize>,
    pub by_severity: HashMap<String, usize>,
    pub recent: Vec<ProcessedError>,
}

/// Shared error handler; cheap to clone behind an [`Arc`]
pub struct ErrorHandler {
    settings: ErrorHandlerSettings,
    log: RwLock<VecDeque<ProcessedError>>,
    attempts: DashMap<String, u32>,
    sink: Option<Arc<dyn ErrorSink>>,
}

impl ErrorHandler {
    pub fn new(settings: ErrorHandlerSettings) -> Self {
        Self {
            settings,
            log: RwLock::new(VecDeque::new()),
            attempts: DashMap::new(),
            sink: None,
        }
    }

    /// Attach a sink that receives every processed error
    pub fn with_sink(mut self, sink: Arc<dyn ErrorSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Classify and record a failure. Never fails; unmatched input becomes
    /// an `UNKNOWN_ERROR` record.
    pub fn process<E>(
        &self,
        source: E,
        context: ErrorContext,
        options: Option<ProcessOptions>,
    ) -> ProcessedError
    where
        E: Into<ErrorDescriptor>,
    {
        let processed = ProcessedError::from_descriptor(
            source.into(),
            context,
            options.unwrap_or_default(),
        );
        self.record(&processed);
        processed
    }

    /// Retries recorded for an operation that has not yet succeeded
    pub fn recorded_attempts(&self, operation_id: &str) -> u32 {
        self.attempts
            .get(operation_id)
            .map(|entry| *entry.value())
            .unwrap_or(0)
    }

    /// Run `operation` up to `max_retries` times with exponential backoff.
    ///
    /// The first attempt runs immediately; before attempt N+1 the task sleeps
    /// `base_delay * 2^(N-1)`. Attempt counts are tracked per operation id and
    /// cleared on success or exhaustion. On exhaustion the returned record
    /// names the operation and carries the final attempt count.
    pub async fn retry_operation<T, F, Fut>(
        &self,
        operation_id: &str,
        base_delay: Duration,
        max_retries: u32,
        mut operation: F,
    ) -> std::result::Result<T, ProcessedError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let max_retries = max_retries.max(1);
        let mut last_error: Option<WoundsightError> = None;

        for attempt in 1..=max_retries {
            match operation().await {
                Ok(value) => {
                    self.attempts.remove(operation_id);
                    if attempt > 1 {
                        debug!(
                            "Operation {} succeeded on attempt {}/{}",
                            operation_id, attempt, max_retries
                        );
                    }
                    return Ok(value);
                }
                Err(err) => {
                    self.attempts.insert(operation_id.to_string(), attempt);
                    debug!(
                        "Operation {} failed on attempt {}/{}: {}",
                        operation_id, attempt, max_retries, err
                    );
                    last_error = Some(err);
                    if attempt < max_retries {
                        let delay = base_delay * 2u32.saturating_pow(attempt - 1);
                        tokio::time::sleep(delay).await;
                    }
                }
            }
        }

        let recorded = self.recorded_attempts(operation_id);
        self.attempts.remove(operation_id);
        let last = last_error
            .map(|e| e.to_string())
            .unwrap_or_else(|| "unknown failure".to_string());
        let descriptor = ErrorDescriptor::new(format!(
            "Max retries exceeded for operation: {} (last error: {})",
            operation_id, last
        ));
        let context = ErrorContext::new("error_handler", "retry_operation")
            .with_detail("operation_id", json!(operation_id));
        let mut terminal = ProcessedError::from_descriptor(
            descriptor,
            context,
            ProcessOptions::default().with_retryable(false),
        );
        terminal.retry_count = recorded;
        self.record(&terminal);
        Err(terminal)
    }

    /// Run an API call once and, when the failure is retryable, hand it to
    /// [`Self::retry_operation`] with the kind's retry budget. On exhaustion
    /// the original processed error is returned, not the terminal retry
    /// record.
    pub async fn handle_api_call<T, F, Fut>(
        &self,
        context: ErrorContext,
        mut call: F,
    ) -> std::result::Result<T, ProcessedError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        match call().await {
            Ok(value) => Ok(value),
            Err(err) => {
                let processed = self.process(&err, context, None);
                if processed.retryable && processed.max_retries > 0 {
                    let operation_id = processed.id.to_string();
                    match self
                        .retry_operation(
                            &operation_id,
                            self.settings.base_delay,
                            processed.max_retries,
                            call,
                        )
                        .await
                    {
                        Ok(value) => Ok(value),
                        Err(_) => Err(processed),
                    }
                } else {
                    Err(processed)
                }
            }
        }
    }

    /// Like [`Self::handle_api_call`], but runs `fallback` when the primary
    /// call fails for good. Non-retryable failures skip straight to the
    /// fallback. A fallback failure is processed and returned in place of
    /// the primary error.
    pub async fn handle_api_call_with_fallback<T, F, Fut, FB, FbFut>(
        &self,
        context: ErrorContext,
        call: F,
        fallback: FB,
    ) -> std::result::Result<T, ProcessedError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
        FB: FnOnce() -> FbFut,
        FbFut: Future<Output = Result<T>>,
    {
        match self.handle_api_call(context.clone(), call).await {
            Ok(value) => Ok(value),
            Err(primary) => {
                warn!(
                    "Primary call failed ({}), using fallback: {}",
                    primary.kind, primary.technical_message
                );
                match fallback().await {
                    Ok(value) => Ok(value),
                    Err(fb_err) => Err(self.process(&fb_err, context, None)),
                }
            }
        }
    }

    /// Aggregate counts over the in-memory log (capped at `log_limit`
    /// records) plus the ten most recent records, newest first.
    pub fn stats(&self) -> ErrorStats {
        let log = self.log.read();
        let mut by_kind: HashMap<String, usize> = HashMap::new();
        let mut by_severity: HashMap<String, usize> = HashMap::new();
        for record in log.iter() {
            *by_kind.entry(record.kind.as_str().to_string()).or_insert(0) += 1;
            *by_severity
                .entry(record.severity.as_str().to_string())
                .or_insert(0) += 1;
        }
        ErrorStats {
            total: log.len(),
            by_kind,
            by_severity,
            recent: log.iter().rev().take(10).cloned().collect(),
        }
    }

    pub fn clear_log(&self) {
        self.log.write().clear();
    }

    fn record(&self, processed: &ProcessedError) {
        match processed.severity {
            ErrorSeverity::Low => info!(
                "[{}] {} (id: {})",
                processed.kind, processed.technical_message, processed.id
            ),
            ErrorSeverity::Medium => warn!(
                "[{}] {} (id: {})",
                processed.kind, processed.technical_message, processed.id
            ),
            ErrorSeverity::High | ErrorSeverity::Critical => error!(
                "[{}] {} (id: {})",
                processed.kind, processed.technical_message, processed.id
            ),
        }

        if let Some(sink) = &self.sink {
            sink.report(processed);
        }

        let mut log = self.log.write();
        if log.len() >= self.settings.log_limit {
            log.pop_front();
        }
        log.push_back(processed.clone());
    }
}

impl Default for ErrorHandler {
    fn default() -> Self {
        Self::new(ErrorHandlerSettings::default())
    }
}

//! Backend HTTP client
//!
//! JSON transport for the analysis backend. Every request is funneled
//! through the shared [`RequestQueue`], runs under a caller-controlled
//! deadline, and transient failures are retried with jittered exponential
//! backoff. Deadline expiry is surfaced as a timeout error and is never
//! retried here; callers decide whether a timed-out operation is worth
//! repeating.

use super::queue::RequestQueue;
use crate::config::{HttpSettings, RetrySettings};
use crate::utils::error::{Result, WoundsightError};
use reqwest::Method;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

/// Per-request overrides
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    /// Per-attempt deadline; defaults to the configured request timeout
    pub deadline: Option<Duration>,
    /// Total attempt budget; defaults to the configured retry attempts
    pub max_attempts: Option<u32>,
}

impl RequestOptions {
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = Some(max_attempts);
        self
    }
}

/// HTTP client for the analysis backend
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    settings: HttpSettings,
    retry: RetrySettings,
    queue: Arc<RequestQueue>,
}

impl ApiClient {
    pub fn new(
        settings: &HttpSettings,
        retry: &RetrySettings,
        queue: Arc<RequestQueue>,
    ) -> Result<Self> {
        let base_url = Url::parse(&settings.base_url).map_err(|e| {
            WoundsightError::config(format!(
                "invalid base URL '{}': {}",
                settings.base_url, e
            ))
        })?;

        // Deadlines are enforced per attempt with tokio timeouts, so the
        // builder only carries the connect timeout
        let http = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout())
            .user_agent(&settings.user_agent)
            .build()
            .map_err(|e| {
                WoundsightError::internal(format!("failed to build HTTP client: {}", e))
            })?;

        Ok(Self {
            http,
            base_url,
            settings: settings.clone(),
            retry: retry.clone(),
            queue,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub async fn get_json(&self, path: &str, options: &RequestOptions) -> Result<Value> {
        self.execute_json(Method::GET, path, None, options).await
    }

    pub async fn post_json(
        &self,
        path: &str,
        body: &Value,
        options: &RequestOptions,
    ) -> Result<Value> {
        self.execute_json(Method::POST, path, Some(body), options)
            .await
    }

    async fn execute_json(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
        options: &RequestOptions,
    ) -> Result<Value> {
        let url = join_url(self.base_url.as_str(), path);
        let deadline = options
            .deadline
            .unwrap_or_else(|| self.settings.request_timeout());
        let max_attempts = options.max_attempts.unwrap_or(self.retry.max_attempts).max(1);

        self.queue
            .run(self.request_with_retry(method, url, body, deadline, max_attempts))
            .await
    }

    async fn request_with_retry(
        &self,
        method: Method,
        url: String,
        body: Option<&Value>,
        deadline: Duration,
        max_attempts: u32,
    ) -> Result<Value> {
        let mut delay = self.retry.base_delay();
        let mut attempt = 1u32;

        loop {
            match self.attempt_once(method.clone(), &url, body, deadline).await {
                Ok(value) => return Ok(value),
                Err(err) => {
                    if !err.is_retryable() || attempt >= max_attempts {
                        if attempt > 1 {
                            warn!(
                                "Request to {} failed after {} attempts: {}",
                                url, attempt, err
                            );
                        }
                        return Err(err);
                    }
                    let pause = jittered(delay);
                    debug!(
                        "Request to {} failed (attempt {}/{}), retrying in {}ms: {}",
                        url,
                        attempt,
                        max_attempts,
                        pause.as_millis(),
                        err
                    );
                    tokio::time::sleep(pause).await;
                    delay = (delay * 2).min(self.retry.max_delay());
                    attempt += 1;
                }
            }
        }
    }

    async fn attempt_once(
        &self,
        method: Method,
        url: &str,
        body: Option<&Value>,
        deadline: Duration,
    ) -> Result<Value> {
        let mut request = self.http.request(method, url);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = match tokio::time::timeout(deadline, request.send()).await {
            Ok(sent) => sent?,
            Err(_) => {
                return Err(WoundsightError::timeout(format!(
                    "request to {} timed out after {}ms",
                    url,
                    deadline.as_millis()
                )));
            }
        };

        let status = response.status();
        if status.is_success() {
            response.json::<Value>().await.map_err(|e| {
                WoundsightError::parsing(format!("failed to decode response from {}: {}", url, e))
            })
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(map_status_error(status.as_u16(), &body))
        }
    }
}

/// Join a base URL and path without doubling or dropping the slash
pub(crate) fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// Apply 10% jitter around the nominal delay
fn jittered(delay: Duration) -> Duration {
    let base = delay.as_millis() as f64;
    let jitter = base * 0.1 * (rand::random::<f64>() - 0.5);
    Duration::from_millis((base + jitter).max(0.0) as u64)
}

fn map_status_error(status: u16, body: &str) -> WoundsightError {
    WoundsightError::api(status, extract_error_message(status, body))
}

/// Pull a human-readable message out of an error response body.
///
/// Handles the common JSON shapes (`error.message`, `error`, `message`,
/// `detail`) and falls back to a truncated body snippet.
fn extract_error_message(status: u16, body: &str) -> String {
    if let Ok(json) = serde_json::from_str::<Value>(body) {
        if let Some(message) = json
            .get("error")
            .and_then(|e| e.get("message"))
            .and_then(Value::as_str)
            .or_else(|| json.get("error").and_then(Value::as_str))
            .or_else(|| json.get("message").and_then(Value::as_str))
            .or_else(|| json.get("detail").and_then(Value::as_str))
        {
            return message.to_string();
        }
    }

    let trimmed = body.trim();
    if trimmed.is_empty() {
        format!("HTTP {}", status)
    } else {
        let mut snippet: String = trimmed.chars().take(200).collect();
        if trimmed.chars().count() > 200 {
            snippet.push_str("...");
        }
        snippet
    }
}

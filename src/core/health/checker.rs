//! Health checker
//!
//! Probes the backend health endpoints in configured order and caches the
//! outcome for a short window so bursts of activity do not turn into bursts
//! of probes. The checker keeps its own HTTP client: health probes must not
//! sit behind the request queue they are meant to protect.

use super::types::{HealthReport, HealthStatus};
use crate::config::HealthSettings;
use crate::utils::error::{Result, WoundsightError};
use crate::utils::net::client::join_url;
use std::time::Instant;
use tracing::{debug, warn};

const HEALTH_CACHE_KEY: &str = "backend-health";

/// Backend health checker with a short-lived result cache
pub struct HealthChecker {
    http: reqwest::Client,
    settings: HealthSettings,
    cache: moka::future::Cache<String, HealthReport>,
}

impl HealthChecker {
    pub fn new(settings: &HealthSettings) -> Result<Self> {
        let http = reqwest::Client::builder()
            .connect_timeout(settings.timeout())
            .timeout(settings.timeout())
            .build()
            .map_err(|e| {
                WoundsightError::internal(format!("failed to build health check client: {}", e))
            })?;

        let cache = moka::future::Cache::builder()
            .max_capacity(4)
            .time_to_live(settings.cache_ttl())
            .build();

        Ok(Self {
            http,
            settings: settings.clone(),
            cache,
        })
    }

    /// Current backend health. Served from the cache within its TTL;
    /// concurrent callers share a single probe.
    pub async fn check(&self) -> HealthReport {
        self.cache
            .get_with(HEALTH_CACHE_KEY.to_string(), self.probe_all())
            .await
    }

    /// Probe now, bypassing and refreshing the cached report
    pub async fn force_check(&self) -> HealthReport {
        let report = self.probe_all().await;
        self.cache
            .insert(HEALTH_CACHE_KEY.to_string(), report.clone())
            .await;
        report
    }

    /// Walk the endpoints in order and return the first answer. Only when
    /// every endpoint fails is the backend reported unreachable.
    async fn probe_all(&self) -> HealthReport {
        let mut failures = Vec::new();

        for endpoint in &self.settings.endpoints {
            match self.probe(endpoint).await {
                Ok(report) => {
                    if report.status == HealthStatus::Degraded {
                        warn!(
                            "Health endpoint {} is slow ({}ms)",
                            endpoint, report.response_time_ms
                        );
                    } else {
                        debug!(
                            "Health endpoint {} is healthy ({}ms)",
                            endpoint, report.response_time_ms
                        );
                    }
                    return report;
                }
                Err(reason) => {
                    warn!("Health endpoint {} failed: {}", endpoint, reason);
                    failures.push(format!("{}: {}", endpoint, reason));
                }
            }
        }

        HealthReport::unreachable(format!(
            "analysis backend unreachable, all health endpoints failed: [{}]",
            failures.join(", ")
        ))
    }

    async fn probe(&self, endpoint: &str) -> std::result::Result<HealthReport, String> {
        let url = join_url(endpoint, "health");
        let started = Instant::now();

        let response = match tokio::time::timeout(
            self.settings.timeout(),
            self.http.get(&url).send(),
        )
        .await
        {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => return Err(format!("request failed: {}", e)),
            Err(_) => {
                return Err(format!(
                    "health probe timed out after {}ms",
                    self.settings.timeout().as_millis()
                ));
            }
        };

        let elapsed_ms = started.elapsed().as_millis() as u64;
        if !response.status().is_success() {
            return Err(format!(
                "health endpoint returned HTTP {}",
                response.status().as_u16()
            ));
        }

        if elapsed_ms > self.settings.degraded_threshold_ms {
            Ok(HealthReport::degraded(endpoint, elapsed_ms))
        } else {
            Ok(HealthReport::healthy(endpoint, elapsed_ms))
        }
    }
}

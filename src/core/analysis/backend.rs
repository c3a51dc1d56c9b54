//! Analysis backend transport
//!
//! The workflow talks to the backend through [`AnalysisBackend`] so the
//! HTTP transport can be swapped for a scripted one in tests.

use crate::utils::error::Result;
use crate::utils::net::{ApiClient, RequestOptions};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

/// Transport to the wound analysis backend
#[async_trait]
pub trait AnalysisBackend: Send + Sync {
    /// Run the combined analysis on a prepared payload. `deadline` bounds
    /// each attempt and scales with the image size.
    async fn complete_analysis(&self, payload: &Value, deadline: Duration) -> Result<Value>;

    /// Fetch the treatment plan for a diagnosed condition
    async fn treatment_plan(&self, condition: &str) -> Result<Value>;

    /// Fetch doctor contacts for a US state
    async fn doctor_contacts(&self, state: &str) -> Result<Value>;
}

/// [`AnalysisBackend`] backed by the shared [`ApiClient`]
#[derive(Debug, Clone)]
pub struct HttpAnalysisBackend {
    client: Arc<ApiClient>,
}

impl HttpAnalysisBackend {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl AnalysisBackend for HttpAnalysisBackend {
    async fn complete_analysis(&self, payload: &Value, deadline: Duration) -> Result<Value> {
        self.client
            .post_json(
                "api/analysis/complete_analysis",
                payload,
                &RequestOptions::default().with_deadline(deadline),
            )
            .await
    }

    async fn treatment_plan(&self, condition: &str) -> Result<Value> {
        self.client
            .get_json(
                &format!("api/treatment/plan/{condition}"),
                &RequestOptions::default(),
            )
            .await
    }

    async fn doctor_contacts(&self, state: &str) -> Result<Value> {
        self.client
            .get_json(
                &format!("api/recommendations/doctor_contact/{state}"),
                &RequestOptions::default(),
            )
            .await
    }
}

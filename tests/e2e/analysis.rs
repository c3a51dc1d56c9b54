//! E2E tests for the analysis workflow
//!
//! These tests make real backend calls and require a running backend.
//! Run with: cargo test -- --ignored

#[cfg(test)]
mod tests {
    use crate::skip_without_env;
    use woundsight_core::{
        AnalysisRequest, Config, HealthStatus, ProgressReporter, WoundsightClient,
    };

    fn live_config() -> Config {
        let base_url = std::env::var("WOUNDSIGHT_BACKEND_URL").unwrap();
        let mut config = Config::default();
        config.http.base_url = base_url.clone();
        config.health.endpoints = vec![base_url];
        config.cache.enable_persistence = false;
        config
    }

    /// E2E test probing the live backend health endpoint
    #[tokio::test]
    #[ignore]
    async fn test_live_backend_is_healthy() {
        skip_without_env!("WOUNDSIGHT_BACKEND_URL");

        let client = WoundsightClient::new(live_config()).await.unwrap();
        let report = client.health().force_check().await;
        assert_ne!(report.status, HealthStatus::Unreachable);
        assert!(report.endpoint.is_some());
        client.shutdown().await;
    }

    /// E2E test running a full analysis against the live backend
    #[tokio::test]
    #[ignore]
    async fn test_live_analysis() {
        skip_without_env!("WOUNDSIGHT_BACKEND_URL");
        skip_without_env!("WOUNDSIGHT_E2E_IMAGE");

        let image_path = std::env::var("WOUNDSIGHT_E2E_IMAGE").unwrap();
        let image = tokio::fs::read(&image_path).await.unwrap();

        let client = WoundsightClient::new(live_config()).await.unwrap();
        let request = AnalysisRequest::new(image).with_location("CA");
        let result = client
            .analysis()
            .analyze(request, &ProgressReporter::disabled())
            .await
            .unwrap();

        assert!(!result.condition.is_empty());
        assert!(result.confidence >= 0.0 && result.confidence <= 1.0);
        assert!(result.treatment_plan.is_some());
        client.shutdown().await;
    }
}

//! Cache persistence integration tests
//!
//! Verify that cached data written by one client is visible to the next
//! one started against the same snapshot file.

#[cfg(test)]
mod tests {
    use crate::assert_ok;
    use crate::common::{backend, fixtures};
    use std::time::Duration;
    use woundsight_core::{AnalysisRequest, ProgressReporter, WoundsightClient};

    // ==================== Snapshot Round Trips ====================

    /// Test that plain cache entries survive a restart
    #[tokio::test]
    async fn test_cache_survives_restart() {
        let dir = tempfile::tempdir().unwrap();
        let config = fixtures::persistent_config(
            "http://localhost:8000",
            &dir.path().join("cache.json"),
        );

        let first = assert_ok!(WoundsightClient::new(config.clone()).await);
        assert_ok!(
            first
                .cache()
                .set("greeting", &"hello".to_string(), None, &["test"])
                .await
        );
        first.shutdown().await;

        let second = assert_ok!(WoundsightClient::new(config).await);
        let value: Option<String> = second.cache().get("greeting").await;
        assert_eq!(value.as_deref(), Some("hello"));
        second.shutdown().await;
    }

    /// Test that expired entries are not revived from the snapshot
    #[tokio::test]
    async fn test_expired_entries_not_revived() {
        let dir = tempfile::tempdir().unwrap();
        let config = fixtures::persistent_config(
            "http://localhost:8000",
            &dir.path().join("cache.json"),
        );

        let first = assert_ok!(WoundsightClient::new(config.clone()).await);
        assert_ok!(
            first
                .cache()
                .set(
                    "short-lived",
                    &1u32,
                    Some(Duration::from_millis(10)),
                    &[],
                )
                .await
        );
        tokio::time::sleep(Duration::from_millis(50)).await;
        first.shutdown().await;

        let second = assert_ok!(WoundsightClient::new(config).await);
        let value: Option<u32> = second.cache().get("short-lived").await;
        assert_eq!(value, None);
        second.shutdown().await;
    }

    /// Test that a completed analysis is available after a restart
    /// without another backend call
    #[tokio::test]
    async fn test_analysis_result_survives_restart() {
        let server = backend::healthy_server().await;
        backend::mount_analysis(&server, &fixtures::analysis_body("laceration", false, 4.0)).await;

        let dir = tempfile::tempdir().unwrap();
        let config =
            fixtures::persistent_config(&server.uri(), &dir.path().join("cache.json"));

        let first = assert_ok!(WoundsightClient::new(config.clone()).await);
        let request = AnalysisRequest::new(fixtures::sample_image())
            .with_thread_id("persist-1")
            .with_treatment_plan(false)
            .with_doctor_recommendations(false);
        assert_ok!(
            first
                .analysis()
                .analyze(request, &ProgressReporter::disabled())
                .await
        );
        first.shutdown().await;

        let second = assert_ok!(WoundsightClient::new(config).await);
        let cached = second.analysis().cached_result("persist-1").await.unwrap();
        assert_eq!(cached.condition, "laceration");

        // The second client answered entirely from the snapshot
        let requests = server.received_requests().await.unwrap();
        let posts = requests
            .iter()
            .filter(|r| r.url.path() == "/api/analysis/complete_analysis")
            .count();
        assert_eq!(posts, 1);

        second.shutdown().await;
    }
}

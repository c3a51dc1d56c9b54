//! Analysis workflow integration tests
//!
//! Drive the full client stack (health gate, upload, normalization,
//! reference data, caching) against a mock backend.

#[cfg(test)]
mod tests {
    use crate::common::{backend, fixtures};
    use crate::{assert_err, assert_ok};
    use serde_json::{Value, json};
    use std::sync::{Arc, Mutex};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, ResponseTemplate};
    use woundsight_core::core::analysis::{PlanSource, ThreadStatus};
    use woundsight_core::{
        AnalysisRequest, ProgressReporter, WoundSeverity, WoundsightClient, WoundsightError,
    };

    /// Progress reporter that records every percentage it sees
    fn recording_reporter() -> (ProgressReporter, Arc<Mutex<Vec<u8>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let reporter = ProgressReporter::new(move |_, percent| {
            sink.lock().unwrap().push(percent);
        });
        (reporter, seen)
    }

    // ==================== Happy Path ====================

    /// Test a full analysis with the combined response carrying everything
    #[tokio::test]
    async fn test_analyze_end_to_end() {
        let server = backend::healthy_server().await;
        backend::mount_analysis(&server, &fixtures::full_analysis_body("laceration", "CA")).await;

        let client = assert_ok!(WoundsightClient::new(fixtures::test_config(&server.uri())).await);
        let request = AnalysisRequest::new(fixtures::sample_image())
            .with_thread_id("wf-e2e")
            .with_location("CA");
        let (reporter, percents) = recording_reporter();

        let result = assert_ok!(client.analysis().analyze(request, &reporter).await);

        assert_eq!(result.thread_id, "wf-e2e");
        assert_eq!(result.condition, "laceration");
        assert!(!result.is_infected);
        assert_eq!(result.severity, WoundSeverity::Medium);
        assert!((result.confidence - 0.93).abs() < 1e-9);
        assert!(result.description.contains("granulating"));
        assert!(result.segmentation.is_some());

        let plan = result.treatment_plan.as_ref().unwrap();
        assert_eq!(plan.source, PlanSource::Backend);
        assert_eq!(plan.steps.len(), 3);
        assert_eq!(result.doctor_recommendations.len(), 2);
        assert_eq!(result.doctor_recommendations[0].state, "CA");

        // Progress starts at preparing, ends completed, and never goes back
        let percents = percents.lock().unwrap();
        assert_eq!(percents.first(), Some(&5));
        assert_eq!(percents.last(), Some(&100));
        assert!(percents.windows(2).all(|w| w[0] <= w[1]));

        // The result and thread are cached for later lookups
        let cached = client.analysis().cached_result("wf-e2e").await.unwrap();
        assert_eq!(cached.condition, "laceration");
        let thread = client.analysis().cached_thread("wf-e2e").await.unwrap();
        assert_eq!(thread.status, ThreadStatus::Completed);

        client.shutdown().await;
    }

    /// Test that missing reference sections are fetched from their own
    /// endpoints
    #[tokio::test]
    async fn test_analyze_fetches_reference_data_separately() {
        let server = backend::healthy_server().await;
        backend::mount_analysis(&server, &fixtures::analysis_body("burn", false, 3.0)).await;
        backend::mount_plan(&server, "burn", &fixtures::plan_body("burn")).await;
        backend::mount_contacts(&server, "NY", &fixtures::contacts_body("NY")).await;

        let client = assert_ok!(WoundsightClient::new(fixtures::test_config(&server.uri())).await);
        let request = AnalysisRequest::new(fixtures::sample_image()).with_location("NY");

        let result = assert_ok!(
            client
                .analysis()
                .analyze(request, &ProgressReporter::disabled())
                .await
        );

        let plan = result.treatment_plan.as_ref().unwrap();
        assert_eq!(plan.condition, "burn");
        assert_eq!(plan.source, PlanSource::Backend);
        assert!(!plan.steps.is_empty());
        assert_eq!(result.doctor_recommendations.len(), 2);
        assert_eq!(result.doctor_recommendations[1].address.as_deref(), Some("12 Main St"));

        client.shutdown().await;
    }

    /// Test that an infected large wound is classified critical
    #[tokio::test]
    async fn test_analyze_derives_severity_locally() {
        let server = backend::healthy_server().await;
        backend::mount_analysis(&server, &fixtures::analysis_body("ulcer", true, 32.0)).await;

        let client = assert_ok!(WoundsightClient::new(fixtures::test_config(&server.uri())).await);
        let request = AnalysisRequest::new(fixtures::sample_image())
            .with_treatment_plan(false)
            .with_doctor_recommendations(false);

        let result = assert_ok!(
            client
                .analysis()
                .analyze(request, &ProgressReporter::disabled())
                .await
        );

        assert!(result.is_infected);
        assert_eq!(result.severity, WoundSeverity::Critical);
        assert!(result.treatment_plan.is_none());
        assert!(result.doctor_recommendations.is_empty());

        client.shutdown().await;
    }

    /// Test the exact shape of the upload payload
    #[tokio::test]
    async fn test_analyze_posts_expected_payload() {
        let server = backend::healthy_server().await;
        backend::mount_analysis(&server, &fixtures::analysis_body("laceration", false, 1.0)).await;

        let client = assert_ok!(WoundsightClient::new(fixtures::test_config(&server.uri())).await);
        let request = AnalysisRequest::new(fixtures::sample_image())
            .with_location("WA")
            .with_doctor_recommendations(false)
            .with_treatment_plan(false);
        assert_ok!(
            client
                .analysis()
                .analyze(request, &ProgressReporter::disabled())
                .await
        );

        let requests = server.received_requests().await.unwrap();
        let post = requests
            .iter()
            .find(|r| r.url.path() == "/api/analysis/complete_analysis")
            .expect("analysis endpoint was not called");
        let body: Value = serde_json::from_slice(&post.body).unwrap();
        assert!(!body["image_base64"].as_str().unwrap().is_empty());
        assert_eq!(body["include_treatment_plan"], json!(false));
        assert_eq!(body["include_doctor_recommendations"], json!(false));
        assert_eq!(body["user_location"], json!("WA"));

        client.shutdown().await;
    }

    // ==================== Failure Handling ====================

    /// Test that an empty image is rejected before any network traffic
    #[tokio::test]
    async fn test_analyze_rejects_empty_image() {
        let server = backend::healthy_server().await;
        let client = assert_ok!(WoundsightClient::new(fixtures::test_config(&server.uri())).await);

        let request = AnalysisRequest::new(bytes::Bytes::new());
        let err = assert_err!(
            client
                .analysis()
                .analyze(request, &ProgressReporter::disabled())
                .await
        );
        assert!(matches!(err, WoundsightError::Validation(_)));

        client.shutdown().await;
    }

    /// Test that a down backend blocks the upload entirely
    #[tokio::test]
    async fn test_analyze_skips_upload_when_backend_down() {
        let server = wiremock::MockServer::start().await;
        backend::mount_health(&server, 503).await;
        Mock::given(method("POST"))
            .and(path("/api/analysis/complete_analysis"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let client = assert_ok!(WoundsightClient::new(fixtures::test_config(&server.uri())).await);
        let request = AnalysisRequest::new(fixtures::sample_image()).with_thread_id("wf-down");

        let err = assert_err!(
            client
                .analysis()
                .analyze(request, &ProgressReporter::disabled())
                .await
        );
        assert!(matches!(err, WoundsightError::BackendUnreachable(_)));

        // The thread records the failure
        let thread = client.analysis().cached_thread("wf-down").await.unwrap();
        assert_eq!(thread.status, ThreadStatus::Failed);

        server.verify().await;
        client.shutdown().await;
    }

    /// Test that a transient backend error is retried transparently,
    /// including for a large upload
    #[tokio::test]
    async fn test_analyze_retries_transient_backend_error() {
        let server = backend::healthy_server().await;
        backend::mount_flaky_analysis(
            &server,
            1,
            503,
            &fixtures::analysis_body("laceration", false, 8.0),
        )
        .await;

        let client = assert_ok!(WoundsightClient::new(fixtures::test_config(&server.uri())).await);
        let request = AnalysisRequest::new(vec![0x42u8; 2 * 1024 * 1024])
            .with_treatment_plan(false)
            .with_doctor_recommendations(false);

        let result = assert_ok!(
            client
                .analysis()
                .analyze(request, &ProgressReporter::disabled())
                .await
        );
        assert_eq!(result.condition, "laceration");
        assert_eq!(result.severity, WoundSeverity::Medium);

        let requests = server.received_requests().await.unwrap();
        let posts = requests
            .iter()
            .filter(|r| r.url.path() == "/api/analysis/complete_analysis")
            .count();
        assert_eq!(posts, 2);

        client.shutdown().await;
    }

    /// Test that a failed analysis surfaces a processed error and marks
    /// the thread failed
    #[tokio::test]
    async fn test_analyze_failure_marks_thread_failed() {
        let server = backend::healthy_server().await;
        Mock::given(method("POST"))
            .and(path("/api/analysis/complete_analysis"))
            .respond_with(ResponseTemplate::new(422).set_body_json(json!({
                "detail": "image_base64 is required"
            })))
            .mount(&server)
            .await;

        let client = assert_ok!(WoundsightClient::new(fixtures::test_config(&server.uri())).await);
        let request = AnalysisRequest::new(fixtures::sample_image()).with_thread_id("wf-fail");

        let err = assert_err!(
            client
                .analysis()
                .analyze(request, &ProgressReporter::disabled())
                .await
        );
        assert!(matches!(err, WoundsightError::Processed(_)));

        let thread = client.analysis().cached_thread("wf-fail").await.unwrap();
        assert_eq!(thread.status, ThreadStatus::Failed);

        // The failure landed in the error log
        assert!(client.errors().stats().total >= 1);

        client.shutdown().await;
    }

    /// Test that reference lookups degrade to built-in guidance when
    /// their endpoints fail
    #[tokio::test]
    async fn test_reference_data_falls_back_when_endpoints_fail() {
        let server = backend::healthy_server().await;
        backend::mount_analysis(&server, &fixtures::analysis_body("abrasion", false, 1.5)).await;
        // No plan or contact mocks mounted, so those lookups 404

        let client = assert_ok!(WoundsightClient::new(fixtures::test_config(&server.uri())).await);
        let request = AnalysisRequest::new(fixtures::sample_image()).with_location("TX");

        let result = assert_ok!(
            client
                .analysis()
                .analyze(request, &ProgressReporter::disabled())
                .await
        );

        let plan = result.treatment_plan.as_ref().unwrap();
        assert_eq!(plan.source, PlanSource::Fallback);
        assert_eq!(plan.condition, "abrasion");
        assert!(!plan.steps.is_empty());
        assert!(!result.doctor_recommendations.is_empty());
        // Telehealth fallback contacts are stamped with the requested state
        assert!(result.doctor_recommendations.iter().all(|d| d.state == "TX"));

        client.shutdown().await;
    }

    // ==================== Caching ====================

    /// Test that reference data is shared between analyses
    #[tokio::test]
    async fn test_second_analysis_reuses_reference_cache() {
        let server = backend::healthy_server().await;
        backend::mount_analysis(&server, &fixtures::analysis_body("laceration", false, 2.0)).await;
        Mock::given(method("GET"))
            .and(path("/api/treatment/plan/laceration"))
            .respond_with(ResponseTemplate::new(200).set_body_json(fixtures::plan_body("laceration")))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/recommendations/doctor_contact/CA"))
            .respond_with(ResponseTemplate::new(200).set_body_json(fixtures::contacts_body("CA")))
            .expect(1)
            .mount(&server)
            .await;

        let client = assert_ok!(WoundsightClient::new(fixtures::test_config(&server.uri())).await);

        let mut second_image = fixtures::sample_image();
        second_image.push(0xAB);

        for image in [fixtures::sample_image(), second_image] {
            let request = AnalysisRequest::new(image).with_location("CA");
            let result = assert_ok!(
                client
                    .analysis()
                    .analyze(request, &ProgressReporter::disabled())
                    .await
            );
            assert!(result.treatment_plan.is_some());
            assert_eq!(result.doctor_recommendations.len(), 2);
        }

        server.verify().await;
        client.shutdown().await;
    }

    /// Test that tag invalidation clears analysis data but keeps
    /// reference data
    #[tokio::test]
    async fn test_invalidate_analysis_data_keeps_reference_data() {
        let server = backend::healthy_server().await;
        backend::mount_analysis(&server, &fixtures::analysis_body("laceration", false, 2.0)).await;
        backend::mount_plan(&server, "laceration", &fixtures::plan_body("laceration")).await;
        backend::mount_contacts(&server, "CA", &fixtures::contacts_body("CA")).await;

        let client = assert_ok!(WoundsightClient::new(fixtures::test_config(&server.uri())).await);
        let request = AnalysisRequest::new(fixtures::sample_image())
            .with_thread_id("wf-invalidate")
            .with_location("CA");
        assert_ok!(
            client
                .analysis()
                .analyze(request, &ProgressReporter::disabled())
                .await
        );

        assert!(client.analysis().cached_result("wf-invalidate").await.is_some());
        let removed = client.analysis().invalidate_analysis_data().await;
        assert_eq!(removed, 2); // result + thread

        assert!(client.analysis().cached_result("wf-invalidate").await.is_none());
        assert!(client.analysis().cached_thread("wf-invalidate").await.is_none());

        // The plan survives under its reference tag and is served from
        // cache, not re-fetched
        let plan = client.analysis().treatment_plan("laceration").await;
        assert_eq!(plan.source, PlanSource::Backend);
        let requests = server.received_requests().await.unwrap();
        let plan_fetches = requests
            .iter()
            .filter(|r| r.url.path() == "/api/treatment/plan/laceration")
            .count();
        assert_eq!(plan_fetches, 1);

        client.shutdown().await;
    }
}

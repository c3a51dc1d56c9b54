//! Mock analysis backend
//!
//! wiremock helpers that stand in for the real backend in integration
//! tests. Endpoint paths mirror the live API surface.

use serde_json::Value;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Start a mock server whose `/health` endpoint reports healthy
pub async fn healthy_server() -> MockServer {
    let server = MockServer::start().await;
    mount_health(&server, 200).await;
    server
}

/// Mount the health endpoint with the given status
pub async fn mount_health(server: &MockServer, status: u16) {
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(status))
        .mount(server)
        .await;
}

/// Mount the combined analysis endpoint returning `body`
pub async fn mount_analysis(server: &MockServer, body: &Value) {
    Mock::given(method("POST"))
        .and(path("/api/analysis/complete_analysis"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

/// Mount an analysis endpoint that fails `failures` times with `status`
/// before succeeding with `body`
pub async fn mount_flaky_analysis(server: &MockServer, failures: u64, status: u16, body: &Value) {
    Mock::given(method("POST"))
        .and(path("/api/analysis/complete_analysis"))
        .respond_with(ResponseTemplate::new(status))
        .up_to_n_times(failures)
        .mount(server)
        .await;
    mount_analysis(server, body).await;
}

/// Mount the treatment plan endpoint for `condition`
pub async fn mount_plan(server: &MockServer, condition: &str, body: &Value) {
    Mock::given(method("GET"))
        .and(path(format!("/api/treatment/plan/{condition}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

/// Mount the doctor recommendation endpoint for `state`
pub async fn mount_contacts(server: &MockServer, state: &str, body: &Value) {
    Mock::given(method("GET"))
        .and(path(format!("/api/recommendations/doctor_contact/{state}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

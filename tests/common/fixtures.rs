//! Test fixtures and configuration factories
//!
//! Provides configs tuned for fast tests (short timeouts, tiny retry
//! delays, no persistence by default) and payloads shaped like real
//! backend responses.

use serde_json::{Value, json};
use std::path::Path;
use woundsight_core::Config;

/// Build a config pointed at `base_url` with test-friendly timings
pub fn test_config(base_url: &str) -> Config {
    let mut config = Config::default();
    config.http.base_url = base_url.to_string();
    config.http.connect_timeout_ms = 1_000;
    config.http.request_timeout_ms = 2_000;
    config.http.max_concurrent_requests = 4;
    config.retry.max_attempts = 2;
    config.retry.base_delay_ms = 10;
    config.retry.max_delay_ms = 50;
    config.cache.max_size = 64;
    config.cache.default_ttl_ms = 60_000;
    config.cache.cleanup_interval_ms = 60_000;
    config.cache.enable_persistence = false;
    config.health.endpoints = vec![base_url.to_string()];
    config.health.timeout_ms = 1_000;
    config.health.cache_ttl_ms = 60_000;
    config.health.degraded_threshold_ms = 5_000;
    config.analysis.base_timeout_ms = 2_000;
    config.analysis.timeout_per_mib_ms = 0;
    config.analysis.min_timeout_ms = 100;
    config.analysis.max_timeout_ms = 5_000;
    config.analysis.result_ttl_ms = 60_000;
    config.analysis.reference_ttl_ms = 60_000;
    config.errors.retry_base_delay_ms = 5;
    config.errors.log_limit = 100;
    config
}

/// Same as [`test_config`] but persisting the cache to `persist_path`
/// with write-through snapshots
pub fn persistent_config(base_url: &str, persist_path: &Path) -> Config {
    let mut config = test_config(base_url);
    config.cache.enable_persistence = true;
    config.cache.persist_path = persist_path.to_string_lossy().into_owned();
    config.cache.persist_debounce_ms = 0;
    config
}

/// A small stand-in for an uploaded wound photo
pub fn sample_image() -> Vec<u8> {
    let mut data = vec![0xFF, 0xD8, 0xFF, 0xE0];
    data.extend((0..64).map(|i| i as u8));
    data
}

/// Backend analysis payload carrying only the diagnosis sections
pub fn analysis_body(condition: &str, infected: bool, area: f64) -> Value {
    json!({
        "data": {
            "segmentation": {"mask": "ZmFrZS1tYXNr", "format": "png"},
            "diagnosis": {
                "condition": condition,
                "is_infected": infected,
                "wound_area": area,
                "confidence": 0.93
            },
            "description": "Partial-thickness wound with granulating base.",
            "metadata": {"model_version": "2.4.1"}
        }
    })
}

/// Backend analysis payload that also embeds the treatment plan and
/// doctor recommendations
pub fn full_analysis_body(condition: &str, state: &str) -> Value {
    let mut body = analysis_body(condition, false, 12.5);
    body["data"]["treatment_plan"] = plan_fields(condition);
    body["data"]["doctor_recommendations"] = contact_fields(state);
    body
}

/// Treatment plan endpoint payload
pub fn plan_body(condition: &str) -> Value {
    json!({ "data": plan_fields(condition) })
}

/// Doctor recommendation endpoint payload
pub fn contacts_body(state: &str) -> Value {
    json!({ "data": contact_fields(state) })
}

fn plan_fields(condition: &str) -> Value {
    json!({
        "condition": condition,
        "summary": "Keep the wound clean, moist, and covered.",
        "steps": [
            "Rinse with saline",
            "Apply hydrogel dressing",
            "Cover with sterile gauze"
        ],
        "warnings": ["Seek care if redness spreads beyond the wound edge"]
    })
}

fn contact_fields(state: &str) -> Value {
    json!([
        {
            "name": "Dr. Maria Alvarez",
            "specialty": "Wound Care",
            "phone": "555-0142",
            "state": state
        },
        {
            "name": "Dr. James Okafor",
            "specialty": "Dermatology",
            "phone": "555-0178",
            "state": state,
            "address": "12 Main St"
        }
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_is_valid() {
        let config = test_config("http://localhost:8000");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_persistent_config_is_valid() {
        let config = persistent_config("http://localhost:8000", Path::new("/tmp/cache.json"));
        assert!(config.validate().is_ok());
        assert!(config.cache.enable_persistence);
    }

    #[test]
    fn test_full_body_embeds_reference_sections() {
        let body = full_analysis_body("laceration", "CA");
        assert!(body["data"]["treatment_plan"].is_object());
        assert!(body["data"]["doctor_recommendations"].is_array());
    }
}

//! Backend response normalization
//!
//! The analysis backend returns loosely structured JSON. These helpers
//! flatten it into the domain models, defaulting every field the backend
//! may omit so a partial response still produces a usable result.

use super::models::{AnalysisResult, DoctorContact, PlanSource, TreatmentPlan, WoundSeverity};
use crate::utils::error::{Result, WoundsightError};
use chrono::Utc;
use serde_json::Value;

/// Unwrap the `data` envelope every backend response is wrapped in
pub(crate) fn data_field(payload: &Value) -> Result<&Value> {
    payload
        .get("data")
        .ok_or_else(|| WoundsightError::parsing("response body has no data field"))
}

/// Normalize a combined analysis response into an [`AnalysisResult`]
///
/// Severity is always derived locally from the infection flag and wound
/// area rather than trusted from the backend.
pub fn normalize_analysis_response(
    thread_id: &str,
    payload: &Value,
    user_state: Option<&str>,
) -> Result<AnalysisResult> {
    let data = data_field(payload)?;
    let diagnosis = data.get("diagnosis");

    let condition = diagnosis
        .and_then(|d| d.get("condition"))
        .and_then(Value::as_str)
        .unwrap_or("unknown")
        .to_string();
    let is_infected = diagnosis
        .and_then(|d| d.get("is_infected"))
        .and_then(Value::as_bool)
        .unwrap_or(false);
    let wound_area_cm2 = diagnosis
        .and_then(|d| d.get("wound_area"))
        .and_then(Value::as_f64)
        .unwrap_or(0.0);
    let confidence = diagnosis
        .and_then(|d| d.get("confidence"))
        .and_then(Value::as_f64)
        .unwrap_or(0.0);

    let treatment_plan = data
        .get("treatment_plan")
        .filter(|plan| !plan.is_null())
        .map(|plan| normalize_treatment_plan(&condition, plan));
    let doctor_recommendations = data
        .get("doctor_recommendations")
        .map(|items| normalize_doctor_contacts(items, user_state.unwrap_or_default()))
        .unwrap_or_default();

    Ok(AnalysisResult {
        thread_id: thread_id.to_string(),
        severity: WoundSeverity::derive(is_infected, wound_area_cm2),
        condition,
        is_infected,
        wound_area_cm2,
        confidence,
        description: data
            .get("description")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        segmentation: data.get("segmentation").filter(|v| !v.is_null()).cloned(),
        treatment_plan,
        doctor_recommendations,
        metadata: data.get("metadata").cloned().unwrap_or(Value::Null),
        analyzed_at: Utc::now(),
    })
}

/// Normalize a treatment plan value. The backend serves either a
/// structured object or plain guidance text.
pub fn normalize_treatment_plan(condition: &str, plan: &Value) -> TreatmentPlan {
    if let Some(text) = plan.as_str() {
        return TreatmentPlan {
            condition: condition.to_string(),
            summary: text.to_string(),
            steps: Vec::new(),
            warnings: Vec::new(),
            source: PlanSource::Backend,
        };
    }

    TreatmentPlan {
        condition: plan
            .get("condition")
            .and_then(Value::as_str)
            .unwrap_or(condition)
            .to_string(),
        summary: plan
            .get("summary")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        steps: string_list(plan.get("steps")),
        warnings: string_list(plan.get("warnings")),
        source: PlanSource::Backend,
    }
}

/// Normalize a doctor contact list. Entries without a name are dropped;
/// entries without a state inherit `default_state`.
pub fn normalize_doctor_contacts(items: &Value, default_state: &str) -> Vec<DoctorContact> {
    items
        .as_array()
        .map(|list| {
            list.iter()
                .filter_map(|item| {
                    let name = item.get("name").and_then(Value::as_str)?;
                    Some(DoctorContact {
                        name: name.to_string(),
                        specialty: item
                            .get("specialty")
                            .and_then(Value::as_str)
                            .unwrap_or_default()
                            .to_string(),
                        phone: item
                            .get("phone")
                            .and_then(Value::as_str)
                            .unwrap_or_default()
                            .to_string(),
                        state: item
                            .get("state")
                            .and_then(Value::as_str)
                            .unwrap_or(default_state)
                            .to_string(),
                        address: item.get("address").and_then(Value::as_str).map(str::to_string),
                    })
                })
                .collect()
        })
        .unwrap_or_default()
}

fn string_list(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(Value::as_str).map(str::to_string).collect())
        .unwrap_or_default()
}

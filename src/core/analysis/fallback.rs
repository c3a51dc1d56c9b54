//! Built-in reference data fallbacks
//!
//! When the backend cannot serve a treatment plan or doctor list, the
//! workflow degrades to this general guidance instead of failing the
//! whole analysis.

use super::models::{DoctorContact, PlanSource, TreatmentPlan};
use once_cell::sync::Lazy;

const GENERAL_CARE_SUMMARY: &str =
    "General wound care guidance until a clinician reviews the analysis";

const GENERAL_CARE_STEPS: [&str; 5] = [
    "Wash your hands before touching the wound",
    "Rinse the wound gently with clean water",
    "Cover the wound with a sterile, non-stick dressing",
    "Change the dressing at least once a day",
    "Keep the wound dry between dressing changes",
];

const GENERAL_CARE_WARNINGS: [&str; 4] = [
    "Seek medical care if redness or swelling spreads",
    "Seek medical care if you develop a fever",
    "Seek medical care if the wound drains pus or smells foul",
    "Do not remove objects embedded in the wound",
];

static TELEHEALTH_CONTACTS: Lazy<Vec<DoctorContact>> = Lazy::new(|| {
    vec![
        DoctorContact {
            name: "Telehealth Wound Care Line".to_string(),
            specialty: "Wound Care".to_string(),
            phone: "1-800-555-0199".to_string(),
            state: "US".to_string(),
            address: None,
        },
        DoctorContact {
            name: "24/7 Nurse Advice Line".to_string(),
            specialty: "General Practice".to_string(),
            phone: "1-800-555-0142".to_string(),
            state: "US".to_string(),
            address: None,
        },
    ]
});

/// General care plan used when no condition-specific plan is available
pub fn fallback_treatment_plan(condition: &str) -> TreatmentPlan {
    TreatmentPlan {
        condition: condition.to_string(),
        summary: GENERAL_CARE_SUMMARY.to_string(),
        steps: GENERAL_CARE_STEPS.iter().map(|s| s.to_string()).collect(),
        warnings: GENERAL_CARE_WARNINGS.iter().map(|s| s.to_string()).collect(),
        source: PlanSource::Fallback,
    }
}

/// Nationwide telehealth contacts used when no local doctors are
/// available. The requested state is stamped on so callers can tell which
/// lookup these stand in for.
pub fn fallback_doctor_contacts(state: Option<&str>) -> Vec<DoctorContact> {
    let mut contacts = TELEHEALTH_CONTACTS.clone();
    if let Some(state) = state {
        for contact in &mut contacts {
            contact.state = state.to_string();
        }
    }
    contacts
}

//! Wound analysis workflow
//!
//! Domain models, backend transport, response normalization, and the
//! orchestration service that ties them to the cache, error handler, and
//! health checker.

pub mod backend;
pub mod fallback;
pub mod models;
pub mod normalize;
pub mod progress;
pub mod service;


pub use backend::{AnalysisBackend, HttpAnalysisBackend};
pub use fallback::{fallback_doctor_contacts, fallback_treatment_plan};
pub use models::{
    AnalysisRequest, AnalysisResult, AnalysisThread, DoctorContact, PlanSource, ThreadStatus,
    TreatmentPlan, WoundSeverity, content_thread_id,
};
pub use normalize::{
    normalize_analysis_response, normalize_doctor_contacts, normalize_treatment_plan,
};
pub use progress::{AnalysisStage, ProgressFn, ProgressReporter};
pub use service::AnalysisService;

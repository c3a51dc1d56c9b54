//! Analysis workflow orchestration
//!
//! `AnalysisService` drives one wound analysis end to end: health gate,
//! image upload, combined backend call, response normalization, reference
//! data lookups, and result caching. Each analysis runs under a thread id
//! and concurrent runs for the same thread are rejected.

use super::backend::AnalysisBackend;
use super::fallback::{fallback_doctor_contacts, fallback_treatment_plan};
use super::models::{
    AnalysisRequest, AnalysisResult, AnalysisThread, DoctorContact, ThreadStatus, TreatmentPlan,
    content_thread_id,
};
use super::normalize::{data_field, normalize_analysis_response, normalize_doctor_contacts, normalize_treatment_plan};
use super::progress::{AnalysisStage, ProgressReporter};
use crate::config::AnalysisSettings;
use crate::core::cache::CacheStore;
use crate::core::health::HealthChecker;
use crate::utils::error::{ErrorContext, ErrorHandler, Result, WoundsightError};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::{info, warn};

/// Tag shared by all analysis results and threads
const ANALYSIS_TAG: &str = "analysis";
/// Tag shared by treatment plans and doctor lists
const REFERENCE_TAG: &str = "reference-data";

fn result_key(thread_id: &str) -> String {
    format!("analysis_result:{thread_id}")
}

fn thread_key(thread_id: &str) -> String {
    format!("analysis_thread:{thread_id}")
}

fn plan_key(condition: &str) -> String {
    format!("treatment_plan:{condition}")
}

fn contacts_key(state: &str) -> String {
    format!("doctor_recommendations:{state}")
}

fn thread_tag(thread_id: &str) -> String {
    format!("thread:{thread_id}")
}

/// Removes the thread from the in-flight set when the analysis finishes,
/// including on early returns and panics
struct InFlightGuard {
    active: Arc<DashMap<String, ()>>,
    thread_id: String,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.active.remove(&self.thread_id);
    }
}

/// Orchestrates the wound analysis workflow
pub struct AnalysisService {
    backend: Arc<dyn AnalysisBackend>,
    cache: Arc<CacheStore>,
    errors: Arc<ErrorHandler>,
    health: Arc<HealthChecker>,
    settings: AnalysisSettings,
    active: Arc<DashMap<String, ()>>,
}

impl AnalysisService {
    pub fn new(
        backend: Arc<dyn AnalysisBackend>,
        cache: Arc<CacheStore>,
        errors: Arc<ErrorHandler>,
        health: Arc<HealthChecker>,
        settings: AnalysisSettings,
    ) -> Self {
        Self {
            backend,
            cache,
            errors,
            health,
            settings,
            active: Arc::new(DashMap::new()),
        }
    }

    /// Run a full analysis for `request`, reporting coarse progress along
    /// the way.
    ///
    /// The thread id is taken from the request or derived from the image
    /// content, so retrying the same photo resumes the same thread. A
    /// second call for a thread that is still running fails with
    /// [`WoundsightError::AnalysisInProgress`].
    pub async fn analyze(
        &self,
        request: AnalysisRequest,
        progress: &ProgressReporter,
    ) -> Result<AnalysisResult> {
        if request.image.is_empty() {
            return Err(WoundsightError::validation(
                "analysis request contains no image data",
            ));
        }

        let thread_id = request
            .thread_id
            .clone()
            .unwrap_or_else(|| content_thread_id(&request.image));
        let _guard = self.claim_thread(&thread_id)?;

        progress.report(AnalysisStage::Preparing);
        let mut thread = AnalysisThread::new(&thread_id);
        self.store_thread(&thread).await;

        let report = self.health.check().await;
        if !report.status.allows_requests() {
            self.fail_thread(&mut thread).await;
            return Err(WoundsightError::unreachable(
                report
                    .error
                    .unwrap_or_else(|| "analysis backend unreachable".to_string()),
            ));
        }

        progress.report(AnalysisStage::Uploading);
        let deadline = self.settings.timeout_for_payload(request.image_size());
        let payload = json!({
            "image_base64": STANDARD.encode(&request.image),
            "include_treatment_plan": request.include_treatment_plan,
            "include_doctor_recommendations": request.include_doctor_recommendations,
            "user_location": request.user_location,
        });

        thread.advance(ThreadStatus::Analyzing)?;
        self.store_thread(&thread).await;
        progress.report(AnalysisStage::Analyzing);

        let response = match self.backend.complete_analysis(&payload, deadline).await {
            Ok(response) => response,
            Err(err) => {
                let processed = self.errors.process(
                    &err,
                    ErrorContext::new("analysis_service", "complete_analysis"),
                    None,
                );
                self.fail_thread(&mut thread).await;
                return Err(WoundsightError::Processed(Box::new(processed)));
            }
        };

        progress.report(AnalysisStage::Processing);
        let mut result = match normalize_analysis_response(
            &thread_id,
            &response,
            request.user_location.as_deref(),
        ) {
            Ok(result) => result,
            Err(err) => {
                let processed = self.errors.process(
                    &err,
                    ErrorContext::new("analysis_service", "normalize_response"),
                    None,
                );
                self.fail_thread(&mut thread).await;
                return Err(WoundsightError::Processed(Box::new(processed)));
            }
        };

        // Fill in whatever the combined response did not already carry
        if request.include_treatment_plan && result.treatment_plan.is_none() {
            result.treatment_plan = Some(self.treatment_plan(&result.condition).await);
        }
        if request.include_doctor_recommendations && result.doctor_recommendations.is_empty() {
            result.doctor_recommendations = match request.user_location.as_deref() {
                Some(state) => self.doctor_contacts(state).await,
                None => fallback_doctor_contacts(None),
            };
        }

        progress.report(AnalysisStage::Completing);
        let tag = thread_tag(&thread_id);
        if let Err(e) = self
            .cache
            .set(
                &result_key(&thread_id),
                &result,
                Some(self.settings.result_ttl()),
                &[ANALYSIS_TAG, tag.as_str()],
            )
            .await
        {
            warn!("Failed to cache analysis result for {}: {}", thread_id, e);
        }

        thread.advance(ThreadStatus::Completed)?;
        self.store_thread(&thread).await;
        progress.report(AnalysisStage::Completed);
        info!(
            "Analysis {} completed: {} ({})",
            thread_id,
            result.condition,
            result.severity.as_str()
        );

        Ok(result)
    }

    /// Treatment plan for a condition, cached and degrading to the
    /// built-in general care plan when the backend cannot serve one
    pub async fn treatment_plan(&self, condition: &str) -> TreatmentPlan {
        let loaded = self
            .cache
            .preload(
                &plan_key(condition),
                || self.fetch_treatment_plan(condition),
                Some(self.settings.reference_ttl()),
                &[REFERENCE_TAG],
            )
            .await;

        match loaded {
            Ok(plan) => plan,
            Err(e) => {
                warn!("Treatment plan lookup for '{}' failed: {}", condition, e);
                fallback_treatment_plan(condition)
            }
        }
    }

    /// Doctor contacts for a US state, cached and degrading to the
    /// telehealth contacts when the backend cannot serve any
    pub async fn doctor_contacts(&self, state: &str) -> Vec<DoctorContact> {
        let loaded = self
            .cache
            .preload(
                &contacts_key(state),
                || self.fetch_doctor_contacts(state),
                Some(self.settings.reference_ttl()),
                &[REFERENCE_TAG],
            )
            .await;

        match loaded {
            Ok(contacts) => contacts,
            Err(e) => {
                warn!("Doctor lookup for state '{}' failed: {}", state, e);
                fallback_doctor_contacts(Some(state))
            }
        }
    }

    /// Most recent result for a thread, if still cached
    pub async fn cached_result(&self, thread_id: &str) -> Option<AnalysisResult> {
        self.cache.get(&result_key(thread_id)).await
    }

    /// Thread record, if still cached
    pub async fn cached_thread(&self, thread_id: &str) -> Option<AnalysisThread> {
        self.cache.get(&thread_key(thread_id)).await
    }

    /// Drop all cached results and threads. Reference data stays.
    pub async fn invalidate_analysis_data(&self) -> usize {
        self.cache.clear_by_tags(&[ANALYSIS_TAG]).await
    }

    /// Drop the cached result and thread record for one thread
    pub async fn invalidate_thread(&self, thread_id: &str) -> usize {
        let tag = thread_tag(thread_id);
        self.cache.clear_by_tags(&[tag.as_str()]).await
    }

    /// Number of analyses currently running
    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    fn claim_thread(&self, thread_id: &str) -> Result<InFlightGuard> {
        match self.active.entry(thread_id.to_string()) {
            Entry::Occupied(_) => Err(WoundsightError::AnalysisInProgress(thread_id.to_string())),
            Entry::Vacant(slot) => {
                slot.insert(());
                Ok(InFlightGuard {
                    active: Arc::clone(&self.active),
                    thread_id: thread_id.to_string(),
                })
            }
        }
    }

    async fn fetch_treatment_plan(&self, condition: &str) -> Result<TreatmentPlan> {
        Ok(self
            .errors
            .handle_api_call_with_fallback(
                ErrorContext::new("analysis_service", "treatment_plan"),
                || async {
                    let body = self.backend.treatment_plan(condition).await?;
                    Ok(normalize_treatment_plan(condition, data_field(&body)?))
                },
                || async { Ok(fallback_treatment_plan(condition)) },
            )
            .await?)
    }

    async fn fetch_doctor_contacts(&self, state: &str) -> Result<Vec<DoctorContact>> {
        Ok(self
            .errors
            .handle_api_call_with_fallback(
                ErrorContext::new("analysis_service", "doctor_contacts"),
                || async {
                    let body = self.backend.doctor_contacts(state).await?;
                    Ok(normalize_doctor_contacts(data_field(&body)?, state))
                },
                || async { Ok(fallback_doctor_contacts(Some(state))) },
            )
            .await?)
    }

    async fn store_thread(&self, thread: &AnalysisThread) {
        let tag = thread_tag(&thread.id);
        if let Err(e) = self
            .cache
            .set(
                &thread_key(&thread.id),
                thread,
                Some(self.settings.result_ttl()),
                &[ANALYSIS_TAG, tag.as_str()],
            )
            .await
        {
            warn!("Failed to cache analysis thread {}: {}", thread.id, e);
        }
    }

    async fn fail_thread(&self, thread: &mut AnalysisThread) {
        if thread.advance(ThreadStatus::Failed).is_ok() {
            self.store_thread(thread).await;
        }
    }
}

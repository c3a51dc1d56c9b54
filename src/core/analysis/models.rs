//! Analysis domain models
//!
//! Request, result, and thread types for the wound analysis workflow. A
//! thread tracks one analysis from upload to completion through a strict
//! status state machine.

use crate::utils::error::{Result, WoundsightError};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};

/// Lifecycle states of an analysis thread
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThreadStatus {
    /// Image received, analysis not yet started
    Uploaded,
    /// Analysis request in flight
    Analyzing,
    /// Analysis finished and the result is stored
    Completed,
    /// Analysis failed
    Failed,
}

impl ThreadStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Uploaded => "uploaded",
            Self::Analyzing => "analyzing",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    fn can_advance_to(self, next: ThreadStatus) -> bool {
        matches!(
            (self, next),
            (Self::Uploaded, Self::Analyzing)
                | (Self::Uploaded, Self::Failed)
                | (Self::Analyzing, Self::Completed)
                | (Self::Analyzing, Self::Failed)
        )
    }
}

/// One analysis from upload to completion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisThread {
    pub id: String,
    pub status: ThreadStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AnalysisThread {
    pub fn new<S: Into<String>>(id: S) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            status: ThreadStatus::Uploaded,
            created_at: now,
            updated_at: now,
        }
    }

    /// Move the thread to `next`. Re-applying the current status is a
    /// no-op; any other transition outside the state machine is rejected.
    pub fn advance(&mut self, next: ThreadStatus) -> Result<()> {
        if self.status == next {
            return Ok(());
        }
        if !self.status.can_advance_to(next) {
            return Err(WoundsightError::validation(format!(
                "invalid thread status transition: {} -> {}",
                self.status.as_str(),
                next.as_str()
            )));
        }
        self.status = next;
        self.updated_at = Utc::now();
        Ok(())
    }
}

/// Severity of an analyzed wound
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WoundSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl WoundSeverity {
    /// Infected wounds above this area are critical
    pub const INFECTED_CRITICAL_AREA_CM2: f64 = 20.0;
    /// Non-infected wounds above this area are elevated to medium
    pub const ELEVATED_AREA_CM2: f64 = 5.0;

    /// Derive severity from the diagnosis signals
    pub fn derive(is_infected: bool, wound_area_cm2: f64) -> Self {
        if is_infected && wound_area_cm2 > Self::INFECTED_CRITICAL_AREA_CM2 {
            Self::Critical
        } else if is_infected {
            Self::High
        } else if wound_area_cm2 > Self::ELEVATED_AREA_CM2 {
            Self::Medium
        } else {
            Self::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }
}

/// Where a treatment plan came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanSource {
    /// Served by the analysis backend
    Backend,
    /// Built-in general care guidance
    Fallback,
}

/// Care instructions for a diagnosed condition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreatmentPlan {
    pub condition: String,
    pub summary: String,
    pub steps: Vec<String>,
    pub warnings: Vec<String>,
    pub source: PlanSource,
}

/// A doctor the patient can contact
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DoctorContact {
    pub name: String,
    pub specialty: String,
    pub phone: String,
    pub state: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

/// Final analysis outcome stored per thread
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub thread_id: String,
    pub condition: String,
    pub severity: WoundSeverity,
    pub is_infected: bool,
    pub wound_area_cm2: f64,
    pub confidence: f64,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub segmentation: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub treatment_plan: Option<TreatmentPlan>,
    #[serde(default)]
    pub doctor_recommendations: Vec<DoctorContact>,
    #[serde(default)]
    pub metadata: Value,
    pub analyzed_at: DateTime<Utc>,
}

/// Input to the analysis workflow
#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    /// Caller-chosen thread id; derived from the image content when absent
    pub thread_id: Option<String>,
    /// Raw image bytes
    pub image: Bytes,
    pub include_treatment_plan: bool,
    pub include_doctor_recommendations: bool,
    /// US state used to look up nearby doctors
    pub user_location: Option<String>,
}

impl AnalysisRequest {
    pub fn new<B: Into<Bytes>>(image: B) -> Self {
        Self {
            thread_id: None,
            image: image.into(),
            include_treatment_plan: true,
            include_doctor_recommendations: true,
            user_location: None,
        }
    }

    pub fn with_thread_id<S: Into<String>>(mut self, thread_id: S) -> Self {
        self.thread_id = Some(thread_id.into());
        self
    }

    pub fn with_location<S: Into<String>>(mut self, location: S) -> Self {
        self.user_location = Some(location.into());
        self
    }

    pub fn with_treatment_plan(mut self, include: bool) -> Self {
        self.include_treatment_plan = include;
        self
    }

    pub fn with_doctor_recommendations(mut self, include: bool) -> Self {
        self.include_doctor_recommendations = include;
        self
    }

    pub fn image_size(&self) -> usize {
        self.image.len()
    }
}

/// Derive a stable thread id from the image content, so retrying the same
/// photo maps onto the same thread
pub fn content_thread_id(image: &[u8]) -> String {
    let digest = Sha256::digest(image);
    let mut id = hex::encode(digest);
    id.truncate(16);
    id
}

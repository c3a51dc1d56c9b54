//! Workflow progress reporting
//!
//! Callers hand the workflow a callback and receive coarse stage updates.
//! Reported percentages only ever move forward, so late or repeated stage
//! reports can never walk a progress bar backwards.

use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};
use tracing::debug;

/// Stages of the analysis workflow, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisStage {
    Preparing,
    Uploading,
    Analyzing,
    Processing,
    Completing,
    Completed,
}

impl AnalysisStage {
    /// Nominal completion percentage for this stage
    pub fn percent(&self) -> u8 {
        match self {
            Self::Preparing => 5,
            Self::Uploading => 20,
            Self::Analyzing => 45,
            Self::Processing => 70,
            Self::Completing => 90,
            Self::Completed => 100,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Preparing => "preparing",
            Self::Uploading => "uploading",
            Self::Analyzing => "analyzing",
            Self::Processing => "processing",
            Self::Completing => "completing",
            Self::Completed => "completed",
        }
    }
}

/// Callback invoked with each stage and the monotonic percentage
pub type ProgressFn = dyn Fn(AnalysisStage, u8) + Send + Sync;

/// Tracks the high-water percentage across stage reports
pub struct ProgressReporter {
    callback: Option<Arc<ProgressFn>>,
    last_percent: AtomicU8,
}

impl ProgressReporter {
    pub fn new<F>(callback: F) -> Self
    where
        F: Fn(AnalysisStage, u8) + Send + Sync + 'static,
    {
        Self {
            callback: Some(Arc::new(callback)),
            last_percent: AtomicU8::new(0),
        }
    }

    /// Reporter that tracks progress without notifying anyone
    pub fn disabled() -> Self {
        Self {
            callback: None,
            last_percent: AtomicU8::new(0),
        }
    }

    /// Report a stage. The delivered percentage is clamped to the highest
    /// value seen so far.
    pub fn report(&self, stage: AnalysisStage) {
        let target = stage.percent();
        let previous = self.last_percent.fetch_max(target, Ordering::AcqRel);
        let percent = previous.max(target);
        debug!("Analysis progress: {} ({}%)", stage.as_str(), percent);
        if let Some(callback) = &self.callback {
            callback(stage, percent);
        }
    }

    pub fn last_percent(&self) -> u8 {
        self.last_percent.load(Ordering::Acquire)
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::disabled()
    }
}

impl fmt::Debug for ProgressReporter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProgressReporter")
            .field("has_callback", &self.callback.is_some())
            .field("last_percent", &self.last_percent())
            .finish()
    }
}

//! Core functionality for the client
//!
//! This module contains the analysis workflow, the client cache, and the
//! backend health checker.

pub mod analysis;
pub mod cache;
pub mod health;

pub use analysis::{AnalysisRequest, AnalysisResult, AnalysisService};
pub use cache::{CacheStats, CacheStore};
pub use health::{HealthChecker, HealthReport, HealthStatus};

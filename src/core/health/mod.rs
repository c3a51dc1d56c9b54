//! Backend health monitoring
//!
//! Probes the analysis backend's health endpoints, in configured order with
//! fallbacks, and caches the result briefly so the rest of the client can
//! gate work on reachability without spamming probes.

pub mod checker;
pub mod types;


pub use checker::HealthChecker;
pub use types::{HealthReport, HealthStatus};

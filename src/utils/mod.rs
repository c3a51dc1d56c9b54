//! Utility modules for the WoundSight client core
//!
//! - **error**: error type, classification, and recovery
//! - **logging**: tracing subscriber setup
//! - **net**: backend HTTP client and request queue

pub mod error;
pub mod logging;
pub mod net;

pub use error::{ErrorHandler, Result, WoundsightError};
pub use net::{ApiClient, RequestQueue};

/// Format bytes as human readable string
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    const THRESHOLD: u64 = 1024;

    if bytes < THRESHOLD {
        return format!("{} B", bytes);
    }

    let mut size = bytes as f64;
    let mut unit_index = 0;

    while size >= THRESHOLD as f64 && unit_index < UNITS.len() - 1 {
        size /= THRESHOLD as f64;
        unit_index += 1;
    }

    format!("{:.1} {}", size, UNITS[unit_index])
}

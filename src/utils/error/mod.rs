//! Error handling
//!
//! Crate-wide error type plus the classification and recovery layer: every
//! failure is mapped onto a small taxonomy, enriched with severity and retry
//! metadata, logged, and optionally retried or replaced by a fallback.

pub mod classify;
pub mod error;
pub mod handler;
pub mod processed;

pub use classify::{ErrorDescriptor, ErrorKind, ErrorSeverity, classify};
pub use error::{Result, WoundsightError};
pub use handler::{ErrorHandler, ErrorHandlerSettings, ErrorSink, ErrorStats};
pub use processed::{ErrorContext, ProcessOptions, ProcessedError};

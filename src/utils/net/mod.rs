//! Network utilities
//!
//! HTTP transport for the analysis backend plus the shared request queue
//! that bounds outbound concurrency.

pub mod client;
pub mod queue;

pub use client::{ApiClient, RequestOptions};
pub use queue::{QueueSnapshot, RequestQueue};

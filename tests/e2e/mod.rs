//! End-to-end tests for woundsight-core
//!
//! These tests run against a live analysis backend and are ignored by
//! default. Run with: cargo test -- --ignored
//!
//! Required environment variables:
//! - WOUNDSIGHT_BACKEND_URL: Base URL of a running backend
//! - WOUNDSIGHT_E2E_IMAGE: Path to a wound photo for the analysis test

pub mod analysis;

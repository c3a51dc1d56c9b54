//! Common test utilities for woundsight-core
//!
//! This module provides shared test infrastructure for all tests:
//! - Mock analysis backend built on wiremock
//! - Config and payload fixtures
//! - Custom assertions and helpers
//!
//! # Usage
//!
//! ```rust
//! use crate::common::{backend, fixtures};
//!
//! #[tokio::test]
//! async fn my_test() {
//!     let server = backend::healthy_server().await;
//!     let config = fixtures::test_config(&server.uri());
//!     // ...
//! }
//! ```

pub mod backend;
pub mod fixtures;

// Re-export commonly used items
pub use backend::healthy_server;
pub use fixtures::{sample_image, test_config};

/// Skip test if environment variable is not set
#[macro_export]
macro_rules! skip_without_env {
    ($var:expr) => {
        if std::env::var($var).is_err() {
            eprintln!("Skipping test: {} environment variable not set", $var);
            return;
        }
    };
}

/// Assert that a result is Ok and return the value
#[macro_export]
macro_rules! assert_ok {
    ($expr:expr) => {
        match $expr {
            Ok(v) => v,
            Err(e) => panic!("Expected Ok, got Err: {:?}", e),
        }
    };
}

/// Assert that a result is Err
#[macro_export]
macro_rules! assert_err {
    ($expr:expr) => {
        match $expr {
            Ok(v) => panic!("Expected Err, got Ok: {:?}", v),
            Err(e) => e,
        }
    };
}

//! Integration tests for woundsight-core
//!
//! These tests verify the interaction between multiple components
//! against a mock analysis backend.

pub mod config_tests;
pub mod persistence_tests;
pub mod workflow_tests;

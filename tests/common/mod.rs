//! Common test utilities for excel-report-service integration tests

#[allow(dead_code)]
pub mod fixtures;

pub use fixtures::*;

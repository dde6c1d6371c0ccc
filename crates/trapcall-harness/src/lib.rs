//! Conformance harness for the trapcall wrapper.
//!
//! This crate provides:
//! - Fixtures: JSON descriptions of raw results and the expected translation
//! - Runner: drives the wrapper through a scripted mechanism per case
//! - Structured logging: JSONL records plus an artifact index
//! - Report generation: markdown summary of a run

#![forbid(unsafe_code)]

pub mod error;
pub mod fixtures;
pub mod report;
pub mod runner;
pub mod structured_log;

pub use error::HarnessError;
pub use fixtures::{FixtureBand, FixtureCase, FixtureSet};
pub use report::ConformanceReport;
pub use runner::{CaseResult, TestRunner};

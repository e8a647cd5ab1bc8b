#![forbid(unsafe_code)]

//! Command-line scenarios for the dragsort engine.
//!
//! Each subcommand builds a list, drives a full pointer or keyboard
//! reorder through [`dragsort_runtime::ReorderCoordinator`], runs the
//! resulting persistence commands against a
//! [`dragsort_runtime::MemoryBackend`], and prints a report.

pub mod cli;
pub mod error;
pub mod logging;
pub mod report;
pub mod scenario;

pub use cli::run_from_env;
pub use error::{DemoError, Result};

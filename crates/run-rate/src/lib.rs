//! AWS run-rate report.
//!
//! This crate provides:
//! - The ranked account cost table
//! - The pipeline tying account listing, cost aggregation and delivery together
//! - Command-line configuration for the `run-rate` binary

pub mod config;
pub mod error;
pub mod pipeline;
pub mod report;

use std::fmt::Display;
use std::io::Write;

// Re-export main types
pub use config::Cli;
pub use error::RunRateError;
pub use pipeline::{Pipeline, PipelineConfig, RunSummary};
pub use report::{format_amount, FormatError, Report, ReportKind, ReportRow};

/// Print a failed run as `ERROR: <message>` and pick the process exit status.
///
/// Returns `0` on success and `1` for every error kind.
pub fn report_outcome<T, E: Display>(result: &Result<T, E>, stderr: &mut impl Write) -> u8 {
    match result {
        Ok(_) => 0,
        Err(e) => {
            // Nothing left to report to if stderr itself is gone.
            let _ = writeln!(stderr, "ERROR: {e:#}");
            1
        }
    }
}

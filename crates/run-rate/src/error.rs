//! Run error taxonomy.

use run_rate_cost::{CostQueryError, DirectoryError};
use run_rate_notify::NotifyError;
use thiserror::Error;

use crate::report::FormatError;

/// Any failure that aborts a report run.
///
/// Every variant maps to the same exit status; the message is all that
/// distinguishes them.
#[derive(Debug, Error)]
pub enum RunRateError {
    /// Listing the organization's accounts failed.
    #[error("listing accounts: {0}")]
    Directory(#[from] DirectoryError),

    /// Querying or summing costs failed.
    #[error("querying costs: {0}")]
    CostQuery(#[from] CostQueryError),

    /// Rendering the table failed.
    #[error("formatting report: {0}")]
    Format(#[from] FormatError),

    /// Delivering the report failed.
    #[error("sending report: {0}")]
    Notify(#[from] NotifyError),
}

//! Report error types.

use chrono::NaiveDate;
use domain::{DomainError, ErrorKind};
use thiserror::Error;

/// Errors that can occur while building a report.
#[derive(Debug, Error)]
pub enum ReportError {
    /// Loading the collections failed.
    #[error("Domain error: {0}")]
    Domain(#[from] DomainError),

    /// The period end is not after its start.
    #[error("Invalid period: {from} to {to}")]
    InvalidPeriod { from: NaiveDate, to: NaiveDate },
}

impl ReportError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ReportError::Domain(e) => e.kind(),
            ReportError::InvalidPeriod { .. } => ErrorKind::Validation,
        }
    }
}

/// Result type for report operations.
pub type Result<T> = std::result::Result<T, ReportError>;

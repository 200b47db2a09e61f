//! Audit log port
//!
//! Every successful lead is appended as soon as it exists, so partial
//! progress survives a crash mid-batch.

use crate::use_cases::run_batch::BatchSummary;
use leadforge_domain::LeadRecord;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuditError {
    #[error("Could not write audit record: {0}")]
    Write(String),

    #[error("Could not finalize audit report: {0}")]
    Finalize(String),
}

/// Per-run report of created leads
pub trait AuditLog: Send + Sync {
    /// Append one record; must be durable when this returns
    fn append(&self, record: &LeadRecord) -> Result<(), AuditError>;

    /// Close the report, returning its final location.
    ///
    /// When finalizing fails the unfinalized report must remain valid.
    fn finalize(&self, summary: &BatchSummary) -> Result<PathBuf, AuditError>;
}


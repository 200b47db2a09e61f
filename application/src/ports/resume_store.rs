//! Resume position persistence port

use chrono::NaiveDate;
use thiserror::Error;

/// What a run writes back: the last successful ordinal and its epoch date
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResumeCheckpoint {
    pub last_processed_index: u32,
    pub run_date: NaiveDate,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Run parameters are locked by another run: {0}")]
    Locked(String),

    #[error("Run parameters not found: {0}")]
    NotFound(String),

    #[error("Could not persist run parameters: {0}")]
    Io(String),
}

/// Durable storage for the resume cursor.
///
/// Implementations hold an exclusive lock for the lifetime of the run.
pub trait ResumeStore: Send + Sync {
    fn persist(&self, checkpoint: &ResumeCheckpoint) -> Result<(), StoreError>;
}

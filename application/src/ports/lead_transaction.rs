//! Lead transaction port
//!
//! One opaque, multi-step external operation that creates a single lead.
//! It may block for tens of seconds (browser automation) and is never
//! cancelled once started.

use crate::context::RunContext;
use async_trait::async_trait;
use leadforge_domain::{LeadOutcome, MissingIdentifiers};
use thiserror::Error;

/// Errors reported by a lead transaction. Both kinds are retried.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransactionError {
    /// The platform answered with a structured rejection (e.g. an approval
    /// step refused the lead)
    #[error("Application rejected: {0}")]
    ApplicationRejected(String),

    /// Anything else: network, timeout, crashed automation
    #[error("Unexpected failure: {0}")]
    Unexpected(String),
}

impl TransactionError {
    pub fn is_application(&self) -> bool {
        matches!(self, TransactionError::ApplicationRejected(_))
    }
}

/// Why one attempt at an ordinal did not produce a lead
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AttemptFailure {
    #[error(transparent)]
    Transaction(#[from] TransactionError),

    /// The transaction returned, but without both identifiers
    #[error("Incomplete result: {0}")]
    Incomplete(MissingIdentifiers),
}

/// Creates one lead against the external platform
#[async_trait]
pub trait LeadTransaction: Send + Sync {
    /// Perform every side effect needed to create the lead at `ordinal`.
    ///
    /// `attempt` is 1-based and only informational.
    async fn execute(
        &self,
        ordinal: u32,
        attempt: u32,
        context: &RunContext,
    ) -> Result<LeadOutcome, TransactionError>;
}

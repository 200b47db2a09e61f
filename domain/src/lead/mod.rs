//! Leads
//!
//! Identity derivation, transaction outcomes and the attempt state machine
//! driven by the batch orchestrator.

pub mod attempt;
pub mod identity;
mod record;

pub use attempt::{AttemptState, DEFAULT_MAX_ATTEMPTS, LeadAttempts};
pub use identity::LeadIdentity;
pub use record::{LeadOutcome, LeadRecord, MissingIdentifiers};

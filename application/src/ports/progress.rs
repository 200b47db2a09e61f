//! Progress notification port
//!
//! Defines the interface for reporting progress during a batch run.

use super::lead_transaction::AttemptFailure;
use crate::use_cases::run_batch::BatchSummary;
use leadforge_domain::LeadRecord;

/// Callback for progress updates during a batch run
///
/// Implementations live in the presentation layer and can display
/// progress in various ways (progress bars, plain lines, nothing).
pub trait BatchProgressNotifier: Send + Sync {
    /// Called once before the first ordinal is attempted
    fn on_batch_start(&self, first_ordinal: u32, lead_count: u32);

    /// Called before each attempt
    fn on_attempt_start(&self, ordinal: u32, attempt: u32, max_attempts: u32);

    /// Called after a failed attempt (retry or exhaustion follows)
    fn on_attempt_failed(
        &self,
        ordinal: u32,
        attempt: u32,
        max_attempts: u32,
        failure: &AttemptFailure,
    );

    /// Called when a lead has been created and logged
    fn on_lead_created(&self, record: &LeadRecord, created: u32, total: u32);

    /// Called once at the end, whether the run completed or aborted
    fn on_batch_complete(&self, summary: &BatchSummary);
}

/// No-op progress notifier for when progress reporting is not needed
pub struct NoProgress;

impl BatchProgressNotifier for NoProgress {
    fn on_batch_start(&self, _first_ordinal: u32, _lead_count: u32) {}
    fn on_attempt_start(&self, _ordinal: u32, _attempt: u32, _max_attempts: u32) {}
    fn on_attempt_failed(&self, _: u32, _: u32, _: u32, _: &AttemptFailure) {}
    fn on_lead_created(&self, _record: &LeadRecord, _created: u32, _total: u32) {}
    fn on_batch_complete(&self, _summary: &BatchSummary) {}
}

//! Batch parameters: retry loop control.
//!
//! [`BatchParams`] groups the static parameters that control the attempt
//! loop in [`RunBatchUseCase`](crate::use_cases::run_batch::RunBatchUseCase).

use leadforge_domain::DEFAULT_MAX_ATTEMPTS;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Attempt loop control parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchParams {
    /// Attempts allowed per ordinal before the run aborts.
    pub max_attempts: u32,
    /// Delay before the second attempt. Zero disables backoff.
    pub backoff_initial: Duration,
    /// Upper bound for the doubled delay. Zero means uncapped.
    pub backoff_max: Duration,
    /// Persist the resume cursor after every created lead, not only at the end.
    pub checkpoint_each_lead: bool,
}

impl Default for BatchParams {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            backoff_initial: Duration::ZERO,
            backoff_max: Duration::ZERO,
            checkpoint_each_lead: true,
        }
    }
}

impl BatchParams {
    // ==================== Builder Methods ====================

    pub fn with_max_attempts(mut self, max: u32) -> Self {
        self.max_attempts = max.max(1);
        self
    }

    pub fn with_backoff(mut self, initial: Duration, max: Duration) -> Self {
        self.backoff_initial = initial;
        self.backoff_max = max;
        self
    }

    pub fn with_checkpoint_each_lead(mut self, enabled: bool) -> Self {
        self.checkpoint_each_lead = enabled;
        self
    }

    /// Delay to wait after failed attempt `attempt` (1-based), if any.
    ///
    /// Doubles per attempt starting at `backoff_initial`.
    pub fn backoff_after(&self, attempt: u32) -> Option<Duration> {
        if self.backoff_initial.is_zero() {
            return None;
        }
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        let delay = self.backoff_initial.saturating_mul(factor);
        if self.backoff_max.is_zero() {
            Some(delay)
        } else {
            Some(delay.min(self.backoff_max))
        }
    }
}

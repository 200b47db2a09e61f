//! Per-ordinal attempt state machine
//!
//! `Pending -> Attempting(n) -> {Succeeded | Attempting(n+1) | Exhausted}`.
//! An exhausted ordinal is never consumed; the next run retries it.

use serde::Serialize;

/// Attempts allowed per ordinal
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AttemptState {
    Pending,
    /// Attempt number `n` (1-based) is in flight
    Attempting(u32),
    Succeeded,
    Exhausted,
}

impl AttemptState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, AttemptState::Succeeded | AttemptState::Exhausted)
    }
}

/// Attempt tracking for one ordinal
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeadAttempts {
    ordinal: u32,
    max_attempts: u32,
    state: AttemptState,
}

impl LeadAttempts {
    pub fn new(ordinal: u32, max_attempts: u32) -> Self {
        Self {
            ordinal,
            max_attempts: max_attempts.max(1),
            state: AttemptState::Pending,
        }
    }

    pub fn ordinal(&self) -> u32 {
        self.ordinal
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn state(&self) -> AttemptState {
        self.state
    }

    /// Current attempt number, if one is in flight
    pub fn current_attempt(&self) -> Option<u32> {
        match self.state {
            AttemptState::Attempting(n) => Some(n),
            _ => None,
        }
    }

    /// `Pending -> Attempting(1)`; returns the attempt number in flight
    pub fn start(&mut self) -> Option<u32> {
        if self.state == AttemptState::Pending {
            self.state = AttemptState::Attempting(1);
        }
        self.current_attempt()
    }

    /// `Attempting(n) -> Succeeded`
    pub fn succeed(&mut self) {
        if let AttemptState::Attempting(_) = self.state {
            self.state = AttemptState::Succeeded;
        }
    }

    /// `Attempting(n) -> Attempting(n+1)` or `Exhausted` at the ceiling.
    ///
    /// Returns the new state. Calls outside `Attempting` leave the state
    /// unchanged.
    pub fn fail(&mut self) -> AttemptState {
        if let AttemptState::Attempting(n) = self.state {
            self.state = if n < self.max_attempts {
                AttemptState::Attempting(n + 1)
            } else {
                AttemptState::Exhausted
            };
        }
        self.state
    }
}

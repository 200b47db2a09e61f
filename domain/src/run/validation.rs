//! Run-state validation errors
//!
//! Every check runs independently; a failing run reports all of its
//! problems at once.

use thiserror::Error;

/// Ordinals per prefix per epoch must stay below this ceiling
pub const NUMBERING_CEILING: u32 = 100;

/// Accepted range for the two-digit mobile prefix
pub const MOBILE_PREFIX_RANGE: std::ops::RangeInclusive<u8> = 60..=99;

/// A single validation failure
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Invalid mobile number prefix '{found}': must be a number between 60 and 99")]
    InvalidMobilePrefix { found: String },

    #[error(
        "Numbering budget exceeded: resume index {resume_index} + lead count {lead_count} must be below {ceiling}; use a different mobile prefix",
        ceiling = NUMBERING_CEILING
    )]
    NumberingBudgetExceeded { resume_index: u32, lead_count: u32 },

    #[error("Missing required field '{field}'{}", found_suffix(.found))]
    MissingRequiredField {
        field: &'static str,
        found: Option<String>,
    },

    #[error("Invalid lead count '{found}': must be a positive integer")]
    InvalidLeadCount { found: String },

    #[error("Invalid last processed lead index '{found}': must be a non-negative integer")]
    InvalidResumeIndex { found: String },

    #[error("Invalid run date '{found}': expected dd-MM-yyyy")]
    InvalidRunDate { found: String },
}

/// All validation failures of one run, in check order
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{}", .0.iter().map(ToString::to_string).collect::<Vec<_>>().join("; "))]
pub struct ValidationErrors(pub Vec<ValidationError>);

impl ValidationErrors {
    pub fn iter(&self) -> impl Iterator<Item = &ValidationError> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, predicate: impl Fn(&ValidationError) -> bool) -> bool {
        self.0.iter().any(predicate)
    }

    /// `Ok(())` when nothing was collected
    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.0.is_empty() { Ok(()) } else { Err(self) }
    }
}

fn found_suffix(found: &Option<String>) -> String {
    found
        .as_ref()
        .map(|f| format!(" (found '{}')", f))
        .unwrap_or_default()
}

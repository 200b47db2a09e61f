//! Configuration resolution errors

use thiserror::Error;

/// Errors that stop configuration resolution.
///
/// All of them are fatal to the run and are reported before any
/// external side effect happens.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Unknown customer type '{0}' (expected one of DC, HL, HFN, LUXE)")]
    UnknownCustomerType(String),

    #[error("Unknown city code '{0}'")]
    UnknownCity(String),

    #[error("Run parameter '{0}' is missing; cannot select configuration layers")]
    MissingRunParameter(&'static str),

    #[error("Artifact '{name}' exists but could not be read: {reason}")]
    ArtifactUnreadable { name: String, reason: String },

    #[error("Run parameters were read from {loaded} but the run holds {locked}")]
    RunParametersElsewhere { locked: String, loaded: String },
}

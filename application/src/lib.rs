//! Application layer for leadforge
//!
//! This crate contains use cases, port definitions, and application configuration.
//! It depends only on the domain layer.

pub mod config;
pub mod context;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use config::BatchParams;
pub use context::RunContext;
pub use ports::{
    audit_log::{AuditError, AuditLog},
    config_source::{ConfigSource, SourceLoad},
    lead_transaction::{AttemptFailure, LeadTransaction, TransactionError},
    progress::{BatchProgressNotifier, NoProgress},
    resume_store::{ResumeCheckpoint, ResumeStore, StoreError},
};
pub use use_cases::resolve_config::{LayerProvenance, ResolveConfigUseCase, ResolvedConfig};
pub use use_cases::run_batch::{BatchSummary, RunBatchError, RunBatchUseCase};

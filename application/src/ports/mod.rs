//! Port definitions (interfaces for external adapters)
//!
//! Ports define the contracts that infrastructure adapters must implement.

pub mod audit_log;
pub mod config_source;
pub mod lead_transaction;
pub mod progress;
pub mod resume_store;

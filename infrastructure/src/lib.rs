//! Infrastructure layer for leadforge
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer, plus loading of the tool's own settings.

pub mod config;
pub mod logging;
pub mod source;
pub mod store;
pub mod transaction;

// Re-export commonly used types
pub use config::{AppSettings, SettingsError, SettingsLoader};
pub use logging::CsvAuditReport;
pub use source::{FileConfigSource, LocationCandidates, SourceError};
pub use store::RunParametersFile;
pub use transaction::CommandLeadTransaction;

//! Audit logging: the per-run CSV report of created leads.
//!
//! Provides [`CsvAuditReport`], which implements the
//! [`AuditLog`](leadforge_application::AuditLog) port.

mod csv_report;

pub use csv_report::CsvAuditReport;

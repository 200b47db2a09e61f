//! Use cases (application business logic)

pub mod resolve_config;
pub mod run_batch;

//! Durable run state

mod run_parameters;

pub use run_parameters::RunParametersFile;

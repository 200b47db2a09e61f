//! Application-level configuration.
//!
//! - [`BatchParams`]: attempt loop control (retries, backoff, checkpointing)

pub mod batch_params;

pub use batch_params::BatchParams;

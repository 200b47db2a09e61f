//! Domain layer for leadforge
//!
//! This crate contains the core rules of a bulk lead run. It performs no
//! I/O and has no dependencies on infrastructure or presentation concerns.
//!
//! # Core Concepts
//!
//! ## Layered configuration
//!
//! Four [`ConfigLayer`]s (standard-by-customer-type, customer-type-specific,
//! city-specific and run parameters) merge into one [`EffectiveConfig`].
//! Which artifacts make up the first three is decided by the
//! [`LayerCatalog`] lookup tables.
//!
//! ## Run state
//!
//! [`RunState`] is the typed, validated snapshot a batch runs from. Its
//! `resume_index` is the cursor into the daily numbering epoch: ordinals
//! `1..100` per mobile prefix per day.
//!
//! ## Leads
//!
//! Each ordinal goes through a [`LeadAttempts`] state machine and, on
//! success, yields one immutable [`LeadRecord`].

pub mod config;
pub mod lead;
pub mod run;

// Re-export commonly used types
pub use config::{
    CatalogEntry, ConfigError, ConfigLayer, ConfigValue, EffectiveConfig, LayerCatalog, LayerKind,
    keys,
};
pub use lead::{
    AttemptState, DEFAULT_MAX_ATTEMPTS, LeadAttempts, LeadIdentity, LeadOutcome, LeadRecord,
    MissingIdentifiers,
};
pub use run::{
    CityCode, CustomerType, Environment, NUMBERING_CEILING, RunState, ValidationError,
    ValidationErrors, epoch,
};

//! Layered configuration
//!
//! Value objects for the four configuration layers, the lookup tables that
//! select them and the pure merge that produces a run's effective
//! configuration.

mod catalog;
mod effective;
mod error;
pub mod keys;
mod layer;
mod value;

pub use catalog::{CatalogEntry, LayerCatalog};
pub use effective::EffectiveConfig;
pub use error::ConfigError;
pub use layer::{ConfigLayer, LayerKind};
pub use value::ConfigValue;

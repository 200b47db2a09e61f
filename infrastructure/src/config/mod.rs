//! Settings loading for leadforge
//!
//! This module handles file I/O and merging of the tool's own settings.
//! The priority order (highest to lowest):
//!
//! 1. `--settings <path>` specified file
//! 2. Project root: `./leadforge.toml`
//! 3. XDG config: `$XDG_CONFIG_HOME/leadforge/settings.toml`
//! 4. Environment variables prefixed `LEADFORGE_`
//! 5. Default values

mod loader;
mod settings;

pub use loader::SettingsLoader;
pub use settings::{
    AppSettings, LayerSettings, PathSettings, RetrySettings, RunSettings, SettingsError,
    TransactionSettings,
};

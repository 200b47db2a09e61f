//! Settings loader with multi-source merging

use super::settings::{AppSettings, SettingsError};
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use std::path::{Path, PathBuf};

const PROJECT_FILE: &str = "leadforge.toml";
const ENV_PREFIX: &str = "LEADFORGE_";

/// Settings loader that handles file discovery and merging
pub struct SettingsLoader;

impl SettingsLoader {
    /// Load settings from all sources with proper priority
    ///
    /// Priority (highest to lowest):
    /// 1. Explicit settings path (if provided)
    /// 2. Project root: `./leadforge.toml`
    /// 3. XDG config: `$XDG_CONFIG_HOME/leadforge/settings.toml`
    /// 4. Environment: `LEADFORGE_<SECTION>__<KEY>`
    /// 5. Default values
    pub fn load(settings_path: Option<&PathBuf>) -> Result<AppSettings, SettingsError> {
        let global = Self::global_settings_path().filter(|p| p.exists());
        let project = Self::project_settings_path();
        Self::load_from(settings_path.map(PathBuf::as_path), project.as_deref(), global.as_deref())
    }

    /// Merge the given files over environment and defaults, then validate
    pub fn load_from(
        explicit: Option<&Path>,
        project: Option<&Path>,
        global: Option<&Path>,
    ) -> Result<AppSettings, SettingsError> {
        let mut figment = Figment::new()
            .merge(Serialized::defaults(AppSettings::default()))
            .merge(Env::prefixed(ENV_PREFIX).split("__"));

        for path in [global, project, explicit].into_iter().flatten() {
            figment = figment.merge(Toml::file(path));
        }

        let settings: AppSettings = figment.extract().map_err(Box::new)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load only default settings
    pub fn load_defaults() -> AppSettings {
        AppSettings::default()
    }

    /// Get the global settings file path
    ///
    /// Returns XDG_CONFIG_HOME/leadforge/settings.toml if set,
    /// otherwise falls back to ~/.config/leadforge/settings.toml
    pub fn global_settings_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("leadforge").join("settings.toml"))
    }

    /// Get the project-level settings file path (if it exists)
    pub fn project_settings_path() -> Option<PathBuf> {
        let path = PathBuf::from(PROJECT_FILE);
        path.exists().then_some(path)
    }
}

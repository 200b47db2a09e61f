//! Raw TOML settings for the tool itself
//!
//! These structs mirror `leadforge.toml`. They are separate from the
//! business configuration layers, which are resolved per run.

use leadforge_application::BatchParams;
use leadforge_domain::{ConfigError, LayerCatalog};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Settings validation and loading errors
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Could not load settings: {0}")]
    Load(#[from] Box<figment::Error>),

    #[error("retry.max_attempts cannot be 0")]
    InvalidMaxAttempts,

    #[error("transaction.timeout_seconds cannot be 0")]
    InvalidTimeout,

    #[error("Invalid [layers] table: {0}")]
    InvalidLayers(#[from] ConfigError),
}

/// `[paths]`: where artifacts and reports live
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathSettings {
    /// Name of the run-parameters artifact
    pub run_parameters: String,
    /// Directory searched under the working and executable directories
    pub config_subdir: String,
    /// Directory under the user's home used as a fallback
    pub home_subdir: String,
    /// Bundled resources, searched last
    pub resources_dir: String,
    /// Audit reports and log files; falls back to `REPORT_PATH`
    pub report_dir: Option<PathBuf>,
}

impl Default for PathSettings {
    fn default() -> Self {
        Self {
            run_parameters: "userConfigurations.properties".to_string(),
            config_subdir: "configuration".to_string(),
            home_subdir: "API-UI".to_string(),
            resources_dir: "resources".to_string(),
            report_dir: None,
        }
    }
}

/// `[retry]`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrySettings {
    pub max_attempts: u32,
    /// Zero retries immediately
    pub backoff_initial_ms: u64,
    pub backoff_max_ms: u64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff_initial_ms: 0,
            backoff_max_ms: 0,
        }
    }
}

/// `[transaction]`: the external lead-creation command
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TransactionSettings {
    /// Program and arguments, e.g. `["node", "create-lead.js"]`
    pub command: Vec<String>,
    pub timeout_seconds: u64,
    pub working_dir: Option<PathBuf>,
}

impl Default for TransactionSettings {
    fn default() -> Self {
        Self {
            command: Vec::new(),
            timeout_seconds: 300,
            working_dir: None,
        }
    }
}

/// `[run]`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunSettings {
    pub checkpoint_each_lead: bool,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            checkpoint_each_lead: true,
        }
    }
}

/// `[layers]`: additions to or replacements of the lookup tables
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LayerSettings {
    pub standard: BTreeMap<String, String>,
    pub customer: BTreeMap<String, String>,
    pub city: BTreeMap<String, String>,
}

/// Complete settings file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    pub paths: PathSettings,
    pub retry: RetrySettings,
    pub transaction: TransactionSettings,
    pub run: RunSettings,
    pub layers: LayerSettings,
}

impl AppSettings {
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.retry.max_attempts == 0 {
            return Err(SettingsError::InvalidMaxAttempts);
        }
        if self.transaction.timeout_seconds == 0 {
            return Err(SettingsError::InvalidTimeout);
        }
        self.catalog()?;
        Ok(())
    }

    /// Built-in lookup tables with `[layers]` applied
    pub fn catalog(&self) -> Result<LayerCatalog, ConfigError> {
        LayerCatalog::default().with_overrides(
            &self.layers.standard,
            &self.layers.customer,
            &self.layers.city,
        )
    }

    pub fn batch_params(&self) -> BatchParams {
        BatchParams::default()
            .with_max_attempts(self.retry.max_attempts)
            .with_backoff(
                Duration::from_millis(self.retry.backoff_initial_ms),
                Duration::from_millis(self.retry.backoff_max_ms),
            )
            .with_checkpoint_each_lead(self.run.checkpoint_each_lead)
    }

    pub fn transaction_timeout(&self) -> Duration {
        Duration::from_secs(self.transaction.timeout_seconds)
    }

    /// Report directory: `[paths] report_dir`, then `REPORT_PATH`, then
    /// `~/API-UI/reports`
    pub fn report_dir(&self) -> PathBuf {
        resolve_report_dir(
            self.paths.report_dir.clone(),
            std::env::var("REPORT_PATH").ok(),
            dirs::home_dir(),
            &self.paths.home_subdir,
        )
    }
}

fn resolve_report_dir(
    configured: Option<PathBuf>,
    report_path_env: Option<String>,
    home: Option<PathBuf>,
    home_subdir: &str,
) -> PathBuf {
    if let Some(dir) = configured {
        return dir;
    }
    if let Some(env) = report_path_env.filter(|v| !v.trim().is_empty()) {
        return PathBuf::from(env.trim());
    }
    home.unwrap_or_else(|| PathBuf::from("."))
        .join(home_subdir)
        .join("reports")
}

#[cfg(test)]
mod tests {
    use super::*;
    use leadforge_domain::{CityCode, CustomerType};

    #[test]
    fn test_defaults() {
        let settings = AppSettings::default();
        assert_eq!(settings.paths.run_parameters, "userConfigurations.properties");
        assert_eq!(settings.retry.max_attempts, 3);
        assert_eq!(settings.transaction.timeout_seconds, 300);
        assert!(settings.run.checkpoint_each_lead);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_deserialize_partial() {
        let toml_str = r#"
[retry]
max_attempts = 5
backoff_initial_ms = 250

[transaction]
command = ["node", "create-lead.js"]

[layers.city]
AMD = "cities/ahmedabad.properties"
"#;
        let settings: AppSettings = toml::from_str(toml_str).unwrap();
        assert_eq!(settings.retry.max_attempts, 5);
        assert_eq!(settings.transaction.command, vec!["node", "create-lead.js"]);
        assert_eq!(settings.transaction.timeout_seconds, 300);

        let params = settings.batch_params();
        assert_eq!(params.max_attempts, 5);
        assert_eq!(params.backoff_after(2), Some(Duration::from_millis(500)));

        let catalog = settings.catalog().unwrap();
        assert_eq!(
            catalog.city_for(&CityCode::new("AMD")).unwrap(),
            "cities/ahmedabad.properties"
        );
        assert!(catalog.standard_for(CustomerType::Dc).is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_values() {
        let mut settings = AppSettings::default();
        settings.retry.max_attempts = 0;
        assert!(matches!(
            settings.validate(),
            Err(SettingsError::InvalidMaxAttempts)
        ));

        let mut settings = AppSettings::default();
        settings.transaction.timeout_seconds = 0;
        assert!(matches!(settings.validate(), Err(SettingsError::InvalidTimeout)));
    }

    #[test]
    fn test_validate_rejects_unknown_layer_key() {
        let mut settings = AppSettings::default();
        settings
            .layers
            .standard
            .insert("RETAIL".to_string(), "x.json".to_string());
        assert!(matches!(
            settings.validate(),
            Err(SettingsError::InvalidLayers(_))
        ));
    }

    #[test]
    fn test_report_dir_precedence() {
        let home = Some(PathBuf::from("/home/op"));

        assert_eq!(
            resolve_report_dir(
                Some("/srv/reports".into()),
                Some("/env".into()),
                home.clone(),
                "API-UI"
            ),
            PathBuf::from("/srv/reports")
        );
        assert_eq!(
            resolve_report_dir(None, Some("/env".into()), home.clone(), "API-UI"),
            PathBuf::from("/env")
        );
        assert_eq!(
            resolve_report_dir(None, Some("  ".into()), home, "API-UI"),
            PathBuf::from("/home/op/API-UI/reports")
        );
    }
}

//! Resolve Config use case
//!
//! Selects the four configuration layers for a run, loads each through a
//! [`ConfigSource`], and merges them by precedence.

use crate::ports::config_source::{ConfigSource, SourceLoad};
use leadforge_domain::{
    CatalogEntry, CityCode, ConfigError, ConfigLayer, CustomerType, EffectiveConfig, LayerCatalog,
    LayerKind, keys,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// How one layer was obtained
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerProvenance {
    pub kind: LayerKind,
    pub artifact: String,
    pub origin: Option<PathBuf>,
    pub keys: usize,
}

impl LayerProvenance {
    pub fn found(&self) -> bool {
        self.origin.is_some()
    }
}

/// Merged configuration plus where each layer came from
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub effective: EffectiveConfig,
    /// Lowest precedence first
    pub layers: Vec<LayerProvenance>,
}

impl ResolvedConfig {
    pub fn layer(&self, kind: LayerKind) -> Option<&LayerProvenance> {
        self.layers.iter().find(|l| l.kind == kind)
    }
}

/// Use case for building the effective configuration of a run
pub struct ResolveConfigUseCase<S: ConfigSource + 'static> {
    source: Arc<S>,
    catalog: LayerCatalog,
    run_parameters: String,
}

impl<S: ConfigSource + 'static> ResolveConfigUseCase<S> {
    pub fn new(
        source: Arc<S>,
        catalog: LayerCatalog,
        run_parameters: impl Into<String>,
    ) -> Self {
        Self {
            source,
            catalog,
            run_parameters: run_parameters.into(),
        }
    }

    pub fn catalog(&self) -> &LayerCatalog {
        &self.catalog
    }

    /// Name of the run-parameters artifact
    pub fn run_parameters_name(&self) -> &str {
        &self.run_parameters
    }

    /// Load the run-parameters layer (highest precedence)
    pub fn load_run_parameters(&self) -> Result<(ConfigLayer, Option<PathBuf>), ConfigError> {
        self.load_layer(&self.run_parameters, LayerKind::RunParameters)
    }

    /// Load the run-parameters layer, requiring it to come from `locked`.
    ///
    /// The cursor is written back to the locked file, so reading another
    /// copy would make the next run start from a stale cursor.
    pub fn load_run_parameters_from(
        &self,
        locked: &Path,
    ) -> Result<(ConfigLayer, Option<PathBuf>), ConfigError> {
        let (layer, origin) = self.load_run_parameters()?;
        if let Some(loaded) = &origin
            && loaded != locked
        {
            return Err(ConfigError::RunParametersElsewhere {
                locked: locked.display().to_string(),
                loaded: loaded.display().to_string(),
            });
        }
        Ok((layer, origin))
    }

    /// Resolve using the customer type and city named by the run parameters
    pub fn resolve_run(
        &self,
        run_parameters: ConfigLayer,
        run_parameters_origin: Option<PathBuf>,
    ) -> Result<ResolvedConfig, ConfigError> {
        let raw_type = run_parameters
            .text(keys::CUSTOMER_TYPE)
            .ok_or(ConfigError::MissingRunParameter(keys::CUSTOMER_TYPE))?;
        let customer_type: CustomerType = raw_type
            .parse()
            .map_err(|_| ConfigError::UnknownCustomerType(raw_type.to_string()))?;
        let city = run_parameters
            .text(keys::CITY)
            .map(CityCode::new)
            .ok_or(ConfigError::MissingRunParameter(keys::CITY))?;

        let mut resolved = self.resolve(customer_type, &city, run_parameters)?;
        if let Some(run) = resolved
            .layers
            .iter_mut()
            .find(|l| l.kind == LayerKind::RunParameters)
        {
            run.origin = run_parameters_origin;
        }
        Ok(resolved)
    }

    /// Build the effective configuration for one (customer type, city) pair.
    ///
    /// Unknown selectors fail before anything is loaded. A layer that is
    /// absent everywhere contributes nothing and is logged as a warning.
    pub fn resolve(
        &self,
        customer_type: CustomerType,
        city: &CityCode,
        run_parameters: ConfigLayer,
    ) -> Result<ResolvedConfig, ConfigError> {
        let standard = self.catalog.standard_for(customer_type)?.to_string();
        let customer = self.catalog.customer_for(customer_type)?.to_string();
        let city_artifact = self.catalog.city_for(city)?.to_string();

        info!(
            "Resolving configuration for {} in {}",
            customer_type,
            city.as_str()
        );

        let mut layers = Vec::with_capacity(4);
        let mut provenance = Vec::with_capacity(4);

        for (artifact, kind) in [
            (standard, LayerKind::StandardByCustomerType),
            (customer, LayerKind::CustomerTypeSpecific),
            (city_artifact, LayerKind::CitySpecific),
        ] {
            let (layer, origin) = self.load_layer(&artifact, kind)?;
            provenance.push(LayerProvenance {
                kind,
                artifact,
                origin,
                keys: layer.len(),
            });
            layers.push(layer);
        }

        provenance.push(LayerProvenance {
            kind: LayerKind::RunParameters,
            artifact: self.run_parameters.clone(),
            origin: None,
            keys: run_parameters.len(),
        });
        layers.push(run_parameters);

        let effective = EffectiveConfig::merge(&layers);
        debug!("Effective configuration has {} keys", effective.len());

        Ok(ResolvedConfig {
            effective,
            layers: provenance,
        })
    }

    /// Catalog entries whose artifact is not present at any location
    pub fn verify_catalog(&self) -> Vec<CatalogEntry> {
        self.catalog
            .missing_entries(|artifact| self.source.exists(artifact))
    }

    fn load_layer(
        &self,
        artifact: &str,
        kind: LayerKind,
    ) -> Result<(ConfigLayer, Option<PathBuf>), ConfigError> {
        match self.source.load(artifact) {
            SourceLoad::Found { entries, origin } => {
                debug!(
                    "Loaded {} layer '{}' from {}",
                    kind,
                    artifact,
                    origin.display()
                );
                Ok((ConfigLayer::new(artifact, kind, entries), Some(origin)))
            }
            SourceLoad::NotFound => {
                warn!(
                    "Configuration artifact '{}' ({} layer) not found; using an empty layer",
                    artifact, kind
                );
                Ok((ConfigLayer::empty(artifact, kind), None))
            }
            SourceLoad::Unreadable { reasons } => Err(ConfigError::ArtifactUnreadable {
                name: artifact.to_string(),
                reason: reasons.join("; "),
            }),
        }
    }
}

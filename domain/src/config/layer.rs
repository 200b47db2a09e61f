//! Configuration layers
//!
//! A run's effective configuration is built from four layers. Each layer is
//! immutable once loaded; a layer that could not be found is simply empty.

use super::value::ConfigValue;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Which of the four configuration sources a layer came from.
///
/// Variants are declared lowest precedence first, so the derived `Ord`
/// is the merge order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayerKind {
    StandardByCustomerType,
    CustomerTypeSpecific,
    CitySpecific,
    RunParameters,
}

impl LayerKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            LayerKind::StandardByCustomerType => "standard",
            LayerKind::CustomerTypeSpecific => "customer",
            LayerKind::CitySpecific => "city",
            LayerKind::RunParameters => "run",
        }
    }

    /// All kinds in merge order (lowest precedence first)
    pub fn merge_order() -> [LayerKind; 4] {
        [
            LayerKind::StandardByCustomerType,
            LayerKind::CustomerTypeSpecific,
            LayerKind::CitySpecific,
            LayerKind::RunParameters,
        ]
    }
}

impl std::fmt::Display for LayerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A named, loaded configuration source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigLayer {
    /// Artifact name the layer was loaded from (e.g. `standardConfigHL.json`)
    pub name: String,
    pub kind: LayerKind,
    entries: BTreeMap<String, ConfigValue>,
}

impl ConfigLayer {
    pub fn new(
        name: impl Into<String>,
        kind: LayerKind,
        entries: BTreeMap<String, ConfigValue>,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            entries,
        }
    }

    /// A layer whose artifact was not found anywhere
    pub fn empty(name: impl Into<String>, kind: LayerKind) -> Self {
        Self::new(name, kind, BTreeMap::new())
    }

    /// Build a flat layer from string pairs
    pub fn from_pairs<K, V>(
        name: impl Into<String>,
        kind: LayerKind,
        pairs: impl IntoIterator<Item = (K, V)>,
    ) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let entries = pairs
            .into_iter()
            .map(|(k, v)| (k.into(), ConfigValue::Text(v.into())))
            .collect();
        Self::new(name, kind, entries)
    }

    pub fn get(&self, key: &str) -> Option<&ConfigValue> {
        self.entries.get(key)
    }

    /// Flat text value for a key, trimmed; empty strings count as absent
    pub fn text(&self, key: &str) -> Option<&str> {
        self.entries
            .get(key)
            .and_then(ConfigValue::as_text)
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    pub fn entries(&self) -> &BTreeMap<String, ConfigValue> {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Return a copy with `overrides` replacing or adding keys.
    ///
    /// Used for operator-supplied overrides of the run-parameter layer.
    pub fn with_overrides<'a>(
        &self,
        overrides: impl IntoIterator<Item = (&'a str, String)>,
    ) -> Self {
        let mut entries = self.entries.clone();
        for (key, value) in overrides {
            entries.insert(key.to_string(), ConfigValue::Text(value));
        }
        Self::new(self.name.clone(), self.kind, entries)
    }
}

//! Effective configuration: the merge of all layers for one run

use super::layer::{ConfigLayer, LayerKind};
use super::value::ConfigValue;
use serde::Serialize;
use std::collections::BTreeMap;

/// Merged configuration with per-key provenance.
///
/// Precedence: run parameters > city > customer type > standard. A key
/// defined by a higher layer replaces the lower value wholesale; nested
/// maps are not deep-merged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EffectiveConfig {
    values: BTreeMap<String, ConfigValue>,
    #[serde(skip)]
    origins: BTreeMap<String, LayerKind>,
}

impl EffectiveConfig {
    /// Merge layers. Input order does not matter; layers are applied by
    /// [`LayerKind`] precedence, and layers of the same kind in the order given.
    pub fn merge(layers: &[ConfigLayer]) -> Self {
        let mut ordered: Vec<&ConfigLayer> = layers.iter().collect();
        ordered.sort_by_key(|layer| layer.kind);

        let mut merged = Self::default();
        for layer in ordered {
            for (key, value) in layer.entries() {
                merged.values.insert(key.clone(), value.clone());
                merged.origins.insert(key.clone(), layer.kind);
            }
        }
        merged
    }

    pub fn get(&self, key: &str) -> Option<&ConfigValue> {
        self.values.get(key)
    }

    /// Flat text value for a key, trimmed; empty strings count as absent
    pub fn text(&self, key: &str) -> Option<&str> {
        self.values
            .get(key)
            .and_then(ConfigValue::as_text)
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// Which layer supplied the winning value for a key
    pub fn origin(&self, key: &str) -> Option<LayerKind> {
        self.origins.get(key).copied()
    }

    /// Flat entries of `section.<environment>`, matched ignoring case.
    ///
    /// Sections such as `projectEnvironments` and `login_Credential` hold one
    /// sub-map per environment name.
    pub fn environment_section(
        &self,
        section: &str,
        environment: &str,
    ) -> BTreeMap<String, String> {
        self.values
            .get(section)
            .and_then(|v| v.get_ignore_case(environment))
            .map(ConfigValue::flat_entries)
            .unwrap_or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &ConfigValue)> {
        self.values.iter()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Canonical JSON rendering. Keys are sorted, so identical inputs
    /// always render to identical bytes.
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(&self.values).unwrap_or_else(|_| "{}".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn layer(kind: LayerKind, pairs: &[(&str, &str)]) -> ConfigLayer {
        ConfigLayer::from_pairs(kind.as_str(), kind, pairs.iter().copied())
    }

    #[test]
    fn test_higher_precedence_wins() {
        let layers = vec![
            layer(
                LayerKind::StandardByCustomerType,
                &[("a", "std"), ("b", "std"), ("c", "std"), ("d", "std")],
            ),
            layer(
                LayerKind::CustomerTypeSpecific,
                &[("b", "cust"), ("c", "cust"), ("d", "cust")],
            ),
            layer(LayerKind::CitySpecific, &[("c", "city"), ("d", "city")]),
            layer(LayerKind::RunParameters, &[("d", "run")]),
        ];
        let merged = EffectiveConfig::merge(&layers);

        assert_eq!(merged.text("a"), Some("std"));
        assert_eq!(merged.text("b"), Some("cust"));
        assert_eq!(merged.text("c"), Some("city"));
        assert_eq!(merged.text("d"), Some("run"));
        assert_eq!(merged.origin("a"), Some(LayerKind::StandardByCustomerType));
        assert_eq!(merged.origin("d"), Some(LayerKind::RunParameters));
    }

    #[test]
    fn test_merge_ignores_input_order() {
        let forward = vec![
            layer(LayerKind::StandardByCustomerType, &[("k", "std")]),
            layer(LayerKind::RunParameters, &[("k", "run")]),
        ];
        let reversed: Vec<_> = forward.iter().rev().cloned().collect();
        assert_eq!(EffectiveConfig::merge(&forward), EffectiveConfig::merge(&reversed));
        assert_eq!(EffectiveConfig::merge(&reversed).text("k"), Some("run"));
    }

    #[test]
    fn test_nested_maps_replaced_not_merged() {
        let lower = ConfigLayer::new(
            "std",
            LayerKind::StandardByCustomerType,
            [(
                "projectEnvironments".to_string(),
                ConfigValue::from_json(json!({
                    "prod": {"BaseURL": "a"},
                    "preProd": {"BaseURL": "b"}
                })),
            )]
            .into(),
        );
        let higher = ConfigLayer::new(
            "cust",
            LayerKind::CustomerTypeSpecific,
            [(
                "projectEnvironments".to_string(),
                ConfigValue::from_json(json!({"prod": {"BaseURL": "c"}})),
            )]
            .into(),
        );
        let merged = EffectiveConfig::merge(&[lower, higher]);

        assert_eq!(merged.environment_section("projectEnvironments", "prod")["BaseURL"], "c");
        assert!(merged.environment_section("projectEnvironments", "preProd").is_empty());
    }

    #[test]
    fn test_empty_layers_contribute_nothing() {
        let merged = EffectiveConfig::merge(&[
            ConfigLayer::empty("city.properties", LayerKind::CitySpecific),
            layer(LayerKind::StandardByCustomerType, &[("a", "1")]),
        ]);
        assert_eq!(merged.len(), 1);
    }

    #[test]
    fn test_to_json_is_deterministic() {
        let layers = vec![
            layer(LayerKind::CitySpecific, &[("z", "1"), ("a", "2")]),
            layer(LayerKind::RunParameters, &[("m", "3")]),
        ];
        let first = EffectiveConfig::merge(&layers).to_json();
        let second = EffectiveConfig::merge(&layers).to_json();
        assert_eq!(first, second);
        assert!(first.find("\"a\"").unwrap() < first.find("\"z\"").unwrap());
    }

    #[test]
    fn test_blank_text_counts_as_absent() {
        let merged = EffectiveConfig::merge(&[layer(LayerKind::RunParameters, &[("k", "  ")])]);
        assert_eq!(merged.text("k"), None);
        assert!(merged.get("k").is_some());
    }
}

//! Configuration value object
//!
//! A layer maps keys to either a flat string or a nested mapping. Numbers
//! and booleans coming from JSON/TOML artifacts are kept in their textual
//! form; the typed view is built later by [`RunState`](crate::RunState).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single configuration value: text or a nested mapping
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConfigValue {
    Text(String),
    Map(BTreeMap<String, ConfigValue>),
}

impl ConfigValue {
    pub fn text(value: impl Into<String>) -> Self {
        ConfigValue::Text(value.into())
    }

    /// Text content, if this is a flat value
    pub fn as_text(&self) -> Option<&str> {
        match self {
            ConfigValue::Text(s) => Some(s),
            ConfigValue::Map(_) => None,
        }
    }

    /// Nested mapping, if this is a map value
    pub fn as_map(&self) -> Option<&BTreeMap<String, ConfigValue>> {
        match self {
            ConfigValue::Map(m) => Some(m),
            ConfigValue::Text(_) => None,
        }
    }

    /// Look up a child key ignoring ASCII case.
    ///
    /// Environment-keyed sections are written as `preProd`, `PreProd` or
    /// `preprod` depending on who edited the artifact.
    pub fn get_ignore_case(&self, key: &str) -> Option<&ConfigValue> {
        let map = self.as_map()?;
        map.get(key)
            .or_else(|| map.iter().find(|(k, _)| k.eq_ignore_ascii_case(key)).map(|(_, v)| v))
    }

    /// Convert a JSON document into a configuration value.
    ///
    /// Scalars become text, arrays keep their JSON rendering and `null`
    /// becomes an empty string.
    pub fn from_json(value: serde_json::Value) -> Self {
        use serde_json::Value;
        match value {
            Value::Null => ConfigValue::Text(String::new()),
            Value::Bool(b) => ConfigValue::Text(b.to_string()),
            Value::Number(n) => ConfigValue::Text(n.to_string()),
            Value::String(s) => ConfigValue::Text(s),
            Value::Array(_) => ConfigValue::Text(value.to_string()),
            Value::Object(map) => ConfigValue::Map(
                map.into_iter()
                    .map(|(k, v)| (k, ConfigValue::from_json(v)))
                    .collect(),
            ),
        }
    }

    /// Flatten a nested map into `key -> text`, dropping nested maps.
    pub fn flat_entries(&self) -> BTreeMap<String, String> {
        self.as_map()
            .map(|m| {
                m.iter()
                    .filter_map(|(k, v)| v.as_text().map(|t| (k.clone(), t.to_string())))
                    .collect()
            })
            .unwrap_or_default()
    }
}

impl From<&str> for ConfigValue {
    fn from(s: &str) -> Self {
        ConfigValue::Text(s.to_string())
    }
}

impl From<String> for ConfigValue {
    fn from(s: String) -> Self {
        ConfigValue::Text(s)
    }
}

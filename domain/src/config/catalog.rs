//! Lookup tables from customer type / city code to layer artifacts
//!
//! The tables are data, not control flow: an unknown key is a structured
//! [`ConfigError`] instead of a silently missing layer.

use super::error::ConfigError;
use super::layer::LayerKind;
use crate::run::{CityCode, CustomerType};
use std::collections::BTreeMap;

const DEFAULT_CITIES: &[(&str, &str)] = &[
    ("BLR", "cities/bangalore.properties"),
    ("CHN", "cities/chennai.properties"),
    ("DEL", "cities/delhi.properties"),
    ("GGN", "cities/gurgaon.properties"),
    ("HYD", "cities/hyderabad.properties"),
    ("KOL", "cities/kolkata.properties"),
    ("MUM", "cities/mumbai.properties"),
    ("NOI", "cities/noida.properties"),
    ("PUN", "cities/pune.properties"),
];

/// One artifact referenced by the catalog
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    pub kind: LayerKind,
    /// Lookup key (customer type or city code)
    pub key: String,
    /// Artifact name handed to the config source
    pub artifact: String,
}

/// Fixed lookup tables for the three file-backed layers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerCatalog {
    standard: BTreeMap<CustomerType, String>,
    customer: BTreeMap<CustomerType, String>,
    city: BTreeMap<String, String>,
}

impl Default for LayerCatalog {
    fn default() -> Self {
        let standard = CustomerType::all()
            .into_iter()
            .map(|ct| (ct, format!("standardConfig_{}.json", ct)))
            .collect();
        let customer = CustomerType::all()
            .into_iter()
            .map(|ct| (ct, format!("customerConfig_{}.json", ct)))
            .collect();
        let city = DEFAULT_CITIES
            .iter()
            .map(|(code, artifact)| (code.to_string(), artifact.to_string()))
            .collect();
        Self {
            standard,
            customer,
            city,
        }
    }
}

impl LayerCatalog {
    /// A catalog with no entries; mostly useful in tests
    pub fn empty() -> Self {
        Self {
            standard: BTreeMap::new(),
            customer: BTreeMap::new(),
            city: BTreeMap::new(),
        }
    }

    pub fn with_standard(
        mut self,
        customer_type: CustomerType,
        artifact: impl Into<String>,
    ) -> Self {
        self.standard.insert(customer_type, artifact.into());
        self
    }

    pub fn with_customer(
        mut self,
        customer_type: CustomerType,
        artifact: impl Into<String>,
    ) -> Self {
        self.customer.insert(customer_type, artifact.into());
        self
    }

    pub fn with_city(mut self, code: impl AsRef<str>, artifact: impl Into<String>) -> Self {
        self.city.insert(code.as_ref().trim().to_string(), artifact.into());
        self
    }

    /// Apply string-keyed overrides (as read from settings files).
    ///
    /// Customer-type keys must parse; anything else is rejected rather than
    /// ignored.
    pub fn with_overrides(
        mut self,
        standard: &BTreeMap<String, String>,
        customer: &BTreeMap<String, String>,
        city: &BTreeMap<String, String>,
    ) -> Result<Self, ConfigError> {
        for (key, artifact) in standard {
            let ct = key
                .parse::<CustomerType>()
                .map_err(|_| ConfigError::UnknownCustomerType(key.clone()))?;
            self.standard.insert(ct, artifact.clone());
        }
        for (key, artifact) in customer {
            let ct = key
                .parse::<CustomerType>()
                .map_err(|_| ConfigError::UnknownCustomerType(key.clone()))?;
            self.customer.insert(ct, artifact.clone());
        }
        for (code, artifact) in city {
            self.city.insert(code.trim().to_string(), artifact.clone());
        }
        Ok(self)
    }

    pub fn standard_for(&self, customer_type: CustomerType) -> Result<&str, ConfigError> {
        self.standard
            .get(&customer_type)
            .map(String::as_str)
            .ok_or_else(|| ConfigError::UnknownCustomerType(customer_type.to_string()))
    }

    pub fn customer_for(&self, customer_type: CustomerType) -> Result<&str, ConfigError> {
        self.customer
            .get(&customer_type)
            .map(String::as_str)
            .ok_or_else(|| ConfigError::UnknownCustomerType(customer_type.to_string()))
    }

    /// City artifact for a code; exact match first, then ignoring case
    pub fn city_for(&self, code: &CityCode) -> Result<&str, ConfigError> {
        self.city
            .get(code.as_str())
            .or_else(|| {
                self.city
                    .iter()
                    .find(|(k, _)| k.eq_ignore_ascii_case(code.as_str()))
                    .map(|(_, v)| v)
            })
            .map(String::as_str)
            .ok_or_else(|| ConfigError::UnknownCity(code.to_string()))
    }

    pub fn city_codes(&self) -> impl Iterator<Item = &str> {
        self.city.keys().map(String::as_str)
    }

    /// Every artifact the catalog refers to, in a stable order
    pub fn entries(&self) -> Vec<CatalogEntry> {
        let standard = self.standard.iter().map(|(ct, a)| CatalogEntry {
            kind: LayerKind::StandardByCustomerType,
            key: ct.to_string(),
            artifact: a.clone(),
        });
        let customer = self.customer.iter().map(|(ct, a)| CatalogEntry {
            kind: LayerKind::CustomerTypeSpecific,
            key: ct.to_string(),
            artifact: a.clone(),
        });
        let city = self.city.iter().map(|(code, a)| CatalogEntry {
            kind: LayerKind::CitySpecific,
            key: code.clone(),
            artifact: a.clone(),
        });
        standard.chain(customer).chain(city).collect()
    }

    /// Entries whose artifact is not present according to `exists`
    pub fn missing_entries(&self, exists: impl Fn(&str) -> bool) -> Vec<CatalogEntry> {
        self.entries()
            .into_iter()
            .filter(|entry| !exists(&entry.artifact))
            .collect()
    }
}

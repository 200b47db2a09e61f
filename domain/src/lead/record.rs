//! Lead transaction results

use crate::run::CustomerType;
use serde::{Deserialize, Serialize};

/// Raw identifiers returned by one lead transaction.
///
/// Every field is optional because the external flow may stop part-way;
/// only a result carrying both a customer and a project identifier becomes
/// a [`LeadRecord`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LeadOutcome {
    pub customer_id: Option<String>,
    pub project_id: Option<String>,
    pub dp_name: Option<String>,
    pub dp_email: Option<String>,
    pub dp_mobile: Option<String>,
    #[serde(rename = "fullProjectURL", alias = "fullProjectUrl")]
    pub full_project_url: Option<String>,
}

/// A successful lead, appended once to the audit log and never changed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadRecord {
    pub ordinal: u32,
    pub customer_type: CustomerType,
    pub customer_id: String,
    pub project_id: String,
    pub dp_name: String,
    pub dp_email: String,
    pub dp_mobile: String,
    pub full_project_url: Option<String>,
}

/// Identifiers a partial outcome was missing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingIdentifiers(pub Vec<&'static str>);

impl std::fmt::Display for MissingIdentifiers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "missing {}", self.0.join(", "))
    }
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

impl LeadRecord {
    /// Accept an outcome only when both identifiers are present
    pub fn from_outcome(
        ordinal: u32,
        customer_type: CustomerType,
        outcome: &LeadOutcome,
    ) -> Result<Self, MissingIdentifiers> {
        let customer_id = present(&outcome.customer_id);
        let project_id = present(&outcome.project_id);

        match (customer_id, project_id) {
            (Some(customer_id), Some(project_id)) => Ok(Self {
                ordinal,
                customer_type,
                customer_id: customer_id.to_string(),
                project_id: project_id.to_string(),
                dp_name: present(&outcome.dp_name).unwrap_or_default().to_string(),
                dp_email: present(&outcome.dp_email).unwrap_or_default().to_string(),
                dp_mobile: present(&outcome.dp_mobile).unwrap_or_default().to_string(),
                full_project_url: present(&outcome.full_project_url).map(str::to_string),
            }),
            (c, p) => {
                let mut missing = Vec::new();
                if c.is_none() {
                    missing.push("customerId");
                }
                if p.is_none() {
                    missing.push("projectId");
                }
                Err(MissingIdentifiers(missing))
            }
        }
    }
}

//! Customer segment value object

use serde::{Deserialize, Serialize};

/// Customer segment a lead belongs to.
///
/// `DC` leads are created through browser automation; the other segments
/// go through the REST flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CustomerType {
    Dc,
    Hl,
    Hfn,
    Luxe,
}

impl CustomerType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CustomerType::Dc => "DC",
            CustomerType::Hl => "HL",
            CustomerType::Hfn => "HFN",
            CustomerType::Luxe => "LUXE",
        }
    }

    pub fn all() -> [CustomerType; 4] {
        [
            CustomerType::Dc,
            CustomerType::Hl,
            CustomerType::Hfn,
            CustomerType::Luxe,
        ]
    }

    /// Whether leads of this segment are created through UI automation
    pub fn uses_ui_automation(&self) -> bool {
        matches!(self, CustomerType::Dc)
    }
}

impl std::fmt::Display for CustomerType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for CustomerType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "DC" => Ok(CustomerType::Dc),
            "HL" => Ok(CustomerType::Hl),
            "HFN" => Ok(CustomerType::Hfn),
            "LUXE" => Ok(CustomerType::Luxe),
            other => Err(format!("unknown customer type '{}'", other)),
        }
    }
}

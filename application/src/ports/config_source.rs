//! Configuration source port
//!
//! Reads one named configuration artifact. Implementations search their
//! own ordered candidate locations; the first location that parses wins.

use leadforge_domain::ConfigValue;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Result of looking up one artifact.
///
/// "Not found" is not an error: the caller gets an empty layer and a
/// warning. `Unreadable` means the artifact exists somewhere but no copy
/// of it could be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceLoad {
    Found {
        entries: BTreeMap<String, ConfigValue>,
        origin: PathBuf,
    },
    NotFound,
    Unreadable {
        reasons: Vec<String>,
    },
}

impl SourceLoad {
    pub fn found(&self) -> bool {
        matches!(self, SourceLoad::Found { .. })
    }

    pub fn origin(&self) -> Option<&PathBuf> {
        match self {
            SourceLoad::Found { origin, .. } => Some(origin),
            _ => None,
        }
    }
}

/// Read-only access to configuration artifacts
pub trait ConfigSource: Send + Sync {
    /// Load an artifact by name from the first candidate location that has
    /// a parseable copy
    fn load(&self, name: &str) -> SourceLoad;

    /// Whether the artifact is present at any candidate location
    fn exists(&self, name: &str) -> bool;
}

//! Artifact parsers: `.properties`, `.json`, `.toml`
//!
//! Every format is normalized to a map of [`ConfigValue`]s. Anything other
//! than `.json` and `.toml` is read as a properties file.

use leadforge_domain::ConfigValue;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Why one location's copy of an artifact could not be used
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("{path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path}: invalid JSON: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("{path}: invalid TOML: {source}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("{path}: top level must be an object")]
    NotAMap { path: PathBuf },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactFormat {
    Properties,
    Json,
    Toml,
}

impl ArtifactFormat {
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            Some("json") => ArtifactFormat::Json,
            Some("toml") => ArtifactFormat::Toml,
            _ => ArtifactFormat::Properties,
        }
    }
}

/// Read and parse one file
pub fn read_artifact(path: &Path) -> Result<BTreeMap<String, ConfigValue>, SourceError> {
    let content = std::fs::read_to_string(path).map_err(|source| SourceError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_artifact(path, &content)
}

pub fn parse_artifact(
    path: &Path,
    content: &str,
) -> Result<BTreeMap<String, ConfigValue>, SourceError> {
    match ArtifactFormat::from_path(path) {
        ArtifactFormat::Properties => Ok(parse_properties(content)
            .into_iter()
            .map(|(k, v)| (k, ConfigValue::Text(v)))
            .collect()),
        ArtifactFormat::Json => {
            let value: serde_json::Value =
                serde_json::from_str(content).map_err(|source| SourceError::Json {
                    path: path.to_path_buf(),
                    source,
                })?;
            object_entries(path, value)
        }
        ArtifactFormat::Toml => {
            let value: toml::Value = toml::from_str(content).map_err(|source| SourceError::Toml {
                path: path.to_path_buf(),
                source,
            })?;
            // TOML values serialize infallibly to JSON, except for NaN floats
            let value = serde_json::to_value(value).map_err(|source| SourceError::Json {
                path: path.to_path_buf(),
                source,
            })?;
            object_entries(path, value)
        }
    }
}

fn object_entries(
    path: &Path,
    value: serde_json::Value,
) -> Result<BTreeMap<String, ConfigValue>, SourceError> {
    match value {
        serde_json::Value::Object(map) => Ok(map
            .into_iter()
            .map(|(k, v)| (k, ConfigValue::from_json(v)))
            .collect()),
        _ => Err(SourceError::NotAMap {
            path: path.to_path_buf(),
        }),
    }
}

/// Parse `key=value` / `key: value` lines.
///
/// `#` and `!` start comments. A trailing backslash continues the value on
/// the next line. Later duplicates win.
pub fn parse_properties(content: &str) -> BTreeMap<String, String> {
    let mut entries = BTreeMap::new();
    let mut pending: Option<String> = None;

    for raw in content.lines() {
        let line = match pending.take() {
            Some(mut prev) => {
                prev.push_str(raw.trim_start());
                prev
            }
            None => {
                let trimmed = raw.trim_start();
                if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with('!') {
                    continue;
                }
                trimmed.to_string()
            }
        };

        if let Some(stripped) = line.strip_suffix('\\') {
            pending = Some(stripped.to_string());
            continue;
        }

        if let Some((key, value)) = split_property(&line) {
            entries.insert(key, value);
        }
    }

    if let Some(line) = pending
        && let Some((key, value)) = split_property(&line)
    {
        entries.insert(key, value);
    }

    entries
}

/// Split on the first `=` or `:`, trimming both sides
fn split_property(line: &str) -> Option<(String, String)> {
    let key = split_key(line)?;
    let idx = line.find(['=', ':'])?;
    Some((key.to_string(), line[idx + 1..].trim().to_string()))
}

/// Key of a property line, if it has one
pub(crate) fn split_key(line: &str) -> Option<&str> {
    let idx = line.find(['=', ':'])?;
    let key = line[..idx].trim();
    (!key.is_empty()).then_some(key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_properties_basic() {
        let content = "# run settings\n\
                       environment=preProd\n\
                       customerType : HL\n\
                       ! legacy comment\n\
                       \n\
                       gmailDomain=@example.com\n";
        let entries = parse_properties(content);
        assert_eq!(entries.get("environment").unwrap(), "preProd");
        assert_eq!(entries.get("customerType").unwrap(), "HL");
        assert_eq!(entries.get("gmailDomain").unwrap(), "@example.com");
        assert_eq!(entries.len(), 3);
    }

    #[test]
    fn test_properties_continuation_and_duplicates() {
        let content = "note=first \\\n   second\nkey=a\nkey=b\n";
        let entries = parse_properties(content);
        assert_eq!(entries.get("note").unwrap(), "first second");
        assert_eq!(entries.get("key").unwrap(), "b");
    }

    #[test]
    fn test_properties_value_keeps_separators() {
        let entries = parse_properties("url=https://host:8443/path?a=b\n");
        assert_eq!(entries.get("url").unwrap(), "https://host:8443/path?a=b");
    }

    #[test]
    fn test_json_nested() {
        let content = r#"{
            "flow": "api",
            "retries": 2,
            "projectEnvironments": { "preProd": { "baseUrl": "https://pp" } }
        }"#;
        let entries = parse_artifact(Path::new("std.json"), content).unwrap();
        assert_eq!(entries.get("flow").unwrap().as_text(), Some("api"));
        assert_eq!(entries.get("retries").unwrap().as_text(), Some("2"));
        let envs = entries.get("projectEnvironments").unwrap().as_map().unwrap();
        assert!(envs.contains_key("preProd"));
    }

    #[test]
    fn test_json_must_be_object() {
        let err = parse_artifact(Path::new("list.json"), "[1, 2]").unwrap_err();
        assert!(matches!(err, SourceError::NotAMap { .. }));
    }

    #[test]
    fn test_malformed_json() {
        let err = parse_artifact(Path::new("bad.json"), "{ \"a\": ").unwrap_err();
        assert!(matches!(err, SourceError::Json { .. }));
    }

    #[test]
    fn test_toml_tables() {
        let content = "region = \"south\"\n[projectEnvironments.prod]\nbaseUrl = \"https://prod\"\n";
        let entries = parse_artifact(Path::new("city.toml"), content).unwrap();
        assert_eq!(entries.get("region").unwrap().as_text(), Some("south"));
        assert!(entries.get("projectEnvironments").unwrap().as_map().is_some());
    }
}

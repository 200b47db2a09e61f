//! Filesystem-backed [`ConfigSource`]

use super::locations::LocationCandidates;
use super::parse::read_artifact;
use leadforge_application::{ConfigSource, SourceLoad};
use std::path::PathBuf;
use tracing::{debug, warn};

/// Loads artifacts from the first candidate directory with a parseable copy.
///
/// A malformed copy only disqualifies its own location; later candidates
/// are still tried.
pub struct FileConfigSource {
    locations: LocationCandidates,
}

impl FileConfigSource {
    pub fn new(locations: LocationCandidates) -> Self {
        Self { locations }
    }

    pub fn locations(&self) -> &LocationCandidates {
        &self.locations
    }

    /// Path of the copy [`ConfigSource::load`] reads.
    ///
    /// When no copy parses, the first copy that exists.
    pub fn locate(&self, name: &str) -> Option<PathBuf> {
        let mut first_existing = None;
        for path in self.locations.paths_for(name).filter(|p| p.is_file()) {
            if read_artifact(&path).is_ok() {
                return Some(path);
            }
            first_existing.get_or_insert(path);
        }
        first_existing
    }
}

impl ConfigSource for FileConfigSource {
    fn load(&self, name: &str) -> SourceLoad {
        let mut reasons = Vec::new();

        for path in self.locations.paths_for(name) {
            if !path.is_file() {
                continue;
            }
            match read_artifact(&path) {
                Ok(entries) => {
                    debug!(artifact = name, path = %path.display(), "Artifact loaded");
                    return SourceLoad::Found {
                        entries,
                        origin: path,
                    };
                }
                Err(e) => {
                    warn!(artifact = name, "Skipping unreadable artifact: {}", e);
                    reasons.push(e.to_string());
                }
            }
        }

        if reasons.is_empty() {
            SourceLoad::NotFound
        } else {
            SourceLoad::Unreadable { reasons }
        }
    }

    fn exists(&self, name: &str) -> bool {
        self.locations.paths_for(name).any(|p| p.is_file())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn source(dirs: &[&std::path::Path]) -> FileConfigSource {
        FileConfigSource::new(LocationCandidates::new(
            dirs.iter().map(|d| d.to_path_buf()).collect(),
        ))
    }

    #[test]
    fn test_first_location_wins() {
        let first = tempfile::tempdir().unwrap();
        let second = tempfile::tempdir().unwrap();
        fs::write(first.path().join("city.properties"), "region=first\n").unwrap();
        fs::write(second.path().join("city.properties"), "region=second\n").unwrap();

        let load = source(&[first.path(), second.path()]).load("city.properties");
        match load {
            SourceLoad::Found { entries, origin } => {
                assert_eq!(entries.get("region").unwrap().as_text(), Some("first"));
                assert_eq!(origin, first.path().join("city.properties"));
            }
            other => panic!("unexpected load: {other:?}"),
        }
    }

    #[test]
    fn test_malformed_copy_falls_through() {
        let first = tempfile::tempdir().unwrap();
        let second = tempfile::tempdir().unwrap();
        fs::write(first.path().join("std.json"), "{ broken").unwrap();
        fs::write(second.path().join("std.json"), r#"{"flow": "api"}"#).unwrap();

        let load = source(&[first.path(), second.path()]).load("std.json");
        assert_eq!(load.origin(), Some(&second.path().join("std.json")));
    }

    #[test]
    fn test_locate_matches_loaded_copy() {
        let work = tempfile::tempdir().unwrap();
        let home = tempfile::tempdir().unwrap();
        fs::write(work.path().join("run.json"), "{ broken").unwrap();
        fs::write(home.path().join("run.json"), r#"{"lastProcessedLeadIndex": "7"}"#).unwrap();

        let source = source(&[work.path(), home.path()]);
        let located = source.locate("run.json").unwrap();
        assert_eq!(located, home.path().join("run.json"));
        assert_eq!(source.load("run.json").origin(), Some(&located));
    }

    #[test]
    fn test_locate_falls_back_to_first_existing() {
        let work = tempfile::tempdir().unwrap();
        let home = tempfile::tempdir().unwrap();
        fs::write(work.path().join("run.json"), "{ broken").unwrap();
        fs::write(home.path().join("run.json"), "[]").unwrap();

        let source = source(&[work.path(), home.path()]);
        assert_eq!(source.locate("run.json"), Some(work.path().join("run.json")));
        assert_eq!(source.locate("missing.json"), None);
    }

    #[test]
    fn test_not_found_everywhere() {
        let dir = tempfile::tempdir().unwrap();
        let source = source(&[dir.path()]);
        assert_eq!(source.load("missing.json"), SourceLoad::NotFound);
        assert!(!source.exists("missing.json"));
    }

    #[test]
    fn test_malformed_everywhere_is_unreadable() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("std.json"), "[]").unwrap();

        match source(&[dir.path()]).load("std.json") {
            SourceLoad::Unreadable { reasons } => assert_eq!(reasons.len(), 1),
            other => panic!("unexpected load: {other:?}"),
        }
    }

    #[test]
    fn test_nested_artifact_names() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("cities")).unwrap();
        fs::write(dir.path().join("cities/Bangalore.properties"), "zone=south\n").unwrap();

        let source = source(&[dir.path()]);
        assert!(source.exists("cities/Bangalore.properties"));
        assert!(source.load("cities/Bangalore.properties").found());
    }
}

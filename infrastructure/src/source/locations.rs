//! Ordered candidate directories for configuration artifacts

use crate::config::PathSettings;
use std::path::{Path, PathBuf};

/// Directories searched for an artifact, first match wins
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationCandidates {
    dirs: Vec<PathBuf>,
}

impl LocationCandidates {
    pub fn new(dirs: Vec<PathBuf>) -> Self {
        let mut unique: Vec<PathBuf> = Vec::with_capacity(dirs.len());
        for dir in dirs {
            if !unique.contains(&dir) {
                unique.push(dir);
            }
        }
        Self { dirs: unique }
    }

    /// Standard search order:
    ///
    /// 1. `<cwd>/<config_subdir>`
    /// 2. `<executable dir>/<config_subdir>` (packaged installs)
    /// 3. `<home>/<home_subdir>/<config_subdir>`
    /// 4. `<cwd>/<resources_dir>` (bundled defaults)
    pub fn standard(paths: &PathSettings) -> Self {
        let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        let exe_dir = std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(Path::to_path_buf));
        Self::build(paths, cwd, exe_dir, dirs::home_dir())
    }

    fn build(
        paths: &PathSettings,
        cwd: PathBuf,
        exe_dir: Option<PathBuf>,
        home: Option<PathBuf>,
    ) -> Self {
        let mut dirs = vec![cwd.join(&paths.config_subdir)];
        if let Some(exe_dir) = exe_dir {
            dirs.push(exe_dir.join(&paths.config_subdir));
        }
        if let Some(home) = home {
            dirs.push(home.join(&paths.home_subdir).join(&paths.config_subdir));
        }
        dirs.push(cwd.join(&paths.resources_dir));
        Self::new(dirs)
    }

    pub fn dirs(&self) -> &[PathBuf] {
        &self.dirs
    }

    /// Candidate file paths for `name`, in search order
    pub fn paths_for<'a>(&'a self, name: &'a str) -> impl Iterator<Item = PathBuf> + 'a {
        self.dirs.iter().map(move |dir| dir.join(name))
    }

    /// Where a new artifact would be written
    pub fn primary(&self, name: &str) -> PathBuf {
        self.dirs
            .first()
            .map(|dir| dir.join(name))
            .unwrap_or_else(|| PathBuf::from(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_order() {
        let paths = PathSettings::default();
        let candidates = LocationCandidates::build(
            &paths,
            PathBuf::from("/work"),
            Some(PathBuf::from("/opt/leadforge")),
            Some(PathBuf::from("/home/op")),
        );

        assert_eq!(
            candidates.dirs(),
            &[
                PathBuf::from("/work/configuration"),
                PathBuf::from("/opt/leadforge/configuration"),
                PathBuf::from("/home/op/API-UI/configuration"),
                PathBuf::from("/work/resources"),
            ]
        );
        assert_eq!(
            candidates.primary("run.properties"),
            PathBuf::from("/work/configuration/run.properties")
        );
    }

    #[test]
    fn test_duplicates_removed() {
        let paths = PathSettings::default();
        let candidates = LocationCandidates::build(
            &paths,
            PathBuf::from("/work"),
            Some(PathBuf::from("/work")),
            None,
        );
        assert_eq!(candidates.dirs().len(), 2);
    }
}

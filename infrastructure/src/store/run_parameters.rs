//! Locked, atomic persistence of the run-parameters artifact
//!
//! Only the resume keys are rewritten; every other line, comment and the
//! line order are preserved.

use crate::source::parse_properties;
use leadforge_application::{ResumeCheckpoint, ResumeStore, StoreError};
use leadforge_domain::{epoch, keys};
use std::fs::{File, OpenOptions, TryLockError};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Exclusive handle on the run-parameters artifact for one run.
///
/// The advisory lock lives on a sibling `<name>.lock` file and is released
/// when this value is dropped.
#[derive(Debug)]
pub struct RunParametersFile {
    path: PathBuf,
    lock_path: PathBuf,
    lock: File,
}

impl RunParametersFile {
    /// Take the run lock for `path`; fails fast if another run holds it
    pub fn lock(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let lock_path = lock_path_for(&path);

        if let Some(parent) = lock_path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| io_error(parent, e))?;
        }

        let lock = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&lock_path)
            .map_err(|e| io_error(&lock_path, e))?;

        match lock.try_lock() {
            Ok(()) => {}
            Err(TryLockError::WouldBlock) => {
                return Err(StoreError::Locked(lock_path.display().to_string()));
            }
            Err(TryLockError::Error(e)) => return Err(io_error(&lock_path, e)),
        }

        debug!(path = %path.display(), "Run lock acquired");
        Ok(Self {
            path,
            lock_path,
            lock,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn lock_path(&self) -> &Path {
        &self.lock_path
    }

    /// Current values in the artifact (empty when it does not exist yet)
    pub fn read(&self) -> Result<std::collections::BTreeMap<String, String>, StoreError> {
        Ok(parse_properties(&self.read_content()?))
    }

    fn read_content(&self) -> Result<String, StoreError> {
        match std::fs::read_to_string(&self.path) {
            Ok(content) => Ok(content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(String::new()),
            Err(e) => Err(io_error(&self.path, e)),
        }
    }

    fn write_atomic(&self, content: &str) -> Result<(), StoreError> {
        let file_name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "run-parameters".to_string());
        let tmp_path = self.path.with_file_name(format!(".{file_name}.tmp"));

        let mut tmp = File::create(&tmp_path).map_err(|e| io_error(&tmp_path, e))?;
        tmp.write_all(content.as_bytes())
            .and_then(|_| tmp.sync_all())
            .map_err(|e| io_error(&tmp_path, e))?;
        drop(tmp);

        std::fs::rename(&tmp_path, &self.path).map_err(|e| {
            let _ = std::fs::remove_file(&tmp_path);
            io_error(&self.path, e)
        })
    }
}

impl ResumeStore for RunParametersFile {
    fn persist(&self, checkpoint: &ResumeCheckpoint) -> Result<(), StoreError> {
        let content = self.read_content()?;
        let updated = update_properties(
            &content,
            &[
                (
                    keys::LAST_PROCESSED_INDEX,
                    checkpoint.last_processed_index.to_string(),
                ),
                (keys::RUN_DATE, epoch::format_run_date(checkpoint.run_date)),
            ],
        );
        self.write_atomic(&updated)?;
        debug!(
            path = %self.path.display(),
            last_processed = checkpoint.last_processed_index,
            "Resume position written"
        );
        Ok(())
    }
}

impl Drop for RunParametersFile {
    fn drop(&mut self) {
        let _ = self.lock.unlock();
    }
}

fn lock_path_for(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!("{name}.lock"))
}

fn io_error(path: &Path, e: std::io::Error) -> StoreError {
    if e.kind() == std::io::ErrorKind::NotFound {
        StoreError::NotFound(path.display().to_string())
    } else {
        StoreError::Io(format!("{}: {}", path.display(), e))
    }
}

/// Replace the values of `updates` in properties text, appending keys that
/// were not present
fn update_properties(content: &str, updates: &[(&str, String)]) -> String {
    let mut seen = vec![false; updates.len()];
    let mut out = String::with_capacity(content.len() + 64);

    for line in content.lines() {
        let trimmed = line.trim_start();
        let is_comment = trimmed.starts_with('#') || trimmed.starts_with('!');
        let key = (!is_comment)
            .then(|| crate::source::split_key(trimmed))
            .flatten();

        match key.and_then(|k| updates.iter().position(|(u, _)| *u == k)) {
            Some(i) => {
                let (k, v) = &updates[i];
                if !seen[i] {
                    out.push_str(&format!("{k}={v}"));
                    out.push('\n');
                }
                seen[i] = true;
            }
            None => {
                out.push_str(line);
                out.push('\n');
            }
        }
    }

    for ((k, v), seen) in updates.iter().zip(seen) {
        if !seen {
            out.push_str(&format!("{k}={v}\n"));
        }
    }
    out
}

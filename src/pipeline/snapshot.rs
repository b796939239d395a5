//! Backups taken before files are rewritten in place.

use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::foundation::error::{ForgeError, ForgeResult};

/// Snapshot-and-restore service for a group of files.
pub trait Snapshot {
    /// Capture `files`; returns the location of the snapshot.
    fn snapshot(&self, files: &[PathBuf]) -> ForgeResult<PathBuf>;

    /// Copy every file of `snapshot` into `dest`, returning the restored paths.
    fn restore(&self, snapshot: &Path, dest: &Path) -> ForgeResult<Vec<PathBuf>>;
}

/// Copies files into a timestamped sibling directory `<label>.<YYYYMMDD-HHMMSS>.backup`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DirectorySnapshot {
    root: PathBuf,
    label: String,
}

impl DirectorySnapshot {
    pub fn new(root: impl Into<PathBuf>, label: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            label: label.into(),
        }
    }

    fn fresh_dir(&self) -> PathBuf {
        let stamp = chrono::Local::now().format("%Y%m%d-%H%M%S");
        let mut dir = self.root.join(format!("{}.{stamp}.backup", self.label));
        let mut n = 1;
        while dir.exists() {
            dir = self.root.join(format!("{}.{stamp}-{n}.backup", self.label));
            n += 1;
        }
        dir
    }
}

impl Snapshot for DirectorySnapshot {
    fn snapshot(&self, files: &[PathBuf]) -> ForgeResult<PathBuf> {
        if files.is_empty() {
            return Err(ForgeError::insufficient_data("no files to back up"));
        }
        let dir = self.fresh_dir();
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("create backup dir '{}'", dir.display()))?;
        for file in files {
            let name = file.file_name().ok_or_else(|| {
                ForgeError::invalid_parameter(format!("'{}' has no file name", file.display()))
            })?;
            std::fs::copy(file, dir.join(name))
                .with_context(|| format!("back up '{}'", file.display()))?;
        }
        tracing::info!(dir = %dir.display(), files = files.len(), "created backup");
        Ok(dir)
    }

    fn restore(&self, snapshot: &Path, dest: &Path) -> ForgeResult<Vec<PathBuf>> {
        let entries = std::fs::read_dir(snapshot)
            .with_context(|| format!("read backup '{}'", snapshot.display()))?;
        let mut restored = Vec::new();
        for entry in entries {
            let entry = entry.with_context(|| format!("read backup '{}'", snapshot.display()))?;
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            let target = dest.join(entry.file_name());
            std::fs::copy(&path, &target)
                .with_context(|| format!("restore '{}'", target.display()))?;
            restored.push(target);
        }
        restored.sort();
        tracing::info!(from = %snapshot.display(), files = restored.len(), "restored backup");
        Ok(restored)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/pipeline/snapshot.rs"]
mod tests;

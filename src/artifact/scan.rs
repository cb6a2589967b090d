//! Recursive discovery of eligible artifacts under a scan root.

use std::path::{Path, PathBuf};

use glob::{Pattern, glob};
use log::{debug, warn};

use super::{Artifact, ArtifactKind};
use crate::error::{RescueError, Result};

/// Directory names never descended into.
pub const RESERVED_DIRS: &[&str] = &[
    ".bugrescue_backups",
    ".bugrescue_fixes",
    ".git",
    ".hg",
    ".svn",
    "node_modules",
    "__pycache__",
    ".venv",
    "venv",
    "target",
];

/// Scanner with the reserved set plus any configured extras.
#[derive(Debug, Clone)]
pub struct Scanner {
    excluded: Vec<String>,
}

impl Default for Scanner {
    fn default() -> Self {
        Self::new(&[])
    }
}

impl Scanner {
    pub fn new(extra_excluded: &[String]) -> Self {
        let mut excluded: Vec<String> = RESERVED_DIRS.iter().map(|d| d.to_string()).collect();
        excluded.extend(extra_excluded.iter().cloned());
        Self { excluded }
    }

    /// Also exclude the directory names of the configured backup and staging stores.
    pub fn excluding_stores(mut self, backup_dir: &Path, staging_dir: &Path) -> Self {
        for dir in [backup_dir, staging_dir] {
            if let Some(name) = dir.file_name().and_then(|n| n.to_str()) {
                if !self.excluded.iter().any(|e| e == name) {
                    self.excluded.push(name.to_string());
                }
            }
        }
        self
    }

    /// Enumerate artifacts under `root`, sorted by path.
    ///
    /// Only an unreadable root is an error; unreadable entries below it are skipped.
    pub fn scan(&self, root: &Path) -> Result<Vec<Artifact>> {
        if !root.is_dir() {
            return Err(RescueError::Scan(format!("{} is not a readable directory", root.display())));
        }
        std::fs::read_dir(root).map_err(|e| RescueError::Scan(format!("{}: {}", root.display(), e)))?;

        let pattern = format!("{}/**/*", Pattern::escape(&root.to_string_lossy()));
        let entries = glob(&pattern).map_err(|e| RescueError::Scan(format!("bad scan pattern: {}", e)))?;

        let mut artifacts = Vec::new();
        for entry in entries {
            let path = match entry {
                Ok(path) => path,
                Err(e) => {
                    warn!("Skipping unreadable entry: {}", e);
                    continue;
                }
            };

            if !path.is_file() || self.is_excluded(root, &path) {
                continue;
            }

            let kind = ArtifactKind::from_path(&path);
            if kind.is_supported() {
                debug!("Discovered {} artifact: {}", kind, path.display());
                artifacts.push(Artifact::new(path, kind));
            }
        }

        artifacts.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(artifacts)
    }

    fn is_excluded(&self, root: &Path, path: &Path) -> bool {
        let relative: PathBuf = path.strip_prefix(root).map(Path::to_path_buf).unwrap_or_else(|_| path.to_path_buf());
        relative
            .parent()
            .map(|parent| {
                parent.components().any(|c| {
                    let name = c.as_os_str().to_string_lossy();
                    self.excluded.iter().any(|e| *e == name)
                })
            })
            .unwrap_or(false)
    }
}

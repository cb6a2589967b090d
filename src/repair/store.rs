//! Backup and staging stores.
//!
//! Backups hold pristine originals, one run directory per invocation.
//! Staging holds the latest accepted candidate per artifact. Both are flat:
//! same-named files from different directories collide.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use log::debug;

use crate::artifact::file_name_of;

/// Pristine copies taken before the first patch request.
#[derive(Debug, Clone)]
pub struct BackupStore {
    run_dir: PathBuf,
}

impl BackupStore {
    /// `<backup_dir>/<YYYYmmdd_HHMMSS>_backup`; nothing is created until the first backup.
    pub fn new(backup_dir: &Path, started_at: DateTime<Local>) -> Self {
        Self {
            run_dir: backup_dir.join(format!("{}_backup", started_at.format("%Y%m%d_%H%M%S"))),
        }
    }

    pub fn run_dir(&self) -> &Path {
        &self.run_dir
    }

    /// Copy `source` to `<run_dir>/<name>.bak`.
    pub fn backup(&self, source: &Path) -> io::Result<PathBuf> {
        fs::create_dir_all(&self.run_dir)?;
        let target = self.run_dir.join(format!("{}.bak", file_name_of(source)));
        fs::copy(source, &target)?;
        debug!("Backed up {} to {}", source.display(), target.display());
        Ok(target)
    }
}

/// Accepted candidates, never written over the original source.
#[derive(Debug, Clone)]
pub struct StagingStore {
    dir: PathBuf,
}

impl StagingStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Write `candidate` to `<dir>/<basename of original>`, replacing any earlier candidate.
    pub fn stage(&self, original: &Path, candidate: &str) -> io::Result<PathBuf> {
        fs::create_dir_all(&self.dir)?;
        let target = self.dir.join(file_name_of(original));
        fs::write(&target, candidate)?;
        debug!("Staged candidate for {} at {}", original.display(), target.display());
        Ok(target)
    }
}

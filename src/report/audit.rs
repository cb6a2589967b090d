//! JSON Lines audit log of every patch request.

use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use log::debug;

use crate::error::Result;
use crate::repair::RepairAttempt;

/// Append-only JSONL file, one RepairAttempt per line.
#[derive(Debug, Clone)]
pub struct AuditLog {
    path: PathBuf,
}

impl AuditLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append `attempts`. Nothing is created when there is nothing to write.
    pub fn append(&self, attempts: &[RepairAttempt]) -> Result<usize> {
        if attempts.is_empty() {
            return Ok(0);
        }
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        for attempt in attempts {
            writeln!(file, "{}", serde_json::to_string(attempt)?)?;
        }
        debug!("Wrote {} audit record(s) to {}", attempts.len(), self.path.display());
        Ok(attempts.len())
    }

    /// Read every record back, skipping blank lines.
    pub fn read_all(&self) -> Result<Vec<RepairAttempt>> {
        let reader = BufReader::new(File::open(&self.path)?);
        let mut records = Vec::new();
        for line in reader.lines() {
            let line = line?;
            if !line.trim().is_empty() {
                records.push(serde_json::from_str(&line)?);
            }
        }
        Ok(records)
    }
}

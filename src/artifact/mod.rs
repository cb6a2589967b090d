//! Artifacts: the source files BugRescue executes and repairs.

pub mod kind;
pub mod scan;

pub use kind::{ArtifactKind, Handler};
pub use scan::{RESERVED_DIRS, Scanner};

use std::path::{Path, PathBuf};

/// One eligible source file under the scan root. Identity is its path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub path: PathBuf,
    pub kind: ArtifactKind,
}

impl Artifact {
    pub fn new(path: impl Into<PathBuf>, kind: ArtifactKind) -> Self {
        Self {
            path: path.into(),
            kind,
        }
    }

    /// Build an artifact, detecting the kind from the path.
    pub fn detect(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let kind = ArtifactKind::from_path(&path);
        Self { path, kind }
    }

    pub fn file_name(&self) -> String {
        file_name_of(&self.path)
    }
}

/// Base file name of a path, or the whole path when it has none.
pub(crate) fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

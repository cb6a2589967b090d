//! Static inspection for declarative and markup artifacts.
//!
//! These checks are heuristic text matches, not a policy engine. A pass means
//! no rule matched, nothing more.

use std::path::Path;

use log::debug;

use crate::artifact::ArtifactKind;
use crate::runner::ExecutionResult;

/// Diagnostic reported when the credential rule matches.
pub const HARDCODED_SECRET: &str = "Hardcoded Secret Detected";

/// A textual check: fails when every needle occurs somewhere in the file.
#[derive(Debug, Clone, Copy)]
pub struct Check {
    pub needles: &'static [&'static str],
    pub diagnostic: &'static str,
}

impl Check {
    pub fn matches(&self, content: &str) -> bool {
        self.needles.iter().all(|needle| content.contains(needle))
    }
}

/// Requires a `password:` token and a `Secret` token in the same file.
const SECRET_CHECK: Check = Check {
    needles: &["password:", "Secret"],
    diagnostic: HARDCODED_SECRET,
};

const DECLARATIVE_CHECKS: &[Check] = &[SECRET_CHECK];

/// Pattern-based gate for kinds that are never executed.
#[derive(Debug, Clone, Default)]
pub struct StaticInspector;

impl StaticInspector {
    pub fn new() -> Self {
        Self
    }

    /// Checks applied to a kind.
    pub fn checks_for(&self, kind: ArtifactKind) -> &'static [Check] {
        match kind {
            ArtifactKind::Yaml | ArtifactKind::Dockerfile | ArtifactKind::Html => DECLARATIVE_CHECKS,
            _ => &[],
        }
    }

    /// Inspect `path` as an artifact of `kind`. Never spawns a process.
    pub async fn inspect(&self, kind: ArtifactKind, path: &Path) -> ExecutionResult {
        let content = match tokio::fs::read_to_string(path).await {
            Ok(content) => content,
            Err(e) => {
                return ExecutionResult::internal_error(format!("Failed to read {}: {}", path.display(), e));
            }
        };

        self.inspect_content(kind, &content)
    }

    pub fn inspect_content(&self, kind: ArtifactKind, content: &str) -> ExecutionResult {
        let failed: Vec<&str> = self
            .checks_for(kind)
            .iter()
            .filter(|check| check.matches(content))
            .map(|check| check.diagnostic)
            .collect();

        if failed.is_empty() {
            ExecutionResult::success("Valid", "")
        } else {
            debug!("Static checks failed for {} content: {:?}", kind, failed);
            ExecutionResult::failure(Some(1), "", failed.join("\n"))
        }
    }
}

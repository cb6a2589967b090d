//! Artifact kinds and their execution handlers.
//!
//! Detection is purely by file name: extension, or the exact name for
//! `Dockerfile`. Contents are never sniffed.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::config::Programs;

/// Every kind of artifact BugRescue knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    Python,
    JavaScript,
    Go,
    Ruby,
    Php,
    Shell,
    Java,
    Rust,
    Cpp,
    Yaml,
    Dockerfile,
    Html,
    /// Not on the allow-list; never executed
    Unsupported,
}

/// How an artifact of a given kind gets executed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Handler {
    /// Run the interpreter directly on the source path
    Interpret { program: String, args: Vec<String> },
    /// Compile to a sibling binary, then run the binary
    Compile { compiler: String, label: &'static str },
    /// Pattern checks only, no process
    Inspect,
    Unsupported,
}

impl ArtifactKind {
    /// Detect the kind from a path. Returns `Unsupported` for anything off the allow-list.
    pub fn from_path(path: &Path) -> Self {
        if path.file_name().and_then(|n| n.to_str()) == Some("Dockerfile") {
            return ArtifactKind::Dockerfile;
        }

        match path.extension().and_then(|e| e.to_str()) {
            Some("py") => ArtifactKind::Python,
            Some("js") => ArtifactKind::JavaScript,
            Some("go") => ArtifactKind::Go,
            Some("rb") => ArtifactKind::Ruby,
            Some("php") => ArtifactKind::Php,
            Some("sh") => ArtifactKind::Shell,
            Some("java") => ArtifactKind::Java,
            Some("rs") => ArtifactKind::Rust,
            Some("cpp") => ArtifactKind::Cpp,
            Some("yaml") | Some("yml") => ArtifactKind::Yaml,
            Some("html") => ArtifactKind::Html,
            _ => ArtifactKind::Unsupported,
        }
    }

    /// Whether scanning should pick this kind up.
    pub fn is_supported(&self) -> bool {
        !matches!(self, ArtifactKind::Unsupported)
    }

    /// Resolve the handler for this kind against the configured executables.
    pub fn handler(&self, programs: &Programs) -> Handler {
        let interpret = |program: &str, args: &[&str]| Handler::Interpret {
            program: program.to_string(),
            args: args.iter().map(|a| a.to_string()).collect(),
        };

        match self {
            ArtifactKind::Python => interpret(&programs.python, &["-u"]),
            ArtifactKind::JavaScript => interpret(&programs.node, &[]),
            ArtifactKind::Go => interpret(&programs.go, &["run"]),
            ArtifactKind::Ruby => interpret(&programs.ruby, &[]),
            ArtifactKind::Php => interpret(&programs.php, &[]),
            ArtifactKind::Shell => interpret(&programs.shell, &[]),
            ArtifactKind::Java => interpret(&programs.java, &[]),
            ArtifactKind::Rust => Handler::Compile {
                compiler: programs.rustc.clone(),
                label: "Rust",
            },
            ArtifactKind::Cpp => Handler::Compile {
                compiler: programs.cxx.clone(),
                label: "C++",
            },
            ArtifactKind::Yaml | ArtifactKind::Dockerfile | ArtifactKind::Html => Handler::Inspect,
            ArtifactKind::Unsupported => Handler::Unsupported,
        }
    }

    /// Short lowercase language name, as shown in logs.
    pub fn language_hint(&self) -> &'static str {
        match self {
            ArtifactKind::Python => "python",
            ArtifactKind::JavaScript => "javascript",
            ArtifactKind::Go => "go",
            ArtifactKind::Ruby => "ruby",
            ArtifactKind::Php => "php",
            ArtifactKind::Shell => "sh",
            ArtifactKind::Java => "java",
            ArtifactKind::Rust => "rust",
            ArtifactKind::Cpp => "cpp",
            ArtifactKind::Yaml => "yaml",
            ArtifactKind::Dockerfile => "dockerfile",
            ArtifactKind::Html => "html",
            ArtifactKind::Unsupported => "",
        }
    }
}

impl std::fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ArtifactKind::Unsupported => "unsupported",
            other => other.language_hint(),
        };
        write!(f, "{}", name)
    }
}

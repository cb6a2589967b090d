//! CLI definition using clap.
//!
//! Every flag is optional and, when given, overrides the matching config
//! file value.

use clap::Parser;
use std::path::PathBuf;

use bugrescue::config::Config;
use bugrescue::llm::{BackendOverrides, Provider};

/// BugRescue - run every file, ask an AI to patch the failures, verify the patch
#[derive(Parser, Debug)]
#[command(name = "bugrescue")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Directory to scan
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Execute and classify only: no backups, no AI calls, no staging
    #[arg(long)]
    pub dry_run: bool,

    /// AI provider
    #[arg(short, long, value_enum)]
    pub provider: Option<Provider>,

    /// Model identifier (defaults per provider)
    #[arg(short, long)]
    pub model: Option<String>,

    /// Base URL of the provider API
    #[arg(long)]
    pub endpoint: Option<String>,

    /// Credential; otherwise read from <PROVIDER>_API_KEY
    #[arg(long)]
    pub api_key: Option<String>,

    /// Per-execution wall-clock limit in milliseconds
    #[arg(long)]
    pub timeout_ms: Option<u64>,

    /// Execution attempts per file, including the first
    #[arg(long)]
    pub max_attempts: Option<u32>,

    /// Where to write the HTML report
    #[arg(long)]
    pub report: Option<PathBuf>,

    /// Optional config file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Check if verbose mode is enabled
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    /// Fold the non-backend flags into `config`.
    pub fn apply(&self, config: &mut Config) {
        if self.dry_run {
            config.repair.dry_run = true;
        }
        if let Some(ms) = self.timeout_ms {
            config.runner.timeout_ms = ms;
        }
        if let Some(n) = self.max_attempts {
            config.repair.max_attempts = n.max(1);
        }
        if let Some(report) = &self.report {
            config.report.path = report.clone();
        }
    }

    pub fn backend_overrides(&self) -> BackendOverrides {
        BackendOverrides {
            provider: self.provider,
            endpoint: self.endpoint.clone(),
            model: self.model.clone(),
            api_key: self.api_key.clone(),
        }
    }
}

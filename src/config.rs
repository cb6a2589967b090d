use log::{LevelFilter, info, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{RescueError, Result};
use crate::llm::Provider;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub log_level: Option<String>,
    pub backend: BackendSettings,
    pub runner: RunnerSettings,
    pub repair: RepairSettings,
    pub scan: ScanSettings,
    pub report: ReportSettings,
}

/// Raw backend settings as written in the config file; resolved into a
/// [`crate::llm::BackendConfig`] once at startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendSettings {
    pub provider: Provider,
    pub endpoint: Option<String>,
    pub model: Option<String>,
    pub api_key: Option<String>,
    pub temperature: f32,
    pub max_tokens: u32,
    pub request_timeout_ms: u64,
    pub max_retries: u32,
    pub backoff_base_ms: u64,
}

impl Default for BackendSettings {
    fn default() -> Self {
        Self {
            provider: Provider::Ollama,
            endpoint: None,
            model: None,
            api_key: None,
            temperature: 0.2,
            max_tokens: 4096,
            request_timeout_ms: 120_000,
            max_retries: 3,
            backoff_base_ms: 1000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerSettings {
    pub timeout_ms: u64,
    pub compile_timeout_ms: u64,
    pub programs: Programs,
}

impl Default for RunnerSettings {
    fn default() -> Self {
        Self {
            timeout_ms: 10_000,
            compile_timeout_ms: 60_000,
            programs: Programs::default(),
        }
    }
}

/// Executable used for each toolchain. Bare names are looked up on PATH.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Programs {
    pub python: String,
    pub node: String,
    pub go: String,
    pub ruby: String,
    pub php: String,
    pub shell: String,
    pub java: String,
    pub rustc: String,
    pub cxx: String,
}

impl Default for Programs {
    fn default() -> Self {
        Self {
            python: "python3".to_string(),
            node: "node".to_string(),
            go: "go".to_string(),
            ruby: "ruby".to_string(),
            php: "php".to_string(),
            shell: "sh".to_string(),
            java: "java".to_string(),
            rustc: "rustc".to_string(),
            cxx: "g++".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RepairSettings {
    pub max_attempts: u32,
    pub min_patch_chars: usize,
    pub diagnostic_tail_chars: usize,
    pub report_diagnostic_chars: usize,
    pub backup_dir: PathBuf,
    pub staging_dir: PathBuf,
    pub dry_run: bool,
}

impl Default for RepairSettings {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            min_patch_chars: 10,
            diagnostic_tail_chars: 1500,
            report_diagnostic_chars: 120,
            backup_dir: PathBuf::from(".bugrescue_backups"),
            staging_dir: PathBuf::from(".bugrescue_fixes"),
            dry_run: false,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanSettings {
    pub extra_excluded_dirs: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportSettings {
    pub path: PathBuf,
    pub audit_log: bool,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            path: PathBuf::from("bugrescue_report.html"),
            audit_log: true,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: Some("info".to_string()),
            backend: BackendSettings::default(),
            runner: RunnerSettings::default(),
            repair: RepairSettings::default(),
            scan: ScanSettings::default(),
            report: ReportSettings::default(),
        }
    }
}

impl Config {
    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        // An explicit path must load; the implicit locations are best-effort
        if let Some(path) = config_path {
            return Self::load_from_file(path)
                .map_err(|e| RescueError::Config(format!("Failed to load config from {}: {}", path.display(), e)));
        }

        // Try primary location: ~/.config/<project>/<project>.yml
        if let Some(config_dir) = dirs::config_dir() {
            let project_name = env!("CARGO_PKG_NAME");
            let primary_config = config_dir.join(project_name).join(format!("{}.yml", project_name));
            if primary_config.exists() {
                match Self::load_from_file(&primary_config) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        warn!("Failed to load config from {}: {}", primary_config.display(), e);
                    }
                }
            }
        }

        // Try fallback location: ./<project>.yml
        let project_name = env!("CARGO_PKG_NAME");
        let fallback_config = PathBuf::from(format!("{}.yml", project_name));
        if fallback_config.exists() {
            match Self::load_from_file(&fallback_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    warn!("Failed to load config from {}: {}", fallback_config.display(), e);
                }
            }
        }

        info!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// The configured `log_level`, if it names a level.
    pub fn log_filter(&self) -> Option<LevelFilter> {
        let level = self.log_level.as_deref()?;
        match level.trim().parse::<LevelFilter>() {
            Ok(filter) => Some(filter),
            Err(_) => {
                warn!("Ignoring unknown log_level '{}'", level);
                None
            }
        }
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path)?;
        let config: Self = serde_yaml::from_str(&content)?;

        info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }
}

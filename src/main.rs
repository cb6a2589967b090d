use clap::Parser;
use colored::*;
use eyre::{Context, Result};
use log::{LevelFilter, info, warn};
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use bugrescue::artifact::Scanner;
use bugrescue::config::Config;
use bugrescue::llm::{BackendConfig, PromptBuilder, create_patch_client};
use bugrescue::repair::{OutcomeStatus, RepairConfig, RepairOrchestrator, RunSummary};
use bugrescue::report::write_report;
use bugrescue::runner::{ToolchainConfig, ToolchainRunner};

mod cli;

use cli::Cli;

/// RUST_LOG wins over the configured level when set.
fn env_filter_set() -> bool {
    std::env::var_os(env_logger::DEFAULT_FILTER_ENV).is_some()
}

fn setup_logging() -> Result<()> {
    // Create log directory
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("bugrescue")
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    let log_file = log_dir.join("bugrescue.log");

    // Setup env_logger with file output
    let target = Box::new(
        fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_file)
            .context("Failed to open log file")?,
    );

    // Without RUST_LOG the global max level does the filtering, so the config
    // file can still change it after loading
    let mut builder = env_logger::Builder::new();
    builder.target(env_logger::Target::Pipe(target));
    if env_filter_set() {
        builder.parse_env(env_logger::Env::default());
    } else {
        builder.filter_level(LevelFilter::Trace);
    }
    builder.init();
    if !env_filter_set() {
        log::set_max_level(LevelFilter::Info);
    }

    info!("Logging initialized, writing to: {}", log_file.display());
    Ok(())
}

fn print_summary(summary: &RunSummary, report: Option<&PathBuf>) {
    println!();
    if summary.cancelled {
        println!(
            "{} {} file(s) not processed",
            "⚠ Run cancelled:".yellow(),
            summary.not_processed.len()
        );
    } else {
        println!("{}", "✔ Rescue complete!".green());
    }
    println!(
        "   {} passed, {} failed, {} skipped, {} total",
        summary.passed().to_string().green(),
        summary.failed().to_string().red(),
        summary.skipped().to_string().yellow(),
        summary.total()
    );
    if let Some(path) = report {
        println!("📊 Report: {}", path.display().to_string().blue());
    }
}

async fn run_application(cli: &Cli, config: &Config) -> Result<i32> {
    info!("Starting application");

    if cli.is_verbose() {
        println!("{}", "Verbose mode enabled".yellow());
    }

    let scanner = Scanner::new(&config.scan.extra_excluded_dirs)
        .excluding_stores(&config.repair.backup_dir, &config.repair.staging_dir);
    let artifacts = scanner
        .scan(&cli.path)
        .with_context(|| format!("Failed to scan {}", cli.path.display()))?;

    if artifacts.is_empty() {
        println!("{} {}", "No eligible files found under".yellow(), cli.path.display());
        return Ok(0);
    }

    let backend = BackendConfig::resolve(&config.backend, &cli.backend_overrides());
    let prompt = PromptBuilder::new(config.repair.diagnostic_tail_chars);
    let client = create_patch_client(&backend, prompt).context("Failed to create AI client")?;

    println!(
        "{} {} artifact(s) with {} ({}){}",
        "🚀 BugRescue launching on".yellow(),
        artifacts.len(),
        backend.provider,
        backend.model,
        if config.repair.dry_run { " [dry run]" } else { "" }
    );

    let cancel = CancellationToken::new();
    let ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, cancelling run");
            ctrl_c.cancel();
        }
    });

    let runner = ToolchainRunner::new(ToolchainConfig::from(&config.runner));
    let mut orchestrator = RepairOrchestrator::new(
        Arc::new(runner),
        Arc::new(client),
        RepairConfig::from(&config.repair),
        cancel,
    );
    if config.report.audit_log {
        orchestrator = orchestrator.with_audit_log();
    }

    let summary = orchestrator.run(artifacts).await;

    for entry in summary.entries.iter().filter(|e| e.status == OutcomeStatus::Failed) {
        println!("{} {}", "✘ Failed:".red(), entry.file);
        if cli.is_verbose() && !entry.diagnostic.is_empty() {
            println!("    {}", entry.diagnostic.dimmed());
        }
    }

    if config.report.audit_log && !summary.attempts.is_empty() {
        info!("Audit log: {}", orchestrator.audit_path().display());
    }

    write_report(&summary, &config.report.path).context("Failed to write report")?;
    print_summary(&summary, Some(&config.report.path));

    Ok(summary.exit_code())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Setup logging first
    setup_logging().context("Failed to setup logging")?;

    // Parse CLI arguments
    let cli = Cli::parse();

    // Load configuration
    let mut config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;
    cli.apply(&mut config);
    if let Some(level) = config.log_filter().filter(|_| !env_filter_set()) {
        log::set_max_level(level);
    }

    info!("Starting with config from: {:?}", cli.config);

    let code = run_application(&cli, &config).await.context("Application failed")?;

    std::process::exit(code);
}

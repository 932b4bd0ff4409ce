//! lwdump - dump game assets from the Lost Word content servers
//!
//! Performs the API handshake, asks for the current content paths, then
//! mirrors each category's manifest and assets into the dump directory.

mod cli;
mod dump;
mod error;
mod logging;

use crate::cli::Cli;
use crate::dump::{run_dump, DumpSummary};
use crate::error::CliError;
use clap::Parser;
use lwdump_config::Config;
use lwdump_events::EventReceiver;
use lwdump_net::CancellationToken;
use lwdump_types::FailurePolicy;
use std::io::Write;
use std::path::Path;
use std::process;
use tokio::select;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let json_mode = cli.global.json;

    if let Err(e) = run(cli).await {
        error!("Application error: {}", e);
        if !json_mode {
            eprintln!("Error: {e}");
        }
        process::exit(1);
    }
}

/// Main application logic
async fn run(cli: Cli) -> Result<(), CliError> {
    // 1. Start with file config (or defaults)
    let mut config = Config::load_or_default(&cli.global.config).await?;

    // 2. Merge environment variables
    config.merge_env()?;

    // 3. Apply CLI flags (highest precedence)
    apply_cli_config(&mut config, &cli)?;
    config.validate()?;

    init_tracing(cli.global.json, cli.global.debug, &config.general.dump_dir);
    info!("Starting lwdump v{}", env!("CARGO_PKG_VERSION"));

    let (event_sender, event_receiver) = lwdump_events::channel();

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, stopping downloads");
            on_interrupt.cancel();
        }
    });

    let dump = run_dump(&config, event_sender, cancel);
    let summary = execute_with_events(dump, event_receiver).await?;

    render_summary(&summary, cli.global.json)?;

    if summary.is_success() {
        info!("Dump completed successfully");
        Ok(())
    } else {
        Err(CliError::Incomplete {
            failed_categories: summary.failed_categories(),
            failed_assets: summary.failed_assets(),
        })
    }
}

/// Drive the dump while logging events as they arrive
async fn execute_with_events(
    dump: impl std::future::Future<Output = Result<DumpSummary, lwdump_errors::Error>>,
    mut event_receiver: EventReceiver,
) -> Result<DumpSummary, CliError> {
    let mut dump = Box::pin(dump);

    loop {
        select! {
            result = &mut dump => {
                // Drain any remaining events
                while let Ok(event) = event_receiver.try_recv() {
                    logging::log_event_with_tracing(&event);
                }
                return result.map_err(CliError::from);
            }

            event = event_receiver.recv() => {
                if let Some(event) = event {
                    logging::log_event_with_tracing(&event);
                }
            }
        }
    }
}

fn render_summary(summary: &DumpSummary, json: bool) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();

    if json {
        let text = serde_json::to_string_pretty(summary)
            .map_err(|e| CliError::Dump(lwdump_errors::Error::from(e)))?;
        writeln!(stdout, "{text}")?;
        return Ok(());
    }

    writeln!(
        stdout,
        "Content version {} dumped to {}",
        summary.version,
        summary.dump_dir.display()
    )?;
    for category in &summary.categories {
        match &category.error {
            Some(error) => writeln!(stdout, "  {:<12} failed: {error}", category.category)?,
            None => writeln!(
                stdout,
                "  {:<12} {}/{} assets, {} bytes",
                category.category, category.downloaded, category.assets, category.bytes
            )?,
        }
        for asset in &category.failed_assets {
            writeln!(stdout, "    failed: {asset}")?;
        }
    }

    Ok(())
}

/// Apply CLI configuration overrides (highest precedence)
fn apply_cli_config(config: &mut Config, cli: &Cli) -> Result<(), CliError> {
    if let Some(dump_dir) = &cli.dump_dir {
        config.general.dump_dir.clone_from(dump_dir);
    }

    if let Some(limit) = cli.max_concurrent {
        if limit == 0 {
            return Err(CliError::InvalidArguments(
                "--max-concurrent must be at least 1".to_string(),
            ));
        }
        config.download.max_concurrent = limit;
    }

    if !cli.categories.is_empty() {
        config.download.categories.clone_from(&cli.categories);
    }

    if cli.fail_fast {
        config.download.failure_policy = FailurePolicy::Abort;
    }

    Ok(())
}

/// Initialize tracing/logging
fn init_tracing(json_mode: bool, debug_enabled: bool, dump_dir: &Path) {
    let filter = |default: &str| {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default))
    };

    if json_mode {
        tracing_subscriber::fmt()
            .json()
            .with_writer(std::io::stdout)
            .with_env_filter(filter(if debug_enabled { "debug" } else { "info" }))
            .init();
    } else if debug_enabled {
        // Debug mode: structured JSON logs to file
        let log_dir = dump_dir.join("logs");
        if let Err(e) = std::fs::create_dir_all(&log_dir) {
            eprintln!("Warning: Failed to create log directory: {e}");
        }

        let log_file = log_dir.join(format!(
            "lwdump-{}.log",
            chrono::Utc::now().format("%Y%m%d-%H%M%S")
        ));

        match std::fs::File::create(&log_file) {
            Ok(file) => {
                tracing_subscriber::fmt()
                    .json()
                    .with_writer(file)
                    .with_env_filter(filter("debug"))
                    .init();

                eprintln!("Debug logging enabled: {}", log_file.display());
            }
            Err(e) => {
                eprintln!("Warning: Failed to create log file: {e}");
                tracing_subscriber::fmt()
                    .with_env_filter(filter("debug"))
                    .init();
            }
        }
    } else {
        // Normal mode: progress lines on stderr
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_env_filter(filter("info"))
            .init();
    }
}

//! bubz2 - Incremental bzip2 mirror for game server fast downloads
//!
//! This is the CLI application: it merges configuration, runs the sync
//! operation from the ops crate and prints its events and report.

mod cli;
mod display;
mod error;
mod events;
mod logging;

use crate::cli::Cli;
use crate::display::OutputRenderer;
use crate::error::CliError;
use crate::events::EventHandler;
use bubz2_config::Config;
use bubz2_errors::OpsError;
use bubz2_events::EventReceiver;
use bubz2_ops::{OperationResult, OpsContextBuilder, OpsCtx, SyncRequest};
use clap::Parser;
use std::process;
use tokio::select;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    // Parse command line arguments first to check for JSON mode
    let cli = Cli::parse();
    let json_mode = cli.global.json;

    init_tracing(json_mode, cli.global.debug);

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
    info!("Starting bubz2 v{}", env!("CARGO_PKG_VERSION"));

    // 1. Start with file config (or defaults)
    let mut config = Config::load_or_default(cli.global.config.as_deref()).await?;

    // 2. Merge environment variables
    config.merge_env()?;

    // 3. Apply CLI flags (highest precedence)
    apply_cli_config(&mut config, &cli);

    let request = SyncRequest::from_config(&config)?
        .with_force(cli.sync.force)
        .with_dry_run(cli.sync.dry_run);

    let (event_sender, event_receiver) = bubz2_events::channel();
    let ops_ctx = OpsContextBuilder::new()
        .with_event_sender(event_sender)
        .build()?;

    let renderer = OutputRenderer::new(cli.global.json, config.general.color);
    let mut event_handler = EventHandler::new(
        renderer.colors_enabled(),
        cli.global.json,
        cli.global.debug,
    );

    let result =
        execute_command_with_events(ops_ctx, request, event_receiver, &mut event_handler).await?;

    renderer.render_result(&result)?;

    if let OperationResult::SyncReport(report) = &result {
        if !report.is_success() {
            return Err(bubz2_errors::Error::from(OpsError::PartialFailure {
                failed: report.failed.len(),
                total: report.failed.len() + report.compressed.len(),
            })
            .into());
        }
    }

    info!("Command completed successfully");
    Ok(())
}

/// Execute the sync with concurrent event handling
async fn execute_command_with_events(
    ops_ctx: OpsCtx,
    request: SyncRequest,
    mut event_receiver: EventReceiver,
    event_handler: &mut EventHandler,
) -> Result<OperationResult, CliError> {
    let mut command_future = Box::pin(execute_command(ops_ctx, request));

    loop {
        select! {
            result = &mut command_future => {
                // Drain any remaining events
                while let Ok(event) = event_receiver.try_recv() {
                    event_handler.handle_event(event);
                }
                return result;
            }

            event = event_receiver.recv() => {
                match event {
                    Some(event) => event_handler.handle_event(event),
                    None => { /* Channel closed: keep waiting for command to finish */ }
                }
            }
        }
    }
}

async fn execute_command(ctx: OpsCtx, request: SyncRequest) -> Result<OperationResult, CliError> {
    let report = bubz2_ops::sync(&ctx, &request).await?;
    Ok(OperationResult::SyncReport(report))
}

/// Initialize tracing/logging
fn init_tracing(json_mode: bool, debug_enabled_flag: bool) {
    let debug_enabled = std::env::var("RUST_LOG").is_ok() || debug_enabled_flag;

    if debug_enabled_flag {
        // Debug mode: structured JSON logs to file
        let log_dir = Config::logs_dir();
        if let Err(e) = std::fs::create_dir_all(&log_dir) {
            if !json_mode {
                eprintln!("Warning: Failed to create log directory: {e}");
            }
        }

        let log_file = log_dir.join(format!(
            "bubz2-{}.log",
            chrono::Utc::now().format("%Y%m%d-%H%M%S")
        ));

        match std::fs::File::create(&log_file) {
            Ok(file) => {
                tracing_subscriber::fmt()
                    .json()
                    .with_writer(file)
                    .with_env_filter(
                        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(
                            |_| tracing_subscriber::EnvFilter::new("info,bubz2=debug,bubz2_ops=debug"),
                        ),
                    )
                    .init();

                if !json_mode {
                    eprintln!("Debug logging enabled: {}", log_file.display());
                }
                return;
            }
            Err(e) => {
                if !json_mode {
                    eprintln!("Warning: Failed to create log file: {e}");
                }
            }
        }
    }

    if json_mode && !debug_enabled {
        // JSON mode: suppress console output to avoid contaminating JSON
        tracing_subscriber::fmt()
            .with_writer(std::io::sink)
            .with_env_filter("off")
            .init();
    } else {
        // Normal mode: minimal logging to stderr
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                    tracing_subscriber::EnvFilter::new("warn,bubz2=warn,bubz2_ops=warn")
                }),
            )
            .init();
    }
}

/// Apply CLI configuration overrides (highest precedence)
fn apply_cli_config(config: &mut Config, cli: &Cli) {
    if let Some(color) = cli.global.color {
        config.general.color = color;
    }
    if let Some(jobs) = cli.sync.jobs {
        config.general.jobs = jobs;
    }

    let sync = &mut config.sync;
    if let Some(from) = &cli.sync.from {
        sync.source = Some(from.clone());
    }
    if let Some(to) = &cli.sync.to {
        sync.destination = Some(to.clone());
    }
    if let Some(state) = &cli.sync.state {
        sync.state_path.clone_from(state);
    }
    if let Some(ignore) = &cli.sync.ignore {
        sync.ignore_file = Some(ignore.clone());
    }
    if let Some(level) = cli.sync.level {
        sync.level = level;
    }
    if cli.sync.no_prune {
        sync.prune_state = false;
    }
}

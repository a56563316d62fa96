//! Crescendo CLI Binary
//!
//! Batch run from flags, or the interactive session when started without any.

use anyhow::{anyhow, Context};
use clap::Parser;
use crescendo::cli::{format_summary_text, map_error, run_interactive, Cli, RunContext, RunOverrides};
use crescendo::config::ConfigLoader;
use crescendo::logging::{init_logging, LoggingConfig};
use std::io::IsTerminal;
use std::path::Path;
use std::process::ExitCode;
use tracing::{error, info};

fn main() -> ExitCode {
    let bare = std::env::args_os().len() <= 1;
    let cli = Cli::parse();

    // Build logging config from CLI args, env vars, and config file
    let logging_config = build_logging_config(&cli);

    // Initialize logging early
    if let Err(e) = init_logging(Some(&logging_config)) {
        eprintln!("Failed to initialize logging: {}", e);
        return ExitCode::FAILURE;
    }

    info!("Crescendo starting");

    match run(&cli, bare || cli.interactive) {
        Ok(()) => {
            info!("Crescendo finished");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Run failed: {:#}", e);
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli, interactive: bool) -> anyhow::Result<()> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;

    let context = RunContext::new(Path::new("."), cli.config.clone())
        .map_err(|e| anyhow!(map_error(&e)))
        .context("Failed to load configuration")?;
    let overrides = RunOverrides::from(cli);

    if interactive {
        return run_interactive(&context, &runtime, &overrides)
            .map_err(|e| anyhow!(map_error(&e)))
            .context("Interactive session ended");
    }

    let show_progress = !cli.quiet && std::io::stderr().is_terminal();
    let summary = runtime
        .block_on(context.execute(&overrides, show_progress))
        .map_err(|e| anyhow!(map_error(&e)))?;

    if !cli.quiet {
        println!("{}", format_summary_text(&summary, std::io::stdout().is_terminal()));
    }
    Ok(())
}

/// Build logging configuration from CLI args, environment, and config file.
/// Precedence: CLI flags override config file override defaults.
fn build_logging_config(cli: &Cli) -> LoggingConfig {
    let mut config = if let Some(ref config_path) = cli.config {
        ConfigLoader::load_from_file(config_path)
            .ok()
            .map(|c| c.logging)
            .unwrap_or_default()
    } else {
        ConfigLoader::load(Path::new("."))
            .ok()
            .map(|c| c.logging)
            .unwrap_or_default()
    };

    if cli.quiet {
        config.enabled = false;
    }
    if cli.verbose {
        config.level = "debug".to_string();
        config.console_level = "debug".to_string();
        // Make verbose mode observable in the terminal without losing file logs.
        // An explicit --log-output value still takes precedence below.
        if config.output == "file" {
            config.output = "file+stderr".to_string();
        }
    }
    if let Some(ref level) = cli.log_level {
        config.level = level.clone();
    }
    if let Some(ref format) = cli.log_format {
        config.format = format.clone();
    }
    if let Some(ref output) = cli.log_output {
        config.output = output.clone();
    }
    if let Some(ref file) = cli.log_file {
        config.file = file.clone();
    }

    config
}

//! Fitcheck CLI Binary
//!
//! Command-line interface for verifying digests embedded in FIT images.

use clap::Parser;
use fitcheck::cli::{command_name, map_error, Cli, RunContext};
use fitcheck::config::ConfigLoader;
use fitcheck::error::ApiError;
use fitcheck::logging::{init_logging, resolve_log_file_path, LoggingConfig};
use std::process;
use tracing::{error, info};

fn main() {
    let cli = Cli::parse();

    if let Err(e) = init_logging(Some(&logging_config(&cli))) {
        eprintln!("Failed to initialize logging: {}", e);
        process::exit(1);
    }
    info!(command = command_name(&cli.command), "fitcheck starting");

    match run(&cli) {
        Ok(output) if !output.is_empty() => println!("{}", output),
        Ok(_) => {}
        Err(e) => {
            error!(error = %e, "fitcheck failed");
            eprintln!("{}", map_error(&e));
            process::exit(1);
        }
    }
}

fn run(cli: &Cli) -> Result<String, ApiError> {
    RunContext::new(cli.workspace.clone(), cli.config.clone())?.execute(&cli.command)
}

/// CLI flags layered over the `[logging]` table of the loaded config.
///
/// A config that fails to load falls back to the logging defaults; the same
/// failure is reported once the run context loads it.
fn logging_config(cli: &Cli) -> LoggingConfig {
    let loaded = match &cli.config {
        Some(path) => ConfigLoader::load_from_file(path),
        None => ConfigLoader::load(&cli.workspace),
    };
    let mut config = loaded.map(|c| c.logging).unwrap_or_default();

    config.enabled &= !cli.quiet;
    if cli.verbose {
        config.level = "debug".to_string();
    }
    if let Some(level) = &cli.log_level {
        config.level = level.clone();
    }
    if let Some(format) = &cli.log_format {
        config.format = format.clone();
    }
    if let Some(output) = &cli.log_output {
        config.output = output.clone();
    }

    if config.enabled && config.output.starts_with("file") {
        // Unresolvable default path: init_logging reports the missing file
        let workspace = Some(cli.workspace.as_path());
        if let Ok(path) = resolve_log_file_path(cli.log_file.clone(), config.file.take(), workspace) {
            config.file = Some(path);
        }
    }
    config
}

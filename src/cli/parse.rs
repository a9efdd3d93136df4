//! CLI parse: clap types for fitcheck. No behavior; definitions only.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// fitcheck - verify digests embedded in FIT images
#[derive(Parser)]
#[command(name = "fitcheck")]
#[command(about = "Verify digests embedded in Flattened Image Tree blobs against known-good values")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Workspace root directory (config/ and relative templates resolve here)
    #[arg(long, default_value = ".")]
    pub workspace: PathBuf,

    /// Configuration file path (overrides default config loading)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Debug-level logging
    #[arg(long)]
    pub verbose: bool,

    /// Disable logging
    #[arg(long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file, file+stderr, both)
    #[arg(long)]
    pub log_output: Option<String>,

    /// Log file path (if output includes "file")
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Verify every hashable image in a FIT blob
    Verify {
        /// FIT blob to verify
        fit: PathBuf,
        /// Tree accessor backend (fdtget or native)
        #[arg(long)]
        backend: Option<String>,
        /// Oracle TOML file (defaults to the built-in kernel table)
        #[arg(long)]
        oracle: Option<PathBuf>,
        /// Substring selecting image nodes to verify
        #[arg(long)]
        image_pattern: Option<String>,
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// List child nodes of a path
    Ls {
        /// FIT blob to read
        fit: PathBuf,
        /// Node path
        #[arg(default_value = "/")]
        path: String,
        /// Tree accessor backend (fdtget or native)
        #[arg(long)]
        backend: Option<String>,
    },
    /// Read one property
    Get {
        /// FIT blob to read
        fit: PathBuf,
        /// Node path
        node: String,
        /// Property name
        property: String,
        /// Render the value as one hex string
        #[arg(long)]
        hex: bool,
        /// Tree accessor backend (fdtget or native)
        #[arg(long)]
        backend: Option<String>,
    },
    /// Show the active oracle table
    Oracle {
        /// Oracle TOML file (defaults to the configured or built-in table)
        #[arg(long)]
        oracle: Option<PathBuf>,
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Build a FIT with dtc and mkimage, then verify it
    Scenario {
        /// Payload fill byte, decimal or 0x-prefixed hex (must not be zero)
        #[arg(long, value_parser = parse_byte)]
        fill_byte: Option<u8>,
        /// Keep generated files in this directory instead of a temporary one
        #[arg(long)]
        keep: Option<PathBuf>,
        /// Directory holding hash-images.its and sandbox-kernel.dts
        #[arg(long)]
        templates: Option<PathBuf>,
        /// Tree accessor backend (fdtget or native)
        #[arg(long)]
        backend: Option<String>,
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Check that the external tools can be run
    Doctor {
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
}

/// Parse `165` or `0xa5`.
pub fn parse_byte(s: &str) -> Result<u8, String> {
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u8::from_str_radix(hex, 16),
        None => s.parse::<u8>(),
    };
    parsed.map_err(|e| format!("invalid byte '{}': {}", s, e))
}

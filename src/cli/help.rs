//! CLI command-name contract for logging.

use crate::cli::parse::Commands;

/// Command name string for log events (e.g. "verify", "scenario").
pub fn command_name(command: &Commands) -> &'static str {
    match command {
        Commands::Verify { .. } => "verify",
        Commands::Ls { .. } => "ls",
        Commands::Get { .. } => "get",
        Commands::Oracle { .. } => "oracle",
        Commands::Scenario { .. } => "scenario",
        Commands::Doctor { .. } => "doctor",
    }
}

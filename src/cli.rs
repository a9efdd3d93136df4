//! CLI domain: parse, route, help, output, and presentation only.
//! No domain orchestration; single route table dispatches to domain services.

mod help;
mod output;
mod parse;
mod presentation;
mod route;

pub use help::command_name;
pub use output::map_error;
pub use parse::{parse_byte, Cli, Commands};
pub use presentation::{
    format_doctor_result, format_get_result, format_ls_result, format_oracle_result,
    format_report, format_scenario_result,
};
pub use route::RunContext;

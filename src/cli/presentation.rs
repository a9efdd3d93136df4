//! CLI presentation: text and json formatters per command family.

mod inspect;
mod report;
mod shared;

pub use inspect::{format_doctor_result, format_get_result, format_ls_result};
pub use report::{format_oracle_result, format_report, format_scenario_result};

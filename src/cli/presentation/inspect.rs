//! Tree inspection and tool check presentation.

use super::shared::{check_format, to_json};
use crate::error::ApiError;
use crate::scenario::ToolStatus;
use comfy_table::presets::UTF8_BORDERS_ONLY;
use comfy_table::Table;
use owo_colors::OwoColorize;
use serde_json::json;

/// One child name per line, as `fdtget -l` prints them.
pub fn format_ls_result(children: &[String]) -> String {
    children.join("\n")
}

pub fn format_get_result(value: &str) -> String {
    value.to_string()
}

pub fn format_doctor_result(statuses: &[ToolStatus], format: &str) -> Result<String, ApiError> {
    check_format(format)?;
    if format == "json" {
        return to_json(&json!({ "tools": statuses }));
    }
    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["Tool", "Program", "Status"]);
    for status in statuses {
        let state = if status.available {
            format!("{}", "available".green())
        } else {
            format!("{}", "missing".red())
        };
        table.add_row(vec![status.tool.clone(), status.program.clone(), state]);
    }
    Ok(table.to_string())
}

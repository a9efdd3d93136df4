//! Verification presentation: report, oracle table, and scenario outcome.

use super::shared::{abbreviate, check_format, section_heading, to_json};
use crate::error::ApiError;
use crate::scenario::ScenarioOutcome;
use crate::verify::{OracleTable, VerificationReport};
use comfy_table::presets::UTF8_BORDERS_ONLY;
use comfy_table::Table;
use owo_colors::OwoColorize;
use serde_json::json;

pub fn format_report(report: &VerificationReport, format: &str) -> Result<String, ApiError> {
    check_format(format)?;
    if format == "json" {
        return to_json(report);
    }
    Ok(report_text(report))
}

fn report_text(report: &VerificationReport) -> String {
    let mut out = String::new();
    for image in &report.images {
        out.push_str(&section_heading(&image.image));
        out.push('\n');
        let mut table = Table::new();
        table.load_preset(UTF8_BORDERS_ONLY);
        table.set_header(vec!["Hash node", "Algorithm", "Digest"]);
        for check in &image.checks {
            table.add_row(vec![
                check.node.clone(),
                check.algo.clone(),
                abbreviate(&check.digest),
            ]);
        }
        out.push_str(&table.to_string());
        out.push('\n');
    }
    out.push_str(&format!(
        "{} {} digest(s) across {} image(s)\n",
        "OK".green().bold(),
        report.digest_count(),
        report.images.len()
    ));
    if let Some(fp) = &report.fingerprint {
        out.push_str(&format!("Blob fingerprint: {}\n", fp));
    }
    out.push_str(&format!("Verified at: {}", report.verified_at));
    out
}

pub fn format_oracle_result(table: &OracleTable, format: &str) -> Result<String, ApiError> {
    check_format(format)?;
    if format == "json" {
        let digests: serde_json::Map<String, serde_json::Value> = table
            .iter()
            .map(|(algo, digest)| (algo.to_string(), json!(digest)))
            .collect();
        return to_json(&json!({ "digests": digests, "total": table.len() }));
    }
    let mut out = Table::new();
    out.load_preset(UTF8_BORDERS_ONLY);
    out.set_header(vec!["Algorithm", "Expected digest"]);
    for (algo, digest) in table.iter() {
        out.add_row(vec![algo, digest]);
    }
    Ok(format!("{}\n\nTotal: {} algorithm(s)", out, table.len()))
}

pub fn format_scenario_result(outcome: &ScenarioOutcome, format: &str) -> Result<String, ApiError> {
    check_format(format)?;
    if format == "json" {
        return to_json(outcome);
    }
    let mut out = report_text(&outcome.report);
    if let Some(fit) = &outcome.fit_path {
        out.push_str(&format!("\nFIT kept at: {}", fit.display()));
    }
    Ok(out)
}

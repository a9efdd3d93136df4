//! Shared presentation helpers.

use crate::error::ApiError;
use owo_colors::OwoColorize;
use serde::Serialize;

/// Section heading with bold/underline.
pub(super) fn section_heading(title: &str) -> String {
    format!("{}", title.bold().underline())
}

pub(super) fn to_json<T: Serialize>(value: &T) -> Result<String, ApiError> {
    serde_json::to_string_pretty(value)
        .map_err(|e| ApiError::ConfigError(format!("Failed to render json: {}", e)))
}

pub(super) fn check_format(format: &str) -> Result<(), ApiError> {
    match format {
        "text" | "json" => Ok(()),
        other => Err(ApiError::ConfigError(format!(
            "Invalid format: {} (must be 'text' or 'json')",
            other
        ))),
    }
}

/// First and last few characters of a long digest.
pub(super) fn abbreviate(digest: &str) -> String {
    if digest.len() <= 20 {
        return digest.to_string();
    }
    format!("{}…{}", &digest[..8], &digest[digest.len() - 8..])
}

//! CLI output: error mapping from domain errors to stable CLI surface.

use crate::error::{ApiError, ScenarioError, VerifyError};

/// Map domain/service errors to a string for CLI output.
///
/// Verification failures are prefixed `FAIL:` so scripts can tell a bad
/// image apart from a setup problem.
pub fn map_error(e: &ApiError) -> String {
    match e {
        ApiError::Verify(v) | ApiError::Scenario(ScenarioError::Verify(v)) => match v {
            VerifyError::Accessor(_) => format!("Error: {}", v),
            _ => format!("FAIL: {}", v),
        },
        _ => format!("Error: {}", e),
    }
}

//! Configuration System
//!
//! Layered configuration for tool locations, verification rules, the
//! scenario harness, and logging. Sources merge from built-in defaults, the
//! user's global file, workspace files, and `FITCHECK__*` environment
//! variables, in increasing precedence.

use crate::error::ApiError;
use crate::logging::LoggingConfig;
use crate::tree::Backend;
use crate::verify::{OracleTable, Selection};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub use crate::scenario::ScenarioConfig;

mod facade;
mod merge;
mod sources;

pub use facade::ConfigLoader;

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FitcheckConfig {
    /// External tool locations
    #[serde(default)]
    pub tools: ToolsConfig,

    /// Verification rules
    #[serde(default)]
    pub verify: VerifyConfig,

    /// Scenario harness inputs
    #[serde(default)]
    pub scenario: ScenarioConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// External tool programs, looked up on `PATH` unless given as paths.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolsConfig {
    #[serde(default = "default_dtc")]
    pub dtc: String,
    #[serde(default = "default_mkimage")]
    pub mkimage: String,
    #[serde(default = "default_fdtget")]
    pub fdtget: String,
}

fn default_dtc() -> String {
    "dtc".to_string()
}

fn default_mkimage() -> String {
    "mkimage".to_string()
}

fn default_fdtget() -> String {
    "fdtget".to_string()
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            dtc: default_dtc(),
            mkimage: default_mkimage(),
            fdtget: default_fdtget(),
        }
    }
}

/// Verification rules
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyConfig {
    /// Tree accessor backend: fdtget or native
    #[serde(default)]
    pub backend: Backend,

    /// Substring selecting image nodes to verify
    #[serde(default = "default_image_pattern")]
    pub image_pattern: String,

    /// Substring identifying hash subnodes
    #[serde(default = "default_hash_marker")]
    pub hash_marker: String,

    /// Oracle TOML file; the built-in kernel table when unset
    #[serde(default)]
    pub oracle_file: Option<PathBuf>,
}

fn default_image_pattern() -> String {
    Selection::default().image_pattern
}

fn default_hash_marker() -> String {
    Selection::default().hash_marker
}

impl Default for VerifyConfig {
    fn default() -> Self {
        Self {
            backend: Backend::default(),
            image_pattern: default_image_pattern(),
            hash_marker: default_hash_marker(),
            oracle_file: None,
        }
    }
}

impl VerifyConfig {
    pub fn selection(&self) -> Selection {
        Selection {
            image_pattern: self.image_pattern.clone(),
            hash_marker: self.hash_marker.clone(),
        }
    }

    /// Load the configured oracle, resolving a relative file against `base`.
    pub fn load_oracle(&self, base: &Path) -> Result<OracleTable, ApiError> {
        match &self.oracle_file {
            Some(path) if path.is_relative() => OracleTable::load(&base.join(path)),
            Some(path) => OracleTable::load(path),
            None => Ok(OracleTable::kernel()),
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.image_pattern.is_empty() {
            return Err("image_pattern cannot be empty".to_string());
        }
        if self.hash_marker.is_empty() {
            return Err("hash_marker cannot be empty".to_string());
        }
        Ok(())
    }
}

impl ToolsConfig {
    pub fn validate(&self) -> Result<(), String> {
        for (name, program) in [
            ("dtc", &self.dtc),
            ("mkimage", &self.mkimage),
            ("fdtget", &self.fdtget),
        ] {
            if program.trim().is_empty() {
                return Err(format!("{} program cannot be empty", name));
            }
        }
        Ok(())
    }
}

/// Configuration validation errors
#[derive(Debug, Clone)]
pub enum ValidationError {
    Tools(String),
    Verify(String),
    Scenario(String),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::Tools(msg) => write!(f, "Tools: {}", msg),
            ValidationError::Verify(msg) => write!(f, "Verify: {}", msg),
            ValidationError::Scenario(msg) => write!(f, "Scenario: {}", msg),
        }
    }
}

impl std::error::Error for ValidationError {}

impl FitcheckConfig {
    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if let Err(e) = self.tools.validate() {
            errors.push(ValidationError::Tools(e));
        }
        if let Err(e) = self.verify.validate() {
            errors.push(ValidationError::Verify(e));
        }
        if let Err(e) = self.scenario.validate() {
            errors.push(ValidationError::Scenario(e));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Validate, folding every error into one `ApiError`.
    pub fn validated(self) -> Result<Self, ApiError> {
        self.validate().map_err(|errors| {
            let error_msgs: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            ApiError::ConfigError(format!(
                "Configuration validation failed:\n{}",
                error_msgs.join("\n")
            ))
        })?;
        Ok(self)
    }
}

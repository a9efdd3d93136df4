//! Error types for FIT digest verification.

use std::collections::BTreeSet;
use std::path::PathBuf;
use thiserror::Error;

/// External tool invocation errors
#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("Failed to spawn {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} exited with {status}: {stderr}")]
    Failed {
        program: String,
        status: String,
        stderr: String,
    },

    #[error("{program} produced non UTF-8 output")]
    InvalidOutput { program: String },
}

/// Tree query errors
#[derive(Debug, Error)]
pub enum AccessorError {
    #[error("Node not found: {0}")]
    NodeNotFound(String),

    #[error("Property not found: {node}:{property}")]
    PropertyNotFound { node: String, property: String },

    #[error("Malformed value for {node}:{property}: {reason}")]
    MalformedValue {
        node: String,
        property: String,
        reason: String,
    },

    #[error("Malformed tree blob: {0}")]
    MalformedBlob(String),

    #[error("Tree query failed: {0}")]
    Process(#[from] ProcessError),

    #[error("Tree I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Digest verification failures
#[derive(Debug, Error)]
pub enum VerifyError {
    #[error("{image} Borked hash: {algo}")]
    HashMismatch { image: String, algo: String },

    #[error("{image} carries a hash for unknown algorithm: {algo}")]
    UnknownAlgorithm { image: String, algo: String },

    #[error("Missing hashes from {image}: {}", join_set(.missing))]
    IncompleteCoverage {
        image: String,
        missing: BTreeSet<String>,
    },

    #[error("FIT image has no \"/images\" nodes with \"hash-...\"")]
    NoHashableNodes,

    #[error(transparent)]
    Accessor(#[from] AccessorError),
}

/// Scenario harness failures
#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("Payload fill byte must not be zero")]
    ZeroFillByte,

    #[error("Template not found: {0}")]
    TemplateNotFound(PathBuf),

    #[error("Scenario I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Tool invocation failed: {0}")]
    Tool(#[from] ProcessError),

    #[error(transparent)]
    Accessor(#[from] AccessorError),

    #[error(transparent)]
    Verify(#[from] VerifyError),
}

/// Top-level errors surfaced by the CLI
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error(transparent)]
    Accessor(#[from] AccessorError),

    #[error(transparent)]
    Verify(#[from] VerifyError),

    #[error(transparent)]
    Scenario(#[from] ScenarioError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<config::ConfigError> for ApiError {
    fn from(err: config::ConfigError) -> Self {
        ApiError::ConfigError(err.to_string())
    }
}

fn join_set(set: &BTreeSet<String>) -> String {
    set.iter().cloned().collect::<Vec<_>>().join(", ")
}

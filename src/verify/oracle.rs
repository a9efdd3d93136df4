//! Oracle Table
//!
//! Known-good digests keyed by algorithm name. The key set is the universe of
//! algorithms every hashable image must carry.

use crate::error::ApiError;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

/// Digests of 500 bytes of `0xa5`, the payload the scenario harness builds.
const KERNEL_DIGESTS: [(&str, &str); 7] = [
    (
        "sha512",
        "f18c1486a2c29f56360301576cdfce4dfd8e8e932d0ed8e239a1f314b8ae1d77b2a58cd7fe32e4075e69448e623ce53b0b6aa6ce5626d2c189a5beae29a68d93",
    ),
    (
        "sha384",
        "16e28976740048485d08d793d8bf043ebc7826baf2bc15feac72825ad67530ceb3d09e0deb6932c62a5a0e9f3936baf4",
    ),
    (
        "sha256",
        "2955c56bc1e5050c111ba6e089e0f5342bb47dedf77d87e3f429095feb98a7e5",
    ),
    ("sha1", "652383e1a6d946953e1f65092c9435f6452c2ab7"),
    ("md5", "4879e5086e4c76128e525b5fe2af55f1"),
    ("crc32", "32eddfdf"),
    ("crc16-ccitt", "d4be"),
];

/// Immutable algorithm → expected digest mapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OracleTable {
    digests: BTreeMap<String, String>,
}

/// On-disk oracle file: a `[digests]` table of `algo = "hex"` entries.
#[derive(Debug, Deserialize)]
struct OracleFile {
    digests: BTreeMap<String, String>,
}

impl Default for OracleTable {
    fn default() -> Self {
        Self::kernel()
    }
}

impl OracleTable {
    /// The known-good table for the kernel payload.
    pub fn kernel() -> Self {
        Self {
            digests: KERNEL_DIGESTS
                .iter()
                .map(|(algo, digest)| (algo.to_string(), digest.to_string()))
                .collect(),
        }
    }

    /// Build from explicit entries. Digests must be non-empty lowercase hex.
    pub fn from_entries<I, K, V>(entries: I) -> Result<Self, ApiError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let digests: BTreeMap<String, String> = entries
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        if digests.is_empty() {
            return Err(ApiError::ConfigError(
                "Oracle table must name at least one algorithm".to_string(),
            ));
        }
        for (algo, digest) in &digests {
            validate_digest(algo, digest)?;
        }
        Ok(Self { digests })
    }

    /// Load an oracle from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ApiError> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            ApiError::ConfigError(format!("Failed to read oracle {}: {}", path.display(), e))
        })?;
        let file: OracleFile = toml::from_str(&text).map_err(|e| {
            ApiError::ConfigError(format!("Failed to parse oracle {}: {}", path.display(), e))
        })?;
        Self::from_entries(file.digests)
    }

    /// Expected digest for `algo`.
    pub fn get(&self, algo: &str) -> Option<&str> {
        self.digests.get(algo).map(String::as_str)
    }

    pub fn algorithms(&self) -> BTreeSet<String> {
        self.digests.keys().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.digests.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.digests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.digests.is_empty()
    }
}

fn validate_digest(algo: &str, digest: &str) -> Result<(), ApiError> {
    if algo.is_empty() {
        return Err(ApiError::ConfigError(
            "Oracle algorithm name cannot be empty".to_string(),
        ));
    }
    let well_formed = !digest.is_empty()
        && digest.len() % 2 == 0
        && digest
            .bytes()
            .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b));
    if !well_formed {
        return Err(ApiError::ConfigError(format!(
            "Oracle digest for '{}' must be lowercase hex bytes: {}",
            algo, digest
        )));
    }
    Ok(())
}

//! Hash Verifier
//!
//! Selects hashable image nodes under `/images`, then checks every `hash-*`
//! subnode's `algo`/`value` pair against the oracle and requires that each
//! image exercised the oracle's full algorithm set.

use super::oracle::OracleTable;
use crate::error::{AccessorError, VerifyError};
use crate::tree::path;
use crate::tree::TreeAccessor;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::{debug, info};

/// Parent of all image nodes in a FIT.
pub const IMAGES_PATH: &str = "/images";

/// Node selection rules.
///
/// Both rules are substring matches, so `kernel` selects `kernel@1`,
/// `kernel-2` and `fdt-kernel` alike.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    /// Image node names containing this are verified
    pub image_pattern: String,
    /// Image children containing this are hash nodes
    pub hash_marker: String,
}

impl Default for Selection {
    fn default() -> Self {
        Self {
            image_pattern: "kernel".to_string(),
            hash_marker: "hash-".to_string(),
        }
    }
}

/// One checked hash node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HashCheck {
    pub node: String,
    pub algo: String,
    pub digest: String,
}

/// Checks performed for one image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageReport {
    pub image: String,
    pub checks: Vec<HashCheck>,
}

impl ImageReport {
    pub fn algorithms(&self) -> BTreeSet<&str> {
        self.checks.iter().map(|c| c.algo.as_str()).collect()
    }
}

/// Successful verification outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationReport {
    pub images: Vec<ImageReport>,
    /// RFC 3339 UTC time the run finished
    pub verified_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fingerprint: Option<String>,
}

impl VerificationReport {
    pub fn with_fingerprint(mut self, fingerprint: String) -> Self {
        self.fingerprint = Some(fingerprint);
        self
    }

    pub fn digest_count(&self) -> usize {
        self.images.iter().map(|i| i.checks.len()).sum()
    }
}

/// Verifier state: the hashable-node set found in one tree.
#[derive(Debug, Clone, Default)]
pub struct HashVerifier {
    selection: Selection,
    hashable_nodes: BTreeSet<String>,
}

impl HashVerifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_selection(selection: Selection) -> Self {
        Self {
            selection,
            hashable_nodes: BTreeSet::new(),
        }
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn hashable_nodes(&self) -> &BTreeSet<String> {
        &self.hashable_nodes
    }

    /// Select image nodes whose name contains the image pattern.
    ///
    /// Replaces any previous selection, so calling it again against the same
    /// tree yields the same set.
    pub fn find_hashable_image_nodes<T>(
        &mut self,
        tree: &T,
    ) -> Result<&BTreeSet<String>, AccessorError>
    where
        T: TreeAccessor + ?Sized,
    {
        self.hashable_nodes = tree
            .list_children(IMAGES_PATH)?
            .into_iter()
            .filter(|name| name.contains(&self.selection.image_pattern))
            .map(|name| path::join(IMAGES_PATH, &name))
            .collect();
        debug!(
            pattern = %self.selection.image_pattern,
            count = self.hashable_nodes.len(),
            "Selected hashable image nodes"
        );
        Ok(&self.hashable_nodes)
    }

    /// Check every selected image against `oracle`.
    ///
    /// Stops at the first mismatching or unknown digest. Coverage is checked
    /// once an image's hash nodes are exhausted.
    pub fn verify_hashes<T>(
        &self,
        tree: &T,
        oracle: &OracleTable,
    ) -> Result<VerificationReport, VerifyError>
    where
        T: TreeAccessor + ?Sized,
    {
        if self.hashable_nodes.is_empty() {
            return Err(VerifyError::NoHashableNodes);
        }

        let mut images = Vec::with_capacity(self.hashable_nodes.len());
        for image in &self.hashable_nodes {
            images.push(self.verify_image(tree, oracle, image)?);
        }

        Ok(VerificationReport {
            images,
            verified_at: chrono::Utc::now().to_rfc3339(),
            fingerprint: None,
        })
    }

    fn verify_image<T>(
        &self,
        tree: &T,
        oracle: &OracleTable,
        image: &str,
    ) -> Result<ImageReport, VerifyError>
    where
        T: TreeAccessor + ?Sized,
    {
        let mut seen = BTreeSet::new();
        let mut checks = Vec::new();

        for name in tree.list_children(image)? {
            if !name.contains(&self.selection.hash_marker) {
                continue;
            }
            let node = path::join(image, &name);
            let digest = tree.get_property_hex(&node, "value")?;
            let algo = tree.get_property(&node, "algo")?;
            seen.insert(algo.clone());

            let expected = oracle.get(&algo).ok_or_else(|| VerifyError::UnknownAlgorithm {
                image: image.to_string(),
                algo: algo.clone(),
            })?;
            if expected != digest {
                debug!(%image, %algo, %expected, actual = %digest, "Digest mismatch");
                return Err(VerifyError::HashMismatch {
                    image: image.to_string(),
                    algo,
                });
            }
            debug!(%image, node = %name, %algo, "Digest matches");
            checks.push(HashCheck {
                node: name,
                algo,
                digest,
            });
        }

        let missing: BTreeSet<String> = oracle
            .algorithms()
            .into_iter()
            .filter(|algo| !seen.contains(algo))
            .collect();
        if !missing.is_empty() {
            return Err(VerifyError::IncompleteCoverage {
                image: image.to_string(),
                missing,
            });
        }

        info!(%image, digests = checks.len(), "Image digests verified");
        Ok(ImageReport {
            image: image.to_string(),
            checks,
        })
    }
}

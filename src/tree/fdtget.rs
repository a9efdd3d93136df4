//! `fdtget` backend
//!
//! Every query runs the external tool against the blob on disk; nothing is
//! cached, so a blob rewritten between calls is seen immediately.

use super::hex::tokens_to_hex;
use super::path::normalize_node_path;
use super::{PropertyValue, TreeAccessor};
use crate::error::{AccessorError, ProcessError};
use crate::exec::ProcessRunner;
use std::path::{Path, PathBuf};
use tracing::debug;

/// libfdt error text printed by `fdtget` when a node or property is absent.
const NOT_FOUND: &str = "FDT_ERR_NOTFOUND";

/// Tree accessor that shells out to `fdtget`.
pub struct FdtgetAccessor<R: ProcessRunner> {
    runner: R,
    program: String,
    blob: PathBuf,
}

impl<R: ProcessRunner> FdtgetAccessor<R> {
    pub fn new(runner: R, program: impl Into<String>, blob: impl AsRef<Path>) -> Self {
        Self {
            runner,
            program: program.into(),
            blob: blob.as_ref().to_path_buf(),
        }
    }

    fn query(&self, flags: &[&str], operands: &[&str]) -> Result<String, ProcessError> {
        let mut args: Vec<String> = flags.iter().map(|f| f.to_string()).collect();
        args.push(self.blob.to_string_lossy().into_owned());
        args.extend(operands.iter().map(|o| o.to_string()));
        debug!(blob = %self.blob.display(), args = %args.join(" "), "fdtget query");
        self.runner.run(&self.program, &args)
    }

    fn query_property(
        &self,
        flags: &[&str],
        node: &str,
        property: &str,
    ) -> Result<String, AccessorError> {
        let node = normalize_node_path(node);
        self.query(flags, &[node.as_str(), property]).map_err(|e| {
            if is_not_found(&e) {
                AccessorError::PropertyNotFound {
                    node: node.clone(),
                    property: property.to_string(),
                }
            } else {
                AccessorError::Process(e)
            }
        })
    }

    fn read_hex(&self, node: &str, property: &str) -> Result<String, AccessorError> {
        let tokens = self.query_property(&["-tbx"], node, property)?;
        tokens_to_hex(&tokens).map_err(|reason| AccessorError::MalformedValue {
            node: normalize_node_path(node),
            property: property.to_string(),
            reason,
        })
    }
}

fn is_not_found(err: &ProcessError) -> bool {
    matches!(err, ProcessError::Failed { stderr, .. } if stderr.contains(NOT_FOUND))
}

impl<R: ProcessRunner> TreeAccessor for FdtgetAccessor<R> {
    fn list_children(&self, path: &str) -> Result<Vec<String>, AccessorError> {
        let path = normalize_node_path(path);
        let out = self.query(&["-l"], &[path.as_str()]).map_err(|e| {
            if is_not_found(&e) {
                AccessorError::NodeNotFound(path.clone())
            } else {
                AccessorError::Process(e)
            }
        })?;
        Ok(out.split_whitespace().map(str::to_string).collect())
    }

    fn get_property(&self, node: &str, property: &str) -> Result<String, AccessorError> {
        let out = self.query_property(&[], node, property)?;
        Ok(out.trim_end_matches('\n').to_string())
    }

    fn get_property_hex(&self, node: &str, property: &str) -> Result<String, AccessorError> {
        self.read_hex(node, property)
    }

    fn get_property_value(
        &self,
        node: &str,
        property: &str,
    ) -> Result<PropertyValue, AccessorError> {
        let hex_value = self.read_hex(node, property)?;
        let raw = hex::decode(&hex_value).map_err(|e| AccessorError::MalformedValue {
            node: normalize_node_path(node),
            property: property.to_string(),
            reason: e.to_string(),
        })?;
        Ok(PropertyValue::from_raw(&raw))
    }
}

//! Flattened Image Tree Access
//!
//! Read-only queries over a serialized device-tree blob: list child nodes,
//! read a property as text, read a property as a hex digest. Two backends
//! answer the same queries: `fdtget` shells out for every call, `native`
//! parses the blob once in-process.

pub mod blob;
pub mod fdtget;
pub mod hasher;
pub mod hex;
pub mod node;
pub mod path;

use crate::error::AccessorError;
use crate::exec::ProcessRunner;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub use fdtget::FdtgetAccessor;
pub use node::FitNode;

/// Query interface over one tree blob.
pub trait TreeAccessor {
    /// Child node names of `path`, in blob order.
    fn list_children(&self, path: &str) -> Result<Vec<String>, AccessorError>;

    /// Property rendered as text, trailing newline stripped.
    fn get_property(&self, node: &str, property: &str) -> Result<String, AccessorError>;

    /// Property bytes as one lowercase hex string with no separators.
    fn get_property_hex(&self, node: &str, property: &str) -> Result<String, AccessorError>;

    /// Property as a typed value.
    fn get_property_value(
        &self,
        node: &str,
        property: &str,
    ) -> Result<PropertyValue, AccessorError>;
}

/// Typed property contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyValue {
    String(String),
    StringList(Vec<String>),
    Bytes(Vec<u8>),
}

impl PropertyValue {
    /// Classify raw property bytes the way `fdtget` guesses types: a run of
    /// printable NUL-terminated strings is text, anything else is bytes.
    pub fn from_raw(data: &[u8]) -> Self {
        match split_strings(data) {
            Some(mut strings) if strings.len() == 1 => PropertyValue::String(strings.remove(0)),
            Some(strings) => PropertyValue::StringList(strings),
            None => PropertyValue::Bytes(data.to_vec()),
        }
    }

    /// Render as `fdtget` does by default: strings joined by a space, 4-byte
    /// aligned data as decimal cells, other data as decimal bytes.
    pub fn render(&self) -> String {
        match self {
            PropertyValue::String(s) => s.clone(),
            PropertyValue::StringList(list) => list.join(" "),
            PropertyValue::Bytes(data) if data.len() % 4 == 0 => data
                .chunks_exact(4)
                .map(|c| u32::from_be_bytes([c[0], c[1], c[2], c[3]]).to_string())
                .collect::<Vec<_>>()
                .join(" "),
            PropertyValue::Bytes(data) => data
                .iter()
                .map(|b| b.to_string())
                .collect::<Vec<_>>()
                .join(" "),
        }
    }

    /// Raw encoding of the value as stored in the blob.
    pub fn to_raw(&self) -> Vec<u8> {
        match self {
            PropertyValue::String(s) => {
                let mut raw = s.as_bytes().to_vec();
                raw.push(0);
                raw
            }
            PropertyValue::StringList(list) => list
                .iter()
                .flat_map(|s| s.as_bytes().iter().copied().chain(std::iter::once(0)))
                .collect(),
            PropertyValue::Bytes(data) => data.clone(),
        }
    }
}

fn split_strings(data: &[u8]) -> Option<Vec<String>> {
    let (last, body) = data.split_last()?;
    if *last != 0 {
        return None;
    }
    body.split(|b| *b == 0)
        .map(|segment| {
            if segment.is_empty() || !segment.iter().all(|b| is_printable(*b)) {
                return None;
            }
            std::str::from_utf8(segment).ok().map(str::to_string)
        })
        .collect()
}

fn is_printable(b: u8) -> bool {
    b.is_ascii_graphic() || b == b' ' || b == b'\t' || b == b'\n' || b == b'\r'
}

/// Accessor backend selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// Query through the external `fdtget` tool
    #[default]
    Fdtget,
    /// Parse the blob in-process
    Native,
}

impl std::str::FromStr for Backend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fdtget" => Ok(Backend::Fdtget),
            "native" => Ok(Backend::Native),
            other => Err(format!(
                "Invalid backend: {} (must be 'fdtget' or 'native')",
                other
            )),
        }
    }
}

/// Open `blob` with the chosen backend. A missing blob fails here for both.
pub fn open<'a, R: ProcessRunner + 'a>(
    backend: Backend,
    blob: &Path,
    fdtget: &str,
    runner: R,
) -> Result<Box<dyn TreeAccessor + 'a>, AccessorError> {
    let blob = path::canonicalize_blob_path(blob)?;
    match backend {
        Backend::Fdtget => Ok(Box::new(FdtgetAccessor::new(runner, fdtget, blob))),
        Backend::Native => Ok(Box::new(FitNode::load(&blob)?)),
    }
}

//! Node path and blob path utilities

use crate::error::AccessorError;
use std::path::{Path, PathBuf};

/// Canonicalize a blob path so log lines and reports name one file consistently.
pub fn canonicalize_blob_path(path: &Path) -> Result<PathBuf, AccessorError> {
    dunce::canonicalize(path).map_err(AccessorError::Io)
}

/// Normalize a node path: collapse repeated separators, drop a trailing
/// slash, and keep `/` for the root.
pub fn normalize_node_path(path: &str) -> String {
    let segments = segments(path);
    if segments.is_empty() {
        return "/".to_string();
    }
    format!("/{}", segments.join("/"))
}

/// Absolute path of `child` under `parent`.
pub fn join(parent: &str, child: &str) -> String {
    let parent = normalize_node_path(parent);
    if parent == "/" {
        format!("/{}", child)
    } else {
        format!("{}/{}", parent, child)
    }
}

/// Non-empty path segments.
pub fn segments(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

/// Match a path segment against a node name with libfdt rules: an exact
/// match, or a segment without a unit address matching the name before `@`.
pub fn segment_matches(segment: &str, name: &str) -> bool {
    if segment == name {
        return true;
    }
    !segment.contains('@') && name.split('@').next() == Some(segment)
}

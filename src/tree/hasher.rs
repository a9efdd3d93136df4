//! Blob fingerprints using BLAKE3

use blake3::Hasher;
use std::path::Path;

/// Fingerprint a blob file as lowercase hex, streaming its content.
///
/// Reports carry it so repeated runs against the same blob can be matched.
pub fn fingerprint_file(path: &Path) -> std::io::Result<String> {
    let mut file = std::fs::File::open(path)?;
    let mut hasher = Hasher::new();
    std::io::copy(&mut file, &mut hasher)?;
    Ok(hasher.finalize().to_hex().to_string())
}

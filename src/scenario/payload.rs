//! Synthetic kernel payload

use crate::error::ScenarioError;
use std::path::Path;

/// Fixed-length buffer filled with one non-zero byte.
///
/// The fill byte cannot be zero: crc16-ccitt of an all-zero buffer is zero,
/// which would hide a broken checksum implementation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payload {
    bytes: Vec<u8>,
}

impl Payload {
    pub fn filled(len: usize, fill: u8) -> Result<Self, ScenarioError> {
        if fill == 0 {
            return Err(ScenarioError::ZeroFillByte);
        }
        Ok(Self {
            bytes: vec![fill; len],
        })
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn write_to(&self, path: &Path) -> Result<(), ScenarioError> {
        std::fs::write(path, &self.bytes)?;
        Ok(())
    }
}

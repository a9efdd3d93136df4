//! Digest verification against an oracle table.

pub mod oracle;
pub mod verifier;

pub use oracle::OracleTable;
pub use verifier::{
    HashCheck, HashVerifier, ImageReport, Selection, VerificationReport, IMAGES_PATH,
};

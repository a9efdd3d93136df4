//! Fitcheck: FIT Image Digest Verification
//!
//! Reads the hash subnodes that `mkimage` embeds in a Flattened Image Tree,
//! checks every digest against known-good values, and drives an end-to-end
//! scenario that builds a FIT with the device-tree toolchain and verifies it.

pub mod cli;
pub mod config;
pub mod error;
pub mod exec;
pub mod logging;
pub mod scenario;
pub mod tree;
pub mod verify;

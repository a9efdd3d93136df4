//! Property-based tests for tree decoding

mod blob_parsing;

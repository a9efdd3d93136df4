//! Integration tests for fitcheck

mod accessor_parity;
mod scenario_end_to_end;
mod test_utils;
mod verify_blob;

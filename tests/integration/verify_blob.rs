//! Verifier tests against FIT blobs on disk.

use super::test_utils::{write_fit, FakeToolchain, FitShape};
use fitcheck::error::VerifyError;
use fitcheck::tree::{self, Backend, FdtgetAccessor, FitNode};
use fitcheck::verify::{HashVerifier, OracleTable};
use tempfile::TempDir;

#[test]
fn test_good_fit_verifies_via_fdtget() {
    let temp = TempDir::new().unwrap();
    let fit = write_fit(temp.path(), FitShape::Good);
    let fake = FakeToolchain::new(FitShape::Good);
    let accessor = FdtgetAccessor::new(&fake, "fdtget", &fit);

    let mut verifier = HashVerifier::new();
    let nodes = verifier.find_hashable_image_nodes(&accessor).unwrap();
    assert_eq!(nodes.len(), 1);
    assert!(nodes.contains("/images/kernel@1"));

    let report = verifier
        .verify_hashes(&accessor, &OracleTable::kernel())
        .unwrap();
    assert_eq!(report.digest_count(), 7);
    let crc16 = report.images[0]
        .checks
        .iter()
        .find(|c| c.algo == "crc16-ccitt")
        .unwrap();
    assert_eq!(crc16.node, "hash-0");
    assert_eq!(crc16.digest, "d4be");
}

#[test]
fn test_backends_agree_on_report() {
    let temp = TempDir::new().unwrap();
    let fit = write_fit(temp.path(), FitShape::Good);
    let fake = FakeToolchain::new(FitShape::Good);
    let oracle = OracleTable::kernel();

    let mut reports = Vec::new();
    for backend in [Backend::Fdtget, Backend::Native] {
        let accessor = tree::open(backend, &fit, "fdtget", &fake).unwrap();
        let mut verifier = HashVerifier::new();
        verifier.find_hashable_image_nodes(&*accessor).unwrap();
        reports.push(verifier.verify_hashes(&*accessor, &oracle).unwrap());
    }
    assert_eq!(reports[0].images, reports[1].images);
}

#[test]
fn test_flipped_sha1_reports_borked_hash() {
    let temp = TempDir::new().unwrap();
    let fit = write_fit(temp.path(), FitShape::FlipByte("sha1"));
    let tree = FitNode::load(&fit).unwrap();

    let mut verifier = HashVerifier::new();
    verifier.find_hashable_image_nodes(&tree).unwrap();
    let err = verifier
        .verify_hashes(&tree, &OracleTable::kernel())
        .unwrap_err();
    assert_eq!(err.to_string(), "/images/kernel@1 Borked hash: sha1");
}

#[test]
fn test_partial_oracle_rejects_extra_algorithms() {
    let temp = TempDir::new().unwrap();
    let fit = write_fit(temp.path(), FitShape::Good);
    let tree = FitNode::load(&fit).unwrap();
    let oracle = OracleTable::from_entries([("crc32", "32eddfdf")]).unwrap();

    let mut verifier = HashVerifier::new();
    verifier.find_hashable_image_nodes(&tree).unwrap();
    let err = verifier.verify_hashes(&tree, &oracle).unwrap_err();
    assert!(matches!(err, VerifyError::UnknownAlgorithm { .. }));
}

#[test]
fn test_fdt_image_ignored_by_default_selection() {
    let temp = TempDir::new().unwrap();
    let fit = write_fit(temp.path(), FitShape::Good);
    let tree = FitNode::load(&fit).unwrap();

    let mut verifier = HashVerifier::new();
    let nodes = verifier.find_hashable_image_nodes(&tree).unwrap();
    assert!(!nodes.contains("/images/fdt@1"));
}

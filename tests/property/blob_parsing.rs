//! Property tests for blob parsing and verification over parsed blobs

use fitcheck::tree::{blob, FitNode, TreeAccessor};
use fitcheck::verify::{HashVerifier, OracleTable};
use proptest::prelude::*;

fn fit_with_digests(digests: &[(String, Vec<u8>)]) -> FitNode {
    let mut image = FitNode::new("kernel@1").with_bytes("data", &[0xa5; 16]);
    for (i, (algo, value)) in digests.iter().enumerate() {
        image = image.with_child(
            FitNode::new(format!("hash-{}", i))
                .with_bytes("value", value)
                .with_string("algo", algo),
        );
    }
    FitNode::new("").with_child(FitNode::new("images").with_child(image))
}

fn digests() -> impl Strategy<Value = Vec<(String, Vec<u8>)>> {
    proptest::collection::btree_map(
        "[a-z][a-z0-9-]{0,11}",
        proptest::collection::vec(any::<u8>(), 1..64),
        1..8,
    )
    .prop_map(|m| m.into_iter().collect())
}

proptest! {
    /// Arbitrary input is rejected or parsed, never a panic.
    #[test]
    fn test_parse_arbitrary_bytes(data in proptest::collection::vec(any::<u8>(), 0..256)) {
        let _ = blob::parse(&data);
    }

    /// Any strict prefix of a valid blob is rejected.
    #[test]
    fn test_truncated_blob_rejected(digests in digests(), cut in any::<prop::sample::Index>()) {
        let dtb = fit_with_digests(&digests).to_dtb();
        let len = cut.index(dtb.len());
        prop_assert!(blob::parse(&dtb[..len]).is_err());
    }

    /// Digests written into a blob read back as their hex encoding.
    #[test]
    fn test_digest_hex_read_back(digests in digests()) {
        let tree = blob::parse(&fit_with_digests(&digests).to_dtb()).unwrap();
        for (i, (_, value)) in digests.iter().enumerate() {
            let node = format!("/images/kernel@1/hash-{}", i);
            prop_assert_eq!(tree.get_property_hex(&node, "value").unwrap(), hex::encode(value));
        }
    }

    /// A blob verifies against an oracle built from its own digests.
    #[test]
    fn test_blob_verifies_against_own_digests(digests in digests()) {
        let tree = blob::parse(&fit_with_digests(&digests).to_dtb()).unwrap();
        let oracle = OracleTable::from_entries(
            digests.iter().map(|(algo, value)| (algo.clone(), hex::encode(value))),
        )
        .unwrap();

        let mut verifier = HashVerifier::new();
        verifier.find_hashable_image_nodes(&tree).unwrap();
        let report = verifier.verify_hashes(&tree, &oracle).unwrap();
        prop_assert_eq!(report.digest_count(), digests.len());
    }
}

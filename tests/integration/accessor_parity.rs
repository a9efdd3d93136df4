//! The fdtget and native backends answer every query identically.

use super::test_utils::{write_fit, FakeToolchain, FitShape};
use fitcheck::error::AccessorError;
use fitcheck::tree::{FdtgetAccessor, FitNode, PropertyValue, TreeAccessor};
use tempfile::TempDir;

fn both(temp: &TempDir) -> (FitNode, std::path::PathBuf) {
    let fit = write_fit(temp.path(), FitShape::Good);
    (FitNode::load(&fit).unwrap(), fit)
}

#[test]
fn test_list_children_matches() {
    let temp = TempDir::new().unwrap();
    let (native, fit) = both(&temp);
    let fake = FakeToolchain::new(FitShape::Good);
    let external = FdtgetAccessor::new(&fake, "fdtget", &fit);

    for path in ["/", "/images", "/images/kernel@1", "/configurations"] {
        assert_eq!(
            native.list_children(path).unwrap(),
            external.list_children(path).unwrap(),
            "children of {}",
            path
        );
    }
    assert_eq!(
        native.list_children("/images").unwrap(),
        vec!["kernel@1", "fdt@1"]
    );
}

#[test]
fn test_property_queries_match() {
    let temp = TempDir::new().unwrap();
    let (native, fit) = both(&temp);
    let fake = FakeToolchain::new(FitShape::Good);
    let external = FdtgetAccessor::new(&fake, "fdtget", &fit);

    let node = "/images/kernel@1/hash-1";
    assert_eq!(
        native.get_property(node, "algo").unwrap(),
        external.get_property(node, "algo").unwrap()
    );
    assert_eq!(external.get_property(node, "algo").unwrap(), "crc32");
    assert_eq!(
        native.get_property_hex(node, "value").unwrap(),
        external.get_property_hex(node, "value").unwrap()
    );
    assert_eq!(external.get_property_hex(node, "value").unwrap(), "32eddfdf");
    assert_eq!(
        external.get_property_value("/configurations", "default").unwrap(),
        PropertyValue::String("conf@1".to_string())
    );
}

#[test]
fn test_leading_zero_bytes_survive_fdtget_tokens() {
    let temp = TempDir::new().unwrap();
    let (_, fit) = both(&temp);
    let fake = FakeToolchain::new(FitShape::Good);
    let external = FdtgetAccessor::new(&fake, "fdtget", &fit);

    // timestamp is 65 00 00 00; fdtget prints "65 0 0 0"
    assert_eq!(external.get_property_hex("/", "timestamp").unwrap(), "65000000");
}

#[test]
fn test_missing_lookups_match() {
    let temp = TempDir::new().unwrap();
    let (native, fit) = both(&temp);
    let fake = FakeToolchain::new(FitShape::Good);
    let external = FdtgetAccessor::new(&fake, "fdtget", &fit);

    assert!(matches!(
        native.list_children("/images/ramdisk@1"),
        Err(AccessorError::NodeNotFound(_))
    ));
    assert!(matches!(
        external.list_children("/images/ramdisk@1"),
        Err(AccessorError::NodeNotFound(_))
    ));
    assert!(matches!(
        external.get_property("/images/kernel@1", "load"),
        Err(AccessorError::PropertyNotFound { .. })
    ));
}

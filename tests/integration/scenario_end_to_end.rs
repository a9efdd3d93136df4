//! End-to-end scenario tests: build a FIT through the (fake) toolchain and
//! verify it with both accessor backends.

use super::test_utils::{templates_dir, FakeToolchain, FitShape};
use fitcheck::config::{ScenarioConfig, ToolsConfig, VerifyConfig};
use fitcheck::error::{ScenarioError, VerifyError};
use fitcheck::scenario::Scenario;
use fitcheck::tree::Backend;
use fitcheck::verify::OracleTable;
use std::collections::BTreeSet;
use tempfile::TempDir;

fn run(
    shape: FitShape,
    backend: Backend,
    config: ScenarioConfig,
) -> Result<fitcheck::scenario::ScenarioOutcome, ScenarioError> {
    let fake = FakeToolchain::new(shape);
    let tools = ToolsConfig::default();
    let verify = VerifyConfig {
        backend,
        ..Default::default()
    };
    Scenario::new(&config, &tools, &verify, &fake).run(&OracleTable::kernel())
}

fn config() -> ScenarioConfig {
    ScenarioConfig {
        template_dir: templates_dir(),
        ..Default::default()
    }
}

#[test]
fn test_scenario_passes_with_fdtget_backend() {
    let outcome = run(FitShape::Good, Backend::Fdtget, config()).unwrap();
    assert_eq!(outcome.report.images.len(), 1);
    assert_eq!(outcome.report.images[0].image, "/images/kernel@1");
    assert_eq!(outcome.report.digest_count(), 7);
    assert!(outcome.report.fingerprint.is_some());
    assert!(!outcome.kept());
    assert!(outcome.fit_path.is_none());
}

#[test]
fn test_scenario_passes_with_native_backend() {
    let outcome = run(FitShape::Good, Backend::Native, config()).unwrap();
    let algos: BTreeSet<&str> = outcome.report.images[0].algorithms();
    assert_eq!(
        algos.into_iter().map(str::to_string).collect::<BTreeSet<_>>(),
        OracleTable::kernel().algorithms()
    );
}

#[test]
fn test_scenario_invokes_tools_in_order() {
    let fake = FakeToolchain::new(FitShape::Good);
    let config = config();
    let tools = ToolsConfig::default();
    let verify = VerifyConfig::default();
    Scenario::new(&config, &tools, &verify, &fake)
        .run(&OracleTable::kernel())
        .unwrap();

    let programs = fake.programs();
    assert_eq!(programs[0], "dtc");
    assert_eq!(programs[1], "mkimage");
    assert!(programs[2..].iter().all(|p| p == "fdtget"));

    let calls = fake.calls.borrow();
    let mkimage_args = &calls[1].1;
    assert_eq!(mkimage_args[0], "-D");
    assert!(mkimage_args[1].starts_with("-I dts -O dtb -i "));
    assert_eq!(mkimage_args[2], "-f");
    assert!(mkimage_args[3].ends_with("hash-images.its"));
    assert!(mkimage_args[4].ends_with("test.fit"));
}

#[test]
fn test_flipped_digest_byte_fails() {
    let err = run(FitShape::FlipByte("sha256"), Backend::Fdtget, config()).unwrap_err();
    match err {
        ScenarioError::Verify(VerifyError::HashMismatch { image, algo }) => {
            assert_eq!(image, "/images/kernel@1");
            assert_eq!(algo, "sha256");
        }
        other => panic!("expected hash mismatch, got {}", other),
    }
}

#[test]
fn test_wrong_fill_byte_fails() {
    let config = ScenarioConfig {
        fill_byte: 0x5a,
        ..config()
    };
    let err = run(FitShape::Good, Backend::Native, config).unwrap_err();
    assert!(matches!(
        err,
        ScenarioError::Verify(VerifyError::HashMismatch { .. })
    ));
}

#[test]
fn test_missing_algorithm_fails_coverage() {
    let err = run(FitShape::DropAlgo("sha384"), Backend::Fdtget, config()).unwrap_err();
    match err {
        ScenarioError::Verify(VerifyError::IncompleteCoverage { image, missing }) => {
            assert_eq!(image, "/images/kernel@1");
            assert_eq!(missing, BTreeSet::from(["sha384".to_string()]));
        }
        other => panic!("expected incomplete coverage, got {}", other),
    }
}

#[test]
fn test_no_kernel_image_fails() {
    let err = run(FitShape::NoKernel, Backend::Native, config()).unwrap_err();
    assert!(matches!(
        err,
        ScenarioError::Verify(VerifyError::NoHashableNodes)
    ));
    assert_eq!(
        err.to_string(),
        "FIT image has no \"/images\" nodes with \"hash-...\""
    );
}

#[test]
fn test_tool_failure_surfaces() {
    let err = run(FitShape::Broken, Backend::Native, config()).unwrap_err();
    match err {
        ScenarioError::Tool(e) => assert!(e.to_string().contains("mkimage")),
        other => panic!("expected tool failure, got {}", other),
    }
}

#[test]
fn test_keep_dir_retains_artifacts() {
    let temp = TempDir::new().unwrap();
    let keep = temp.path().join("hashes");
    let config = ScenarioConfig {
        work_dir: Some(keep.clone()),
        ..config()
    };
    let outcome = run(FitShape::Good, Backend::Native, config).unwrap();
    assert!(outcome.kept());
    assert_eq!(outcome.fit_path, Some(keep.join("test.fit")));
    assert!(keep.join("test.fit").is_file());
    assert!(keep.join("sandbox-kernel.dtb").is_file());

    let payload = std::fs::read(keep.join("test-kernel.bin")).unwrap();
    assert_eq!(payload, vec![0xa5; 500]);
}

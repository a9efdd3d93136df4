//! Scenario Harness
//!
//! Builds one FIT end to end and verifies it: write a synthetic payload,
//! compile the device tree it embeds, assemble the image with `mkimage`, then
//! run the hash verifier over the result. Any failure fails the scenario.

pub mod payload;
pub mod toolchain;

use crate::config::{ToolsConfig, VerifyConfig};
use crate::error::ScenarioError;
use crate::exec::ProcessRunner;
use crate::tree;
use crate::tree::hasher::fingerprint_file;
use crate::verify::{HashVerifier, OracleTable, VerificationReport};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::{debug, info};

pub use payload::Payload;
pub use toolchain::{dtb_name, ToolStatus, Toolchain};

/// Scenario inputs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioConfig {
    /// Directory holding the image description and device-tree source
    #[serde(default = "default_template_dir")]
    pub template_dir: PathBuf,

    /// Image description consumed by `mkimage`
    #[serde(default = "default_its")]
    pub its: String,

    /// Device-tree source compiled before assembly
    #[serde(default = "default_kernel_dts")]
    pub kernel_dts: String,

    /// Payload file name referenced by the image description
    #[serde(default = "default_payload_name")]
    pub payload_name: String,

    #[serde(default = "default_payload_len")]
    pub payload_len: usize,

    #[serde(default = "default_fill_byte")]
    pub fill_byte: u8,

    /// Output FIT file name
    #[serde(default = "default_fit_name")]
    pub fit_name: String,

    /// Persistent work directory; a fresh temporary directory when unset
    #[serde(default)]
    pub work_dir: Option<PathBuf>,
}

fn default_template_dir() -> PathBuf {
    PathBuf::from("templates")
}

fn default_its() -> String {
    "hash-images.its".to_string()
}

fn default_kernel_dts() -> String {
    "sandbox-kernel.dts".to_string()
}

fn default_payload_name() -> String {
    "test-kernel.bin".to_string()
}

fn default_payload_len() -> usize {
    500
}

fn default_fill_byte() -> u8 {
    0xa5
}

fn default_fit_name() -> String {
    "test.fit".to_string()
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            template_dir: default_template_dir(),
            its: default_its(),
            kernel_dts: default_kernel_dts(),
            payload_name: default_payload_name(),
            payload_len: default_payload_len(),
            fill_byte: default_fill_byte(),
            fit_name: default_fit_name(),
            work_dir: None,
        }
    }
}

impl ScenarioConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.fill_byte == 0 {
            return Err("fill_byte must not be zero".to_string());
        }
        if self.payload_len == 0 {
            return Err("payload_len must be positive".to_string());
        }
        if self.its.is_empty() || self.kernel_dts.is_empty() {
            return Err("its and kernel_dts must be set".to_string());
        }
        Ok(())
    }
}

/// Successful scenario run.
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioOutcome {
    /// Generated FIT, set only when the work directory outlives the run
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fit_path: Option<PathBuf>,
    pub report: VerificationReport,
}

impl ScenarioOutcome {
    pub fn kept(&self) -> bool {
        self.fit_path.is_some()
    }
}

enum WorkDir {
    Temp(TempDir),
    Persistent(PathBuf),
}

impl WorkDir {
    fn path(&self) -> &Path {
        match self {
            WorkDir::Temp(dir) => dir.path(),
            WorkDir::Persistent(path) => path,
        }
    }
}

/// One end-to-end build and verification.
pub struct Scenario<'a, R: ProcessRunner> {
    config: &'a ScenarioConfig,
    tools: &'a ToolsConfig,
    verify: &'a VerifyConfig,
    runner: R,
}

impl<'a, R: ProcessRunner> Scenario<'a, R> {
    pub fn new(
        config: &'a ScenarioConfig,
        tools: &'a ToolsConfig,
        verify: &'a VerifyConfig,
        runner: R,
    ) -> Self {
        Self {
            config,
            tools,
            verify,
            runner,
        }
    }

    fn template(&self, name: &str) -> Result<PathBuf, ScenarioError> {
        let path = self.config.template_dir.join(name);
        if !path.is_file() {
            return Err(ScenarioError::TemplateNotFound(path));
        }
        Ok(path)
    }

    fn work_dir(&self) -> Result<WorkDir, ScenarioError> {
        match &self.config.work_dir {
            Some(path) => {
                std::fs::create_dir_all(path)?;
                Ok(WorkDir::Persistent(path.clone()))
            }
            None => Ok(WorkDir::Temp(
                tempfile::Builder::new().prefix("fitcheck-").tempdir()?,
            )),
        }
    }

    /// Build the FIT and verify it against `oracle`.
    pub fn run(&self, oracle: &OracleTable) -> Result<ScenarioOutcome, ScenarioError> {
        let payload = Payload::filled(self.config.payload_len, self.config.fill_byte)?;
        let its = self.template(&self.config.its)?;
        self.template(&self.config.kernel_dts)?;

        let work = self.work_dir()?;
        let work_path = work.path();
        debug!(work_dir = %work_path.display(), "Scenario work directory");

        let toolchain = Toolchain::new(&self.runner, self.tools);
        toolchain.dtc(&self.config.template_dir, &self.config.kernel_dts, work_path)?;

        payload.write_to(&work_path.join(&self.config.payload_name))?;
        debug!(
            len = payload.len(),
            fill = self.config.fill_byte,
            "Wrote payload"
        );

        let fit_path = work_path.join(&self.config.fit_name);
        toolchain.assemble_fit_image(&fit_path, &its, work_path)?;

        let report = self.verify_fit(&fit_path, oracle)?;
        info!(
            fit = %fit_path.display(),
            images = report.images.len(),
            digests = report.digest_count(),
            "Scenario passed"
        );

        let fit_path = match work {
            WorkDir::Persistent(_) => Some(fit_path),
            WorkDir::Temp(_) => None,
        };
        Ok(ScenarioOutcome { fit_path, report })
    }

    fn verify_fit(
        &self,
        fit_path: &Path,
        oracle: &OracleTable,
    ) -> Result<VerificationReport, ScenarioError> {
        let accessor = tree::open(self.verify.backend, fit_path, &self.tools.fdtget, &self.runner)?;
        let mut verifier = HashVerifier::with_selection(self.verify.selection());
        verifier.find_hashable_image_nodes(&*accessor)?;
        let report = verifier.verify_hashes(&*accessor, oracle)?;
        Ok(report.with_fingerprint(fingerprint_file(fit_path)?))
    }
}

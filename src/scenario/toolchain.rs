//! External device-tree tools: `dtc` and `mkimage`

use crate::config::ToolsConfig;
use crate::error::ProcessError;
use crate::exec::{tool_available, ProcessRunner};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::info;

/// Availability of one configured tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolStatus {
    pub tool: String,
    pub program: String,
    pub available: bool,
}

/// Tool invocations used to build a FIT.
pub struct Toolchain<'a, R: ProcessRunner> {
    runner: R,
    tools: &'a ToolsConfig,
}

impl<'a, R: ProcessRunner> Toolchain<'a, R> {
    pub fn new(runner: R, tools: &'a ToolsConfig) -> Self {
        Self { runner, tools }
    }

    /// Compile `source_dir/dts` to `out_dir/<stem>.dtb`.
    pub fn dtc(&self, source_dir: &Path, dts: &str, out_dir: &Path) -> Result<PathBuf, ProcessError> {
        let dtb = out_dir.join(dtb_name(dts));
        let args = vec![
            source_dir.join(dts).to_string_lossy().into_owned(),
            "-O".to_string(),
            "dtb".to_string(),
            "-o".to_string(),
            dtb.to_string_lossy().into_owned(),
        ];
        self.runner.run(&self.tools.dtc, &args)?;
        info!(dtb = %dtb.display(), "Compiled device tree");
        Ok(dtb)
    }

    /// Assemble `dest_fit` from an image description, resolving `/incbin/`
    /// references against `include_dir`.
    pub fn assemble_fit_image(
        &self,
        dest_fit: &Path,
        its: &Path,
        include_dir: &Path,
    ) -> Result<(), ProcessError> {
        let dtc_args = format!("-I dts -O dtb -i {}", include_dir.display());
        let args = vec![
            "-D".to_string(),
            dtc_args,
            "-f".to_string(),
            its.to_string_lossy().into_owned(),
            dest_fit.to_string_lossy().into_owned(),
        ];
        self.runner.run(&self.tools.mkimage, &args)?;
        info!(fit = %dest_fit.display(), "Assembled FIT image");
        Ok(())
    }

    /// Probe each configured tool.
    pub fn preflight(&self) -> Vec<ToolStatus> {
        [
            ("dtc", &self.tools.dtc),
            ("mkimage", &self.tools.mkimage),
            ("fdtget", &self.tools.fdtget),
        ]
        .into_iter()
        .map(|(tool, program)| ToolStatus {
            tool: tool.to_string(),
            program: program.clone(),
            available: tool_available(&self.runner, program),
        })
        .collect()
    }
}

/// `sandbox-kernel.dts` → `sandbox-kernel.dtb`
pub fn dtb_name(dts: &str) -> String {
    match dts.strip_suffix(".dts") {
        Some(stem) => format!("{}.dtb", stem),
        None => format!("{}.dtb", dts),
    }
}

//! Process Execution
//!
//! Blocking invocation of the external device-tree tools (`dtc`, `mkimage`,
//! `fdtget`). Each call captures stdout; a non-zero exit is an error carrying
//! the tool's stderr.

use crate::error::ProcessError;
use std::process::Command;
use tracing::debug;

/// Runs an external program to completion and returns its stdout.
pub trait ProcessRunner {
    fn run(&self, program: &str, args: &[String]) -> Result<String, ProcessError>;
}

impl<R: ProcessRunner + ?Sized> ProcessRunner for &R {
    fn run(&self, program: &str, args: &[String]) -> Result<String, ProcessError> {
        (**self).run(program, args)
    }
}

/// Runner backed by `std::process::Command`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl ProcessRunner for SystemRunner {
    fn run(&self, program: &str, args: &[String]) -> Result<String, ProcessError> {
        debug!(program, args = %args.join(" "), "Executing");
        let output = Command::new(program)
            .args(args)
            .output()
            .map_err(|source| ProcessError::Spawn {
                program: program.to_string(),
                source,
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            debug!(program, status = %output.status, %stderr, "Command failed");
            return Err(ProcessError::Failed {
                program: program.to_string(),
                status: output.status.to_string(),
                stderr,
            });
        }

        String::from_utf8(output.stdout).map_err(|_| ProcessError::InvalidOutput {
            program: program.to_string(),
        })
    }
}

/// Check whether `program` can be spawned at all.
///
/// Tools are probed by running them with `--version`; only a spawn failure
/// counts as missing, since some tools exit non-zero for `--version`.
pub fn tool_available<R: ProcessRunner>(runner: &R, program: &str) -> bool {
    !matches!(
        runner.run(program, &["--version".to_string()]),
        Err(ProcessError::Spawn { .. })
    )
}

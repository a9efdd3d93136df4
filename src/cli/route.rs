//! CLI route: single route table and run context. Dispatches to domain services and presentation.

use crate::cli::command_name;
use crate::cli::parse::Commands;
use crate::cli::presentation::{
    format_doctor_result, format_get_result, format_ls_result, format_oracle_result,
    format_report, format_scenario_result,
};
use crate::config::{ConfigLoader, FitcheckConfig};
use crate::error::ApiError;
use crate::exec::{ProcessRunner, SystemRunner};
use crate::scenario::{Scenario, Toolchain};
use crate::tree::hasher::fingerprint_file;
use crate::tree::{self, Backend, TreeAccessor};
use crate::verify::{HashVerifier, OracleTable};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info};

/// Runtime context for CLI execution: workspace, loaded config, and the
/// process runner used for external tools.
pub struct RunContext<R: ProcessRunner = SystemRunner> {
    workspace_root: PathBuf,
    config: FitcheckConfig,
    runner: R,
}

impl RunContext<SystemRunner> {
    /// Create run context from workspace root and optional config path. Uses ConfigLoader only.
    pub fn new(workspace_root: PathBuf, config_path: Option<PathBuf>) -> Result<Self, ApiError> {
        let config = if let Some(ref cfg_path) = config_path {
            ConfigLoader::load_from_file(cfg_path)?
        } else {
            ConfigLoader::load(&workspace_root)?
        };
        Ok(Self::with_config(workspace_root, config.validated()?, SystemRunner))
    }
}

impl<R: ProcessRunner> RunContext<R> {
    pub fn with_config(workspace_root: PathBuf, config: FitcheckConfig, runner: R) -> Self {
        Self {
            workspace_root,
            config,
            runner,
        }
    }

    /// Execute a command and return its rendered output.
    pub fn execute(&self, command: &Commands) -> Result<String, ApiError> {
        let started = Instant::now();
        let name = command_name(command);
        debug!(command = name, "Dispatching command");

        let result = self.dispatch(command);
        info!(
            command = name,
            ok = result.is_ok(),
            duration_ms = started.elapsed().as_millis() as u64,
            "Command finished"
        );
        result
    }

    fn dispatch(&self, command: &Commands) -> Result<String, ApiError> {
        match command {
            Commands::Verify {
                fit,
                backend,
                oracle,
                image_pattern,
                format,
            } => self.handle_verify(
                fit,
                backend.as_deref(),
                oracle.as_deref(),
                image_pattern.as_deref(),
                format,
            ),
            Commands::Ls { fit, path, backend } => {
                let accessor = self.open(fit, backend.as_deref())?;
                let children = accessor.list_children(path)?;
                Ok(format_ls_result(&children))
            }
            Commands::Get {
                fit,
                node,
                property,
                hex,
                backend,
            } => {
                let accessor = self.open(fit, backend.as_deref())?;
                let value = if *hex {
                    accessor.get_property_hex(node, property)?
                } else {
                    accessor.get_property(node, property)?
                };
                Ok(format_get_result(&value))
            }
            Commands::Oracle { oracle, format } => {
                let table = self.oracle(oracle.as_deref())?;
                format_oracle_result(&table, format)
            }
            Commands::Scenario {
                fill_byte,
                keep,
                templates,
                backend,
                format,
            } => self.handle_scenario(
                *fill_byte,
                keep.as_deref(),
                templates.as_deref(),
                backend.as_deref(),
                format,
            ),
            Commands::Doctor { format } => {
                let statuses = Toolchain::new(&self.runner, &self.config.tools).preflight();
                format_doctor_result(&statuses, format)
            }
        }
    }

    fn handle_verify(
        &self,
        fit: &Path,
        backend: Option<&str>,
        oracle: Option<&Path>,
        image_pattern: Option<&str>,
        format: &str,
    ) -> Result<String, ApiError> {
        let table = self.oracle(oracle)?;
        let mut selection = self.config.verify.selection();
        if let Some(pattern) = image_pattern {
            selection.image_pattern = pattern.to_string();
        }

        let accessor = self.open(fit, backend)?;
        let mut verifier = HashVerifier::with_selection(selection);
        verifier.find_hashable_image_nodes(&*accessor)?;
        let report = verifier
            .verify_hashes(&*accessor, &table)?
            .with_fingerprint(fingerprint_file(fit)?);
        format_report(&report, format)
    }

    fn handle_scenario(
        &self,
        fill_byte: Option<u8>,
        keep: Option<&Path>,
        templates: Option<&Path>,
        backend: Option<&str>,
        format: &str,
    ) -> Result<String, ApiError> {
        let mut scenario_config = self.config.scenario.clone();
        if let Some(fill) = fill_byte {
            scenario_config.fill_byte = fill;
        }
        if let Some(dir) = keep {
            scenario_config.work_dir = Some(dir.to_path_buf());
        }
        if let Some(dir) = templates {
            scenario_config.template_dir = dir.to_path_buf();
        }
        if scenario_config.template_dir.is_relative() {
            scenario_config.template_dir = self.workspace_root.join(&scenario_config.template_dir);
        }

        let mut verify_config = self.config.verify.clone();
        if let Some(b) = backend {
            verify_config.backend = parse_backend(b)?;
        }

        let table = self.oracle(None)?;
        let outcome = Scenario::new(
            &scenario_config,
            &self.config.tools,
            &verify_config,
            &self.runner,
        )
        .run(&table)?;
        format_scenario_result(&outcome, format)
    }

    fn open<'a>(
        &'a self,
        fit: &Path,
        backend: Option<&str>,
    ) -> Result<Box<dyn TreeAccessor + 'a>, ApiError> {
        let backend = match backend {
            Some(b) => parse_backend(b)?,
            None => self.config.verify.backend,
        };
        debug!(fit = %fit.display(), backend = ?backend, "Opening blob");
        Ok(tree::open(
            backend,
            fit,
            &self.config.tools.fdtget,
            &self.runner,
        )?)
    }

    /// Oracle from an explicit file, else the configured one.
    fn oracle(&self, path: Option<&Path>) -> Result<OracleTable, ApiError> {
        match path {
            Some(p) => OracleTable::load(p),
            None => self.config.verify.load_oracle(&self.workspace_root),
        }
    }
}

fn parse_backend(s: &str) -> Result<Backend, ApiError> {
    s.parse::<Backend>().map_err(ApiError::ConfigError)
}

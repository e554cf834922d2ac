// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Pipeline stage drivers.
//!
//! Each stage walks the requested deployments one at a time:
//!
//! ```text
//! Discovered -> PathsResolved -> Skipped(reason)
//!                             -> Processing -> Completed | Failed(error)
//! ```
//!
//! A skipped or failed deployment never stops the remaining ones.

pub mod binary_to_rawnc;
pub mod rawnc_to_timeseries;

use std::fmt;
use std::path::PathBuf;

use tracing::{error, Dispatch};

use crate::backend::GliderBackend;
use crate::config::DataRoot;
use crate::deployment::{locate, DeploymentPaths, LocateError, Mode};
use crate::logging::StageLogger;
use crate::ProcError;

pub use binary_to_rawnc::run as run_binary_to_rawnc;
pub use rawnc_to_timeseries::{run as run_rawnc_to_timeseries, TimeseriesOptions};

/// Everything a stage needs besides its own options.
pub struct StageContext<'a, B: GliderBackend> {
    /// Data tree root
    pub root: &'a DataRoot,
    /// Decode/merge implementation
    pub backend: B,
    /// Log sinks of this stage invocation
    pub logger: &'a StageLogger,
}

impl<'a, B: GliderBackend> StageContext<'a, B> {
    /// Bundle a stage context.
    pub fn new(root: &'a DataRoot, backend: B, logger: &'a StageLogger) -> Self {
        Self {
            root,
            backend,
            logger,
        }
    }
}

/// Terminal state of one deployment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// All work for the deployment ran
    Completed,
    /// Not processed; nothing was written
    Skipped(String),
    /// Processing started and stopped on an error
    Failed(String),
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Completed => f.write_str("completed"),
            Outcome::Skipped(reason) => write!(f, "skipped: {reason}"),
            Outcome::Failed(reason) => write!(f, "failed: {reason}"),
        }
    }
}

/// Input/output file counts of one deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Counts {
    /// Binary files (binary stage) or file groups (timeseries stage)
    pub inputs: usize,
    /// Raw netCDF files (binary stage) or merged files (timeseries stage)
    pub outputs: usize,
}

/// Result of one deployment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentReport {
    /// Deployment name as requested
    pub deployment: String,
    /// Terminal state
    pub outcome: Outcome,
    /// File counts (zero unless processing started)
    pub counts: Counts,
}

impl DeploymentReport {
    fn skipped(deployment: &str, reason: impl Into<String>) -> Self {
        Self {
            deployment: deployment.to_string(),
            outcome: Outcome::Skipped(reason.into()),
            counts: Counts::default(),
        }
    }

    fn finished(deployment: &str, result: Result<Counts, ProcError>) -> Self {
        match result {
            Ok(counts) => Self {
                deployment: deployment.to_string(),
                outcome: Outcome::Completed,
                counts,
            },
            Err(e) => Self {
                deployment: deployment.to_string(),
                outcome: Outcome::Failed(e.to_string()),
                counts: Counts::default(),
            },
        }
    }
}

/// Result of one stage invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StageReport {
    /// One entry per requested deployment, in request order
    pub deployments: Vec<DeploymentReport>,
}

impl StageReport {
    /// True when every deployment completed.
    pub fn all_completed(&self) -> bool {
        self.deployments
            .iter()
            .all(|d| d.outcome == Outcome::Completed)
    }

    /// Process exit status: 0 if every deployment completed, else 1.
    pub fn exit_code(&self) -> i32 {
        if self.all_completed() {
            0
        } else {
            1
        }
    }

    /// Report of a deployment by requested name.
    pub fn get(&self, deployment: &str) -> Option<&DeploymentReport> {
        self.deployments.iter().find(|d| d.deployment == deployment)
    }
}

/// Resolve a deployment and open its stage log.
///
/// Discovery problems are logged to the base sinks at error level and
/// turned into a skip report.
fn open_deployment<B: GliderBackend>(
    ctx: &StageContext<'_, B>,
    base: &Dispatch,
    name: &str,
    mode: Mode,
    required: impl Fn(&DeploymentPaths) -> Vec<(&'static str, PathBuf)>,
) -> Result<(DeploymentPaths, Dispatch), DeploymentReport> {
    tracing::dispatcher::with_default(base, || {
        let paths = locate(name, &ctx.root.deployments_root(), mode).map_err(|e| {
            let err = ProcError::from(e);
            if let ProcError::Locate(
                LocateError::MissingDeployment { .. } | LocateError::MissingDataDir { .. },
            ) = &err
            {
                error!(deployment = name, fields = ?err.log_fields(), "Skipping {name}: {err}");
            }
            DeploymentReport::skipped(name, err.to_string())
        })?;

        for (what, path) in required(&paths) {
            if !path.is_dir() {
                error!(deployment = name, path = %path.display(), "{name} {what} not found");
                return Err(DeploymentReport::skipped(
                    name,
                    ProcError::missing(what, path).to_string(),
                ));
            }
        }

        if !paths.log_dir.is_dir() {
            error!(deployment = name, "{name} deployment proc-logs directory not found");
            return Err(DeploymentReport::skipped(
                name,
                ProcError::missing("proc-logs directory", &paths.log_dir).to_string(),
            ));
        }

        let dispatch = ctx
            .logger
            .deployment(&paths.log_file(ctx.logger.stage()))
            .map_err(|e| {
                error!(deployment = name, "{e}");
                DeploymentReport::skipped(name, e.to_string())
            })?;

        Ok((paths, dispatch))
    })
}

/// Log a warning for each missing optional config input.
fn warn_missing_config(paths: &DeploymentPaths) {
    if !paths.config_dir.is_dir() {
        tracing::warn!(
            "Invalid deployment config root: {}",
            paths.config_dir.display()
        );
    }
    let yaml = paths.deployment_yaml();
    if !yaml.is_file() {
        tracing::warn!("Invalid deployment.yaml file: {}", yaml.display());
    }
    let sensors = paths.sensor_list();
    if !sensors.is_file() {
        tracing::warn!("Invalid sensors.txt file: {}", sensors.display());
    }
}

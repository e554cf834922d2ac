// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Common utilities for CLI commands.

use std::path::PathBuf;

use anyhow::Context as _;
use clap::Args;

use gliderproc::config::{DataRoot, ProcConfig};
use gliderproc::logging::{LogLevel, StageLogger};
use gliderproc::{CommandBackend, Mode, Stage, StageReport};

pub use anyhow::Result as CliResult;
pub type Result<T = ()> = CliResult<T>;

/// Arguments shared by every command.
#[derive(Args, Clone, Debug)]
pub struct DeploymentArgs {
    /// Deployment names, e.g. ru39-20250423T1535
    #[arg(value_name = "DEPLOYMENTS", required = true, num_args = 1..)]
    pub deployments: Vec<String>,

    /// Data mode: rt or delayed
    #[arg(short, long, default_value = "rt")]
    pub mode: Mode,

    /// Log level: debug, info, warning or error
    #[arg(short, long = "loglevel", default_value = "info")]
    pub loglevel: LogLevel,

    /// Use GLIDER_DATA_HOME_TEST instead of GLIDER_DATA_HOME
    #[arg(short, long)]
    pub test: bool,

    /// Optional TOML config file
    #[arg(short, long, env = "GLIDERPROC_CONFIG", value_name = "FILE")]
    pub config: Option<PathBuf>,
}

impl DeploymentArgs {
    /// Load the config file, if any.
    pub fn config(&self) -> Result<ProcConfig> {
        ProcConfig::load_or_default(self.config.as_deref()).context("Loading configuration")
    }

    /// Resolve the data root from the environment.
    pub fn data_root(&self) -> Result<DataRoot> {
        DataRoot::from_env(self.test).context("Resolving data root")
    }
}

/// Everything a stage command needs before its first deployment.
pub struct StageSetup {
    pub config: ProcConfig,
    pub root: DataRoot,
    pub logger: StageLogger,
}

impl StageSetup {
    /// Load config, data root and the stage's log sinks.
    pub fn new(args: &DeploymentArgs, stage: Stage) -> Result<Self> {
        let config = args.config()?;
        let root = args.data_root()?;
        let log_root = config.log_root();
        let logger = StageLogger::new(stage, args.loglevel)
            .with_base_log(&log_root)
            .with_context(|| format!("Opening base log under {}", log_root.display()))?;
        Ok(Self {
            config,
            root,
            logger,
        })
    }

    /// Backend built from the configured programs.
    pub fn backend(&self) -> CommandBackend {
        CommandBackend::new(self.config.decode.clone(), self.config.merge.clone())
    }
}

/// Print one line per deployment and return the exit status.
pub fn print_report(report: &StageReport) -> i32 {
    for entry in &report.deployments {
        println!(
            "{}: {} ({} in, {} out)",
            entry.deployment, entry.outcome, entry.counts.inputs, entry.counts.outputs
        );
    }
    report.exit_code()
}

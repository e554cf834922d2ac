// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Per-stage logging.
//!
//! Nothing here installs a global subscriber. A [`StageLogger`] is built
//! once per stage invocation and handed to the stage, which runs each
//! deployment under its own [`Dispatch`]: stderr, the run-wide base log
//! and the deployment's `proc-logs/` file all receive the same events.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use tracing::Dispatch;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt;

use crate::core::Stage;
use crate::{ProcError, Result};

/// Verbosity accepted on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogLevel {
    /// Everything including backend command output
    Debug,
    /// Progress and counts
    #[default]
    Info,
    /// Missing optional inputs and skipped deployments
    Warning,
    /// Failures only
    Error,
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warning" => Ok(LogLevel::Warning),
            "error" => Ok(LogLevel::Error),
            _ => Err(format!(
                "invalid log level '{s}', expected debug, info, warning or error"
            )),
        }
    }
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Warning => LevelFilter::WARN,
            LogLevel::Error => LevelFilter::ERROR,
        }
    }
}

/// Log sinks of one stage invocation.
#[derive(Debug, Clone)]
pub struct StageLogger {
    stage: Stage,
    level: LevelFilter,
    stderr: bool,
    base_log: Option<(PathBuf, Arc<File>)>,
}

impl StageLogger {
    /// Logger writing to stderr only.
    pub fn new(stage: Stage, level: LogLevel) -> Self {
        Self {
            stage,
            level: level.into(),
            stderr: true,
            base_log: None,
        }
    }

    /// Also append to `<log_root>/<stage>_<YYYYMMDD>.log`, creating `log_root`.
    pub fn with_base_log(mut self, log_root: &Path) -> Result<Self> {
        std::fs::create_dir_all(log_root).map_err(|e| {
            ProcError::config(format!(
                "Cannot create log directory {}: {e}",
                log_root.display()
            ))
        })?;
        let path = log_root.join(format!(
            "{}_{}.log",
            self.stage,
            chrono::Utc::now().format("%Y%m%d")
        ));
        let file = open_append(&path)?;
        self.base_log = Some((path, Arc::new(file)));
        Ok(self)
    }

    /// Disable the stderr sink.
    pub fn without_stderr(mut self) -> Self {
        self.stderr = false;
        self
    }

    /// Stage this logger belongs to.
    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// Path of the base log, if one is open.
    pub fn base_log_path(&self) -> Option<&Path> {
        self.base_log.as_ref().map(|(p, _)| p.as_path())
    }

    /// Dispatch for run-wide events (stderr and base log).
    pub fn base(&self) -> Dispatch {
        self.build(None)
    }

    /// Dispatch for one deployment, additionally appending to `log_file`.
    pub fn deployment(&self, log_file: &Path) -> Result<Dispatch> {
        let file = open_append(log_file)?;
        Ok(self.build(Some(Arc::new(file))))
    }

    fn build(&self, deployment_log: Option<Arc<File>>) -> Dispatch {
        let stderr = self
            .stderr
            .then(|| fmt::layer().with_writer(std::io::stderr).with_target(false));
        let base = self
            .base_log
            .as_ref()
            .map(|(_, file)| fmt::layer().with_writer(file.clone()).with_ansi(false));
        let deployment =
            deployment_log.map(|file| fmt::layer().with_writer(file).with_ansi(false));

        let subscriber = tracing_subscriber::registry()
            .with(self.level)
            .with(stderr)
            .with(base)
            .with(deployment);
        Dispatch::new(subscriber)
    }
}

/// Stderr-only dispatch for commands that run outside a stage.
pub fn stderr_dispatch(level: LogLevel) -> Dispatch {
    let subscriber = fmt::Subscriber::builder()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_max_level(LevelFilter::from(level))
        .finish();
    Dispatch::new(subscriber)
}

fn open_append(path: &Path) -> Result<File> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| ProcError::config(format!("Cannot open log file {}: {e}", path.display())))
}

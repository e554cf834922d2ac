// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Run configuration.
//!
//! Two sources:
//! - [`DataRoot`] comes from `GLIDER_DATA_HOME` (or `GLIDER_DATA_HOME_TEST`)
//! - [`ProcConfig`] is an optional TOML file with backend commands, the
//!   base log directory and profile-detection constants

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::{ProcError, Result};

/// Production data root variable.
pub const DATA_HOME_VAR: &str = "GLIDER_DATA_HOME";

/// Test data root variable.
pub const DATA_HOME_TEST_VAR: &str = "GLIDER_DATA_HOME_TEST";

/// Root of the glider data tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataRoot {
    data_home: PathBuf,
}

impl DataRoot {
    /// Read the data root from the environment.
    ///
    /// `test` selects `GLIDER_DATA_HOME_TEST`; only that one variable is read.
    pub fn from_env(test: bool) -> Result<Self> {
        let var = if test { DATA_HOME_TEST_VAR } else { DATA_HOME_VAR };
        let value = std::env::var_os(var)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| ProcError::config(format!("{var} not set")))?;
        Self::new(PathBuf::from(value)).map_err(|e| match e {
            ProcError::Config { message } => ProcError::config(format!("Invalid {var}: {message}")),
            other => other,
        })
    }

    /// Use an explicit data home. `data_home/deployments` must exist.
    pub fn new(data_home: impl Into<PathBuf>) -> Result<Self> {
        let data_home = data_home.into();
        if !data_home.is_dir() {
            return Err(ProcError::config(format!(
                "{} is not a directory",
                data_home.display()
            )));
        }
        let root = Self { data_home };
        if !root.deployments_root().is_dir() {
            return Err(ProcError::config(format!(
                "Invalid deployments root: {}",
                root.deployments_root().display()
            )));
        }
        Ok(root)
    }

    /// The data home directory itself.
    pub fn data_home(&self) -> &Path {
        &self.data_home
    }

    /// `<data_home>/deployments`
    pub fn deployments_root(&self) -> PathBuf {
        self.data_home.join("deployments")
    }

    /// `<data_home>/cac`, the decoder cache directory.
    pub fn cache_dir(&self) -> PathBuf {
        self.data_home.join("cac")
    }
}

/// External program invocation.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CommandConfig {
    /// Executable name or path
    pub program: String,
    /// Leading arguments, placed before the generated ones
    #[serde(default)]
    pub args: Vec<String>,
}

impl CommandConfig {
    /// Build a command config from a program and its leading arguments.
    pub fn new(program: impl Into<String>, args: &[&str]) -> Self {
        Self {
            program: program.into(),
            args: args.iter().map(|a| a.to_string()).collect(),
        }
    }
}

/// Profile-detection constants handed to the merge backend, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct ProfileSettings {
    /// Smoothing window for profile detection
    pub filter_time: u32,
    /// Minimum profile duration
    pub min_time: u32,
}

/// How raw files are grouped for merging.
///
/// Both use the file name prefix as the group key; they differ in the
/// profile constants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Grouping {
    /// One group per trajectory file pair (30 s / 300 s)
    #[default]
    Trajectory,
    /// One group per segment (30 s / 60 s)
    Segment,
}

impl std::str::FromStr for Grouping {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "trajectory" => Ok(Grouping::Trajectory),
            "segment" => Ok(Grouping::Segment),
            _ => Err(format!(
                "invalid grouping '{s}', expected 'trajectory' or 'segment'"
            )),
        }
    }
}

impl std::fmt::Display for Grouping {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Grouping::Trajectory => f.write_str("trajectory"),
            Grouping::Segment => f.write_str("segment"),
        }
    }
}

/// Profile constants per grouping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ProfileTable {
    /// Used with [`Grouping::Trajectory`]
    pub trajectory: ProfileSettings,
    /// Used with [`Grouping::Segment`]
    pub segment: ProfileSettings,
}

impl Default for ProfileTable {
    fn default() -> Self {
        Self {
            trajectory: ProfileSettings {
                filter_time: 30,
                min_time: 300,
            },
            segment: ProfileSettings {
                filter_time: 30,
                min_time: 60,
            },
        }
    }
}

impl ProfileTable {
    /// Constants for a grouping.
    pub fn for_grouping(&self, grouping: Grouping) -> ProfileSettings {
        match grouping {
            Grouping::Trajectory => self.trajectory,
            Grouping::Segment => self.segment,
        }
    }
}

/// Contents of the optional `gliderproc` TOML file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ProcConfig {
    /// Directory of the run-wide base logs
    pub log_root: Option<PathBuf>,
    /// Decoder program
    pub decode: CommandConfig,
    /// Merge program
    pub merge: CommandConfig,
    /// Profile-detection constants
    pub profiles: ProfileTable,
}

impl Default for ProcConfig {
    fn default() -> Self {
        Self {
            log_root: None,
            decode: CommandConfig::new("python3", &["-m", "rugliderproc.decode"]),
            merge: CommandConfig::new("python3", &["-m", "rugliderproc.merge"]),
            profiles: ProfileTable::default(),
        }
    }
}

impl ProcConfig {
    /// Load a config file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            ProcError::config(format!("Failed to read {}: {e}", path.display()))
        })?;
        Self::parse(&text)
            .map_err(|e| ProcError::config(format!("Invalid {}: {e}", path.display())))
    }

    /// Parse config text.
    pub fn parse(text: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Load `path` if given, otherwise use defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(Self::default()),
        }
    }

    /// Base log directory: configured value, else `$HOME/glider_proc_log`,
    /// else `./glider_proc_log`.
    pub fn log_root(&self) -> PathBuf {
        if let Some(root) = &self.log_root {
            return root.clone();
        }
        std::env::var_os("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."))
            .join("glider_proc_log")
    }
}

// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Canonical directory layout of one deployment.

use std::path::{Path, PathBuf};

use serde::Serialize;

use super::{DeploymentId, Mode};
use crate::core::Stage;

/// Directories of one deployment for one mode.
///
/// Purely derived from the deployments root, the deployment id and the
/// mode. Construction does not touch the filesystem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeploymentPaths {
    /// Parsed deployment id
    #[serde(serialize_with = "serialize_display")]
    pub id: DeploymentId,
    /// Mode the data directories were resolved for
    #[serde(serialize_with = "serialize_display")]
    pub mode: Mode,
    /// `<root>/<YYYY>/<trajectory>`
    pub deployment_dir: PathBuf,
    /// Binary input files
    pub binary_dir: PathBuf,
    /// Raw (per-file) netCDF files
    pub rawnc_dir: PathBuf,
    /// Merged timeseries output
    pub output_dir: PathBuf,
    /// `config/proc`
    pub config_dir: PathBuf,
    /// Per-deployment processing logs
    pub log_dir: PathBuf,
}

fn serialize_display<T: std::fmt::Display, S: serde::Serializer>(
    value: &T,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_str(value)
}

impl DeploymentPaths {
    /// Compute the layout under `deployments_root`.
    pub fn new(deployments_root: &Path, id: DeploymentId, mode: Mode) -> Self {
        let deployment_dir = deployments_root
            .join(format!("{:04}", id.year()))
            .join(id.trajectory());
        let data_in = deployment_dir.join("data").join("in");

        Self {
            binary_dir: data_in.join("binary").join(mode.dir_name()),
            rawnc_dir: data_in.join("rawnc").join(mode.dir_name()),
            output_dir: deployment_dir
                .join("data")
                .join("out")
                .join(mode.as_str())
                .join("qc_queue"),
            config_dir: deployment_dir.join("config").join("proc"),
            log_dir: deployment_dir.join("proc-logs"),
            deployment_dir,
            id,
            mode,
        }
    }

    /// `config/proc/deployment.yml`
    pub fn deployment_yaml(&self) -> PathBuf {
        self.config_dir.join("deployment.yml")
    }

    /// `config/proc/sensors.txt`
    pub fn sensor_list(&self) -> PathBuf {
        self.config_dir.join("sensors.txt")
    }

    /// Log file for one stage, e.g. `ru39-20250423T1535-rt-proc_binary_to_rawnc.log`.
    pub fn log_file(&self, stage: Stage) -> PathBuf {
        self.log_dir.join(format!(
            "{}-{}-{}.log",
            self.id.trajectory(),
            self.mode,
            stage
        ))
    }
}

// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Common utilities for integration tests.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::path::{Path, PathBuf};

use gliderproc::backend::{DecodeRequest, MergeOutcome, MergeRequest};
use gliderproc::config::DataRoot;
use gliderproc::logging::{LogLevel, StageLogger};
use gliderproc::{DeploymentId, DeploymentPaths, GliderBackend, Mode, Series, Stage, Timeseries};

/// Deployment YAML with platform and instrument entries.
pub const DEPLOYMENT_YAML: &str = r#"
metadata:
  glider_name: ru39
  institution: Rutgers University
  wmo_id: 4802989
glider_devices:
  ctd:
    make: Sea-Bird
    model: GPCTD
    serial: "9196"
profile_variables:
  platform:
    long_name: Slocum Glider ru39
    type: platform
  instrument_ctd:
    long_name: Seabird Glider Payload CTD
"#;

// ============================================================================
// Deployment Trees
// ============================================================================

/// A data home in a temp dir holding one deployment.
pub struct DeploymentTree {
    tmp: tempfile::TempDir,
    /// Resolved layout of the deployment
    pub paths: DeploymentPaths,
}

impl DeploymentTree {
    /// Create every directory of `name` for `mode`, plus the cache dir.
    pub fn new(name: &str, mode: Mode) -> Self {
        let tmp = tempfile::tempdir().unwrap();
        let id = DeploymentId::parse(name).unwrap();
        let paths = DeploymentPaths::new(&tmp.path().join("deployments"), id, mode);
        for dir in [
            &paths.binary_dir,
            &paths.rawnc_dir,
            &paths.output_dir,
            &paths.config_dir,
            &paths.log_dir,
        ] {
            std::fs::create_dir_all(dir).unwrap();
        }
        std::fs::create_dir_all(tmp.path().join("cac")).unwrap();
        Self { tmp, paths }
    }

    /// The data home (`GLIDER_DATA_HOME`).
    pub fn data_home(&self) -> &Path {
        self.tmp.path()
    }

    /// Data root over this tree.
    pub fn root(&self) -> DataRoot {
        DataRoot::new(self.data_home()).unwrap()
    }

    /// Deployment name as passed on the command line.
    pub fn name(&self) -> String {
        self.paths.id.to_string()
    }

    /// Write `count` science/flight binary pairs named `<name>-NNN.<suffix>`.
    pub fn add_binary_pairs(&self, count: usize) {
        let (science, flight) = self.paths.mode.suffixes();
        for i in 1..=count {
            for suffix in [science, flight] {
                let file = format!("{}-{i:03}.{suffix}", self.name());
                std::fs::write(self.paths.binary_dir.join(file), b"dbd_label: DBD(dinkum_binary_data)file").unwrap();
            }
        }
    }

    /// Write a file into the binary directory.
    pub fn add_binary(&self, file: &str) {
        std::fs::write(self.paths.binary_dir.join(file), b"").unwrap();
    }

    /// Write `config/proc/deployment.yml`.
    pub fn write_yaml(&self, text: &str) {
        std::fs::write(self.paths.deployment_yaml(), text).unwrap();
    }

    /// Write `config/proc/sensors.txt`.
    pub fn write_sensors(&self) {
        std::fs::write(self.paths.sensor_list(), "sci_water_temp\nm_depth\n").unwrap();
    }

    /// Contents of the deployment's log for `stage`.
    pub fn read_log(&self, stage: Stage) -> String {
        std::fs::read_to_string(self.paths.log_file(stage)).unwrap_or_default()
    }

    /// Sorted file names in `dir`.
    pub fn list(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .collect();
        names.sort();
        names
    }
}

/// Logger without stderr output and without a base log.
pub fn quiet_logger(stage: Stage) -> StageLogger {
    StageLogger::new(stage, LogLevel::Debug).without_stderr()
}

// ============================================================================
// Fake Backend
// ============================================================================

/// In-process stand-in for the external decode/merge toolkit.
///
/// Decoding writes `<binary name>.nc` for every input with a matching
/// suffix, skipping inputs already converted when incremental. Merging
/// returns a two-record timeseries for every group with raw files.
#[derive(Default)]
pub struct FakeBackend {
    /// Number of binary files converted so far
    pub converted: Cell<usize>,
    /// Every merge request, in call order
    pub merges: RefCell<Vec<MergeRequest>>,
    /// Fail every decode call with this message
    pub decode_error: Option<String>,
}

impl FakeBackend {
    pub fn failing(message: &str) -> Self {
        Self {
            decode_error: Some(message.to_string()),
            ..Default::default()
        }
    }

    pub fn merged_groups(&self) -> Vec<String> {
        self.merges.borrow().iter().map(|r| r.group_key.clone()).collect()
    }
}

impl GliderBackend for FakeBackend {
    fn decode(&self, request: &DecodeRequest) -> gliderproc::Result<()> {
        if let Some(message) = &self.decode_error {
            return Err(gliderproc::ProcError::backend("decode", message.clone()));
        }

        let suffixes = [
            format!(".{}", request.science_suffix),
            format!(".{}", request.flight_suffix),
        ];
        for entry in std::fs::read_dir(&request.binary_dir)? {
            let name = entry?.file_name().to_string_lossy().to_string();
            if !suffixes.iter().any(|s| name.ends_with(s.as_str())) {
                continue;
            }
            let output = request.rawnc_dir.join(format!("{name}.nc"));
            if request.incremental && output.exists() {
                continue;
            }
            std::fs::write(&output, b"CDF\x01")?;
            self.converted.set(self.converted.get() + 1);
        }
        Ok(())
    }

    fn merge_group(&self, request: &MergeRequest) -> gliderproc::Result<MergeOutcome> {
        self.merges.borrow_mut().push(request.clone());

        let prefix = format!("{}.", request.group_key);
        let has_files = std::fs::read_dir(&request.rawnc_dir)?
            .filter_map(|e| e.ok())
            .any(|e| e.file_name().to_string_lossy().starts_with(&prefix));
        let filename = format!("{}.nc", request.group_key);
        if !has_files {
            return Ok(MergeOutcome::empty(filename));
        }

        let mut dataset = Timeseries::new(vec![1745422500.0, 1745422530.0]);
        dataset.push_series(Series::new("depth", vec![0.5, 12.25]).with_attribute("units", "m"))?;
        dataset.push_series(Series::new("temperature", vec![18.1, f64::NAN]))?;
        Ok(MergeOutcome {
            dataset: Some(dataset),
            output_filename: filename,
        })
    }
}

/// Path of a file under the raw netCDF directory.
pub fn raw_file(tree: &DeploymentTree, name: &str) -> PathBuf {
    tree.paths.rawnc_dir.join(name)
}

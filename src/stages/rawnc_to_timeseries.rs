// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Raw netCDF → merged timeseries stage.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tracing::{debug, error, info};

use super::{open_deployment, Counts, DeploymentReport, StageContext, StageReport};
use crate::backend::{GliderBackend, MergeRequest};
use crate::config::{Grouping, ProfileSettings};
use crate::deployment::{DeploymentPaths, Mode};
use crate::io::{csv, netcdf, scan};
use crate::timeseries::metadata::DeploymentMetadata;
use crate::{ProcError, Result};

/// Options of one timeseries stage invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeseriesOptions {
    /// Data latency mode
    pub mode: Mode,
    /// Grouping the profile constants belong to
    pub grouping: Grouping,
    /// Profile-detection constants passed to every merge
    pub profile: ProfileSettings,
    /// Also write a CSV next to each netCDF file
    pub write_csv: bool,
}

impl TimeseriesOptions {
    /// Options without CSV output.
    pub fn new(mode: Mode, grouping: Grouping, profile: ProfileSettings) -> Self {
        Self {
            mode,
            grouping,
            profile,
            write_csv: false,
        }
    }

    /// Enable or disable the CSV sibling.
    pub fn with_csv(mut self, write_csv: bool) -> Self {
        self.write_csv = write_csv;
        self
    }
}

/// Merge the raw netCDF files of each deployment into timeseries files.
///
/// `deployment.yml` is required here; a deployment without a readable one
/// is skipped before any output is written.
pub fn run<B: GliderBackend>(
    ctx: &StageContext<'_, B>,
    options: &TimeseriesOptions,
    deployments: &[String],
) -> StageReport {
    let base = ctx.logger.base();
    let mut report = StageReport::default();

    for name in deployments {
        let opened = open_deployment(ctx, &base, name, options.mode, |paths| {
            vec![("output file data directory", paths.output_dir.clone())]
        });
        let (paths, dispatch) = match opened {
            Ok(opened) => opened,
            Err(skipped) => {
                report.deployments.push(skipped);
                continue;
            }
        };

        let entry = tracing::dispatcher::with_default(&dispatch, || {
            let yaml = paths.deployment_yaml();
            let metadata = match DeploymentMetadata::load(&yaml) {
                Ok(metadata) => metadata,
                Err(e) => {
                    error!(deployment = %name, fields = ?e.log_fields(), "Invalid deployment.yml file: {e}");
                    return DeploymentReport::skipped(name, e.to_string());
                }
            };

            let result = merge_all(ctx, options, &paths, &metadata);
            if let Err(e) = &result {
                error!(deployment = %name, fields = ?e.log_fields(), "Merge failed: {e}");
            }
            DeploymentReport::finished(name, result)
        });
        report.deployments.push(entry);
    }
    report
}

fn merge_all<B: GliderBackend>(
    ctx: &StageContext<'_, B>,
    options: &TimeseriesOptions,
    paths: &DeploymentPaths,
    metadata: &DeploymentMetadata,
) -> Result<Counts> {
    info!("Processing: {} {}", paths.id, paths.mode);
    info!(
        "Grouping by {} (profile filter {} s, minimum {} s)",
        options.grouping, options.profile.filter_time, options.profile.min_time
    );

    let groups = scan::group_keys(&paths.rawnc_dir)?;
    info!(
        "Found {} file groups in {}",
        groups.len(),
        paths.rawnc_dir.display()
    );

    let mut written = HashSet::new();
    for group in &groups {
        info!("Merging {group}");
        let outcome = ctx.backend.merge_group(&MergeRequest {
            rawnc_dir: paths.rawnc_dir.clone(),
            output_dir: paths.output_dir.clone(),
            deployment_yaml: paths.deployment_yaml(),
            profile: options.profile,
            group_key: group.clone(),
        })?;

        let Some(mut dataset) = outcome.dataset else {
            info!("No mergeable data for {group}");
            continue;
        };

        metadata.attach(&mut dataset);

        let nc_path = output_path(&paths.output_dir, &outcome.output_filename, group)?;
        if !written.insert(nc_path.clone()) {
            return Err(ProcError::backend(
                "merge",
                format!(
                    "output file {} for {group} was already written by an earlier group",
                    nc_path.display()
                ),
            ));
        }
        netcdf::write_timeseries(&nc_path, &dataset)?;
        info!("Wrote {} ({} records)", nc_path.display(), dataset.len());

        if options.write_csv {
            let csv_path = nc_path.with_extension("csv");
            csv::write_timeseries(&csv_path, &dataset)?;
            debug!("Wrote {}", csv_path.display());
        }
    }

    let outputs = scan::count_nc(&paths.output_dir)?;
    info!("{outputs} output files for {} input file pairs", groups.len());

    Ok(Counts {
        inputs: groups.len(),
        outputs,
    })
}

/// Join the backend-supplied file name onto the output directory.
///
/// Only the final component of the name is used so output never lands
/// outside `output_dir`.
fn output_path(output_dir: &Path, filename: &str, group: &str) -> Result<PathBuf> {
    let name = Path::new(filename)
        .file_name()
        .ok_or_else(|| {
            ProcError::backend("merge", format!("invalid output file name '{filename}' for {group}"))
        })?;
    let mut path = output_dir.join(name);
    if path.extension().is_none() {
        path.set_extension("nc");
    }
    Ok(path)
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use crate::backend::{DecodeRequest, MergeOutcome};
    use crate::config::DataRoot;
    use crate::core::Stage;
    use crate::logging::{LogLevel, StageLogger};
    use crate::stages::Outcome;
    use crate::timeseries::{Series, Timeseries};

    const YAML: &str = "metadata:\n  glider_name: ru39\nprofile_variables:\n  platform:\n    long_name: Slocum ru39\n";

    #[derive(Default)]
    struct GroupBackend {
        empty_groups: Vec<String>,
        fixed_name: Option<String>,
        merged: RefCell<Vec<String>>,
    }

    impl GliderBackend for GroupBackend {
        fn decode(&self, _request: &DecodeRequest) -> Result<()> {
            Ok(())
        }

        fn merge_group(&self, request: &MergeRequest) -> Result<MergeOutcome> {
            self.merged.borrow_mut().push(request.group_key.clone());
            let filename = self
                .fixed_name
                .clone()
                .unwrap_or_else(|| format!("{}.nc", request.group_key));
            if self.empty_groups.contains(&request.group_key) {
                return Ok(MergeOutcome::empty(filename));
            }
            let mut ds = Timeseries::new(vec![1745422500.0, 1745422510.0]);
            ds.push_series(Series::new("depth", vec![1.0, f64::NAN]))?;
            Ok(MergeOutcome {
                dataset: Some(ds),
                output_filename: filename,
            })
        }
    }

    fn make_deployment(data_home: &Path, yaml: Option<&str>) -> PathBuf {
        let dep = data_home.join("deployments/2025/ru39-20250423T1535");
        for dir in [
            "data/in/binary/stbd",
            "data/in/rawnc/stbd",
            "data/out/rt/qc_queue",
            "config/proc",
            "proc-logs",
        ] {
            std::fs::create_dir_all(dep.join(dir)).unwrap();
        }
        for name in [
            "ru39-20250423T1535-001.tbd.nc",
            "ru39-20250423T1535-001.sbd.nc",
            "ru39-20250423T1535-002.tbd.nc",
            "ru39-20250423T1535-002.sbd.nc",
        ] {
            std::fs::write(dep.join("data/in/rawnc/stbd").join(name), b"").unwrap();
        }
        if let Some(yaml) = yaml {
            std::fs::write(dep.join("config/proc/deployment.yml"), yaml).unwrap();
        }
        dep
    }

    fn options() -> TimeseriesOptions {
        TimeseriesOptions::new(
            Mode::Rt,
            Grouping::Trajectory,
            ProfileSettings {
                filter_time: 30,
                min_time: 300,
            },
        )
    }

    fn logger() -> StageLogger {
        StageLogger::new(Stage::RawncToTimeseries, LogLevel::Info).without_stderr()
    }

    #[test]
    fn test_merges_each_group_once() {
        let tmp = tempfile::tempdir().unwrap();
        let dep = make_deployment(tmp.path(), Some(YAML));
        let root = DataRoot::new(tmp.path()).unwrap();
        let logger = logger();
        let backend = GroupBackend {
            empty_groups: vec!["ru39-20250423T1535-002".to_string()],
            ..Default::default()
        };
        let ctx = StageContext::new(&root, &backend, &logger);

        let report = run(
            &ctx,
            &options().with_csv(true),
            &["ru39-20250423T1535".to_string()],
        );

        assert_eq!(report.exit_code(), 0);
        assert_eq!(
            *backend.merged.borrow(),
            ["ru39-20250423T1535-001", "ru39-20250423T1535-002"]
        );
        assert_eq!(
            report.deployments[0].counts,
            Counts {
                inputs: 2,
                outputs: 1
            }
        );

        let out = dep.join("data/out/rt/qc_queue");
        let nc = std::fs::read(out.join("ru39-20250423T1535-001.nc")).unwrap();
        assert_eq!(&nc[..4], b"CDF\x02");
        assert!(out.join("ru39-20250423T1535-001.csv").is_file());
        assert!(!out.join("ru39-20250423T1535-002.nc").exists());

        let log = std::fs::read_to_string(
            dep.join("proc-logs/ru39-20250423T1535-rt-proc_rawnc_to_timeseries.log"),
        )
        .unwrap();
        assert!(log.contains("1 output files for 2 input file pairs"));
    }

    #[test]
    fn test_missing_yaml_skips_without_output() {
        let tmp = tempfile::tempdir().unwrap();
        let dep = make_deployment(tmp.path(), None);
        let root = DataRoot::new(tmp.path()).unwrap();
        let logger = logger();
        let backend = GroupBackend::default();
        let ctx = StageContext::new(&root, &backend, &logger);

        let report = run(&ctx, &options(), &["ru39-20250423T1535".to_string()]);

        assert!(matches!(report.deployments[0].outcome, Outcome::Skipped(_)));
        assert!(backend.merged.borrow().is_empty());
        let outputs = std::fs::read_dir(dep.join("data/out/rt/qc_queue"))
            .unwrap()
            .count();
        assert_eq!(outputs, 0);
    }

    #[test]
    fn test_missing_output_dir_skips() {
        let tmp = tempfile::tempdir().unwrap();
        let dep = make_deployment(tmp.path(), Some(YAML));
        std::fs::remove_dir(dep.join("data/out/rt/qc_queue")).unwrap();
        let root = DataRoot::new(tmp.path()).unwrap();
        let logger = logger();
        let backend = GroupBackend::default();
        let ctx = StageContext::new(&root, &backend, &logger);

        let report = run(&ctx, &options(), &["ru39-20250423T1535".to_string()]);

        match &report.deployments[0].outcome {
            Outcome::Skipped(reason) => assert!(reason.contains("output file data directory")),
            other => panic!("unexpected outcome: {other}"),
        }
    }

    #[test]
    fn test_output_path_strips_directories() {
        let dir = Path::new("/out");
        assert_eq!(
            output_path(dir, "../../etc/ru39-001.nc", "ru39-001").unwrap(),
            PathBuf::from("/out/ru39-001.nc")
        );
        assert_eq!(
            output_path(dir, "ru39-001", "ru39-001").unwrap(),
            PathBuf::from("/out/ru39-001.nc")
        );
        assert!(output_path(dir, "..", "ru39-001").is_err());
    }

    #[test]
    fn test_missing_data_dir_logged_as_error() {
        let tmp = tempfile::tempdir().unwrap();
        let dep = make_deployment(tmp.path(), Some(YAML));
        std::fs::remove_dir_all(dep.join("data/in/rawnc/stbd")).unwrap();
        let root = DataRoot::new(tmp.path()).unwrap();
        let logger = StageLogger::new(Stage::RawncToTimeseries, LogLevel::Error)
            .without_stderr()
            .with_base_log(&tmp.path().join("base-logs"))
            .unwrap();
        let backend = GroupBackend::default();
        let ctx = StageContext::new(&root, &backend, &logger);

        let report = run(
            &ctx,
            &options(),
            &[
                "ru39-20250423T1535".to_string(),
                "ru40-20240101T0000".to_string(),
            ],
        );

        assert!(matches!(report.deployments[0].outcome, Outcome::Skipped(_)));
        assert!(matches!(report.deployments[1].outcome, Outcome::Skipped(_)));
        assert!(backend.merged.borrow().is_empty());

        let log = std::fs::read_to_string(logger.base_log_path().unwrap()).unwrap();
        assert!(log.contains("ERROR"));
        assert!(log.contains("ru39-20250423T1535 data directory not found"));
        assert!(log.contains("Deployment location does not exist"));
    }

    #[test]
    fn test_output_name_collision_fails_deployment() {
        let tmp = tempfile::tempdir().unwrap();
        let dep = make_deployment(tmp.path(), Some(YAML));
        let root = DataRoot::new(tmp.path()).unwrap();
        let logger = logger();
        let backend = GroupBackend {
            fixed_name: Some("done".to_string()),
            ..Default::default()
        };
        let ctx = StageContext::new(&root, &backend, &logger);

        let report = run(&ctx, &options(), &["ru39-20250423T1535".to_string()]);

        match &report.deployments[0].outcome {
            Outcome::Failed(reason) => {
                assert!(reason.contains("already written by an earlier group"))
            }
            other => panic!("unexpected outcome: {other}"),
        }
        assert_eq!(backend.merged.borrow().len(), 2);

        let out = dep.join("data/out/rt/qc_queue");
        assert_eq!(std::fs::read_dir(&out).unwrap().count(), 1);
        assert!(out.join("done.nc").is_file());
    }
}

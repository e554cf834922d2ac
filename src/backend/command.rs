// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Backend that runs external programs.
//!
//! The configured program receives its configured leading arguments,
//! followed by generated flags:
//!
//! ```text
//! decode: --binary-dir D --rawnc-dir D --cache-dir D --sensor-list F
//!         --deployment-yaml F [--incremental] --science-suffix S --flight-suffix S
//! merge:  --rawnc-dir D --output-dir D --deployment-yaml F
//!         --profile-filter-time N --profile-min-time N --group KEY --emit CSV
//! ```
//!
//! The merge program writes the merged timeseries to the `--emit` path,
//! a fresh private temporary directory per call, as CSV (`time` in epoch seconds, one column per variable). Leaving
//! the file absent or header-only means "nothing to merge". The last
//! non-empty line on stdout, if any, is the output file name.

use std::ffi::OsString;
use std::path::Path;
use std::process::{Command, Output};

use tracing::debug;

use super::{DecodeRequest, GliderBackend, MergeOutcome, MergeRequest};
use crate::config::CommandConfig;
use crate::{ProcError, Result};

/// [`GliderBackend`] delegating to external commands.
#[derive(Debug, Clone)]
pub struct CommandBackend {
    decode: CommandConfig,
    merge: CommandConfig,
}

impl CommandBackend {
    /// Create a backend from the decode and merge program settings.
    pub fn new(decode: CommandConfig, merge: CommandConfig) -> Self {
        Self { decode, merge }
    }

    fn run(&self, operation: &str, config: &CommandConfig, args: Vec<OsString>) -> Result<Output> {
        debug!(operation, program = %config.program, ?args, "Running backend command");

        let output = Command::new(&config.program)
            .args(&config.args)
            .args(&args)
            .output()
            .map_err(|e| {
                ProcError::backend(operation, format!("failed to start {}: {e}", config.program))
            })?;

        for line in String::from_utf8_lossy(&output.stderr).lines() {
            debug!(operation, "{line}");
        }

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let tail = stderr.lines().last().unwrap_or("").trim().to_string();
            return Err(ProcError::backend(
                operation,
                format!("{} exited with {}: {tail}", config.program, output.status),
            ));
        }

        Ok(output)
    }
}

fn flag(name: &str, value: impl Into<OsString>) -> [OsString; 2] {
    [OsString::from(name), value.into()]
}

fn path_flag(name: &str, path: &Path) -> [OsString; 2] {
    flag(name, path.as_os_str())
}

impl GliderBackend for CommandBackend {
    fn decode(&self, request: &DecodeRequest) -> Result<()> {
        let mut args: Vec<OsString> = Vec::new();
        args.extend(path_flag("--binary-dir", &request.binary_dir));
        args.extend(path_flag("--rawnc-dir", &request.rawnc_dir));
        args.extend(path_flag("--cache-dir", &request.cache_dir));
        args.extend(path_flag("--sensor-list", &request.sensor_list));
        args.extend(path_flag("--deployment-yaml", &request.deployment_yaml));
        if request.incremental {
            args.push("--incremental".into());
        }
        args.extend(flag("--science-suffix", &request.science_suffix));
        args.extend(flag("--flight-suffix", &request.flight_suffix));

        self.run("decode", &self.decode, args)?;
        Ok(())
    }

    fn merge_group(&self, request: &MergeRequest) -> Result<MergeOutcome> {
        let exchange = tempfile::Builder::new()
            .prefix("gliderproc-")
            .tempdir()
            .map_err(|e| {
                ProcError::backend("merge", format!("cannot create exchange directory: {e}"))
            })?;
        let emit = exchange.path().join(format!("{}.csv", request.group_key));

        let mut args: Vec<OsString> = Vec::new();
        args.extend(path_flag("--rawnc-dir", &request.rawnc_dir));
        args.extend(path_flag("--output-dir", &request.output_dir));
        args.extend(path_flag("--deployment-yaml", &request.deployment_yaml));
        args.extend(flag(
            "--profile-filter-time",
            request.profile.filter_time.to_string(),
        ));
        args.extend(flag("--profile-min-time", request.profile.min_time.to_string()));
        args.extend(flag("--group", &request.group_key));
        args.extend(path_flag("--emit", &emit));

        let output = self.run("merge", &self.merge, args)?;
        let dataset = crate::io::csv::read_timeseries(&emit)
            .map_err(|e| ProcError::backend("merge", format!("unreadable merge output: {e}")))?;
        exchange.close().map_err(|e| {
            ProcError::backend("merge", format!("cannot remove exchange directory: {e}"))
        })?;

        let output_filename = String::from_utf8_lossy(&output.stdout)
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .last()
            .map(|l| l.to_string())
            .unwrap_or_else(|| format!("{}.nc", request.group_key));

        Ok(MergeOutcome {
            dataset,
            output_filename,
        })
    }
}

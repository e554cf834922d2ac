// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Binary → raw netCDF stage.

use tracing::{error, info};

use super::{open_deployment, warn_missing_config, Counts, DeploymentReport, StageContext, StageReport};
use crate::backend::{DecodeRequest, GliderBackend};
use crate::deployment::{DeploymentPaths, Mode};
use crate::io::scan;
use crate::Result;

/// Convert the binary files of each deployment into raw netCDF files.
///
/// Decoding is incremental: inputs the decoder cache already knows are
/// not converted again. Deployments are processed in request order and a
/// problem with one never stops the others.
pub fn run<B: GliderBackend>(
    ctx: &StageContext<'_, B>,
    mode: Mode,
    deployments: &[String],
) -> StageReport {
    let base = ctx.logger.base();
    let cache_dir = ctx.root.cache_dir();
    tracing::dispatcher::with_default(&base, || {
        if !cache_dir.is_dir() {
            error!("Invalid cache directory: {}", cache_dir.display());
        }
    });

    let mut report = StageReport::default();
    for name in deployments {
        let entry = match open_deployment(ctx, &base, name, mode, |_| Vec::new()) {
            Ok((paths, dispatch)) => {
                let result = tracing::dispatcher::with_default(&dispatch, || {
                    let result = convert(ctx, &paths);
                    if let Err(e) = &result {
                        error!(deployment = %name, fields = ?e.log_fields(), "Conversion failed: {e}");
                    }
                    result
                });
                DeploymentReport::finished(name, result)
            }
            Err(skipped) => skipped,
        };
        report.deployments.push(entry);
    }
    report
}

fn convert<B: GliderBackend>(ctx: &StageContext<'_, B>, paths: &DeploymentPaths) -> Result<Counts> {
    warn_missing_config(paths);

    let (science, flight) = paths.mode.suffixes();
    info!("Processing: {} {}", paths.id, paths.mode);
    info!("Binary directory: {}", paths.binary_dir.display());
    info!("Raw netCDF directory: {}", paths.rawnc_dir.display());

    let science_inputs = scan::count_with_suffix(&paths.binary_dir, science)?;
    let flight_inputs = scan::count_with_suffix(&paths.binary_dir, flight)?;
    info!("Found {science_inputs} *.{science} and {flight_inputs} *.{flight} binary files");

    ctx.backend.decode(&DecodeRequest {
        binary_dir: paths.binary_dir.clone(),
        rawnc_dir: paths.rawnc_dir.clone(),
        cache_dir: ctx.root.cache_dir(),
        sensor_list: paths.sensor_list(),
        deployment_yaml: paths.deployment_yaml(),
        incremental: true,
        science_suffix: science.to_string(),
        flight_suffix: flight.to_string(),
    })?;

    let science_outputs = scan::count_with_suffix(&paths.rawnc_dir, &format!("{science}.nc"))?;
    let flight_outputs = scan::count_with_suffix(&paths.rawnc_dir, &format!("{flight}.nc"))?;
    info!(
        "Successfully converted {science_outputs} of {science_inputs} science binary files with suffix *.{science}"
    );
    info!(
        "Successfully converted {flight_outputs} of {flight_inputs} engineering binary files with suffix *.{flight}"
    );
    info!("Finished converting binary files to raw netcdf files");

    Ok(Counts {
        inputs: science_inputs + flight_inputs,
        outputs: science_outputs + flight_outputs,
    })
}

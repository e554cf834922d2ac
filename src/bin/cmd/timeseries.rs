// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Rawnc-to-timeseries command.

use clap::Args;

use crate::common::{print_report, DeploymentArgs, Result, StageSetup};
use gliderproc::config::Grouping;
use gliderproc::stages::{self, StageContext, TimeseriesOptions};
use gliderproc::Stage;

/// Merge raw netCDF files into timeseries files.
#[derive(Args, Clone, Debug)]
pub struct TimeseriesCmd {
    #[command(flatten)]
    args: DeploymentArgs,

    /// Profile constants to merge with: trajectory or segment
    #[arg(long, default_value = "trajectory")]
    grouping: Grouping,

    /// Also write a CSV copy of every merged file
    #[arg(long)]
    csv: bool,
}

impl TimeseriesCmd {
    pub fn run(self) -> Result<i32> {
        let setup = StageSetup::new(&self.args, Stage::RawncToTimeseries)?;
        let options = TimeseriesOptions::new(
            self.args.mode,
            self.grouping,
            setup.config.profiles.for_grouping(self.grouping),
        )
        .with_csv(self.csv);
        let ctx = StageContext::new(&setup.root, setup.backend(), &setup.logger);

        let report = stages::run_rawnc_to_timeseries(&ctx, &options, &self.args.deployments);
        Ok(print_report(&report))
    }
}

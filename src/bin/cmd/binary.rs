// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Binary-to-rawnc command.

use clap::Args;

use crate::common::{print_report, DeploymentArgs, Result, StageSetup};
use gliderproc::stages::{self, StageContext};
use gliderproc::Stage;

/// Convert binary files into raw netCDF files.
#[derive(Args, Clone, Debug)]
pub struct BinaryCmd {
    #[command(flatten)]
    args: DeploymentArgs,
}

impl BinaryCmd {
    pub fn run(self) -> Result<i32> {
        let setup = StageSetup::new(&self.args, Stage::BinaryToRawnc)?;
        let ctx = StageContext::new(&setup.root, setup.backend(), &setup.logger);

        let report = stages::run_binary_to_rawnc(&ctx, self.args.mode, &self.args.deployments);
        Ok(print_report(&report))
    }
}

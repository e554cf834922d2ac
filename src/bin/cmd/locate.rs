// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Locate command - show the directories of deployments.

use clap::Args;
use serde::Serialize;

use crate::common::{DeploymentArgs, Result};
use gliderproc::logging::stderr_dispatch;
use gliderproc::{locate, DeploymentPaths};

/// Resolve deployment names to their directories.
#[derive(Args, Clone, Debug)]
pub struct LocateCmd {
    #[command(flatten)]
    args: DeploymentArgs,

    /// Print JSON instead of text
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct Located {
    deployment: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    paths: Option<DeploymentPaths>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl LocateCmd {
    pub fn run(self) -> Result<i32> {
        let root = self.args.data_root()?;
        let deployments_root = root.deployments_root();
        let dispatch = stderr_dispatch(self.args.loglevel);

        let located: Vec<Located> = tracing::dispatcher::with_default(&dispatch, || {
            self.args
                .deployments
                .iter()
                .map(|name| match locate(name, &deployments_root, self.args.mode) {
                    Ok(paths) => Located {
                        deployment: name.clone(),
                        paths: Some(paths),
                        error: None,
                    },
                    Err(e) => Located {
                        deployment: name.clone(),
                        paths: None,
                        error: Some(e.to_string()),
                    },
                })
                .collect()
        });

        if self.json {
            println!("{}", serde_json::to_string_pretty(&located)?);
        } else {
            for entry in &located {
                print_text(entry);
            }
        }

        let all_found = located.iter().all(|l| l.paths.is_some());
        Ok(if all_found { 0 } else { 1 })
    }
}

fn print_text(entry: &Located) {
    let Some(paths) = &entry.paths else {
        println!(
            "{}: {}",
            entry.deployment,
            entry.error.as_deref().unwrap_or("not found")
        );
        return;
    };

    println!("{} ({})", entry.deployment, paths.mode);
    println!("  Deployment: {}", paths.deployment_dir.display());
    println!("  Binary:     {}", paths.binary_dir.display());
    println!("  Raw netCDF: {}", paths.rawnc_dir.display());
    println!("  Output:     {}", paths.output_dir.display());
    println!("  Config:     {}", paths.config_dir.display());
    println!("  Logs:       {}", paths.log_dir.display());
}

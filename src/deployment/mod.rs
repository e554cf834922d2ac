// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Deployment discovery.
//!
//! Resolves a deployment name such as `ru39-20250423T1535` into the fixed
//! directory layout under the deployments root:
//!
//! ```text
//! <root>/<YYYY>/<glider>-<YYYYmmddTHHMM>/
//!     data/in/binary/<stbd|debd>/
//!     data/in/rawnc/<stbd|debd>/
//!     data/out/<rt|delayed>/qc_queue/
//!     config/proc/{deployment.yml,sensors.txt}
//!     proc-logs/
//! ```
//!
//! [`locate`] is the single entry point every stage uses. It only reads
//! the filesystem; nothing is created.

mod id;
mod mode;
mod paths;

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{error, warn};

pub use id::DeploymentId;
pub use mode::{Mode, ParseModeError};
pub use paths::DeploymentPaths;

/// Why a deployment could not be resolved.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LocateError {
    /// Name does not match `<glider>-<YYYYmmddTHHMM>`
    #[error("Cannot pull glider name from {name}")]
    MalformedName {
        /// Name as given
        name: String,
    },

    /// Timestamp part matched the pattern but is not a valid date
    #[error("Error parsing trajectory date {date}: {message}")]
    InvalidDate {
        /// Timestamp text
        date: String,
        /// Parser message
        message: String,
    },

    /// `<root>/<YYYY>/<trajectory>` does not exist
    #[error("Deployment location does not exist: {}", path.display())]
    MissingDeployment {
        /// Expected deployment directory
        path: PathBuf,
    },

    /// Binary or raw netCDF directory for the mode does not exist
    #[error("{trajectory} data directory not found: {}", path.display())]
    MissingDataDir {
        /// Normalized deployment name
        trajectory: String,
        /// Expected data directory
        path: PathBuf,
    },
}

impl LocateError {
    /// Short machine-readable reason.
    pub fn reason(&self) -> &'static str {
        match self {
            LocateError::MalformedName { .. } => "malformed_name",
            LocateError::InvalidDate { .. } => "invalid_date",
            LocateError::MissingDeployment { .. } => "missing_deployment",
            LocateError::MissingDataDir { .. } => "missing_data_dir",
        }
    }
}

/// Resolve a deployment name to its directories.
///
/// The deployment directory and both input data directories for `mode`
/// must exist. Output, config and log directories are computed but not
/// checked here; each stage decides how strict to be about them.
///
/// Failures are logged (parse problems as errors, missing directories as
/// warnings) and returned.
pub fn locate(
    name: &str,
    deployments_root: &Path,
    mode: Mode,
) -> Result<DeploymentPaths, LocateError> {
    let result = resolve(name, deployments_root, mode);
    if let Err(err) = &result {
        match err {
            LocateError::MalformedName { .. } | LocateError::InvalidDate { .. } => {
                error!(deployment = name, reason = err.reason(), "{err}")
            }
            LocateError::MissingDeployment { .. } | LocateError::MissingDataDir { .. } => {
                warn!(deployment = name, reason = err.reason(), "{err}")
            }
        }
    }
    result
}

fn resolve(name: &str, deployments_root: &Path, mode: Mode) -> Result<DeploymentPaths, LocateError> {
    let id = DeploymentId::parse(name)?;
    let paths = DeploymentPaths::new(deployments_root, id, mode);

    if !paths.deployment_dir.is_dir() {
        return Err(LocateError::MissingDeployment {
            path: paths.deployment_dir,
        });
    }

    for dir in [&paths.binary_dir, &paths.rawnc_dir] {
        if !dir.is_dir() {
            return Err(LocateError::MissingDataDir {
                trajectory: paths.id.trajectory(),
                path: dir.clone(),
            });
        }
    }

    Ok(paths)
}

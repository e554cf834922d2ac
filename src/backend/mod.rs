// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Decode and merge backends.
//!
//! Binary frame decoding, the incremental decode cache and profile
//! segmentation are owned by an external toolkit. The stages only talk
//! to it through [`GliderBackend`], so the toolkit can be swapped (or
//! faked in tests) without touching the orchestration.

mod command;

use std::path::PathBuf;

use crate::config::ProfileSettings;
use crate::timeseries::Timeseries;
use crate::Result;

pub use command::CommandBackend;

/// Arguments of one binary → raw netCDF conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeRequest {
    /// Directory holding the binary files
    pub binary_dir: PathBuf,
    /// Destination of the raw netCDF files
    pub rawnc_dir: PathBuf,
    /// Decoder cache directory
    pub cache_dir: PathBuf,
    /// `sensors.txt`
    pub sensor_list: PathBuf,
    /// `deployment.yml`
    pub deployment_yaml: PathBuf,
    /// Skip inputs already converted
    pub incremental: bool,
    /// Science file suffix (`tbd`/`ebd`)
    pub science_suffix: String,
    /// Flight file suffix (`sbd`/`dbd`)
    pub flight_suffix: String,
}

/// Arguments of one group merge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeRequest {
    /// Directory holding the raw netCDF files
    pub rawnc_dir: PathBuf,
    /// Destination directory of merged output
    pub output_dir: PathBuf,
    /// `deployment.yml`
    pub deployment_yaml: PathBuf,
    /// Profile-detection constants
    pub profile: ProfileSettings,
    /// Trajectory or segment prefix to merge
    pub group_key: String,
}

/// Result of one group merge.
#[derive(Debug, Clone, PartialEq)]
pub struct MergeOutcome {
    /// Merged data, or `None` when the group had nothing mergeable
    pub dataset: Option<Timeseries>,
    /// File name (not path) for the netCDF output
    pub output_filename: String,
}

impl MergeOutcome {
    /// Outcome for a group without mergeable data.
    pub fn empty(output_filename: impl Into<String>) -> Self {
        Self {
            dataset: None,
            output_filename: output_filename.into(),
        }
    }
}

/// External decode/merge capability.
pub trait GliderBackend {
    /// Convert binary files into raw netCDF files.
    ///
    /// With `incremental`, inputs already present in the raw directory
    /// (as tracked by the decoder cache) must not be converted again.
    fn decode(&self, request: &DecodeRequest) -> Result<()>;

    /// Merge the science and flight raw files of one group into a timeseries.
    fn merge_group(&self, request: &MergeRequest) -> Result<MergeOutcome>;
}

impl<B: GliderBackend + ?Sized> GliderBackend for &B {
    fn decode(&self, request: &DecodeRequest) -> Result<()> {
        (**self).decode(request)
    }

    fn merge_group(&self, request: &MergeRequest) -> Result<MergeOutcome> {
        (**self).merge_group(request)
    }
}

impl<B: GliderBackend + ?Sized> GliderBackend for Box<B> {
    fn decode(&self, request: &DecodeRequest) -> Result<()> {
        (**self).decode(request)
    }

    fn merge_group(&self, request: &MergeRequest) -> Result<MergeOutcome> {
        (**self).merge_group(request)
    }
}

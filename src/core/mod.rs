// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Core types used throughout gliderproc.
//!
//! - [`ProcError`] - Error handling for every stage
//! - [`Stage`] - Pipeline stage identifier, used for log file naming

pub mod error;

pub use error::{ProcError, Result};

/// Pipeline stage identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Binary `*.sbd/*.tbd` or `*.dbd/*.ebd` to raw netCDF
    BinaryToRawnc,
    /// Raw netCDF pairs to merged timeseries netCDF
    RawncToTimeseries,
}

impl Stage {
    /// Name used in log file names.
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::BinaryToRawnc => "proc_binary_to_rawnc",
            Stage::RawncToTimeseries => "proc_rawnc_to_timeseries",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

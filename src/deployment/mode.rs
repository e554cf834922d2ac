// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Data latency mode.

use std::fmt;
use std::str::FromStr;

/// Data latency track of a deployment.
///
/// The mode selects both the binary file suffix pair and the
/// subdirectory naming convention on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Mode {
    /// Real-time: `*.tbd` science, `*.sbd` flight, directory `stbd`
    #[default]
    Rt,
    /// Delayed: `*.ebd` science, `*.dbd` flight, directory `debd`
    Delayed,
}

/// Error returned when parsing a `Mode` from string fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseModeError {
    value: String,
}

impl fmt::Display for ParseModeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid mode '{}', expected 'rt' or 'delayed'",
            self.value
        )
    }
}

impl std::error::Error for ParseModeError {}

impl FromStr for Mode {
    type Err = ParseModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "rt" => Ok(Mode::Rt),
            "delayed" => Ok(Mode::Delayed),
            _ => Err(ParseModeError {
                value: s.to_string(),
            }),
        }
    }
}

impl Mode {
    /// Convert to string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Rt => "rt",
            Mode::Delayed => "delayed",
        }
    }

    /// Suffix of science-bay binary files.
    pub fn science_suffix(&self) -> &'static str {
        match self {
            Mode::Rt => "tbd",
            Mode::Delayed => "ebd",
        }
    }

    /// Suffix of flight (engineering) binary files.
    pub fn flight_suffix(&self) -> &'static str {
        match self {
            Mode::Rt => "sbd",
            Mode::Delayed => "dbd",
        }
    }

    /// `(science, flight)` suffix pair.
    pub fn suffixes(&self) -> (&'static str, &'static str) {
        (self.science_suffix(), self.flight_suffix())
    }

    /// Subdirectory name under `data/in/binary` and `data/in/rawnc`.
    pub fn dir_name(&self) -> &'static str {
        match self {
            Mode::Rt => "stbd",
            Mode::Delayed => "debd",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Deployment identifiers of the form `<glider>-<YYYYmmddTHHMM>`.

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use chrono::{DateTime, Datelike, NaiveDateTime, Utc};
use regex::Regex;

use super::LocateError;

/// Timestamp layout of the deployment start.
const START_FORMAT: &str = "%Y%m%dT%H%M";

fn deployment_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^(.*)-(\d{8}T\d{4})").unwrap())
}

/// A glider deployment: glider name plus UTC start time at minute precision.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DeploymentId {
    glider: String,
    start: DateTime<Utc>,
}

impl DeploymentId {
    /// Parse a deployment name such as `ru39-20250423T1535`.
    ///
    /// Text after the timestamp is ignored, so `ru39-20250423T1535-extra`
    /// normalizes to `ru39-20250423T1535`.
    pub fn parse(name: &str) -> Result<Self, LocateError> {
        let captures = deployment_pattern()
            .captures(name)
            .ok_or_else(|| LocateError::MalformedName {
                name: name.to_string(),
            })?;

        let glider = &captures[1];
        if glider.is_empty() {
            return Err(LocateError::MalformedName {
                name: name.to_string(),
            });
        }

        let date = &captures[2];
        let start = NaiveDateTime::parse_from_str(date, START_FORMAT)
            .map_err(|e| LocateError::InvalidDate {
                date: date.to_string(),
                message: e.to_string(),
            })?
            .and_utc();

        Ok(Self {
            glider: glider.to_string(),
            start,
        })
    }

    /// Glider name (e.g. `ru39`).
    pub fn glider(&self) -> &str {
        &self.glider
    }

    /// Deployment start time.
    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    /// Year of the deployment start, used as a directory level.
    pub fn year(&self) -> i32 {
        self.start.year()
    }

    /// Normalized name: `<glider>-<YYYYmmddTHHMM>`.
    pub fn trajectory(&self) -> String {
        format!("{}-{}", self.glider, self.start.format(START_FORMAT))
    }
}

impl FromStr for DeploymentId {
    type Err = LocateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for DeploymentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.glider, self.start.format(START_FORMAT))
    }
}

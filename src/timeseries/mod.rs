// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! In-memory merged timeseries.
//!
//! A [`Timeseries`] is what the merge backend hands back for one group:
//! a time axis, the time-indexed variables, scalar descriptor variables
//! (platform, instruments) and global attributes. Attribute maps are
//! ordered so written files are deterministic.

pub mod metadata;

use std::collections::BTreeMap;
use std::fmt;

pub use metadata::DeploymentMetadata;

/// Units string of the encoded time axis.
pub const TIME_UNITS: &str = "seconds since 1970-01-01T00:00:00Z";

/// Attribute value.
#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    /// Text
    Text(String),
    /// Floating point number
    Float(f64),
    /// Integer
    Int(i64),
}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttrValue::Text(s) => f.write_str(s),
            AttrValue::Float(v) => write!(f, "{v}"),
            AttrValue::Int(v) => write!(f, "{v}"),
        }
    }
}

impl From<&str> for AttrValue {
    fn from(value: &str) -> Self {
        AttrValue::Text(value.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(value: String) -> Self {
        AttrValue::Text(value)
    }
}

impl From<f64> for AttrValue {
    fn from(value: f64) -> Self {
        AttrValue::Float(value)
    }
}

impl From<i64> for AttrValue {
    fn from(value: i64) -> Self {
        AttrValue::Int(value)
    }
}

/// Ordered attribute map.
pub type Attributes = BTreeMap<String, AttrValue>;

/// A variable indexed by the time axis. Missing values are `NaN`.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    /// Variable name
    pub name: String,
    /// One value per time step
    pub values: Vec<f64>,
    /// Variable attributes
    pub attributes: Attributes,
}

impl Series {
    /// Create a series without attributes.
    pub fn new(name: impl Into<String>, values: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            values,
            attributes: Attributes::new(),
        }
    }

    /// Set an attribute.
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<AttrValue>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }
}

/// A dimensionless variable that only carries attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct Descriptor {
    /// Variable name (e.g. `platform`, `instrument_ctd`)
    pub name: String,
    /// Descriptive attributes
    pub attributes: Attributes,
}

impl Descriptor {
    /// Create a descriptor without attributes.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Attributes::new(),
        }
    }
}

/// Merged, time-indexed dataset for one trajectory or segment.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Timeseries {
    /// Seconds since the Unix epoch
    pub time: Vec<f64>,
    /// Time-indexed variables
    pub series: Vec<Series>,
    /// Scalar descriptor variables
    pub descriptors: Vec<Descriptor>,
    /// Global attributes
    pub attributes: Attributes,
}

impl Timeseries {
    /// Create a dataset with the given time axis.
    pub fn new(time: Vec<f64>) -> Self {
        Self {
            time,
            ..Default::default()
        }
    }

    /// Number of time steps.
    pub fn len(&self) -> usize {
        self.time.len()
    }

    /// True if there are no time steps.
    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    /// Add a series. Its length must match the time axis.
    pub fn push_series(&mut self, series: Series) -> crate::Result<()> {
        if series.values.len() != self.time.len() {
            return Err(crate::ProcError::encode(
                "timeseries",
                format!(
                    "series '{}' has {} values for {} time steps",
                    series.name,
                    series.values.len(),
                    self.time.len()
                ),
            ));
        }
        self.series.push(series);
        Ok(())
    }

    /// Look up a series by name.
    pub fn series(&self, name: &str) -> Option<&Series> {
        self.series.iter().find(|s| s.name == name)
    }

    /// Look up a descriptor by name.
    pub fn descriptor(&self, name: &str) -> Option<&Descriptor> {
        self.descriptors.iter().find(|d| d.name == name)
    }

    /// Insert or replace a descriptor.
    pub fn set_descriptor(&mut self, descriptor: Descriptor) {
        match self.descriptors.iter_mut().find(|d| d.name == descriptor.name) {
            Some(existing) => *existing = descriptor,
            None => self.descriptors.push(descriptor),
        }
    }
}

// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Deployment YAML (`config/proc/deployment.yml`).
//!
//! Only the sections used for output annotation are read:
//!
//! ```yaml
//! metadata:            # global attributes
//!   glider_name: ru39
//! glider_devices:      # instruments without a profile variable entry
//!   ctd: {make: Sea-Bird, model: GPCTD, serial: "9196"}
//! profile_variables:   # `platform` and `instrument_*` descriptors
//!   platform: {long_name: Slocum Glider ru39, type: platform}
//! ```
//!
//! Other sections (`netcdf_variables`, ...) belong to the decoder and are
//! ignored here.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;
use serde_yaml::Value;

use super::{AttrValue, Attributes, Descriptor, Timeseries};
use crate::{ProcError, Result};

const PLATFORM: &str = "platform";
const INSTRUMENT_PREFIX: &str = "instrument_";

/// Parsed deployment YAML.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct DeploymentMetadata {
    #[serde(default)]
    metadata: BTreeMap<String, Value>,
    #[serde(default)]
    glider_devices: BTreeMap<String, BTreeMap<String, Value>>,
    #[serde(default)]
    profile_variables: BTreeMap<String, BTreeMap<String, Value>>,
}

impl DeploymentMetadata {
    /// Read and parse a deployment YAML file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| ProcError::metadata(path, e.to_string()))?;
        Self::parse(&text).map_err(|e| ProcError::metadata(path, e.to_string()))
    }

    /// Parse YAML text.
    pub fn parse(text: &str) -> std::result::Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(text)
    }

    /// Annotate a merged dataset.
    ///
    /// Attributes already set by the merge backend win over YAML values.
    pub fn attach(&self, dataset: &mut Timeseries) {
        for (key, value) in &self.metadata {
            if dataset.attributes.contains_key(key) {
                continue;
            }
            if let Some(attr) = to_attr(value) {
                dataset.attributes.insert(key.clone(), attr);
            }
        }

        for (name, attrs) in &self.profile_variables {
            if name == PLATFORM || name.starts_with(INSTRUMENT_PREFIX) {
                dataset.set_descriptor(descriptor(name, attrs));
            }
        }

        for (device, attrs) in &self.glider_devices {
            let name = format!("{INSTRUMENT_PREFIX}{device}");
            if !self.profile_variables.contains_key(&name) {
                dataset.set_descriptor(descriptor(&name, attrs));
            }
        }

        if dataset.descriptor(PLATFORM).is_some() {
            for series in &mut dataset.series {
                series
                    .attributes
                    .entry(PLATFORM.to_string())
                    .or_insert_with(|| PLATFORM.into());
            }
        }

        let instruments: Vec<&str> = dataset
            .descriptors
            .iter()
            .filter(|d| d.name.starts_with(INSTRUMENT_PREFIX))
            .map(|d| d.name.as_str())
            .collect();
        if !instruments.is_empty() {
            let joined = instruments.join(",");
            dataset
                .attributes
                .entry("instrument".to_string())
                .or_insert(AttrValue::Text(joined));
        }
    }
}

fn descriptor(name: &str, attrs: &BTreeMap<String, Value>) -> Descriptor {
    let attributes: Attributes = attrs
        .iter()
        .filter_map(|(k, v)| to_attr(v).map(|a| (k.clone(), a)))
        .collect();
    Descriptor {
        name: name.to_string(),
        attributes,
    }
}

/// Convert a YAML scalar (or a list of scalars) to an attribute value.
fn to_attr(value: &Value) -> Option<AttrValue> {
    match value {
        Value::String(s) => Some(AttrValue::Text(s.clone())),
        Value::Bool(b) => Some(AttrValue::Text(b.to_string())),
        Value::Number(n) => match n.as_i64() {
            Some(i) => Some(AttrValue::Int(i)),
            None => n.as_f64().map(AttrValue::Float),
        },
        Value::Sequence(items) => {
            let parts: Vec<String> = items
                .iter()
                .filter_map(to_attr)
                .map(|a| a.to_string())
                .collect();
            (!parts.is_empty()).then(|| AttrValue::Text(parts.join(", ")))
        }
        Value::Tagged(tagged) => to_attr(&tagged.value),
        Value::Null | Value::Mapping(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timeseries::Series;

    const YAML: &str = r#"
metadata:
  glider_name: ru39
  wmo_id: 4802989
  deployment_latitude: 40.35
  keywords: [Oceans, Salinity]
  title: from yaml
glider_devices:
  ctd:
    make: Sea-Bird
    model: GPCTD
    serial: "9196"
  optode:
    make: Aanderaa
profile_variables:
  platform:
    long_name: Slocum Glider ru39
    type: platform
  instrument_ctd:
    long_name: Seabird Glider Payload CTD
    serial_number: "9196"
netcdf_variables:
  time:
    source: sci_m_present_time
"#;

    fn dataset() -> Timeseries {
        let mut ts = Timeseries::new(vec![1.0, 2.0]);
        ts.push_series(Series::new("temperature", vec![10.0, 11.0]))
            .unwrap();
        ts.attributes.insert("title".to_string(), "from backend".into());
        ts
    }

    #[test]
    fn test_attach_global_attributes() {
        let meta = DeploymentMetadata::parse(YAML).unwrap();
        let mut ts = dataset();
        meta.attach(&mut ts);

        assert_eq!(ts.attributes["glider_name"], AttrValue::Text("ru39".into()));
        assert_eq!(ts.attributes["wmo_id"], AttrValue::Int(4802989));
        assert_eq!(ts.attributes["deployment_latitude"], AttrValue::Float(40.35));
        assert_eq!(
            ts.attributes["keywords"],
            AttrValue::Text("Oceans, Salinity".into())
        );
        assert_eq!(ts.attributes["title"], AttrValue::Text("from backend".into()));
    }

    #[test]
    fn test_attach_descriptors() {
        let meta = DeploymentMetadata::parse(YAML).unwrap();
        let mut ts = dataset();
        meta.attach(&mut ts);

        let platform = ts.descriptor("platform").unwrap();
        assert_eq!(platform.attributes["type"], AttrValue::Text("platform".into()));

        // profile_variables entry wins over glider_devices for the ctd
        let ctd = ts.descriptor("instrument_ctd").unwrap();
        assert!(ctd.attributes.contains_key("long_name"));
        assert!(!ctd.attributes.contains_key("make"));

        let optode = ts.descriptor("instrument_optode").unwrap();
        assert_eq!(optode.attributes["make"], AttrValue::Text("Aanderaa".into()));

        assert_eq!(
            ts.series("temperature").unwrap().attributes["platform"],
            AttrValue::Text("platform".into())
        );
        assert_eq!(
            ts.attributes["instrument"],
            AttrValue::Text("instrument_ctd,instrument_optode".into())
        );
    }

    #[test]
    fn test_minimal_yaml() {
        let meta = DeploymentMetadata::parse("metadata:\n  glider_name: ru44\n").unwrap();
        let mut ts = dataset();
        meta.attach(&mut ts);
        assert_eq!(ts.attributes["glider_name"], AttrValue::Text("ru44".into()));
        assert!(ts.descriptors.is_empty());
        assert!(!ts.attributes.contains_key("instrument"));
    }

    #[test]
    fn test_load_invalid_yaml() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("deployment.yml");
        std::fs::write(&path, "metadata: [unclosed").unwrap();
        let err = DeploymentMetadata::load(&path).unwrap_err();
        assert!(matches!(err, ProcError::Metadata { .. }));
    }
}

// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! netCDF classic writer for merged timeseries.
//!
//! Files use the 64-bit offset variant of the classic format (CDF-2),
//! readable by every netCDF library since 3.6.
//!
//! # Layout
//!
//! ```text
//! header = 'C' 'D' 'F' 0x02  numrecs  dim_list  gatt_list  var_list
//! data   = one contiguous block per variable, in var_list order
//! ```
//!
//! All integers are big-endian. Names, attribute values and variable
//! blocks are padded to 4-byte boundaries. The `time` dimension is fixed
//! size (never the record dimension), so `numrecs` is always zero.
//!
//! Variables written:
//! - `time(time)` as `double`, seconds since the Unix epoch
//! - one `double(time)` per [`Series`](crate::timeseries::Series), with
//!   `NaN` stored as the variable's `_FillValue`
//! - one scalar `int` per [`Descriptor`](crate::timeseries::Descriptor)

use std::fs;
use std::io::Write;
use std::path::Path;

use byteorder::{BigEndian, WriteBytesExt};

use crate::timeseries::{AttrValue, Attributes, Timeseries, TIME_UNITS};
use crate::{ProcError, Result};

/// File magic.
const MAGIC: &[u8; 3] = b"CDF";

/// 64-bit offset format version byte.
const VERSION_64BIT_OFFSET: u8 = 2;

/// List tags
const NC_DIMENSION: i32 = 0x0A;
const NC_VARIABLE: i32 = 0x0B;
const NC_ATTRIBUTE: i32 = 0x0C;

/// External types
const NC_CHAR: i32 = 2;
const NC_INT: i32 = 4;
const NC_DOUBLE: i32 = 6;

/// Default fill value for `int` variables.
const NC_FILL_INT: i32 = -2_147_483_647;

/// Default fill value for `double` variables.
const NC_FILL_DOUBLE: f64 = 9.969_209_968_386_869e36;

/// Fill value attribute name.
const FILL_VALUE: &str = "_FillValue";

/// Name of the time dimension and coordinate variable.
const TIME: &str = "time";

enum VarData<'a> {
    /// Values, with `NaN` written as the fill value when one is set
    Doubles(&'a [f64], Option<f64>),
    ScalarInt,
}

struct VarEntry<'a> {
    name: &'a str,
    /// Uses the time dimension (id 0) or is scalar
    timed: bool,
    attributes: &'a Attributes,
    data: VarData<'a>,
}

impl VarEntry<'_> {
    fn nc_type(&self) -> i32 {
        match self.data {
            VarData::Doubles(..) => NC_DOUBLE,
            VarData::ScalarInt => NC_INT,
        }
    }

    fn vsize(&self) -> u64 {
        match self.data {
            VarData::Doubles(values, _) => values.len() as u64 * 8,
            VarData::ScalarInt => 4,
        }
    }
}

/// Encode a dataset as a CDF-2 byte stream.
pub fn encode_timeseries(dataset: &Timeseries) -> Result<Vec<u8>> {
    if dataset.is_empty() {
        return Err(ProcError::encode("netCDF", "dataset has no time steps"));
    }

    let time_attrs = time_attributes();
    let series_attrs = dataset
        .series
        .iter()
        .map(|series| with_fill_value(&series.name, &series.attributes))
        .collect::<Result<Vec<_>>>()?;
    let mut vars = Vec::with_capacity(1 + dataset.series.len() + dataset.descriptors.len());
    vars.push(VarEntry {
        name: TIME,
        timed: true,
        attributes: &time_attrs,
        data: VarData::Doubles(&dataset.time, None),
    });

    for (series, (attributes, fill)) in dataset.series.iter().zip(&series_attrs) {
        if series.values.len() != dataset.len() {
            return Err(ProcError::encode(
                "netCDF",
                format!(
                    "series '{}' has {} values for {} time steps",
                    series.name,
                    series.values.len(),
                    dataset.len()
                ),
            ));
        }
        vars.push(VarEntry {
            name: &series.name,
            timed: true,
            attributes,
            data: VarData::Doubles(&series.values, Some(*fill)),
        });
    }

    for descriptor in &dataset.descriptors {
        vars.push(VarEntry {
            name: &descriptor.name,
            timed: false,
            attributes: &descriptor.attributes,
            data: VarData::ScalarInt,
        });
    }

    let mut seen = std::collections::HashSet::new();
    for var in &vars {
        check_name(var.name)?;
        if !seen.insert(var.name) {
            return Err(ProcError::encode(
                "netCDF",
                format!("duplicate variable name '{}'", var.name),
            ));
        }
    }
    for key in dataset.attributes.keys() {
        check_name(key)?;
    }

    let dim_len = u32::try_from(dataset.len())
        .map_err(|_| ProcError::encode("netCDF", "time dimension too large"))?;
    for var in &vars {
        if var.vsize() > u32::MAX as u64 - 4 {
            return Err(ProcError::encode(
                "netCDF",
                format!("variable '{}' exceeds classic size limit", var.name),
            ));
        }
    }

    // Header size does not depend on the offsets, so measure it first.
    let placeholder = vec![0u64; vars.len()];
    let header_len = write_header(dim_len, &dataset.attributes, &vars, &placeholder)?.len() as u64;

    let mut offsets = Vec::with_capacity(vars.len());
    let mut next = header_len;
    for var in &vars {
        offsets.push(next);
        next += var.vsize();
    }

    let mut buf = write_header(dim_len, &dataset.attributes, &vars, &offsets)?;
    buf.reserve((next - header_len) as usize);
    for var in &vars {
        match var.data {
            VarData::Doubles(values, fill) => {
                for v in values {
                    let v = match fill {
                        Some(fill) if v.is_nan() => fill,
                        _ => *v,
                    };
                    buf.write_f64::<BigEndian>(v)?;
                }
            }
            VarData::ScalarInt => buf.write_i32::<BigEndian>(NC_FILL_INT)?,
        }
    }

    Ok(buf)
}

/// Write a dataset to `path`.
///
/// The file is written next to its destination and renamed into place,
/// so a failed write never leaves a truncated output behind.
pub fn write_timeseries(path: &Path, dataset: &Timeseries) -> Result<()> {
    let bytes = encode_timeseries(dataset)?;

    let mut tmp_name = path.as_os_str().to_owned();
    tmp_name.push(".part");
    let tmp_path = std::path::PathBuf::from(tmp_name);

    let result = (|| {
        let mut file = fs::File::create(&tmp_path)?;
        file.write_all(&bytes)?;
        file.sync_all()?;
        fs::rename(&tmp_path, path)
    })();

    if let Err(e) = result {
        let _ = fs::remove_file(&tmp_path);
        return Err(e.into());
    }
    Ok(())
}

fn time_attributes() -> Attributes {
    let mut attrs = Attributes::new();
    attrs.insert("axis".to_string(), "T".into());
    attrs.insert("calendar".to_string(), "gregorian".into());
    attrs.insert("long_name".to_string(), "Time".into());
    attrs.insert("standard_name".to_string(), "time".into());
    attrs.insert("units".to_string(), TIME_UNITS.into());
    attrs
}

/// Series attributes with `_FillValue` set, and the fill value itself.
///
/// A numeric `_FillValue` supplied by the backend is kept.
fn with_fill_value(name: &str, attributes: &Attributes) -> Result<(Attributes, f64)> {
    let fill = match attributes.get(FILL_VALUE) {
        None => NC_FILL_DOUBLE,
        Some(AttrValue::Float(v)) => *v,
        Some(AttrValue::Int(v)) => *v as f64,
        Some(AttrValue::Text(_)) => {
            return Err(ProcError::encode(
                "netCDF",
                format!("series '{name}' has a non-numeric {FILL_VALUE}"),
            ))
        }
    };
    let mut attributes = attributes.clone();
    attributes.insert(FILL_VALUE.to_string(), AttrValue::Float(fill));
    Ok((attributes, fill))
}

fn check_name(name: &str) -> Result<()> {
    if name.is_empty() || name.contains('/') || name.contains('\0') {
        return Err(ProcError::encode(
            "netCDF",
            format!("invalid name '{name}'"),
        ));
    }
    Ok(())
}

fn write_header(
    dim_len: u32,
    global_attrs: &Attributes,
    vars: &[VarEntry<'_>],
    offsets: &[u64],
) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    buf.write_all(MAGIC)?;
    buf.write_u8(VERSION_64BIT_OFFSET)?;
    buf.write_i32::<BigEndian>(0)?; // numrecs

    buf.write_i32::<BigEndian>(NC_DIMENSION)?;
    buf.write_i32::<BigEndian>(1)?;
    write_name(&mut buf, TIME)?;
    buf.write_u32::<BigEndian>(dim_len)?;

    write_attributes(&mut buf, global_attrs)?;

    buf.write_i32::<BigEndian>(NC_VARIABLE)?;
    buf.write_i32::<BigEndian>(vars.len() as i32)?;
    for (var, offset) in vars.iter().zip(offsets) {
        write_name(&mut buf, var.name)?;
        if var.timed {
            buf.write_i32::<BigEndian>(1)?;
            buf.write_i32::<BigEndian>(0)?; // time dimension id
        } else {
            buf.write_i32::<BigEndian>(0)?;
        }
        write_attributes(&mut buf, var.attributes)?;
        buf.write_i32::<BigEndian>(var.nc_type())?;
        buf.write_u32::<BigEndian>(var.vsize() as u32)?;
        buf.write_u64::<BigEndian>(*offset)?;
    }

    Ok(buf)
}

fn write_name(buf: &mut Vec<u8>, name: &str) -> Result<()> {
    buf.write_i32::<BigEndian>(name.len() as i32)?;
    buf.write_all(name.as_bytes())?;
    pad(buf, name.len());
    Ok(())
}

fn write_attributes(buf: &mut Vec<u8>, attrs: &Attributes) -> Result<()> {
    if attrs.is_empty() {
        // ABSENT
        buf.write_i32::<BigEndian>(0)?;
        buf.write_i32::<BigEndian>(0)?;
        return Ok(());
    }

    buf.write_i32::<BigEndian>(NC_ATTRIBUTE)?;
    buf.write_i32::<BigEndian>(attrs.len() as i32)?;
    for (name, value) in attrs {
        write_name(buf, name)?;
        match value {
            AttrValue::Text(text) => {
                buf.write_i32::<BigEndian>(NC_CHAR)?;
                buf.write_i32::<BigEndian>(text.len() as i32)?;
                buf.write_all(text.as_bytes())?;
                pad(buf, text.len());
            }
            AttrValue::Int(v) => match i32::try_from(*v) {
                Ok(small) => {
                    buf.write_i32::<BigEndian>(NC_INT)?;
                    buf.write_i32::<BigEndian>(1)?;
                    buf.write_i32::<BigEndian>(small)?;
                }
                Err(_) => {
                    buf.write_i32::<BigEndian>(NC_DOUBLE)?;
                    buf.write_i32::<BigEndian>(1)?;
                    buf.write_f64::<BigEndian>(*v as f64)?;
                }
            },
            AttrValue::Float(v) => {
                buf.write_i32::<BigEndian>(NC_DOUBLE)?;
                buf.write_i32::<BigEndian>(1)?;
                buf.write_f64::<BigEndian>(*v)?;
            }
        }
    }
    Ok(())
}

fn pad(buf: &mut Vec<u8>, len: usize) {
    let rem = len % 4;
    if rem != 0 {
        buf.extend(std::iter::repeat(0u8).take(4 - rem));
    }
}

// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! CSV form of a merged timeseries.
//!
//! Two flavours share the same column layout (`time`, then one column per
//! series, empty cell for `NaN`):
//! - [`write_timeseries`] writes the inspection sibling of a netCDF output,
//!   with ISO-8601 UTC times
//! - [`read_timeseries`] reads the exchange file of the merge command,
//!   where `time` holds epoch seconds

use std::path::Path;

use chrono::{DateTime, SecondsFormat};

use crate::timeseries::{Series, Timeseries};
use crate::{ProcError, Result};

/// Write the inspection CSV for a dataset.
pub fn write_timeseries(path: &Path, dataset: &Timeseries) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;

    let mut header = Vec::with_capacity(dataset.series.len() + 1);
    header.push("time");
    header.extend(dataset.series.iter().map(|s| s.name.as_str()));
    writer.write_record(&header)?;

    for (row, t) in dataset.time.iter().enumerate() {
        let mut record = Vec::with_capacity(header.len());
        record.push(format_time(*t));
        for series in &dataset.series {
            let v = series.values.get(row).copied().unwrap_or(f64::NAN);
            record.push(if v.is_nan() { String::new() } else { v.to_string() });
        }
        writer.write_record(&record)?;
    }

    writer.flush()?;
    Ok(())
}

/// Read an exchange CSV with epoch-second times.
///
/// Returns `None` for a missing, empty or header-only file.
pub fn read_timeseries(path: &Path) -> Result<Option<Timeseries>> {
    if !path.is_file() || std::fs::metadata(path)?.len() == 0 {
        return Ok(None);
    }

    let mut reader = csv::Reader::from_path(path)?;
    let headers = reader.headers()?.clone();
    if headers.get(0) != Some("time") {
        return Err(ProcError::encode(
            "CSV",
            format!("{}: first column must be 'time'", path.display()),
        ));
    }

    let mut time = Vec::new();
    let mut columns: Vec<Vec<f64>> = vec![Vec::new(); headers.len() - 1];
    for (line, record) in reader.records().enumerate() {
        let record = record?;
        let t = parse_cell(record.get(0).unwrap_or(""))
            .filter(|t| !t.is_nan())
            .ok_or_else(|| {
                ProcError::encode("CSV", format!("row {}: missing time value", line + 1))
            })?;
        time.push(t);
        for (i, column) in columns.iter_mut().enumerate() {
            let cell = record.get(i + 1).unwrap_or("");
            let v = parse_cell(cell).ok_or_else(|| {
                ProcError::encode(
                    "CSV",
                    format!("row {}: invalid number '{cell}' in '{}'", line + 1, &headers[i + 1]),
                )
            })?;
            column.push(v);
        }
    }

    if time.is_empty() {
        return Ok(None);
    }

    let mut dataset = Timeseries::new(time);
    for (name, values) in headers.iter().skip(1).zip(columns) {
        dataset.push_series(Series::new(name, values))?;
    }
    Ok(Some(dataset))
}

fn parse_cell(cell: &str) -> Option<f64> {
    let cell = cell.trim();
    if cell.is_empty() || cell.eq_ignore_ascii_case("nan") {
        return Some(f64::NAN);
    }
    cell.parse().ok()
}

fn format_time(seconds: f64) -> String {
    let secs = seconds.floor();
    let nanos = ((seconds - secs) * 1e9).round() as u32;
    match DateTime::from_timestamp(secs as i64, nanos.min(999_999_999)) {
        Some(dt) => dt.to_rfc3339_opts(SecondsFormat::AutoSi, true),
        None => seconds.to_string(),
    }
}

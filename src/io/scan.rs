// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Directory scans used for progress accounting and grouping.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use crate::{ProcError, Result};

/// Count regular files in `dir` whose name ends with `.<suffix>`.
pub fn count_with_suffix(dir: &Path, suffix: &str) -> Result<usize> {
    let ending = format!(".{suffix}");
    let mut count = 0;
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        if entry.file_name().to_string_lossy().ends_with(&ending) {
            count += 1;
        }
    }
    Ok(count)
}

/// All `*.nc` files directly inside `dir`, sorted.
pub fn netcdf_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let pattern = format!(
        "{}/*.nc",
        glob::Pattern::escape(&dir.to_string_lossy())
    );
    let mut files = Vec::new();
    for entry in glob::glob(&pattern).map_err(|e| ProcError::config(e.to_string()))? {
        let path = entry.map_err(|e| ProcError::Io(e.into_error()))?;
        if path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Number of `*.nc` files directly inside `dir`.
pub fn count_nc(dir: &Path) -> Result<usize> {
    Ok(netcdf_files(dir)?.len())
}

/// Group key of a file: its name up to the first `.`.
///
/// `ru39-20250423T1535-001.tbd.nc` → `ru39-20250423T1535-001`
pub fn group_key(path: &Path) -> Option<String> {
    let name = path.file_name()?.to_str()?;
    let key = name.split('.').next()?;
    (!key.is_empty()).then(|| key.to_string())
}

/// Distinct group keys of the `*.nc` files in `dir`, in lexicographic order.
pub fn group_keys(dir: &Path) -> Result<Vec<String>> {
    let keys: BTreeSet<String> = netcdf_files(dir)?
        .iter()
        .filter_map(|p| group_key(p))
        .collect();
    Ok(keys.into_iter().collect())
}

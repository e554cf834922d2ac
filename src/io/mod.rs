// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! File I/O for the pipeline.
//!
//! - [`netcdf`] - classic netCDF encoder for merged output
//! - [`csv`] - inspection CSV and merge exchange CSV
//! - [`scan`] - suffix counts and group keys of data directories

pub mod csv;
pub mod netcdf;
pub mod scan;

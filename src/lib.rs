// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! # gliderproc
//!
//! Processing pipeline for Slocum glider deployments.
//!
//! Two stages run over a fixed per-deployment directory tree:
//! - **binary → raw netCDF** in [`stages::binary_to_rawnc`]: incremental decode of
//!   the paired science/flight binary files
//! - **raw netCDF → timeseries** in [`stages::rawnc_to_timeseries`]: one merge per
//!   trajectory or segment group, annotated from `deployment.yml`
//!
//! Frame decoding and profile segmentation are done by an external toolkit
//! behind the [`GliderBackend`] trait.
//!
//! ## Architecture
//!
//! - `deployment/` - deployment ids, modes and path resolution
//! - `stages/` - per-deployment drivers and their reports
//! - `backend/` - decode/merge interface and the external command adapter
//! - `timeseries/` - merged dataset model and YAML metadata injection
//! - `io/` - netCDF and CSV writers, directory scans
//! - `logging` - per-stage and per-deployment log sinks
//! - `config` - data root and optional TOML settings
//!
//! ## Example: Converting binary files
//!
//! ```rust,no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use gliderproc::config::{DataRoot, ProcConfig};
//! use gliderproc::logging::{LogLevel, StageLogger};
//! use gliderproc::stages::{self, StageContext};
//! use gliderproc::{CommandBackend, Mode, Stage};
//!
//! let config = ProcConfig::default();
//! let root = DataRoot::from_env(false)?;
//! let logger = StageLogger::new(Stage::BinaryToRawnc, LogLevel::Info)
//!     .with_base_log(&config.log_root())?;
//! let backend = CommandBackend::new(config.decode.clone(), config.merge.clone());
//!
//! let ctx = StageContext::new(&root, backend, &logger);
//! let report = stages::run_binary_to_rawnc(&ctx, Mode::Rt, &["ru39-20250423T1535".into()]);
//! std::process::exit(report.exit_code());
//! # }
//! ```

// Core types
pub mod core;

// Re-export core types for convenience
pub use crate::core::{ProcError, Result, Stage};

// Deployment discovery
pub mod deployment;

pub use deployment::{locate, DeploymentId, DeploymentPaths, LocateError, Mode};

// Configuration
pub mod config;

// Logging sinks
pub mod logging;

// Merged dataset model
pub mod timeseries;

pub use timeseries::{Series, Timeseries};

// File I/O (netCDF, CSV, directory scans)
pub mod io;

// Decode/merge backends
pub mod backend;

pub use backend::{CommandBackend, GliderBackend};

// Stage drivers
pub mod stages;

pub use stages::{DeploymentReport, Outcome, StageContext, StageReport};

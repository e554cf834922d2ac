// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! # gliderproc CLI
//!
//! Glider deployment processing from the command line.
//!
//! ## Usage
//!
//! ```sh
//! # Show where a deployment lives
//! gliderproc locate ru39-20250423T1535
//!
//! # Decode real-time binary files
//! gliderproc binary-to-rawnc ru39-20250423T1535 -m rt
//!
//! # Merge delayed-mode raw files per segment, with CSV copies
//! gliderproc rawnc-to-timeseries ru39-20250423T1535 -m delayed --grouping segment --csv
//! ```

mod cmd;
mod common;

use std::process;

use clap::{Parser, Subcommand};
use cmd::{BinaryCmd, LocateCmd, TimeseriesCmd};
use common::Result;

/// gliderproc - Slocum glider deployment processing
///
/// Each command takes one or more deployment names of the form
/// `<glider>-<YYYYMMDDThhmm>` and processes them one after another.
#[derive(Parser, Clone)]
#[command(name = "gliderproc")]
#[command(about = "Glider binary to timeseries processing pipeline", long_about = None)]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(author = "ArcheBase")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand, Clone)]
enum Commands {
    /// Resolve deployment names to their directories
    Locate(LocateCmd),

    /// Convert binary files into raw netCDF files
    BinaryToRawnc(BinaryCmd),

    /// Merge raw netCDF files into timeseries files
    RawncToTimeseries(TimeseriesCmd),
}

fn run() -> Result<i32> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Locate(cmd) => cmd.run(),
        Commands::BinaryToRawnc(cmd) => cmd.run(),
        Commands::RawncToTimeseries(cmd) => cmd.run(),
    }
}

fn main() {
    dotenvy::dotenv().ok();

    match run() {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("Error: {e:#}");
            process::exit(1);
        }
    }
}

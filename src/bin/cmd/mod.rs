// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! CLI subcommands.

mod binary;
mod locate;
mod timeseries;

pub use binary::BinaryCmd;
pub use locate::LocateCmd;
pub use timeseries::TimeseriesCmd;

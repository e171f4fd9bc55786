// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Stampscan — Core types, configuration and error definitions shared by the
// document pipeline and the command-line front end.

pub mod config;
pub mod error;
pub mod human_errors;
pub mod types;

pub use config::{ConvertOptions, OutputFormat, ScanConfig};
pub use error::{ScanError, Stage};
pub use types::*;

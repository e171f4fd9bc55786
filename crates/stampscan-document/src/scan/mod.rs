// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scan stages — document location, perspective rectification, stamp masking,
// scan enhancement and compositing.

pub mod composite;
pub mod enhance;
pub mod geometry;
pub mod locate;
pub mod rectify;
pub mod stamp;

pub use composite::composite;
pub use enhance::{ScanEnhancer, enhance};
pub use locate::locate;
pub use rectify::rectify;
pub use stamp::{ColorMask, extract_red_mask};

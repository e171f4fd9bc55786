// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image module — decoding scan sources, working-resolution resizing, and
// encoding the finished scan.

pub mod processor;

pub use processor::{ImageProcessor, resize_to_height};

// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// stampscan-document — Document processing for Stampscan.
//
// Provides image loading and encoding, the scan stages (page location,
// perspective rectification, stamp masking, enhancement, compositing), and the
// pipeline that chains them into a file-to-file conversion.

pub mod image;
pub mod pipeline;
pub mod scan;

// Re-export the primary entry points so callers can use
// `stampscan_document::convert_to_scan` etc.
pub use image::processor::ImageProcessor;
pub use pipeline::{
    ScanOutcome, ScanPipeline, ScanResult, convert_file, convert_to_scan, convert_with_options,
    output_path_for,
};
pub use scan::enhance::ScanEnhancer;

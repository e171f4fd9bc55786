// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scan configuration. Values are tuned defaults, built once per conversion
// and never mutated by the pipeline.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{Result, ScanError};

/// Largest background kernel side. Square structuring elements take a `u8`
/// radius, so the side is capped at `2 * 255 + 1`.
pub const MAX_BACKGROUND_KERNEL: u32 = 2 * u8::MAX as u32 + 1;

/// An inclusive hue band on the 0–180 hue scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HueRange {
    pub min: u8,
    pub max: u8,
}

impl HueRange {
    pub const fn new(min: u8, max: u8) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, hue: u8) -> bool {
        (self.min..=self.max).contains(&hue)
    }
}

/// Parameters for document location, stamp masking, and enhancement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanConfig {
    // -- Document locator --
    /// Height the photo is resized to before edge detection.
    pub working_height: u32,
    /// Sigma of the pre-edge blur (a 5x5 kernel at sigma 1.1).
    pub locate_blur_sigma: f32,
    /// Canny hysteresis thresholds.
    pub canny_low: f32,
    pub canny_high: f32,
    /// How many of the largest contours are tried.
    pub max_candidates: usize,
    /// Polygon approximation tolerance as a fraction of contour perimeter.
    pub approx_epsilon_fraction: f64,
    /// Minimum outline area as a fraction of the working image.
    pub min_area_fraction: f32,

    // -- Stamp mask --
    pub red_hue_ranges: [HueRange; 2],
    pub min_saturation: u8,
    pub min_value: u8,
    /// Chebyshev radius of the mask dilation (1 = 3x3 square).
    pub mask_dilation_radius: u8,

    // -- Enhancer --
    /// Background kernel side as a fraction of the shorter image side.
    pub background_kernel_fraction: f32,
    pub gamma: f32,
    /// Values above this are clipped before the min-max stretch.
    pub truncate_threshold: u8,
    pub sharpen_sigma: f32,
    /// Weight of the processed image in the unsharp mask; the blurred copy
    /// gets `1 - sharpen_amount`.
    pub sharpen_amount: f32,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            working_height: 500,
            locate_blur_sigma: 1.1,
            canny_low: 75.0,
            canny_high: 200.0,
            max_candidates: 5,
            approx_epsilon_fraction: 0.02,
            min_area_fraction: 0.2,
            red_hue_ranges: [HueRange::new(0, 10), HueRange::new(156, 180)],
            min_saturation: 43,
            min_value: 46,
            mask_dilation_radius: 1,
            background_kernel_fraction: 0.02,
            gamma: 1.5,
            truncate_threshold: 230,
            sharpen_sigma: 2.0,
            sharpen_amount: 1.5,
        }
    }
}

impl ScanConfig {
    /// Reject values the pipeline cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.working_height < 16 {
            return Err(ScanError::InvalidConfig(format!(
                "working_height must be at least 16, got {}",
                self.working_height
            )));
        }
        if self.canny_low < 0.0 || self.canny_high < self.canny_low {
            return Err(ScanError::InvalidConfig(format!(
                "canny thresholds must satisfy 0 <= low <= high, got {}/{}",
                self.canny_low, self.canny_high
            )));
        }
        if self.max_candidates == 0 {
            return Err(ScanError::InvalidConfig("max_candidates must be non-zero".into()));
        }
        if !(self.min_area_fraction > 0.0 && self.min_area_fraction <= 1.0) {
            return Err(ScanError::InvalidConfig(format!(
                "min_area_fraction must be in (0, 1], got {}",
                self.min_area_fraction
            )));
        }
        if !(self.approx_epsilon_fraction > 0.0) {
            return Err(ScanError::InvalidConfig(
                "approx_epsilon_fraction must be positive".into(),
            ));
        }
        if let Some(range) = self.red_hue_ranges.iter().find(|r| r.min > r.max || r.max > 180) {
            return Err(ScanError::InvalidConfig(format!(
                "hue range {}..={} is not within 0..=180",
                range.min, range.max
            )));
        }
        if !(self.gamma > 0.0) {
            return Err(ScanError::InvalidConfig(format!(
                "gamma must be positive, got {}",
                self.gamma
            )));
        }
        if !(self.locate_blur_sigma > 0.0 && self.sharpen_sigma > 0.0) {
            return Err(ScanError::InvalidConfig("blur sigmas must be positive".into()));
        }
        if !(self.background_kernel_fraction >= 0.0 && self.background_kernel_fraction < 0.5) {
            return Err(ScanError::InvalidConfig(format!(
                "background_kernel_fraction must be in [0, 0.5), got {}",
                self.background_kernel_fraction
            )));
        }
        Ok(())
    }

    /// Side of the square background-estimation kernel for an image of the
    /// given size: 2% of the shorter side, forced odd, at least 3 and at most
    /// [`MAX_BACKGROUND_KERNEL`].
    pub fn background_kernel_size(&self, width: u32, height: u32) -> u32 {
        let side = (width.min(height) as f32 * self.background_kernel_fraction) as u32;
        (side | 1).clamp(3, MAX_BACKGROUND_KERNEL)
    }

    /// Radius of the background kernel, as taken by a square structuring
    /// element.
    pub fn background_kernel_radius(&self, width: u32, height: u32) -> u8 {
        let radius = self.background_kernel_size(width, height) / 2;
        u8::try_from(radius).unwrap_or(u8::MAX)
    }
}

/// Encoding used for the written scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputFormat {
    Jpeg { quality: u8 },
    Png,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Jpeg { .. } => "jpg",
            Self::Png => "png",
        }
    }
}

impl Default for OutputFormat {
    fn default() -> Self {
        Self::Jpeg { quality: 95 }
    }
}

/// Where and how a conversion writes its result.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConvertOptions {
    /// Directory for the output file; the input's directory when `None`.
    pub output_dir: Option<PathBuf>,
    pub format: OutputFormat,
}

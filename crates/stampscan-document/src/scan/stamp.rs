// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Stamp mask extraction — find red ink (seals, signatures in red) so the
// compositor can keep those pixels in their original colour.

use image::{GrayImage, Luma, RgbImage};
use imageproc::distance_transform::Norm;
use imageproc::morphology;
use stampscan_core::config::ScanConfig;
use tracing::{debug, instrument};

/// A binary mask aligned with a reference image: every pixel is 0 or 255.
///
/// 255 marks pixels whose original colour must survive into the final scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorMask(GrayImage);

impl ColorMask {
    /// Build a mask from any grayscale image; non-zero pixels become 255.
    pub fn from_gray(mut gray: GrayImage) -> Self {
        for p in gray.pixels_mut() {
            if p.0[0] != 0 {
                p.0[0] = 255;
            }
        }
        Self(gray)
    }

    /// An all-zero mask.
    pub fn empty(width: u32, height: u32) -> Self {
        Self(GrayImage::new(width, height))
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.0.dimensions()
    }

    pub fn is_set(&self, x: u32, y: u32) -> bool {
        self.0.get_pixel(x, y).0[0] == 255
    }

    /// Number of set pixels.
    pub fn count(&self) -> u64 {
        self.0.as_raw().iter().filter(|&&v| v == 255).count() as u64
    }

    /// True when every pixel set in `other` is also set in `self`.
    pub fn is_superset_of(&self, other: &ColorMask) -> bool {
        self.dimensions() == other.dimensions()
            && self
                .0
                .as_raw()
                .iter()
                .zip(other.0.as_raw())
                .all(|(&mine, &theirs)| mine == 255 || theirs == 0)
    }

    pub fn as_gray(&self) -> &GrayImage {
        &self.0
    }

    pub fn into_gray(self) -> GrayImage {
        self.0
    }
}

/// Convert an RGB pixel to 8-bit HSV: hue on 0–180 (degrees halved),
/// saturation and value on 0–255.
pub fn rgb_to_hsv([r, g, b]: [u8; 3]) -> [u8; 3] {
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let diff = (max - min) as f32;

    let v = max;
    let s = if max == 0 {
        0
    } else {
        (255.0 * diff / max as f32).round() as u8
    };

    if diff == 0.0 {
        return [0, s, v];
    }

    let (r, g, b) = (r as f32, g as f32, b as f32);
    let degrees = if max as f32 == r {
        60.0 * (g - b) / diff
    } else if max as f32 == g {
        120.0 + 60.0 * (b - r) / diff
    } else {
        240.0 + 60.0 * (r - g) / diff
    };
    let degrees = if degrees < 0.0 { degrees + 360.0 } else { degrees };
    // Halves go to the even neighbour, so 21 degrees lands on 10, inside the
    // lower red band.
    let h = (degrees / 2.0).round_ties_even();

    [h as u8, s, v]
}

/// Mask of pixels that fall in either red hue band with enough saturation and
/// brightness, before any dilation.
pub fn red_union_mask(image: &RgbImage, config: &ScanConfig) -> ColorMask {
    let (w, h) = image.dimensions();
    let mask = GrayImage::from_fn(w, h, |x, y| {
        let [hue, sat, val] = rgb_to_hsv(image.get_pixel(x, y).0);
        let red = sat >= config.min_saturation
            && val >= config.min_value
            && config.red_hue_ranges.iter().any(|range| range.contains(hue));
        Luma([if red { 255 } else { 0 }])
    });
    ColorMask(mask)
}

/// Compute the stamp mask for a (rectified) document image.
///
/// Pixels in either red hue band are selected, then the union is dilated with
/// a square element so anti-aliased stamp edges are kept too.
#[instrument(skip_all, fields(width = image.width(), height = image.height()))]
pub fn extract_red_mask(image: &RgbImage, config: &ScanConfig) -> ColorMask {
    let union = red_union_mask(image, config);
    let before = union.count();

    let mask = if config.mask_dilation_radius == 0 {
        union
    } else {
        ColorMask::from_gray(morphology::dilate(
            union.as_gray(),
            Norm::LInf,
            config.mask_dilation_radius,
        ))
    };

    debug!(red_pixels = before, masked_pixels = mask.count(), "Stamp mask extracted");
    mask
}

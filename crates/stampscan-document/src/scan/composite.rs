// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Compositor — put the original-colour stamp pixels back on top of the
// enhanced scan.

use image::RgbImage;
use stampscan_core::error::{Result, ScanError};
use tracing::{debug, instrument};

use super::stamp::ColorMask;

/// Select `original` where the mask is set and `enhanced` everywhere else.
///
/// Hard per-pixel selection, no blending, so stamp edges follow the mask
/// exactly. All three inputs must share the same dimensions.
#[instrument(skip_all, fields(width = enhanced.width(), height = enhanced.height()))]
pub fn composite(enhanced: &RgbImage, original: &RgbImage, mask: &ColorMask) -> Result<RgbImage> {
    let expected = enhanced.dimensions();
    for actual in [original.dimensions(), mask.dimensions()] {
        if actual != expected {
            return Err(ScanError::DimensionMismatch { expected, actual });
        }
    }

    let mut output = enhanced.clone();
    let selector = mask.as_gray().as_raw();
    for ((out, orig), &m) in output
        .pixels_mut()
        .zip(original.pixels())
        .zip(selector.iter())
    {
        if m == 255 {
            *out = *orig;
        }
    }

    debug!(kept = mask.count(), "Stamp pixels composited");
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma, Rgb};

    fn checker_mask(w: u32, h: u32) -> ColorMask {
        ColorMask::from_gray(GrayImage::from_fn(w, h, |x, y| {
            Luma([if (x / 3 + y / 2) % 2 == 0 { 255 } else { 0 }])
        }))
    }

    #[test]
    fn selects_exact_pixels() {
        let (w, h) = (23, 17);
        let enhanced = RgbImage::from_fn(w, h, |x, _| {
            let v = (x * 11) as u8;
            Rgb([v, v, v])
        });
        let original = RgbImage::from_fn(w, h, |x, y| Rgb([200, (x * 7) as u8, (y * 13) as u8]));
        let mask = checker_mask(w, h);

        let out = composite(&enhanced, &original, &mask).expect("composite");
        for y in 0..h {
            for x in 0..w {
                let want = if mask.is_set(x, y) {
                    original.get_pixel(x, y)
                } else {
                    enhanced.get_pixel(x, y)
                };
                assert_eq!(out.get_pixel(x, y), want, "pixel ({}, {})", x, y);
            }
        }
    }

    #[test]
    fn empty_mask_returns_enhanced() {
        let enhanced = RgbImage::from_pixel(8, 8, Rgb([250, 250, 250]));
        let original = RgbImage::from_pixel(8, 8, Rgb([200, 20, 20]));
        let out = composite(&enhanced, &original, &ColorMask::empty(8, 8)).expect("composite");
        assert_eq!(out, enhanced);
    }

    #[test]
    fn size_mismatch_is_rejected() {
        let enhanced = RgbImage::new(10, 10);
        let original = RgbImage::new(10, 10);
        let err = composite(&enhanced, &original, &ColorMask::empty(10, 9))
            .err()
            .expect("mismatch must fail");
        assert!(matches!(
            err,
            ScanError::DimensionMismatch {
                expected: (10, 10),
                actual: (10, 9)
            }
        ));
    }
}

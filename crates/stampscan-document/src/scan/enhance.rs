// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scan enhancement — turn a flattened page photo into a clean, scanner-like
// grayscale image.

use image::{GrayImage, Luma, RgbImage, imageops};
use imageproc::filter::gaussian_blur_f32;
use imageproc::morphology::{Mask, grayscale_close};
use stampscan_core::config::ScanConfig;
use tracing::{debug, info, instrument};

/// Enhances a rectified page photo into a clean grayscale scan.
///
/// Each step consumes `self` and returns the transformed enhancer, so steps
/// can be chained or run individually:
///
/// ```ignore
/// let scan = ScanEnhancer::from_rgb(&page)
///     .remove_background(10)
///     .apply_gamma(1.5)
///     .shape_contrast(230)
///     .unsharp_mask(2.0, 1.5)
///     .into_rgb();
/// ```
pub struct ScanEnhancer {
    /// The working grayscale image.
    gray: GrayImage,
}

impl ScanEnhancer {
    // -- Construction ---------------------------------------------------------

    /// Start from a colour image (converted to luma).
    pub fn from_rgb(image: &RgbImage) -> Self {
        Self {
            gray: imageops::grayscale(image),
        }
    }

    pub fn from_gray(gray: GrayImage) -> Self {
        Self { gray }
    }

    // -- Accessors ------------------------------------------------------------

    pub fn as_gray(&self) -> &GrayImage {
        &self.gray
    }

    pub fn into_gray(self) -> GrayImage {
        self.gray
    }

    /// Consume the enhancer and return the result as three equal channels.
    pub fn into_rgb(self) -> RgbImage {
        let (w, h) = self.gray.dimensions();
        RgbImage::from_fn(w, h, |x, y| {
            let v = self.gray.get_pixel(x, y).0[0];
            image::Rgb([v, v, v])
        })
    }

    // -- Enhancement steps ----------------------------------------------------

    /// Divide out uneven illumination.
    ///
    /// A grayscale closing with a `2 * radius + 1` square wipes out ink
    /// strokes narrower than the square and leaves the paper's slowly varying
    /// brightness. Dividing by that estimate flattens shadows and gradients
    /// while the stroke edges stay sharp.
    #[instrument(skip(self))]
    pub fn remove_background(self, radius: u8) -> Self {
        let background = grayscale_close(&self.gray, &Mask::square(radius));

        let mut out = self.gray;
        for (p, bg) in out.pixels_mut().zip(background.pixels()) {
            let bg = bg.0[0];
            p.0[0] = if bg == 0 {
                0
            } else {
                (p.0[0] as f32 * 255.0 / bg as f32).round().min(255.0) as u8
            };
        }

        debug!(radius, "Background divided out");
        Self { gray: out }
    }

    /// Power-law mapping `255 * (v / 255) ^ gamma`. Gamma above 1 darkens
    /// mid-tones and leaves pure black and white untouched.
    #[instrument(skip(self))]
    pub fn apply_gamma(self, gamma: f32) -> Self {
        let table: [u8; 256] =
            std::array::from_fn(|i| ((i as f32 / 255.0).powf(gamma) * 255.0) as u8);

        let mut out = self.gray;
        for p in out.pixels_mut() {
            p.0[0] = table[p.0[0] as usize];
        }
        Self { gray: out }
    }

    /// Clip highlights at `threshold`, then stretch the remaining range to
    /// 0–255.
    ///
    /// Unlike a plain min-max normalisation, which maps a flat image to all
    /// zeros, a flat image (every pixel equal after clipping) is left as is,
    /// so a blank page stays light.
    #[instrument(skip(self))]
    pub fn shape_contrast(self, threshold: u8) -> Self {
        let mut out = self.gray;
        for p in out.pixels_mut() {
            p.0[0] = p.0[0].min(threshold);
        }

        let (min, max) = out
            .pixels()
            .fold((u8::MAX, u8::MIN), |(lo, hi), p| (lo.min(p.0[0]), hi.max(p.0[0])));
        if max > min {
            let range = (max - min) as f32;
            for p in out.pixels_mut() {
                p.0[0] = ((p.0[0] - min) as f32 * 255.0 / range).round() as u8;
            }
        }

        debug!(min, max, "Contrast stretched");
        Self { gray: out }
    }

    /// Sharpen with `amount * image - (amount - 1) * blurred`, clamped.
    #[instrument(skip(self))]
    pub fn unsharp_mask(self, sigma: f32, amount: f32) -> Self {
        let blurred = gaussian_blur_f32(&self.gray, sigma);
        let blur_weight = 1.0 - amount;

        let mut out = self.gray;
        for (p, b) in out.pixels_mut().zip(blurred.pixels()) {
            let v = amount * p.0[0] as f32 + blur_weight * b.0[0] as f32;
            p.0[0] = v.round().clamp(0.0, 255.0) as u8;
        }
        Self { gray: out }
    }

    // -- Enhancement pipeline -------------------------------------------------

    /// Run every step with the parameters from `config`:
    ///
    /// 1. Background removal (closing kernel ~2% of the shorter side)
    /// 2. Gamma correction (1.5)
    /// 3. Highlight clipping at 230 and min-max stretch
    /// 4. Unsharp masking (sigma 2.0, weights 1.5 / -0.5)
    #[instrument(skip_all, fields(width = self.gray.width(), height = self.gray.height()))]
    pub fn enhance_scan(self, config: &ScanConfig) -> Self {
        let (w, h) = self.gray.dimensions();
        let radius = config.background_kernel_radius(w, h);

        let enhanced = self
            .remove_background(radius)
            .apply_gamma(config.gamma)
            .shape_contrast(config.truncate_threshold)
            .unsharp_mask(config.sharpen_sigma, config.sharpen_amount);

        info!(background_radius = radius, "Scan enhancement complete");
        enhanced
    }
}

/// Enhance a colour page image into a scan-like image with equal channels.
pub fn enhance(image: &RgbImage, config: &ScanConfig) -> RgbImage {
    ScanEnhancer::from_rgb(image).enhance_scan(config).into_rgb()
}

/// Mean and standard deviation of a grayscale image.
pub fn luma_stats(gray: &GrayImage) -> (f64, f64) {
    let n = gray.width() as f64 * gray.height() as f64;
    if n == 0.0 {
        return (0.0, 0.0);
    }
    let mean = gray.pixels().map(|Luma([v])| *v as f64).sum::<f64>() / n;
    let var = gray
        .pixels()
        .map(|Luma([v])| (*v as f64 - mean).powi(2))
        .sum::<f64>()
        / n;
    (mean, var.sqrt())
}

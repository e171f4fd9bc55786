// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the Stampscan pipeline.

use serde::{Deserialize, Serialize};

/// A point in image space (pixels, origin at the top-left corner).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point2D {
    pub x: f32,
    pub y: f32,
}

impl Point2D {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to `other`.
    pub fn distance(&self, other: &Point2D) -> f32 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }

    /// Scale both coordinates by `factor`.
    pub fn scaled(&self, factor: f32) -> Self {
        Self::new(self.x * factor, self.y * factor)
    }
}

impl From<(f32, f32)> for Point2D {
    fn from((x, y): (f32, f32)) -> Self {
        Self::new(x, y)
    }
}

impl From<Point2D> for (f32, f32) {
    fn from(p: Point2D) -> Self {
        (p.x, p.y)
    }
}

/// Four corners of a document outline.
///
/// The stored order is whatever the producer supplied. Call
/// [`Quadrilateral::ordered`] to get the canonical
/// `[top-left, top-right, bottom-right, bottom-left]` arrangement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quadrilateral {
    pub points: [Point2D; 4],
}

impl Quadrilateral {
    pub fn new(points: [Point2D; 4]) -> Self {
        Self { points }
    }

    /// Reorder the corners as `[top-left, top-right, bottom-right, bottom-left]`.
    ///
    /// Top-left has the smallest `x + y`, bottom-right the largest. Top-right
    /// has the smallest `y - x`, bottom-left the largest. Ties resolve to the
    /// first matching point in `x`-then-`y` order, so the result does not
    /// depend on the input permutation.
    pub fn ordered(&self) -> Self {
        let mut pts = self.points;
        pts.sort_by(|a, b| a.x.total_cmp(&b.x).then(a.y.total_cmp(&b.y)));

        let pick = |key: fn(&Point2D) -> f32, largest: bool| -> Point2D {
            let mut best = pts[0];
            for p in &pts[1..] {
                let better = if largest {
                    key(p) > key(&best)
                } else {
                    key(p) < key(&best)
                };
                if better {
                    best = *p;
                }
            }
            best
        };

        let sum = |p: &Point2D| p.x + p.y;
        let diff = |p: &Point2D| p.y - p.x;

        Self {
            points: [
                pick(sum, false),
                pick(diff, false),
                pick(sum, true),
                pick(diff, true),
            ],
        }
    }

    pub fn top_left(&self) -> Point2D {
        self.points[0]
    }

    pub fn top_right(&self) -> Point2D {
        self.points[1]
    }

    pub fn bottom_right(&self) -> Point2D {
        self.points[2]
    }

    pub fn bottom_left(&self) -> Point2D {
        self.points[3]
    }

    /// Scale every corner by `factor`.
    pub fn scaled(&self, factor: f32) -> Self {
        Self {
            points: self.points.map(|p| p.scaled(factor)),
        }
    }

    /// Enclosed area by the shoelace formula, assuming the stored order walks
    /// the outline.
    pub fn area(&self) -> f32 {
        let mut twice = 0.0f32;
        for i in 0..4 {
            let a = self.points[i];
            let b = self.points[(i + 1) % 4];
            twice += a.x * b.y - b.x * a.y;
        }
        twice.abs() / 2.0
    }
}

/// Image formats accepted as scan input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InputFormat {
    Jpeg,
    Png,
    Bmp,
    Tiff,
}

impl InputFormat {
    /// Infer the input format from a file extension (case-insensitive).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "png" => Some(Self::Png),
            "bmp" => Some(Self::Bmp),
            "tif" | "tiff" => Some(Self::Tiff),
            _ => None,
        }
    }

    /// MIME type string, used in diagnostics.
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
            Self::Bmp => "image/bmp",
            Self::Tiff => "image/tiff",
        }
    }
}

/// Diagnostics for one pipeline run.
///
/// Returned alongside the output so the caller can decide what to log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanReport {
    /// Dimensions of the decoded source image.
    pub source_size: (u32, u32),
    /// The detected outline in source coordinates, canonically ordered.
    pub quadrilateral: Option<Quadrilateral>,
    /// True when no usable outline was found and the full frame was processed.
    pub fallback_used: bool,
    /// Dimensions of the rectified (and final) image.
    pub output_size: (u32, u32),
    /// Number of pixels kept in their original colour.
    pub stamp_pixels: u64,
}

impl ScanReport {
    pub fn quadrilateral_found(&self) -> bool {
        self.quadrilateral.is_some()
    }

    /// Fraction of the output covered by the stamp mask.
    pub fn stamp_coverage(&self) -> f64 {
        let total = self.output_size.0 as u64 * self.output_size.1 as u64;
        if total == 0 {
            return 0.0;
        }
        self.stamp_pixels as f64 / total as f64
    }
}

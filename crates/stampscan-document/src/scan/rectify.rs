// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Perspective rectifier — warp a located page outline into an upright,
// axis-aligned rectangle.

use image::{Rgb, RgbImage};
use imageproc::geometric_transformations::{Interpolation, Projection, warp_into};
use stampscan_core::error::{Result, ScanError};
use stampscan_core::types::Quadrilateral;
use tracing::{debug, info, instrument};

/// Output size for a quadrilateral: the longer of each pair of opposite
/// edges.
///
/// Corners are pixel centres, so an edge running from pixel 0 to pixel
/// `n - 1` has length `n - 1` and spans `n` output pixels.
pub fn output_size(quad: &Quadrilateral) -> (u32, u32) {
    let q = quad.ordered();
    let width = q
        .top_left()
        .distance(&q.top_right())
        .max(q.bottom_left().distance(&q.bottom_right()));
    let height = q
        .top_left()
        .distance(&q.bottom_left())
        .max(q.top_right().distance(&q.bottom_right()));
    (width.round() as u32 + 1, height.round() as u32 + 1)
}

/// Warp the region of `image` outlined by `quad` onto an upright rectangle.
///
/// The corners are ordered canonically first, so `quad` may list them in
/// any order. The output aspect ratio follows the outline, not the photo.
#[instrument(skip(image), fields(width = image.width(), height = image.height()))]
pub fn rectify(image: &RgbImage, quad: &Quadrilateral) -> Result<RgbImage> {
    let ordered = quad.ordered();
    if ordered
        .points
        .iter()
        .any(|p| !p.x.is_finite() || !p.y.is_finite())
    {
        return Err(ScanError::InvalidGeometry(format!(
            "non-finite corner in {:?}",
            ordered.points
        )));
    }

    if ordered.area() < 1.0 {
        return Err(ScanError::InvalidGeometry(format!(
            "outline {:?} encloses no area",
            ordered.points
        )));
    }

    let (out_w, out_h) = output_size(&ordered);
    if out_w < 2 || out_h < 2 {
        return Err(ScanError::InvalidGeometry(format!(
            "outline collapses to {}x{}",
            out_w, out_h
        )));
    }
    debug!(out_w, out_h, corners = ?ordered.points, "Rectifying outline");

    // Bilinear sampling needs a right/bottom neighbour for every sample, so
    // the source gets a one-pixel replicated border and the corners shift
    // with it. Without it the last row and column of an outline that touches
    // the frame edge would come out as the fill colour.
    let padded = pad_replicate(image);
    let src: [(f32, f32); 4] = ordered.points.map(|p| (p.x + 1.0, p.y + 1.0));

    let (max_x, max_y) = ((out_w - 1) as f32, (out_h - 1) as f32);
    let dest: [(f32, f32); 4] = [
        (0.0, 0.0),     // top-left
        (max_x, 0.0),   // top-right
        (max_x, max_y), // bottom-right
        (0.0, max_y),   // bottom-left
    ];

    let projection = Projection::from_control_points(src, dest).ok_or_else(|| {
        ScanError::InvalidGeometry(format!(
            "no perspective transform for corners {:?}",
            ordered.points
        ))
    })?;

    let mut output = RgbImage::new(out_w, out_h);
    warp_into(
        &padded,
        &projection,
        Interpolation::Bilinear,
        Rgb([255u8, 255, 255]),
        &mut output,
    );

    info!(out_w, out_h, "Perspective correction applied");
    Ok(output)
}

/// Copy `image` into a buffer one pixel larger on every side, repeating the
/// edge pixels outward.
fn pad_replicate(image: &RgbImage) -> RgbImage {
    let (w, h) = image.dimensions();
    RgbImage::from_fn(w + 2, h + 2, |x, y| {
        let sx = x.saturating_sub(1).min(w.saturating_sub(1));
        let sy = y.saturating_sub(1).min(h.saturating_sub(1));
        *image.get_pixel(sx, sy)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use stampscan_core::types::Point2D;

    fn gradient(w: u32, h: u32) -> RgbImage {
        RgbImage::from_fn(w, h, |x, y| {
            Rgb([(x * 255 / w) as u8, (y * 255 / h) as u8, ((x + y) % 200) as u8])
        })
    }

    fn rect_quad(w: u32, h: u32) -> Quadrilateral {
        let (mx, my) = ((w - 1) as f32, (h - 1) as f32);
        // Deliberately scrambled.
        Quadrilateral::new([
            Point2D::new(mx, my),
            Point2D::new(0.0, 0.0),
            Point2D::new(0.0, my),
            Point2D::new(mx, 0.0),
        ])
    }

    #[test]
    fn axis_aligned_outline_is_identity() {
        let (w, h) = (64u32, 48u32);
        let img = gradient(w, h);
        let out = rectify(&img, &rect_quad(w, h)).expect("rectify");
        assert_eq!(out.dimensions(), (w, h));

        for (a, b) in out.pixels().zip(img.pixels()) {
            for c in 0..3 {
                let diff = (a.0[c] as i32 - b.0[c] as i32).abs();
                assert!(diff <= 1, "pixel differs by {}: {:?} vs {:?}", diff, a, b);
            }
        }
    }

    #[test]
    fn output_size_takes_longer_edges() {
        // Trapezoid: top edge 100, bottom edge 160, sides ~85.4.
        let quad = Quadrilateral::new([
            Point2D::new(30.0, 0.0),
            Point2D::new(130.0, 0.0),
            Point2D::new(160.0, 80.0),
            Point2D::new(0.0, 80.0),
        ]);
        let (w, h) = output_size(&quad);
        assert_eq!(w, 161);
        assert_eq!(h, 86);
    }

    #[test]
    fn skewed_outline_becomes_upright() {
        // A bright parallelogram on a dark frame; after rectification the
        // whole output should be bright.
        let mut img = RgbImage::from_pixel(300, 200, Rgb([10, 10, 10]));
        let corners = [
            Point2D::new(60.0, 30.0),
            Point2D::new(250.0, 50.0),
            Point2D::new(230.0, 170.0),
            Point2D::new(40.0, 150.0),
        ];
        let poly: Vec<imageproc::point::Point<i32>> = corners
            .iter()
            .map(|p| imageproc::point::Point::new(p.x as i32, p.y as i32))
            .collect();
        imageproc::drawing::draw_polygon_mut(&mut img, &poly, Rgb([240, 240, 240]));

        let out = rectify(&img, &Quadrilateral::new(corners)).expect("rectify");
        let (w, h) = out.dimensions();
        assert!(w > h);

        // Ignore a 3-pixel rim where the outline's own edge is sampled.
        let mut bright = 0u32;
        let mut total = 0u32;
        for y in 3..h - 3 {
            for x in 3..w - 3 {
                total += 1;
                if out.get_pixel(x, y).0[0] > 200 {
                    bright += 1;
                }
            }
        }
        assert!(bright as f32 / total as f32 > 0.99);
    }

    #[test]
    fn collinear_outline_is_rejected() {
        let img = gradient(50, 50);
        let quad = Quadrilateral::new([
            Point2D::new(0.0, 0.0),
            Point2D::new(10.0, 10.0),
            Point2D::new(20.0, 20.0),
            Point2D::new(30.0, 30.0),
        ]);
        assert!(matches!(rectify(&img, &quad), Err(ScanError::InvalidGeometry(_))));
    }
}

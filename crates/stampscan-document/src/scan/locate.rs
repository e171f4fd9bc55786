// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Document locator — find the four-cornered outline of a paper page in a
// photograph.

use image::RgbImage;
use image::imageops;
use imageproc::contours::find_contours;
use imageproc::edges::canny;
use imageproc::filter::gaussian_blur_f32;
use imageproc::point::Point;
use stampscan_core::config::ScanConfig;
use stampscan_core::types::{Point2D, Quadrilateral};
use tracing::{debug, info, instrument, warn};

use super::geometry::{approx_closed_polygon, closed_perimeter, contour_area};
use crate::image::processor::resize_to_height;

/// Locate the page outline in `image`.
///
/// ## Pipeline
///
/// 1. Resize to the working height (500 px by default); the transform that
///    follows is resolution-independent, so detecting at low resolution
///    costs no precision where it matters
/// 2. Grayscale, 5x5 Gaussian blur, Canny edge detection (75/200)
/// 3. Trace every contour and keep the largest few by enclosed area
/// 4. Approximate each with a polygon (epsilon 2% of its perimeter) and
///    accept the first that has four vertices and covers at least 20% of
///    the frame, which rules out printed boxes and logos
///
/// Returns the corners in source-image coordinates, in no particular order,
/// or `None` when no candidate qualifies. The caller is expected to process
/// the whole frame in that case.
#[instrument(skip_all, fields(width = image.width(), height = image.height()))]
pub fn locate(image: &RgbImage, config: &ScanConfig) -> Option<Quadrilateral> {
    if image.width() == 0 || image.height() == 0 {
        return None;
    }

    // Step 1: Working resolution.
    let (small, ratio) = resize_to_height(image, config.working_height);
    let (work_w, work_h) = small.dimensions();

    // Step 2: Edge map.
    let gray = imageops::grayscale(&small);
    let blurred = gaussian_blur_f32(&gray, config.locate_blur_sigma);
    let edges = canny(&blurred, config.canny_low, config.canny_high);

    // Step 3: Rank contours by area.
    let mut candidates: Vec<(f64, Vec<Point<i32>>)> = find_contours::<i32>(&edges)
        .into_iter()
        .map(|contour| (contour_area(&contour.points), contour.points))
        .collect();
    debug!(contours = candidates.len(), work_w, work_h, "Contours traced");

    candidates.sort_by(|a, b| b.0.total_cmp(&a.0));
    candidates.truncate(config.max_candidates);

    // Step 4: First large quadrilateral wins.
    let min_area = (work_w as f64 * work_h as f64) * config.min_area_fraction as f64;
    for (rank, (area, points)) in candidates.iter().enumerate() {
        let epsilon = config.approx_epsilon_fraction * closed_perimeter(points);
        let approx = approx_closed_polygon(points, epsilon);
        debug!(rank, area, vertices = approx.len(), "Candidate contour");

        if approx.len() != 4 {
            continue;
        }
        if *area < min_area {
            debug!(rank, area, min_area, "Quadrilateral too small; skipping");
            continue;
        }

        let corners: [Point2D; 4] = [0, 1, 2, 3]
            .map(|i| Point2D::new(approx[i].x as f32, approx[i].y as f32).scaled(ratio));
        let quad = Quadrilateral::new(corners);
        info!(
            rank,
            area_fraction = area / (work_w as f64 * work_h as f64),
            "Document outline found"
        );
        return Some(quad);
    }

    warn!("No document outline found (no large four-sided contour)");
    None
}

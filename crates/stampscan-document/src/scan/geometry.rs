// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Closed-contour geometry: enclosed area, perimeter, and Douglas–Peucker
// polygon approximation over the pixel outlines produced by
// `imageproc::contours::find_contours`.

use imageproc::point::Point;

/// Area enclosed by a closed contour (shoelace formula, always non-negative).
pub fn contour_area(points: &[Point<i32>]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }
    let mut twice = 0.0f64;
    for (i, a) in points.iter().enumerate() {
        let b = points[(i + 1) % points.len()];
        twice += a.x as f64 * b.y as f64 - b.x as f64 * a.y as f64;
    }
    twice.abs() / 2.0
}

/// Length of a closed contour, including the segment back to the start.
pub fn closed_perimeter(points: &[Point<i32>]) -> f64 {
    if points.len() < 2 {
        return 0.0;
    }
    points
        .iter()
        .zip(points.iter().cycle().skip(1))
        .map(|(a, b)| distance(a, b))
        .sum()
}

/// Simplify a closed contour so no dropped point lies further than `epsilon`
/// from the polygon that replaces it.
///
/// The contour is first split at two mutually distant points, which on a
/// page outline are opposite corners, and each half is simplified as an open
/// chain. Splitting there keeps the contour's arbitrary start pixel from
/// surviving as a spurious vertex in the middle of an edge.
pub fn approx_closed_polygon(points: &[Point<i32>], epsilon: f64) -> Vec<Point<i32>> {
    let n = points.len();
    if n <= 3 {
        return points.to_vec();
    }

    let farthest_from = |origin: usize| -> usize {
        let mut best = origin;
        let mut best_dist = -1.0;
        for (i, p) in points.iter().enumerate() {
            let d = distance(&points[origin], p);
            if d > best_dist {
                best_dist = d;
                best = i;
            }
        }
        best
    };

    let b = farthest_from(0);
    let a = farthest_from(b);
    if a == b {
        return vec![points[a]];
    }

    // Walk a -> b and b -> a around the loop.
    let first: Vec<Point<i32>> = cyclic_chain(points, a, b);
    let second: Vec<Point<i32>> = cyclic_chain(points, b, a);

    let mut polygon = simplify_open(&first, epsilon);
    polygon.pop();
    let mut rest = simplify_open(&second, epsilon);
    rest.pop();
    polygon.extend(rest);
    polygon
}

fn cyclic_chain(points: &[Point<i32>], from: usize, to: usize) -> Vec<Point<i32>> {
    let n = points.len();
    let len = (to + n - from) % n + 1;
    (0..len).map(|k| points[(from + k) % n]).collect()
}

/// Iterative Douglas–Peucker over an open chain. Both endpoints are kept.
fn simplify_open(chain: &[Point<i32>], epsilon: f64) -> Vec<Point<i32>> {
    if chain.len() <= 2 {
        return chain.to_vec();
    }

    let mut keep = vec![false; chain.len()];
    keep[0] = true;
    keep[chain.len() - 1] = true;

    let mut stack = vec![(0usize, chain.len() - 1)];
    while let Some((start, end)) = stack.pop() {
        if end - start <= 1 {
            continue;
        }

        let mut max_dist = 0.0;
        let mut max_index = start;
        for i in (start + 1)..end {
            let d = point_to_line_distance(&chain[i], &chain[start], &chain[end]);
            if d > max_dist {
                max_dist = d;
                max_index = i;
            }
        }

        if max_dist > epsilon {
            keep[max_index] = true;
            stack.push((start, max_index));
            stack.push((max_index, end));
        }
    }

    chain
        .iter()
        .zip(keep)
        .filter_map(|(p, k)| k.then_some(*p))
        .collect()
}

fn distance(a: &Point<i32>, b: &Point<i32>) -> f64 {
    let dx = (a.x - b.x) as f64;
    let dy = (a.y - b.y) as f64;
    (dx * dx + dy * dy).sqrt()
}

/// Perpendicular distance from `p` to the line through `start` and `end`,
/// or the plain distance to `start` if the two coincide.
fn point_to_line_distance(p: &Point<i32>, start: &Point<i32>, end: &Point<i32>) -> f64 {
    let a = (end.y - start.y) as f64;
    let b = (start.x - end.x) as f64;
    let c = end.x as f64 * start.y as f64 - start.x as f64 * end.y as f64;

    let norm = (a * a + b * b).sqrt();
    if norm == 0.0 {
        return distance(p, start);
    }
    (a * p.x as f64 + b * p.y as f64 + c).abs() / norm
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Pixel outline of an axis-aligned rectangle, clockwise from (x0, y0).
    fn rectangle_outline(x0: i32, y0: i32, x1: i32, y1: i32) -> Vec<Point<i32>> {
        let mut pts = Vec::new();
        for x in x0..x1 {
            pts.push(Point::new(x, y0));
        }
        for y in y0..y1 {
            pts.push(Point::new(x1, y));
        }
        for x in (x0 + 1..=x1).rev() {
            pts.push(Point::new(x, y1));
        }
        for y in (y0 + 1..=y1).rev() {
            pts.push(Point::new(x0, y));
        }
        pts
    }

    #[test]
    fn rectangle_area_and_perimeter() {
        let outline = rectangle_outline(10, 20, 110, 70);
        assert!((contour_area(&outline) - 5000.0).abs() < 1e-6);
        assert!((closed_perimeter(&outline) - 300.0).abs() < 1e-6);
    }

    #[test]
    fn rectangle_simplifies_to_four_corners() {
        // Start the outline mid-edge so the start pixel is not a corner.
        let mut outline = rectangle_outline(0, 0, 200, 120);
        outline.rotate_left(57);
        let eps = 0.02 * closed_perimeter(&outline);
        let poly = approx_closed_polygon(&outline, eps);
        assert_eq!(poly.len(), 4, "got {:?}", poly);
        for corner in [
            Point::new(0, 0),
            Point::new(200, 0),
            Point::new(200, 120),
            Point::new(0, 120),
        ] {
            assert!(poly.contains(&corner), "missing {:?} in {:?}", corner, poly);
        }
    }

    #[test]
    fn circle_does_not_simplify_to_quad() {
        let outline: Vec<Point<i32>> = (0..360)
            .map(|deg| {
                let t = (deg as f64).to_radians();
                Point::new((100.0 + 60.0 * t.cos()).round() as i32, (100.0 + 60.0 * t.sin()).round() as i32)
            })
            .collect();
        let eps = 0.02 * closed_perimeter(&outline);
        let poly = approx_closed_polygon(&outline, eps);
        assert!(poly.len() > 4, "circle collapsed to {} vertices", poly.len());
    }

    #[test]
    fn degenerate_inputs() {
        assert_eq!(contour_area(&[Point::new(1, 1), Point::new(5, 5)]), 0.0);
        let tiny = vec![Point::new(0, 0), Point::new(1, 0), Point::new(1, 1)];
        assert_eq!(approx_closed_polygon(&tiny, 1.0), tiny);
    }
}

// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Criterion benchmarks for the stampscan-document crate. Covers page location,
// scan enhancement and the full in-memory pipeline on a synthetic photo.

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_polygon_mut};
use imageproc::point::Point;

use stampscan_core::ScanConfig;
use stampscan_document::ScanPipeline;
use stampscan_document::scan::{enhance, locate};

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// A 750x1000 photo: grey desk, slightly skewed white page, one red stamp.
fn synthetic_photo() -> RgbImage {
    let mut img = RgbImage::from_pixel(750, 1000, Rgb([70, 72, 78]));
    let page = [
        Point::new(120, 90),
        Point::new(640, 130),
        Point::new(610, 900),
        Point::new(95, 870),
    ];
    draw_polygon_mut(&mut img, &page, Rgb([238, 236, 230]));
    draw_filled_circle_mut(&mut img, (480, 760), 60, Rgb([200, 30, 40]));
    img
}

// ---------------------------------------------------------------------------
// Benchmarks
// ---------------------------------------------------------------------------

fn bench_locate(c: &mut Criterion) {
    let img = synthetic_photo();
    let config = ScanConfig::default();
    c.bench_function("locate (750x1000)", |b| {
        b.iter(|| black_box(locate(black_box(&img), &config)));
    });
}

fn bench_enhance(c: &mut Criterion) {
    let img = synthetic_photo();
    let config = ScanConfig::default();
    c.bench_function("enhance (750x1000)", |b| {
        b.iter(|| black_box(enhance(black_box(&img), &config)));
    });
}

fn bench_pipeline(c: &mut Criterion) {
    let img = synthetic_photo();
    let pipeline = ScanPipeline::new(ScanConfig::default()).expect("default config is valid");
    c.bench_function("pipeline (750x1000)", |b| {
        b.iter(|| black_box(pipeline.process(black_box(&img))));
    });
}

criterion_group!(benches, bench_locate, bench_enhance, bench_pipeline);
criterion_main!(benches);

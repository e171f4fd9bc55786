// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scan pipeline — runs locate, rectify, mask, enhance and composite over one
// image, plus the file-to-file conversion built on top of it.

use std::path::{Path, PathBuf};

use image::RgbImage;
use stampscan_core::config::{ConvertOptions, OutputFormat, ScanConfig};
use stampscan_core::error::{Result, ScanError};
use stampscan_core::types::ScanReport;
use tracing::{debug, info, instrument, warn};

use crate::image::ImageProcessor;
use crate::scan::{composite, enhance, extract_red_mask, locate, rectify};

/// Suffix appended to the input's file stem when deriving an output name.
pub const OUTPUT_SUFFIX: &str = "_scan";

/// A processed image and the diagnostics gathered while producing it.
#[derive(Debug, Clone)]
pub struct ScanResult {
    pub image: RgbImage,
    pub report: ScanReport,
}

/// Outcome of a file-to-file conversion.
#[derive(Debug, Clone)]
pub struct ScanOutcome {
    pub output_path: PathBuf,
    pub report: ScanReport,
}

/// Reusable in-memory scan pipeline.
///
/// Holds a validated [`ScanConfig`]; [`process`](Self::process) can be called
/// any number of times, from any thread.
#[derive(Debug, Clone)]
pub struct ScanPipeline {
    config: ScanConfig,
}

impl ScanPipeline {
    /// Build a pipeline, rejecting an inconsistent configuration up front.
    pub fn new(config: ScanConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// Turn a document photo into a scan-like image.
    ///
    /// When no page outline is found, or the one found cannot be warped, the
    /// whole frame is processed instead and the report says so.
    #[instrument(skip_all, fields(width = image.width(), height = image.height()))]
    pub fn process(&self, image: &RgbImage) -> Result<ScanResult> {
        let source_size = image.dimensions();

        // Step 1: Find the page.
        let quadrilateral = locate(image, &self.config).map(|q| q.ordered());

        // Step 2: Flatten it, or keep the whole frame.
        let (page, fallback_used) = match &quadrilateral {
            Some(quad) => match rectify(image, quad) {
                Ok(page) => (page, false),
                Err(ScanError::InvalidGeometry(reason)) => {
                    warn!(%reason, "Outline could not be rectified; using full frame");
                    (image.clone(), true)
                }
                Err(err) => return Err(err),
            },
            None => {
                warn!("No document outline; processing the full frame");
                (image.clone(), true)
            }
        };

        // Step 3: Stamp mask and enhanced scan, both from the same page image.
        let mask = extract_red_mask(&page, &self.config);
        let enhanced = enhance(&page, &self.config);

        // Step 4: Put the stamps back.
        let output = composite(&enhanced, &page, &mask)?;

        let report = ScanReport {
            source_size,
            quadrilateral,
            fallback_used,
            output_size: output.dimensions(),
            stamp_pixels: mask.count(),
        };
        info!(
            out_w = report.output_size.0,
            out_h = report.output_size.1,
            fallback_used,
            stamp_coverage = report.stamp_coverage(),
            "Scan processed"
        );

        Ok(ScanResult {
            image: output,
            report,
        })
    }
}

// -- File conversion ----------------------------------------------------------

/// Convert the photo at `input` into a JPEG scan at `output` using the
/// default configuration.
pub fn convert_to_scan(input: impl AsRef<Path>, output: impl AsRef<Path>) -> Result<ScanOutcome> {
    let pipeline = ScanPipeline::new(ScanConfig::default())?;
    convert_file(
        &pipeline,
        input.as_ref(),
        output.as_ref(),
        OutputFormat::default(),
    )
}

/// Convert the photo at `input`, deriving the output path from `options`
/// (see [`output_path_for`]).
pub fn convert_with_options(
    input: impl AsRef<Path>,
    options: &ConvertOptions,
    config: &ScanConfig,
) -> Result<ScanOutcome> {
    let input = input.as_ref();
    let pipeline = ScanPipeline::new(config.clone())?;
    let output = output_path_for(input, options.output_dir.as_deref(), options.format)?;
    convert_file(&pipeline, input, &output, options.format)
}

/// Load, process, encode and write one file.
///
/// The output path is touched only after the image has been encoded in
/// memory, so a failed run never leaves a partial file behind.
#[instrument(skip_all, fields(input = %input.display(), output = %output.display()))]
pub fn convert_file(
    pipeline: &ScanPipeline,
    input: &Path,
    output: &Path,
    format: OutputFormat,
) -> Result<ScanOutcome> {
    // Step 1: Load.
    let source = ImageProcessor::open(input)?.into_rgb();

    // Step 2: Process.
    let ScanResult { image, report } = pipeline.process(&source)?;
    drop(source);

    // Step 3: Encode in memory.
    let bytes = ImageProcessor::from_rgb(image).encode(format)?;
    debug!(bytes = bytes.len(), "Output encoded");

    // Step 4: Persist.
    write_atomically(output, &bytes)?;
    info!(fallback_used = report.fallback_used, "Scan written");

    Ok(ScanOutcome {
        output_path: output.to_path_buf(),
        report,
    })
}

/// Derive `<dir>/<stem>_scan.<ext>` for `input`.
///
/// `dir` defaults to the input's own folder. An explicit output directory is
/// created if it does not exist yet.
pub fn output_path_for(
    input: &Path,
    output_dir: Option<&Path>,
    format: OutputFormat,
) -> Result<PathBuf> {
    let stem = input
        .file_stem()
        .ok_or_else(|| ScanError::InputNotFound(input.to_path_buf()))?;

    let dir = match output_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir).map_err(|source| ScanError::WriteFailure {
                path: dir.to_path_buf(),
                source,
            })?;
            dir.to_path_buf()
        }
        None => input
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default(),
    };

    let mut name = stem.to_os_string();
    name.push(OUTPUT_SUFFIX);
    name.push(".");
    name.push(format.extension());
    Ok(dir.join(name))
}

/// Write `bytes` to a hidden sibling of `path`, then rename it into place.
fn write_atomically(path: &Path, bytes: &[u8]) -> Result<()> {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let temp = path.with_file_name(format!(".{}.tmp", file_name));

    let written = std::fs::write(&temp, bytes).and_then(|()| std::fs::rename(&temp, path));
    if let Err(source) = written {
        let _ = std::fs::remove_file(&temp);
        return Err(ScanError::WriteFailure {
            path: path.to_path_buf(),
            source,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn output_path_defaults_to_input_folder() {
        let path = output_path_for(Path::new("photos/contract.JPG"), None, OutputFormat::default())
            .expect("path");
        assert_eq!(path, PathBuf::from("photos/contract_scan.jpg"));
    }

    #[test]
    fn output_path_creates_directory() {
        let dir = tempfile::tempdir().expect("tempdir");
        let out_dir = dir.path().join("nested").join("scans");
        let path = output_path_for(Path::new("合同.png"), Some(&out_dir), OutputFormat::Png)
            .expect("path");
        assert!(out_dir.is_dir());
        assert_eq!(path, out_dir.join("合同_scan.png"));
    }

    #[test]
    fn atomic_write_leaves_only_target() {
        let dir = tempfile::tempdir().expect("tempdir");
        let target = dir.path().join("page_scan.jpg");
        write_atomically(&target, b"first").expect("write");
        write_atomically(&target, b"second").expect("overwrite");

        assert_eq!(std::fs::read(&target).expect("read"), b"second");
        let entries = std::fs::read_dir(dir.path()).expect("read_dir").count();
        assert_eq!(entries, 1);
    }

    #[test]
    fn write_into_missing_folder_is_write_failure() {
        let dir = tempfile::tempdir().expect("tempdir");
        let target = dir.path().join("missing").join("page_scan.jpg");
        let err = write_atomically(&target, b"data").err().expect("must fail");
        assert!(matches!(err, ScanError::WriteFailure { .. }));
        assert!(!target.exists());
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = ScanConfig {
            working_height: 0,
            ..ScanConfig::default()
        };
        assert!(matches!(
            ScanPipeline::new(config),
            Err(ScanError::InvalidConfig(_))
        ));
    }

    #[test]
    fn featureless_frame_falls_back() {
        let pipeline = ScanPipeline::new(ScanConfig::default()).expect("pipeline");
        // A soft lighting gradient with no edges to trace.
        let img = RgbImage::from_fn(160, 120, |x, y| {
            let v = (120 + x / 2 + y / 4) as u8;
            Rgb([v, v, v])
        });
        let result = pipeline.process(&img).expect("process");
        assert!(result.report.fallback_used);
        assert!(result.report.quadrilateral.is_none());
        assert_eq!(result.image.dimensions(), (160, 120));
        assert_eq!(result.report.output_size, (160, 120));
        assert_eq!(result.report.stamp_pixels, 0);
    }

    #[test]
    fn failed_load_writes_nothing() {
        let dir = tempfile::tempdir().expect("tempdir");
        let input = dir.path().join("broken.jpg");
        std::fs::write(&input, b"not an image").expect("write");
        let output = dir.path().join("broken_scan.jpg");

        let err = convert_to_scan(&input, &output).err().expect("must fail");
        assert!(matches!(err, ScanError::DecodeFailure(_)));
        assert!(!output.exists());
    }
}

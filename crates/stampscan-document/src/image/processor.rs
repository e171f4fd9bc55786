// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image processor — loading scan sources, working-resolution resizing, and
// output encoding. Operates on in-memory RGB images using the `image` crate.

use std::path::Path;

use image::imageops::{self, FilterType};
use image::{ImageFormat, RgbImage};
use stampscan_core::config::OutputFormat;
use stampscan_core::error::{Result, ScanError};
use stampscan_core::types::InputFormat;
use tracing::{debug, info, instrument};

/// A decoded scan source held as 8-bit RGB.
///
/// Whatever the file stored (grayscale, RGBA, 16-bit TIFF) is normalised to
/// three 8-bit channels on load so every later stage sees one layout.
///
/// ```ignore
/// let source = ImageProcessor::open("photos/receipt.jpg")?;
/// let jpeg = ImageProcessor::from_rgb(result).to_jpeg_bytes(95)?;
/// ```
pub struct ImageProcessor {
    image: RgbImage,
}

impl ImageProcessor {
    // -- Construction ---------------------------------------------------------

    /// Load a scan source from disk.
    ///
    /// The file is read as raw bytes and decoded in memory, so paths with
    /// non-ASCII characters behave like any other. The extension must name a
    /// supported format; the decoder itself sniffs the actual content.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ScanError::InputNotFound(path.to_path_buf()));
        }

        let ext = path
            .extension()
            .map(|e| e.to_string_lossy().into_owned())
            .unwrap_or_default();
        let format = InputFormat::from_extension(&ext).ok_or_else(|| {
            ScanError::UnsupportedFormat(if ext.is_empty() {
                "(no extension)".to_string()
            } else {
                ext.clone()
            })
        })?;

        let data = std::fs::read(path).map_err(|err| {
            ScanError::DecodeFailure(format!("failed to read {}: {}", path.display(), err))
        })?;
        debug!(bytes = data.len(), mime = format.mime_type(), "Scan source read");

        let processor = Self::from_bytes(&data)?;
        info!(
            width = processor.width(),
            height = processor.height(),
            "Scan source loaded"
        );
        Ok(processor)
    }

    /// Decode a scan source from raw encoded bytes (JPEG, PNG, BMP, TIFF).
    #[instrument(skip(data), fields(data_len = data.len()))]
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        if data.is_empty() {
            return Err(ScanError::DecodeFailure("file is empty".into()));
        }
        let img = image::load_from_memory(data)
            .map_err(|err| ScanError::DecodeFailure(err.to_string()))?;
        if img.width() == 0 || img.height() == 0 {
            return Err(ScanError::DecodeFailure("image has no pixels".into()));
        }
        debug!(
            width = img.width(),
            height = img.height(),
            color = ?img.color(),
            "Image decoded from bytes"
        );
        Ok(Self {
            image: img.to_rgb8(),
        })
    }

    /// Wrap an already-decoded RGB image.
    pub fn from_rgb(image: RgbImage) -> Self {
        Self { image }
    }

    // -- Accessors ------------------------------------------------------------

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn as_rgb(&self) -> &RgbImage {
        &self.image
    }

    pub fn into_rgb(self) -> RgbImage {
        self.image
    }

    // -- Output ---------------------------------------------------------------

    /// Encode the image as JPEG bytes with the given quality (1-100).
    pub fn to_jpeg_bytes(&self, quality: u8) -> Result<Vec<u8>> {
        let mut buffer = Vec::new();
        let encoder =
            image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buffer, quality.clamp(1, 100));
        self.image
            .write_with_encoder(encoder)
            .map_err(|err| ScanError::EncodeFailure(format!("JPEG encoding failed: {}", err)))?;
        Ok(buffer)
    }

    /// Encode the image as PNG bytes.
    pub fn to_png_bytes(&self) -> Result<Vec<u8>> {
        let mut buffer = Vec::new();
        let mut cursor = std::io::Cursor::new(&mut buffer);
        self.image
            .write_to(&mut cursor, ImageFormat::Png)
            .map_err(|err| ScanError::EncodeFailure(format!("PNG encoding failed: {}", err)))?;
        Ok(buffer)
    }

    /// Encode in the requested output format.
    pub fn encode(&self, format: OutputFormat) -> Result<Vec<u8>> {
        match format {
            OutputFormat::Jpeg { quality } => self.to_jpeg_bytes(quality),
            OutputFormat::Png => self.to_png_bytes(),
        }
    }
}

/// Resize `image` to exactly `height` rows, keeping its aspect ratio.
///
/// Returns the resized copy and the factor that maps its coordinates back to
/// the source (`source = resized * ratio`).
pub fn resize_to_height(image: &RgbImage, height: u32) -> (RgbImage, f32) {
    let (w, h) = image.dimensions();
    let ratio = h as f32 / height as f32;
    let width = ((w as f32 / ratio) as u32).max(1);
    let resized = imageops::resize(image, width, height, FilterType::Triangle);
    debug!(from_w = w, from_h = h, width, height, ratio, "Resized to working height");
    (resized, ratio)
}

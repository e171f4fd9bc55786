// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Stampscan.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type for all Stampscan operations.
#[derive(Debug, Error)]
pub enum ScanError {
    // -- Load errors --
    #[error("input file not found: {}", .0.display())]
    InputNotFound(PathBuf),

    #[error("unsupported image format: {0}")]
    UnsupportedFormat(String),

    #[error("failed to decode image: {0}")]
    DecodeFailure(String),

    // -- Processing errors --
    #[error("invalid scan configuration: {0}")]
    InvalidConfig(String),

    #[error("invalid document geometry: {0}")]
    InvalidGeometry(String),

    #[error("image dimensions differ: expected {expected:?}, got {actual:?}")]
    DimensionMismatch {
        expected: (u32, u32),
        actual: (u32, u32),
    },

    // -- Save errors --
    #[error("failed to encode output image: {0}")]
    EncodeFailure(String),

    #[error("failed to write {}: {source}", path.display())]
    WriteFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Which part of a conversion an error belongs to.
///
/// Mirrors the terminal failure states of the conversion: anything raised
/// before the image is in memory is `LoadFailed`, anything raised while
/// producing the output file is `SaveFailed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    LoadFailed,
    Processing,
    SaveFailed,
}

impl ScanError {
    /// Classify this error by the stage that raised it.
    pub fn stage(&self) -> Stage {
        match self {
            Self::InputNotFound(_) | Self::UnsupportedFormat(_) | Self::DecodeFailure(_) => {
                Stage::LoadFailed
            }
            Self::EncodeFailure(_) | Self::WriteFailure { .. } => Stage::SaveFailed,
            Self::InvalidConfig(_)
            | Self::InvalidGeometry(_)
            | Self::DimensionMismatch { .. } => Stage::Processing,
        }
    }

    /// Whether retrying the same call could succeed.
    ///
    /// Every stage is deterministic, so only a failed write (full disk,
    /// locked file) is worth repeating. Missing folders and denied
    /// permissions need the caller to change something first.
    pub fn is_retriable(&self) -> bool {
        match self {
            Self::WriteFailure { source, .. } => !matches!(
                source.kind(),
                std::io::ErrorKind::PermissionDenied | std::io::ErrorKind::NotFound
            ),
            _ => false,
        }
    }
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, ScanError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_errors_classified() {
        assert_eq!(
            ScanError::InputNotFound(PathBuf::from("missing.jpg")).stage(),
            Stage::LoadFailed
        );
        assert_eq!(ScanError::UnsupportedFormat("gif".into()).stage(), Stage::LoadFailed);
        assert_eq!(ScanError::DecodeFailure("empty".into()).stage(), Stage::LoadFailed);
    }

    #[test]
    fn only_write_failures_are_retriable() {
        let write = ScanError::WriteFailure {
            path: PathBuf::from("/out/a_scan.jpg"),
            source: std::io::Error::other("disk full"),
        };
        assert_eq!(write.stage(), Stage::SaveFailed);
        assert!(write.is_retriable());

        assert!(!ScanError::EncodeFailure("jpeg".into()).is_retriable());
        assert!(!ScanError::DecodeFailure("corrupt".into()).is_retriable());
    }

    #[test]
    fn display_includes_path() {
        let err = ScanError::InputNotFound(PathBuf::from("photos/页面.jpg"));
        assert_eq!(err.to_string(), "input file not found: photos/页面.jpg");
    }
}

// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Human-readable error messages for people running conversions.
//
// Every technical error is mapped to plain English with a clear suggestion.
// The severity drives how a front end presents it and whether it retries.

use crate::error::ScanError;

/// Severity of an error from the user's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Disk full or file locked; trying again may work.
    Transient,
    /// User must do something (pick another file, fix a path).
    ActionRequired,
    /// Cannot be fixed by retrying: the file itself is the problem.
    Permanent,
}

/// A human-readable error with plain English message and actionable suggestion.
#[derive(Debug, Clone)]
pub struct HumanError {
    /// Plain English summary (shown as a heading).
    pub message: String,
    /// What the user should try (shown as body text).
    pub suggestion: String,
    /// Whether a caller may retry automatically.
    pub retriable: bool,
    pub severity: Severity,
}

/// Convert a `ScanError` into a `HumanError`.
pub fn humanize_error(err: &ScanError) -> HumanError {
    match err {
        // -- Load errors --
        ScanError::InputNotFound(path) => HumanError {
            message: "We couldn't find that picture.".into(),
            suggestion: format!(
                "Check that the file still exists and hasn't been moved. ({})",
                path.display()
            ),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        ScanError::UnsupportedFormat(ext) => HumanError {
            message: "This type of file can't be scanned.".into(),
            suggestion: format!(
                "Use a JPEG, PNG, BMP or TIFF photo of the document. (File type: {ext})"
            ),
            retriable: false,
            severity: Severity::Permanent,
        },

        ScanError::DecodeFailure(detail) => HumanError {
            message: "This picture appears to be damaged.".into(),
            suggestion: format!(
                "Try opening it in a photo viewer, or take the photo again. ({detail})"
            ),
            retriable: false,
            severity: Severity::Permanent,
        },

        // -- Processing errors --
        ScanError::InvalidConfig(detail) => HumanError {
            message: "The scan settings are not valid.".into(),
            suggestion: format!("Reset the scan settings to their defaults. ({detail})"),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        ScanError::InvalidGeometry(_) | ScanError::DimensionMismatch { .. } => HumanError {
            message: "We couldn't straighten this page.".into(),
            suggestion: "Take the photo again from directly above the page, with all four corners visible.".into(),
            retriable: false,
            severity: Severity::Permanent,
        },

        // -- Save errors --
        ScanError::EncodeFailure(detail) => HumanError {
            message: "We couldn't create the scanned picture.".into(),
            suggestion: format!("Try saving in a different format. ({detail})"),
            retriable: false,
            severity: Severity::Permanent,
        },

        ScanError::WriteFailure { path, source } => humanize_write_error(path, source),
    }
}

/// Map a failed output write to a human-readable error.
fn humanize_write_error(path: &std::path::Path, source: &std::io::Error) -> HumanError {
    use std::io::ErrorKind;

    match source.kind() {
        ErrorKind::PermissionDenied => HumanError {
            message: "We aren't allowed to save into that folder.".into(),
            suggestion: format!(
                "Choose a different output folder. ({})",
                path.parent().unwrap_or(path).display()
            ),
            retriable: false,
            severity: Severity::ActionRequired,
        },
        ErrorKind::NotFound => HumanError {
            message: "The output folder doesn't exist.".into(),
            suggestion: format!(
                "Create the folder or pick another one. ({})",
                path.parent().unwrap_or(path).display()
            ),
            retriable: false,
            severity: Severity::ActionRequired,
        },
        _ => HumanError {
            message: "The scanned picture couldn't be saved.".into(),
            suggestion: format!(
                "Make sure there is free disk space and the file isn't open elsewhere, then try again. ({source})"
            ),
            retriable: true,
            severity: Severity::Transient,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn missing_input_is_action_required() {
        let human = humanize_error(&ScanError::InputNotFound(PathBuf::from("a.jpg")));
        assert_eq!(human.severity, Severity::ActionRequired);
        assert!(!human.retriable);
    }

    #[test]
    fn corrupt_input_is_permanent() {
        let human = humanize_error(&ScanError::DecodeFailure("unexpected EOF".into()));
        assert_eq!(human.severity, Severity::Permanent);
        assert!(human.suggestion.contains("unexpected EOF"));
    }

    #[test]
    fn unsupported_format_is_permanent() {
        let human = humanize_error(&ScanError::UnsupportedFormat("gif".into()));
        assert_eq!(human.severity, Severity::Permanent);
    }

    #[test]
    fn disk_full_is_transient() {
        let err = ScanError::WriteFailure {
            path: PathBuf::from("/out/page_scan.jpg"),
            source: std::io::Error::other("no space left on device"),
        };
        let human = humanize_error(&err);
        assert_eq!(human.severity, Severity::Transient);
        assert!(human.retriable);
    }

    #[test]
    fn permission_denied_is_action_required() {
        let err = ScanError::WriteFailure {
            path: PathBuf::from("/root/page_scan.jpg"),
            source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
        };
        let human = humanize_error(&err);
        assert_eq!(human.severity, Severity::ActionRequired);
        assert!(!human.retriable);
    }

    /// Every variant the pipeline can raise has a message, and the
    /// humanized retry flag agrees with `ScanError::is_retriable`.
    #[test]
    fn every_variant_is_humanized_consistently() {
        let errors = [
            ScanError::InputNotFound(PathBuf::from("a.jpg")),
            ScanError::UnsupportedFormat("gif".into()),
            ScanError::DecodeFailure("truncated".into()),
            ScanError::InvalidConfig("gamma".into()),
            ScanError::InvalidGeometry("collinear".into()),
            ScanError::DimensionMismatch {
                expected: (4, 4),
                actual: (4, 3),
            },
            ScanError::EncodeFailure("jpeg".into()),
            ScanError::WriteFailure {
                path: PathBuf::from("out/a_scan.jpg"),
                source: std::io::Error::other("disk full"),
            },
            ScanError::WriteFailure {
                path: PathBuf::from("missing/a_scan.jpg"),
                source: std::io::Error::from(std::io::ErrorKind::NotFound),
            },
        ];
        for err in &errors {
            let human = humanize_error(err);
            assert!(!human.message.is_empty(), "{err}");
            assert_eq!(human.retriable, err.is_retriable(), "{err}");
        }
    }
}

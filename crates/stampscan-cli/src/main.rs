// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Stampscan — turn phone photos of stamped documents into scanner-like images.
//
// Entry point. Initialises logging, parses arguments, and converts each input
// file in turn.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use serde_json::json;
use stampscan_core::config::{ConvertOptions, OutputFormat, ScanConfig};
use stampscan_core::human_errors::humanize_error;
use stampscan_document::convert_with_options;

/// Convert photos of paper documents into flat, scanner-like images while
/// keeping red stamps in colour.
#[derive(Parser, Debug)]
#[command(name = "stampscan")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Photos to convert (jpg, jpeg, png, bmp, tif, tiff)
    #[arg(required = true)]
    images: Vec<PathBuf>,

    /// Directory for the scans (defaults to each photo's own folder)
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Output encoding
    #[arg(short, long, value_enum, default_value_t = Format::Jpeg)]
    format: Format,

    /// JPEG quality (1-100)
    #[arg(short, long, default_value_t = 95, value_parser = clap::value_parser!(u8).range(1..=100))]
    quality: u8,

    /// Print one JSON object per file instead of plain text
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Jpeg,
    Png,
}

impl Cli {
    fn convert_options(&self) -> ConvertOptions {
        let format = match self.format {
            Format::Jpeg => OutputFormat::Jpeg {
                quality: self.quality,
            },
            Format::Png => OutputFormat::Png,
        };
        ConvertOptions {
            output_dir: self.output_dir.clone(),
            format,
        }
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let options = cli.convert_options();
    let config = ScanConfig::default();

    tracing::info!(files = cli.images.len(), "Stampscan starting");

    let mut failures = 0usize;
    for input in &cli.images {
        match convert_with_options(input, &options, &config) {
            Ok(outcome) => {
                if cli.json {
                    println!(
                        "{}",
                        json!({
                            "input": input.display().to_string(),
                            "output": outcome.output_path.display().to_string(),
                            "report": outcome.report,
                        })
                    );
                } else {
                    let note = if outcome.report.fallback_used {
                        " (no page outline found, full frame used)"
                    } else {
                        ""
                    };
                    println!(
                        "{} -> {}{}",
                        input.display(),
                        outcome.output_path.display(),
                        note
                    );
                }
            }
            Err(err) => {
                failures += 1;
                tracing::error!(input = %input.display(), error = %err, "Conversion failed");
                let human = humanize_error(&err);
                if cli.json {
                    println!(
                        "{}",
                        json!({
                            "input": input.display().to_string(),
                            "error": err.to_string(),
                            "stage": format!("{:?}", err.stage()),
                            "message": human.message,
                            "suggestion": human.suggestion,
                            "retriable": human.retriable,
                        })
                    );
                } else {
                    eprintln!("{}: {}", input.display(), human.message);
                    eprintln!("  {}", human.suggestion);
                }
            }
        }
    }

    if failures > 0 {
        tracing::warn!(failures, total = cli.images.len(), "Some files were not converted");
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

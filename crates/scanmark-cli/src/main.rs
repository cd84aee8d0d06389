// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scanmark: document scanner and bubble-sheet reader.
//
// Entry point. Initialises logging, parses the command line, runs the chosen
// transformation on one photo and writes the resulting image(s).

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use image::RgbImage;
use scanmark_core::{Result, ScanOptions};
use scanmark_document::{BubbleExtractor, DocumentScanner, ImageProcessor, Transformation};

#[derive(Parser, Debug)]
#[command(name = "scanmark", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Locate the page, rectify it and optionally binarize it.
    Scan(ScanArgs),
    /// Read the marked answers on a multiple-choice answer sheet.
    ///
    /// The page is always rectified and read without adaptive binarization.
    Bubbles(CommonArgs),
}

#[derive(Args, Debug, Clone)]
struct CommonArgs {
    /// Path to the input photo.
    #[arg(short, long)]
    image: PathBuf,

    /// Where to write the result. An index is appended when several images come back.
    #[arg(short, long, default_value = "scanmark-out.png")]
    output: PathBuf,

    /// JSON file overriding the default scan options.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Resize the photo to this height before scanning.
    #[arg(long)]
    resize: Option<u32>,
}

#[derive(Args, Debug, Clone)]
struct ScanArgs {
    #[command(flatten)]
    common: CommonArgs,

    /// Skip locating and rectifying the page.
    #[arg(short = 'c', long)]
    no_crop: bool,

    /// Skip adaptive binarization of the rectified page.
    #[arg(short = 'b', long)]
    no_binarize: bool,
}

impl CommonArgs {
    fn options(&self) -> Result<ScanOptions> {
        let options = match &self.config {
            Some(path) => ScanOptions::from_json_file(path)?,
            None => ScanOptions::default(),
        };
        options.validate()?;
        Ok(options)
    }

    fn load_frame(&self) -> Result<ImageProcessor> {
        let frame = ImageProcessor::open(&self.image)?;
        Ok(match self.resize {
            Some(height) => frame.smart_resize(height, true),
            None => frame,
        })
    }
}

impl ScanArgs {
    fn options(&self) -> Result<ScanOptions> {
        let mut options = self.common.options()?;
        if self.no_crop {
            options.smart_crop = false;
        }
        if self.no_binarize {
            options.binarization = false;
        }
        Ok(options)
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "scan failed");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Scan(args) => {
            let options = args.options()?;
            let frame = args.common.load_frame()?.to_rgb8();
            let outputs = DocumentScanner::new()?.transform(&frame, &options)?;
            write_outputs(&args.common.output, outputs)
        }
        Command::Bubbles(args) => {
            let options = args.options()?;
            let frame = args.load_frame()?.to_rgb8();
            let reading = BubbleExtractor::new()?.extract(&frame, &options)?;
            if !reading.page_found {
                tracing::warn!("page outline not found; no answers read");
            }
            println!("{}", serde_json::to_string_pretty(&reading.answers)?);
            write_outputs(&args.output, vec![reading.annotated])
        }
    }
}

fn write_outputs(output: &Path, images: Vec<RgbImage>) -> Result<()> {
    let count = images.len();
    for (index, image) in images.into_iter().enumerate() {
        let path = if count > 1 {
            indexed_path(output, index)
        } else {
            output.to_path_buf()
        };
        ImageProcessor::from_rgb(image).save(&path)?;
        tracing::info!(path = %path.display(), "Result written");
    }
    Ok(())
}

/// `out.png` becomes `out-<index>.png`.
fn indexed_path(output: &Path, index: usize) -> PathBuf {
    let stem = output
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "scanmark-out".to_string());
    let name = match output.extension() {
        Some(ext) => format!("{stem}-{index}.{}", ext.to_string_lossy()),
        None => format!("{stem}-{index}"),
    };
    output.with_file_name(name)
}

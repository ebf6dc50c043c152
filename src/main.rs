use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use carecompanion_lib::config::{APP_NAME, APP_VERSION, DEFAULT_OCR_BINARY, DEFAULT_OCR_LANGUAGE};
use carecompanion_lib::pipeline::batch::{render, BatchConfig, BatchRunner, ReportFormat};
use carecompanion_lib::pipeline::extraction::TesseractCli;
use carecompanion_lib::pipeline::structuring::MedicalDataExtractor;

/// Extract structured data from photographed prescriptions
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Directory containing prescription images (jpg, jpeg, png, bmp)
    dir: PathBuf,

    /// Report format
    #[arg(short, long, value_enum, default_value_t = ReportFormat::Markdown)]
    format: ReportFormat,

    /// Tesseract executable
    #[arg(long, default_value = DEFAULT_OCR_BINARY)]
    ocr_binary: PathBuf,

    /// Tesseract language(s), e.g. "eng" or "eng+hin"
    #[arg(short, long, default_value = DEFAULT_OCR_LANGUAGE)]
    lang: String,

    /// Images processed in parallel (defaults to available cores)
    #[arg(short, long)]
    jobs: Option<usize>,

    /// Send images to OCR as-is, without orientation/grayscale preparation
    #[arg(long)]
    no_preprocess: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    carecompanion_lib::init_tracing(args.verbose);

    info!(version = APP_VERSION, "{APP_NAME} starting");

    let mut config = BatchConfig {
        ocr_language: args.lang,
        preprocess: !args.no_preprocess,
        ..BatchConfig::default()
    };
    if let Some(jobs) = args.jobs {
        config.workers = jobs.max(1);
    }
    info!(
        dir = %args.dir.display(),
        ocr = %args.ocr_binary.display(),
        lang = %config.ocr_language,
        workers = config.workers,
        preprocess = config.preprocess,
        "Batch configuration"
    );

    let extractor = MedicalDataExtractor::with_builtin_patterns()
        .context("Built-in extraction patterns failed to compile")?;
    let ocr = TesseractCli::new(args.ocr_binary).with_languages(&config.ocr_language);

    let runner = BatchRunner::new(Arc::new(ocr), Arc::new(extractor), config);
    let report = runner
        .run_directory(&args.dir)
        .await
        .with_context(|| format!("Failed to process {}", args.dir.display()))?;

    let rendered = render(&report, args.format).context("Failed to render report")?;
    print!("{rendered}");
    Ok(())
}

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use tokio::sync::Semaphore;
use uuid::Uuid;

use super::types::{BatchConfig, BatchReport, ImageOutcome, ImageReport};
use super::BatchError;
use crate::config::{is_image_path, MAX_TRANSCRIPT_BYTES};
use crate::pipeline::extraction::{preprocess_for_ocr, OcrEngine, OcrPageResult};
use crate::pipeline::structuring::MedicalDataExtractor;

/// Image files directly inside `dir` (no recursion), sorted by file name.
pub fn collect_images(dir: &Path) -> Result<Vec<PathBuf>, BatchError> {
    if !dir.exists() {
        return Err(BatchError::DirectoryNotFound(dir.to_path_buf()));
    }
    if !dir.is_dir() {
        return Err(BatchError::NotADirectory(dir.to_path_buf()));
    }

    let mut images = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && is_image_path(&path) {
            images.push(path);
        }
    }
    images.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(images)
}

/// Runs OCR then structuring over a set of images.
///
/// Each image is handled on a blocking worker thread; at most
/// `config.workers` run at once. Reports come back in input order, and one
/// image failing never stops the others.
pub struct BatchRunner {
    ocr: Arc<dyn OcrEngine>,
    extractor: Arc<MedicalDataExtractor>,
    config: BatchConfig,
}

impl BatchRunner {
    pub fn new(
        ocr: Arc<dyn OcrEngine>,
        extractor: Arc<MedicalDataExtractor>,
        config: BatchConfig,
    ) -> Self {
        Self {
            ocr,
            extractor,
            config,
        }
    }

    pub fn config(&self) -> &BatchConfig {
        &self.config
    }

    pub async fn run_directory(&self, dir: &Path) -> Result<BatchReport, BatchError> {
        let paths = collect_images(dir)?;
        tracing::info!(dir = %dir.display(), count = paths.len(), "Found images");

        let images = self.process_all(paths).await?;
        let report = BatchReport {
            directory: dir.to_path_buf(),
            images,
        };

        tracing::info!(
            total = report.total(),
            structured = report.structured_count(),
            failed = report.failed_count(),
            "Batch complete"
        );
        Ok(report)
    }

    pub async fn process_all(&self, paths: Vec<PathBuf>) -> Result<Vec<ImageReport>, BatchError> {
        let total = paths.len();
        let semaphore = Arc::new(Semaphore::new(self.config.workers.max(1)));
        let mut handles = Vec::with_capacity(total);

        for (idx, path) in paths.into_iter().enumerate() {
            let permit = Arc::clone(&semaphore).acquire_owned().await?;
            let ocr = Arc::clone(&self.ocr);
            let extractor = Arc::clone(&self.extractor);
            let config = self.config.clone();

            handles.push(tokio::task::spawn_blocking(move || {
                let _permit = permit;
                tracing::info!(image = idx + 1, total, path = %path.display(), "Processing image");
                process_image(&path, ocr.as_ref(), &extractor, &config)
            }));
        }

        let mut reports = Vec::with_capacity(total);
        for handle in handles {
            reports.push(handle.await?);
        }
        Ok(reports)
    }
}

/// Read, optionally preprocess, recognise and structure one image.
pub fn process_image(
    path: &Path,
    ocr: &dyn OcrEngine,
    extractor: &MedicalDataExtractor,
    config: &BatchConfig,
) -> ImageReport {
    let started = Instant::now();
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    let (page, outcome) = recognize_and_structure(path, ocr, extractor, config);

    match &outcome {
        ImageOutcome::Structured(doc) => tracing::debug!(
            file = %file_name,
            populated = doc.populated_fields(),
            "Image structured"
        ),
        ImageOutcome::OcrFailed { reason } | ImageOutcome::ReadFailed { reason } => {
            tracing::warn!(file = %file_name, status = outcome.as_str(), reason = %reason, "Image failed")
        }
        _ => tracing::warn!(file = %file_name, status = outcome.as_str(), "Image produced no record"),
    }

    ImageReport {
        document_id: Uuid::new_v4(),
        file_name,
        ocr_confidence: page.as_ref().and_then(|p| p.confidence),
        raw_text: page.map(|p| p.text),
        processed_at: Utc::now(),
        duration_ms: u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
        outcome,
    }
}

fn recognize_and_structure(
    path: &Path,
    ocr: &dyn OcrEngine,
    extractor: &MedicalDataExtractor,
    config: &BatchConfig,
) -> (Option<OcrPageResult>, ImageOutcome) {
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) => return (None, ImageOutcome::ReadFailed { reason: e.to_string() }),
    };

    let prepared = if config.preprocess {
        match preprocess_for_ocr(&bytes, config.max_image_bytes) {
            Ok(png) => png,
            Err(e) => return (None, ImageOutcome::ReadFailed { reason: e.to_string() }),
        }
    } else {
        bytes
    };

    let page = match ocr.recognize_text(&prepared) {
        Ok(page) => page,
        Err(e) => return (None, ImageOutcome::OcrFailed { reason: e.to_string() }),
    };

    if let Some(reason) = non_transcript_reason(&page.text) {
        tracing::warn!(path = %path.display(), %reason, "Discarding OCR output");
        return (None, ImageOutcome::OcrFailed { reason });
    }

    if !page.has_text() {
        return (Some(page), ImageOutcome::NoTextDetected);
    }

    let outcome = match extractor.extract_medical_data(&page.text) {
        Some(doc) => ImageOutcome::Structured(doc),
        None => ImageOutcome::ExtractionFailed,
    };
    (Some(page), outcome)
}

/// OCR output that cannot be a page transcript: oversized, or carrying NUL
/// bytes from an engine that echoed binary data.
fn non_transcript_reason(text: &str) -> Option<String> {
    if text.len() > MAX_TRANSCRIPT_BYTES {
        return Some(format!(
            "OCR output too large ({} bytes, limit {MAX_TRANSCRIPT_BYTES})",
            text.len()
        ));
    }
    text.find('\0')
        .map(|offset| format!("OCR output contains binary data (NUL byte at offset {offset})"))
}

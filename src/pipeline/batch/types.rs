use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::DEFAULT_OCR_LANGUAGE;
use crate::pipeline::extraction::MAX_IMAGE_BYTES;
use crate::pipeline::structuring::ExtractedDocument;

/// Batch knobs. CLI flags override individual fields.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchConfig {
    /// Tesseract language string (e.g. "eng", "eng+hin").
    pub ocr_language: String,
    /// Images processed at once.
    pub workers: usize,
    /// Orient, grayscale and re-encode before OCR.
    pub preprocess: bool,
    pub max_image_bytes: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            ocr_language: DEFAULT_OCR_LANGUAGE.to_string(),
            workers: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(4),
            preprocess: true,
            max_image_bytes: MAX_IMAGE_BYTES,
        }
    }
}

/// What happened to one image. The failure categories stay distinct:
/// no text at all, text with nothing structurable, OCR error, unreadable file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum ImageOutcome {
    Structured(ExtractedDocument),
    NoTextDetected,
    ExtractionFailed,
    OcrFailed { reason: String },
    ReadFailed { reason: String },
}

impl ImageOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Structured(_) => "structured",
            Self::NoTextDetected => "no_text_detected",
            Self::ExtractionFailed => "extraction_failed",
            Self::OcrFailed { .. } => "ocr_failed",
            Self::ReadFailed { .. } => "read_failed",
        }
    }

    pub fn document(&self) -> Option<&ExtractedDocument> {
        match self {
            Self::Structured(doc) => Some(doc),
            _ => None,
        }
    }

    pub fn is_structured(&self) -> bool {
        matches!(self, Self::Structured(_))
    }
}

/// Result for one image, in directory order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageReport {
    pub document_id: Uuid,
    pub file_name: String,
    /// Raw OCR transcript; absent when OCR never ran or failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ocr_confidence: Option<f32>,
    pub processed_at: DateTime<Utc>,
    pub duration_ms: u64,
    pub outcome: ImageOutcome,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchReport {
    pub directory: PathBuf,
    pub images: Vec<ImageReport>,
}

impl BatchReport {
    pub fn total(&self) -> usize {
        self.images.len()
    }

    pub fn structured_count(&self) -> usize {
        self.images.iter().filter(|r| r.outcome.is_structured()).count()
    }

    pub fn failed_count(&self) -> usize {
        self.total() - self.structured_count()
    }
}

/// Output rendering for a batch report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ReportFormat {
    /// Human-readable Markdown, one section per image.
    Markdown,
    /// One JSON object per image, one per line.
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(outcome: ImageOutcome) -> ImageReport {
        ImageReport {
            document_id: Uuid::new_v4(),
            file_name: "rx.png".into(),
            raw_text: None,
            ocr_confidence: None,
            processed_at: Utc::now(),
            duration_ms: 3,
            outcome,
        }
    }

    #[test]
    fn default_config() {
        let config = BatchConfig::default();
        assert_eq!(config.ocr_language, "eng");
        assert!(config.workers >= 1);
        assert!(config.preprocess);
        assert_eq!(config.max_image_bytes, MAX_IMAGE_BYTES);
    }

    #[test]
    fn outcome_serializes_with_status_tag() {
        let json = serde_json::to_value(ImageOutcome::OcrFailed {
            reason: "tesseract missing".into(),
        })
        .unwrap();
        assert_eq!(
            json,
            serde_json::json!({"status": "ocr_failed", "detail": {"reason": "tesseract missing"}})
        );

        let json = serde_json::to_value(ImageOutcome::NoTextDetected).unwrap();
        assert_eq!(json, serde_json::json!({"status": "no_text_detected"}));
    }

    #[test]
    fn structured_outcome_carries_document() {
        let outcome = ImageOutcome::Structured(ExtractedDocument::default());
        assert!(outcome.is_structured());
        assert!(outcome.document().is_some());
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["status"], "structured");
        assert_eq!(json["detail"]["medications"], serde_json::json!([]));
    }

    #[test]
    fn report_counts() {
        let batch = BatchReport {
            directory: PathBuf::from("/scans"),
            images: vec![
                report(ImageOutcome::Structured(ExtractedDocument::default())),
                report(ImageOutcome::ExtractionFailed),
                report(ImageOutcome::ReadFailed {
                    reason: "truncated".into(),
                }),
            ],
        };
        assert_eq!(batch.total(), 3);
        assert_eq!(batch.structured_count(), 1);
        assert_eq!(batch.failed_count(), 2);
    }

    #[test]
    fn absent_transcript_omitted() {
        let json = serde_json::to_value(report(ImageOutcome::ExtractionFailed)).unwrap();
        assert!(json.get("raw_text").is_none());
        assert!(json.get("ocr_confidence").is_none());
        assert_eq!(json["outcome"]["status"], "extraction_failed");
    }
}

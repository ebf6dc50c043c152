use std::fmt::Write;

use super::types::{BatchReport, ImageOutcome, ReportFormat};
use super::BatchError;
use crate::config::APP_NAME;

const SEPARATOR: &str = "--------------------------------------------------";

pub fn render(report: &BatchReport, format: ReportFormat) -> Result<String, BatchError> {
    match format {
        ReportFormat::Markdown => render_markdown(report),
        ReportFormat::Json => render_json_lines(report),
    }
}

/// One section per image: raw transcript, then the structured record as
/// pretty JSON, or the reason there is none.
pub fn render_markdown(report: &BatchReport) -> Result<String, BatchError> {
    let mut out = String::new();
    writeln!(out, "# {APP_NAME}: Prescription Structured Data")?;
    writeln!(out)?;

    if report.images.is_empty() {
        writeln!(out, "No images found in {}", report.directory.display())?;
        return Ok(out);
    }

    let total = report.total();
    writeln!(out, "Found {total} images:")?;

    for (idx, image) in report.images.iter().enumerate() {
        writeln!(out)?;
        writeln!(out, "## Processing Image {}/{total}: {}", idx + 1, image.file_name)?;
        writeln!(out)?;

        if let Some(text) = &image.raw_text {
            writeln!(out, "### Raw OCR Text:")?;
            writeln!(out, "{}", text.trim_end())?;
            writeln!(out)?;
        }

        match &image.outcome {
            ImageOutcome::Structured(doc) => {
                writeln!(out, "### Structured Medical Data:")?;
                writeln!(out, "```json")?;
                writeln!(out, "{}", serde_json::to_string_pretty(doc)?)?;
                writeln!(out, "```")?;
            }
            ImageOutcome::NoTextDetected => {
                writeln!(out, "**No text detected in {}**", image.file_name)?;
            }
            ImageOutcome::ExtractionFailed => {
                writeln!(out, "**Could not extract structured data from {}**", image.file_name)?;
            }
            ImageOutcome::OcrFailed { reason } | ImageOutcome::ReadFailed { reason } => {
                writeln!(out, "**Error processing {}:** {reason}", image.file_name)?;
            }
        }
        writeln!(out)?;
        writeln!(out, "{SEPARATOR}")?;
    }

    writeln!(out)?;
    writeln!(
        out,
        "{} of {total} images structured.",
        report.structured_count()
    )?;
    Ok(out)
}

/// One compact JSON object per image, newline-terminated.
pub fn render_json_lines(report: &BatchReport) -> Result<String, BatchError> {
    let mut out = String::new();
    for image in &report.images {
        out.push_str(&serde_json::to_string(image)?);
        out.push('\n');
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::batch::ImageReport;
    use crate::pipeline::structuring::{ExtractedDocument, VitalKind};
    use chrono::Utc;
    use std::path::PathBuf;
    use uuid::Uuid;

    fn image(name: &str, raw_text: Option<&str>, outcome: ImageOutcome) -> ImageReport {
        ImageReport {
            document_id: Uuid::new_v4(),
            file_name: name.into(),
            raw_text: raw_text.map(str::to_string),
            ocr_confidence: None,
            processed_at: Utc::now(),
            duration_ms: 1,
            outcome,
        }
    }

    fn sample() -> BatchReport {
        let mut doc = ExtractedDocument::default();
        doc.vitals.insert(VitalKind::Pulse, "72".into());
        BatchReport {
            directory: PathBuf::from("/scans"),
            images: vec![
                image("a.png", Some("Pulse 72\n"), ImageOutcome::Structured(doc)),
                image(
                    "b.jpg",
                    None,
                    ImageOutcome::OcrFailed {
                        reason: "tesseract exited".into(),
                    },
                ),
                image("c.png", Some("  "), ImageOutcome::NoTextDetected),
            ],
        }
    }

    #[test]
    fn markdown_sections_per_image() {
        let md = render_markdown(&sample()).unwrap();
        assert!(md.contains("Found 3 images:"));
        assert!(md.contains("## Processing Image 1/3: a.png"));
        assert!(md.contains("### Raw OCR Text:\nPulse 72\n"));
        assert!(md.contains("\"pulse\": \"72\""));
        assert!(md.contains("**Error processing b.jpg:** tesseract exited"));
        assert!(md.contains("**No text detected in c.png**"));
        assert_eq!(md.matches(SEPARATOR).count(), 3);
        assert!(md.trim_end().ends_with("1 of 3 images structured."));
    }

    #[test]
    fn markdown_empty_directory() {
        let report = BatchReport {
            directory: PathBuf::from("/scans"),
            images: vec![],
        };
        let md = render_markdown(&report).unwrap();
        assert!(md.contains("No images found in /scans"));
    }

    #[test]
    fn json_lines_one_object_per_image() {
        let out = render(&sample(), ReportFormat::Json).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 3);

        let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["file_name"], "a.png");
        assert_eq!(first["outcome"]["status"], "structured");
        assert_eq!(first["outcome"]["detail"]["vitals"]["pulse"], "72");

        let second: ImageReport = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(second.outcome.as_str(), "ocr_failed");
    }
}

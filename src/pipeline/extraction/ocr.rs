use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use super::types::{OcrEngine, OcrPageResult};
use super::ExtractionError;
use crate::config::{DEFAULT_OCR_BINARY, DEFAULT_OCR_LANGUAGE};

/// Tesseract driven through its command-line front end.
///
/// Image bytes go in on stdin and plain text comes back on stdout
/// (`tesseract stdin stdout -l <lang>`), so no native library has to be
/// linked. The plain-text mode reports no confidence.
#[derive(Debug, Clone)]
pub struct TesseractCli {
    binary: PathBuf,
    lang: String,
}

impl Default for TesseractCli {
    fn default() -> Self {
        Self::new(DEFAULT_OCR_BINARY)
    }
}

impl TesseractCli {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            lang: DEFAULT_OCR_LANGUAGE.to_string(),
        }
    }

    /// Set language(s) for OCR (e.g., "eng", "eng+hin")
    pub fn with_languages(mut self, langs: &str) -> Self {
        self.lang = langs.to_string();
        self
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }

    pub fn lang(&self) -> &str {
        &self.lang
    }
}

impl OcrEngine for TesseractCli {
    fn recognize_text(&self, image_bytes: &[u8]) -> Result<OcrPageResult, ExtractionError> {
        let mut child = Command::new(&self.binary)
            .args(["stdin", "stdout", "-l", self.lang.as_str()])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound => ExtractionError::OcrInit(format!(
                    "{} not found (install tesseract or pass --ocr-binary)",
                    self.binary.display()
                )),
                _ => ExtractionError::Io(e),
            })?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| ExtractionError::OcrInit("Tesseract stdin not captured".into()))?;

        // Feed stdin from a second thread: a large image would otherwise
        // fill the pipe while tesseract is blocked writing diagnostics.
        let (output, written) = std::thread::scope(|scope| {
            let writer = scope.spawn(move || stdin.write_all(image_bytes));
            let output = child.wait_with_output();
            (output, writer.join())
        });
        let output = output?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ExtractionError::OcrProcessing(format!(
                "tesseract exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }
        match written {
            Ok(result) => result?,
            Err(_) => {
                return Err(ExtractionError::OcrProcessing(
                    "Tesseract stdin writer panicked".into(),
                ))
            }
        }

        let text = String::from_utf8(output.stdout)
            .map_err(|e| ExtractionError::EncodingError(format!("Tesseract output: {e}")))?;

        tracing::debug!(
            lang = %self.lang,
            input_bytes = image_bytes.len(),
            chars = text.chars().count(),
            "Tesseract recognition complete"
        );

        Ok(OcrPageResult {
            text,
            confidence: None,
        })
    }
}

/// Mock OCR engine for unit testing without Tesseract.
pub struct MockOcrEngine {
    pub text: String,
    pub confidence: f32,
    pub failure: Option<String>,
}

impl MockOcrEngine {
    pub fn new(text: &str, confidence: f32) -> Self {
        Self {
            text: text.to_string(),
            confidence,
            failure: None,
        }
    }

    /// Every call fails with `OcrProcessing(reason)`.
    pub fn failing(reason: &str) -> Self {
        Self {
            text: String::new(),
            confidence: 0.0,
            failure: Some(reason.to_string()),
        }
    }
}

impl OcrEngine for MockOcrEngine {
    fn recognize_text(&self, _image_bytes: &[u8]) -> Result<OcrPageResult, ExtractionError> {
        if let Some(reason) = &self.failure {
            return Err(ExtractionError::OcrProcessing(reason.clone()));
        }
        Ok(OcrPageResult {
            text: self.text.clone(),
            confidence: Some(self.confidence),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mock_ocr_returns_configured_text() {
        let engine = MockOcrEngine::new("1) Metformin 500mg", 0.92);
        let result = engine.recognize_text(b"fake_image_bytes").unwrap();
        assert_eq!(result.text, "1) Metformin 500mg");
        assert_eq!(result.confidence, Some(0.92));
    }

    #[test]
    fn mock_ocr_failing() {
        let engine = MockOcrEngine::failing("blurred");
        let err = engine.recognize_text(b"x").unwrap_err();
        assert!(matches!(err, ExtractionError::OcrProcessing(ref r) if r == "blurred"));
    }

    #[test]
    fn tesseract_defaults() {
        let engine = TesseractCli::default();
        assert_eq!(engine.binary(), Path::new("tesseract"));
        assert_eq!(engine.lang(), "eng");
        assert_eq!(engine.with_languages("eng+hin").lang(), "eng+hin");
    }

    #[test]
    fn missing_binary_is_init_error() {
        let engine = TesseractCli::new("/nonexistent/bin/tesseract-for-tests");
        let err = engine.recognize_text(b"image").unwrap_err();
        assert!(matches!(err, ExtractionError::OcrInit(_)), "got {err:?}");
    }

    #[cfg(unix)]
    #[test]
    fn failing_binary_is_processing_error() {
        let engine = TesseractCli::new("false");
        let err = engine.recognize_text(b"image").unwrap_err();
        assert!(matches!(err, ExtractionError::OcrProcessing(_)), "got {err:?}");
    }

    #[cfg(unix)]
    #[test]
    fn stdout_becomes_text() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("fake-tesseract");
        std::fs::write(&script, "#!/bin/sh\ncat >/dev/null\necho \"BP: 120/80\"\n").unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

        let result = TesseractCli::new(&script).recognize_text(b"image").unwrap();
        assert_eq!(result.text, "BP: 120/80\n");
        assert_eq!(result.confidence, None);
    }
}

use serde::{Deserialize, Serialize};

use super::ExtractionError;

/// Raw OCR result for one image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OcrPageResult {
    pub text: String,
    /// Mean recognition confidence in 0.0-1.0, when the engine reports one.
    pub confidence: Option<f32>,
}

impl OcrPageResult {
    /// True when recognition produced anything besides whitespace.
    pub fn has_text(&self) -> bool {
        !self.text.trim().is_empty()
    }
}

/// OCR engine abstraction (allows mocking for tests).
///
/// The structuring core only ever sees the returned text; the recognition
/// technology behind it is irrelevant.
pub trait OcrEngine: Send + Sync {
    fn recognize_text(&self, image_bytes: &[u8]) -> Result<OcrPageResult, ExtractionError>;
}

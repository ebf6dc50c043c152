pub mod extraction; // image -> OCR transcript
pub mod structuring; // transcript -> ExtractedDocument
pub mod batch; // directory driver

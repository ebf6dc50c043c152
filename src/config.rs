/// Application-level constants
pub const APP_NAME: &str = "CareCompanion";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Largest OCR transcript the structuring core accepts. A single
/// prescription page is a few KiB; anything near this is not a transcript.
pub const MAX_TRANSCRIPT_BYTES: usize = 1024 * 1024;

/// File extensions (lowercase) the batch driver picks up.
pub const IMAGE_EXTENSIONS: [&str; 4] = ["jpg", "jpeg", "png", "bmp"];

pub const DEFAULT_OCR_BINARY: &str = "tesseract";
pub const DEFAULT_OCR_LANGUAGE: &str = "eng";

/// `RUST_LOG`-style filter used when the environment sets none.
pub fn default_log_filter() -> &'static str {
    "info,carecompanion_lib=info,carecompanion=info"
}

/// Filter for `--verbose`: per-field extraction detail from this crate only.
pub fn verbose_log_filter() -> &'static str {
    "info,carecompanion_lib=debug,carecompanion=debug"
}

/// Whether `path` carries one of [`IMAGE_EXTENSIONS`] (case-insensitive).
pub fn is_image_path(path: &std::path::Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| IMAGE_EXTENSIONS.iter().any(|known| ext.eq_ignore_ascii_case(known)))
}

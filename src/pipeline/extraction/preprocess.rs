//! Image preparation ahead of OCR.
//!
//! Phone photos of prescriptions arrive rotated via EXIF and in colour.
//! Tesseract does best on an upright, single-channel, lossless image, so
//! every image is: size-checked, decoded, turned upright, converted to
//! grayscale and re-encoded as PNG.

use std::io::Cursor;

use image::{DynamicImage, ImageOutputFormat};
use tracing::debug;

use super::ExtractionError;

/// Default upper bound for an input image. Prevents OOM on corrupt/adversarial files.
pub const MAX_IMAGE_BYTES: usize = 50 * 1024 * 1024;

/// Minimum valid image size in bytes (smallest valid PNG is ~67 bytes).
pub const MIN_IMAGE_BYTES: usize = 67;

/// Reject byte buffers that cannot be a usable image before decoding.
pub fn validate_image_bytes(bytes: &[u8], max_bytes: usize) -> Result<(), ExtractionError> {
    if bytes.len() < MIN_IMAGE_BYTES {
        return Err(ExtractionError::ImageProcessing(
            "Image data too small to be valid".into(),
        ));
    }
    if bytes.len() > max_bytes {
        return Err(ExtractionError::ImageProcessing(format!(
            "Image data is {} bytes, limit is {max_bytes}",
            bytes.len()
        )));
    }
    Ok(())
}

/// Read EXIF orientation tag from raw image bytes.
/// Returns 1 (normal) if no EXIF data or tag not present.
pub fn read_exif_orientation(bytes: &[u8]) -> u32 {
    let mut cursor = Cursor::new(bytes);
    let Ok(reader) = exif::Reader::new().read_from_container(&mut cursor) else {
        return 1;
    };

    reader
        .get_field(exif::Tag::Orientation, exif::In::PRIMARY)
        .and_then(|f| f.value.get_uint(0))
        .unwrap_or(1)
}

/// Undo an EXIF orientation.
///
/// 1 = normal, 2 = mirrored, 3 = 180deg, 4 = flipped vertically,
/// 5 = mirrored + 90deg CW, 6 = 90deg CW, 7 = mirrored + 270deg CW, 8 = 270deg CW.
/// Unknown values leave the image untouched.
pub fn apply_orientation(img: DynamicImage, orientation: u32) -> DynamicImage {
    match orientation {
        2 => img.fliph(),
        3 => img.rotate180(),
        4 => img.flipv(),
        5 => img.rotate90().fliph(),
        6 => img.rotate90(),
        7 => img.rotate270().fliph(),
        8 => img.rotate270(),
        _ => img,
    }
}

/// Encode any image as PNG bytes.
pub fn encode_png(img: &DynamicImage) -> Result<Vec<u8>, ExtractionError> {
    let mut cursor = Cursor::new(Vec::new());
    img.write_to(&mut cursor, ImageOutputFormat::Png)
        .map_err(|e| ExtractionError::ImageProcessing(format!("PNG encoding failed: {e}")))?;
    Ok(cursor.into_inner())
}

/// Upright grayscale PNG ready for OCR.
pub fn preprocess_for_ocr(bytes: &[u8], max_bytes: usize) -> Result<Vec<u8>, ExtractionError> {
    validate_image_bytes(bytes, max_bytes)?;

    let decoded = image::load_from_memory(bytes)
        .map_err(|e| ExtractionError::ImageProcessing(format!("Decode failed: {e}")))?;

    let orientation = read_exif_orientation(bytes);
    let upright = apply_orientation(decoded, orientation);
    let gray = upright.grayscale();
    let png = encode_png(&gray)?;

    debug!(
        input_bytes = bytes.len(),
        output_bytes = png.len(),
        orientation,
        "Image prepared for OCR"
    );
    Ok(png)
}

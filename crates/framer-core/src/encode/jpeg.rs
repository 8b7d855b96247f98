//! JPEG encoding for export.

use image::codecs::jpeg::JpegEncoder;
use image::{ExtendedColorType, ImageEncoder, RgbImage, RgbaImage};

use super::{check_dimensions, EncodeError};

/// Composite an RGBA frame onto an opaque matte color.
pub fn flatten_rgb(frame: &RgbaImage, matte: [u8; 3]) -> RgbImage {
    RgbImage::from_fn(frame.width(), frame.height(), |x, y| {
        let [r, g, b, a] = frame.get_pixel(x, y).0;
        let a = a as u32;
        let mix = |c: u8, m: u8| ((c as u32 * a + m as u32 * (255 - a) + 127) / 255) as u8;
        image::Rgb([mix(r, matte[0]), mix(g, matte[1]), mix(b, matte[2])])
    })
}

/// Encode a frame to JPEG bytes.
///
/// Quality is clamped to 1-100. Transparent areas are flattened onto `matte`.
///
/// # Quality Guidelines
///
/// * 90-100: High quality, suitable for archival or further editing
/// * 80-90: Good quality, recommended for most uses
/// * Below 60: Low quality, visible artifacts
pub fn encode_jpeg(frame: &RgbaImage, quality: u8, matte: [u8; 3]) -> Result<Vec<u8>, EncodeError> {
    check_dimensions(frame)?;

    let rgb = flatten_rgb(frame, matte);
    let mut buffer = Vec::new();
    JpegEncoder::new_with_quality(&mut buffer, quality.clamp(1, 100))
        .write_image(rgb.as_raw(), rgb.width(), rgb.height(), ExtendedColorType::Rgb8)
        .map_err(|e| EncodeError::EncodingFailed {
            format: "JPEG",
            message: e.to_string(),
        })?;

    Ok(buffer)
}


// ============================================================================
// Property-Based Tests
// ============================================================================

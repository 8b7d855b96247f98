//! Frame encoding for export.
//!
//! Rendered frames are RGBA. PNG keeps the alpha channel; JPEG has none, so
//! frames are flattened onto a matte color first.
//!
//! # Examples
//!
//! ```ignore
//! use framer_core::encode::{encode_jpeg, encode_png};
//!
//! let frame = image::RgbaImage::new(100, 100);
//! let jpeg = encode_jpeg(&frame, 90, [255, 255, 255]).unwrap();
//! let png = encode_png(&frame).unwrap();
//! ```

mod jpeg;
mod png;

pub use jpeg::{encode_jpeg, flatten_rgb};
pub use png::encode_png;

use thiserror::Error;

/// Errors that can occur while encoding a frame.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// Width or height is zero
    #[error("Invalid dimensions: width ({width}) and height ({height}) must be non-zero")]
    InvalidDimensions { width: u32, height: u32 },

    /// The underlying encoder failed
    #[error("{format} encoding failed: {message}")]
    EncodingFailed {
        format: &'static str,
        message: String,
    },
}

fn check_dimensions(frame: &image::RgbaImage) -> Result<(), EncodeError> {
    let (width, height) = frame.dimensions();
    if width == 0 || height == 0 {
        return Err(EncodeError::InvalidDimensions { width, height });
    }
    Ok(())
}

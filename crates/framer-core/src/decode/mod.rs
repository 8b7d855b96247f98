//! Image import for Framer.
//!
//! The host hands over the raw bytes of an imported file; this module
//! decodes them into an [`ImageMetadata`] the store can own. The decoded
//! raster is RGBA so transparent PNGs composite correctly over the
//! background.
//!
//! # Examples
//!
//! ```ignore
//! use framer_core::decode::decode_image;
//!
//! let bytes = std::fs::read("photo.jpg").unwrap();
//! let meta = decode_image("photo.jpg", &bytes).unwrap();
//! println!("Imported {}x{} image", meta.width, meta.height);
//! ```

mod import;
mod types;

pub use import::decode_image;
pub use types::{DecodeError, ImageMetadata, ImageSource, Orientation};

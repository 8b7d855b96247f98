//! Export rendering at an arbitrary output resolution.
//!
//! The export is the preview at a different pixel density: the transform's
//! offsets and scale are all multiplied by `export_width / preview_width`,
//! then the same [`render_scene`] paints the frame. The export aspect ratio
//! must therefore match the preview's.

use image::{Rgba, RgbaImage};
use thiserror::Error;

use crate::encode::{self, EncodeError};
use crate::render::{render_scene, RasterSurface, SceneParams};
use crate::store::TransformStore;

/// Relative aspect-ratio mismatch tolerated between preview and export.
const ASPECT_TOLERANCE: f64 = 0.01;

/// Largest export frame, in pixels (8192 x 8192).
pub const MAX_EXPORT_PIXELS: u64 = 8192 * 8192;

/// Errors that can occur during export.
#[derive(Debug, Error)]
pub enum ExportError {
    /// Width or height is zero, or the frame exceeds `MAX_EXPORT_PIXELS`
    #[error("Invalid export size {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    /// No preview size has been set, so the transform has no pixel meaning yet
    #[error("Preview size is unknown")]
    NoPreviewSize,

    /// Export and preview aspect ratios differ
    #[error("Export aspect {export:.4} does not match preview aspect {preview:.4}")]
    AspectMismatch { export: f64, preview: f64 },

    #[error(transparent)]
    Encode(#[from] EncodeError),
}

/// Output image format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    #[default]
    Png,
    Jpeg {
        quality: u8,
    },
}

/// Export target description.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExportOptions {
    pub width: u32,
    pub height: u32,
    /// Overrides the configured background when set.
    pub background: Option<Rgba<u8>>,
    pub format: ExportFormat,
}

impl ExportOptions {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            background: None,
            format: ExportFormat::default(),
        }
    }
}

/// Render the store's current state at the export resolution.
pub fn export_frame(
    store: &TransformStore,
    options: &ExportOptions,
) -> Result<RgbaImage, ExportError> {
    let (width, height) = (options.width, options.height);
    if width == 0 || height == 0 || width as u64 * height as u64 > MAX_EXPORT_PIXELS {
        return Err(ExportError::InvalidDimensions { width, height });
    }
    let preview = store.canvas().ok_or(ExportError::NoPreviewSize)?;

    let preview_aspect = preview.width / preview.height;
    let export_aspect = width as f64 / height as f64;
    if ((export_aspect - preview_aspect) / preview_aspect).abs() > ASPECT_TOLERANCE {
        return Err(ExportError::AspectMismatch {
            export: export_aspect,
            preview: preview_aspect,
        });
    }

    let ratio = width as f64 / preview.width;
    tracing::debug!(width, height, ratio, "Rendering export frame");

    let mut surface = RasterSurface::new(width, height)
        .ok_or(ExportError::InvalidDimensions { width, height })?;
    render_scene(
        &mut surface,
        &SceneParams {
            width: width as f64,
            height: height as f64,
            background: options
                .background
                .unwrap_or_else(|| store.config().background_pixel()),
            transform: store.transform().rescaled(ratio),
            image: store.image(),
        },
    );
    Ok(surface.into_image())
}

/// Render and encode in the requested format.
pub fn export_bytes(store: &TransformStore, options: &ExportOptions) -> Result<Vec<u8>, ExportError> {
    let frame = export_frame(store, options)?;
    let bytes = match options.format {
        ExportFormat::Png => encode::encode_png(&frame)?,
        ExportFormat::Jpeg { quality } => {
            let [r, g, b, _] = options
                .background
                .unwrap_or_else(|| store.config().background_pixel())
                .0;
            encode::encode_jpeg(&frame, quality, [r, g, b])?
        }
    };
    Ok(bytes)
}

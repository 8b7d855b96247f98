//! Framer Core - image framing engine
//!
//! This crate positions and scales one imported image inside a fixed-aspect
//! canvas and renders the composited frame (background + transformed image)
//! for both live preview and final export.
//!
//! # Data Flow
//!
//! 1. Gesture events are normalised by [`gesture::GestureInterpreter`]
//! 2. The resulting pan/zoom deltas mutate the [`store::TransformStore`]
//! 3. The store re-runs [`reconcile::reconcile`] after every mutation
//! 4. [`render::render_scene`] paints the reconciled state onto a surface

pub mod config;
pub mod decode;
pub mod encode;
pub mod export;
pub mod geometry;
pub mod gesture;
pub mod reconcile;
pub mod render;
pub mod store;

pub use config::{EngineConfig, MinScale};
pub use decode::{decode_image, DecodeError, ImageMetadata, ImageSource};
pub use export::{export_bytes, export_frame, ExportError, ExportFormat, ExportOptions};
pub use geometry::{clamp, compute_contain_scale, Size, MAX_SCALE};
pub use gesture::{
    GestureConfig, GestureEvent, GestureInterpreter, GestureOutcome, InputEvent, Modifiers,
    PinchStream, PointerStream, TransformOp, ZoomModifier,
};
pub use render::{render_preview, render_scene, RasterSurface, SceneParams, Smoothing, Surface};
pub use store::{SubscriptionId, TransformStore};

/// Current on-screen canvas size, supplied by the host layout.
pub type CanvasGeometry = Size;

/// Pan offset and uniform scale of the image.
///
/// `x`/`y` are in output pixels relative to the canvas center; `scale` is a
/// multiplier on the image's native pixel dimensions.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TransformState {
    pub x: f64,
    pub y: f64,
    pub scale: f64,
}

impl Default for TransformState {
    fn default() -> Self {
        Self::identity()
    }
}

impl TransformState {
    pub fn new(x: f64, y: f64, scale: f64) -> Self {
        Self { x, y, scale }
    }

    /// Centered, native-size transform
    pub fn identity() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            scale: 1.0,
        }
    }

    /// Centered transform at the given scale
    pub fn centered(scale: f64) -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            scale,
        }
    }

    /// Merge the set fields of a patch into a copy of this state.
    pub fn merged(&self, patch: &TransformPatch) -> Self {
        Self {
            x: patch.x.unwrap_or(self.x),
            y: patch.y.unwrap_or(self.y),
            scale: patch.scale.unwrap_or(self.scale),
        }
    }

    /// Same transform expressed at a different output pixel density.
    ///
    /// Offsets and scale are both in output pixels, so a uniform change of
    /// output resolution multiplies all three.
    pub fn rescaled(&self, ratio: f64) -> Self {
        Self {
            x: self.x * ratio,
            y: self.y * ratio,
            scale: self.scale * ratio,
        }
    }
}

/// Partial update for [`TransformState`]. Unset fields are left untouched.
#[derive(Debug, Clone, Copy, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TransformPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<f64>,
}

impl TransformPatch {
    pub fn position(x: f64, y: f64) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            scale: None,
        }
    }

    pub fn scale(scale: f64) -> Self {
        Self {
            scale: Some(scale),
            ..Self::default()
        }
    }

    /// Check if the patch sets no field at all
    pub fn is_empty(&self) -> bool {
        self.x.is_none() && self.y.is_none() && self.scale.is_none()
    }
}

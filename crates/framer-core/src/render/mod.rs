//! Scene rendering: background plus transformed image.
//!
//! [`render_scene`] is the only drawing routine. The preview and the export
//! both call it; they differ only in the surface and the `width`/`height`
//! they pass, so the two outputs cannot drift apart.
//!
//! # Draw Order
//!
//! 1. Fill the full target rectangle with the background color
//! 2. Stop here if no image is set
//! 3. Translate to `(width / 2 + x, height / 2 + y)`
//! 4. Draw the image centered on that origin at `native size * scale`
//!    with high-quality smoothing
//!
//! Every state change is wrapped in `save`/`restore`, so rendering leaves the
//! surface's fill color, translation and smoothing exactly as it found them.

mod raster;

pub use raster::RasterSurface;

use image::{Rgba, RgbaImage};

use crate::decode::ImageMetadata;
use crate::store::TransformStore;
use crate::TransformState;

/// Resampling quality used when drawing an image at a non-native size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Smoothing {
    /// Nearest neighbour.
    Off,
    /// Bilinear interpolation.
    #[default]
    High,
}

/// Minimal 2D drawing capability set the renderer depends on.
pub trait Surface {
    /// Push the current drawing state (fill color, translation, smoothing).
    fn save(&mut self);

    /// Pop the most recently saved drawing state. Unbalanced calls are ignored.
    fn restore(&mut self);

    fn set_fill_color(&mut self, color: Rgba<u8>);

    /// Overwrite a rectangle with the fill color.
    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64);

    /// Move the origin for subsequent drawing.
    fn translate(&mut self, dx: f64, dy: f64);

    fn set_image_smoothing(&mut self, smoothing: Smoothing);

    /// Draw `image` stretched into the given rectangle.
    fn draw_image(&mut self, image: &RgbaImage, x: f64, y: f64, width: f64, height: f64);
}

/// Inputs for one render call.
#[derive(Debug, Clone, Copy)]
pub struct SceneParams<'a> {
    pub width: f64,
    pub height: f64,
    pub background: Rgba<u8>,
    pub transform: TransformState,
    pub image: Option<&'a ImageMetadata>,
}

/// Paint background and transformed image onto `surface`.
///
/// Reads its inputs only; the same params always produce the same drawing
/// calls.
pub fn render_scene<S: Surface + ?Sized>(surface: &mut S, params: &SceneParams<'_>) {
    surface.save();
    surface.set_fill_color(params.background);
    surface.fill_rect(0.0, 0.0, params.width, params.height);
    surface.restore();

    let Some(image) = params.image else {
        return;
    };
    if image.is_empty() {
        return;
    }

    let t = &params.transform;
    let draw_width = image.width as f64 * t.scale;
    let draw_height = image.height as f64 * t.scale;

    surface.save();
    surface.translate(params.width / 2.0 + t.x, params.height / 2.0 + t.y);
    surface.set_image_smoothing(Smoothing::High);
    surface.draw_image(
        &image.element,
        -draw_width / 2.0,
        -draw_height / 2.0,
        draw_width,
        draw_height,
    );
    surface.restore();
}

/// Render the store's current state at its preview size.
///
/// Returns `None` until a preview size is known, or if it exceeds what a
/// [`RasterSurface`] can hold.
pub fn render_preview(store: &TransformStore) -> Option<RgbaImage> {
    let canvas = store.canvas()?;
    let width = canvas.width.round().max(1.0) as u32;
    let height = canvas.height.round().max(1.0) as u32;

    let mut surface = RasterSurface::new(width, height)?;
    render_scene(
        &mut surface,
        &SceneParams {
            width: canvas.width,
            height: canvas.height,
            background: store.config().background_pixel(),
            transform: store.transform(),
            image: store.image(),
        },
    );
    Some(surface.into_image())
}


// ============================================================================
// Property-Based Tests
// ============================================================================

//! Software [`Surface`] backed by a `tiny_skia::Pixmap`.
//!
//! Used for the native preview path, for export, and anywhere a host does not
//! provide its own 2D context. Frames come out as straight-alpha `RgbaImage`s.
//!
//! # Drawing Semantics
//!
//! - `fill_rect` replaces the covered pixels (`BlendMode::Source`)
//! - `draw_image` composites with `BlendMode::SourceOver`
//! - `Smoothing::High` samples bilinearly, `Smoothing::Off` nearest; both pad
//!   at the source edges so a magnified image has no dark fringe
//!
//! The pixmap stores premultiplied color, so a translucent fill reads back
//! with up to one unit of rounding per channel.

use image::{Rgba, RgbaImage};
use tiny_skia::{
    BlendMode, ColorU8, FilterQuality, Paint, Pixmap, PixmapPaint, Rect, Transform,
};

use super::{Smoothing, Surface};

/// Largest width or height a surface accepts.
const MAX_DIMENSION: u32 = 32767;

#[derive(Debug, Clone, Copy, PartialEq)]
struct DrawState {
    fill: Rgba<u8>,
    transform: Transform,
    smoothing: Smoothing,
}

impl Default for DrawState {
    fn default() -> Self {
        Self {
            fill: Rgba([0, 0, 0, 255]),
            transform: Transform::identity(),
            smoothing: Smoothing::High,
        }
    }
}

/// An owned raster that implements [`Surface`].
#[derive(Debug, Clone)]
pub struct RasterSurface {
    pixmap: Pixmap,
    state: DrawState,
    stack: Vec<DrawState>,
}

impl RasterSurface {
    /// Create a fully transparent surface.
    ///
    /// Returns `None` for a zero dimension or one above 32767 pixels.
    pub fn new(width: u32, height: u32) -> Option<Self> {
        if width > MAX_DIMENSION || height > MAX_DIMENSION {
            return None;
        }
        Some(Self {
            pixmap: Pixmap::new(width, height)?,
            state: DrawState::default(),
            stack: Vec::new(),
        })
    }

    /// Demultiply the pixmap into a straight-alpha image.
    pub fn into_image(self) -> RgbaImage {
        let width = self.pixmap.width();
        let pixels = self.pixmap.pixels();
        RgbaImage::from_fn(width, self.pixmap.height(), |x, y| {
            let c = pixels[(y * width + x) as usize].demultiply();
            Rgba([c.red(), c.green(), c.blue(), c.alpha()])
        })
    }
}

impl Surface for RasterSurface {
    fn save(&mut self) {
        self.stack.push(self.state);
    }

    fn restore(&mut self) {
        if let Some(state) = self.stack.pop() {
            self.state = state;
        }
    }

    fn set_fill_color(&mut self, color: Rgba<u8>) {
        self.state.fill = color;
    }

    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        let (left, right) = ordered(x, width);
        let (top, bottom) = ordered(y, height);
        let Some(rect) = Rect::from_ltrb(left as f32, top as f32, right as f32, bottom as f32)
        else {
            return;
        };

        let [r, g, b, a] = self.state.fill.0;
        let mut paint = Paint::default();
        paint.set_color_rgba8(r, g, b, a);
        paint.blend_mode = BlendMode::Source;
        paint.anti_alias = false;

        self.pixmap
            .fill_rect(rect, &paint, self.state.transform, None);
    }

    fn translate(&mut self, dx: f64, dy: f64) {
        self.state.transform = self.state.transform.pre_translate(dx as f32, dy as f32);
    }

    fn set_image_smoothing(&mut self, smoothing: Smoothing) {
        self.state.smoothing = smoothing;
    }

    fn draw_image(&mut self, image: &RgbaImage, x: f64, y: f64, width: f64, height: f64) {
        let (src_w, src_h) = image.dimensions();
        let drawable = width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0;
        if !drawable || !x.is_finite() || !y.is_finite() {
            return;
        }
        let Some(source) = to_pixmap(image) else {
            return;
        };

        let transform = self
            .state
            .transform
            .pre_translate(x as f32, y as f32)
            .pre_scale(
                (width / src_w as f64) as f32,
                (height / src_h as f64) as f32,
            );
        let paint = PixmapPaint {
            opacity: 1.0,
            blend_mode: BlendMode::SourceOver,
            quality: match self.state.smoothing {
                Smoothing::High => FilterQuality::Bilinear,
                Smoothing::Off => FilterQuality::Nearest,
            },
        };

        self.pixmap
            .draw_pixmap(0, 0, source.as_ref(), &paint, transform, None);
    }
}

/// Normalise a start/extent pair so that start <= end.
#[inline]
fn ordered(start: f64, extent: f64) -> (f64, f64) {
    if extent < 0.0 {
        (start + extent, start)
    } else {
        (start, start + extent)
    }
}

/// Premultiplied copy of `image`, or `None` if it is empty.
fn to_pixmap(image: &RgbaImage) -> Option<Pixmap> {
    let mut pixmap = Pixmap::new(image.width(), image.height())?;
    for (dst, src) in pixmap.pixels_mut().iter_mut().zip(image.pixels()) {
        let [r, g, b, a] = src.0;
        *dst = ColorU8::from_rgba(r, g, b, a).premultiply();
    }
    Some(pixmap)
}

//! Pure geometry helpers shared by the store, the reconciler and the renderer.
//!
//! # Coordinate System
//!
//! - Sizes are in output pixels (the canvas) or native pixels (the image)
//! - Position offsets are measured from the canvas center, positive = right/down
//! - Scale is a uniform multiplier on the image's native pixel dimensions

use serde::{Deserialize, Serialize};

/// Absolute magnification ceiling relative to the image's native pixels.
pub const MAX_SCALE: f64 = 10.0;

/// Absolute magnification floor; keeps `scale` strictly positive.
pub const MIN_SCALE: f64 = 1e-3;

/// A width/height pair.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Both dimensions are finite and strictly positive.
    #[inline]
    pub fn is_positive(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }

    /// Scale both dimensions uniformly.
    #[inline]
    pub fn scaled(&self, factor: f64) -> Size {
        Size::new(self.width * factor, self.height * factor)
    }
}

/// Legal pan range for the current image, canvas and scale.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PositionBounds {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
}

impl PositionBounds {
    /// Check whether a point lies inside the bounds (inclusive).
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.min_x && x <= self.max_x && y >= self.min_y && y <= self.max_y
    }

    /// Clamp a point into the bounds.
    pub fn clamp_point(&self, x: f64, y: f64) -> (f64, f64) {
        (
            clamp(x, self.min_x, self.max_x),
            clamp(y, self.min_y, self.max_y),
        )
    }
}

/// Clamp `value` into `[min, max]`.
///
/// Total: an inverted range (`min > max`) is treated as zero-width at `min`,
/// and a NaN `value` also yields `min`. Unlike `f64::clamp` this never panics.
#[inline]
pub fn clamp(value: f64, min: f64, max: f64) -> f64 {
    if min > max || value.is_nan() {
        return min;
    }
    if value < min {
        min
    } else if value > max {
        max
    } else {
        value
    }
}

/// Largest uniform scale at which the whole image fits inside the canvas.
///
/// Callers must only invoke this with strictly positive sizes; the store
/// guards it. For a non-positive input this returns `1.0` rather than a
/// degenerate zero or infinite scale.
///
/// # Example
///
/// ```ignore
/// use framer_core::geometry::{compute_contain_scale, Size};
///
/// let scale = compute_contain_scale(Size::new(400.0, 200.0), Size::new(800.0, 600.0));
/// assert_eq!(scale, 2.0);
/// ```
pub fn compute_contain_scale(image: Size, canvas: Size) -> f64 {
    if !image.is_positive() || !canvas.is_positive() {
        return 1.0;
    }
    (canvas.width / image.width).min(canvas.height / image.height)
}

/// Pan range for an image displayed at `scale` inside `canvas`.
///
/// The image may only move far enough that it still covers the canvas on an
/// overflowing axis. On an axis where the scaled image fits, the range
/// collapses to `0.0` and the image stays centered.
pub fn position_bounds(image: Size, canvas: Size, scale: f64) -> PositionBounds {
    let display = image.scaled(scale);
    let max_x = ((display.width - canvas.width) / 2.0).max(0.0);
    let max_y = ((display.height - canvas.height) / 2.0).max(0.0);

    PositionBounds {
        min_x: -max_x,
        max_x,
        min_y: -max_y,
        max_y,
    }
}

/// True if `factor` is usable as a multiplicative scale change.
#[inline]
pub fn is_valid_factor(factor: f64) -> bool {
    factor.is_finite() && factor > 0.0
}


// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn size_strategy() -> impl Strategy<Value = Size> {
        (1.0f64..=8000.0, 1.0f64..=8000.0).prop_map(|(w, h)| Size::new(w, h))
    }

    proptest! {
        /// Property: contain-fit never crops and touches at least one edge.
        #[test]
        fn prop_contain_scale_fits_and_touches(
            image in size_strategy(),
            canvas in size_strategy(),
        ) {
            let scale = compute_contain_scale(image, canvas);
            let eps = 1e-9 * canvas.width.max(canvas.height);
            let display = image.scaled(scale);

            prop_assert!(display.width <= canvas.width + eps);
            prop_assert!(display.height <= canvas.height + eps);
            prop_assert!(
                (display.width - canvas.width).abs() <= eps
                    || (display.height - canvas.height).abs() <= eps
            );
        }

        /// Property: clamp always lands inside a well-formed range.
        #[test]
        fn prop_clamp_within_range(
            value in -1e6f64..1e6,
            a in -1e3f64..1e3,
            b in -1e3f64..1e3,
        ) {
            let (min, max) = if a <= b { (a, b) } else { (b, a) };
            let c = clamp(value, min, max);
            prop_assert!(c >= min && c <= max);
        }

        /// Property: bounds are symmetric and never inverted.
        #[test]
        fn prop_bounds_symmetric(
            image in size_strategy(),
            canvas in size_strategy(),
            scale in 0.01f64..=10.0,
        ) {
            let b = position_bounds(image, canvas, scale);
            prop_assert!(b.max_x >= 0.0 && b.max_y >= 0.0);
            prop_assert_eq!(b.min_x, -b.max_x);
            prop_assert_eq!(b.min_y, -b.max_y);
        }
    }
}

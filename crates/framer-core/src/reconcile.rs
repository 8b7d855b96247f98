//! Bounds reconciliation.
//!
//! Legal position and scale are a pure function of the current image size,
//! canvas size and scale. [`reconcile`] derives them and returns the patch
//! that brings a state back inside, or `None` when the state is already a
//! fixed point.
//!
//! # Algorithm
//!
//! 1. Clamp `scale` to `[MIN_SCALE, max_scale]` (and to the optional
//!    contain-fit floor)
//! 2. Compute the display size of the image at that scale
//! 3. Derive the symmetric pan range `max(0, display - canvas) / 2` per axis
//! 4. Clamp `x`/`y` into that range
//!
//! Scale is settled before position because the pan range depends on it;
//! this ordering makes one pass sufficient, so the pass is idempotent.

use crate::config::{EngineConfig, MinScale};
use crate::geometry::{compute_contain_scale, position_bounds, Size, MIN_SCALE};
use crate::{TransformPatch, TransformState};

/// Scale constraints enforced by the reconciler.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleLimits {
    pub max_scale: f64,
    pub min_scale: MinScale,
}

impl From<&EngineConfig> for ScaleLimits {
    fn from(config: &EngineConfig) -> Self {
        Self {
            max_scale: config.max_scale,
            min_scale: config.min_scale,
        }
    }
}

impl Default for ScaleLimits {
    fn default() -> Self {
        Self::from(&EngineConfig::default())
    }
}

/// Compute the correction that brings `state` inside its legal bounds.
///
/// Without both a positive image size and a positive canvas size only the
/// scale ceiling applies and the position is left alone.
pub fn reconcile(
    state: &TransformState,
    image: Option<Size>,
    canvas: Option<Size>,
    limits: &ScaleLimits,
) -> Option<TransformPatch> {
    let pair = match (image, canvas) {
        (Some(image), Some(canvas)) if image.is_positive() && canvas.is_positive() => {
            Some((image, canvas))
        }
        _ => None,
    };

    let mut target = state.scale.max(MIN_SCALE);
    if let (MinScale::ContainFit, Some((image, canvas))) = (limits.min_scale, pair) {
        target = target.max(compute_contain_scale(image, canvas));
    }
    // The ceiling wins over the floor when a tiny image meets a huge canvas.
    target = target.min(limits.max_scale);

    let mut patch = TransformPatch::default();
    if target != state.scale {
        patch.scale = Some(target);
    }

    if let Some((image, canvas)) = pair {
        let bounds = position_bounds(image, canvas, target);
        if !bounds.contains(state.x, state.y) {
            let (x, y) = bounds.clamp_point(state.x, state.y);
            if x != state.x {
                patch.x = Some(x);
            }
            if y != state.y {
                patch.y = Some(y);
            }
        }
    }

    if patch.is_empty() {
        None
    } else {
        Some(patch)
    }
}

/// Apply [`reconcile`] and return the resulting state.
pub fn reconciled(
    state: &TransformState,
    image: Option<Size>,
    canvas: Option<Size>,
    limits: &ScaleLimits,
) -> TransformState {
    match reconcile(state, image, canvas, limits) {
        Some(patch) => state.merged(&patch),
        None => *state,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::MAX_SCALE;

    const IMAGE: Size = Size {
        width: 400.0,
        height: 200.0,
    };
    const CANVAS: Size = Size {
        width: 800.0,
        height: 600.0,
    };

    #[test]
    fn test_in_bounds_state_is_fixed_point() {
        let state = TransformState::new(100.0, 0.0, 3.0);
        assert_eq!(
            reconcile(&state, Some(IMAGE), Some(CANVAS), &ScaleLimits::default()),
            None
        );
    }

    #[test]
    fn test_position_clamped_to_overflow() {
        // 1200x600 display in 800x600 canvas => x in [-200, 200], y pinned to 0
        let state = TransformState::new(500.0, -40.0, 3.0);
        let patch = reconcile(&state, Some(IMAGE), Some(CANVAS), &ScaleLimits::default()).unwrap();

        assert_eq!(patch.x, Some(200.0));
        assert_eq!(patch.y, Some(0.0));
        assert_eq!(patch.scale, None);
    }

    #[test]
    fn test_fitting_image_recenters() {
        let state = TransformState::new(30.0, 30.0, 1.0);
        let fixed = reconciled(&state, Some(IMAGE), Some(CANVAS), &ScaleLimits::default());
        assert_eq!(fixed, TransformState::new(0.0, 0.0, 1.0));
    }

    #[test]
    fn test_scale_ceiling() {
        let state = TransformState::new(0.0, 0.0, 50.0);
        let patch = reconcile(&state, Some(IMAGE), Some(CANVAS), &ScaleLimits::default()).unwrap();
        assert_eq!(patch.scale, Some(MAX_SCALE));
    }

    #[test]
    fn test_position_uses_corrected_scale() {
        // At scale 50 x=3000 would be legal, at the ceiling it is not.
        let state = TransformState::new(3000.0, 0.0, 50.0);
        let fixed = reconciled(&state, Some(IMAGE), Some(CANVAS), &ScaleLimits::default());

        // 400 * 10 = 4000 wide => max_x = (4000 - 800) / 2
        assert_eq!(fixed, TransformState::new(1600.0, 0.0, MAX_SCALE));
        assert_eq!(
            reconcile(&fixed, Some(IMAGE), Some(CANVAS), &ScaleLimits::default()),
            None
        );
    }

    #[test]
    fn test_no_image_only_ceiling_applies() {
        let state = TransformState::new(9999.0, -9999.0, 20.0);
        let patch = reconcile(&state, None, Some(CANVAS), &ScaleLimits::default()).unwrap();
        assert_eq!(patch, TransformPatch::scale(MAX_SCALE));
    }

    #[test]
    fn test_zero_canvas_leaves_position() {
        let state = TransformState::new(50.0, 50.0, 2.0);
        let canvas = Size::new(0.0, 600.0);
        assert_eq!(
            reconcile(&state, Some(IMAGE), Some(canvas), &ScaleLimits::default()),
            None
        );
    }

    #[test]
    fn test_without_floor_scale_may_go_below_contain() {
        let state = TransformState::new(0.0, 0.0, 0.1);
        assert_eq!(
            reconcile(&state, Some(IMAGE), Some(CANVAS), &ScaleLimits::default()),
            None
        );
    }

    #[test]
    fn test_absolute_floor_applies_without_contain_fit() {
        let state = TransformState::new(0.0, 0.0, 1e-9);
        let patch = reconcile(&state, Some(IMAGE), Some(CANVAS), &ScaleLimits::default()).unwrap();
        assert_eq!(patch.scale, Some(MIN_SCALE));

        let zero = TransformState::new(0.0, 0.0, 0.0);
        let fixed = reconciled(&zero, None, None, &ScaleLimits::default());
        assert_eq!(fixed.scale, MIN_SCALE);
    }

    #[test]
    fn test_contain_fit_floor() {
        let limits = ScaleLimits {
            max_scale: MAX_SCALE,
            min_scale: MinScale::ContainFit,
        };
        let state = TransformState::new(0.0, 0.0, 0.1);
        let patch = reconcile(&state, Some(IMAGE), Some(CANVAS), &limits).unwrap();
        assert_eq!(patch.scale, Some(2.0));
    }

    #[test]
    fn test_ceiling_beats_floor() {
        let limits = ScaleLimits {
            max_scale: 4.0,
            min_scale: MinScale::ContainFit,
        };
        let tiny = Size::new(10.0, 10.0);
        let state = TransformState::new(0.0, 0.0, 1.0);
        let fixed = reconciled(&state, Some(tiny), Some(CANVAS), &limits);
        assert_eq!(fixed.scale, 4.0);
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

//! Gesture interpretation: raw input deltas to transform operations.
//!
//! Three independent input channels feed the same two store primitives:
//!
//! - **Drag**: pointer press-move-release, pans by the raw pixel delta.
//!   With the zoom modifier held, the vertical delta zooms instead and the
//!   horizontal delta is discarded for that event.
//! - **Wheel**: `factor = exp(-dy * k_wheel)`, so opposite ticks cancel out
//!   exactly and repeated ticks compound multiplicatively.
//! - **Pinch**: `factor = max(min_factor, 1 + d * k_pinch)`.
//!
//! The interpreter holds no transform state. [`PointerStream`] and
//! [`PinchStream`] only remember the last absolute sample of their stream so
//! they can emit incremental deltas.

use serde::{Deserialize, Serialize};

use crate::geometry::is_valid_factor;
use crate::store::TransformStore;

/// Gesture-to-factor constants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GestureConfig {
    /// Scale change per pixel of vertical modified drag.
    pub k_drag: f64,
    /// Exponent per unit of wheel delta.
    pub k_wheel: f64,
    /// Scale change per pixel of pinch distance change.
    pub k_pinch: f64,
    /// Smallest factor a single drag or pinch event may apply.
    pub min_factor: f64,
    /// Which modifier turns a drag into a zoom.
    pub zoom_modifier: ZoomModifier,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            k_drag: 0.01,
            k_wheel: 0.0015,
            k_pinch: 0.01,
            min_factor: 0.5,
            zoom_modifier: ZoomModifier::Shift,
        }
    }
}

impl GestureConfig {
    /// Replace non-finite or non-positive constants with defaults.
    pub fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        let fix = |value: f64, fallback: f64| {
            if value.is_finite() && value > 0.0 {
                value
            } else {
                fallback
            }
        };
        self.k_drag = fix(self.k_drag, defaults.k_drag);
        self.k_wheel = fix(self.k_wheel, defaults.k_wheel);
        self.k_pinch = fix(self.k_pinch, defaults.k_pinch);
        self.min_factor = fix(self.min_factor, defaults.min_factor);
        self
    }
}

/// Modifier key that switches a drag from pan to zoom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ZoomModifier {
    #[default]
    Shift,
    Ctrl,
    Alt,
    Meta,
}

/// Modifier keys held when an event was emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn shift() -> Self {
        Self {
            shift: true,
            ..Self::default()
        }
    }

    /// Check whether the given zoom modifier is held.
    pub fn holds(&self, modifier: ZoomModifier) -> bool {
        match modifier {
            ZoomModifier::Shift => self.shift,
            ZoomModifier::Ctrl => self.ctrl,
            ZoomModifier::Alt => self.alt,
            ZoomModifier::Meta => self.meta,
        }
    }
}

/// One normalised input event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureEvent {
    /// Incremental pointer movement in output pixels.
    Drag { dx: f64, dy: f64, modifiers: Modifiers },
    /// Vertical wheel delta.
    Wheel { dy: f64 },
    /// Change in inter-finger distance.
    Pinch { delta: f64 },
}

/// Host event plus whether the host lets us cancel its default action.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InputEvent {
    pub gesture: GestureEvent,
    pub default_preventable: bool,
}

impl InputEvent {
    pub fn new(gesture: GestureEvent) -> Self {
        Self {
            gesture,
            default_preventable: true,
        }
    }
}

/// Store mutation derived from one gesture event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TransformOp {
    Nudge { dx: f64, dy: f64 },
    Scale { factor: f64 },
}

/// What happened to a dispatched event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GestureOutcome {
    /// The event produced a store mutation.
    pub applied: bool,
    /// The host should cancel its default action (text selection, scroll).
    pub prevent_default: bool,
}

/// Maps gesture events onto `nudge_position` / `adjust_scale`.
#[derive(Debug, Clone, Default)]
pub struct GestureInterpreter {
    config: GestureConfig,
}

impl GestureInterpreter {
    pub fn new(config: GestureConfig) -> Self {
        Self {
            config: config.sanitized(),
        }
    }

    pub fn config(&self) -> &GestureConfig {
        &self.config
    }

    /// Translate an event into a store operation.
    ///
    /// Returns `None` for events that carry no usable delta (zero or
    /// non-finite input).
    pub fn interpret(&self, event: &GestureEvent) -> Option<TransformOp> {
        let op = match *event {
            GestureEvent::Drag { dx, dy, modifiers } => {
                if modifiers.holds(self.config.zoom_modifier) {
                    // f64::max would turn a NaN delta into the floor factor
                    if !dy.is_finite() {
                        return None;
                    }
                    let factor = (1.0 - dy * self.config.k_drag).max(self.config.min_factor);
                    TransformOp::Scale { factor }
                } else {
                    if !dx.is_finite() || !dy.is_finite() || (dx == 0.0 && dy == 0.0) {
                        return None;
                    }
                    TransformOp::Nudge { dx, dy }
                }
            }
            GestureEvent::Wheel { dy } => TransformOp::Scale {
                factor: (-dy * self.config.k_wheel).exp(),
            },
            GestureEvent::Pinch { delta } if delta.is_finite() => TransformOp::Scale {
                factor: (1.0 + delta * self.config.k_pinch).max(self.config.min_factor),
            },
            GestureEvent::Pinch { .. } => return None,
        };

        match op {
            TransformOp::Scale { factor } if !is_valid_factor(factor) || factor == 1.0 => None,
            op => Some(op),
        }
    }

    /// Interpret an event and apply it to the store.
    pub fn dispatch(&self, store: &mut TransformStore, event: &InputEvent) -> GestureOutcome {
        let applied = match self.interpret(&event.gesture) {
            Some(TransformOp::Nudge { dx, dy }) => {
                store.nudge_position(dx, dy);
                true
            }
            Some(TransformOp::Scale { factor }) => store.adjust_scale(factor),
            None => false,
        };

        GestureOutcome {
            applied,
            prevent_default: event.default_preventable,
        }
    }
}

/// Press-move-release state machine for one pointer.
///
/// Converts absolute pointer positions into incremental drag events. Moves
/// of other pointers, or moves while no button is held, produce nothing.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum PointerStream {
    #[default]
    Idle,
    Dragging { pointer_id: i32, last_x: f64, last_y: f64 },
}

impl PointerStream {
    /// Begin a drag. Ignored if another pointer already owns the stream.
    pub fn press(&mut self, pointer_id: i32, x: f64, y: f64) -> bool {
        if self.is_active() {
            return false;
        }
        *self = PointerStream::Dragging {
            pointer_id,
            last_x: x,
            last_y: y,
        };
        true
    }

    /// Feed a pointer position, returning the drag delta since the last one.
    pub fn motion(
        &mut self,
        pointer_id: i32,
        x: f64,
        y: f64,
        modifiers: Modifiers,
    ) -> Option<GestureEvent> {
        let PointerStream::Dragging {
            pointer_id: owner,
            last_x,
            last_y,
        } = self
        else {
            return None;
        };
        if *owner != pointer_id || !x.is_finite() || !y.is_finite() {
            return None;
        }

        let (dx, dy) = (x - *last_x, y - *last_y);
        *last_x = x;
        *last_y = y;
        Some(GestureEvent::Drag { dx, dy, modifiers })
    }

    /// End the drag owned by `pointer_id`.
    pub fn release(&mut self, pointer_id: i32) -> bool {
        match *self {
            PointerStream::Dragging { pointer_id: owner, .. } if owner == pointer_id => {
                *self = PointerStream::Idle;
                true
            }
            _ => false,
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, PointerStream::Dragging { .. })
    }
}

/// Two-finger distance tracker producing pinch deltas.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum PinchStream {
    #[default]
    Idle,
    Pinching { last_distance: f64 },
}

impl PinchStream {
    pub fn begin(&mut self, distance: f64) {
        *self = PinchStream::Pinching {
            last_distance: distance,
        };
    }

    /// Feed the current finger distance, returning the change since the last one.
    pub fn update(&mut self, distance: f64) -> Option<GestureEvent> {
        let PinchStream::Pinching { last_distance } = self else {
            return None;
        };
        if !distance.is_finite() {
            return None;
        }
        let delta = distance - *last_distance;
        *last_distance = distance;
        Some(GestureEvent::Pinch { delta })
    }

    pub fn end(&mut self) {
        *self = PinchStream::Idle;
    }

    pub fn is_active(&self) -> bool {
        matches!(self, PinchStream::Pinching { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::ImageMetadata;
    use crate::geometry::MIN_SCALE;
    use crate::{EngineConfig, Size, TransformPatch, TransformState};
    use image::RgbaImage;

    fn interpreter() -> GestureInterpreter {
        GestureInterpreter::new(GestureConfig::default())
    }

    /// Store with no image, so reconciliation never moves the position.
    fn bare_store() -> TransformStore {
        TransformStore::new(EngineConfig::default())
    }

    #[test]
    fn test_plain_drag_is_raw_nudge() {
        let op = interpreter().interpret(&GestureEvent::Drag {
            dx: 12.0,
            dy: -3.0,
            modifiers: Modifiers::none(),
        });
        assert_eq!(op, Some(TransformOp::Nudge { dx: 12.0, dy: -3.0 }));
    }

    #[test]
    fn test_modified_drag_zooms_and_drops_dx() {
        let op = interpreter().interpret(&GestureEvent::Drag {
            dx: 40.0,
            dy: 20.0,
            modifiers: Modifiers::shift(),
        });
        // 1 - 20 * 0.01
        match op {
            Some(TransformOp::Scale { factor }) => assert!((factor - 0.8).abs() < 1e-12),
            other => panic!("expected scale op, got {:?}", other),
        }
    }

    #[test]
    fn test_modified_drag_factor_floor() {
        let op = interpreter().interpret(&GestureEvent::Drag {
            dx: 0.0,
            dy: 500.0,
            modifiers: Modifiers::shift(),
        });
        assert_eq!(op, Some(TransformOp::Scale { factor: 0.5 }));
    }

    #[test]
    fn test_configurable_zoom_modifier() {
        let mut config = GestureConfig::default();
        config.zoom_modifier = ZoomModifier::Ctrl;
        let interp = GestureInterpreter::new(config);

        let shift_drag = GestureEvent::Drag {
            dx: 1.0,
            dy: 1.0,
            modifiers: Modifiers::shift(),
        };
        assert_eq!(
            interp.interpret(&shift_drag),
            Some(TransformOp::Nudge { dx: 1.0, dy: 1.0 })
        );

        let ctrl_drag = GestureEvent::Drag {
            dx: 1.0,
            dy: 10.0,
            modifiers: Modifiers {
                ctrl: true,
                ..Modifiers::none()
            },
        };
        assert!(matches!(
            interp.interpret(&ctrl_drag),
            Some(TransformOp::Scale { .. })
        ));
    }

    #[test]
    fn test_wheel_directions_are_inverse() {
        let interp = interpreter();
        let up = match interp.interpret(&GestureEvent::Wheel { dy: -100.0 }) {
            Some(TransformOp::Scale { factor }) => factor,
            other => panic!("expected scale op, got {:?}", other),
        };
        let down = match interp.interpret(&GestureEvent::Wheel { dy: 100.0 }) {
            Some(TransformOp::Scale { factor }) => factor,
            other => panic!("expected scale op, got {:?}", other),
        };

        assert!(up > 1.0);
        assert!(down < 1.0);
        assert!((up * down - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_pinch_factor() {
        let interp = interpreter();
        match interp.interpret(&GestureEvent::Pinch { delta: 10.0 }) {
            Some(TransformOp::Scale { factor }) => assert!((factor - 1.1).abs() < 1e-12),
            other => panic!("expected scale op, got {:?}", other),
        }
        assert_eq!(
            interp.interpret(&GestureEvent::Pinch { delta: -1000.0 }),
            Some(TransformOp::Scale { factor: 0.5 })
        );
    }

    #[test]
    fn test_degenerate_events_are_dropped() {
        let interp = interpreter();
        assert_eq!(interp.interpret(&GestureEvent::Wheel { dy: 0.0 }), None);
        assert_eq!(interp.interpret(&GestureEvent::Wheel { dy: f64::NAN }), None);
        assert_eq!(interp.interpret(&GestureEvent::Pinch { delta: 0.0 }), None);
        assert_eq!(interp.interpret(&GestureEvent::Pinch { delta: f64::NAN }), None);
        assert_eq!(
            interp.interpret(&GestureEvent::Drag {
                dx: 0.0,
                dy: f64::NAN,
                modifiers: Modifiers::shift()
            }),
            None
        );
        assert_eq!(
            interp.interpret(&GestureEvent::Drag {
                dx: f64::INFINITY,
                dy: 0.0,
                modifiers: Modifiers::none()
            }),
            None
        );
    }

    #[test]
    fn test_modified_drag_scenario() {
        let mut store = bare_store();
        store.update_transform(TransformPatch {
            x: Some(0.0),
            y: Some(0.0),
            scale: Some(1.0),
        });

        let outcome = interpreter().dispatch(
            &mut store,
            &InputEvent::new(GestureEvent::Drag {
                dx: 30.0,
                dy: 50.0,
                modifiers: Modifiers::shift(),
            }),
        );

        assert!(outcome.applied);
        assert!(outcome.prevent_default);
        let expected = (1.0f64 - 50.0 * 0.01).max(0.5);
        assert_eq!(store.transform(), TransformState::new(0.0, 0.0, expected));
    }

    #[test]
    fn test_extreme_zoom_out_stays_recoverable() {
        let mut store = bare_store();
        let interp = interpreter();

        for _ in 0..2 {
            interp.dispatch(
                &mut store,
                &InputEvent::new(GestureEvent::Wheel { dy: 400_000.0 }),
            );
        }
        assert_eq!(store.transform().scale, MIN_SCALE);

        interp.dispatch(&mut store, &InputEvent::new(GestureEvent::Wheel { dy: -100.0 }));
        assert!(store.transform().scale > MIN_SCALE);
    }

    #[test]
    fn test_drag_at_factor_floor_stays_above_min_scale() {
        let mut store = bare_store();
        let interp = interpreter();
        let drag = InputEvent::new(GestureEvent::Drag {
            dx: 0.0,
            dy: 500.0,
            modifiers: Modifiers::shift(),
        });

        for _ in 0..1200 {
            interp.dispatch(&mut store, &drag);
            assert!(store.transform().scale >= MIN_SCALE);
        }
        assert_eq!(store.transform().scale, MIN_SCALE);
    }

    #[test]
    fn test_dispatch_plain_drag_pans() {
        let mut store = bare_store();
        let outcome = interpreter().dispatch(
            &mut store,
            &InputEvent::new(GestureEvent::Drag {
                dx: 5.0,
                dy: 7.0,
                modifiers: Modifiers::none(),
            }),
        );

        assert!(outcome.applied);
        assert_eq!(store.transform(), TransformState::new(5.0, 7.0, 1.0));
    }

    #[test]
    fn test_dispatch_respects_default_preventable() {
        let mut store = bare_store();
        let event = InputEvent {
            gesture: GestureEvent::Wheel { dy: 0.0 },
            default_preventable: false,
        };
        let outcome = interpreter().dispatch(&mut store, &event);

        assert_eq!(outcome, GestureOutcome::default());
    }

    #[test]
    fn test_dispatch_pans_within_image_bounds() {
        let mut store = bare_store();
        store.set_preview_size(Size::new(800.0, 600.0));
        store.load_image(ImageMetadata::from_rgba("wide", RgbaImage::new(400, 200)));
        store.adjust_scale(1.5); // 2.0 -> 3.0, 1200x600 display

        let interp = interpreter();
        for _ in 0..10 {
            interp.dispatch(
                &mut store,
                &InputEvent::new(GestureEvent::Drag {
                    dx: 50.0,
                    dy: 50.0,
                    modifiers: Modifiers::none(),
                }),
            );
        }

        assert_eq!(store.transform(), TransformState::new(200.0, 0.0, 3.0));
    }

    #[test]
    fn test_pointer_stream_deltas() {
        let mut stream = PointerStream::default();
        assert_eq!(stream.motion(1, 10.0, 10.0, Modifiers::none()), None);

        assert!(stream.press(1, 10.0, 10.0));
        assert!(!stream.press(2, 0.0, 0.0));

        assert_eq!(
            stream.motion(1, 15.0, 8.0, Modifiers::none()),
            Some(GestureEvent::Drag {
                dx: 5.0,
                dy: -2.0,
                modifiers: Modifiers::none()
            })
        );
        assert_eq!(
            stream.motion(1, 16.0, 8.0, Modifiers::shift()),
            Some(GestureEvent::Drag {
                dx: 1.0,
                dy: 0.0,
                modifiers: Modifiers::shift()
            })
        );
        // Foreign pointer is ignored
        assert_eq!(stream.motion(2, 100.0, 100.0, Modifiers::none()), None);

        assert!(!stream.release(2));
        assert!(stream.release(1));
        assert!(!stream.is_active());
        assert_eq!(stream.motion(1, 20.0, 20.0, Modifiers::none()), None);
    }

    #[test]
    fn test_pinch_stream_deltas() {
        let mut stream = PinchStream::default();
        assert_eq!(stream.update(100.0), None);

        stream.begin(100.0);
        assert_eq!(stream.update(120.0), Some(GestureEvent::Pinch { delta: 20.0 }));
        assert_eq!(stream.update(110.0), Some(GestureEvent::Pinch { delta: -10.0 }));

        stream.end();
        assert!(!stream.is_active());
        assert_eq!(stream.update(200.0), None);
    }

    #[test]
    fn test_sanitized_config() {
        let config = GestureConfig {
            k_drag: -1.0,
            min_factor: 0.0,
            ..GestureConfig::default()
        }
        .sanitized();
        assert_eq!(config.k_drag, 0.01);
        assert_eq!(config.min_factor, 0.5);
    }
}

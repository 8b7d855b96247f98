//! JS-friendly value types.

use framer_core::TransformState;
use wasm_bindgen::prelude::*;

/// Snapshot of the current transform.
///
/// `x`/`y` are preview pixels relative to the canvas center, `scale` is a
/// multiplier on the image's native size.
#[wasm_bindgen]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JsTransform {
    x: f64,
    y: f64,
    scale: f64,
}

#[wasm_bindgen]
impl JsTransform {
    #[wasm_bindgen(getter)]
    pub fn x(&self) -> f64 {
        self.x
    }

    #[wasm_bindgen(getter)]
    pub fn y(&self) -> f64 {
        self.y
    }

    #[wasm_bindgen(getter)]
    pub fn scale(&self) -> f64 {
        self.scale
    }
}

impl From<TransformState> for JsTransform {
    fn from(state: TransformState) -> Self {
        Self {
            x: state.x,
            y: state.y,
            scale: state.scale,
        }
    }
}

//! Framing session bindings.
//!
//! [`JsFrameEditor`] owns one [`TransformStore`] plus the pointer and pinch
//! state machines that turn raw DOM events into gesture events. Every event
//! method returns whether the host should call `preventDefault()`.
//!
//! # Example
//!
//! ```typescript
//! const editor = new JsFrameEditor({ minScale: 'containFit' });
//! editor.set_preview_size(800, 800);
//! editor.load_image('photo.jpg', bytes);
//! editor.subscribe((x, y, scale) => requestAnimationFrame(draw));
//!
//! canvas.onpointerdown = (e) => editor.pointer_down(e.pointerId, e.clientX, e.clientY);
//! canvas.onpointermove = (e) => {
//!   if (editor.pointer_move(e.pointerId, e.clientX, e.clientY,
//!                           e.shiftKey, e.ctrlKey, e.altKey, e.metaKey)) {
//!     e.preventDefault();
//!   }
//! };
//!
//! const png = editor.export_png(2048, 2048);
//! ```

use std::collections::HashMap;

use framer_core::decode::DecodeError;
use framer_core::export::{export_bytes, ExportError, ExportFormat, ExportOptions};
use framer_core::{
    decode_image, render_preview, EngineConfig, GestureEvent, GestureInterpreter, InputEvent,
    Modifiers, PinchStream, PointerStream, Size, SubscriptionId, TransformPatch, TransformStore,
};
use wasm_bindgen::prelude::*;

use crate::types::JsTransform;

/// One framing session: image, preview canvas and transform.
#[wasm_bindgen]
pub struct JsFrameEditor {
    store: TransformStore,
    interpreter: GestureInterpreter,
    pointer: PointerStream,
    pinch: PinchStream,
    subscriptions: HashMap<u32, SubscriptionId>,
    next_handle: u32,
}

#[wasm_bindgen]
impl JsFrameEditor {
    /// Create an editor.
    ///
    /// `config` is an optional plain object in the `EngineConfig` camelCase
    /// shape; missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if `config` is present but does not match that shape.
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<JsFrameEditor, JsValue> {
        let config = if config.is_undefined() || config.is_null() {
            EngineConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config)
                .map_err(|e| JsValue::from_str(&format!("Invalid editor config: {}", e)))?
        };
        Ok(Self::with_config(config))
    }

    /// Decode and install an image.
    ///
    /// Returns `false` if `source` names the image that is already loaded.
    ///
    /// # Errors
    ///
    /// Returns an error if the bytes cannot be decoded.
    pub fn load_image(&mut self, source: &str, bytes: &[u8]) -> Result<bool, JsValue> {
        self.load_bytes(source, bytes)
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    pub fn clear_image(&mut self) {
        self.store.clear_image();
    }

    #[wasm_bindgen(getter)]
    pub fn has_image(&self) -> bool {
        self.store.image().is_some()
    }

    /// Report the current on-screen canvas size. Returns `false` if rejected.
    pub fn set_preview_size(&mut self, width: f64, height: f64) -> bool {
        self.store.set_preview_size(Size::new(width, height))
    }

    pub fn pointer_down(&mut self, pointer_id: i32, x: f64, y: f64) -> bool {
        self.pointer.press(pointer_id, x, y)
    }

    #[allow(clippy::too_many_arguments)]
    pub fn pointer_move(
        &mut self,
        pointer_id: i32,
        x: f64,
        y: f64,
        shift: bool,
        ctrl: bool,
        alt: bool,
        meta: bool,
    ) -> bool {
        let modifiers = Modifiers {
            shift,
            ctrl,
            alt,
            meta,
        };
        match self.pointer.motion(pointer_id, x, y, modifiers) {
            Some(gesture) => self.dispatch(gesture),
            None => false,
        }
    }

    pub fn pointer_up(&mut self, pointer_id: i32) -> bool {
        self.pointer.release(pointer_id)
    }

    /// Feed a wheel event's vertical delta.
    pub fn wheel(&mut self, delta_y: f64) -> bool {
        self.dispatch(GestureEvent::Wheel { dy: delta_y })
    }

    /// Start a two-finger gesture at the given finger distance.
    pub fn pinch_start(&mut self, distance: f64) {
        self.pinch.begin(distance);
    }

    pub fn pinch_move(&mut self, distance: f64) -> bool {
        match self.pinch.update(distance) {
            Some(gesture) => self.dispatch(gesture),
            None => false,
        }
    }

    pub fn pinch_end(&mut self) {
        self.pinch.end();
    }

    /// True while a drag or pinch is in progress.
    #[wasm_bindgen(getter)]
    pub fn gesture_active(&self) -> bool {
        self.pointer.is_active() || self.pinch.is_active()
    }

    /// Pan by a raw delta, e.g. from arrow keys.
    pub fn nudge(&mut self, dx: f64, dy: f64) {
        self.store.nudge_position(dx, dy);
    }

    pub fn adjust_scale(&mut self, factor: f64) -> bool {
        self.store.adjust_scale(factor)
    }

    /// Set any of `x`, `y`, `scale`; pass `undefined` to leave one untouched.
    pub fn update_transform(&mut self, x: Option<f64>, y: Option<f64>, scale: Option<f64>) {
        self.store.update_transform(TransformPatch { x, y, scale });
    }

    /// Return to the contain-fit view of the current image.
    pub fn reset_view(&mut self) {
        self.store.reset_view();
    }

    #[wasm_bindgen(getter)]
    pub fn transform(&self) -> JsTransform {
        self.store.transform().into()
    }

    /// Render the preview as RGBA bytes at the preview size, if one is set.
    pub fn render_preview(&self) -> Option<Vec<u8>> {
        render_preview(&self.store).map(|frame| frame.into_raw())
    }

    /// # Errors
    ///
    /// Returns an error if no preview size is set, the size is zero or above
    /// 8192 x 8192 pixels, or its aspect ratio differs from the preview's.
    pub fn export_png(&self, width: u32, height: u32) -> Result<Vec<u8>, JsValue> {
        self.export(width, height, ExportFormat::Png)
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// # Errors
    ///
    /// Same conditions as `export_png`.
    pub fn export_jpeg(&self, width: u32, height: u32, quality: u8) -> Result<Vec<u8>, JsValue> {
        self.export(width, height, ExportFormat::Jpeg { quality })
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Call `callback(x, y, scale)` after every committed transform change.
    ///
    /// Returns a handle for `unsubscribe`.
    pub fn subscribe(&mut self, callback: js_sys::Function) -> u32 {
        let id = self.store.subscribe(move |state| {
            let result = callback.call3(
                &JsValue::NULL,
                &JsValue::from_f64(state.x),
                &JsValue::from_f64(state.y),
                &JsValue::from_f64(state.scale),
            );
            if let Err(err) = result {
                web_sys::console::error_2(&JsValue::from_str("Transform observer threw:"), &err);
            }
        });
        self.register(id)
    }

    pub fn unsubscribe(&mut self, handle: u32) -> bool {
        match self.subscriptions.remove(&handle) {
            Some(id) => self.store.unsubscribe(id),
            None => false,
        }
    }
}

impl JsFrameEditor {
    pub(crate) fn with_config(config: EngineConfig) -> Self {
        let interpreter = GestureInterpreter::new(config.gesture.clone());
        Self {
            store: TransformStore::new(config),
            interpreter,
            pointer: PointerStream::default(),
            pinch: PinchStream::default(),
            subscriptions: HashMap::new(),
            next_handle: 0,
        }
    }

    fn load_bytes(&mut self, source: &str, bytes: &[u8]) -> Result<bool, DecodeError> {
        if self
            .store
            .image()
            .is_some_and(|current| current.source.as_str() == source)
        {
            return Ok(false);
        }
        let image = decode_image(source, bytes)?;
        Ok(self.store.load_image(image))
    }

    fn dispatch(&mut self, gesture: GestureEvent) -> bool {
        self.interpreter
            .dispatch(&mut self.store, &InputEvent::new(gesture))
            .prevent_default
    }

    fn export(&self, width: u32, height: u32, format: ExportFormat) -> Result<Vec<u8>, ExportError> {
        let mut options = ExportOptions::new(width, height);
        options.format = format;
        export_bytes(&self.store, &options)
    }

    fn register(&mut self, id: SubscriptionId) -> u32 {
        let handle = self.next_handle;
        self.next_handle = self.next_handle.wrapping_add(1);
        self.subscriptions.insert(handle, id);
        handle
    }
}

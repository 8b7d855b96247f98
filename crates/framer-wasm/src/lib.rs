//! Framer WASM - WebAssembly bindings for the framing engine
//!
//! This crate exposes the framer-core transform store, gesture interpreter
//! and renderer to JavaScript/TypeScript hosts.
//!
//! # Module Structure
//!
//! - `editor` - [`JsFrameEditor`], one framing session (image + canvas + transform)
//! - `types` - JS-friendly value types returned by the editor
//!
//! # Usage
//!
//! ```typescript
//! import init, { JsFrameEditor } from '@framer/wasm';
//!
//! await init();
//!
//! const editor = new JsFrameEditor();
//! editor.set_preview_size(canvas.width, canvas.height);
//! editor.load_image(file.name, new Uint8Array(await file.arrayBuffer()));
//!
//! canvas.addEventListener('wheel', (e) => {
//!   if (editor.wheel(e.deltaY)) e.preventDefault();
//! });
//! ```

use wasm_bindgen::prelude::*;

mod editor;
mod types;

pub use editor::JsFrameEditor;
pub use types::JsTransform;

/// Initialize the WASM module (called automatically on load)
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

/// Get the version of the WASM module
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// Contain-fit scale for an image inside a canvas.
///
/// Exposed so hosts can size thumbnails the same way the editor does.
#[wasm_bindgen]
pub fn contain_scale(
    image_width: f64,
    image_height: f64,
    canvas_width: f64,
    canvas_height: f64,
) -> f64 {
    framer_core::compute_contain_scale(
        framer_core::Size::new(image_width, image_height),
        framer_core::Size::new(canvas_width, canvas_height),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!version().is_empty());
    }

    #[test]
    fn test_contain_scale() {
        assert_eq!(contain_scale(1600.0, 800.0, 800.0, 800.0), 0.5);
        assert_eq!(contain_scale(0.0, 800.0, 800.0, 800.0), 1.0);
    }
}

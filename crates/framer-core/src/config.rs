//! Engine configuration.
//!
//! All fields have defaults, so a host can deserialize a partial config
//! (for example `{ "maxScale": 4 }` from JavaScript) and get sensible values
//! for the rest.

use serde::{Deserialize, Serialize};

use crate::geometry::{MAX_SCALE, MIN_SCALE};
use crate::gesture::GestureConfig;

/// Lower bound the reconciler enforces on `scale`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MinScale {
    /// No floor; only callers keep scale above zero.
    #[default]
    None,
    /// Never zoom out past the contain-fit scale.
    ContainFit,
}

/// Tunables for the transform engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineConfig {
    /// Scale ceiling (multiplier on native image pixels).
    pub max_scale: f64,
    /// Scale floor policy.
    pub min_scale: MinScale,
    /// Gesture-to-factor constants.
    pub gesture: GestureConfig,
    /// RGBA background color painted under the image.
    pub background: [u8; 4],
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_scale: MAX_SCALE,
            min_scale: MinScale::None,
            gesture: GestureConfig::default(),
            background: [255, 255, 255, 255],
        }
    }
}

impl EngineConfig {
    /// Replace unusable tunables (non-finite, or a ceiling below `MIN_SCALE`)
    /// with defaults.
    pub fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        if !(self.max_scale.is_finite() && self.max_scale >= MIN_SCALE) {
            tracing::debug!(max_scale = self.max_scale, "Invalid max scale, using default");
            self.max_scale = defaults.max_scale;
        }
        self.gesture = self.gesture.sanitized();
        self
    }

    /// Background as an `image` pixel.
    pub fn background_pixel(&self) -> image::Rgba<u8> {
        image::Rgba(self.background)
    }
}

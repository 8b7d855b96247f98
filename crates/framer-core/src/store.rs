//! Transform state store.
//!
//! The store is the single owner of the mutable framing state: the current
//! [`TransformState`], the imported [`ImageMetadata`] and the preview
//! [`CanvasGeometry`]. Every public mutation is one atomic transition:
//!
//! 1. merge the raw change into the state
//! 2. run the reconciler against the current image and canvas
//! 3. notify observers if the committed state differs from the previous one
//!
//! Mutators never clamp themselves; correctness comes from step 2, so
//! observers and renderers only ever see reconciled state.

use std::fmt;

use crate::config::EngineConfig;
use crate::decode::ImageMetadata;
use crate::geometry::{compute_contain_scale, is_valid_factor, position_bounds, PositionBounds};
use crate::reconcile::{reconcile, ScaleLimits};
use crate::{CanvasGeometry, TransformPatch, TransformState};

/// Handle returned by [`TransformStore::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Observer = Box<dyn FnMut(&TransformState)>;

/// Single-writer owner of the framing state.
pub struct TransformStore {
    transform: TransformState,
    image: Option<ImageMetadata>,
    canvas: Option<CanvasGeometry>,
    config: EngineConfig,
    observers: Vec<(SubscriptionId, Observer)>,
    next_subscription: u64,
    /// An image arrived before a usable canvas size; fit it once one is known.
    fit_pending: bool,
}

impl fmt::Debug for TransformStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransformStore")
            .field("transform", &self.transform)
            .field("image", &self.image.as_ref().map(|i| &i.source))
            .field("canvas", &self.canvas)
            .field("config", &self.config)
            .field("observers", &self.observers.len())
            .field("fit_pending", &self.fit_pending)
            .finish()
    }
}

impl Default for TransformStore {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl TransformStore {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            transform: TransformState::identity(),
            image: None,
            canvas: None,
            config: config.sanitized(),
            observers: Vec::new(),
            next_subscription: 0,
            fit_pending: false,
        }
    }

    /// Current (reconciled) transform.
    pub fn transform(&self) -> TransformState {
        self.transform
    }

    pub fn image(&self) -> Option<&ImageMetadata> {
        self.image.as_ref()
    }

    pub fn canvas(&self) -> Option<CanvasGeometry> {
        self.canvas
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Contain-fit scale for the current image and canvas, if both are usable.
    pub fn contain_scale(&self) -> Option<f64> {
        let (image, canvas) = self.usable_pair()?;
        Some(compute_contain_scale(image.size(), canvas))
    }

    /// Legal pan range at the current scale, if image and canvas are usable.
    pub fn bounds(&self) -> Option<PositionBounds> {
        let (image, canvas) = self.usable_pair()?;
        Some(position_bounds(image.size(), canvas, self.transform.scale))
    }

    /// Merge a partial transform. Non-finite fields and non-positive scales
    /// are dropped from the patch.
    pub fn update_transform(&mut self, patch: TransformPatch) {
        let patch = TransformPatch {
            x: patch.x.filter(|x| x.is_finite()),
            y: patch.y.filter(|y| y.is_finite()),
            scale: patch.scale.filter(|s| is_valid_factor(*s)),
        };
        if patch.is_empty() {
            return;
        }
        self.commit(self.transform.merged(&patch));
    }

    /// Add a raw output-pixel delta to the position.
    pub fn nudge_position(&mut self, dx: f64, dy: f64) {
        if !dx.is_finite() || !dy.is_finite() {
            tracing::debug!(dx, dy, "Ignoring non-finite position delta");
            return;
        }
        let t = self.transform;
        self.commit(TransformState::new(t.x + dx, t.y + dy, t.scale));
    }

    /// Multiply the scale by `factor`.
    ///
    /// Returns `false` (and leaves the state unchanged) for a zero, negative
    /// or non-finite factor.
    pub fn adjust_scale(&mut self, factor: f64) -> bool {
        if !is_valid_factor(factor) {
            tracing::debug!(factor, "Ignoring invalid scale factor");
            return false;
        }
        let t = self.transform;
        self.commit(TransformState::new(t.x, t.y, t.scale * factor));
        true
    }

    /// Replace the preview canvas size.
    ///
    /// A size with a non-positive or non-finite dimension is rejected and
    /// `false` is returned.
    pub fn set_preview_size(&mut self, size: CanvasGeometry) -> bool {
        if !size.is_positive() {
            tracing::debug!(?size, "Ignoring unusable preview size");
            return false;
        }
        self.canvas = Some(size);

        if self.fit_pending && self.image.is_some() {
            self.fit_pending = false;
            let fitted = self.contain_fit();
            self.commit(fitted);
        } else {
            self.commit(self.transform);
        }
        true
    }

    /// Install a newly imported image.
    ///
    /// Re-importing the image that is already loaded (same source) is a
    /// no-op returning `false`. Otherwise the transform is fully replaced by
    /// the contain-fit transform, so no offset from the previous image
    /// survives.
    pub fn load_image(&mut self, image: ImageMetadata) -> bool {
        if image.is_empty() {
            tracing::debug!(source = %image.source, "Ignoring empty image");
            return false;
        }
        if self
            .image
            .as_ref()
            .is_some_and(|current| current.same_source(&image))
        {
            return false;
        }

        tracing::debug!(
            source = %image.source,
            width = image.width,
            height = image.height,
            "Loading image"
        );
        self.image = Some(image);

        let reset = if self.usable_pair().is_some() {
            self.fit_pending = false;
            self.contain_fit()
        } else {
            self.fit_pending = true;
            TransformState::identity()
        };
        self.commit(reset);
        true
    }

    /// Drop the current image and return to the identity transform.
    pub fn clear_image(&mut self) {
        self.image = None;
        self.fit_pending = false;
        self.commit(TransformState::identity());
    }

    /// Re-apply the contain-fit transform for the current image and canvas.
    pub fn reset_view(&mut self) {
        if self.usable_pair().is_some() {
            let fitted = self.contain_fit();
            self.commit(fitted);
        }
    }

    /// Run the reconciler against the current state.
    ///
    /// Mutators already do this; it is exposed for hosts that change inputs
    /// behind the store's back. Returns `true` if a correction was applied.
    pub fn reconcile(&mut self) -> bool {
        let before = self.transform;
        self.commit(before);
        self.transform != before
    }

    /// Register an observer called with every committed state change.
    pub fn subscribe(&mut self, observer: impl FnMut(&TransformState) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.observers.push((id, Box::new(observer)));
        id
    }

    /// Remove an observer. Returns `false` if it was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(sid, _)| *sid != id);
        self.observers.len() != before
    }

    fn usable_pair(&self) -> Option<(&ImageMetadata, CanvasGeometry)> {
        let image = self.image.as_ref().filter(|i| !i.is_empty())?;
        let canvas = self.canvas.filter(|c| c.is_positive())?;
        Some((image, canvas))
    }

    fn contain_fit(&self) -> TransformState {
        TransformState::centered(self.contain_scale().unwrap_or(1.0))
    }

    /// Reconcile `next`, store it and notify observers on change.
    fn commit(&mut self, next: TransformState) {
        let limits = ScaleLimits::from(&self.config);
        let image = self.image.as_ref().map(ImageMetadata::size);
        let next = match reconcile(&next, image, self.canvas, &limits) {
            Some(correction) => {
                tracing::trace!(?next, ?correction, "Reconciled transform");
                next.merged(&correction)
            }
            None => next,
        };

        if next == self.transform {
            return;
        }
        self.transform = next;
        for (_, observer) in self.observers.iter_mut() {
            observer(&next);
        }
    }
}


// ============================================================================
// Property-Based Tests
// ============================================================================

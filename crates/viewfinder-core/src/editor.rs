//! Interactive crop editor: owns the live transform and sequences
//! zoom/rotate/pan intents so the cover invariant holds after every call.
//!
//! The editor is deliberately UI-agnostic. Hosts translate drag/wheel events
//! into the intent methods here; every mutating method returns with the
//! transform already re-clamped, so the state is always safe to render and
//! no caller observes a transiently invalid transform. All operations are
//! pure functions of the previous state and their inputs, which makes an
//! editing session deterministic and replayable.

use serde::{Deserialize, Serialize};

use crate::transform::{clamp_pan_to_cover, fit_to_crop, min_cover_scale, Size, Transform};

/// Multiplicative step applied per wheel tick. Multiplicative rather than
/// additive so zoom speed feels uniform across magnitudes.
pub const DEFAULT_ZOOM_STEP: f64 = 1.05;

/// Upper zoom bound.
pub const DEFAULT_MAX_ZOOM: f64 = 8.0;

/// Tunable editor behavior.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EditorConfig {
    /// Hard upper bound for the scale factor.
    pub max_zoom: f64,
    /// Multiplicative wheel-zoom step (> 1).
    pub zoom_step: f64,
    /// When true, the image may under-cover the viewport and the pan clamp
    /// is disabled.
    pub allow_padding: bool,
    /// Intentional slack, in viewport pixels, left at the edges by the pan
    /// clamp.
    pub padding_px: f64,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            max_zoom: DEFAULT_MAX_ZOOM,
            zoom_step: DEFAULT_ZOOM_STEP,
            allow_padding: false,
            padding_px: 0.0,
        }
    }
}

/// Owns the current [`Transform`] for one editing session of one image
/// inside one crop viewport.
#[derive(Debug, Clone, PartialEq)]
pub struct CropEditor {
    image: Size,
    crop: Size,
    config: EditorConfig,
    transform: Transform,
}

impl CropEditor {
    /// Start an editing session with the image fitted and centered.
    pub fn new(image: Size, crop: Size, config: EditorConfig) -> Self {
        let mut editor = Self {
            image,
            crop,
            config,
            transform: Transform::default(),
        };
        editor.fit();
        editor
    }

    /// The current transform, always valid to render.
    pub fn transform(&self) -> Transform {
        self.transform
    }

    pub fn image_size(&self) -> Size {
        self.image
    }

    pub fn crop_size(&self) -> Size {
        self.crop
    }

    pub fn config(&self) -> EditorConfig {
        self.config
    }

    /// The current lower zoom bound, which moves with rotation.
    pub fn min_scale(&self) -> f64 {
        min_cover_scale(self.image, self.crop, self.transform.rotation)
    }

    /// Reset to the centered minimum-cover placement, keeping the current
    /// rotation.
    pub fn fit(&mut self) {
        self.transform = fit_to_crop(self.image, self.crop, self.transform.rotation);
    }

    /// Replace the crop viewport (e.g. the aspect ratio changed) and re-fit.
    pub fn set_crop(&mut self, crop: Size) {
        self.crop = crop;
        self.fit();
    }

    /// Set the scale, clamped to `[min cover scale, max_zoom]`, keeping the
    /// viewport center fixed on the same image point.
    pub fn set_scale(&mut self, next: f64) {
        let clamped = self.clamp_scale(next);
        self.rescale_about_center(clamped);
        self.clamp_pan();
    }

    /// One wheel tick in: scale × zoom_step.
    pub fn zoom_in(&mut self) {
        self.set_scale(self.transform.scale * self.config.zoom_step);
    }

    /// One wheel tick out: scale ÷ zoom_step.
    pub fn zoom_out(&mut self) {
        self.set_scale(self.transform.scale / self.config.zoom_step);
    }

    /// Translate by a viewport-space delta.
    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        self.transform.tx += dx;
        self.transform.ty += dy;
        self.clamp_pan();
    }

    /// Rotate by `delta` radians about the viewport center.
    ///
    /// Rotation moves the cover lower bound, so the scale is re-clamped
    /// before the pan clamp runs.
    pub fn rotate_by(&mut self, delta: f64) {
        let (cx, cy) = (self.crop.width / 2.0, self.crop.height / 2.0);

        // Rotate the translation about the viewport center so the image
        // pivots there rather than about its own origin.
        let (sin, cos) = delta.sin_cos();
        let (dx, dy) = (self.transform.tx - cx, self.transform.ty - cy);
        self.transform.tx = cx + dx * cos - dy * sin;
        self.transform.ty = cy + dx * sin + dy * cos;
        self.transform.rotation += delta;

        let rescaled = self.clamp_scale(self.transform.scale);
        if rescaled != self.transform.scale {
            self.rescale_about_center(rescaled);
        }
        self.clamp_pan();
    }

    /// Re-run the pan clamp. Called internally after every intent; exposed
    /// for hosts that mutate the viewport externally.
    pub fn clamp_pan(&mut self) {
        clamp_pan_to_cover(
            &mut self.transform,
            self.image,
            self.crop,
            self.config.allow_padding,
            self.config.padding_px,
        );
    }

    fn clamp_scale(&self, next: f64) -> f64 {
        let floor = if self.config.allow_padding {
            crate::transform::MIN_SCALE
        } else {
            self.min_scale()
        };
        next.clamp(floor, self.config.max_zoom.max(floor))
    }

    /// Change scale while keeping the image point under the viewport center
    /// stationary.
    fn rescale_about_center(&mut self, next: f64) {
        let (cx, cy) = (self.crop.width / 2.0, self.crop.height / 2.0);
        let ratio = next / self.transform.scale;
        self.transform.tx = cx + (self.transform.tx - cx) * ratio;
        self.transform.ty = cy + (self.transform.ty - cy) * ratio;
        self.transform.scale = next;
    }
}


// ============================================================================
// Property-Based Tests
// ============================================================================

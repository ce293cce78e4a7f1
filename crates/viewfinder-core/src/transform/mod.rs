//! Affine pan/zoom/rotate geometry for the crop editor.
//!
//! The image is placed in the crop viewport by a single affine transform
//! `M = Translate(tx, ty) · Rotate(rotation) · Scale(scale)`, mapping image
//! space (source pixels, origin top-left) into viewport space
//! (device-independent pixels, origin top-left).
//!
//! # Coordinate System
//!
//! - Rotation angles are in radians, positive = clockwise in screen
//!   coordinates (y grows downward)
//! - The crop viewport has a fixed size; the image moves underneath it
//! - Unless padding is explicitly allowed, the transformed image must cover
//!   the whole viewport at all times (the cover invariant)

mod clamp;
mod cover;
mod matrix;

pub use clamp::clamp_pan_to_cover;
pub use cover::{fit_to_crop, min_cover_scale, rotated_extents};
pub use matrix::{
    apply, inverse, mat_rotate, mat_scale, mat_translate, multiply, DegenerateTransformError,
    Mat2D,
};

use serde::{Deserialize, Serialize};

/// Lower bound for `Transform::scale`, keeping the matrix invertible
/// (`det(M) = scale²` stays well above the 1e-6 determinant cutoff).
pub const MIN_SCALE: f64 = 1e-2;

/// A width/height pair, used both for the source image's natural pixel size
/// and for the crop viewport's device-independent pixel size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Width divided by height.
    pub fn aspect_ratio(&self) -> f64 {
        self.width / self.height
    }
}

/// The live image→viewport mapping: uniform scale, rotation about the image
/// origin, then translation.
///
/// A `Transform` is only meaningful relative to a specific
/// (image [`Size`], crop [`Size`]) pair; see [`fit_to_crop`] and
/// [`clamp_pan_to_cover`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    /// Uniform scale factor, strictly positive (floored at [`MIN_SCALE`]).
    pub scale: f64,
    /// Rotation in radians.
    pub rotation: f64,
    /// Viewport-space translation, x.
    pub tx: f64,
    /// Viewport-space translation, y.
    pub ty: f64,
}

impl Transform {
    pub fn new(scale: f64, rotation: f64, tx: f64, ty: f64) -> Self {
        Self {
            scale: scale.max(MIN_SCALE),
            rotation,
            tx,
            ty,
        }
    }

    /// Build the 2×3 matrix `Translate(tx,ty) · Rotate(rotation) · Scale(scale)`.
    pub fn matrix(&self) -> Mat2D {
        multiply(
            mat_translate(self.tx, self.ty),
            multiply(mat_rotate(self.rotation), mat_scale(self.scale)),
        )
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            scale: 1.0,
            rotation: 0.0,
            tx: 0.0,
            ty: 0.0,
        }
    }
}

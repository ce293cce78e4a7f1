//! Pan clamping: re-establishes the cover invariant after any interactive
//! change (zoom, rotate, or pan).

use super::{apply, Size, Transform};

/// Clamp the pan component of `transform` so the transformed image keeps the
/// crop viewport covered.
///
/// Maps the image's four corners into viewport space, takes their
/// axis-aligned bounding box, and applies the minimal shift that closes any
/// gap along each axis. `padding_px` leaves that much intentional slack at
/// the edges. When `allow_padding` is true this is a no-op.
///
/// The shift is computed in viewport space; since the transform's `(tx, ty)`
/// is the viewport-space translation of `Translate · Rotate · Scale`, it is
/// added to `(tx, ty)` directly.
///
/// If the image's bounding box is smaller than the crop box on an axis
/// (scale below the cover minimum, which the editor prevents), the image is
/// centered on that axis instead.
pub fn clamp_pan_to_cover(
    transform: &mut Transform,
    image: Size,
    crop: Size,
    allow_padding: bool,
    padding_px: f64,
) {
    if allow_padding {
        return;
    }

    let m = transform.matrix();
    let corners = [
        apply(m, 0.0, 0.0),
        apply(m, image.width, 0.0),
        apply(m, image.width, image.height),
        apply(m, 0.0, image.height),
    ];

    let mut min_x = f64::INFINITY;
    let mut min_y = f64::INFINITY;
    let mut max_x = f64::NEG_INFINITY;
    let mut max_y = f64::NEG_INFINITY;
    for (x, y) in corners {
        min_x = min_x.min(x);
        min_y = min_y.min(y);
        max_x = max_x.max(x);
        max_y = max_y.max(y);
    }

    transform.tx += axis_shift(min_x, max_x, crop.width, padding_px);
    transform.ty += axis_shift(min_y, max_y, crop.height, padding_px);
}

/// Minimal shift along one axis that closes the gap between the image's
/// bounding interval `[min, max]` and the viewport interval `[0, extent]`.
fn axis_shift(min: f64, max: f64, extent: f64, padding_px: f64) -> f64 {
    if max - min < extent {
        // Cover is impossible at this scale; center instead.
        return (extent - (min + max)) / 2.0;
    }
    if min > padding_px {
        padding_px - min
    } else if max < extent - padding_px {
        extent - padding_px - max
    } else {
        0.0
    }
}


// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod proptests {
    use super::super::min_cover_scale;
    use super::*;
    use proptest::prelude::*;

    fn size_strategy() -> impl Strategy<Value = Size> {
        (50.0f64..=3000.0, 50.0f64..=3000.0).prop_map(|(w, h)| Size::new(w, h))
    }

    proptest! {
        /// Property: after clamping, the transformed image AABB covers the
        /// crop box, for any starting pan and any scale at or above the
        /// cover minimum.
        #[test]
        fn prop_cover_restored(
            image in size_strategy(),
            crop in size_strategy(),
            theta in -7.0f64..=7.0,
            scale_factor in 1.0f64..=4.0,
            tx in -10_000.0f64..=10_000.0,
            ty in -10_000.0f64..=10_000.0,
        ) {
            let scale = min_cover_scale(image, crop, theta) * scale_factor;
            let mut t = Transform::new(scale, theta, tx, ty);

            clamp_pan_to_cover(&mut t, image, crop, false, 0.0);

            let m = t.matrix();
            let corners = [
                apply(m, 0.0, 0.0),
                apply(m, image.width, 0.0),
                apply(m, image.width, image.height),
                apply(m, 0.0, image.height),
            ];
            let min_x = corners.iter().map(|c| c.0).fold(f64::INFINITY, f64::min);
            let min_y = corners.iter().map(|c| c.1).fold(f64::INFINITY, f64::min);
            let max_x = corners.iter().map(|c| c.0).fold(f64::NEG_INFINITY, f64::max);
            let max_y = corners.iter().map(|c| c.1).fold(f64::NEG_INFINITY, f64::max);

            // Tolerance scales with coordinate magnitude.
            let eps = 1e-6 * (1.0 + tx.abs().max(ty.abs()));
            prop_assert!(min_x <= eps, "min_x {min_x}");
            prop_assert!(min_y <= eps, "min_y {min_y}");
            prop_assert!(max_x >= crop.width - eps, "max_x {max_x}");
            prop_assert!(max_y >= crop.height - eps, "max_y {max_y}");
        }

        /// Property: clamping an already-valid transform is the identity.
        #[test]
        fn prop_clamp_idempotent(
            image in size_strategy(),
            crop in size_strategy(),
            theta in -7.0f64..=7.0,
            tx in -10_000.0f64..=10_000.0,
            ty in -10_000.0f64..=10_000.0,
        ) {
            let scale = min_cover_scale(image, crop, theta) * 1.5;
            let mut t = Transform::new(scale, theta, tx, ty);

            clamp_pan_to_cover(&mut t, image, crop, false, 0.0);
            let once = t;
            clamp_pan_to_cover(&mut t, image, crop, false, 0.0);

            prop_assert!((t.tx - once.tx).abs() < 1e-6);
            prop_assert!((t.ty - once.ty).abs() < 1e-6);
        }
    }
}

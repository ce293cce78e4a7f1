//! Rotated extents, minimum cover scale, and the initial centered fit.
//!
//! Cover fit scales the image so its rotated bounding box is at least as
//! large as the crop box on both axes (overflow allowed). Contain fit, the
//! opposite, is not used here: an under-covering image would expose the
//! viewport background, which the editor forbids unless padding is on.

use super::{apply, mat_rotate, Size, Transform};

/// Axis-aligned bounding box size of `image` after rotation by `theta`.
///
/// For a w×h rectangle rotated by θ:
/// `width' = w·|cosθ| + h·|sinθ|`, `height' = w·|sinθ| + h·|cosθ|`.
pub fn rotated_extents(image: Size, theta: f64) -> Size {
    let cos = theta.cos().abs();
    let sin = theta.sin().abs();
    Size::new(
        image.width * cos + image.height * sin,
        image.width * sin + image.height * cos,
    )
}

/// Smallest scale at which the rotated image's bounding box covers the crop
/// box on both axes.
///
/// This is the hard lower bound for zoom whenever padding is disallowed.
pub fn min_cover_scale(image: Size, crop: Size, theta: f64) -> f64 {
    let extents = rotated_extents(image, theta);
    (crop.width / extents.width).max(crop.height / extents.height)
}

/// Initial placement: minimum cover scale, image center on the crop center.
///
/// Used whenever an image is (re)loaded or the crop box changes aspect.
/// Idempotent: the result depends only on the three arguments.
pub fn fit_to_crop(image: Size, crop: Size, theta: f64) -> Transform {
    let scale = min_cover_scale(image, crop, theta).max(super::MIN_SCALE);

    // Where the scaled+rotated image center would land with zero translation,
    // then translate so it lands on the crop center instead.
    let (px, py) = (image.width / 2.0, image.height / 2.0);
    let (rx, ry) = apply(mat_rotate(theta), px, py);

    Transform {
        scale,
        rotation: theta,
        tx: crop.width / 2.0 - scale * rx,
        ty: crop.height / 2.0 - scale * ry,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};

    #[test]
    fn test_extents_no_rotation() {
        let e = rotated_extents(Size::new(100.0, 50.0), 0.0);
        assert!((e.width - 100.0).abs() < 1e-9);
        assert!((e.height - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_extents_quarter_turn_swaps() {
        let e = rotated_extents(Size::new(100.0, 50.0), FRAC_PI_2);
        assert!((e.width - 50.0).abs() < 1e-9);
        assert!((e.height - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_extents_45_degrees_square() {
        // Diagonal of a 100×100 square is ~141.42.
        let e = rotated_extents(Size::new(100.0, 100.0), FRAC_PI_4);
        assert!((e.width - 141.42135).abs() < 1e-3, "width {}", e.width);
        assert!((e.height - 141.42135).abs() < 1e-3);
    }

    #[test]
    fn test_extents_sign_symmetric() {
        let a = rotated_extents(Size::new(100.0, 80.0), 0.6);
        let b = rotated_extents(Size::new(100.0, 80.0), -0.6);
        assert!((a.width - b.width).abs() < 1e-12);
        assert!((a.height - b.height).abs() < 1e-12);
    }

    #[test]
    fn test_min_cover_scale_axis_aligned() {
        // 1000×500 into 400×400: the short (height) axis dominates.
        let s = min_cover_scale(Size::new(1000.0, 500.0), Size::new(400.0, 400.0), 0.0);
        assert!((s - 0.8).abs() < 1e-9, "scale {s}");
    }

    #[test]
    fn test_min_cover_scale_rotated_45() {
        // 1000×500 at 45°: extents are (1000+500)·√2/2 ≈ 1060.66 on both
        // axes, so covering a 400×400 box needs ≈ 0.3771.
        let s = min_cover_scale(Size::new(1000.0, 500.0), Size::new(400.0, 400.0), FRAC_PI_4);
        assert!((s - 0.3772).abs() < 1e-3, "scale {s}");
    }

    #[test]
    fn test_min_cover_is_tight() {
        // At the minimum scale, the bounding box must cover the crop on both
        // axes and be exactly tight on at least one.
        let image = Size::new(777.0, 333.0);
        let crop = Size::new(320.0, 240.0);
        for theta in [0.0, 0.37, FRAC_PI_4, 1.2, FRAC_PI_2] {
            let s = min_cover_scale(image, crop, theta);
            let e = rotated_extents(image, theta);
            let (w, h) = (e.width * s, e.height * s);

            assert!(w >= crop.width - 1e-9 && h >= crop.height - 1e-9);
            let tight_w = (w - crop.width).abs() < 1e-9;
            let tight_h = (h - crop.height).abs() < 1e-9;
            assert!(tight_w || tight_h, "neither axis tight at theta {theta}");
        }
    }

    #[test]
    fn test_fit_centers_image() {
        let image = Size::new(1000.0, 500.0);
        let crop = Size::new(400.0, 400.0);
        for theta in [0.0, 0.25, FRAC_PI_4, -1.0] {
            let t = fit_to_crop(image, crop, theta);
            let (cx, cy) = apply(t.matrix(), image.width / 2.0, image.height / 2.0);
            assert!((cx - 200.0).abs() < 1e-9, "cx {cx} at theta {theta}");
            assert!((cy - 200.0).abs() < 1e-9, "cy {cy} at theta {theta}");
        }
    }

    #[test]
    fn test_fit_uses_min_cover_scale() {
        let image = Size::new(640.0, 480.0);
        let crop = Size::new(300.0, 200.0);
        let t = fit_to_crop(image, crop, 0.4);
        assert!((t.scale - min_cover_scale(image, crop, 0.4)).abs() < 1e-12);
    }

    #[test]
    fn test_fit_idempotent() {
        let image = Size::new(1024.0, 768.0);
        let crop = Size::new(512.0, 512.0);
        let first = fit_to_crop(image, crop, 0.8);
        let second = fit_to_crop(image, crop, 0.8);
        assert_eq!(first, second);
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

//! 2×3 affine matrix algebra.
//!
//! Matrices follow the canvas convention: a point `(x, y)` maps to
//! `(a·x + c·y + e, b·x + d·y + f)`. Composition, inversion, and point
//! application are closed-form; nothing here allocates.

use thiserror::Error;

/// Determinants closer to zero than this cannot be inverted reliably.
const DET_EPSILON: f64 = 1e-6;

/// Raised when inverting a matrix whose determinant is numerically zero,
/// e.g. after the scale factor has collapsed.
#[derive(Debug, Error, PartialEq)]
#[error("degenerate transform: determinant {det} is within 1e-6 of zero")]
pub struct DegenerateTransformError {
    /// The offending determinant.
    pub det: f64,
}

/// Coefficients `[a, b, c, d, e, f]` of a 2×3 affine matrix.
///
/// Pure value type; equality and identity are exactly its components.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mat2D {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub e: f64,
    pub f: f64,
}

impl Mat2D {
    pub const IDENTITY: Mat2D = Mat2D {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 1.0,
        e: 0.0,
        f: 0.0,
    };

    pub fn new(a: f64, b: f64, c: f64, d: f64, e: f64, f: f64) -> Self {
        Self { a, b, c, d, e, f }
    }

    /// Determinant of the linear (2×2) part.
    pub fn det(&self) -> f64 {
        self.a * self.d - self.b * self.c
    }
}

/// Uniform scale matrix.
pub fn mat_scale(s: f64) -> Mat2D {
    Mat2D::new(s, 0.0, 0.0, s, 0.0, 0.0)
}

/// Rotation matrix for `theta` radians.
pub fn mat_rotate(theta: f64) -> Mat2D {
    let (sin, cos) = theta.sin_cos();
    Mat2D::new(cos, sin, -sin, cos, 0.0, 0.0)
}

/// Translation matrix.
pub fn mat_translate(tx: f64, ty: f64) -> Mat2D {
    Mat2D::new(1.0, 0.0, 0.0, 1.0, tx, ty)
}

/// Compose two matrices: the result applies `rhs` first, then `lhs`.
///
/// Satisfies `apply(multiply(a, b), p) == apply(a, apply(b, p))`.
pub fn multiply(lhs: Mat2D, rhs: Mat2D) -> Mat2D {
    Mat2D::new(
        lhs.a * rhs.a + lhs.c * rhs.b,
        lhs.b * rhs.a + lhs.d * rhs.b,
        lhs.a * rhs.c + lhs.c * rhs.d,
        lhs.b * rhs.c + lhs.d * rhs.d,
        lhs.a * rhs.e + lhs.c * rhs.f + lhs.e,
        lhs.b * rhs.e + lhs.d * rhs.f + lhs.f,
    )
}

/// Map a point through the matrix.
#[inline]
pub fn apply(m: Mat2D, x: f64, y: f64) -> (f64, f64) {
    (m.a * x + m.c * y + m.e, m.b * x + m.d * y + m.f)
}

/// Invert the matrix via the 2×2 adjugate.
///
/// # Errors
///
/// Returns [`DegenerateTransformError`] when the determinant is within
/// `1e-6` of zero. All other finite matrices invert exactly.
pub fn inverse(m: Mat2D) -> Result<Mat2D, DegenerateTransformError> {
    let det = m.det();
    if det.abs() < DET_EPSILON {
        return Err(DegenerateTransformError { det });
    }

    Ok(Mat2D::new(
        m.d / det,
        -m.b / det,
        -m.c / det,
        m.a / det,
        (m.c * m.f - m.d * m.e) / det,
        (m.b * m.e - m.a * m.f) / det,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::{FRAC_PI_2, FRAC_PI_6, PI};

    fn assert_close(actual: (f64, f64), expected: (f64, f64)) {
        assert!(
            (actual.0 - expected.0).abs() < 1e-6 && (actual.1 - expected.1).abs() < 1e-6,
            "got {actual:?}, expected {expected:?}"
        );
    }

    #[test]
    fn test_identity_apply() {
        assert_close(apply(Mat2D::IDENTITY, 7.0, -2.5), (7.0, -2.5));
    }

    #[test]
    fn test_scale_apply() {
        assert_close(apply(mat_scale(3.0), 2.0, -1.0), (6.0, -3.0));
    }

    #[test]
    fn test_rotate_quarter_turn() {
        // Quarter turn sends the +x axis onto the +y axis (screen coordinates).
        assert_close(apply(mat_rotate(FRAC_PI_2), 1.0, 0.0), (0.0, 1.0));
        assert_close(apply(mat_rotate(FRAC_PI_2), 0.0, 1.0), (-1.0, 0.0));
    }

    #[test]
    fn test_translate_apply() {
        assert_close(apply(mat_translate(5.0, -3.0), 1.0, 1.0), (6.0, -2.0));
    }

    #[test]
    fn test_multiply_matches_sequential_apply() {
        let a = multiply(mat_rotate(0.7), mat_translate(3.0, 4.0));
        let b = multiply(mat_scale(2.5), mat_rotate(-1.2));
        let p = (1.5, -8.0);

        let via_composed = apply(multiply(a, b), p.0, p.1);
        let inner = apply(b, p.0, p.1);
        let via_sequential = apply(a, inner.0, inner.1);
        assert_close(via_composed, via_sequential);
    }

    #[test]
    fn test_multiply_associative() {
        let a = mat_rotate(0.3);
        let b = mat_translate(10.0, -2.0);
        let c = mat_scale(0.5);

        let left = multiply(multiply(a, b), c);
        let right = multiply(a, multiply(b, c));
        let p = apply(left, 11.0, 13.0);
        let q = apply(right, 11.0, 13.0);
        assert_close(p, q);
    }

    #[test]
    fn test_inverse_round_trip() {
        let m = multiply(
            mat_translate(123.4, -56.7),
            multiply(mat_rotate(FRAC_PI_6), mat_scale(2.5)),
        );
        let inv = inverse(m).unwrap();

        let (fx, fy) = apply(m, 40.0, 25.0);
        assert_close(apply(inv, fx, fy), (40.0, 25.0));
    }

    #[test]
    fn test_inverse_of_rotation_is_negative_rotation() {
        let inv = inverse(mat_rotate(PI / 5.0)).unwrap();
        let direct = mat_rotate(-PI / 5.0);
        assert_close(apply(inv, 3.0, 4.0), apply(direct, 3.0, 4.0));
    }

    #[test]
    fn test_degenerate_inverse_rejected() {
        let err = inverse(mat_scale(0.0)).unwrap_err();
        assert_eq!(err.det, 0.0);

        // Scale 1e-4 gives det 1e-8, below the cutoff.
        assert!(inverse(mat_scale(1e-4)).is_err());
    }

    #[test]
    fn test_near_threshold_inverse_accepted() {
        // det = 4e-6, just above the cutoff.
        assert!(inverse(mat_scale(2e-3)).is_ok());
    }

    #[test]
    fn test_det() {
        assert!((mat_scale(3.0).det() - 9.0).abs() < 1e-12);
        assert!((mat_rotate(1.1).det() - 1.0).abs() < 1e-12);
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

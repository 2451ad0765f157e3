//! 2D vector operations.

use nalgebra::{Point2, Vector2};

/// Squared norms below this value are treated as zero.
const ZERO_NORM_SQUARED: f64 = 1e-300;

/// `a + b`.
#[inline]
pub fn add(a: &Vector2<f64>, b: &Vector2<f64>) -> Vector2<f64> {
    a + b
}

/// `a - b`.
#[inline]
pub fn sub(a: &Vector2<f64>, b: &Vector2<f64>) -> Vector2<f64> {
    a - b
}

/// `s * v`.
#[inline]
pub fn scale(v: &Vector2<f64>, s: f64) -> Vector2<f64> {
    v * s
}

/// Dot product.
#[inline]
pub fn dot(a: &Vector2<f64>, b: &Vector2<f64>) -> f64 {
    a.dot(b)
}

/// The z-component of the 3D cross product, positive if `b` lies
/// counter-clockwise of `a`.
#[inline]
pub fn cross(a: &Vector2<f64>, b: &Vector2<f64>) -> f64 {
    a.perp(b)
}

/// Unit vector along `v`, or the zero vector if `v` has no length.
pub fn normalize_or_zero(v: &Vector2<f64>) -> Vector2<f64> {
    v.try_normalize(0.0).unwrap_or_else(Vector2::zeros)
}

/// Unsigned angle between `a` and `b` in `[0, π]`, or 0 if either is zero.
pub fn angle_between(a: &Vector2<f64>, b: &Vector2<f64>) -> f64 {
    if a.norm_squared() <= ZERO_NORM_SQUARED || b.norm_squared() <= ZERO_NORM_SQUARED {
        return 0.0;
    }
    cross(a, b).abs().atan2(dot(a, b))
}

/// Complex product of `a` and `b`, reading each vector as `x + iy`.
#[inline]
pub fn complex_mul(a: &Vector2<f64>, b: &Vector2<f64>) -> Vector2<f64> {
    Vector2::new(a.x * b.x - a.y * b.y, a.x * b.y + a.y * b.x)
}

/// Complex quotient `a / b`, or zero if `b` is zero.
pub fn complex_div(a: &Vector2<f64>, b: &Vector2<f64>) -> Vector2<f64> {
    let denom = b.norm_squared();
    if denom <= ZERO_NORM_SQUARED {
        return Vector2::zeros();
    }
    Vector2::new(a.x * b.x + a.y * b.y, a.y * b.x - a.x * b.y) / denom
}

/// Unit vector `(cos θ, sin θ)`, i.e. `e^{iθ}`.
#[inline]
pub fn polar(angle: f64) -> Vector2<f64> {
    let (sin, cos) = angle.sin_cos();
    Vector2::new(cos, sin)
}

/// Signed area of a closed polygon (shoelace formula).
///
/// Positive for counter-clockwise node order.
pub fn signed_area(points: &[Point2<f64>]) -> f64 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }
    let twice_area: f64 = (0..n)
        .map(|k| cross(&points[k].coords, &points[(k + 1) % n].coords))
        .sum();
    0.5 * twice_area
}

/// Arithmetic mean of a set of points, or the origin for an empty set.
pub fn centroid(points: &[Point2<f64>]) -> Point2<f64> {
    if points.is_empty() {
        return Point2::origin();
    }
    let sum: Vector2<f64> = points.iter().map(|p| p.coords).sum();
    Point2::from(sum / points.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::{FRAC_PI_2, PI};

    #[test]
    fn test_basic_arithmetic() {
        let a = Vector2::new(1.0, 2.0);
        let b = Vector2::new(3.0, -1.0);
        assert_eq!(add(&a, &b), Vector2::new(4.0, 1.0));
        assert_eq!(sub(&a, &b), Vector2::new(-2.0, 3.0));
        assert_eq!(scale(&a, 2.0), Vector2::new(2.0, 4.0));
        assert_eq!(dot(&a, &b), 1.0);
        assert_eq!(cross(&a, &b), -7.0);
        assert_eq!(cross(&b, &a), 7.0);
    }

    #[test]
    fn test_zero_vector_sentinels() {
        assert_eq!(normalize_or_zero(&Vector2::zeros()), Vector2::zeros());
        assert_eq!(angle_between(&Vector2::zeros(), &Vector2::new(1.0, 0.0)), 0.0);
        assert_eq!(angle_between(&Vector2::new(0.0, 2.0), &Vector2::zeros()), 0.0);

        let n = normalize_or_zero(&Vector2::new(3.0, 4.0));
        assert_relative_eq!(n, Vector2::new(0.6, 0.8), epsilon = 1e-15);
        assert!(normalize_or_zero(&Vector2::new(1e-200, 0.0)).iter().all(|c| c.is_finite()));
    }

    #[test]
    fn test_angle_between() {
        let x = Vector2::new(1.0, 0.0);
        assert_relative_eq!(angle_between(&x, &Vector2::new(0.0, 2.0)), FRAC_PI_2);
        assert_relative_eq!(angle_between(&x, &Vector2::new(0.0, -2.0)), FRAC_PI_2);
        assert_relative_eq!(angle_between(&x, &Vector2::new(-3.0, 0.0)), PI);
        assert_eq!(angle_between(&x, &x), 0.0);
    }

    #[test]
    fn test_complex_helpers() {
        let i = Vector2::new(0.0, 1.0);
        assert_eq!(complex_mul(&i, &i), Vector2::new(-1.0, 0.0));

        let a = Vector2::new(2.0, 3.0);
        let b = Vector2::new(-1.0, 0.5);
        let q = complex_div(&complex_mul(&a, &b), &b);
        assert_relative_eq!(q, a, epsilon = 1e-14);

        assert_eq!(complex_div(&a, &Vector2::zeros()), Vector2::zeros());
        assert_relative_eq!(polar(FRAC_PI_2), i, epsilon = 1e-15);
    }

    #[test]
    fn test_signed_area_orientation() {
        let ccw = [
            Point2::new(0.0, 0.0),
            Point2::new(2.0, 0.0),
            Point2::new(2.0, 1.0),
            Point2::new(0.0, 1.0),
        ];
        assert_relative_eq!(signed_area(&ccw), 2.0);

        let mut cw = ccw;
        cw.reverse();
        assert_relative_eq!(signed_area(&cw), -2.0);

        assert_eq!(signed_area(&ccw[..2]), 0.0);
    }

    #[test]
    fn test_centroid() {
        let pts = [Point2::new(0.0, 0.0), Point2::new(2.0, 0.0), Point2::new(1.0, 3.0)];
        assert_relative_eq!(centroid(&pts), Point2::new(1.0, 1.0));
        assert_eq!(centroid(&[]), Point2::origin());
    }
}

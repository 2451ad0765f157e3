//! Geometric element transformation.
//!
//! Moves the nodes of a single polygon towards the regular polygon that best
//! matches it. The target shares the polygon's centroid and perimeter and is
//! rotated to align with the polygon's counter-clockwise regular component
//! `r` (see [`quality`](crate::quality)):
//!
//! ```text
//! y_k = c + P / (n |r|) · r / (ω - 1) · ω^k
//! z'_k = z_k + λ (y_k - z_k)
//! ```
//!
//! Every edge vector is rotated and scaled towards the edge of the target,
//! so repeated application with `0 < λ ≤ 1` converges to a regular polygon.
//! Regular counter-clockwise polygons are fixed points.

use std::f64::consts::TAU;

use nalgebra::{Point2, Vector2};

use crate::math::{centroid, complex_div, complex_mul, polar};
use crate::quality::RegularFit;

/// Relative size of `|r|` against the perimeter below which no target exists.
const NEGLIGIBLE_REGULAR_COMPONENT: f64 = 1e-12;

/// The regular polygon the transformation moves `points` towards.
///
/// Returns `None` if the polygon has no counter-clockwise regular component
/// to align with, for example when all nodes coincide.
pub fn regular_target(points: &[Point2<f64>]) -> Option<Vec<Point2<f64>>> {
    let n = points.len();
    if n < 3 {
        return None;
    }

    let fit = RegularFit::of(points);
    let r_norm = fit.ccw.norm();
    if fit.perimeter <= 0.0 || r_norm < NEGLIGIBLE_REGULAR_COMPONENT * fit.perimeter {
        return None;
    }

    let omega = polar(TAU / n as f64);
    let omega_minus_one = Vector2::new(omega.x - 1.0, omega.y);
    let radius_vector = complex_div(&fit.ccw, &omega_minus_one) * (fit.perimeter / (n as f64 * r_norm));
    let center = centroid(points);

    Some(
        (0..n)
            .map(|k| center + complex_mul(&radius_vector, &polar(TAU * k as f64 / n as f64)))
            .collect(),
    )
}

/// Transform a polygon with relaxation factor `relaxation`.
///
/// Returns the new node positions in the same order. A polygon without a
/// regular target is returned unchanged.
pub fn transform_polygon(points: &[Point2<f64>], relaxation: f64) -> Vec<Point2<f64>> {
    match regular_target(points) {
        Some(target) => points
            .iter()
            .zip(&target)
            .map(|(z, y)| z + (y - z) * relaxation)
            .collect(),
        None => points.to_vec(),
    }
}

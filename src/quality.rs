//! Polygon and mesh quality.
//!
//! The quality of an n-gon compares its edge vectors with those of a regular
//! n-gon. Reading each edge vector `e_k = z_{k+1} - z_k` as a complex number
//! and writing `ω = e^{2πi/n}`:
//!
//! ```text
//! r = 1/n Σ e_k ω^{-k}     (counter-clockwise regular component)
//! s = 1/n Σ e_k ω^{k}      (clockwise regular component)
//! E = 1/n Σ |e_k|²
//! q = (|r|² - |s|²) / E
//! ```
//!
//! `q` lies in `[-1, 1]`. It is exactly 1 for a regular counter-clockwise
//! polygon, -1 for a regular clockwise one and 0 when all nodes coincide. For
//! triangles it equals the mean ratio, and for triangles and quadrilaterals
//! its sign is the sign of the signed area, so inverted elements score below
//! zero.
//!
//! # Example
//!
//! ```
//! use polysmooth::quality::polygon_quality;
//! use nalgebra::Point2;
//!
//! let square = [
//!     Point2::new(0.0, 0.0),
//!     Point2::new(1.0, 0.0),
//!     Point2::new(1.0, 1.0),
//!     Point2::new(0.0, 1.0),
//! ];
//! assert!((polygon_quality(&square) - 1.0).abs() < 1e-12);
//! ```

use std::f64::consts::TAU;

use nalgebra::{Point2, Vector2};
use rayon::prelude::*;

use crate::math::{complex_mul, polar};
use crate::mesh::{MeshIndex, PolygonId, PolygonalMesh};

/// Decomposition of a polygon's edge sequence against the regular n-gon.
#[derive(Debug, Clone, Copy)]
pub(crate) struct RegularFit {
    /// Counter-clockwise regular component `r`.
    pub ccw: Vector2<f64>,
    /// Clockwise regular component `s`.
    pub cw: Vector2<f64>,
    /// Mean squared edge length `E`.
    pub edge_energy: f64,
    /// Sum of edge lengths.
    pub perimeter: f64,
}

impl RegularFit {
    pub(crate) fn of(points: &[Point2<f64>]) -> Self {
        let n = points.len();
        let mut ccw = Vector2::zeros();
        let mut cw = Vector2::zeros();
        let mut energy = 0.0;
        let mut perimeter = 0.0;

        for k in 0..n {
            let edge = points[(k + 1) % n] - points[k];
            let angle = TAU * k as f64 / n as f64;
            ccw += complex_mul(&edge, &polar(-angle));
            cw += complex_mul(&edge, &polar(angle));
            let len_sq = edge.norm_squared();
            energy += len_sq;
            perimeter += len_sq.sqrt();
        }

        let inv_n = 1.0 / n.max(1) as f64;
        Self {
            ccw: ccw * inv_n,
            cw: cw * inv_n,
            edge_energy: energy * inv_n,
            perimeter,
        }
    }

    pub(crate) fn quality(&self) -> f64 {
        if self.edge_energy <= f64::MIN_POSITIVE {
            return 0.0;
        }
        let q = (self.ccw.norm_squared() - self.cw.norm_squared()) / self.edge_energy;
        q.clamp(-1.0, 1.0)
    }
}

/// Quality of a single polygon given by its node positions in winding order.
///
/// Returns a value in `[-1, 1]`; see the [module documentation](self).
/// Polygons with fewer than three nodes have quality 0.
pub fn polygon_quality(points: &[Point2<f64>]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }
    RegularFit::of(points).quality()
}

/// Quality snapshot of one mesh state.
///
/// Holds the quality of every polygon together with the aggregates used to
/// steer and report smoothing. Values are immutable; evaluate again after the
/// mesh changes.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshQuality {
    polygon_qualities: Vec<f64>,
    q_min: f64,
    q_min_star: Option<f64>,
    q_mean: f64,
    invalid_elements: Option<usize>,
}

impl MeshQuality {
    /// Evaluate the quality of every polygon of `mesh` on the current thread.
    pub fn new<I: MeshIndex>(mesh: &PolygonalMesh<I>) -> Self {
        Self::evaluate(mesh, false)
    }

    /// Evaluate the quality of every polygon of `mesh`.
    ///
    /// With `parallel` the per-polygon values are computed with rayon; the
    /// result is bit-identical to the serial evaluation.
    pub fn evaluate<I: MeshIndex>(mesh: &PolygonalMesh<I>, parallel: bool) -> Self {
        let qualities: Vec<f64> = if parallel {
            (0..mesh.num_polygons())
                .into_par_iter()
                .map(|i| polygon_quality(&mesh.polygon_positions(PolygonId::new(i))))
                .collect()
        } else {
            mesh.polygon_ids()
                .map(|p| polygon_quality(&mesh.polygon_positions(p)))
                .collect()
        };

        let fixed: Vec<bool> = mesh.polygon_ids().map(|p| mesh.is_polygon_fixed(p)).collect();
        Self::from_polygon_qualities(qualities, &fixed)
    }

    /// Aggregate precomputed per-polygon qualities.
    ///
    /// `fully_fixed[i]` tells whether every node of polygon `i` is fixed; those
    /// polygons cannot be improved and are excluded from `q_min*`.
    pub(crate) fn from_polygon_qualities(qualities: Vec<f64>, fully_fixed: &[bool]) -> Self {
        debug_assert_eq!(qualities.len(), fully_fixed.len());

        let q_min = qualities.iter().copied().fold(f64::INFINITY, f64::min);
        let q_mean = if qualities.is_empty() {
            0.0
        } else {
            qualities.iter().sum::<f64>() / qualities.len() as f64
        };

        let has_fixed_polygon = fully_fixed.iter().any(|&f| f);
        let q_min_star = if has_fixed_polygon {
            qualities
                .iter()
                .zip(fully_fixed)
                .filter(|(_, &f)| !f)
                .map(|(&q, _)| q)
                .reduce(f64::min)
        } else {
            None
        };

        let invalid_elements = if q_min < 0.0 {
            Some(qualities.iter().filter(|&&q| q < 0.0).count())
        } else {
            None
        };

        Self {
            polygon_qualities: qualities,
            q_min,
            q_min_star,
            q_mean,
            invalid_elements,
        }
    }

    /// Minimal polygon quality.
    #[inline]
    pub fn q_min(&self) -> f64 {
        self.q_min
    }

    /// Minimal quality over polygons with at least one non-fixed node.
    ///
    /// `None` when no polygon is fully fixed (then it would equal `q_min`) or
    /// when no polygon can move at all.
    #[inline]
    pub fn q_min_star(&self) -> Option<f64> {
        self.q_min_star
    }

    /// Arithmetic mean of all polygon qualities.
    #[inline]
    pub fn q_mean(&self) -> f64 {
        self.q_mean
    }

    /// Number of polygons with negative quality, present only if `q_min < 0`.
    #[inline]
    pub fn invalid_elements(&self) -> Option<usize> {
        self.invalid_elements
    }

    /// Whether no polygon has negative quality.
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.q_min >= 0.0
    }

    /// The minimum that smoothing can influence: `q_min*` if present, else `q_min`.
    #[inline]
    pub fn smoothable_min(&self) -> f64 {
        self.q_min_star.unwrap_or(self.q_min)
    }

    /// Per-polygon qualities in polygon order.
    #[inline]
    pub fn polygon_qualities(&self) -> &[f64] {
        &self.polygon_qualities
    }

    /// Quality of a single polygon.
    #[inline]
    pub fn polygon_quality<I: MeshIndex>(&self, id: PolygonId<I>) -> f64 {
        self.polygon_qualities[id.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::build_from_polygons;
    use approx::assert_relative_eq;

    fn regular_polygon(n: usize, radius: f64, phase: f64) -> Vec<Point2<f64>> {
        (0..n)
            .map(|k| {
                let a = phase + TAU * k as f64 / n as f64;
                Point2::new(radius * a.cos() + 3.0, radius * a.sin() - 1.0)
            })
            .collect()
    }

    #[test]
    fn test_regular_polygons_have_quality_one() {
        for n in 3..=12 {
            let q = polygon_quality(&regular_polygon(n, 2.5, 0.3));
            assert_relative_eq!(q, 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_quality_independent_of_start_node() {
        let mut pts = vec![
            Point2::new(0.0, 0.0),
            Point2::new(3.0, 0.2),
            Point2::new(2.5, 1.4),
            Point2::new(0.4, 1.0),
            Point2::new(-0.3, 0.6),
        ];
        let q = polygon_quality(&pts);
        pts.rotate_left(2);
        assert_relative_eq!(polygon_quality(&pts), q, epsilon = 1e-12);
    }

    #[test]
    fn test_clockwise_regular_polygon_is_minus_one() {
        let mut pts = regular_polygon(6, 1.0, 0.0);
        pts.reverse();
        assert_relative_eq!(polygon_quality(&pts), -1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_rectangle_quality() {
        let rect = [
            Point2::new(0.0, 0.0),
            Point2::new(2.0, 0.0),
            Point2::new(2.0, 1.0),
            Point2::new(0.0, 1.0),
        ];
        assert_relative_eq!(polygon_quality(&rect), 0.8, epsilon = 1e-12);
    }

    #[test]
    fn test_triangle_quality_matches_mean_ratio() {
        let tri = [
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(0.2, 0.3),
        ];
        let area = crate::math::signed_area(&tri);
        let sum_sq: f64 = (0..3).map(|k| (tri[(k + 1) % 3] - tri[k]).norm_squared()).sum();
        let mean_ratio = 4.0 * 3f64.sqrt() * area / sum_sq;
        assert_relative_eq!(polygon_quality(&tri), mean_ratio, epsilon = 1e-12);
    }

    #[test]
    fn test_degenerate_polygons() {
        let bowtie = [
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 1.0),
            Point2::new(1.0, 0.0),
            Point2::new(0.0, 1.0),
        ];
        assert_relative_eq!(polygon_quality(&bowtie), 0.0, epsilon = 1e-12);

        let collapsed = [Point2::new(1.0, 1.0); 4];
        assert_eq!(polygon_quality(&collapsed), 0.0);

        assert_eq!(polygon_quality(&[Point2::origin(), Point2::new(1.0, 0.0)]), 0.0);
    }

    #[test]
    fn test_folded_quad_is_negative() {
        let folded = [
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(-0.5, -0.5),
            Point2::new(0.0, 1.0),
        ];
        assert!(crate::math::signed_area(&folded) < 0.0);
        assert!(polygon_quality(&folded) < 0.0);
    }

    /// Unit squares in a row, nodes 0..=n on the bottom and n+1..=2n+1 on top.
    fn strip(n: usize) -> (Vec<Point2<f64>>, Vec<Vec<usize>>) {
        let mut positions: Vec<Point2<f64>> = (0..=n).map(|i| Point2::new(i as f64, 0.0)).collect();
        positions.extend((0..=n).map(|i| Point2::new(i as f64, 1.0)));
        let polygons = (0..n).map(|i| vec![i, i + 1, n + 2 + i, n + 1 + i]).collect();
        (positions, polygons)
    }

    #[test]
    fn test_aggregates() {
        let (mut positions, polygons) = strip(3);
        positions[6] = Point2::new(2.0, 2.0); // stretches polygons 1 and 2
        let mesh: PolygonalMesh = build_from_polygons(&positions, &polygons, &[]).unwrap();
        let quality = MeshQuality::new(&mesh);

        let values = quality.polygon_qualities();
        assert_eq!(values.len(), 3);
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let mean = values.iter().sum::<f64>() / 3.0;
        assert_eq!(quality.q_min(), min);
        assert_eq!(quality.q_mean(), mean);
        assert_relative_eq!(values[0], 1.0, epsilon = 1e-12);
        assert!(quality.q_min() < 1.0);
        assert!(quality.q_min_star().is_none());
        assert!(quality.invalid_elements().is_none());
        assert!(quality.is_valid());
    }

    #[test]
    fn test_evaluation_is_deterministic() {
        let (mut positions, polygons) = strip(4);
        positions[7] = Point2::new(1.3, 1.2);
        positions[2] = Point2::new(2.1, -0.3);
        let mesh: PolygonalMesh = build_from_polygons(&positions, &polygons, &[0, 5]).unwrap();

        let a = MeshQuality::new(&mesh);
        let b = MeshQuality::new(&mesh);
        let c = MeshQuality::evaluate(&mesh, true);
        assert_eq!(a, b);
        assert_eq!(a, c);
        for (x, y) in a.polygon_qualities().iter().zip(c.polygon_qualities()) {
            assert_eq!(x.to_bits(), y.to_bits());
        }
    }

    #[test]
    fn test_q_min_star_excludes_fully_fixed_polygons() {
        let (mut positions, polygons) = strip(2);
        // Distort the first square, then fix all of its nodes.
        positions[0] = Point2::new(-0.5, 0.0);
        let mesh: PolygonalMesh = build_from_polygons(&positions, &polygons, &[0, 1, 3, 4]).unwrap();
        let quality = MeshQuality::new(&mesh);

        assert!(quality.q_min() < 1.0);
        assert_relative_eq!(quality.q_min_star().unwrap(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(quality.smoothable_min(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_one_inverted_polygon_among_regular_ones() {
        let (positions, mut polygons) = strip(3);
        // Reverse the winding of the middle square: an inverted element.
        polygons[1].reverse();
        let mesh: PolygonalMesh = build_from_polygons(&positions, &polygons, &[]).unwrap();
        let quality = MeshQuality::new(&mesh);

        assert!(quality.q_min() < 0.0);
        assert_eq!(quality.invalid_elements(), Some(1));
        assert!(!quality.is_valid());
        assert_relative_eq!(quality.polygon_quality(PolygonId::<u32>::new(0)), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_one_folded_polygon_reports_single_invalid_element() {
        // 3x3 grid with the center node dragged across the right column.
        let mut positions = Vec::new();
        for j in 0..3 {
            for i in 0..3 {
                positions.push(Point2::new(0.5 * i as f64, 0.5 * j as f64));
            }
        }
        positions[4] = Point2::new(1.3, 0.9);
        let polygons = vec![
            vec![0, 1, 4, 3],
            vec![1, 2, 5, 4],
            vec![3, 4, 7, 6],
            vec![4, 5, 8, 7],
        ];
        let mesh: PolygonalMesh = build_from_polygons(&positions, &polygons, &[]).unwrap();
        let quality = MeshQuality::new(&mesh);

        assert!(quality.q_min() < 0.0);
        assert_eq!(quality.invalid_elements(), Some(1));
        assert!(mesh.polygon_signed_area(PolygonId::new(3)) < 0.0);
    }
}

//! Planar geometry utilities.
//!
//! Everything in this module is stateless and total: degenerate input such as
//! zero-length vectors or empty point sets yields a neutral value (zero vector,
//! zero angle, origin, `None`) instead of panicking, so quality evaluation stays
//! defined for arbitrarily distorted polygons.
//!
//! Points and vectors are [`nalgebra`] `Point2<f64>` / `Vector2<f64>`. Some
//! algorithms treat a vector as the complex number `x + iy`; the
//! [`complex_mul`] / [`complex_div`] helpers provide that view.

mod bounding_box;
mod vector;

pub use bounding_box::BoundingBox;
pub use vector::{
    add, angle_between, centroid, complex_div, complex_mul, cross, dot, normalize_or_zero,
    polar, scale, signed_area, sub,
};

//! # polysmooth
//!
//! Quality-driven smoothing of planar polygonal meshes.
//!
//! A mesh is a set of nodes in the plane, some of them fixed, and polygons
//! with any number of nodes given as counter-clockwise loops. Smoothing moves
//! the free nodes to make every polygon as close to regular as possible,
//! measured by a quality number in `[-1, 1]` per polygon (1 for regular,
//! negative for inverted polygons).
//!
//! ## Features
//!
//! - **Mixed polygonal meshes**: triangles, quadrilaterals and general n-gons
//! - **Flexible indexing**: Support for 16-bit, 32-bit, and 64-bit indices
//! - **Quality metric**: regularity-based, equals the mean ratio on triangles
//! - **Smart-Laplace**: Laplacian smoothing that never lowers quality
//! - **GETMe**: geometric element transformation with simultaneous and
//!   sequential phases, able to untangle inverted elements
//! - **File formats**: Wavefront OBJ and Medit `.mesh`
//!
//! ## Quick Start
//!
//! ```no_run
//! use polysmooth::prelude::*;
//!
//! let mesh: PolygonalMesh = polysmooth::io::load("domain_initial.obj").unwrap();
//! println!("qmin before: {:.4}", MeshQuality::new(&mesh).q_min());
//!
//! let config = GetmeConfig::new(mesh.max_polygon_nodes());
//! let result = getme(&mesh, &config).unwrap();
//! println!("qmin after: {:.4} ({})", result.quality.q_min(), result.iterations);
//!
//! polysmooth::io::save(&result.mesh, "domain_getme.obj").unwrap();
//! ```
//!
//! ## Building Meshes Programmatically
//!
//! ```
//! use polysmooth::prelude::*;
//! use nalgebra::Point2;
//!
//! // Two squares sharing an edge; the shared edge's top node is displaced.
//! let positions = vec![
//!     Point2::new(0.0, 0.0),
//!     Point2::new(1.0, 0.0),
//!     Point2::new(2.0, 0.0),
//!     Point2::new(0.0, 1.0),
//!     Point2::new(1.3, 1.4),
//!     Point2::new(2.0, 1.0),
//! ];
//! let polygons = vec![vec![0, 1, 4, 3], vec![1, 2, 5, 4]];
//! let fixed = [0, 1, 2, 3, 5];
//!
//! let mesh: PolygonalMesh = build_from_polygons(&positions, &polygons, &fixed).unwrap();
//! let result = smart_laplace(&mesh, &SmartLaplaceConfig::default()).unwrap();
//! assert!(result.quality.q_min() > MeshQuality::new(&mesh).q_min());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod algo;
pub mod error;
pub mod io;
pub mod math;
pub mod mesh;
pub mod quality;
pub mod report;

/// Prelude module for convenient imports.
///
/// This module re-exports the most commonly used types and functions:
///
/// ```
/// use polysmooth::prelude::*;
/// ```
pub mod prelude {
    pub use crate::algo::{
        getme, smart_laplace, Algorithm, GetmeConfig, IterationCounts, SmartLaplaceConfig,
        SmoothingResult, Termination,
    };
    pub use crate::error::{MeshError, Result};
    pub use crate::mesh::{
        build_from_polygons, to_node_polygon, MeshIndex, Node, NodeId, Polygon, PolygonId,
        PolygonalMesh,
    };
    pub use crate::quality::MeshQuality;
}

// Re-export nalgebra types for convenience
pub use nalgebra;

#[cfg(test)]
mod tests {
    use super::prelude::*;
    use nalgebra::Point2;

    /// Hexagon split into a fan of six triangles around a displaced center.
    fn hexagon_fan(center: Point2<f64>) -> PolygonalMesh {
        let mut positions: Vec<Point2<f64>> = (0..6)
            .map(|k| {
                let a = std::f64::consts::TAU * k as f64 / 6.0;
                Point2::new(a.cos(), a.sin())
            })
            .collect();
        positions.push(center);
        let polygons: Vec<Vec<usize>> = (0..6).map(|k| vec![6, k, (k + 1) % 6]).collect();
        build_from_polygons(&positions, &polygons, &[0, 1, 2, 3, 4, 5]).unwrap()
    }

    #[test]
    fn test_both_engines_restore_regular_fan() {
        let mesh = hexagon_fan(Point2::new(0.3, -0.2));
        let initial = MeshQuality::new(&mesh);
        assert!(initial.q_min() < 0.9);
        assert!(initial.q_min_star().is_none());

        let laplace = smart_laplace(&mesh, &SmartLaplaceConfig::default()).unwrap();
        let getme = getme(&mesh, &GetmeConfig::new(mesh.max_polygon_nodes())).unwrap();

        for result in [&laplace, &getme] {
            assert!(result.quality.q_min() > 0.99, "{} reached {}", result.algorithm, result.quality.q_min());
            assert_eq!(result.mesh.fixed_node_ids(), mesh.fixed_node_ids());
        }
        assert_eq!(laplace.algorithm, Algorithm::SmartLaplace);
        assert_eq!(getme.algorithm, Algorithm::Getme);
    }
}

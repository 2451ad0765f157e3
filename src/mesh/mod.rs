//! Core mesh data structures.
//!
//! This module provides the planar polygonal mesh representation and related
//! types used by the quality evaluator and the smoothing algorithms.
//!
//! # Overview
//!
//! The primary type is [`PolygonalMesh`]: an ordered list of [`Node`]s (position
//! plus `fixed` flag) and an ordered list of [`Polygon`]s referencing them.
//! Polygons may have any node count of at least three, so triangles,
//! quadrilaterals and general polygons can be mixed in one mesh.
//!
//! # Index Types
//!
//! Mesh elements are identified by type-safe index wrappers:
//! - [`NodeId`] - Identifies a node
//! - [`PolygonId`] - Identifies a polygon
//!
//! These indices are generic over the underlying integer type ([`MeshIndex`] trait),
//! allowing you to choose `u16`, `u32`, or `u64` based on mesh size.
//!
//! # Construction
//!
//! ```
//! use polysmooth::mesh::{build_from_polygons, PolygonalMesh};
//! use nalgebra::Point2;
//!
//! let positions = vec![
//!     Point2::new(0.0, 0.0),
//!     Point2::new(1.0, 0.0),
//!     Point2::new(1.0, 1.0),
//!     Point2::new(0.0, 1.0),
//! ];
//! let polygons = vec![vec![0, 1, 2, 3]];
//!
//! let mesh: PolygonalMesh = build_from_polygons(&positions, &polygons, &[0, 1]).unwrap();
//! assert_eq!(mesh.num_fixed_nodes(), 2);
//! ```

mod builder;
mod index;
mod polygonal;
mod topology;

pub use builder::{build_from_nodes, build_from_polygons, to_node_polygon};
pub use index::{MeshIndex, NodeId, PolygonId};
pub use polygonal::{Node, Polygon, PolygonalMesh};
pub use topology::{boundary_nodes, MeshTopology};

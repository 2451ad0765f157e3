//! Mesh construction utilities.
//!
//! This module provides functions for building polygonal meshes from indexed
//! node/polygon lists as commonly found in mesh file formats, and for
//! converting them back. Every structural invariant is checked here, so the
//! rest of the crate can index without further validation.

use std::collections::HashSet;

use nalgebra::Point2;

use super::index::{MeshIndex, NodeId};
use super::polygonal::{Node, Polygon, PolygonalMesh};
use crate::error::{MeshError, Result};

/// Build a polygonal mesh from node positions, polygon node loops and fixed nodes.
///
/// # Arguments
/// * `positions` - List of node positions
/// * `polygons` - List of polygons, each as a counter-clockwise loop of node indices
/// * `fixed` - Indices of nodes that must never move
///
/// # Returns
/// A polygonal mesh, or an error if any index is out of range or a polygon
/// has fewer than three distinct nodes.
///
/// # Example
/// ```
/// use polysmooth::mesh::{build_from_polygons, PolygonalMesh};
/// use nalgebra::Point2;
///
/// let positions = vec![
///     Point2::new(0.0, 0.0),
///     Point2::new(1.0, 0.0),
///     Point2::new(0.5, 1.0),
/// ];
/// let polygons = vec![vec![0, 1, 2]];
///
/// let mesh: PolygonalMesh = build_from_polygons(&positions, &polygons, &[0]).unwrap();
/// assert_eq!(mesh.num_nodes(), 3);
/// assert_eq!(mesh.num_polygons(), 1);
/// ```
pub fn build_from_polygons<I: MeshIndex>(
    positions: &[Point2<f64>],
    polygons: &[Vec<usize>],
    fixed: &[usize],
) -> Result<PolygonalMesh<I>> {
    let mut nodes: Vec<Node> = positions.iter().map(|&p| Node::new(p)).collect();
    for &fi in fixed {
        let node = nodes
            .get_mut(fi)
            .ok_or(MeshError::InvalidFixedNode { node: fi })?;
        node.fixed = true;
    }
    build_from_nodes(nodes, polygons)
}

/// Build a polygonal mesh from nodes that already carry their `fixed` flag.
pub fn build_from_nodes<I: MeshIndex>(
    nodes: Vec<Node>,
    polygons: &[Vec<usize>],
) -> Result<PolygonalMesh<I>> {
    if polygons.is_empty() {
        return Err(MeshError::EmptyMesh);
    }

    if nodes.len() > I::CAPACITY || polygons.len() > I::CAPACITY {
        return Err(MeshError::invalid_param(
            "mesh size",
            nodes.len().max(polygons.len()),
            "too many elements for the chosen index type",
        ));
    }

    let mut seen = HashSet::new();
    for (pi, polygon) in polygons.iter().enumerate() {
        if polygon.len() < 3 {
            return Err(MeshError::TooFewNodes {
                polygon: pi,
                count: polygon.len(),
            });
        }
        seen.clear();
        for &ni in polygon {
            if ni >= nodes.len() {
                return Err(MeshError::InvalidNodeIndex { polygon: pi, node: ni });
            }
            if !seen.insert(ni) {
                return Err(MeshError::DuplicateNode { polygon: pi, node: ni });
            }
        }
    }

    let polygons = polygons
        .iter()
        .map(|loop_| Polygon {
            nodes: loop_.iter().map(|&n| NodeId::new(n)).collect(),
        })
        .collect();

    Ok(PolygonalMesh { nodes, polygons })
}

/// Convert a polygonal mesh back to indexed lists.
///
/// Returns `(positions, polygons, fixed)`, the inverse of [`build_from_polygons`].
pub fn to_node_polygon<I: MeshIndex>(
    mesh: &PolygonalMesh<I>,
) -> (Vec<Point2<f64>>, Vec<Vec<usize>>, Vec<usize>) {
    let positions = mesh.positions();
    let polygons = mesh
        .polygons()
        .iter()
        .map(|p| p.nodes().iter().map(|n| n.index()).collect())
        .collect();
    let fixed = mesh.fixed_node_ids().iter().map(|n| n.index()).collect();
    (positions, polygons, fixed)
}

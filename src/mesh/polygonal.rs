//! Planar polygonal mesh.
//!
//! A [`PolygonalMesh`] is an indexed face set in the plane: a list of nodes,
//! each with a position and a `fixed` flag, and a list of polygons given as
//! counter-clockwise node loops. Connectivity never changes after
//! construction; smoothing algorithms only relocate non-fixed nodes, and
//! they do so on their own copy of the mesh.

use nalgebra::Point2;

use super::index::{MeshIndex, NodeId, PolygonId};
use crate::math::{self, BoundingBox};

/// A mesh node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Node {
    /// The 2D position of this node.
    pub position: Point2<f64>,

    /// Fixed nodes are never moved by any smoothing algorithm.
    pub fixed: bool,
}

impl Node {
    /// Create a free node at the given position.
    pub fn new(position: Point2<f64>) -> Self {
        Self {
            position,
            fixed: false,
        }
    }
}

/// A polygon given by its node loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Polygon<I: MeshIndex = u32> {
    pub(crate) nodes: Vec<NodeId<I>>,
}

impl<I: MeshIndex> Polygon<I> {
    /// The node loop in winding order.
    #[inline]
    pub fn nodes(&self) -> &[NodeId<I>] {
        &self.nodes
    }

    /// Number of nodes (and edges) of this polygon.
    #[inline]
    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Iterate over the directed edges `(from, to)` of the node loop.
    pub fn edges(&self) -> impl Iterator<Item = (NodeId<I>, NodeId<I>)> + '_ {
        let n = self.nodes.len();
        (0..n).map(move |k| (self.nodes[k], self.nodes[(k + 1) % n]))
    }
}

/// A planar mesh of polygons sharing nodes.
///
/// Build one with [`build_from_polygons`](super::build_from_polygons), which
/// validates every index.
#[derive(Debug, Clone, PartialEq)]
pub struct PolygonalMesh<I: MeshIndex = u32> {
    pub(crate) nodes: Vec<Node>,
    pub(crate) polygons: Vec<Polygon<I>>,
}

impl<I: MeshIndex> PolygonalMesh<I> {
    // ==================== Accessors ====================

    /// Get the number of nodes.
    #[inline]
    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Get the number of polygons.
    #[inline]
    pub fn num_polygons(&self) -> usize {
        self.polygons.len()
    }

    /// Get a node by ID.
    #[inline]
    pub fn node(&self, id: NodeId<I>) -> &Node {
        &self.nodes[id.index()]
    }

    /// Get all nodes.
    #[inline]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Get a polygon by ID.
    #[inline]
    pub fn polygon(&self, id: PolygonId<I>) -> &Polygon<I> {
        &self.polygons[id.index()]
    }

    /// Get all polygons.
    #[inline]
    pub fn polygons(&self) -> &[Polygon<I>] {
        &self.polygons
    }

    /// Get the position of a node.
    #[inline]
    pub fn position(&self, id: NodeId<I>) -> &Point2<f64> {
        &self.nodes[id.index()].position
    }

    /// Check whether a node is fixed.
    #[inline]
    pub fn is_fixed(&self, id: NodeId<I>) -> bool {
        self.nodes[id.index()].fixed
    }

    /// Set the position of a non-fixed node. Fixed nodes are left untouched.
    #[inline]
    pub(crate) fn set_position(&mut self, id: NodeId<I>, position: Point2<f64>) {
        let node = &mut self.nodes[id.index()];
        if !node.fixed {
            node.position = position;
        }
    }

    /// Iterate over all node IDs.
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId<I>> + '_ {
        (0..self.nodes.len()).map(NodeId::new)
    }

    /// Iterate over all polygon IDs.
    pub fn polygon_ids(&self) -> impl Iterator<Item = PolygonId<I>> + '_ {
        (0..self.polygons.len()).map(PolygonId::new)
    }

    /// Indices of all fixed nodes in ascending order.
    pub fn fixed_node_ids(&self) -> Vec<NodeId<I>> {
        self.node_ids().filter(|&id| self.is_fixed(id)).collect()
    }

    /// Number of fixed nodes.
    pub fn num_fixed_nodes(&self) -> usize {
        self.nodes.iter().filter(|n| n.fixed).count()
    }

    // ==================== Geometry ====================

    /// Node positions of a polygon in winding order.
    pub fn polygon_positions(&self, id: PolygonId<I>) -> Vec<Point2<f64>> {
        self.polygons[id.index()]
            .nodes
            .iter()
            .map(|&n| *self.position(n))
            .collect()
    }

    /// Signed area of a polygon; negative if the polygon is inverted.
    pub fn polygon_signed_area(&self, id: PolygonId<I>) -> f64 {
        math::signed_area(&self.polygon_positions(id))
    }

    /// Arithmetic mean of a polygon's node positions.
    pub fn polygon_centroid(&self, id: PolygonId<I>) -> Point2<f64> {
        math::centroid(&self.polygon_positions(id))
    }

    /// Whether every node of the polygon is fixed.
    pub fn is_polygon_fixed(&self, id: PolygonId<I>) -> bool {
        self.polygons[id.index()].nodes.iter().all(|&n| self.is_fixed(n))
    }

    /// The largest node count over all polygons.
    pub fn max_polygon_nodes(&self) -> usize {
        self.polygons.iter().map(Polygon::num_nodes).max().unwrap_or(0)
    }

    /// Bounding box of all node positions.
    pub fn bounding_box(&self) -> Option<BoundingBox> {
        BoundingBox::from_points(self.nodes.iter().map(|n| &n.position))
    }

    /// Sum of the absolute polygon areas.
    pub fn total_area(&self) -> f64 {
        self.polygon_ids()
            .map(|p| self.polygon_signed_area(p).abs())
            .sum()
    }

    // ==================== Bulk position access ====================

    /// Snapshot of all node positions.
    pub(crate) fn positions(&self) -> Vec<Point2<f64>> {
        self.nodes.iter().map(|n| n.position).collect()
    }

    /// Overwrite all non-fixed node positions from a snapshot.
    pub(crate) fn apply_positions(&mut self, positions: &[Point2<f64>]) {
        debug_assert_eq!(positions.len(), self.nodes.len());
        for (node, &position) in self.nodes.iter_mut().zip(positions) {
            if !node.fixed {
                node.position = position;
            }
        }
    }
}

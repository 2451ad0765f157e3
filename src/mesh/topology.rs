//! Adjacency tables for polygonal meshes.
//!
//! [`MeshTopology`] is computed once per smoothing run; connectivity never
//! changes while node positions do, so the tables stay valid for every
//! intermediate mesh state.

use std::collections::HashMap;

use super::index::{MeshIndex, NodeId, PolygonId};
use super::polygonal::PolygonalMesh;

/// Node-to-polygon incidences and edge-neighbour lists.
#[derive(Debug, Clone)]
pub struct MeshTopology<I: MeshIndex = u32> {
    node_polygons: Vec<Vec<PolygonId<I>>>,
    node_neighbors: Vec<Vec<NodeId<I>>>,
}

impl<I: MeshIndex> MeshTopology<I> {
    /// Build the adjacency tables of a mesh.
    pub fn new(mesh: &PolygonalMesh<I>) -> Self {
        let mut node_polygons = vec![Vec::new(); mesh.num_nodes()];
        let mut node_neighbors: Vec<Vec<NodeId<I>>> = vec![Vec::new(); mesh.num_nodes()];

        for pid in mesh.polygon_ids() {
            let polygon = mesh.polygon(pid);
            for &n in polygon.nodes() {
                node_polygons[n.index()].push(pid);
            }
            for (a, b) in polygon.edges() {
                if !node_neighbors[a.index()].contains(&b) {
                    node_neighbors[a.index()].push(b);
                }
                if !node_neighbors[b.index()].contains(&a) {
                    node_neighbors[b.index()].push(a);
                }
            }
        }

        for neighbors in &mut node_neighbors {
            neighbors.sort();
        }

        Self {
            node_polygons,
            node_neighbors,
        }
    }

    /// Polygons containing the node, in ascending order.
    #[inline]
    pub fn node_polygons(&self, n: NodeId<I>) -> &[PolygonId<I>] {
        &self.node_polygons[n.index()]
    }

    /// Nodes sharing an edge with the node, in ascending order.
    #[inline]
    pub fn node_neighbors(&self, n: NodeId<I>) -> &[NodeId<I>] {
        &self.node_neighbors[n.index()]
    }

    /// Number of nodes covered by these tables.
    #[inline]
    pub fn num_nodes(&self) -> usize {
        self.node_polygons.len()
    }
}

/// Flags the nodes lying on the mesh boundary.
///
/// A boundary edge is used by exactly one polygon; both of its end nodes are
/// boundary nodes. Works on raw index lists so readers can call it before a
/// mesh is built.
pub fn boundary_nodes(num_nodes: usize, polygons: &[Vec<usize>]) -> Vec<bool> {
    let mut edge_use: HashMap<(usize, usize), usize> = HashMap::new();
    for polygon in polygons {
        let n = polygon.len();
        for k in 0..n {
            let a = polygon[k];
            let b = polygon[(k + 1) % n];
            *edge_use.entry((a.min(b), a.max(b))).or_insert(0) += 1;
        }
    }

    let mut boundary = vec![false; num_nodes];
    for (&(a, b), &count) in &edge_use {
        if count == 1 {
            if let Some(flag) = boundary.get_mut(a) {
                *flag = true;
            }
            if let Some(flag) = boundary.get_mut(b) {
                *flag = true;
            }
        }
    }
    boundary
}

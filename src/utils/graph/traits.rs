//! Trait definitions for graph abstractions.
//!
//! Algorithms in [`crate::utils::graph::algorithms`] are written against these traits
//! rather than a concrete container:
//!
//! - [`GraphBase`] - Node count and node iteration
//! - [`Successors`] - Forward edge traversal
//! - [`Predecessors`] - Backward edge traversal

use crate::utils::graph::NodeId;

/// Core graph properties.
pub trait GraphBase {
    /// Number of nodes; valid ids are `0..node_count()`.
    fn node_count(&self) -> usize;

    /// Iterates all node ids in ascending order.
    fn node_ids(&self) -> impl Iterator<Item = NodeId>;
}

/// Forward traversal.
pub trait Successors: GraphBase {
    /// Iterates the targets of `node`'s outgoing edges, in insertion order.
    fn successors(&self, node: NodeId) -> impl Iterator<Item = NodeId>;
}

/// Backward traversal.
pub trait Predecessors: GraphBase {
    /// Iterates the sources of `node`'s incoming edges, in insertion order.
    fn predecessors(&self, node: NodeId) -> impl Iterator<Item = NodeId>;
}

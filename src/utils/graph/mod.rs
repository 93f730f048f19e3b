//! Generic directed graph infrastructure.
//!
//! The CFG container in [`crate::cfg`] is built on top of these types:
//!
//! - [`NodeId`], [`EdgeId`] - Strongly-typed, stable arena indices
//! - [`DirectedGraph`] - Adjacency-list graph with node and edge payloads
//! - [`GraphBase`], [`Successors`], [`Predecessors`] - Traits algorithms are written against
//! - [`algorithms`] - Traversal orders

mod directed;
mod edge;
mod node;
mod traits;

pub mod algorithms;

pub use directed::DirectedGraph;
pub use edge::EdgeId;
pub use node::NodeId;
pub use traits::{GraphBase, Predecessors, Successors};

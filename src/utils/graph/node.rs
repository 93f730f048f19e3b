//! Node identifiers for [`DirectedGraph`](crate::utils::graph::DirectedGraph).

use std::fmt;

/// A strongly-typed index of a node inside a [`DirectedGraph`](crate::utils::graph::DirectedGraph).
///
/// Node ids are handed out sequentially by `add_node` and stay valid for the lifetime of
/// the graph. Nodes are never removed, so an id can be stored in side tables (DFS numbers,
/// address indexes) without being invalidated by later mutation.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    /// Creates a `NodeId` from a raw index.
    #[must_use]
    #[inline]
    pub const fn new(index: usize) -> Self {
        NodeId(index)
    }

    /// Returns the raw 0-based index.
    #[must_use]
    #[inline]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({})", self.0)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_id_roundtrip() {
        assert_eq!(NodeId::new(7).index(), 7);
    }

    #[test]
    fn test_node_id_formatting() {
        assert_eq!(format!("{:?}", NodeId::new(3)), "NodeId(3)");
        assert_eq!(format!("{}", NodeId::new(3)), "n3");
    }
}

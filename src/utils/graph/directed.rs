//! Core directed graph implementation.
//!
//! [`DirectedGraph`] is an arena: node payloads and edge payloads live in contiguous
//! vectors and are addressed by [`NodeId`] / [`EdgeId`]. Adjacency is kept in both
//! directions so successor and predecessor queries are cheap, and the insertion order of
//! edges is preserved (a node's successors are reported in the order its edges were added).

use crate::{
    utils::graph::{
        edge::EdgeId,
        node::NodeId,
        traits::{GraphBase, Predecessors, Successors},
    },
    Error, Result,
};

/// Internal storage for edge data and endpoints.
#[derive(Debug, Clone)]
struct EdgeData<E> {
    /// Source node of the edge
    source: NodeId,
    /// Target node of the edge
    target: NodeId,
    /// User-provided edge data
    data: E,
}

/// A directed graph with typed node and edge data.
///
/// Nodes are never removed, which keeps every handed-out [`NodeId`] stable while
/// transformation passes rewrite the payloads in place.
///
/// # Examples
///
/// ```rust
/// use blockscope::utils::graph::DirectedGraph;
///
/// let mut graph: DirectedGraph<&str, ()> = DirectedGraph::new();
/// let a = graph.add_node("A");
/// let b = graph.add_node("B");
/// graph.add_edge(a, b, ())?;
///
/// assert_eq!(graph.successors(a).collect::<Vec<_>>(), vec![b]);
/// assert_eq!(graph.predecessors(b).collect::<Vec<_>>(), vec![a]);
/// # Ok::<(), blockscope::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct DirectedGraph<N, E> {
    /// Node data storage
    nodes: Vec<N>,
    /// Edge data storage
    edges: Vec<EdgeData<E>>,
    /// Outgoing edges per node
    outgoing: Vec<Vec<EdgeId>>,
    /// Incoming edges per node
    incoming: Vec<Vec<EdgeId>>,
}

impl<N, E> Default for DirectedGraph<N, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<N, E> DirectedGraph<N, E> {
    /// Creates a new empty directed graph.
    #[must_use]
    pub fn new() -> Self {
        DirectedGraph {
            nodes: Vec::new(),
            edges: Vec::new(),
            outgoing: Vec::new(),
            incoming: Vec::new(),
        }
    }

    /// Adds a node and returns its id. Ids are assigned sequentially from 0.
    pub fn add_node(&mut self, data: N) -> NodeId {
        let id = NodeId::new(self.nodes.len());
        self.nodes.push(data);
        self.outgoing.push(Vec::new());
        self.incoming.push(Vec::new());
        id
    }

    /// Returns the payload of `node`, if it exists.
    #[must_use]
    pub fn node(&self, node: NodeId) -> Option<&N> {
        self.nodes.get(node.index())
    }

    /// Returns the payload of `node` mutably, if it exists.
    pub fn node_mut(&mut self, node: NodeId) -> Option<&mut N> {
        self.nodes.get_mut(node.index())
    }

    /// Returns the number of nodes in the graph.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Returns the number of edges in the graph.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Returns `true` if the graph contains no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Iterates all nodes with their ids, in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &N)> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (NodeId::new(i), n))
    }

    /// Iterates all node payloads mutably, in insertion order.
    pub fn nodes_mut(&mut self) -> impl Iterator<Item = &mut N> + '_ {
        self.nodes.iter_mut()
    }

    /// Adds a directed edge from `source` to `target`.
    ///
    /// Parallel edges are allowed; callers that need set semantics check
    /// [`find_edge`](Self::find_edge) first.
    ///
    /// # Errors
    ///
    /// Returns [`Error::GraphError`] if either endpoint does not exist.
    pub fn add_edge(&mut self, source: NodeId, target: NodeId, data: E) -> Result<EdgeId> {
        if source.index() >= self.nodes.len() {
            return Err(Error::GraphError(format!(
                "source node {} does not exist in graph with {} nodes",
                source,
                self.nodes.len()
            )));
        }
        if target.index() >= self.nodes.len() {
            return Err(Error::GraphError(format!(
                "target node {} does not exist in graph with {} nodes",
                target,
                self.nodes.len()
            )));
        }

        let id = EdgeId::new(self.edges.len());
        self.edges.push(EdgeData {
            source,
            target,
            data,
        });

        self.outgoing[source.index()].push(id);
        self.incoming[target.index()].push(id);

        Ok(id)
    }

    /// Returns the payload of `edge`, if it exists.
    #[must_use]
    pub fn edge(&self, edge: EdgeId) -> Option<&E> {
        self.edges.get(edge.index()).map(|e| &e.data)
    }

    /// Returns the payload of `edge` mutably, if it exists.
    pub fn edge_mut(&mut self, edge: EdgeId) -> Option<&mut E> {
        self.edges.get_mut(edge.index()).map(|e| &mut e.data)
    }

    /// Returns the `(source, target)` pair of `edge`, if it exists.
    #[must_use]
    pub fn edge_endpoints(&self, edge: EdgeId) -> Option<(NodeId, NodeId)> {
        self.edges.get(edge.index()).map(|e| (e.source, e.target))
    }

    /// Finds the first edge from `source` to `target`.
    #[must_use]
    pub fn find_edge(&self, source: NodeId, target: NodeId) -> Option<EdgeId> {
        self.outgoing
            .get(source.index())?
            .iter()
            .copied()
            .find(|&id| self.edges[id.index()].target == target)
    }

    /// Iterates the successors of `node` in edge insertion order.
    ///
    /// An unknown node has no successors.
    pub fn successors(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.outgoing
            .get(node.index())
            .into_iter()
            .flatten()
            .map(|&id| self.edges[id.index()].target)
    }

    /// Iterates the predecessors of `node` in edge insertion order.
    ///
    /// An unknown node has no predecessors.
    pub fn predecessors(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.incoming
            .get(node.index())
            .into_iter()
            .flatten()
            .map(|&id| self.edges[id.index()].source)
    }

    /// Iterates the outgoing edges of `node` with their payloads.
    pub fn outgoing_edges(&self, node: NodeId) -> impl Iterator<Item = (EdgeId, &E)> + '_ {
        self.outgoing
            .get(node.index())
            .into_iter()
            .flatten()
            .map(|&id| (id, &self.edges[id.index()].data))
    }
}

impl<N, E> GraphBase for DirectedGraph<N, E> {
    fn node_count(&self) -> usize {
        self.nodes.len()
    }

    fn node_ids(&self) -> impl Iterator<Item = NodeId> {
        (0..self.nodes.len()).map(NodeId::new)
    }
}

impl<N, E> Successors for DirectedGraph<N, E> {
    fn successors(&self, node: NodeId) -> impl Iterator<Item = NodeId> {
        DirectedGraph::successors(self, node)
    }
}

impl<N, E> Predecessors for DirectedGraph<N, E> {
    fn predecessors(&self, node: NodeId) -> impl Iterator<Item = NodeId> {
        DirectedGraph::predecessors(self, node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn diamond() -> (DirectedGraph<&'static str, u32>, [NodeId; 4]) {
        let mut graph = DirectedGraph::new();
        let a = graph.add_node("A");
        let b = graph.add_node("B");
        let c = graph.add_node("C");
        let d = graph.add_node("D");
        graph.add_edge(a, b, 1).unwrap();
        graph.add_edge(a, c, 2).unwrap();
        graph.add_edge(b, d, 3).unwrap();
        graph.add_edge(c, d, 4).unwrap();
        (graph, [a, b, c, d])
    }

    #[test]
    fn test_add_nodes_sequential_ids() {
        let (graph, [a, b, c, d]) = diamond();
        assert_eq!(a, NodeId::new(0));
        assert_eq!(d, NodeId::new(3));
        assert_eq!(graph.node_count(), 4);
        assert_eq!(graph.edge_count(), 4);
        assert_eq!(graph.node(b), Some(&"B"));
        assert_eq!(graph.node(c), Some(&"C"));
    }

    #[test]
    fn test_successor_order_is_insertion_order() {
        let (graph, [a, b, c, _]) = diamond();
        assert_eq!(graph.successors(a).collect::<Vec<_>>(), vec![b, c]);
    }

    #[test]
    fn test_predecessors() {
        let (graph, [a, b, c, d]) = diamond();
        assert_eq!(graph.predecessors(d).collect::<Vec<_>>(), vec![b, c]);
        assert_eq!(graph.predecessors(a).count(), 0);
    }

    #[test]
    fn test_add_edge_invalid_node() {
        let (mut graph, [a, ..]) = diamond();
        assert!(matches!(
            graph.add_edge(a, NodeId::new(42), 0),
            Err(Error::GraphError(_))
        ));
        assert!(graph.add_edge(NodeId::new(42), a, 0).is_err());
    }

    #[test]
    fn test_find_edge_and_payload() {
        let (mut graph, [a, _, c, d]) = diamond();
        let edge = graph.find_edge(a, c).unwrap();
        assert_eq!(graph.edge(edge), Some(&2));
        assert_eq!(graph.edge_endpoints(edge), Some((a, c)));
        *graph.edge_mut(edge).unwrap() = 20;
        assert_eq!(graph.edge(edge), Some(&20));
        assert!(graph.find_edge(a, d).is_none());
    }

    #[test]
    fn test_unknown_node_queries_are_empty() {
        let (graph, _) = diamond();
        assert_eq!(graph.successors(NodeId::new(99)).count(), 0);
        assert_eq!(graph.predecessors(NodeId::new(99)).count(), 0);
        assert!(graph.node(NodeId::new(99)).is_none());
    }
}

//! Depth-first traversal orders.

use crate::utils::graph::{NodeId, Successors};

/// Returns the nodes reachable from `start` in depth-first postorder.
///
/// Successors are visited in the order the graph reports them, so the result is fully
/// determined by edge insertion order. The traversal is iterative and does not recurse,
/// so deep graphs cannot overflow the stack. Unreachable nodes are not included; an
/// invalid `start` yields an empty vector.
///
/// # Examples
///
/// ```rust
/// use blockscope::utils::graph::{algorithms, DirectedGraph};
///
/// let mut graph: DirectedGraph<(), ()> = DirectedGraph::new();
/// let a = graph.add_node(());
/// let b = graph.add_node(());
/// let c = graph.add_node(());
/// graph.add_edge(a, b, ())?;
/// graph.add_edge(b, c, ())?;
///
/// assert_eq!(algorithms::postorder(&graph, a), vec![c, b, a]);
/// # Ok::<(), blockscope::Error>(())
/// ```
#[allow(clippy::items_after_statements)]
pub fn postorder<G: Successors>(graph: &G, start: NodeId) -> Vec<NodeId> {
    let node_count = graph.node_count();
    if start.index() >= node_count {
        return Vec::new();
    }

    let mut visited = vec![false; node_count];
    let mut result = Vec::with_capacity(node_count);

    #[derive(Clone, Copy)]
    enum State {
        Enter,
        Exit,
    }

    let mut stack = vec![(start, State::Enter)];

    while let Some((node, state)) = stack.pop() {
        match state {
            State::Enter => {
                if visited[node.index()] {
                    continue;
                }
                visited[node.index()] = true;
                stack.push((node, State::Exit));

                // Reverse push so the first successor is explored first
                let successors: Vec<NodeId> = graph.successors(node).collect();
                for &succ in successors.iter().rev() {
                    if !visited[succ.index()] {
                        stack.push((succ, State::Enter));
                    }
                }
            }
            State::Exit => result.push(node),
        }
    }

    result
}

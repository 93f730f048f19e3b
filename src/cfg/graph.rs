//! The control-flow graph container.
//!
//! [`Cfg`] is an arena of basic blocks on top of [`DirectedGraph`]. Blocks are addressed
//! by their address text; the address index resolves it to a stable [`NodeId`], so passes
//! can hold ids across edits without re-resolving. Nodes are never removed.
//!
//! The dump writer does not depend on this type directly but on the [`CfgView`] query
//! contract, which any graph container can implement.

use std::collections::HashMap;

use crate::{
    ir::{BasicBlock, Cond},
    utils::{
        graph::{algorithms, DirectedGraph, EdgeId, NodeId},
        natural_cmp,
    },
    Error, Result,
};

/// Node payload of a [`Cfg`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CfgNode {
    /// Address key, unique within the graph
    pub addr: String,
    /// The block at this address; `None` for nodes known only as edge targets
    pub block: Option<BasicBlock>,
    /// Postorder number assigned by [`Cfg::number_postorder`]
    pub dfs_number: Option<usize>,
}

/// Edge payload of a [`Cfg`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CfgEdge {
    /// Condition under which control takes this edge; `None` for unconditional edges
    pub cond: Option<Cond>,
}

/// Read-only queries the CFG dump needs from a graph container.
///
/// Absent data is never an error: an unknown address has no block, no DFS number and no
/// neighbours, and an edge without a condition yields `None`.
pub trait CfgView {
    /// All node addresses in natural order.
    fn sorted_addrs(&self) -> Vec<&str>;

    /// The block stored at `addr`.
    fn block(&self, addr: &str) -> Option<&BasicBlock>;

    /// The DFS number of `addr`, if one was assigned.
    fn dfs_number(&self, addr: &str) -> Option<usize>;

    /// Predecessor addresses of `addr`, in the container's native order.
    fn pred(&self, addr: &str) -> Vec<&str>;

    /// Successor addresses of `addr`, in the container's native order.
    fn succ(&self, addr: &str) -> Vec<&str>;

    /// The condition on the edge `from -> to`.
    fn edge_cond(&self, from: &str, to: &str) -> Option<&Cond>;
}

/// A control-flow graph of basic blocks.
///
/// # Examples
///
/// ```rust
/// use blockscope::cfg::Cfg;
/// use blockscope::ir::{BasicBlock, CmpOp, Expr, Inst, SimpleCond};
///
/// let mut cfg = Cfg::new();
/// cfg.add_block(BasicBlock::with_items("blk1", vec![Inst::ret()]))?;
/// cfg.add_block(BasicBlock::new("blk10"))?;
/// cfg.add_block(BasicBlock::new("blk2"))?;
///
/// let cond = SimpleCond::new(Expr::reg("r1"), CmpOp::Eq, Expr::value(0));
/// cfg.add_edge("blk1", "blk10", Some(cond.into()))?;
/// cfg.add_edge("blk1", "blk2", None)?;
///
/// assert_eq!(cfg.sorted_addrs(), vec!["blk1", "blk2", "blk10"]);
/// assert_eq!(cfg.succ("blk1").collect::<Vec<_>>(), vec!["blk10", "blk2"]);
/// assert!(cfg.edge_cond("blk1", "blk2").is_none());
/// # Ok::<(), blockscope::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct Cfg {
    graph: DirectedGraph<CfgNode, CfgEdge>,
    index: HashMap<String, NodeId>,
    entry: Option<NodeId>,
}

impl Cfg {
    /// Creates an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Cfg::default()
    }

    /// Number of nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Number of edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Returns `true` if the graph has no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.graph.is_empty()
    }

    /// Returns the node for `addr`, creating an empty one if it does not exist yet.
    pub fn add_node(&mut self, addr: &str) -> NodeId {
        if let Some(&id) = self.index.get(addr) {
            return id;
        }
        let id = self.graph.add_node(CfgNode {
            addr: addr.to_string(),
            block: None,
            dfs_number: None,
        });
        self.index.insert(addr.to_string(), id);
        id
    }

    /// Stores `block` at its address.
    ///
    /// A node created earlier as an edge target receives the block.
    ///
    /// # Errors
    ///
    /// Returns [`Error::GraphError`] if a block is already stored at that address.
    pub fn add_block(&mut self, block: BasicBlock) -> Result<NodeId> {
        let id = self.add_node(&block.addr);
        let node = self.node_by_id_mut(id)?;
        if node.block.is_some() {
            return Err(Error::GraphError(format!(
                "Duplicate block at address {}",
                block.addr
            )));
        }
        node.block = Some(block);
        Ok(id)
    }

    /// Adds the edge `from -> to`, creating missing nodes.
    ///
    /// There is at most one edge per pair of nodes: adding an existing edge replaces its
    /// condition and keeps its position in the successor order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::GraphError`] if the underlying graph rejects the edge.
    pub fn add_edge(&mut self, from: &str, to: &str, cond: Option<Cond>) -> Result<EdgeId> {
        let source = self.add_node(from);
        let target = self.add_node(to);
        if let Some(edge) = self.graph.find_edge(source, target) {
            if let Some(data) = self.graph.edge_mut(edge) {
                data.cond = cond;
            }
            return Ok(edge);
        }
        self.graph.add_edge(source, target, CfgEdge { cond })
    }

    /// Resolves an address to its node id.
    #[must_use]
    pub fn node_id(&self, addr: &str) -> Option<NodeId> {
        self.index.get(addr).copied()
    }

    /// Returns the node at `addr`.
    #[must_use]
    pub fn node(&self, addr: &str) -> Option<&CfgNode> {
        self.graph.node(self.node_id(addr)?)
    }

    /// Returns the node at `addr` mutably.
    pub fn node_mut(&mut self, addr: &str) -> Option<&mut CfgNode> {
        let id = self.node_id(addr)?;
        self.graph.node_mut(id)
    }

    /// Returns the node with id `id`.
    #[must_use]
    pub fn node_by_id(&self, id: NodeId) -> Option<&CfgNode> {
        self.graph.node(id)
    }

    fn node_by_id_mut(&mut self, id: NodeId) -> Result<&mut CfgNode> {
        self.graph
            .node_mut(id)
            .ok_or_else(|| Error::GraphError(format!("Node {id} does not exist")))
    }

    /// Returns the block at `addr`.
    #[must_use]
    pub fn block(&self, addr: &str) -> Option<&BasicBlock> {
        self.node(addr)?.block.as_ref()
    }

    /// Returns the block at `addr` mutably.
    pub fn block_mut(&mut self, addr: &str) -> Option<&mut BasicBlock> {
        self.node_mut(addr)?.block.as_mut()
    }

    /// Iterates every stored block mutably, in insertion order.
    ///
    /// The borrow is exclusive for the duration of the iteration, which is how passes get
    /// non-overlapping mutable access to the blocks.
    pub fn blocks_mut(&mut self) -> impl Iterator<Item = &mut BasicBlock> + '_ {
        self.graph
            .nodes_mut()
            .filter_map(|node| node.block.as_mut())
    }

    fn addr_of(&self, id: NodeId) -> &str {
        self.graph.node(id).map_or("", |node| node.addr.as_str())
    }

    /// Iterates the successors of `addr` in edge insertion order.
    pub fn succ(&self, addr: &str) -> impl Iterator<Item = &str> + '_ {
        self.node_id(addr)
            .into_iter()
            .flat_map(move |id| self.graph.successors(id))
            .map(move |id| self.addr_of(id))
    }

    /// Iterates the predecessors of `addr` in edge insertion order.
    pub fn pred(&self, addr: &str) -> impl Iterator<Item = &str> + '_ {
        self.node_id(addr)
            .into_iter()
            .flat_map(move |id| self.graph.predecessors(id))
            .map(move |id| self.addr_of(id))
    }

    /// Returns the condition on the edge `from -> to`.
    ///
    /// `None` both for unconditional edges and for edges that do not exist.
    #[must_use]
    pub fn edge_cond(&self, from: &str, to: &str) -> Option<&Cond> {
        let edge = self
            .graph
            .find_edge(self.node_id(from)?, self.node_id(to)?)?;
        self.graph.edge(edge)?.cond.as_ref()
    }

    /// Replaces the condition on the edge `from -> to`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::GraphError`] if there is no such edge.
    pub fn set_edge_cond(&mut self, from: &str, to: &str, cond: Option<Cond>) -> Result<()> {
        let edge = self
            .node_id(from)
            .zip(self.node_id(to))
            .and_then(|(source, target)| self.graph.find_edge(source, target))
            .ok_or_else(|| Error::GraphError(format!("No edge {from} -> {to}")))?;
        if let Some(data) = self.graph.edge_mut(edge) {
            data.cond = cond;
        }
        Ok(())
    }

    /// Returns the DFS number of `addr`.
    #[must_use]
    pub fn dfs_number(&self, addr: &str) -> Option<usize> {
        self.node(addr)?.dfs_number
    }

    /// Sets or clears the DFS number of `addr`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::GraphError`] if `addr` is not in the graph.
    pub fn set_dfs_number(&mut self, addr: &str, number: Option<usize>) -> Result<()> {
        let node = self
            .node_mut(addr)
            .ok_or_else(|| Error::GraphError(format!("Unknown address {addr}")))?;
        node.dfs_number = number;
        Ok(())
    }

    /// The entry node: the one set with [`set_entry`](Self::set_entry), otherwise the
    /// first node added.
    #[must_use]
    pub fn entry(&self) -> Option<&str> {
        let id = self
            .entry
            .or_else(|| (!self.graph.is_empty()).then(|| NodeId::new(0)))?;
        Some(self.addr_of(id))
    }

    /// Makes `addr` the entry node.
    ///
    /// # Errors
    ///
    /// Returns [`Error::GraphError`] if `addr` is not in the graph.
    pub fn set_entry(&mut self, addr: &str) -> Result<()> {
        let id = self
            .node_id(addr)
            .ok_or_else(|| Error::GraphError(format!("Unknown entry address {addr}")))?;
        self.entry = Some(id);
        Ok(())
    }

    /// Node ids in natural order of their addresses.
    #[must_use]
    pub fn sorted_ids(&self) -> Vec<NodeId> {
        let mut ids: Vec<(NodeId, &str)> = self
            .graph
            .nodes()
            .map(|(id, node)| (id, node.addr.as_str()))
            .collect();
        ids.sort_by(|a, b| natural_cmp(a.1, b.1));
        ids.into_iter().map(|(id, _)| id).collect()
    }

    /// All addresses in natural order.
    #[must_use]
    pub fn sorted_addrs(&self) -> Vec<&str> {
        self.sorted_ids()
            .into_iter()
            .map(|id| self.addr_of(id))
            .collect()
    }

    /// Iterates all nodes in natural order of their addresses.
    pub fn iter_sorted_nodes(&self) -> impl Iterator<Item = &CfgNode> + '_ {
        self.sorted_ids()
            .into_iter()
            .filter_map(move |id| self.graph.node(id))
    }

    /// Runs `f` on every stored block in natural address order.
    ///
    /// Returns `true` if any call reported a change. The first error stops the walk.
    ///
    /// # Errors
    ///
    /// Returns the first error `f` returns.
    pub fn for_each_block_mut<F>(&mut self, mut f: F) -> Result<bool>
    where
        F: FnMut(&mut BasicBlock) -> Result<bool>,
    {
        let mut changed = false;
        for id in self.sorted_ids() {
            if let Some(block) = self.node_by_id_mut(id)?.block.as_mut() {
                changed |= f(block)?;
            }
        }
        Ok(changed)
    }

    /// Assigns 1-based postorder numbers to the nodes reachable from the entry.
    ///
    /// Successors are visited in edge insertion order. Numbers from an earlier run are
    /// cleared first, so unreachable nodes end up without a number.
    ///
    /// Returns the number of nodes numbered.
    pub fn number_postorder(&mut self) -> usize {
        for node in self.graph.nodes_mut() {
            node.dfs_number = None;
        }
        let Some(entry) = self.entry.or_else(|| (!self.graph.is_empty()).then(|| NodeId::new(0)))
        else {
            return 0;
        };

        let order = algorithms::postorder(&self.graph, entry);
        for (i, &id) in order.iter().enumerate() {
            if let Some(node) = self.graph.node_mut(id) {
                node.dfs_number = Some(i + 1);
            }
        }
        order.len()
    }
}

impl CfgView for Cfg {
    fn sorted_addrs(&self) -> Vec<&str> {
        Cfg::sorted_addrs(self)
    }

    fn block(&self, addr: &str) -> Option<&BasicBlock> {
        Cfg::block(self, addr)
    }

    fn dfs_number(&self, addr: &str) -> Option<usize> {
        Cfg::dfs_number(self, addr)
    }

    fn pred(&self, addr: &str) -> Vec<&str> {
        Cfg::pred(self, addr).collect()
    }

    fn succ(&self, addr: &str) -> Vec<&str> {
        Cfg::succ(self, addr).collect()
    }

    fn edge_cond(&self, from: &str, to: &str) -> Option<&Cond> {
        Cfg::edge_cond(self, from, to)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        ir::{CmpOp, Expr, Inst, SimpleCond},
        test::diamond_cfg,
    };

    #[test]
    fn test_add_node_is_idempotent() {
        let mut cfg = Cfg::new();
        let a = cfg.add_node("a");
        assert_eq!(cfg.add_node("a"), a);
        assert_eq!(cfg.node_count(), 1);
        assert!(cfg.block("a").is_none());
    }

    #[test]
    fn test_add_block_fills_placeholder() {
        let mut cfg = Cfg::new();
        cfg.add_edge("a", "b", None).unwrap();
        assert!(cfg.block("b").is_none());
        cfg.add_block(BasicBlock::with_items("b", vec![Inst::ret()]))
            .unwrap();
        assert_eq!(cfg.block("b").unwrap().len(), 1);
    }

    #[test]
    fn test_duplicate_block_rejected() {
        let mut cfg = Cfg::new();
        cfg.add_block(BasicBlock::new("a")).unwrap();
        assert!(matches!(
            cfg.add_block(BasicBlock::new("a")),
            Err(Error::GraphError(_))
        ));
    }

    #[test]
    fn test_sorted_addrs_natural() {
        let mut cfg = Cfg::new();
        for addr in ["blk10", "blk2", "blk1", "blk20"] {
            cfg.add_node(addr);
        }
        assert_eq!(cfg.sorted_addrs(), vec!["blk1", "blk2", "blk10", "blk20"]);
        let addrs: Vec<_> = cfg.iter_sorted_nodes().map(|n| n.addr.as_str()).collect();
        assert_eq!(addrs, vec!["blk1", "blk2", "blk10", "blk20"]);
    }

    #[test]
    fn test_succ_pred_order() {
        let cfg = diamond_cfg();
        assert_eq!(cfg.succ("entry").collect::<Vec<_>>(), vec!["then", "else"]);
        assert_eq!(cfg.pred("exit").collect::<Vec<_>>(), vec!["then", "else"]);
        assert_eq!(cfg.succ("missing").count(), 0);
    }

    #[test]
    fn test_edge_conditions() {
        let mut cfg = diamond_cfg();
        assert_eq!(
            cfg.edge_cond("entry", "then").map(ToString::to_string),
            Some("($r1 == 0x0)".to_string())
        );
        assert!(cfg.edge_cond("then", "exit").is_none());
        assert!(cfg.edge_cond("exit", "entry").is_none());

        cfg.set_edge_cond("entry", "then", None).unwrap();
        assert!(cfg.edge_cond("entry", "then").is_none());
        assert!(cfg.set_edge_cond("exit", "entry", None).is_err());
    }

    #[test]
    fn test_add_edge_twice_replaces_condition() {
        let mut cfg = Cfg::new();
        let first = cfg.add_edge("a", "b", None).unwrap();
        let cond = SimpleCond::new(Expr::reg("r0"), CmpOp::Ne, Expr::value(0));
        let second = cfg.add_edge("a", "b", Some(cond.into())).unwrap();
        assert_eq!(first, second);
        assert_eq!(cfg.edge_count(), 1);
        assert!(cfg.edge_cond("a", "b").is_some());
    }

    #[test]
    fn test_entry_defaults_to_first_node() {
        let mut cfg = Cfg::new();
        assert!(cfg.entry().is_none());
        cfg.add_node("start");
        cfg.add_node("other");
        assert_eq!(cfg.entry(), Some("start"));
        cfg.set_entry("other").unwrap();
        assert_eq!(cfg.entry(), Some("other"));
        assert!(cfg.set_entry("nowhere").is_err());
    }

    #[test]
    fn test_number_postorder() {
        let mut cfg = diamond_cfg();
        cfg.add_node("unreachable");
        assert_eq!(cfg.number_postorder(), 4);
        assert_eq!(cfg.dfs_number("exit"), Some(1));
        assert_eq!(cfg.dfs_number("then"), Some(2));
        assert_eq!(cfg.dfs_number("else"), Some(3));
        assert_eq!(cfg.dfs_number("entry"), Some(4));
        assert_eq!(cfg.dfs_number("unreachable"), None);
    }

    #[test]
    fn test_number_postorder_clears_stale_numbers() {
        let mut cfg = diamond_cfg();
        cfg.add_node("island");
        cfg.set_dfs_number("island", Some(99)).unwrap();
        cfg.number_postorder();
        assert_eq!(cfg.dfs_number("island"), None);
    }

    #[test]
    fn test_for_each_block_mut_order() {
        let mut cfg = Cfg::new();
        for addr in ["b10", "b2", "b1"] {
            cfg.add_block(BasicBlock::new(addr)).unwrap();
        }
        let mut seen = Vec::new();
        let changed = cfg
            .for_each_block_mut(|block| {
                seen.push(block.addr.clone());
                Ok(block.addr == "b2")
            })
            .unwrap();
        assert!(changed);
        assert_eq!(seen, vec!["b1", "b2", "b10"]);
    }

    #[test]
    fn test_blocks_mut() {
        let mut cfg = diamond_cfg();
        cfg.add_node("placeholder");
        for block in cfg.blocks_mut() {
            block.push(Inst::lit("// visited"));
        }
        assert_eq!(cfg.block("exit").unwrap().last(), Some(&Inst::lit("// visited")));
    }

    #[test]
    fn test_view_matches_inherent_queries() {
        let cfg = diamond_cfg();
        let view: &dyn CfgView = &cfg;
        assert_eq!(view.succ("entry"), vec!["then", "else"]);
        assert_eq!(view.pred("then"), vec!["entry"]);
        assert_eq!(view.sorted_addrs(), cfg.sorted_addrs());
        assert!(view.block("entry").is_some());
        assert!(view.edge_cond("entry", "else").is_some());
    }
}

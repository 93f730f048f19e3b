//! Passes that ship with the crate.

use log::debug;

use crate::{
    cfg::Cfg,
    ir::{BasicBlock, Opcode},
    pipeline::pass::{BlockPass, Pass},
    Result,
};

/// Numbers the nodes reachable from the entry in postorder.
///
/// The numbers show up as `// DFS#:` lines in the dump. Reports a change only when at
/// least one node ends up with a different number than before.
#[derive(Debug, Default, Clone, Copy)]
pub struct NumberPostorderPass;

impl Pass for NumberPostorderPass {
    fn name(&self) -> &'static str {
        "number_postorder"
    }

    fn run(&self, cfg: &mut Cfg) -> Result<bool> {
        let before: Vec<_> = cfg.iter_sorted_nodes().map(|n| n.dfs_number).collect();
        let numbered = cfg.number_postorder();
        let after: Vec<_> = cfg.iter_sorted_nodes().map(|n| n.dfs_number).collect();
        debug!("Numbered {numbered} of {} nodes", cfg.node_count());
        Ok(before != after)
    }

    fn description(&self) -> &'static str {
        "Assigns postorder DFS numbers from the entry node"
    }
}

/// Drops a `goto` that ends a block.
///
/// The jump target is already recorded as an edge of the graph, so the instruction is
/// redundant in the dump. Edges are left untouched.
#[derive(Debug, Default, Clone, Copy)]
pub struct RemoveTrailingJumpsPass;

impl BlockPass for RemoveTrailingJumpsPass {
    fn name(&self) -> &'static str {
        "remove_trailing_jumps"
    }

    fn run_on_block(&self, block: &mut BasicBlock) -> Result<bool> {
        if !block.last().is_some_and(|inst| inst.op == Opcode::Goto) {
            return Ok(false);
        }
        block.remove(block.len() - 1);
        Ok(true)
    }

    fn description(&self) -> &'static str {
        "Removes a goto ending a block, keeping the graph edges"
    }
}

/// Removes instructions annotated as dead.
#[derive(Debug, Default, Clone, Copy)]
pub struct RemoveDeadPass;

impl BlockPass for RemoveDeadPass {
    fn name(&self) -> &'static str {
        "remove_dead"
    }

    fn run_on_block(&self, block: &mut BasicBlock) -> Result<bool> {
        let before = block.len();
        block.retain(|inst| !inst.is_dead());
        Ok(block.len() != before)
    }

    fn description(&self) -> &'static str {
        "Deletes instructions carrying the dead annotation"
    }
}

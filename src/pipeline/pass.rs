//! Transformation pass traits.
//!
//! A pass script names two kinds of transformations. Whole-graph passes ([`Pass`], script
//! keyword `xform:`) see the complete [`Cfg`] and may restructure it. Block passes
//! ([`BlockPass`], script keyword `xform_bblock:`) are handed one [`BasicBlock`] at a time
//! and may only rewrite its instructions.

use crate::{cfg::Cfg, ir::BasicBlock, Result};

/// A transformation that operates on a whole control-flow graph.
///
/// Passes receive exclusive access to the graph for the duration of the call and mutate it
/// in place. Running a pass twice is not required to be idempotent.
pub trait Pass {
    /// Unique name, used in pass scripts and for logging.
    fn name(&self) -> &'static str;

    /// Run the pass on `cfg`.
    ///
    /// Returns `true` if anything was changed, `false` otherwise.
    ///
    /// # Arguments
    ///
    /// * `cfg` - The graph to transform.
    ///
    /// # Errors
    ///
    /// Returns an error if the pass finds the graph in a state it cannot handle. The
    /// pipeline aborts on the first error.
    fn run(&self, cfg: &mut Cfg) -> Result<bool>;

    /// Get a description of what this pass does.
    fn description(&self) -> &'static str {
        "No description available"
    }
}

/// A transformation that operates on one basic block at a time.
///
/// The pipeline calls [`BlockPass::run_on_block`] for every stored block in natural
/// address order. Nodes without a block are skipped.
pub trait BlockPass {
    /// Unique name, used in pass scripts and for logging.
    fn name(&self) -> &'static str;

    /// Run the pass on a single block.
    ///
    /// Returns `true` if the block was changed, `false` otherwise.
    ///
    /// # Arguments
    ///
    /// * `block` - The block to transform.
    ///
    /// # Errors
    ///
    /// Returns an error if the block cannot be processed. The pipeline aborts on the
    /// first error, leaving blocks visited earlier already transformed.
    fn run_on_block(&self, block: &mut BasicBlock) -> Result<bool>;

    /// Get a description of what this pass does.
    fn description(&self) -> &'static str {
        "No description available"
    }
}

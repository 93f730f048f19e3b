//! Basic blocks: ordered instruction sequences with a single entry address.

use std::fmt::Write;

use crate::{
    ir::{inst::Inst, render::InstRenderer},
    Result,
};

/// An ordered sequence of instructions identified by its address.
///
/// Insertion order is execution order. The block owns its instructions; passes edit the
/// sequence in place through the accessors below or the public `items` field.
///
/// # Examples
///
/// ```rust
/// use blockscope::ir::{BasicBlock, DumpOptions, Expr, Inst};
///
/// let mut block = BasicBlock::new("blk1");
/// block.push(Inst::assign(Expr::reg("r1"), Expr::value(1)));
/// block.push(Inst::goto(Expr::addr("blk2")));
///
/// let mut out = String::new();
/// block.dump(&mut out, 1, &DumpOptions::default())?;
/// assert_eq!(out, "  $r1 = 0x1\n  goto blk2\n");
/// # Ok::<(), blockscope::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BasicBlock {
    /// Entry address; unique within a CFG
    pub addr: String,
    /// Instructions in execution order
    pub items: Vec<Inst>,
}

impl BasicBlock {
    /// Creates an empty block.
    #[must_use]
    pub fn new(addr: impl Into<String>) -> Self {
        BasicBlock {
            addr: addr.into(),
            items: Vec::new(),
        }
    }

    /// Creates a block holding `items`.
    #[must_use]
    pub fn with_items(addr: impl Into<String>, items: Vec<Inst>) -> Self {
        BasicBlock {
            addr: addr.into(),
            items,
        }
    }

    /// Appends an instruction.
    pub fn push(&mut self, inst: Inst) {
        self.items.push(inst);
    }

    /// Inserts an instruction before position `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index > len`.
    pub fn insert(&mut self, index: usize, inst: Inst) {
        self.items.insert(index, inst);
    }

    /// Removes and returns the instruction at `index`, if there is one.
    pub fn remove(&mut self, index: usize) -> Option<Inst> {
        (index < self.items.len()).then(|| self.items.remove(index))
    }

    /// Keeps only the instructions for which `keep` returns `true`.
    pub fn retain(&mut self, keep: impl FnMut(&Inst) -> bool) {
        self.items.retain(keep);
    }

    /// Number of instructions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` if the block has no instructions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Iterates the instructions in order.
    pub fn iter(&self) -> std::slice::Iter<'_, Inst> {
        self.items.iter()
    }

    /// Iterates the instructions mutably in order.
    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Inst> {
        self.items.iter_mut()
    }

    /// The last instruction, usually the terminator.
    #[must_use]
    pub fn last(&self) -> Option<&Inst> {
        self.items.last()
    }

    /// Writes one line per instruction, in order.
    ///
    /// Each line is `"  " * indent` followed by the renderer's output and a newline.
    /// Instructions the renderer returns `None` for are skipped. A rendering that spans
    /// several lines (an instruction with provenance) is written as-is after the indent.
    ///
    /// # Arguments
    ///
    /// * `out` - Destination for the text
    /// * `indent` - Indentation level, two spaces each
    /// * `renderer` - Decides the text for each instruction
    ///
    /// # Errors
    ///
    /// Returns the renderer's error, or [`Error::Format`](crate::Error::Format) if `out`
    /// fails.
    pub fn dump<W: Write + ?Sized>(
        &self,
        out: &mut W,
        indent: usize,
        renderer: &dyn InstRenderer,
    ) -> Result<()> {
        let pad = "  ".repeat(indent);
        for inst in &self.items {
            if let Some(text) = renderer.render(inst)? {
                out.write_str(&pad)?;
                out.write_str(&text)?;
                out.write_str("\n")?;
            }
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a BasicBlock {
    type Item = &'a Inst;
    type IntoIter = std::slice::Iter<'a, Inst>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl<'a> IntoIterator for &'a mut BasicBlock {
    type Item = &'a mut Inst;
    type IntoIter = std::slice::IterMut<'a, Inst>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter_mut()
    }
}

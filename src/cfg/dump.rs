//! Deterministic text dump of a CFG.
//!
//! One entry per node, nodes in natural address order, entries separated by a blank line:
//!
//! ```text
//! // Predecessors: ['blk1']
//! // DFS#: 2
//! blk2:
//! $r0 += 0x1
//! Exits: [('($r1 == 0x0)', 'blk10'), (None, 'blk3')]
//! ```
//!
//! Predecessors are listed in plain string order, successors in the container's native order.
//! The `DFS#` line appears only for numbered nodes, and a node without a block shows the
//! placeholder line `    None`. The output is used to diff a graph before and after a pass,
//! so for a given graph it is byte-for-byte reproducible.

use std::{fmt::Write, io};

use log::debug;

use crate::{
    cfg::graph::CfgView,
    ir::InstRenderer,
    Result,
};

/// Placeholder line for a node that has no block.
pub(crate) const NO_BLOCK: &str = "    None";

/// Writes `s` as a single-quoted literal, escaping `\` and `'`.
///
/// Always single quotes, even when `s` contains `'`, so the reader needs only one form.
pub(crate) fn write_quoted<W: Write + ?Sized>(out: &mut W, s: &str) -> std::fmt::Result {
    out.write_char('\'')?;
    for c in s.chars() {
        if c == '\\' || c == '\'' {
            out.write_char('\\')?;
        }
        out.write_char(c)?;
    }
    out.write_char('\'')
}

/// Writes the dump of `view` to `out`.
///
/// # Arguments
///
/// * `view` - The graph to dump
/// * `out` - Destination for the text
/// * `renderer` - Renders each instruction, or omits it
///
/// # Errors
///
/// Returns the renderer's error (e.g. [`Error::Malformed`](crate::Error::Malformed) for an
/// instruction that breaks its shape rules) or [`Error::Format`](crate::Error::Format).
/// Output written before the failure is left in `out`.
///
/// # Examples
///
/// ```rust
/// use blockscope::cfg::{dump_cfg, Cfg};
/// use blockscope::ir::{BasicBlock, DumpOptions, Expr, Inst};
///
/// let mut cfg = Cfg::new();
/// cfg.add_block(BasicBlock::with_items("blk1", vec![Inst::goto(Expr::addr("blk2"))]))?;
/// cfg.add_edge("blk1", "blk2", None)?;
///
/// let mut out = String::new();
/// dump_cfg(&cfg, &mut out, &DumpOptions::default())?;
/// assert_eq!(
///     out,
///     "// Predecessors: []\nblk1:\ngoto blk2\nExits: [(None, 'blk2')]\n\n\
///      // Predecessors: ['blk1']\nblk2:\n    None\nExits: []\n"
/// );
/// # Ok::<(), blockscope::Error>(())
/// ```
pub fn dump_cfg<V, W>(view: &V, out: &mut W, renderer: &dyn InstRenderer) -> Result<()>
where
    V: CfgView + ?Sized,
    W: Write + ?Sized,
{
    let addrs = view.sorted_addrs();
    for (i, addr) in addrs.iter().copied().enumerate() {
        if i > 0 {
            out.write_str("\n")?;
        }

        let mut preds = view.pred(addr);
        preds.sort_unstable();
        out.write_str("// Predecessors: [")?;
        for (j, pred) in preds.iter().enumerate() {
            if j > 0 {
                out.write_str(", ")?;
            }
            write_quoted(out, pred)?;
        }
        out.write_str("]\n")?;

        if let Some(number) = view.dfs_number(addr) {
            writeln!(out, "// DFS#: {number}")?;
        }

        writeln!(out, "{addr}:")?;
        match view.block(addr) {
            Some(block) => block.dump(out, 0, renderer)?,
            None => writeln!(out, "{NO_BLOCK}")?,
        }

        out.write_str("Exits: [")?;
        for (j, succ) in view.succ(addr).into_iter().enumerate() {
            if j > 0 {
                out.write_str(", ")?;
            }
            out.write_str("(")?;
            match view.edge_cond(addr, succ) {
                Some(cond) => write_quoted(out, &cond.to_string())?,
                None => out.write_str("None")?,
            }
            out.write_str(", ")?;
            write_quoted(out, succ)?;
            out.write_str(")")?;
        }
        out.write_str("]\n")?;
    }

    debug!("Dumped {} CFG nodes", addrs.len());
    Ok(())
}

/// Returns the dump of `view` as a string.
///
/// # Errors
///
/// See [`dump_cfg`].
pub fn dump_to_string<V>(view: &V, renderer: &dyn InstRenderer) -> Result<String>
where
    V: CfgView + ?Sized,
{
    let mut out = String::new();
    dump_cfg(view, &mut out, renderer)?;
    Ok(out)
}

/// Writes the dump of `view` to an I/O sink.
///
/// The complete dump is rendered before anything is written, so a rendering failure
/// leaves `out` untouched.
///
/// # Errors
///
/// See [`dump_cfg`]; additionally [`Error::FileError`](crate::Error::FileError) if
/// writing fails.
pub fn write_dump<V, W>(view: &V, out: &mut W, renderer: &dyn InstRenderer) -> Result<()>
where
    V: CfgView + ?Sized,
    W: io::Write + ?Sized,
{
    let text = dump_to_string(view, renderer)?;
    out.write_all(text.as_bytes())?;
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        cfg::Cfg,
        ir::{BasicBlock, CmpOp, DumpOptions, Expr, InfixOp, Inst, SimpleCond, Style},
        test::diamond_cfg,
        Error,
    };

    #[test]
    fn test_diamond_dump() {
        let mut cfg = diamond_cfg();
        cfg.number_postorder();
        let text = dump_to_string(&cfg, &DumpOptions::default()).unwrap();
        let expected = "\
// Predecessors: ['entry']
// DFS#: 3
else:
$r0 += 0x2
Exits: [(None, 'exit')]

// Predecessors: []
// DFS#: 4
entry:
$r1 = *(u32*)($sp + 0x4)
Exits: [('($r1 == 0x0)', 'then'), ('($r1 != 0x0)', 'else')]

// Predecessors: ['else', 'then']
// DFS#: 1
exit:
return
Exits: []

// Predecessors: ['entry']
// DFS#: 2
then:
$r0 += 0x1
goto exit
Exits: [(None, 'exit')]
";
        assert_eq!(text, expected);
    }

    #[test]
    fn test_natural_node_order() {
        let mut cfg = Cfg::new();
        cfg.add_block(BasicBlock::new("blk10")).unwrap();
        cfg.add_block(BasicBlock::new("blk2")).unwrap();
        let cond = SimpleCond::new(Expr::addr("r1"), CmpOp::Eq, Expr::dec(0));
        cfg.add_edge("blk2", "blk10", Some(cond.into())).unwrap();
        cfg.add_edge("blk10", "blk2", None).unwrap();

        let text = dump_to_string(&cfg, &DumpOptions::default()).unwrap();
        let blk2 = text.find("blk2:").unwrap();
        let blk10 = text.find("blk10:").unwrap();
        assert!(blk2 < blk10);
        assert!(text.contains("blk2:\nExits: [('(r1 == 0)', 'blk10')]\n"));
    }

    #[test]
    fn test_predecessors_sorted_as_plain_strings() {
        let mut cfg = Cfg::new();
        for pred in ["b10", "b9", "b1"] {
            cfg.add_edge(pred, "join", None).unwrap();
        }
        let text = dump_to_string(&cfg, &DumpOptions::default()).unwrap();
        assert!(text.contains("// Predecessors: ['b1', 'b10', 'b9']\njoin:\n"));
        // node entries themselves still follow natural order
        let b9 = text.find("\nb9:\n").unwrap();
        let b10 = text.find("\nb10:\n").unwrap();
        assert!(b9 < b10);
    }

    #[test]
    fn test_placeholder_and_empty_block() {
        let mut cfg = Cfg::new();
        cfg.add_block(BasicBlock::new("empty")).unwrap();
        cfg.add_edge("empty", "missing", None).unwrap();
        let text = dump_to_string(&cfg, &DumpOptions::default()).unwrap();
        assert!(text.contains("empty:\nExits: [(None, 'missing')]\n"));
        assert!(text.contains("missing:\n    None\nExits: []\n"));
    }

    #[test]
    fn test_quoting() {
        let mut cfg = Cfg::new();
        cfg.add_edge("it's", "a\\b", None).unwrap();
        let text = dump_to_string(&cfg, &DumpOptions::default()).unwrap();
        assert!(text.contains("Exits: [(None, 'a\\\\b')]"));
        assert!(text.contains("// Predecessors: ['it\\'s']"));
    }

    #[test]
    fn test_diagnostic_style_and_omit_dead() {
        let mut cfg = Cfg::new();
        let mut dead = Inst::assign(Expr::reg("r1"), Expr::value(1));
        dead.mark_dead();
        cfg.add_block(BasicBlock::with_items(
            "b",
            vec![dead, Inst::ret().with_addr("10")],
        ))
        .unwrap();

        let opts = DumpOptions {
            style: Style::Diagnostic,
            omit_dead: true,
        };
        let text = dump_to_string(&cfg, &opts).unwrap();
        assert_eq!(text, "// Predecessors: []\nb:\n/*10*/ return([])\nExits: []\n");
    }

    #[test]
    fn test_malformed_instruction_fails_dump() {
        let mut cfg = Cfg::new();
        cfg.add_block(BasicBlock::with_items(
            "b",
            vec![Inst::infix(Expr::reg("r0"), InfixOp::Add, vec![])],
        ))
        .unwrap();
        assert!(matches!(
            dump_to_string(&cfg, &DumpOptions::default()),
            Err(Error::Malformed { .. })
        ));

        let mut sink = Vec::new();
        assert!(write_dump(&cfg, &mut sink, &DumpOptions::default()).is_err());
        assert!(sink.is_empty());
    }

    #[test]
    fn test_write_dump_matches_string() {
        let cfg = diamond_cfg();
        let mut sink = Vec::new();
        write_dump(&cfg, &mut sink, &DumpOptions::default()).unwrap();
        assert_eq!(
            String::from_utf8(sink).unwrap(),
            dump_to_string(&cfg, &DumpOptions::default()).unwrap()
        );
    }

    #[test]
    fn test_empty_graph() {
        assert_eq!(
            dump_to_string(&Cfg::new(), &DumpOptions::default()).unwrap(),
            ""
        );
    }
}

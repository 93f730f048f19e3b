//! Graphviz export.

use std::fmt::Write;

use crate::{
    cfg::graph::Cfg,
    ir::InstRenderer,
    utils::{escape_dot, graph::NodeId},
    Result,
};

fn node_name(id: NodeId) -> String {
    format!("B{}", id.index())
}

/// Generates a DOT representation of the CFG.
///
/// Node labels hold the address followed by the rendered instructions, left-aligned. The
/// entry node is filled green and nodes without successors red. Conditional edges are
/// labelled with their condition.
///
/// # Arguments
///
/// * `cfg` - The graph to export
/// * `title` - Optional title for the graph (e.g. the function name)
/// * `renderer` - Renders the instructions inside the node labels
///
/// # Returns
///
/// A string containing the DOT representation of the CFG.
///
/// # Errors
///
/// Returns the renderer's error if an instruction cannot be rendered.
///
/// # Examples
///
/// ```rust
/// use blockscope::cfg::{to_dot, Cfg};
/// use blockscope::ir::{BasicBlock, DumpOptions, Inst};
///
/// let mut cfg = Cfg::new();
/// cfg.add_block(BasicBlock::with_items("blk1", vec![Inst::ret()]))?;
/// let dot = to_dot(&cfg, Some("main"), &DumpOptions::default())?;
/// assert!(dot.starts_with("digraph CFG {"));
/// assert!(dot.contains("blk1 (entry)\\lreturn\\l"));
/// # Ok::<(), blockscope::Error>(())
/// ```
pub fn to_dot(cfg: &Cfg, title: Option<&str>, renderer: &dyn InstRenderer) -> Result<String> {
    let mut dot = String::new();

    dot.push_str("digraph CFG {\n");
    if let Some(name) = title {
        writeln!(dot, "    label=\"CFG: {}\";", escape_dot(name))?;
    }
    dot.push_str("    labelloc=t;\n");
    dot.push_str("    node [shape=box, fontname=\"Courier\", fontsize=10];\n");
    dot.push_str("    edge [fontname=\"Courier\", fontsize=9];\n\n");

    let entry = cfg.entry();
    let ids = cfg.sorted_ids();

    for &id in &ids {
        let Some(node) = cfg.node_by_id(id) else {
            continue;
        };
        let is_entry = entry == Some(node.addr.as_str());
        let is_exit = cfg.succ(&node.addr).next().is_none();

        let mut label = escape_dot(&node.addr);
        if is_entry {
            label.push_str(" (entry)");
        }
        if let Some(number) = node.dfs_number {
            write!(label, " #{number}")?;
        }
        label.push_str("\\l");

        if let Some(block) = &node.block {
            for inst in block {
                if let Some(text) = renderer.render(inst)? {
                    label.push_str(&escape_dot(&text));
                    label.push_str("\\l");
                }
            }
        }

        let style = if is_entry {
            ", style=filled, fillcolor=lightgreen"
        } else if is_exit {
            ", style=filled, fillcolor=lightcoral"
        } else {
            ""
        };
        writeln!(dot, "    {} [label=\"{label}\"{style}];", node_name(id))?;
    }

    dot.push('\n');

    for &id in &ids {
        let Some(node) = cfg.node_by_id(id) else {
            continue;
        };
        for succ in cfg.succ(&node.addr) {
            let Some(target) = cfg.node_id(succ) else {
                continue;
            };
            match cfg.edge_cond(&node.addr, succ) {
                Some(cond) => writeln!(
                    dot,
                    "    {} -> {} [label=\"{}\", color=\"darkgreen\"];",
                    node_name(id),
                    node_name(target),
                    escape_dot(&cond.to_string())
                )?,
                None => writeln!(dot, "    {} -> {};", node_name(id), node_name(target))?,
            }
        }
    }

    dot.push_str("}\n");
    Ok(dot)
}

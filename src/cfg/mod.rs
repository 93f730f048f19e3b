//! Control-flow graphs of basic blocks and their text serialization.
//!
//! - [`Cfg`] - arena container keyed by block address, with conditional edges and DFS numbers
//! - [`CfgView`] - the query contract the dump writer is generic over
//! - [`dump_cfg`], [`dump_to_string`], [`write_dump`] - deterministic text dump
//! - [`parse_dump`] - reads a canonical dump back into a [`Cfg`]
//! - [`to_dot`] - Graphviz export
//!
//! # Examples
//!
//! ```rust
//! use blockscope::cfg::{dump_to_string, parse_dump, Cfg};
//! use blockscope::ir::{BasicBlock, CmpOp, DumpOptions, Expr, Inst, SimpleCond};
//!
//! let mut cfg = Cfg::new();
//! cfg.add_block(BasicBlock::with_items("blk2", vec![Inst::assign(Expr::reg("r1"), Expr::value(0))]))?;
//! cfg.add_block(BasicBlock::with_items("blk10", vec![Inst::ret()]))?;
//! let cond = SimpleCond::new(Expr::reg("r1"), CmpOp::Eq, Expr::value(0));
//! cfg.add_edge("blk2", "blk10", Some(cond.into()))?;
//!
//! let text = dump_to_string(&cfg, &DumpOptions::default())?;
//! assert!(text.find("blk2:").unwrap() < text.find("blk10:").unwrap());
//!
//! let again = parse_dump(&text)?;
//! assert_eq!(dump_to_string(&again, &DumpOptions::default())?, text);
//! # Ok::<(), blockscope::Error>(())
//! ```

mod dot;
mod dump;
mod graph;
mod reader;

pub use dot::to_dot;
pub use dump::{dump_cfg, dump_to_string, write_dump};
pub use graph::{Cfg, CfgEdge, CfgNode, CfgView};
pub use reader::parse_dump;

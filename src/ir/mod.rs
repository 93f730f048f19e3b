//! The intermediate representation.
//!
//! Lifted code is modelled in four layers, each building on the previous one:
//!
//! - [`Expr`] - operands: registers, immediates, symbolic addresses, memory references and
//!   synthetic function references
//! - [`Cond`] - branch conditions built from comparisons and logical connectives
//! - [`Inst`] - `[dest =] op(args)` with a source address and annotations
//! - [`BasicBlock`] - an ordered instruction sequence with a single entry address
//!
//! Every item renders in two styles (see [`Style`]). The canonical style is pseudo-C and
//! can be read back with [`parse_expr`], [`parse_cond`] and [`parse_inst`]. The
//! diagnostic style exposes variant structure for debugging and is reached through the
//! `diagnostic()` adapters.
//!
//! # Examples
//!
//! ```rust
//! use blockscope::ir::{BasicBlock, CmpOp, DumpOptions, Expr, InfixOp, Inst, SimpleCond};
//!
//! let mut block = BasicBlock::new("blk1");
//! block.push(Inst::infix(Expr::reg("r1"), InfixOp::Add, vec![Expr::reg("r1"), Expr::value(4)]));
//! block.push(Inst::goto(Expr::addr("blk2")));
//!
//! let mut text = String::new();
//! block.dump(&mut text, 0, &DumpOptions::default())?;
//! assert_eq!(text, "$r1 += 0x4\ngoto blk2\n");
//!
//! let cond = SimpleCond::new(Expr::reg("r1"), CmpOp::Lt, Expr::value(16));
//! assert_eq!(cond.negate().to_string(), "($r1 >= 0x10)");
//! # Ok::<(), blockscope::Error>(())
//! ```

mod block;
mod cond;
mod expr;
mod inst;
mod op;
mod parse;
mod render;

pub use block::BasicBlock;
pub use cond::{CompoundCond, Cond, CondItem, SimpleCond};
pub use expr::{sort_exprs, Expr, ExprKind, MemRef, Radix, Value};
pub use inst::{Annotations, Arg, Inst, DEAD};
pub use op::{CmpOp, InfixOp, Logic, Opcode};
pub use parse::{parse_cond, parse_expr, parse_inst};
pub use render::{Diagnostic, DumpOptions, InstRenderer, Style};

pub(crate) use parse::{parse_cond_at, parse_inst_at};

// Copyright 2025 Johann Kempter
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![warn(missing_docs)]
#![deny(unsafe_code)]

//! # blockscope
//!
//! An intermediate representation for lifted machine code, organised as a control-flow
//! graph of basic blocks, together with a deterministic text dump of that graph.
//!
//! The dump is what a decompilation pipeline diffs between passes: for a given graph it is
//! byte-for-byte reproducible, nodes appear in natural address order (`blk2` before
//! `blk10`) and each entry lists predecessors, an optional DFS number, the instructions and
//! the conditional exits.
//!
//! ## Features
//!
//! - **Expressions** - registers, immediates with a display radix, addresses, typed memory
//!   references and synthetic function names, with a partial order over registers and
//!   memory references
//! - **Conditions** - comparisons and `&&`/`||` compounds with De Morgan negation
//! - **Instructions** - destination, operator and arguments, plus provenance and free-form
//!   annotations, rendered in canonical or diagnostic form
//! - **Control-flow graphs** - an arena keyed by block address with conditional edges and
//!   postorder numbering
//! - **Text round trip** - the canonical dump reads back into an equivalent graph
//! - **Pass pipeline** - scripts of named whole-graph and per-block transformations
//!
//! ## Quick Start
//!
//! ```rust
//! use blockscope::prelude::*;
//!
//! let mut cfg = Cfg::new();
//! cfg.add_block(BasicBlock::with_items(
//!     "blk2",
//!     vec![Inst::assign(Expr::reg("r1"), Expr::mem("u32", Expr::reg("sp"), 8))],
//! ))?;
//! cfg.add_block(BasicBlock::with_items("blk10", vec![Inst::ret()]))?;
//! let cond = SimpleCond::new(Expr::reg("r1"), CmpOp::Eq, Expr::value(0));
//! cfg.add_edge("blk2", "blk10", Some(cond.into()))?;
//!
//! let text = dump_to_string(&cfg, &DumpOptions::default())?;
//! assert_eq!(
//!     text,
//!     "// Predecessors: []\n\
//!      blk2:\n\
//!      $r1 = *(u32*)($sp + 0x8)\n\
//!      Exits: [('($r1 == 0x0)', 'blk10')]\n\
//!      \n\
//!      // Predecessors: ['blk2']\n\
//!      blk10:\n\
//!      return\n\
//!      Exits: []\n"
//! );
//! # Ok::<(), blockscope::Error>(())
//! ```
//!
//! ## Architecture
//!
//! - [`ir`] - expressions, conditions, instructions, basic blocks, renderers and the text
//!   reader for single items
//! - [`cfg`] - the graph container, the dump writer and reader, and DOT export
//! - [`pipeline`] - pass traits, the registry, pass scripts and the runner
//! - [`utils`] - natural ordering, DOT escaping and the generic directed graph
//! - [`prelude`] - convenient re-exports of commonly used types
//! - [`Error`] and [`Result`] - error handling
//!
//! ## Error Handling
//!
//! The IR trusts its producers. When an invariant turns out to be broken (an infix
//! instruction with one argument, a compound condition that does not alternate, an order
//! requested between a register and a constant) the operation returns an [`Error`] and the
//! caller is expected to abort the run. Nothing is repaired silently.

#[macro_use]
pub(crate) mod error;

/// Shared functionality which is used in unit tests
#[cfg(test)]
pub(crate) mod test;

/// Convenient re-exports of the most commonly used types and traits.
///
/// # Example
///
/// ```rust
/// use blockscope::prelude::*;
///
/// let inst = Inst::infix(Expr::reg("r0"), InfixOp::Add, vec![Expr::reg("r0"), Expr::value(1)]);
/// assert_eq!(inst.to_canonical()?, "$r0 += 0x1");
/// # Ok::<(), blockscope::Error>(())
/// ```
pub mod prelude;

pub mod cfg;
pub mod ir;
pub mod pipeline;
pub mod utils;

/// A type alias for [`std::result::Result<T, Error>`] where the error type is always [`Error`].
/// This is used consistently throughout the crate for all fallible operations.
pub type Result<T> = std::result::Result<T, Error>;

/// `blockscope` Error type
///
/// The main error type for all operations in this crate.
///
/// # Examples
///
/// ```rust
/// use blockscope::{ir::{Expr, sort_exprs}, Error};
///
/// let mut exprs = vec![Expr::reg("r1"), Expr::value(3)];
/// match sort_exprs(&mut exprs) {
///     Err(Error::Unordered { left, right }) => println!("cannot order {left} and {right}"),
///     Err(e) => println!("Error: {e}"),
///     Ok(()) => println!("sorted"),
/// }
/// ```
pub use error::Error;

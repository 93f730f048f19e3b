//! # blockscope Prelude
//!
//! This module provides a convenient prelude for the most commonly used types and traits
//! from the blockscope library.

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The main error type for all blockscope operations
pub use crate::Error;

/// The result type used throughout blockscope
pub use crate::Result;

// ================================================================================================
// Intermediate Representation
// ================================================================================================

/// Expressions and their ordering
pub use crate::ir::{sort_exprs, Expr, ExprKind, MemRef, Radix, Value};

/// Conditions
pub use crate::ir::{CmpOp, CompoundCond, Cond, CondItem, Logic, SimpleCond};

/// Instructions and blocks
pub use crate::ir::{Arg, BasicBlock, InfixOp, Inst, Opcode};

/// Rendering
pub use crate::ir::{DumpOptions, InstRenderer, Style};

// ================================================================================================
// Control-Flow Graphs
// ================================================================================================

/// The graph container and its query contract
pub use crate::cfg::{Cfg, CfgView};

/// Dump writer, reader and DOT export
pub use crate::cfg::{dump_cfg, dump_to_string, parse_dump, to_dot, write_dump};

// ================================================================================================
// Pipeline
// ================================================================================================

/// Pass traits, registry, scripts and the runner
pub use crate::pipeline::{BlockPass, Pass, PassRegistry, Pipeline, PipelineConfig, Script};

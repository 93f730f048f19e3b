//! Transformation pipeline.
//!
//! Passes are looked up by name in a [`PassRegistry`] and run in the order a [`Script`]
//! lists them. Every name is resolved before the first pass runs, and the first failing
//! pass aborts the run.
//!
//! # Examples
//!
//! ```rust
//! use blockscope::cfg::{parse_dump, dump_to_string};
//! use blockscope::ir::DumpOptions;
//! use blockscope::pipeline::{PassRegistry, Pipeline, PipelineConfig, Script};
//!
//! let mut cfg = parse_dump("// Predecessors: []\nblk1:\ngoto blk2\nExits: [(None, 'blk2')]\n")?;
//!
//! let registry = PassRegistry::with_builtins();
//! let script = Script::parse("xform_bblock: remove_trailing_jumps\nxform: number_postorder\n")?;
//! Pipeline::from_script(&script, &registry, PipelineConfig::default())?.run(&mut cfg)?;
//!
//! let text = dump_to_string(&cfg, &DumpOptions::default())?;
//! assert!(text.starts_with("// Predecessors: []\n// DFS#: 2\nblk1:\nExits:"));
//! # Ok::<(), blockscope::Error>(())
//! ```

mod builtin;
mod config;
mod pass;
mod registry;
mod runner;
mod script;

pub use builtin::{NumberPostorderPass, RemoveDeadPass, RemoveTrailingJumpsPass};
pub use config::PipelineConfig;
pub use pass::{BlockPass, Pass};
pub use registry::{PassInfo, PassRegistry};
pub use runner::Pipeline;
pub use script::{PassKind, Script, Step};

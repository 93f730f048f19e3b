use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// blockscope - re-render and transform control-flow graph dumps
#[derive(Debug, Parser)]
#[command(name = "blockscope", version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOptions,

    #[command(subcommand)]
    pub command: Command,
}

/// Options shared across all subcommands.
#[derive(Debug, Parser)]
pub struct GlobalOptions {
    /// Emit output as JSON instead of human-readable text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Enable verbose (debug-level) logging output.
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Read a CFG dump, optionally run a pass script over it, and write it out again.
    Dump {
        /// Path to the dump file.
        #[arg(value_name = "FILE")]
        path: PathBuf,

        /// Render instructions in the diagnostic form instead of the canonical one.
        #[arg(long)]
        repr: bool,

        /// Leave out instructions annotated as dead.
        #[arg(long)]
        no_dead: bool,

        /// Pass script to apply before rendering.
        #[arg(long, value_name = "FILE")]
        script: Option<PathBuf>,

        /// Apply the script up to this many times, stopping once nothing changes.
        #[arg(long, default_value_t = 1)]
        iterations: usize,

        /// Write the dump here instead of stdout.
        #[arg(short, long, value_name = "OUT")]
        output: Option<PathBuf>,

        /// Also write a Graphviz rendering of the graph.
        #[arg(long, value_name = "OUT")]
        dot: Option<PathBuf>,
    },

    /// List the transformations a pass script can use.
    Passes,
}

use std::path::Path;

use anyhow::Context;
use blockscope::{
    cfg::{dump_to_string, to_dot},
    ir::{DumpOptions, Style},
    pipeline::{PassRegistry, Pipeline, PipelineConfig},
};
use log::info;
use serde::Serialize;

use crate::{
    app::GlobalOptions,
    commands::common::{load_dump, load_script},
    output::{print_output, write_atomic},
};

/// Options of the `dump` subcommand.
pub struct DumpArgs<'a> {
    pub repr: bool,
    pub no_dead: bool,
    pub script: Option<&'a Path>,
    pub iterations: usize,
    pub output: Option<&'a Path>,
    pub dot: Option<&'a Path>,
}

#[derive(Debug, Serialize)]
struct DumpSummary {
    nodes: usize,
    edges: usize,
    steps: usize,
    changed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    output: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    dot: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    dump: Option<String>,
}

pub fn run(path: &Path, args: &DumpArgs<'_>, opts: &GlobalOptions) -> anyhow::Result<()> {
    let mut cfg = load_dump(path)?;

    // Resolve the whole script before anything runs
    let registry = PassRegistry::with_builtins();
    let script = args.script.map(load_script).transpose()?.unwrap_or_default();
    let config = PipelineConfig::default().with_max_iterations(args.iterations);
    let pipeline = Pipeline::from_script(&script, &registry, config)?;

    let changed = pipeline.run(&mut cfg).context("pass pipeline failed")?;
    if !pipeline.is_empty() {
        info!("Applied {} steps, changed={changed}", pipeline.len());
    }

    let options = DumpOptions {
        style: if args.repr {
            Style::Diagnostic
        } else {
            Style::Canonical
        },
        omit_dead: args.no_dead,
    };
    let text = dump_to_string(&cfg, &options).context("failed to render dump")?;
    let dot_text = match args.dot {
        Some(_) => {
            let title = path.file_stem().and_then(|s| s.to_str());
            Some(to_dot(&cfg, title, &options).context("failed to render DOT")?)
        }
        None => None,
    };

    // Nothing is written until every rendering succeeded
    if let Some(out) = args.output {
        write_atomic(out, &text)?;
    }
    if let (Some(out), Some(dot)) = (args.dot, &dot_text) {
        write_atomic(out, dot)?;
    }

    let summary = DumpSummary {
        nodes: cfg.node_count(),
        edges: cfg.edge_count(),
        steps: pipeline.len(),
        changed,
        output: args.output.map(|p| p.display().to_string()),
        dot: args.dot.map(|p| p.display().to_string()),
        dump: args.output.is_none().then_some(text),
    };

    print_output(&summary, opts, |s| {
        if let Some(dump) = &s.dump {
            print!("{dump}");
        }
        if let Some(out) = &s.output {
            eprintln!("Wrote {} nodes, {} edges to {out}", s.nodes, s.edges);
        }
        if let Some(dot) = &s.dot {
            eprintln!("Wrote DOT graph to {dot}");
        }
    })
}

mod app;
mod commands;
mod output;

use clap::Parser;

use crate::app::{Cli, Command};

fn main() -> anyhow::Result<()> {
    ctrlc::set_handler(|| {
        eprintln!("\nCancelled.");
        std::process::exit(130);
    })
    .expect("failed to set Ctrl+C handler");

    let cli = Cli::parse();

    // Show blockscope info+ on stderr; --verbose enables debug; RUST_LOG overrides
    let level = if cli.global.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    env_logger::Builder::new()
        .filter_module("blockscope", level)
        .parse_default_env()
        .target(env_logger::Target::Stderr)
        .format_timestamp(None)
        .format_module_path(false)
        .format_target(false)
        .init();

    match &cli.command {
        Command::Dump {
            path,
            repr,
            no_dead,
            script,
            iterations,
            output,
            dot,
        } => commands::dump::run(
            path,
            &commands::dump::DumpArgs {
                repr: *repr,
                no_dead: *no_dead,
                script: script.as_deref(),
                iterations: *iterations,
                output: output.as_deref(),
                dot: dot.as_deref(),
            },
            &cli.global,
        ),
        Command::Passes => commands::passes::run(&cli.global),
    }
}

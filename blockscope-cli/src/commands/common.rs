use std::path::Path;

use anyhow::Context;
use blockscope::{cfg::Cfg, cfg::parse_dump, pipeline::Script};

/// Read and parse a CFG dump file.
pub fn load_dump(path: &Path) -> anyhow::Result<Cfg> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read dump: {}", path.display()))?;
    parse_dump(&text).with_context(|| format!("failed to parse dump: {}", path.display()))
}

/// Read and parse a pass script.
pub fn load_script(path: &Path) -> anyhow::Result<Script> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read script: {}", path.display()))?;
    Script::parse(&text).with_context(|| format!("failed to parse script: {}", path.display()))
}

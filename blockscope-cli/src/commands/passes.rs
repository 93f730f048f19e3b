use blockscope::pipeline::PassRegistry;
use serde::Serialize;

use crate::{
    app::GlobalOptions,
    output::{print_output, Align, TabWriter},
};

#[derive(Debug, Serialize)]
struct PassEntry {
    keyword: &'static str,
    name: &'static str,
    description: &'static str,
}

pub fn run(opts: &GlobalOptions) -> anyhow::Result<()> {
    let entries: Vec<PassEntry> = PassRegistry::with_builtins()
        .passes()
        .into_iter()
        .map(|info| PassEntry {
            keyword: info.kind.into(),
            name: info.name,
            description: info.description,
        })
        .collect();

    print_output(&entries, opts, |entries| {
        let mut table = TabWriter::new(vec![
            ("Keyword", Align::Left),
            ("Name", Align::Left),
            ("Description", Align::Left),
        ]);
        for entry in entries {
            table.row(vec![
                entry.keyword.to_string(),
                entry.name.to_string(),
                entry.description.to_string(),
            ]);
        }
        table.print();
    })
}

use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use shici_index::CanonicalIndex;
use shici_markup::{Dump, HtmlTreeAdapter, LoadMode, RenderedEntry};

fn main() -> Result<()> {
    let mut args = env::args().skip(1);
    let normalized = args.next().map(PathBuf::from).context(
        "usage: cargo run -p shici-index --example lookup -- <dumped_dict.html> <key>...",
    )?;
    let keys: Vec<String> = args.collect();
    if keys.is_empty() {
        bail!("usage: cargo run -p shici-index --example lookup -- <dumped_dict.html> <key>...");
    }

    let dump = Dump::load_with_mode(&normalized, LoadMode::Mmap)
        .with_context(|| format!("loading normalized dump from {}", normalized.display()))?;
    let mut rendered = Vec::new();
    for raw in dump.entries()? {
        let entry = RenderedEntry::parse(&HtmlTreeAdapter, raw.markup)
            .with_context(|| format!("reading entry `{}`", raw.search_key))?;
        rendered.push((raw.search_key.to_string(), entry));
    }
    let index = CanonicalIndex::build(rendered)?;

    println!("Normalized dump: {}", normalized.display());
    println!(
        "{} entries, {} search keys, {} link lists",
        index.entry_count(),
        index.alias_count(),
        index.orphan_count()
    );

    for key in keys {
        println!("\nKey: {}", key);
        match index.resolve(&key) {
            Some(primary) => println!("  primary: {}", primary),
            None if index.orphan(&key).is_some() => println!("  link list"),
            None => {
                println!("  not found");
                continue;
            }
        }
        if let Some(entry) = index.lookup(&key) {
            println!("{}", entry.markup);
        }
    }

    Ok(())
}

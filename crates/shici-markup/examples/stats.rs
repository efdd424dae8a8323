use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};
use shici_markup::{Dump, HtmlTreeAdapter, LoadMode, TreeAdapter, normalize};
use shici_types::Content;

fn main() -> Result<()> {
    let dump_path = env::args()
        .nth(1)
        .map(PathBuf::from)
        .context("usage: cargo run -p shici-markup --example stats -- <path-to-dump>")?;

    let dump = Dump::load_with_mode(&dump_path, LoadMode::Mmap)
        .with_context(|| format!("loading dump from {}", dump_path.display()))?;
    let entries = dump.entries()?;

    let mut definitions = 0usize;
    let mut link_lists = 0usize;
    let mut with_subtitle = 0usize;
    let mut list_items = 0usize;
    let mut spans = 0usize;
    let mut failures = 0usize;

    for raw in &entries {
        let root = match HtmlTreeAdapter.parse(raw.markup) {
            Ok(root) => root,
            Err(err) => {
                println!("{}: {err}", raw.search_key);
                failures += 1;
                continue;
            }
        };
        let entry = match normalize(root, raw.search_key) {
            Ok(entry) => entry,
            Err(err) => {
                println!("{err}");
                failures += 1;
                continue;
            }
        };
        if entry.subtitle.is_some() {
            with_subtitle += 1;
        }
        match &entry.content {
            Content::Links(_) => link_lists += 1,
            Content::Definition(body) => {
                definitions += 1;
                list_items += body.items.len();
                spans += body.spans.len()
                    + body.items.iter().map(|i| i.spans.len()).sum::<usize>();
            }
        }
    }

    println!("Dump: {}", dump_path.display());
    println!("Records       : {}", entries.len());
    println!("Definitions   : {}", definitions);
    println!("  with subtitle: {}", with_subtitle);
    println!("Link lists    : {}", link_lists);
    println!("List items    : {}", list_items);
    println!("Spans         : {}", spans);
    println!("Failures      : {}", failures);

    Ok(())
}

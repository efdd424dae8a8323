//! Output files. Existing files are overwritten.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use shici_index::CanonicalIndex;
use shici_markup::{Markup, format_record};

pub const NORMALIZED_DUMP: &str = "dumped_dict.html";
pub const UNIQUE_ENTRIES: &str = "unique_entries.html";
pub const SEARCH_KEYS: &str = "search_keys.tsv";
pub const LIST_ENTRIES: &str = "list_entries.html";

/// Paths of the three index files under one directory.
#[derive(Clone, Debug)]
pub struct IndexFiles {
    pub unique_entries: PathBuf,
    pub search_keys: PathBuf,
    pub list_entries: PathBuf,
}

impl IndexFiles {
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            unique_entries: dir.join(UNIQUE_ENTRIES),
            search_keys: dir.join(SEARCH_KEYS),
            list_entries: dir.join(LIST_ENTRIES),
        }
    }
}

/// Write `</>` records in the order given. Returns the record count.
pub fn write_records<'a, M, I>(path: &Path, records: I) -> Result<usize>
where
    M: Markup + 'a,
    I: IntoIterator<Item = (&'a str, &'a M)>,
{
    let mut out = create(path)?;
    let mut count = 0;
    for (key, entry) in records {
        out.write_all(format_record(key, &entry.markup()).as_bytes())
            .with_context(|| format!("write {}", path.display()))?;
        count += 1;
    }
    out.flush()
        .with_context(|| format!("flush {}", path.display()))?;
    Ok(count)
}

/// One `search_key\tprimary_key` line per pair.
pub fn write_search_keys<'a, I>(path: &Path, pairs: I) -> Result<usize>
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let mut out = create(path)?;
    let mut count = 0;
    for (search_key, primary_key) in pairs {
        writeln!(out, "{search_key}\t{primary_key}")
            .with_context(|| format!("write {}", path.display()))?;
        count += 1;
    }
    out.flush()
        .with_context(|| format!("flush {}", path.display()))?;
    Ok(count)
}

/// Write the three index files, each sorted by key.
pub fn write_index<E: Markup>(dir: &Path, index: &CanonicalIndex<E>) -> Result<IndexFiles> {
    fs::create_dir_all(dir).with_context(|| format!("create {}", dir.display()))?;
    let files = IndexFiles::in_dir(dir);
    write_records(&files.unique_entries, index.sorted_entries())?;
    write_search_keys(&files.search_keys, index.sorted_aliases())?;
    write_records(&files.list_entries, index.sorted_orphans())?;
    Ok(files)
}

fn create(path: &Path) -> Result<BufWriter<File>> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
    }
    let file = File::create(path).with_context(|| format!("create {}", path.display()))?;
    Ok(BufWriter::new(file))
}

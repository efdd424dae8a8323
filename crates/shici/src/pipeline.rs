//! The two batch stages: normalize a raw dump, then index normalized entries.

use anyhow::{Context, Result};
use shici_index::{CanonicalIndex, build_index};
use shici_markup::{
    Dump, HtmlTreeAdapter, NormalizeError, RenderedEntry, TreeAdapter, TreeError, normalize,
};
use shici_types::{NormalizedEntry, RawEntry};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::skip::SkipList;

/// Failure of a single record.
#[derive(Debug, Error)]
pub enum EntryError {
    #[error("entry `{search_key}`: {source}")]
    Parse {
        search_key: String,
        #[source]
        source: TreeError,
    },
    #[error(transparent)]
    Normalize(#[from] NormalizeError),
}

/// Result of the normalize stage. Entries keep input order.
#[derive(Debug, Default)]
pub struct Normalized {
    pub entries: Vec<(String, NormalizedEntry)>,
    pub skipped: usize,
    pub failed: usize,
}

/// Normalize every raw record not named in `skip`.
///
/// The first malformed record aborts the batch unless `keep_going` is set,
/// in which case it is logged and counted in [`Normalized::failed`].
pub fn normalize_entries<'a, I>(raw: I, skip: &SkipList, keep_going: bool) -> Result<Normalized>
where
    I: IntoIterator<Item = RawEntry<'a>>,
{
    let adapter = HtmlTreeAdapter;
    let mut out = Normalized::default();
    for entry in raw {
        if skip.contains(entry.search_key) {
            debug!(key = entry.search_key, "skip-listed");
            out.skipped += 1;
            continue;
        }
        match normalize_one(&adapter, &entry) {
            Ok(normalized) => out
                .entries
                .push((entry.search_key.to_string(), normalized)),
            Err(err) if keep_going => {
                warn!(key = entry.search_key, error = %err, "skipping malformed entry");
                out.failed += 1;
            }
            Err(err) => return Err(err.into()),
        }
    }
    info!(
        normalized = out.entries.len(),
        skipped = out.skipped,
        failed = out.failed,
        "dump normalized"
    );
    Ok(out)
}

/// Convenience over [`normalize_entries`] for a loaded dump.
pub fn normalize_dump(dump: &Dump, skip: &SkipList, keep_going: bool) -> Result<Normalized> {
    normalize_entries(dump.entries()?, skip, keep_going)
}

pub fn normalize_one(
    adapter: &impl TreeAdapter,
    raw: &RawEntry<'_>,
) -> Result<NormalizedEntry, EntryError> {
    let root = adapter.parse(raw.markup).map_err(|source| EntryError::Parse {
        search_key: raw.search_key.to_string(),
        source,
    })?;
    Ok(normalize(root, raw.search_key)?)
}

/// Read a normalized dump back, in file order.
pub fn read_normalized(dump: &Dump) -> Result<Vec<(String, RenderedEntry)>> {
    let adapter = HtmlTreeAdapter;
    dump.entries()?
        .into_iter()
        .map(|raw| {
            let entry = RenderedEntry::parse(&adapter, raw.markup)
                .with_context(|| format!("reading normalized entry `{}`", raw.search_key))?;
            Ok((raw.search_key.to_string(), entry))
        })
        .collect()
}

/// Index stage over entries read back from a normalized dump.
pub fn index_normalized(dump: &Dump) -> Result<CanonicalIndex<RenderedEntry>> {
    let entries = read_normalized(dump)?;
    Ok(build_index(entries)?)
}

/// Index stage over the in-memory result of [`normalize_entries`].
///
/// The index borrows the entry bodies from `normalized`, in input order.
pub fn index_entries(normalized: &Normalized) -> Result<CanonicalIndex<&NormalizedEntry>> {
    let entries = normalized
        .entries
        .iter()
        .map(|(key, entry)| (key.clone(), entry));
    Ok(build_index(entries)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use shici_markup::ErrorKind;

    const DUMP: &str = "甲\n<div><font size=\"6\">甲</font>释义。</div>\n</>\n\
                        壞\n<div>无标题</div>\n</>\n\
                        乙\n<div><font size=\"6\">乙</font>又释义。</div>\n</>\n";

    #[test]
    fn first_malformed_entry_aborts() {
        let dump = Dump::from_text(DUMP);
        let err = normalize_dump(&dump, &SkipList::default(), false).unwrap_err();
        let entry_err = err.downcast_ref::<EntryError>().unwrap();
        match entry_err {
            EntryError::Normalize(e) => {
                assert_eq!(e.search_key, "壞");
                assert_eq!(e.kind, ErrorKind::MissingTitle);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn keep_going_counts_failures() {
        let dump = Dump::from_text(DUMP);
        let out = normalize_dump(&dump, &SkipList::default(), true).unwrap();
        let keys: Vec<&str> = out.entries.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["甲", "乙"]);
        assert_eq!(out.failed, 1);
        assert_eq!(out.skipped, 0);
    }

    #[test]
    fn skip_listed_entries_are_never_parsed() {
        let dump = Dump::from_text(DUMP);
        let skip: SkipList = ["壞"].into_iter().collect();
        let out = normalize_dump(&dump, &skip, false).unwrap();
        assert_eq!(out.entries.len(), 2);
        assert_eq!(out.skipped, 1);
        assert_eq!(out.failed, 0);
    }

    #[test]
    fn markup_without_element_reports_key() {
        let raw = RawEntry {
            search_key: "空",
            markup: "",
        };
        let err = normalize_one(&HtmlTreeAdapter, &raw).unwrap_err();
        assert!(matches!(err, EntryError::Parse { ref search_key, .. } if search_key == "空"));
    }
}

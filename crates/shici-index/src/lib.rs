//! Canonical headword index over normalized entries.
//!
//! Entries are keyed by their title (the primary key). Subtitle variants
//! become aliases of that key, and entries without a title are kept apart as
//! orphans under their original search key. The crate only depends on the
//! [`Headword`] trait, so it indexes in-memory [`NormalizedEntry`] values and
//! entries read back from a normalized dump alike.
//!
//! # How it works
//! 1. Titled entry: `entries[title] = body`, `aliases[title] = title`.
//! 2. Untitled entry: `orphans[search_key] = body`.
//! 3. Subtitle: split on U+3000, `aliases[variant] = title`. A later entry
//!    overwrites an earlier variant mapping; a variant never takes over a key
//!    that is already a primary key.
//!
//! # Example
//! ```
//! use shici_index::CanonicalIndex;
//! use shici_types::{Content, DefinitionBody, NormalizedEntry};
//!
//! let entry = NormalizedEntry {
//!     title: Some("乙".into()),
//!     subtitle: Some("丙\u{3000}丁".into()),
//!     content: Content::Definition(DefinitionBody::default()),
//! };
//! let index = CanonicalIndex::build(vec![("乙".to_string(), entry)]).unwrap();
//! assert_eq!(index.resolve("丁"), Some("乙"));
//! assert!(index.lookup("丙").is_some());
//! ```
//!
//! [`NormalizedEntry`]: shici_types::NormalizedEntry

use std::collections::HashMap;

use shici_types::Headword;
use thiserror::Error;
use tracing::{info, warn};

/// Separator between variant headwords in a subtitle.
pub const VARIANT_SEPARATOR: char = '\u{3000}';

#[derive(Debug, Error, Eq, PartialEq)]
pub enum IndexError {
    #[error("entry `{search_key}` has a title without text")]
    MissingPrimaryKeyText { search_key: String },
    #[error("entry `{search_key}` ({primary_key}) has an empty variant in subtitle {subtitle:?}")]
    MalformedAlias {
        search_key: String,
        primary_key: String,
        subtitle: String,
    },
}

/// Primary entries, alias resolution and orphan cross-reference lists.
#[derive(Clone, Debug)]
pub struct CanonicalIndex<E> {
    entries: HashMap<String, E>,
    aliases: HashMap<String, String>,
    orphans: HashMap<String, E>,
}

impl<E> Default for CanonicalIndex<E> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
            aliases: HashMap::new(),
            orphans: HashMap::new(),
        }
    }
}

impl<E: Headword> CanonicalIndex<E> {
    /// Index `(search_key, entry)` pairs in input order.
    ///
    /// Input order decides which entry wins when two subtitles declare the
    /// same variant.
    pub fn build<I>(entries: I) -> Result<Self, IndexError>
    where
        I: IntoIterator<Item = (String, E)>,
    {
        let mut index = Self::default();
        for (search_key, entry) in entries {
            index.insert(search_key, entry)?;
        }
        info!(
            entries = index.entries.len(),
            aliases = index.aliases.len(),
            orphans = index.orphans.len(),
            "canonical index built"
        );
        Ok(index)
    }

    /// Upsert one entry. Errors leave the index unchanged.
    ///
    /// Variant mappings are last-write-wins with one exception: a variant
    /// never replaces the self-mapping of a key that is already a primary
    /// key, so `resolve(pk) == Some(pk)` holds for every entry.
    pub fn insert(&mut self, search_key: String, entry: E) -> Result<(), IndexError> {
        let Some(title) = entry.title() else {
            self.orphans.insert(search_key, entry);
            return Ok(());
        };
        if title.is_empty() {
            return Err(IndexError::MissingPrimaryKeyText { search_key });
        }
        let primary_key = title.to_string();

        let variants: Vec<String> = match entry.subtitle() {
            Some(subtitle) => {
                let variants: Vec<&str> = split_variants(subtitle).collect();
                if variants.iter().any(|v| v.is_empty()) {
                    return Err(IndexError::MalformedAlias {
                        search_key,
                        primary_key,
                        subtitle: subtitle.to_string(),
                    });
                }
                variants.into_iter().map(str::to_string).collect()
            }
            None => Vec::new(),
        };

        if self.entries.insert(primary_key.clone(), entry).is_some() {
            warn!(primary_key, search_key, "duplicate primary key, keeping later entry");
        }
        if let Some(prev) = self.aliases.insert(primary_key.clone(), primary_key.clone())
            && prev != primary_key
        {
            warn!(key = primary_key, previous = prev, "variant key reclaimed by its own entry");
        }

        for variant in variants {
            if variant != primary_key && self.entries.contains_key(&variant) {
                warn!(
                    variant,
                    primary_key, "variant names another primary entry, keeping its own mapping"
                );
                continue;
            }
            if let Some(prev) = self.aliases.insert(variant.clone(), primary_key.clone())
                && prev != primary_key
            {
                warn!(variant, previous = prev, primary_key, "variant remapped by later entry");
            }
        }
        Ok(())
    }
}

impl<E> CanonicalIndex<E> {
    /// Primary key for any search key.
    pub fn resolve(&self, key: &str) -> Option<&str> {
        self.aliases.get(key).map(String::as_str)
    }

    /// Entry body for a search key: aliases first, then orphans by raw key.
    pub fn lookup(&self, key: &str) -> Option<&E> {
        self.resolve(key)
            .and_then(|primary| self.entries.get(primary))
            .or_else(|| self.orphans.get(key))
    }

    pub fn entry(&self, primary_key: &str) -> Option<&E> {
        self.entries.get(primary_key)
    }

    pub fn orphan(&self, search_key: &str) -> Option<&E> {
        self.orphans.get(search_key)
    }

    pub fn entries(&self) -> &HashMap<String, E> {
        &self.entries
    }

    pub fn aliases(&self) -> &HashMap<String, String> {
        &self.aliases
    }

    pub fn orphans(&self) -> &HashMap<String, E> {
        &self.orphans
    }

    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    pub fn alias_count(&self) -> usize {
        self.aliases.len()
    }

    pub fn orphan_count(&self) -> usize {
        self.orphans.len()
    }

    /// Primary entries sorted by key.
    pub fn sorted_entries(&self) -> Vec<(&str, &E)> {
        sorted(&self.entries)
    }

    /// `(search_key, primary_key)` pairs sorted by search key.
    pub fn sorted_aliases(&self) -> Vec<(&str, &str)> {
        let mut pairs: Vec<(&str, &str)> = self
            .aliases
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        pairs.sort_unstable();
        pairs
    }

    /// Orphans sorted by search key.
    pub fn sorted_orphans(&self) -> Vec<(&str, &E)> {
        sorted(&self.orphans)
    }
}

/// Index entries in input order. See [`CanonicalIndex::build`].
pub fn build_index<E, I>(entries: I) -> Result<CanonicalIndex<E>, IndexError>
where
    E: Headword,
    I: IntoIterator<Item = (String, E)>,
{
    CanonicalIndex::build(entries)
}

/// Variant keys of a subtitle, empty pieces included.
pub fn split_variants(subtitle: &str) -> impl Iterator<Item = &str> {
    subtitle.split(VARIANT_SEPARATOR)
}

fn sorted<E>(map: &HashMap<String, E>) -> Vec<(&str, &E)> {
    let mut pairs: Vec<(&str, &E)> = map.iter().map(|(k, v)| (k.as_str(), v)).collect();
    pairs.sort_unstable_by(|a, b| a.0.cmp(b.0));
    pairs
}

use std::fs;
use std::path::{Path, PathBuf};

use shici::{
    LIST_ENTRIES, NORMALIZED_DUMP, Normalized, SEARCH_KEYS, SkipList, UNIQUE_ENTRIES,
    index_entries, index_normalized, normalize_dump, write_index, write_records,
};
use shici_markup::{Dump, LoadMode, split_records};
use shici_types::{Content, Headword};

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn load(name: &str) -> Dump {
    Dump::load_with_mode(fixture(name), LoadMode::Owned).unwrap()
}

fn skip() -> SkipList {
    SkipList::load(fixture("skip.txt")).unwrap()
}

fn normalized() -> Normalized {
    normalize_dump(&load("dump.txt"), &skip(), false).unwrap()
}

fn keys_of(path: &Path) -> Vec<String> {
    let text = fs::read_to_string(path).unwrap();
    split_records(&text)
        .map(|r| r.search_key.to_string())
        .collect()
}

#[test]
fn skip_listed_record_never_reaches_the_normalizer() {
    let dump = load("dump.txt");
    // `凝` has no title and would fail normalization if it were parsed.
    assert!(normalize_dump(&dump, &SkipList::default(), false).is_err());

    let out = normalize_dump(&dump, &skip(), false).unwrap();
    assert_eq!(out.skipped, 1);
    assert_eq!(out.failed, 0);
    let keys: Vec<&str> = out.entries.iter().map(|(k, _)| k.as_str()).collect();
    assert_eq!(keys, vec!["乙", "甲", "見甲", "己"]);
}

#[test]
fn keep_going_skips_malformed_records() {
    let dump = load("malformed.txt");
    let err = normalize_dump(&dump, &SkipList::default(), false).unwrap_err();
    assert!(err.to_string().contains("壞"));

    let out = normalize_dump(&dump, &SkipList::default(), true).unwrap();
    assert_eq!(out.failed, 2);
    assert_eq!(out.entries.len(), 1);
    assert_eq!(out.entries[0].0, "甲");
}

#[test]
fn later_subtitle_takes_shared_variant() {
    let normalized = normalized();
    let index = index_entries(&normalized).unwrap();
    assert_eq!(index.entry_count(), 3);
    assert_eq!(index.resolve("乙"), Some("乙"));
    assert_eq!(index.resolve("丙"), Some("乙"));
    assert_eq!(index.resolve("丁"), Some("己"));
    assert_eq!(index.resolve("己"), Some("己"));
    assert_eq!(index.resolve("甲"), Some("甲"));
}

#[test]
fn link_entry_becomes_an_orphan() {
    let normalized = normalized();
    let index = index_entries(&normalized).unwrap();
    assert_eq!(index.orphan_count(), 1);
    let orphan = index.orphan("見甲").unwrap();
    assert!(orphan.title().is_none());
    match &orphan.content {
        Content::Links(links) => assert_eq!(links.len(), 2),
        other => panic!("expected link list, got {other:?}"),
    }
    assert_eq!(index.resolve("見甲"), None);
}

#[test]
fn outputs_are_sorted_by_key() {
    let dir = tempfile::tempdir().unwrap();
    let normalized = normalized();
    let index = index_entries(&normalized).unwrap();
    write_index(dir.path(), &index).unwrap();

    let unique = keys_of(&dir.path().join(UNIQUE_ENTRIES));
    let mut sorted = unique.clone();
    sorted.sort();
    assert_eq!(unique, sorted);
    assert_eq!(unique.len(), 3);

    assert_eq!(
        fs::read_to_string(dir.path().join(SEARCH_KEYS)).unwrap(),
        "丁\t己\n丙\t乙\n乙\t乙\n己\t己\n甲\t甲\n"
    );

    let lists = fs::read_to_string(dir.path().join(LIST_ENTRIES)).unwrap();
    assert!(lists.starts_with("見甲\n<div class=\"entry\">"));
    assert!(lists.contains("<a href=\"entry://甲\">甲</a>"));
}

fn assert_two_stage_matches(dir: &Path, normalized: &Normalized) {
    let index = index_entries(normalized).unwrap();

    let normalized_path = dir.join(NORMALIZED_DUMP);
    write_records(
        &normalized_path,
        normalized.entries.iter().map(|(k, e)| (k.as_str(), e)),
    )
    .unwrap();

    let reread = index_normalized(&Dump::load(&normalized_path).unwrap()).unwrap();
    assert_eq!(reread.sorted_aliases(), index.sorted_aliases());
    assert_eq!(reread.entry_count(), index.entry_count());
    assert_eq!(reread.orphan_count(), index.orphan_count());

    let in_memory = dir.join("memory");
    let two_stage = dir.join("two-stage");
    write_index(&in_memory, &index).unwrap();
    write_index(&two_stage, &reread).unwrap();
    for name in [UNIQUE_ENTRIES, SEARCH_KEYS, LIST_ENTRIES] {
        assert_eq!(
            fs::read_to_string(in_memory.join(name)).unwrap(),
            fs::read_to_string(two_stage.join(name)).unwrap(),
            "{name} differs"
        );
    }
}

#[test]
fn two_stage_run_matches_in_memory_build() {
    let dir = tempfile::tempdir().unwrap();
    let normalized = normalized();
    assert_two_stage_matches(dir.path(), &normalized);
    assert_eq!(
        keys_of(&dir.path().join(NORMALIZED_DUMP)),
        vec!["乙", "甲", "見甲", "己"]
    );
}

#[test]
fn title_marker_inside_a_link_stays_an_orphan() {
    let dir = tempfile::tempdir().unwrap();
    let dump = Dump::from_text(
        "見\n<div><a href=\"entry://甲\"><font size=\"6\">甲</font></a></div>\n</>\n",
    );
    let normalized = normalize_dump(&dump, &SkipList::default(), false).unwrap();
    assert_two_stage_matches(dir.path(), &normalized);

    let reread =
        index_normalized(&Dump::load(dir.path().join(NORMALIZED_DUMP)).unwrap()).unwrap();
    assert_eq!(reread.entry_count(), 0);
    assert_eq!(reread.orphan_count(), 1);
    assert!(reread.orphan("見").unwrap().title().is_none());
}

#[test]
fn index_borrows_normalized_bodies() {
    let normalized = normalized();
    let index = index_entries(&normalized).unwrap();
    for (key, entry) in &normalized.entries {
        let indexed = match entry.title() {
            Some(title) => index.entry(title),
            None => index.orphan(key),
        };
        assert!(std::ptr::eq(*indexed.unwrap(), entry), "{key} was copied");
    }
}

#[test]
fn shipped_skip_list_lets_fixture_through() {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../data/skip.txt");
    let skip = SkipList::load(path).unwrap();
    let out = normalize_dump(&load("dump.txt"), &skip, false).unwrap();
    assert_eq!(out.skipped, 1);
    assert_eq!(out.entries.len(), 4);
}

#[test]
fn full_dump_when_available() {
    let Ok(path) = std::env::var("SHICI_DUMP") else {
        eprintln!("SHICI_DUMP not set; skipping full dump run");
        return;
    };
    let skip_path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../data/skip.txt");
    let skip = SkipList::load(skip_path).unwrap();
    let dump = Dump::load(&path).unwrap();
    let normalized = normalize_dump(&dump, &skip, true).unwrap();
    let index = index_entries(&normalized).unwrap();
    assert!(index.entry_count() > 0);
    for key in index.entries().keys() {
        assert_eq!(index.resolve(key), Some(key.as_str()));
    }
}

pub mod output;
pub mod pipeline;
pub mod skip;

pub use output::{
    IndexFiles, LIST_ENTRIES, NORMALIZED_DUMP, SEARCH_KEYS, UNIQUE_ENTRIES, write_index,
    write_records, write_search_keys,
};
pub use pipeline::{
    EntryError, Normalized, index_entries, index_normalized, normalize_dump, normalize_entries,
    read_normalized,
};
pub use skip::SkipList;

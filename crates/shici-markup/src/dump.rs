//! `</>`-delimited dump files.
//!
//! A record is trimmed, its first line is the search key and the remaining
//! lines are the markup body. The same layout is used for the raw dictionary
//! dump and for the normalized dump written between the two stages.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use memmap2::Mmap;
use shici_types::RawEntry;

/// Literal line separating records.
pub const RECORD_DELIMITER: &str = "</>";

/// Strategy for loading a dump file.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LoadMode {
    /// Memory-map the file (fast, zero-copy).
    Mmap,
    /// Read the file into an owned buffer (portable fallback).
    Owned,
}

impl LoadMode {
    /// Parse `mmap` / `owned`, case-insensitively.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.to_ascii_lowercase().as_str() {
            "mmap" => Some(LoadMode::Mmap),
            "owned" => Some(LoadMode::Owned),
            _ => None,
        }
    }
}

enum Buffer {
    Mmap(Mmap),
    Owned(Vec<u8>),
}

impl Buffer {
    fn as_slice(&self) -> &[u8] {
        match self {
            Buffer::Mmap(m) => m.as_ref(),
            Buffer::Owned(v) => v.as_slice(),
        }
    }
}

/// A loaded dump. [`RawEntry`] values borrow from it.
pub struct Dump {
    source: Option<PathBuf>,
    buffer: Buffer,
}

impl Dump {
    /// Load a dump, memory-mapping the file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Self::load_with_mode(path, LoadMode::Mmap)
    }

    /// Load a dump choosing between mmap and an owned buffer at runtime.
    pub fn load_with_mode(path: impl AsRef<Path>, mode: LoadMode) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            anyhow::bail!("missing dump file: {}", path.display());
        }
        let buffer = load_file(path, mode)?;
        Ok(Self {
            source: Some(path.to_path_buf()),
            buffer,
        })
    }

    /// Wrap dump text already in memory.
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            source: None,
            buffer: Buffer::Owned(text.into().into_bytes()),
        }
    }

    pub fn text(&self) -> Result<&str> {
        std::str::from_utf8(self.buffer.as_slice()).with_context(|| match &self.source {
            Some(path) => format!("{} is not valid utf-8", path.display()),
            None => "dump is not valid utf-8".to_string(),
        })
    }

    /// All non-blank records, in file order.
    pub fn entries(&self) -> Result<Vec<RawEntry<'_>>> {
        Ok(split_records(self.text()?).collect())
    }
}

/// Split dump text into records. Blank records are skipped.
pub fn split_records(text: &str) -> impl Iterator<Item = RawEntry<'_>> {
    text.split(RECORD_DELIMITER).filter_map(|record| {
        let record = record.trim();
        if record.is_empty() {
            return None;
        }
        let (key, markup) = record.split_once('\n').unwrap_or((record, ""));
        Some(RawEntry {
            search_key: key.trim_end_matches('\r'),
            markup,
        })
    })
}

/// One record as written to an output file, delimiter line included.
pub fn format_record(key: &str, markup: &str) -> String {
    format!("{key}\n{markup}\n{RECORD_DELIMITER}\n")
}

fn load_file(path: &Path, mode: LoadMode) -> Result<Buffer> {
    match mode {
        LoadMode::Mmap => {
            let file = File::open(path).with_context(|| format!("open {}", path.display()))?;
            unsafe { Mmap::map(&file) }
                .map(Buffer::Mmap)
                .with_context(|| format!("mmap {}", path.display()))
        }
        LoadMode::Owned => {
            let mut file = File::open(path).with_context(|| format!("open {}", path.display()))?;
            let mut buf = Vec::new();
            file.read_to_end(&mut buf)
                .with_context(|| format!("read {}", path.display()))?;
            Ok(Buffer::Owned(buf))
        }
    }
}

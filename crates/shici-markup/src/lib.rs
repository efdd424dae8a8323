//! Turn the legacy dictionary dump into normalized entries.
//!
//! The dump is a flat list of `</>`-separated records whose markup uses inline
//! styling in place of structure. This crate covers everything up to the
//! normalized entry:
//!
//! - [`Dump`] loads a dump (memory-mapped or owned) and yields borrowed
//!   [`RawEntry`](shici_types::RawEntry) records.
//! - [`TreeAdapter`] parses record markup into a generic
//!   [`Node`](shici_types::Node) tree; [`HtmlTreeAdapter`] is backed by
//!   `scraper`.
//! - [`segment`] finds definition boundaries from punctuation.
//! - [`normalize`] reclassifies one entry's markup into a
//!   [`NormalizedEntry`](shici_types::NormalizedEntry).
//! - [`render_entry`] writes a normalized entry back out, and
//!   [`RenderedEntry`] reads such records back for indexing.
//!
//! # Example
//! ```
//! use shici_markup::{HtmlTreeAdapter, TreeAdapter, normalize};
//!
//! # fn main() -> anyhow::Result<()> {
//! let root = HtmlTreeAdapter.parse(r#"<div><font size="6">甲</font>释义一。又释义二。</div>"#)?;
//! let entry = normalize(root, "甲")?;
//! let body = entry.definition().unwrap();
//! assert_eq!(body.paragraph.text.as_deref(), Some("释义一。"));
//! assert_eq!(body.items[0].text.as_deref(), Some("又释义二。"));
//! # Ok(()) }
//! ```
//!
//! For a runnable demo, see `cargo run -p shici-markup --example stats -- <dump>`.

pub mod dump;
pub mod normalize;
pub mod render;
pub mod rendered;
pub mod segment;
pub mod tree;

pub use dump::{Dump, LoadMode, RECORD_DELIMITER, format_record, split_records};
pub use normalize::{ErrorKind, NormalizeError, normalize};
pub use render::{Markup, render_entry, render_node};
pub use rendered::RenderedEntry;
pub use segment::{FULL_STOP, SegmentResult, segment};
pub use tree::{HtmlTreeAdapter, TreeAdapter, TreeError};

//! Entries read back from a normalized dump.

use shici_types::{Headword, Node};

use crate::normalize::{is_hyperlink, is_title_marker};
use crate::tree::{TreeAdapter, TreeError};

/// A rendered record whose markup is kept verbatim and whose headwords are
/// recovered by parsing it.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RenderedEntry {
    pub markup: String,
    title: Option<String>,
    subtitle: Option<String>,
}

impl RenderedEntry {
    /// For a rendered `div.entry` record, title and subtitle are the
    /// `div.title` and `div.subtitle` children of the wrapper; nothing inside
    /// `div.content` is consulted. Records that were never normalized fall
    /// back to the raw size-6 marker unless they hold a hyperlink, since
    /// link lists have no title.
    pub fn parse(adapter: &impl TreeAdapter, markup: &str) -> Result<Self, TreeError> {
        let root = adapter.parse(markup)?;
        let (title, subtitle) = if has_class(&root, "entry") {
            (
                child(&root, |n| has_class(n, "title")),
                child(&root, |n| has_class(n, "subtitle")),
            )
        } else {
            let title = find(&root, |n| has_class(n, "title")).or_else(|| {
                if root.descendants().any(is_hyperlink) {
                    None
                } else {
                    find(&root, is_title_marker)
                }
            });
            (title, find(&root, |n| has_class(n, "subtitle")))
        };
        Ok(Self {
            markup: markup.to_string(),
            title: title.map(text_of),
            subtitle: subtitle.map(text_of),
        })
    }
}

impl Headword for RenderedEntry {
    fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    fn subtitle(&self) -> Option<&str> {
        self.subtitle.as_deref()
    }
}

fn find(root: &Node, pred: impl Fn(&Node) -> bool) -> Option<&Node> {
    std::iter::once(root)
        .chain(root.descendants())
        .find(|n| pred(n))
}

fn child(root: &Node, pred: impl Fn(&Node) -> bool) -> Option<&Node> {
    root.children.iter().find(|n| pred(n))
}

fn has_class(node: &Node, class: &str) -> bool {
    node.tag == "div" && node.attr("class") == Some(class)
}

fn text_of(node: &Node) -> String {
    node.text.clone().unwrap_or_default()
}

//! Shared types for the shici dictionary pipeline.
//!
//! Two families live here:
//!
//! - the generic markup tree ([`Node`]) produced by a tree adapter, where text
//!   following an element is kept on that element as `tail` rather than as a
//!   separate text node;
//! - the fixed-shape [`NormalizedEntry`] emitted by the normalizer and
//!   consumed by the indexer.
//!
//! [`RawEntry`] borrows from the loaded dump buffer. The [`Headword`] trait
//! lets the indexer key entries without caring whether they were normalized
//! in memory or read back from an intermediate dump.
//!
//! ```rust
//! use shici_types::Node;
//!
//! let root = Node::new("div")
//!     .with_child(Node::new("font").with_attr("size", "6").with_text("甲").with_tail("释义。"));
//! let title = root.descendants().find(|n| n.attr("size") == Some("6")).unwrap();
//! assert_eq!(title.text.as_deref(), Some("甲"));
//! assert_eq!(title.tail.as_deref(), Some("释义。"));
//! ```

use std::collections::BTreeMap;
use std::fmt;

/// One `</>`-delimited record of the source dump.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct RawEntry<'a> {
    pub search_key: &'a str,
    pub markup: &'a str,
}

/// Element of a parsed markup tree.
///
/// `text` is the text before the first child, `tail` the text after this
/// element and before its next sibling.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Node {
    pub tag: String,
    pub attrs: BTreeMap<String, String>,
    pub text: Option<String>,
    pub tail: Option<String>,
    pub children: Vec<Node>,
}

impl Node {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Self::default()
        }
    }

    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.insert(name.into(), value.into());
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_tail(mut self, tail: impl Into<String>) -> Self {
        self.tail = Some(tail.into());
        self
    }

    pub fn with_child(mut self, child: Node) -> Self {
        self.children.push(child);
        self
    }

    /// Attribute value by name.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }

    /// All descendants in document order, excluding `self`.
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants {
            stack: self.children.iter().rev().collect(),
        }
    }

    /// Child-index path of the first descendant matching `pred`.
    pub fn find_path(&self, pred: impl Fn(&Node) -> bool) -> Option<Vec<usize>> {
        fn walk(node: &Node, pred: &dyn Fn(&Node) -> bool, path: &mut Vec<usize>) -> bool {
            for (idx, child) in node.children.iter().enumerate() {
                path.push(idx);
                if pred(child) || walk(child, pred, path) {
                    return true;
                }
                path.pop();
            }
            false
        }

        let mut path = Vec::new();
        let found = walk(self, &pred, &mut path);
        found.then_some(path)
    }

    pub fn node_at(&self, path: &[usize]) -> Option<&Node> {
        path.iter()
            .try_fold(self, |node, idx| node.children.get(*idx))
    }

    /// Detach the node at `path`. Its tail leaves the tree with it.
    pub fn remove_at(&mut self, path: &[usize]) -> Option<Node> {
        let (last, parents) = path.split_last()?;
        let mut parent = self;
        for idx in parents {
            parent = parent.children.get_mut(*idx)?;
        }
        if *last < parent.children.len() {
            Some(parent.children.remove(*last))
        } else {
            None
        }
    }
}

/// Pre-order iterator returned by [`Node::descendants`].
pub struct Descendants<'a> {
    stack: Vec<&'a Node>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a Node;

    fn next(&mut self) -> Option<&'a Node> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}

/// Inline annotation class of a definition span.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum SpanClass {
    Emphasis,
    ProperNoun,
}

impl SpanClass {
    /// Class name used in rendered markup.
    pub fn as_str(self) -> &'static str {
        match self {
            SpanClass::Emphasis => "emph",
            SpanClass::ProperNoun => "proper-noun",
        }
    }

    pub fn from_class(name: &str) -> Option<Self> {
        match name {
            "emph" => Some(SpanClass::Emphasis),
            "proper-noun" => Some(SpanClass::ProperNoun),
            _ => None,
        }
    }
}

impl fmt::Display for SpanClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Span {
    pub class: SpanClass,
    pub text: Option<String>,
    pub tail: Option<String>,
}

/// Lead definition segment. `tail` holds text attached after the paragraph
/// at content level.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Paragraph {
    pub text: Option<String>,
    pub tail: Option<String>,
}

/// Additional definition segment: leading text followed by its spans.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ListItem {
    pub text: Option<String>,
    pub spans: Vec<Span>,
}

/// Lead paragraph, spans attached beside it, then the additional segments.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct DefinitionBody {
    pub paragraph: Paragraph,
    pub spans: Vec<Span>,
    pub items: Vec<ListItem>,
}

impl DefinitionBody {
    /// Definition text in document order, span texts excluded.
    pub fn definition_text(&self) -> String {
        let mut out = String::new();
        let mut push = |s: &Option<String>| {
            if let Some(s) = s {
                out.push_str(s);
            }
        };
        push(&self.paragraph.text);
        push(&self.paragraph.tail);
        for span in &self.spans {
            push(&span.tail);
        }
        for item in &self.items {
            push(&item.text);
            for span in &item.spans {
                push(&span.tail);
            }
        }
        out
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Content {
    /// Cross-reference links, each kept as the original `<a>` node.
    Links(Vec<Node>),
    Definition(DefinitionBody),
}

/// Normalized dictionary entry.
///
/// `title` is `None` for cross-reference lists; `Some("")` means the title
/// marker was present but empty.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct NormalizedEntry {
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub content: Content,
}

impl NormalizedEntry {
    pub fn is_link_list(&self) -> bool {
        matches!(self.content, Content::Links(_))
    }

    pub fn definition(&self) -> Option<&DefinitionBody> {
        match &self.content {
            Content::Definition(body) => Some(body),
            Content::Links(_) => None,
        }
    }
}

/// Headword access used to key an entry in the canonical index.
pub trait Headword {
    /// Title text; `None` when the entry has no title part at all.
    fn title(&self) -> Option<&str>;
    /// Variant headwords separated by U+3000.
    fn subtitle(&self) -> Option<&str>;
}

impl<T: Headword + ?Sized> Headword for &T {
    fn title(&self) -> Option<&str> {
        (**self).title()
    }

    fn subtitle(&self) -> Option<&str> {
        (**self).subtitle()
    }
}

impl Headword for NormalizedEntry {
    fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    fn subtitle(&self) -> Option<&str> {
        self.subtitle.as_deref()
    }
}

//! Parse entry markup into the generic [`Node`] tree.

use scraper::{ElementRef, Html};
use shici_types::Node;
use thiserror::Error;

#[derive(Debug, Error, Eq, PartialEq)]
pub enum TreeError {
    #[error("markup contains no element")]
    NoElement,
}

/// Capability to turn a markup string into the entry root node.
pub trait TreeAdapter {
    fn parse(&self, markup: &str) -> Result<Node, TreeError>;
}

/// HTML5 tree adapter backed by `scraper`.
///
/// The entry root is the first element inside `<body>`. Text nodes are
/// folded into the owning element's `text` or the previous sibling's `tail`;
/// comments are dropped.
#[derive(Clone, Copy, Debug, Default)]
pub struct HtmlTreeAdapter;

impl TreeAdapter for HtmlTreeAdapter {
    fn parse(&self, markup: &str) -> Result<Node, TreeError> {
        let doc = Html::parse_document(markup);
        let body = doc
            .root_element()
            .children()
            .filter_map(ElementRef::wrap)
            .find(|el| el.value().name() == "body")
            .ok_or(TreeError::NoElement)?;
        let entry = body
            .children()
            .filter_map(ElementRef::wrap)
            .next()
            .ok_or(TreeError::NoElement)?;
        Ok(convert(entry))
    }
}

fn convert(element: ElementRef<'_>) -> Node {
    let value = element.value();
    let mut node = Node::new(value.name());
    for (name, attr) in value.attrs() {
        node.attrs.insert(name.to_string(), attr.to_string());
    }

    for child in element.children() {
        match child.value() {
            scraper::Node::Text(text) => {
                let slot = match node.children.last_mut() {
                    Some(prev) => &mut prev.tail,
                    None => &mut node.text,
                };
                push_text(slot, text);
            }
            scraper::Node::Element(_) => {
                if let Some(el) = ElementRef::wrap(child) {
                    node.children.push(convert(el));
                }
            }
            _ => {}
        }
    }
    node
}

fn push_text(slot: &mut Option<String>, text: &str) {
    if text.is_empty() {
        return;
    }
    slot.get_or_insert_with(String::new).push_str(text);
}

//! Reclassify one raw entry's inline styling into a [`NormalizedEntry`].
//!
//! The dialect is closed: a size-6 `font` is the title, a green `font` the
//! subtitle, black and red `font`s are emphasis and proper-noun spans, and any
//! `<a href>` turns the whole entry into a cross-reference list. Definition
//! text lives in element tails and is cut into segments with
//! [`segment`](crate::segment::segment). Anything outside the dialect is an
//! error rather than being skipped.

use std::mem;

use shici_types::{Content, DefinitionBody, ListItem, Node, NormalizedEntry, Span, SpanClass};
use thiserror::Error;
use tracing::debug;

use crate::render::render_node;
use crate::segment::{SegmentResult, segment};

const STYLE_TAG: &str = "font";
const LINK_TAG: &str = "a";

#[derive(Clone, Copy, Debug, Eq, PartialEq, Error)]
pub enum ErrorKind {
    #[error("entry has no title marker")]
    MissingTitle,
    #[error("element has no trailing text before the first definition")]
    UnexpectedFormat,
    #[error("unknown markup")]
    UnknownMarkup,
    #[error("entry has no definition text")]
    MissingDefinition,
}

/// Normalization failure with the entry's search key and the offending node.
#[derive(Debug, Error)]
#[error("entry `{search_key}`: {kind}\n{node}")]
pub struct NormalizeError {
    pub search_key: String,
    pub kind: ErrorKind,
    pub node: String,
}

/// Where trailing text goes next.
#[derive(Debug)]
enum WalkState {
    /// No definition segment has been seeded yet.
    NotStarted,
    /// A segment boundary was seen; the next span opens a list item led by
    /// `pending`.
    AwaitingListItem { pending: Option<String> },
    /// Text continues the current segment; `pending` is appended to the last
    /// emitted node before the next span.
    Attached { pending: Option<String> },
}

/// Normalize one entry.
///
/// The title node and the first remaining child of `root` are dropped
/// together with their tails; the rest of the children are walked in order.
pub fn normalize(mut root: Node, search_key: &str) -> Result<NormalizedEntry, NormalizeError> {
    let fail = |kind: ErrorKind, node: &Node| NormalizeError {
        search_key: search_key.to_string(),
        kind,
        node: render_node(node),
    };

    if root.descendants().any(is_hyperlink) {
        let links: Vec<Node> = root
            .descendants()
            .filter(|n| is_hyperlink(n))
            .cloned()
            .collect();
        debug!(search_key, links = links.len(), "cross-reference entry");
        return Ok(NormalizedEntry {
            title: None,
            subtitle: None,
            content: Content::Links(links),
        });
    }

    let title_path = root
        .find_path(is_title_marker)
        .ok_or_else(|| fail(ErrorKind::MissingTitle, &root))?;
    let subtitle = root
        .descendants()
        .find(|n| is_subtitle_marker(n))
        .map(|n| n.text.clone().unwrap_or_default());
    let title_node = root
        .remove_at(&title_path)
        .ok_or_else(|| fail(ErrorKind::MissingTitle, &root))?;

    let mut body = DefinitionBody::default();
    let mut state = if subtitle.is_none() {
        seed(&title_node, &mut body)
            .ok_or_else(|| fail(ErrorKind::UnexpectedFormat, &title_node))?
    } else {
        log_dropped(search_key, "title", &title_node);
        WalkState::NotStarted
    };

    if !root.children.is_empty() {
        let first = root.children.remove(0);
        log_dropped(search_key, "leading element", &first);
    }

    for element in mem::take(&mut root.children) {
        state = step(state, &element, &mut body).map_err(|kind| fail(kind, &element))?;
    }

    match state {
        WalkState::NotStarted => return Err(fail(ErrorKind::MissingDefinition, &title_node)),
        WalkState::AwaitingListItem {
            pending: Some(text),
        } => body.items.push(ListItem {
            text: Some(text),
            spans: Vec::new(),
        }),
        WalkState::Attached {
            pending: Some(text),
        } => append_tail(last_tail_mut(&mut body), text),
        WalkState::AwaitingListItem { pending: None } | WalkState::Attached { pending: None } => {}
    }

    Ok(NormalizedEntry {
        title: Some(title_node.text.unwrap_or_default()),
        subtitle,
        content: Content::Definition(body),
    })
}

pub(crate) fn is_title_marker(node: &Node) -> bool {
    node.tag == STYLE_TAG && node.attr("size") == Some("6")
}

fn is_subtitle_marker(node: &Node) -> bool {
    node.tag == STYLE_TAG && node.attr("color") == Some("green")
}

pub(crate) fn is_hyperlink(node: &Node) -> bool {
    node.tag == LINK_TAG && node.attrs.contains_key("href")
}

/// Span class for a `font` whose only attribute is a recognized color.
fn span_class(node: &Node) -> Option<SpanClass> {
    if node.tag != STYLE_TAG || node.attrs.len() != 1 {
        return None;
    }
    match node.attr("color")? {
        "black" => Some(SpanClass::Emphasis),
        "red" => Some(SpanClass::ProperNoun),
        _ => None,
    }
}

fn step(
    state: WalkState,
    element: &Node,
    body: &mut DefinitionBody,
) -> Result<WalkState, ErrorKind> {
    match state {
        WalkState::NotStarted => seed(element, body).ok_or(ErrorKind::UnexpectedFormat),
        WalkState::AwaitingListItem { pending } => {
            let (span, next) = span_for(element)?;
            body.items.push(ListItem {
                text: pending,
                spans: vec![span],
            });
            Ok(next)
        }
        WalkState::Attached { pending } => {
            let (span, next) = span_for(element)?;
            if let Some(text) = pending {
                append_tail(last_tail_mut(body), text);
            }
            match body.items.last_mut() {
                Some(item) => item.spans.push(span),
                None => body.spans.push(span),
            }
            Ok(next)
        }
    }
}

/// Start the lead paragraph from `node`'s tail. `None` when there is no tail.
fn seed(node: &Node, body: &mut DefinitionBody) -> Option<WalkState> {
    let tail = non_empty(&node.tail)?;
    let state = match segment(tail) {
        SegmentResult::Split { head, residual } => {
            body.paragraph.text = Some(head.to_string());
            WalkState::AwaitingListItem {
                pending: residual.map(str::to_string),
            }
        }
        SegmentResult::NoBoundary => {
            body.paragraph.text = Some(tail.to_string());
            WalkState::Attached { pending: None }
        }
    };
    Some(state)
}

/// Build the span for a styled element and the state its tail leads to.
fn span_for(element: &Node) -> Result<(Span, WalkState), ErrorKind> {
    let class = span_class(element).ok_or(ErrorKind::UnknownMarkup)?;
    let (tail, next) = match non_empty(&element.tail) {
        None => (None, WalkState::Attached { pending: None }),
        Some(text) => match segment(text) {
            SegmentResult::Split { head, residual } => (
                Some(head.to_string()),
                WalkState::AwaitingListItem {
                    pending: residual.map(str::to_string),
                },
            ),
            SegmentResult::NoBoundary => (
                None,
                WalkState::Attached {
                    pending: Some(text.to_string()),
                },
            ),
        },
    };
    let span = Span {
        class,
        text: element.text.clone(),
        tail,
    };
    Ok((span, next))
}

/// Tail slot of the most recently emitted node.
fn last_tail_mut(body: &mut DefinitionBody) -> &mut Option<String> {
    match body.items.last_mut() {
        Some(item) => match item.spans.last_mut() {
            Some(span) => &mut span.tail,
            None => &mut item.text,
        },
        None => match body.spans.last_mut() {
            Some(span) => &mut span.tail,
            None => &mut body.paragraph.tail,
        },
    }
}

fn append_tail(slot: &mut Option<String>, text: String) {
    match slot {
        Some(existing) => existing.push_str(&text),
        None => *slot = Some(text),
    }
}

fn non_empty(text: &Option<String>) -> Option<&str> {
    text.as_deref().filter(|t| !t.is_empty())
}

fn log_dropped(search_key: &str, what: &str, node: &Node) {
    if let Some(tail) = non_empty(&node.tail)
        && !tail.trim().is_empty()
    {
        debug!(search_key, what, dropped = tail, "discarding tail of removed node");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn title(text: &str) -> Node {
        Node::new("font").with_attr("size", "6").with_text(text)
    }

    fn subtitle(text: &str) -> Node {
        Node::new("font").with_attr("color", "green").with_text(text)
    }

    fn styled(color: &str, text: &str) -> Node {
        Node::new("font").with_attr("color", color).with_text(text)
    }

    fn definition(entry: &NormalizedEntry) -> &DefinitionBody {
        entry.definition().expect("definition entry")
    }

    #[test]
    fn title_tail_splits_into_paragraph_and_item() {
        let root = Node::new("div").with_child(title("甲").with_tail("释义一。又释义二。"));
        let entry = normalize(root, "X").unwrap();
        assert_eq!(entry.title.as_deref(), Some("甲"));
        assert_eq!(entry.subtitle, None);

        let body = definition(&entry);
        assert_eq!(body.paragraph.text.as_deref(), Some("释义一。"));
        assert_eq!(body.items.len(), 1);
        assert_eq!(body.items[0].text.as_deref(), Some("又释义二。"));
        assert!(body.items[0].spans.is_empty());
    }

    #[test]
    fn non_style_element_after_start_is_unknown() {
        let root = Node::new("div")
            .with_child(title("乙"))
            .with_child(subtitle("丙\u{3000}丁"))
            .with_child(Node::new("br").with_tail("猶言怎。《"))
            .with_child(styled("black", "西廂記"))
            .with_child(Node::new("br"));
        let err = normalize(root, "乙").unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnknownMarkup);
        assert_eq!(err.search_key, "乙");
        assert_eq!(err.node, "<br/>");
    }

    #[test]
    fn spans_open_items_after_a_boundary() {
        let root = Node::new("div")
            .with_child(title("乙"))
            .with_child(subtitle("丙"))
            .with_child(Node::new("br").with_tail("猶言怎。《"))
            .with_child(styled("black", "西廂記").with_tail("》：「"))
            .with_child(styled("red", "張生").with_tail("云云。」又同"))
            .with_child(styled("black", "董西廂").with_tail("。"));
        let entry = normalize(root, "乙").unwrap();
        assert_eq!(entry.subtitle.as_deref(), Some("丙"));

        let body = definition(&entry);
        assert_eq!(body.paragraph.text.as_deref(), Some("猶言怎。"));
        assert!(body.spans.is_empty());
        assert_eq!(body.items.len(), 2);

        let first = &body.items[0];
        assert_eq!(first.text.as_deref(), Some("《"));
        let classes: Vec<SpanClass> = first.spans.iter().map(|s| s.class).collect();
        assert_eq!(classes, vec![SpanClass::Emphasis, SpanClass::ProperNoun]);
        assert_eq!(first.spans[0].text.as_deref(), Some("西廂記"));
        assert_eq!(first.spans[0].tail.as_deref(), Some("》：「"));
        assert_eq!(first.spans[1].tail.as_deref(), Some("云云。」"));

        let second = &body.items[1];
        assert_eq!(second.text.as_deref(), Some("又同"));
        assert_eq!(second.spans.len(), 1);
        assert_eq!(second.spans[0].tail.as_deref(), Some("。"));

        assert_eq!(body.definition_text(), "猶言怎。《》：「云云。」又同。");
    }

    #[test]
    fn spans_before_first_item_stay_beside_paragraph() {
        let root = Node::new("div")
            .with_child(title("甲").with_tail("猶言"))
            .with_child(Node::new("br"))
            .with_child(styled("red", "某"))
            .with_child(styled("black", "例").with_tail("也。"));
        let entry = normalize(root, "甲").unwrap();
        let body = definition(&entry);
        assert_eq!(body.paragraph.text.as_deref(), Some("猶言"));
        assert_eq!(body.spans.len(), 2);
        assert_eq!(body.spans[0].class, SpanClass::ProperNoun);
        assert_eq!(body.spans[0].tail, None);
        assert_eq!(body.spans[1].tail.as_deref(), Some("也。"));
        assert!(body.items.is_empty());
    }

    #[test]
    fn missing_title_fails() {
        let root = Node::new("div").with_child(styled("black", "x").with_tail("y。"));
        let err = normalize(root, "Y").unwrap_err();
        assert_eq!(err.kind, ErrorKind::MissingTitle);
        assert!(err.to_string().contains("entry `Y`"));
    }

    #[test]
    fn hyperlink_forces_link_list() {
        let root = Node::new("div")
            .with_child(title("甲").with_tail("释义。"))
            .with_child(
                Node::new("p").with_child(
                    Node::new("a")
                        .with_attr("href", "entry://乙")
                        .with_text("乙"),
                ),
            )
            .with_child(Node::new("a").with_attr("href", "entry://丙").with_text("丙"));
        let entry = normalize(root, "甲").unwrap();
        assert_eq!(entry.title, None);
        assert_eq!(entry.subtitle, None);
        match &entry.content {
            Content::Links(links) => {
                let hrefs: Vec<&str> = links.iter().filter_map(|l| l.attr("href")).collect();
                assert_eq!(hrefs, vec!["entry://乙", "entry://丙"]);
            }
            other => panic!("expected links, got {other:?}"),
        }
    }

    #[test]
    fn element_without_tail_before_start_is_unexpected() {
        let root = Node::new("div")
            .with_child(title("乙"))
            .with_child(subtitle("丙"))
            .with_child(Node::new("br"));
        let err = normalize(root, "乙").unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnexpectedFormat);
    }

    #[test]
    fn title_without_tail_is_unexpected() {
        let root = Node::new("div").with_child(title("乙"));
        let err = normalize(root, "乙").unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnexpectedFormat);
    }

    #[test]
    fn subtitle_without_definition_fails() {
        let root = Node::new("div").with_child(title("乙")).with_child(subtitle("丙"));
        let err = normalize(root, "乙").unwrap_err();
        assert_eq!(err.kind, ErrorKind::MissingDefinition);
    }

    #[test]
    fn unrecognized_color_is_unknown_markup() {
        let root = Node::new("div")
            .with_child(title("甲").with_tail("释义"))
            .with_child(Node::new("br"))
            .with_child(styled("blue", "x"));
        let err = normalize(root, "甲").unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnknownMarkup);
        assert_eq!(err.node, "<font color=\"blue\">x</font>");
    }

    #[test]
    fn extra_attribute_is_unknown_markup() {
        let root = Node::new("div")
            .with_child(title("甲").with_tail("释义"))
            .with_child(Node::new("br"))
            .with_child(styled("black", "x").with_attr("face", "kai"));
        let err = normalize(root, "甲").unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnknownMarkup);
    }

    #[test]
    fn pending_text_is_attached_at_the_end() {
        let root = Node::new("div")
            .with_child(title("甲").with_tail("猶言"))
            .with_child(Node::new("br"))
            .with_child(styled("black", "例").with_tail("之類"));
        let entry = normalize(root, "甲").unwrap();
        let body = definition(&entry);
        assert_eq!(body.spans[0].tail.as_deref(), Some("之類"));
        assert_eq!(body.definition_text(), "猶言之類");
    }

    #[test]
    fn nested_title_is_found_and_removed() {
        let root = Node::new("div")
            .with_child(Node::new("b").with_child(title("甲").with_tail("释义。")));
        let entry = normalize(root, "甲").unwrap();
        assert_eq!(entry.title.as_deref(), Some("甲"));
        assert_eq!(
            definition(&entry).paragraph.text.as_deref(),
            Some("释义。")
        );
        assert!(definition(&entry).items.is_empty());
    }

    #[test]
    fn empty_title_marker_yields_empty_title() {
        let root = Node::new("div")
            .with_child(Node::new("font").with_attr("size", "6").with_tail("释义。"));
        let entry = normalize(root, "甲").unwrap();
        assert_eq!(entry.title.as_deref(), Some(""));
    }
}

//! Markup rendering for generic nodes and normalized entries.

use std::borrow::Cow;

use shici_types::{Content, DefinitionBody, Node, NormalizedEntry, Span};

use crate::rendered::RenderedEntry;

const VOID_TAGS: [&str; 4] = ["br", "hr", "img", "meta"];

/// Anything that can be written as the body of a `</>` record.
pub trait Markup {
    fn markup(&self) -> Cow<'_, str>;
}

impl<T: Markup + ?Sized> Markup for &T {
    fn markup(&self) -> Cow<'_, str> {
        (**self).markup()
    }
}

impl Markup for NormalizedEntry {
    fn markup(&self) -> Cow<'_, str> {
        Cow::Owned(render_entry(self))
    }
}

impl Markup for RenderedEntry {
    fn markup(&self) -> Cow<'_, str> {
        Cow::Borrowed(self.markup.as_str())
    }
}

/// Render a node, its subtree and its tail.
pub fn render_node(node: &Node) -> String {
    let mut out = String::new();
    write_node(&mut out, node);
    out
}

/// Render a normalized entry as `<div class="entry">` markup.
///
/// Blocks go on their own lines; mixed text and spans stay on one line so
/// no whitespace is introduced into definition text.
pub fn render_entry(entry: &NormalizedEntry) -> String {
    let mut out = String::from("<div class=\"entry\">\n");
    if let Some(title) = &entry.title {
        write_block(&mut out, "title", title);
    }
    if let Some(subtitle) = &entry.subtitle {
        write_block(&mut out, "subtitle", subtitle);
    }

    out.push_str("<div class=\"content\">\n");
    match &entry.content {
        Content::Links(links) => {
            out.push_str("<ul>\n");
            for link in links {
                out.push_str("<li>");
                write_node(&mut out, link);
                out.push_str("</li>\n");
            }
            out.push_str("</ul>\n");
        }
        Content::Definition(body) => write_definition(&mut out, body),
    }
    out.push_str("</div>\n</div>");
    out
}

fn write_block(out: &mut String, class: &str, text: &str) {
    out.push_str("<div class=\"");
    out.push_str(class);
    out.push_str("\">");
    escape_text(out, text);
    out.push_str("</div>\n");
}

fn write_definition(out: &mut String, body: &DefinitionBody) {
    out.push_str("<p>");
    write_opt(out, &body.paragraph.text);
    out.push_str("</p>");
    write_opt(out, &body.paragraph.tail);
    for span in &body.spans {
        write_span(out, span);
    }
    out.push('\n');

    if body.items.is_empty() {
        return;
    }
    out.push_str("<ul>\n");
    for item in &body.items {
        out.push_str("<li>");
        write_opt(out, &item.text);
        for span in &item.spans {
            write_span(out, span);
        }
        out.push_str("</li>\n");
    }
    out.push_str("</ul>\n");
}

fn write_span(out: &mut String, span: &Span) {
    out.push_str("<span class=\"");
    out.push_str(span.class.as_str());
    out.push_str("\">");
    write_opt(out, &span.text);
    out.push_str("</span>");
    write_opt(out, &span.tail);
}

fn write_node(out: &mut String, node: &Node) {
    out.push('<');
    out.push_str(&node.tag);
    for (name, value) in &node.attrs {
        out.push(' ');
        out.push_str(name);
        out.push_str("=\"");
        escape_attr(out, value);
        out.push('"');
    }

    let is_void = VOID_TAGS.contains(&node.tag.as_str());
    if is_void && node.text.is_none() && node.children.is_empty() {
        out.push_str("/>");
    } else {
        out.push('>');
        write_opt(out, &node.text);
        for child in &node.children {
            write_node(out, child);
        }
        out.push_str("</");
        out.push_str(&node.tag);
        out.push('>');
    }
    write_opt(out, &node.tail);
}

fn write_opt(out: &mut String, text: &Option<String>) {
    if let Some(text) = text {
        escape_text(out, text);
    }
}

fn escape_text(out: &mut String, text: &str) {
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
}

fn escape_attr(out: &mut String, value: &str) {
    for ch in value.chars() {
        match ch {
            '"' => out.push_str("&quot;"),
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
}

//! Rendered-text helpers shared by the heuristics.

use scraper::{ElementRef, Html, Node, Selector};
use std::sync::LazyLock;

/// Compiles a selector literal.
pub(crate) fn css(selector: &'static str) -> Selector {
    Selector::parse(selector).expect("static selector literal")
}

static BODY: LazyLock<Selector> = LazyLock::new(|| css("body"));

/// Elements that start a new line in rendered text.
const BLOCK_ELEMENTS: &[&str] = &[
    "address", "article", "aside", "blockquote", "br", "dd", "div", "dl", "dt", "fieldset",
    "figcaption", "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6", "header", "hr",
    "label", "li", "main", "nav", "ol", "option", "p", "pre", "section", "table", "tbody", "td",
    "tfoot", "th", "thead", "tr", "ul",
];

/// Elements whose contents are never rendered as text.
const HIDDEN_ELEMENTS: &[&str] = &["script", "style", "noscript", "template", "head"];

/// Collapses whitespace runs to single spaces and trims.
pub fn collapse_whitespace(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// The element's text content, whitespace-collapsed.
pub fn element_text(element: ElementRef<'_>) -> String {
    collapse_whitespace(&element.text().collect::<String>())
}

/// Turns raw text into a property value, rejecting empty text and the
/// placeholders the host app shows for unset fields.
pub fn clean_value(raw: &str) -> Option<String> {
    let value = collapse_whitespace(raw);
    match value.as_str() {
        "" | "-" | "--" | "\u{2014}" => None,
        _ => Some(value),
    }
}

/// The document body as rendered lines: block boundaries become line
/// breaks, hidden elements are skipped, blank lines are dropped.
pub fn rendered_lines(document: &Html) -> Vec<String> {
    let root = document
        .select(&BODY)
        .next()
        .unwrap_or_else(|| document.root_element());

    let mut buffer = String::new();
    collect_text(root, &mut buffer);

    buffer
        .lines()
        .map(collapse_whitespace)
        .filter(|line| !line.is_empty())
        .collect()
}

fn collect_text(element: ElementRef<'_>, buffer: &mut String) {
    let name = element.value().name();
    if HIDDEN_ELEMENTS.contains(&name) {
        return;
    }
    let block = BLOCK_ELEMENTS.contains(&name);
    if block {
        buffer.push('\n');
    }

    for child in element.children() {
        match child.value() {
            Node::Text(text) => buffer.push_str(text),
            Node::Element(_) => {
                if let Some(child) = ElementRef::wrap(child) {
                    collect_text(child, buffer);
                }
            }
            _ => {}
        }
    }

    if block {
        buffer.push('\n');
    }
}

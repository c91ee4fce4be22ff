//! HTML to visible text.
//!
//! Walks the parsed DOM, keeping text nodes and dropping everything a reader
//! never sees (scripts, styles, navigation chrome). Block-level boundaries
//! become line breaks; whitespace inside a line is collapsed.

use scraper::Html;
use ego_tree::NodeRef;
use scraper::node::Node;

/// Elements whose entire subtree is invisible or boilerplate.
const SKIPPED_TAGS: &[&str] = &[
    "script", "style", "noscript", "template", "head", "svg", "iframe", "canvas", "object", "nav",
];

/// Elements that introduce a line break around their content.
const BLOCK_TAGS: &[&str] = &[
    "p",
    "br",
    "div",
    "li",
    "ul",
    "ol",
    "tr",
    "table",
    "h1",
    "h2",
    "h3",
    "h4",
    "h5",
    "h6",
    "section",
    "article",
    "header",
    "footer",
    "main",
    "blockquote",
    "pre",
];

/// Reduce an HTML document to its visible text.
#[must_use]
pub fn extract_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let mut raw = String::new();
    walk(document.tree.root(), &mut raw);

    let lines: Vec<String> = raw
        .lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .collect();
    lines.join("\n")
}

fn walk(node: NodeRef<'_, Node>, out: &mut String) {
    match node.value() {
        Node::Text(text) => out.push_str(&text.text),
        Node::Element(element) => {
            let name = element.name();
            if SKIPPED_TAGS.contains(&name) {
                return;
            }
            let block = BLOCK_TAGS.contains(&name);
            if block {
                out.push('\n');
            }
            for child in node.children() {
                walk(child, out);
            }
            if block {
                out.push('\n');
            }
        }
        _ => {
            for child in node.children() {
                walk(child, out);
            }
        }
    }
}

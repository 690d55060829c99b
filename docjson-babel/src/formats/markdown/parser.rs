//! Markdown parsing (Markdown → generic tree)
//!
//! Pipeline: Markdown string → Comrak AST → generic tree.
//!
//! Markdown headings are flat: nothing closes a heading except the next
//! heading at the same or a higher level. Top-level blocks are folded into
//! sections with a stack of open sections. A heading closes every open
//! section at its own level or deeper, then opens a new one; any other block
//! lands in the innermost open section (or the document when none is open).

use crate::formats::common::SectionStack;
use crate::tree::{Document, Element, Node, NodeKind};
use comrak::nodes::{AstNode, ListType, NodeValue};
use comrak::{parse_document, Arena, ComrakOptions};

/// Parse a Markdown string into a generic document tree.
pub fn parse_markdown(source: &str) -> Document {
    let arena = Arena::new();
    let options = default_comrak_options();
    let root = parse_document(&arena, source, &options);

    let mut builder = SectionStack::default();
    for child in root.children() {
        let heading_level = match &child.data.borrow().value {
            NodeValue::Heading(heading) => Some(usize::from(heading.level)),
            _ => None,
        };
        match heading_level {
            Some(level) => builder.open(level, Node::title(inline_children(child))),
            None => {
                if let Some(node) = convert_block(child) {
                    builder.push(node);
                }
            }
        }
    }

    Document::new(builder.finish())
}

fn default_comrak_options() -> ComrakOptions<'static> {
    let mut options = ComrakOptions::default();
    options.extension.table = true;
    options.extension.strikethrough = true;
    options.extension.autolink = true;
    options.extension.tasklist = true;
    options.extension.front_matter_delimiter = Some("---".to_string());
    options
}

/// Convert a block-level comrak node. Returns None for dropped blocks.
fn convert_block<'a>(node: &'a AstNode<'a>) -> Option<Node> {
    let value = node.data.borrow().value.clone();
    let converted = match value {
        NodeValue::Paragraph => Node::paragraph(inline_children(node)),
        NodeValue::Heading(_) => {
            // Headings nested in containers (block quotes, list items) do not
            // open sections; keep their text as a paragraph.
            Node::paragraph(inline_children(node))
        }
        NodeValue::CodeBlock(code) => {
            let literal = code.literal.strip_suffix('\n').unwrap_or(&code.literal);
            Node::literal_block(literal)
        }
        NodeValue::List(list) => {
            let kind = match list.list_type {
                ListType::Bullet => NodeKind::BulletList,
                ListType::Ordered => NodeKind::EnumeratedList,
            };
            Node::new(kind, block_children(node))
        }
        NodeValue::Item(_) | NodeValue::TaskItem(_) => {
            Node::new(NodeKind::ListItem, block_children(node))
        }
        NodeValue::BlockQuote => Node::element(Element::BlockQuote, block_children(node)),
        NodeValue::ThematicBreak => Node::element(Element::Transition, Vec::new()),
        NodeValue::Table(_) => Node::element(Element::Table, block_children(node)),
        NodeValue::TableRow(_) => Node::element(Element::Row, block_children(node)),
        NodeValue::TableCell => Node::element(Element::Cell, inline_children(node)),
        NodeValue::HtmlBlock(_) | NodeValue::FrontMatter(_) => return None,
        _ => Node::element(Element::Container, block_children(node)),
    };
    Some(converted)
}

fn block_children<'a>(node: &'a AstNode<'a>) -> Vec<Node> {
    node.children().filter_map(convert_block).collect()
}

fn inline_children<'a>(node: &'a AstNode<'a>) -> Vec<Node> {
    let mut out = Vec::new();
    for child in node.children() {
        out.extend(convert_inline(child));
    }
    out
}

fn convert_inline<'a>(node: &'a AstNode<'a>) -> Option<Node> {
    let value = node.data.borrow().value.clone();
    let converted = match value {
        NodeValue::Text(text) => Node::text(text),
        NodeValue::SoftBreak | NodeValue::LineBreak => Node::text("\n"),
        NodeValue::Code(code) => Node::element(Element::Literal, vec![Node::text(code.literal)]),
        NodeValue::Emph => Node::element(Element::Emphasis, inline_children(node)),
        NodeValue::Strong => Node::element(Element::Strong, inline_children(node)),
        NodeValue::Link(_) => Node::element(Element::Reference, inline_children(node)),
        NodeValue::Image(_) => Node::element(Element::Image, Vec::new()),
        NodeValue::HtmlInline(_) => return None,
        _ => Node::element(Element::Container, inline_children(node)),
    };
    Some(converted)
}

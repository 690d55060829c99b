//! Indented outline of a document tree, used by `docjson inspect`.
//!
//! One line per node: the node label, and for text payloads a quoted,
//! single-line excerpt. Diagnostics are listed after the tree.
//!
//! ```text
//! Document
//!   Section
//!     Title
//!       Text "Intro"
//!     Paragraph
//!       Text "Welcome"
//! ```

use super::nodes::{Document, Node, NodeKind};

const INDENT: &str = "  ";
const EXCERPT_CHARS: usize = 60;

/// Render the outline of `doc`.
pub fn render(doc: &Document) -> String {
    let mut out = String::new();
    render_node(&doc.root, 0, &mut out);
    if !doc.diagnostics.is_empty() {
        out.push_str("\nDiagnostics:\n");
        for diagnostic in &doc.diagnostics {
            out.push_str(&format!(
                "{INDENT}line {}: [{:?}] {}\n",
                diagnostic.line, diagnostic.level, diagnostic.message
            ));
        }
    }
    out
}

fn render_node(node: &Node, depth: usize, out: &mut String) {
    out.push_str(&INDENT.repeat(depth));
    out.push_str(&node.label());
    if let NodeKind::Text(payload) = &node.kind {
        out.push_str(&format!(" {:?}", excerpt(payload)));
    }
    out.push('\n');
    for child in &node.children {
        render_node(child, depth + 1, out);
    }
}

fn excerpt(payload: &str) -> String {
    let flat = payload.replace('\n', " ");
    if flat.chars().count() > EXCERPT_CHARS {
        let mut cut: String = flat.chars().take(EXCERPT_CHARS).collect();
        cut.push('…');
        cut
    } else {
        flat
    }
}

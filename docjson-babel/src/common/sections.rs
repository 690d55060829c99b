//! Section projection: one Section node and its subtree into a [`SectionRecord`].
//!
//! The title is the first Title anywhere beneath the section (depth-first,
//! document order). Content is one string per direct child with non-empty
//! extracted text. Sections are the recursive projection of the direct
//! Section children, in order.
//!
//! # Subsection echo
//!
//! Text extraction of a Section or Title node concatenates everything
//! beneath it. Feeding those children to the content step therefore repeats
//! the title inside `content` and flattens every child section into its
//! parent's `content`, on top of the structured `sections` entry. With
//! [`ProjectionOptions::subsection_echo`] off (the default) Title and Section
//! children are skipped by the content step; turning it on reproduces the
//! echoing output of the older docutils-based tooling.

use super::extract::extract_text;
use super::records::SectionRecord;
use super::ProjectionOptions;
use crate::tree::{Document, Node};

/// Project one Section node.
pub fn project_section(section: &Node, options: &ProjectionOptions) -> SectionRecord {
    let title = section
        .first_descendant(Node::is_title)
        .map(|title| extract_text(title, &options.filter))
        .unwrap_or_default();

    let mut content = Vec::new();
    let mut sections = Vec::new();

    for child in &section.children {
        let echoes = child.is_section() || child.is_title();
        if !echoes || options.subsection_echo {
            let text = extract_text(child, &options.filter);
            if !text.is_empty() {
                content.push(text);
            }
        }
        if child.is_section() {
            sections.push(project_section(child, options));
        }
    }

    SectionRecord {
        title,
        content,
        sections,
    }
}

/// Project every Section found anywhere in the document.
///
/// The scan is a full preorder walk, so a nested section is projected both
/// inside its parent's record and as an entry of its own in the returned list.
pub fn project_document(doc: &Document, options: &ProjectionOptions) -> Vec<SectionRecord> {
    doc.root
        .descendants()
        .filter(|node| node.is_section())
        .map(|section| project_section(section, options))
        .collect()
}

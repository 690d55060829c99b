//! Helpers shared by the parser adapters.

use crate::tree::Node;

/// Rebuilds section nesting from headings that carry only a level.
///
/// Opening a section at level `n` closes every open section at level `n` or
/// deeper; other blocks go to the innermost open section, or to the document
/// when none is open.
#[derive(Default)]
pub(crate) struct SectionStack {
    root: Vec<Node>,
    open: Vec<OpenSection>,
}

struct OpenSection {
    level: usize,
    children: Vec<Node>,
}

impl SectionStack {
    /// Number of currently open sections.
    pub(crate) fn depth(&self) -> usize {
        self.open.len()
    }

    pub(crate) fn open(&mut self, level: usize, title: Node) {
        while self.open.last().is_some_and(|top| top.level >= level) {
            self.close_top();
        }
        self.open.push(OpenSection {
            level,
            children: vec![title],
        });
    }

    pub(crate) fn push(&mut self, node: Node) {
        match self.open.last_mut() {
            Some(top) => top.children.push(node),
            None => self.root.push(node),
        }
    }

    fn close_top(&mut self) {
        if let Some(top) = self.open.pop() {
            self.push(Node::section(top.children));
        }
    }

    pub(crate) fn finish(mut self) -> Vec<Node> {
        while !self.open.is_empty() {
            self.close_top();
        }
        self.root
    }
}

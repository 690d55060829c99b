//! Core data structures for the generic document tree.

/// A typed node of a parsed document.
///
/// Parser adapters build these; the projector in [`crate::common`] only
/// ever looks at the [`NodeKind`] and the ordered children.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub kind: NodeKind,
    pub children: Vec<Node>,
}

/// The kind tag of a [`Node`].
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// A run of text. The only kind carrying a payload.
    Text(String),
    /// Code or other preformatted text, stored as Text children.
    LiteralBlock,
    BulletList,
    EnumeratedList,
    ListItem,
    Section,
    Title,
    /// Any other element. The tag is informational only.
    Other(Element),
}

/// Tags for elements the projector does not special-case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Element {
    Document,
    Paragraph,
    Emphasis,
    Strong,
    Literal,
    Reference,
    FootnoteReference,
    SubstitutionReference,
    InterpretedText(String),
    Transition,
    BlockQuote,
    LineBlock,
    DoctestBlock,
    DefinitionList,
    DefinitionListItem,
    Term,
    Definition,
    FieldList,
    Field,
    FieldName,
    FieldBody,
    Footnote,
    Target,
    SubstitutionDefinition,
    Comment,
    Admonition(String),
    Topic,
    Rubric,
    Image,
    Figure,
    Caption,
    MathBlock,
    Table,
    Row,
    Cell,
    Container,
    Pending(String),
    SystemMessage,
    Raw,
}

impl Node {
    pub fn new(kind: NodeKind, children: Vec<Node>) -> Self {
        Node { kind, children }
    }

    /// A leaf text node.
    pub fn text(payload: impl Into<String>) -> Self {
        Node::new(NodeKind::Text(payload.into()), Vec::new())
    }

    /// An element node that the projector treats generically.
    pub fn element(element: Element, children: Vec<Node>) -> Self {
        Node::new(NodeKind::Other(element), children)
    }

    pub fn paragraph(children: Vec<Node>) -> Self {
        Node::element(Element::Paragraph, children)
    }

    /// A literal block holding `code` as its single text child.
    pub fn literal_block(code: impl Into<String>) -> Self {
        Node::new(NodeKind::LiteralBlock, vec![Node::text(code)])
    }

    pub fn title(children: Vec<Node>) -> Self {
        Node::new(NodeKind::Title, children)
    }

    pub fn section(children: Vec<Node>) -> Self {
        Node::new(NodeKind::Section, children)
    }

    pub fn is_section(&self) -> bool {
        matches!(self.kind, NodeKind::Section)
    }

    pub fn is_title(&self) -> bool {
        matches!(self.kind, NodeKind::Title)
    }

    /// Bullet lists, enumerated lists and their items.
    pub fn is_list_like(&self) -> bool {
        matches!(
            self.kind,
            NodeKind::BulletList | NodeKind::EnumeratedList | NodeKind::ListItem
        )
    }

    /// Concatenation of every Text payload beneath (and including) this node.
    pub fn as_text(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        if let NodeKind::Text(payload) = &self.kind {
            out.push_str(payload);
        }
        for child in &self.children {
            child.collect_text(out);
        }
    }

    /// Preorder iterator over this node and all of its descendants.
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants { stack: vec![self] }
    }

    /// First strict descendant (document order) matching `predicate`.
    pub fn first_descendant<P>(&self, predicate: P) -> Option<&Node>
    where
        P: Fn(&Node) -> bool,
    {
        self.descendants().skip(1).find(|&node| predicate(node))
    }

    /// Short label used by the tree outline.
    pub fn label(&self) -> String {
        match &self.kind {
            NodeKind::Text(_) => "Text".to_string(),
            NodeKind::LiteralBlock => "LiteralBlock".to_string(),
            NodeKind::BulletList => "BulletList".to_string(),
            NodeKind::EnumeratedList => "EnumeratedList".to_string(),
            NodeKind::ListItem => "ListItem".to_string(),
            NodeKind::Section => "Section".to_string(),
            NodeKind::Title => "Title".to_string(),
            NodeKind::Other(element) => match element {
                Element::InterpretedText(role) => format!("InterpretedText[{role}]"),
                Element::Admonition(name) => format!("Admonition[{name}]"),
                Element::Pending(name) => format!("Pending[{name}]"),
                other => format!("{other:?}"),
            },
        }
    }
}

/// Depth-first, document-order traversal. See [`Node::descendants`].
pub struct Descendants<'a> {
    stack: Vec<&'a Node>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a Node;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}

/// A parsed document: the root node plus out-of-band parser diagnostics.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub root: Node,
    pub diagnostics: Vec<Diagnostic>,
}

impl Document {
    pub fn new(children: Vec<Node>) -> Self {
        Document {
            root: Node::element(Element::Document, children),
            diagnostics: Vec::new(),
        }
    }

    pub fn with_diagnostics(children: Vec<Node>, diagnostics: Vec<Diagnostic>) -> Self {
        Document {
            root: Node::element(Element::Document, children),
            diagnostics,
        }
    }
}

/// Severity of a parser diagnostic, ordered like docutils' reporter levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum DiagnosticLevel {
    Info,
    Warning,
    Error,
}

/// A message the parser reported instead of raising.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub level: DiagnosticLevel,
    /// 1-based source line.
    pub line: usize,
    pub message: String,
}

impl Diagnostic {
    pub fn new(level: DiagnosticLevel, line: usize, message: impl Into<String>) -> Self {
        Diagnostic {
            level,
            line,
            message: message.into(),
        }
    }
}

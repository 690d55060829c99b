//! Explicit markup blocks: directives, footnotes, targets, substitution
//! definitions and comments.
//!
//! Directives are dispatched by (case-insensitive) name. Directives that only
//! steer rendering (`contents`, `sectnum`, `meta`, ...) leave at most a
//! Pending node; unknown directives leave nothing in the tree but an Error
//! diagnostic, and optionally a SystemMessage node carrying the same text.

use super::blocks::{dedent_block, join_lines, skip_blank};
use super::inline::parse_inline;
use super::parser::{Line, Parser};
use super::tables::{split_csv, text_row};
use crate::tree::{DiagnosticLevel, Element, Node, NodeKind};
use once_cell::sync::Lazy;
use regex::Regex;

static DIRECTIVE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\.\.\s+([A-Za-z0-9](?:[A-Za-z0-9_+.:\-]*[A-Za-z0-9_])?)\s*::(?:\s+(.*))?$")
        .expect("valid directive pattern")
});

static FOOTNOTE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\.\.\s+\[([^\]\s]+)\](?:\s+(.*))?$").expect("valid footnote pattern")
});

static SUBSTITUTION_DEFINITION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\.\.\s+\|[^|\s][^|]*\|").expect("valid substitution pattern"));

static DIRECTIVE_OPTION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^:[^:\s][^:]*:(?:\s|$)").expect("valid option pattern"));

const ADMONITIONS: &[&str] = &[
    "attention",
    "caution",
    "danger",
    "error",
    "hint",
    "important",
    "note",
    "tip",
    "warning",
];

/// A directive block split into its parts.
struct Directive<'a> {
    name: String,
    /// Text after `::` on the first line.
    argument: Line<'a>,
    options: Vec<Line<'a>>,
    /// Lines following the options up to the first blank line.
    head: Vec<Line<'a>>,
    /// Lines after the first blank line.
    body: Vec<Line<'a>>,
    line: usize,
}

impl<'a> Directive<'a> {
    fn new(name: &str, argument: Line<'a>, block: &[Line<'a>]) -> Self {
        let block = dedent_block(block);
        let split = block.iter().position(Line::is_blank).unwrap_or(block.len());
        let (head, rest) = block.split_at(split);
        let options_end = head
            .iter()
            .position(|line| !DIRECTIVE_OPTION.is_match(line.text))
            .unwrap_or(head.len());

        Directive {
            name: name.to_string(),
            argument,
            options: head[..options_end].to_vec(),
            head: head[options_end..].to_vec(),
            body: rest[skip_blank(rest, 0)..].to_vec(),
            line: argument.number,
        }
    }

    fn argument_text(&self) -> &'a str {
        self.argument.text.trim()
    }

    fn option(&self, key: &str) -> Option<&'a str> {
        self.options.iter().find_map(|line| {
            let (name, value) = line.text.strip_prefix(':')?.split_once(':')?;
            (name == key).then_some(value.trim())
        })
    }

    /// Directive content, not counting the first-line argument.
    fn content(&self) -> Vec<Line<'a>> {
        self.content_after(Vec::new())
    }

    /// Directive content where the first-line text starts the body
    /// (`.. note:: Text`).
    fn content_with_argument(&self) -> Vec<Line<'a>> {
        let first = if self.argument.is_blank() {
            Vec::new()
        } else {
            vec![self.argument]
        };
        self.content_after(first)
    }

    fn content_after(&self, mut lines: Vec<Line<'a>>) -> Vec<Line<'a>> {
        lines.extend(self.head.iter().copied());
        if !lines.is_empty() && !self.body.is_empty() {
            lines.push(Line::blank(self.line));
        }
        lines.extend(self.body.iter().copied());
        lines
    }
}

impl Parser {
    /// Interpret one explicit markup block: its first line and the indented
    /// lines that follow it.
    pub(super) fn explicit_construct<'a>(
        &mut self,
        first: Line<'a>,
        block: &[Line<'a>],
    ) -> Vec<Node> {
        let text = first.text;

        if let Some(captures) = DIRECTIVE.captures(text) {
            let name = captures.get(1).map_or("", |m| m.as_str());
            let argument = Line {
                text: captures.get(2).map_or("", |m| m.as_str()),
                number: first.number,
            };
            let directive = Directive::new(name, argument, block);
            return self.directive(&directive);
        }

        if SUBSTITUTION_DEFINITION.is_match(text) {
            return vec![Node::element(Element::SubstitutionDefinition, Vec::new())];
        }

        if let Some(captures) = FOOTNOTE.captures(text) {
            let mut lines = Vec::new();
            if let Some(rest) = captures.get(2) {
                lines.push(Line {
                    text: rest.as_str(),
                    number: first.number,
                });
            }
            lines.extend(dedent_block(block));
            return vec![Node::element(Element::Footnote, self.parse_body(&lines))];
        }

        if text.starts_with(".. _") {
            return vec![Node::element(Element::Target, Vec::new())];
        }

        vec![Node::element(Element::Comment, Vec::new())]
    }

    fn directive(&mut self, directive: &Directive<'_>) -> Vec<Node> {
        let name = directive.name.to_ascii_lowercase();
        let argument = directive.argument_text();

        match name.as_str() {
            "code" | "code-block" | "sourcecode" => {
                let code = join_lines(&directive.content());
                if code.trim().is_empty() {
                    self.report(
                        DiagnosticLevel::Warning,
                        directive.line,
                        format!(
                            "Content block expected for the \"{}\" directive; none found.",
                            directive.name
                        ),
                    );
                    return Vec::new();
                }
                vec![Node::literal_block(code)]
            }
            "parsed-literal" => {
                let text = join_lines(&directive.content());
                vec![Node::new(NodeKind::LiteralBlock, parse_inline(&text))]
            }
            "math" => {
                let content = join_lines(&directive.content());
                let formula = if content.trim().is_empty() {
                    argument.to_string()
                } else {
                    content
                };
                vec![Node::element(Element::MathBlock, vec![Node::text(formula)])]
            }
            kind if ADMONITIONS.contains(&kind) => {
                let body = self.parse_body(&directive.content_with_argument());
                vec![Node::element(Element::Admonition(kind.to_string()), body)]
            }
            "admonition" => {
                let children = self.titled_body(argument, &directive.content());
                vec![Node::element(Element::Admonition(name.clone()), children)]
            }
            "topic" | "sidebar" => {
                let children = self.titled_body(argument, &directive.content());
                vec![Node::element(Element::Topic, children)]
            }
            "rubric" => vec![Node::element(Element::Rubric, parse_inline(argument))],
            "image" => vec![Node::element(Element::Image, Vec::new())],
            "figure" => vec![self.figure(directive)],
            "table" | "list-table" => {
                let children = self.titled_body(argument, &directive.content());
                vec![Node::element(Element::Table, children)]
            }
            "csv-table" => vec![self.csv_table(directive)],
            "container" | "compound" | "class" => {
                let children = self.parse_body(&directive.content());
                vec![Node::element(Element::Container, children)]
            }
            "epigraph" | "highlights" | "pull-quote" => {
                let children = self.parse_body(&directive.content());
                vec![Node::element(Element::BlockQuote, children)]
            }
            "contents" | "sectnum" | "section-numbering" | "header" | "footer"
            | "target-notes" => vec![Node::element(Element::Pending(name.clone()), Vec::new())],
            "raw" => vec![Node::element(Element::Raw, Vec::new())],
            "meta" | "title" | "default-role" | "role" => Vec::new(),
            "include" => {
                self.report(
                    DiagnosticLevel::Warning,
                    directive.line,
                    format!("include directive not followed: \"{argument}\""),
                );
                vec![Node::element(Element::Pending(name.clone()), Vec::new())]
            }
            "replace" | "unicode" | "date" => {
                self.report(
                    DiagnosticLevel::Error,
                    directive.line,
                    format!(
                        "Invalid context: the \"{}\" directive can only be used within a substitution definition.",
                        directive.name
                    ),
                );
                Vec::new()
            }
            _ => self.unknown_directive(directive),
        }
    }

    fn titled_body(&mut self, title: &str, content: &[Line<'_>]) -> Vec<Node> {
        let mut children = Vec::new();
        if !title.is_empty() {
            children.push(Node::title(parse_inline(title)));
        }
        children.extend(self.parse_body(content));
        children
    }

    /// The image, then the first paragraph as caption, then the legend.
    fn figure(&mut self, directive: &Directive<'_>) -> Node {
        let mut children = vec![Node::element(Element::Image, Vec::new())];
        let mut content = self.parse_body(&directive.content()).into_iter();
        if let Some(first) = content.next() {
            if first.label() == "Paragraph" {
                children.push(Node::element(Element::Caption, first.children));
            } else {
                children.push(first);
            }
        }
        children.extend(content);
        Node::element(Element::Figure, children)
    }

    fn csv_table(&mut self, directive: &Directive<'_>) -> Node {
        let delimiter = directive
            .option("delim")
            .and_then(|delim| delim.chars().next())
            .unwrap_or(',');

        let mut children = Vec::new();
        let title = directive.argument_text();
        if !title.is_empty() {
            children.push(Node::title(parse_inline(title)));
        }
        if let Some(header) = directive.option("header") {
            children.push(text_row(&split_csv(header, delimiter)));
        }
        for line in directive.content() {
            if !line.is_blank() {
                children.push(text_row(&split_csv(line.text, delimiter)));
            }
        }
        Node::element(Element::Table, children)
    }

    fn unknown_directive(&mut self, directive: &Directive<'_>) -> Vec<Node> {
        let message = format!("Unknown directive type \"{}\".", directive.name);
        self.report(DiagnosticLevel::Error, directive.line, message.clone());
        if !self.options.inline_diagnostics {
            return Vec::new();
        }
        vec![Node::element(
            Element::SystemMessage,
            vec![Node::paragraph(vec![Node::text(message)])],
        )]
    }
}

//! Body elements: everything below section level.
//!
//! Every construct is parsed from a slice of [`Line`]s whose indentation is
//! relative to the enclosing construct. Nested bodies (list items, block
//! quotes, directive content) are dedented and parsed recursively.

use super::inline::parse_inline;
use super::parser::{adornment_char, Line, Parser};
use crate::tree::{DiagnosticLevel, Element, Node, NodeKind};
use once_cell::sync::Lazy;
use regex::Regex;

const BULLETS: &str = "-*+•‣⁃";

/// Characters accepted as the quote of an unindented literal block.
const QUOTE_CHARS: &str = ">%$#!|";

static ENUMERATOR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?:\((?:[0-9]+|#|[A-Za-z]|[ivxlcdm]+|[IVXLCDM]+)\)|(?:[0-9]+|#|[A-Za-z]|[ivxlcdm]+|[IVXLCDM]+)[.)])(?: +|$)",
    )
    .expect("valid enumerator pattern")
});

static FIELD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^:((?:[^:\\\s]|\\.)(?:[^:\\]|\\.)*):(?: +(.*))?$").expect("valid field pattern")
});

static SIMPLE_TABLE_BORDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^=+(?: +=+)+$").expect("valid table border pattern"));

impl Parser {
    /// Parse a sequence of body elements.
    pub(super) fn parse_body(&mut self, lines: &[Line<'_>]) -> Vec<Node> {
        let mut nodes = Vec::new();
        let mut i = 0;
        while i < lines.len() {
            if lines[i].is_blank() {
                i += 1;
                continue;
            }
            let (block, next) = self.parse_block(lines, i);
            nodes.extend(block);
            i = next;
        }
        nodes
    }

    /// Parse the body element starting at the non-blank line `i`.
    ///
    /// Returns the produced nodes (possibly none) and the index of the first
    /// unconsumed line, which is always past `i`.
    pub(super) fn parse_block(&mut self, lines: &[Line<'_>], i: usize) -> (Vec<Node>, usize) {
        let line = lines[i];
        let text = line.text;

        if line.indent() > 0 {
            return self.block_quote(lines, i);
        }
        if text == ".." || text.starts_with(".. ") {
            return self.explicit_markup(lines, i);
        }
        if text == "__" || text.starts_with("__ ") {
            let end = indented_end(lines, i + 1, 1);
            return (vec![Node::element(Element::Target, Vec::new())], end);
        }
        if adornment_char(text).is_some() && text.chars().count() >= 4 {
            return (vec![Node::element(Element::Transition, Vec::new())], i + 1);
        }
        if let Some(bullet) = bullet_marker(text) {
            return self.bullet_list(lines, i, bullet);
        }
        if ENUMERATOR.is_match(text) && enumerated_list_follows(lines, i) {
            return self.enumerated_list(lines, i);
        }
        if FIELD.is_match(text) {
            return self.field_list(lines, i);
        }
        if text.starts_with(">>>") {
            return doctest_block(lines, i);
        }
        if text == "|" || text.starts_with("| ") {
            return line_block(lines, i);
        }
        if text.starts_with("+-") || text.starts_with("+=") {
            return self.grid_table(lines, i);
        }
        if SIMPLE_TABLE_BORDER.is_match(text) {
            return self.simple_table(lines, i);
        }
        self.paragraph(lines, i)
    }

    fn block_quote(&mut self, lines: &[Line<'_>], i: usize) -> (Vec<Node>, usize) {
        let end = indented_end(lines, i, 1);
        let body = dedent_block(&lines[i..end]);
        let children = self.parse_body(&body);
        (vec![Node::element(Element::BlockQuote, children)], end)
    }

    fn paragraph(&mut self, lines: &[Line<'_>], i: usize) -> (Vec<Node>, usize) {
        let mut end = i;
        while end < lines.len() && !lines[end].is_blank() && lines[end].indent() == 0 {
            end += 1;
        }

        let mut text = lines[i..end]
            .iter()
            .map(|line| line.text)
            .collect::<Vec<_>>()
            .join("\n");
        let literal_follows = text.ends_with("::");

        let followed_by_indent = lines
            .get(end)
            .is_some_and(|next| !next.is_blank() && next.indent() > 0);
        if followed_by_indent && !literal_follows {
            if end == i + 1 {
                return self.definition_list(lines, i);
            }
            self.report(
                DiagnosticLevel::Error,
                lines[end].number,
                "Unexpected indentation.",
            );
        }

        if literal_follows {
            strip_literal_marker(&mut text);
        }
        let mut nodes = Vec::new();
        if !text.is_empty() {
            nodes.push(Node::paragraph(parse_inline(&text)));
        }
        if !literal_follows {
            return (nodes, end);
        }

        let (literal, next) = self.literal_block(lines, end, lines[end - 1].number);
        nodes.extend(literal);
        (nodes, next)
    }

    /// The literal block announced by a paragraph ending in `::`.
    fn literal_block(
        &mut self,
        lines: &[Line<'_>],
        start: usize,
        marker_line: usize,
    ) -> (Option<Node>, usize) {
        let mut j = start;
        while j < lines.len() && lines[j].is_blank() {
            j += 1;
        }
        let Some(first) = lines.get(j) else {
            self.report(
                DiagnosticLevel::Warning,
                marker_line,
                "Literal block expected; none found.",
            );
            return (None, j);
        };

        if first.indent() > 0 {
            let end = indented_end(lines, j, 1);
            let code = join_lines(&dedent_block(&lines[j..end]));
            return (Some(Node::literal_block(code)), end);
        }

        // Quoted literal block: every line starts with the same quote character.
        let quote = first.text.chars().next().filter(|c| QUOTE_CHARS.contains(*c));
        if let Some(quote) = quote {
            let mut end = j;
            while end < lines.len() && lines[end].text.starts_with(quote) {
                end += 1;
            }
            return (Some(Node::literal_block(join_lines(&lines[j..end]))), end);
        }

        self.report(
            DiagnosticLevel::Warning,
            marker_line,
            "Literal block expected; none found.",
        );
        (None, j)
    }

    fn definition_list(&mut self, lines: &[Line<'_>], i: usize) -> (Vec<Node>, usize) {
        let mut items = Vec::new();
        let mut j = i;
        loop {
            let term_line = lines[j].text;
            // Classifiers follow the term after " : ".
            let term = term_line.split(" : ").next().unwrap_or(term_line);
            let end = indented_end(lines, j + 1, 1);
            let definition = self.parse_body(&dedent_block(&lines[j + 1..end]));
            items.push(Node::element(
                Element::DefinitionListItem,
                vec![
                    Node::element(Element::Term, parse_inline(term)),
                    Node::element(Element::Definition, definition),
                ],
            ));

            let k = skip_blank(lines, end);
            if is_definition_term(lines, k) {
                j = k;
            } else {
                return (vec![Node::element(Element::DefinitionList, items)], end);
            }
        }
    }

    fn bullet_list(&mut self, lines: &[Line<'_>], i: usize, bullet: char) -> (Vec<Node>, usize) {
        let mut items = Vec::new();
        let mut j = i;
        loop {
            let (item, end) = self.list_item(lines, j, bullet.len_utf8());
            items.push(item);
            let k = skip_blank(lines, end);
            match lines.get(k) {
                Some(next) if bullet_marker(next.text) == Some(bullet) => j = k,
                _ => return (vec![Node::new(NodeKind::BulletList, items)], end),
            }
        }
    }

    fn enumerated_list(&mut self, lines: &[Line<'_>], i: usize) -> (Vec<Node>, usize) {
        let mut items = Vec::new();
        let mut j = i;
        loop {
            let marker = ENUMERATOR
                .find(lines[j].text)
                .map_or(0, |found| found.end());
            let (item, end) = self.list_item(lines, j, marker);
            items.push(item);
            let k = skip_blank(lines, end);
            match lines.get(k) {
                Some(next) if ENUMERATOR.is_match(next.text) => j = k,
                _ => return (vec![Node::new(NodeKind::EnumeratedList, items)], end),
            }
        }
    }

    /// A list item whose marker occupies the first `marker` bytes of line `j`.
    fn list_item(&mut self, lines: &[Line<'_>], j: usize, marker: usize) -> (Node, usize) {
        let line = lines[j];
        let rest = &line.text[marker..];
        let content = rest.trim_start();
        let end = indented_end(lines, j + 1, 1);
        let continuation = &lines[j + 1..end];

        let mut body = Vec::with_capacity(continuation.len() + 1);
        if content.is_empty() {
            body.extend(dedent_block(continuation));
        } else {
            let content_column = line.text[..line.text.len() - content.len()].chars().count();
            let width = min_indent(continuation).map_or(content_column, |min| min.min(content_column));
            body.push(Line {
                text: content,
                number: line.number,
            });
            body.extend(continuation.iter().map(|l| l.dedent(width)));
        }

        (Node::new(NodeKind::ListItem, self.parse_body(&body)), end)
    }

    fn field_list(&mut self, lines: &[Line<'_>], i: usize) -> (Vec<Node>, usize) {
        let mut fields = Vec::new();
        let mut j = i;
        loop {
            let line = lines[j];
            let captures = FIELD.captures(line.text);
            let name = captures
                .as_ref()
                .and_then(|c| c.get(1))
                .map_or("", |m| m.as_str());
            let first = captures
                .as_ref()
                .and_then(|c| c.get(2))
                .map_or("", |m| m.as_str());
            let end = indented_end(lines, j + 1, 1);

            let mut body = Vec::new();
            if !first.is_empty() {
                body.push(Line {
                    text: first,
                    number: line.number,
                });
            }
            body.extend(dedent_block(&lines[j + 1..end]));

            fields.push(Node::element(
                Element::Field,
                vec![
                    Node::element(Element::FieldName, vec![Node::text(name)]),
                    Node::element(Element::FieldBody, self.parse_body(&body)),
                ],
            ));

            let k = skip_blank(lines, end);
            match lines.get(k) {
                Some(next) if FIELD.is_match(next.text) => j = k,
                _ => return (vec![Node::element(Element::FieldList, fields)], end),
            }
        }
    }

    fn explicit_markup(&mut self, lines: &[Line<'_>], i: usize) -> (Vec<Node>, usize) {
        let end = indented_end(lines, i + 1, 1);
        let nodes = self.explicit_construct(lines[i], &lines[i + 1..end]);
        (nodes, end)
    }
}

fn doctest_block(lines: &[Line<'_>], i: usize) -> (Vec<Node>, usize) {
    let mut end = i;
    while end < lines.len() && !lines[end].is_blank() {
        end += 1;
    }
    let text = join_lines(&lines[i..end]);
    (
        vec![Node::element(Element::DoctestBlock, vec![Node::text(text)])],
        end,
    )
}

fn line_block(lines: &[Line<'_>], i: usize) -> (Vec<Node>, usize) {
    let mut rows: Vec<String> = Vec::new();
    let mut end = i;
    while end < lines.len() && !lines[end].is_blank() {
        let text = lines[end].text;
        if text == "|" || text.starts_with("| ") {
            rows.push(text[1..].trim_start().to_string());
        } else if lines[end].indent() > 0 {
            // Continuation of the previous line.
            if let Some(last) = rows.last_mut() {
                last.push(' ');
                last.push_str(text.trim());
            }
        } else {
            break;
        }
        end += 1;
    }
    let children = parse_inline(&rows.join("\n"));
    (vec![Node::element(Element::LineBlock, children)], end)
}

/// Bullet character starting `text`, if it starts a bullet list item.
fn bullet_marker(text: &str) -> Option<char> {
    let mut chars = text.chars();
    let first = chars.next()?;
    if !BULLETS.contains(first) {
        return None;
    }
    match chars.next() {
        None | Some(' ') => Some(first),
        Some(_) => None,
    }
}

/// An enumerator only starts a list when the next line does not continue a
/// paragraph ("A. Einstein was..." stays a paragraph).
fn enumerated_list_follows(lines: &[Line<'_>], i: usize) -> bool {
    match lines.get(i + 1) {
        None => true,
        Some(next) => next.is_blank() || next.indent() > 0 || ENUMERATOR.is_match(next.text),
    }
}

fn is_definition_term(lines: &[Line<'_>], k: usize) -> bool {
    let (Some(term), Some(definition)) = (lines.get(k), lines.get(k + 1)) else {
        return false;
    };
    let text = term.text;
    term.indent() == 0
        && !term.is_blank()
        && !definition.is_blank()
        && definition.indent() > 0
        && !text.ends_with("::")
        && !(text == ".." || text.starts_with(".. "))
        && bullet_marker(text).is_none()
        && !ENUMERATOR.is_match(text)
        && !FIELD.is_match(text)
}

/// Remove the `::` that announces a literal block.
///
/// `Paragraph::` keeps one colon, `Paragraph ::` keeps none, and a lone `::`
/// leaves no paragraph at all.
fn strip_literal_marker(text: &mut String) {
    text.truncate(text.len() - 2);
    if text.is_empty() || text.ends_with(char::is_whitespace) {
        let trimmed = text.trim_end().len();
        text.truncate(trimmed);
    } else {
        text.push(':');
    }
}

/// End (exclusive) of the block starting at `start` made of lines that are
/// blank or indented at least `min_indent`. Trailing blank lines are left out.
pub(super) fn indented_end(lines: &[Line<'_>], start: usize, min_indent: usize) -> usize {
    let mut end = start;
    let mut j = start;
    while j < lines.len() {
        let line = lines[j];
        j += 1;
        if line.is_blank() {
            continue;
        }
        if line.indent() < min_indent {
            break;
        }
        end = j;
    }
    end
}

fn min_indent(lines: &[Line<'_>]) -> Option<usize> {
    lines
        .iter()
        .filter(|line| !line.is_blank())
        .map(Line::indent)
        .min()
}

/// Remove the common indentation of a block.
pub(super) fn dedent_block<'a>(lines: &[Line<'a>]) -> Vec<Line<'a>> {
    let width = min_indent(lines).unwrap_or(0);
    lines.iter().map(|line| line.dedent(width)).collect()
}

pub(super) fn skip_blank(lines: &[Line<'_>], mut k: usize) -> usize {
    while k < lines.len() && lines[k].is_blank() {
        k += 1;
    }
    k
}

pub(super) fn join_lines(lines: &[Line<'_>]) -> String {
    lines
        .iter()
        .map(|line| line.text)
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::super::RstOptions;
    use super::*;
    use crate::common::extract::extract_text;
    use crate::common::DiagnosticFilter;
    use crate::formats::rst::parse_rst;
    use crate::tree::Document;

    fn body(source: &str) -> Document {
        parse_rst(source, &RstOptions::default())
    }

    fn labels(doc: &Document) -> Vec<String> {
        doc.root.children.iter().map(Node::label).collect()
    }

    fn text(node: &Node) -> String {
        extract_text(node, &DiagnosticFilter::default())
    }

    #[test]
    fn paragraph_lines_are_joined_with_newlines() {
        let doc = body("first line\nsecond *line*\n");
        assert_eq!(labels(&doc), vec!["Paragraph"]);
        assert_eq!(text(&doc.root.children[0]), "first line\nsecond line");
    }

    #[test]
    fn literal_block_forms() {
        let doc = body("Example::\n\n    code()\n      indented\n\nAfter ::\n\n  x\n\n::\n\n  y\n");
        assert_eq!(
            labels(&doc),
            vec!["Paragraph", "LiteralBlock", "Paragraph", "LiteralBlock", "LiteralBlock"]
        );
        assert_eq!(doc.root.children[0].as_text(), "Example:");
        assert_eq!(doc.root.children[1].as_text(), "code()\n  indented");
        assert_eq!(doc.root.children[2].as_text(), "After");
        assert_eq!(text(&doc.root.children[4]), "```y```");
    }

    #[test]
    fn missing_literal_block_is_reported() {
        let doc = body("Dangling::\n");
        let quoted = body("Shell::\n\n$ make\n$ make install\n");
        assert_eq!(quoted.root.children[1].as_text(), "$ make\n$ make install");
        assert_eq!(labels(&doc), vec!["Paragraph"]);
        assert_eq!(doc.diagnostics.len(), 1);
        assert_eq!(doc.diagnostics[0].level, DiagnosticLevel::Warning);
    }

    #[test]
    fn bullet_lists_with_nested_content() {
        let source = "\
- first item
  continues here

- second

  * nested a
  * nested b
";
        let doc = body(source);
        assert_eq!(labels(&doc), vec!["BulletList"]);
        let list = &doc.root.children[0];
        assert_eq!(list.children.len(), 2);
        assert_eq!(text(&list.children[0]), "first item\ncontinues here");
        assert_eq!(list.children[1].children[1].kind, NodeKind::BulletList);
        assert_eq!(
            text(list),
            "first item\ncontinues here\nsecond\nnested a\nnested b"
        );
    }

    #[test]
    fn enumerated_lists_accept_all_styles() {
        for source in ["1. a\n2. b\n", "#. a\n#. b\n", "(a) a\n(b) b\n", "i) a\nii) b\n"] {
            let doc = body(source);
            assert_eq!(labels(&doc), vec!["EnumeratedList"], "{source}");
            assert_eq!(text(&doc.root.children[0]), "a\nb");
        }
    }

    #[test]
    fn enumerator_followed_by_text_is_a_paragraph() {
        let doc = body("A. Einstein was a really\nsmart dude.\n");
        assert_eq!(labels(&doc), vec!["Paragraph"]);
    }

    #[test]
    fn definition_and_field_lists() {
        let doc = body("term : classifier\n   Definition text.\n\nother\n   More.\n\n:author: Me\n:version: 1\n");
        assert_eq!(labels(&doc), vec!["DefinitionList", "FieldList"]);
        assert_eq!(
            text(&doc.root.children[0]),
            "termDefinition text.otherMore."
        );
        assert_eq!(text(&doc.root.children[1]), "authorMeversion1");
    }

    #[test]
    fn block_quotes_doctests_and_line_blocks() {
        let doc = body("  quoted\n  text\n\n>>> 1 + 1\n2\n\n| line one\n| line two\n");
        assert_eq!(labels(&doc), vec!["BlockQuote", "DoctestBlock", "LineBlock"]);
        assert_eq!(text(&doc.root.children[0]), "quoted\ntext");
        assert_eq!(text(&doc.root.children[1]), ">>> 1 + 1\n2");
        assert_eq!(text(&doc.root.children[2]), "line one\nline two");
    }

    #[test]
    fn unexpected_indentation_is_reported() {
        let doc = body("one\ntwo\n   three\n");
        assert_eq!(labels(&doc), vec!["Paragraph", "BlockQuote"]);
        assert_eq!(doc.diagnostics[0].message, "Unexpected indentation.");
        assert_eq!(doc.diagnostics[0].line, 3);
    }

    #[test]
    fn literal_marker_stripping() {
        let mut a = "Example::".to_string();
        strip_literal_marker(&mut a);
        assert_eq!(a, "Example:");
        let mut b = "Example ::".to_string();
        strip_literal_marker(&mut b);
        assert_eq!(b, "Example");
        let mut c = "::".to_string();
        strip_literal_marker(&mut c);
        assert_eq!(c, "");
    }
}

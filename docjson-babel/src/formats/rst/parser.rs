//! reStructuredText parsing (reStructuredText → generic tree)
//!
//! Pipeline: source → normalised lines → top-level scan → generic tree.
//!
//! The top-level scan recognises section titles and hands everything else to
//! the body parser (`blocks`). Section titles carry no explicit level: a level
//! is assigned to each adornment style (underline character, with or without
//! overline) the first time it appears, and the open-section stack shared
//! with the Markdown adapter rebuilds the nesting.

use super::inline::parse_inline;
use super::RstOptions;
use crate::formats::common::SectionStack;
use crate::tree::{Diagnostic, DiagnosticLevel, Document, Node};

const TAB_WIDTH: usize = 8;

/// Characters that may form section adornments and transitions.
const ADORNMENT_CHARS: &str = "!\"#$%&'()*+,-./:;<=>?@[\\]^_`{|}~";

/// One source line, already tab-expanded and right-trimmed, possibly with
/// some indentation removed by an enclosing construct.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) struct Line<'a> {
    pub(super) text: &'a str,
    /// 1-based line number in the original source.
    pub(super) number: usize,
}

impl<'a> Line<'a> {
    pub(super) fn blank(number: usize) -> Self {
        Line { text: "", number }
    }

    pub(super) fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }

    pub(super) fn indent(&self) -> usize {
        self.text.len() - self.text.trim_start_matches(' ').len()
    }

    /// Remove up to `width` leading spaces.
    pub(super) fn dedent(&self, width: usize) -> Line<'a> {
        let cut = width.min(self.indent());
        Line {
            text: &self.text[cut..],
            number: self.number,
        }
    }
}

/// Parser state shared by every nesting level of one document.
pub(super) struct Parser {
    pub(super) options: RstOptions,
    pub(super) diagnostics: Vec<Diagnostic>,
}

impl Parser {
    fn new(options: RstOptions) -> Self {
        Parser {
            options,
            diagnostics: Vec::new(),
        }
    }

    pub(super) fn report(&mut self, level: DiagnosticLevel, line: usize, message: impl Into<String>) {
        self.diagnostics.push(Diagnostic::new(level, line, message));
    }

    /// Level for a title with `style`, given the current section depth.
    fn section_level(
        &mut self,
        styles: &mut Vec<Adornment>,
        style: Adornment,
        depth: usize,
        line: usize,
    ) -> usize {
        let level = match styles.iter().position(|known| *known == style) {
            Some(index) => index + 1,
            None => {
                styles.push(style);
                styles.len()
            }
        };
        if level > depth + 1 {
            self.report(
                DiagnosticLevel::Error,
                line,
                format!(
                    "Title level inconsistent: level {level} under a level {depth} section"
                ),
            );
            return depth + 1;
        }
        level
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Adornment {
    character: char,
    overline: bool,
}

struct Heading {
    style: Adornment,
    title: String,
    /// Index of the first line after the title's adornments.
    next: usize,
}

/// Parse a reStructuredText string into a generic document tree.
///
/// Parsing never fails; problems are collected as [`Diagnostic`]s on the
/// returned document.
pub fn parse_rst(source: &str, options: &RstOptions) -> Document {
    let normalised = normalise(source);
    let lines: Vec<Line<'_>> = normalised
        .iter()
        .enumerate()
        .map(|(index, text)| Line {
            text: text.as_str(),
            number: index + 1,
        })
        .collect();

    let mut parser = Parser::new(*options);
    let mut stack = SectionStack::default();
    let mut styles = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        if lines[i].is_blank() {
            i += 1;
            continue;
        }
        if let Some(heading) = detect_heading(&lines, i) {
            let level =
                parser.section_level(&mut styles, heading.style, stack.depth(), lines[i].number);
            stack.open(level, Node::title(parse_inline(&heading.title)));
            i = heading.next;
            continue;
        }
        let (nodes, next) = parser.parse_block(&lines, i);
        for node in nodes {
            stack.push(node);
        }
        i = next;
    }

    Document::with_diagnostics(stack.finish(), parser.diagnostics)
}

/// Split into lines, expand tabs and strip trailing whitespace.
fn normalise(source: &str) -> Vec<String> {
    let source = source.strip_prefix('\u{feff}').unwrap_or(source);
    source
        .lines()
        .map(|line| expand_tabs(line).trim_end().to_string())
        .collect()
}

fn expand_tabs(line: &str) -> String {
    if !line.contains('\t') {
        return line.to_string();
    }
    let mut out = String::with_capacity(line.len() + TAB_WIDTH);
    let mut column = 0;
    for c in line.chars() {
        if c == '\t' {
            let pad = TAB_WIDTH - column % TAB_WIDTH;
            out.extend(std::iter::repeat(' ').take(pad));
            column += pad;
        } else {
            out.push(c);
            column += 1;
        }
    }
    out
}

/// The repeated character of an adornment line, if `text` is one.
pub(super) fn adornment_char(text: &str) -> Option<char> {
    let first = text.chars().next()?;
    if !ADORNMENT_CHARS.contains(first) || text == "::" {
        return None;
    }
    text.chars().all(|c| c == first).then_some(first)
}

fn detect_heading(lines: &[Line<'_>], i: usize) -> Option<Heading> {
    let line = lines[i];

    if let Some(character) = adornment_char(line.text) {
        // Overline, title text, underline.
        let text = lines.get(i + 1)?;
        let underline = lines.get(i + 2)?;
        if text.is_blank() || adornment_char(underline.text) != Some(character) {
            return None;
        }
        return Some(Heading {
            style: Adornment {
                character,
                overline: true,
            },
            title: text.text.trim().to_string(),
            next: i + 3,
        });
    }

    if line.indent() > 0 {
        return None;
    }
    let underline = lines.get(i + 1)?;
    let character = adornment_char(underline.text)?;
    let underline_width = underline.text.chars().count();
    if underline_width < 4 && underline_width < line.text.chars().count() {
        return None;
    }
    Some(Heading {
        style: Adornment {
            character,
            overline: false,
        },
        title: line.text.to_string(),
        next: i + 2,
    })
}

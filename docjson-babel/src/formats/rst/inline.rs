//! Inline markup recognition.
//!
//! A single left-to-right scan over the characters of one text block. Markup
//! only starts where reStructuredText allows a start-string (start of text,
//! after whitespace or opening punctuation) and only ends where an
//! end-string is allowed (end of text, before whitespace or closing
//! punctuation). Anything that does not form a complete construct stays
//! plain text.

use crate::tree::{Element, Node};
use once_cell::sync::Lazy;
use regex::Regex;

/// `name_` and `name__` references written without backquotes.
static WORD_REFERENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(^|[\s(\[{<"'])([A-Za-z0-9]+(?:[-.+][A-Za-z0-9]+)*)__?($|[\s.,;:!?)\]}>"'])"#)
        .expect("valid word reference pattern")
});

const OPENERS: &str = "-:/'\"<([{";
const CLOSERS: &str = "-.,:;!?\\/'\")]}>";

/// Parse one block of inline text into nodes.
pub(super) fn parse_inline(text: &str) -> Vec<Node> {
    let chars: Vec<char> = text.chars().collect();
    let mut nodes = Vec::new();
    let mut plain = String::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        if c == '\\' {
            // An escaped whitespace disappears; any other escaped character
            // is kept literally and never starts markup.
            if let Some(&next) = chars.get(i + 1) {
                if !next.is_whitespace() {
                    plain.push(next);
                }
            }
            i += 2;
            continue;
        }
        if start_allowed(&chars, i) {
            if let Some((node, end)) = markup_at(&chars, i) {
                flush_plain(&mut plain, &mut nodes);
                nodes.push(node);
                i = end;
                continue;
            }
        }
        plain.push(c);
        i += 1;
    }

    flush_plain(&mut plain, &mut nodes);
    nodes
}

fn flush_plain(plain: &mut String, nodes: &mut Vec<Node>) {
    if plain.is_empty() {
        return;
    }
    let text = strip_word_references(plain);
    nodes.push(Node::text(text));
    plain.clear();
}

fn strip_word_references(text: &str) -> String {
    // Adjacent references share a delimiter, so one pass may leave some behind.
    let mut current = text.to_string();
    loop {
        let next = WORD_REFERENCE
            .replace_all(&current, "$1$2$3")
            .into_owned();
        if next == current {
            return current;
        }
        current = next;
    }
}

fn start_allowed(chars: &[char], i: usize) -> bool {
    i == 0 || {
        let prev = chars[i - 1];
        prev.is_whitespace() || OPENERS.contains(prev)
    }
}

fn end_allowed(chars: &[char], i: usize) -> bool {
    chars
        .get(i)
        .map_or(true, |&c| c.is_whitespace() || CLOSERS.contains(c))
}

fn starts_with(chars: &[char], i: usize, pattern: &str) -> bool {
    pattern
        .chars()
        .enumerate()
        .all(|(offset, p)| chars.get(i + offset) == Some(&p))
}

/// Find `delimiter` at or after `from` such that the character before it is
/// not whitespace. Returns the delimiter's index.
fn find_closing(chars: &[char], from: usize, delimiter: &str) -> Option<usize> {
    let mut k = from;
    while k < chars.len() {
        if starts_with(chars, k, delimiter) && k > from && !chars[k - 1].is_whitespace() {
            return Some(k);
        }
        k += 1;
    }
    None
}

fn collect(chars: &[char], start: usize, end: usize) -> String {
    chars[start..end].iter().collect()
}

/// Try every construct that may start at `i`; returns the node and the index
/// just past it.
fn markup_at(chars: &[char], i: usize) -> Option<(Node, usize)> {
    match chars[i] {
        '`' if starts_with(chars, i, "``") => delimited(chars, i, "``", |inner| {
            Node::element(Element::Literal, vec![Node::text(inner)])
        }),
        '*' if starts_with(chars, i, "**") => delimited(chars, i, "**", |inner| {
            Node::element(Element::Strong, vec![Node::text(inner)])
        }),
        '*' => delimited(chars, i, "*", |inner| {
            Node::element(Element::Emphasis, vec![Node::text(inner)])
        }),
        '`' => interpreted(chars, i, None),
        ':' => role(chars, i),
        '|' => substitution(chars, i),
        '[' => footnote_reference(chars, i),
        _ => None,
    }
}

fn delimited(
    chars: &[char],
    i: usize,
    delimiter: &str,
    build: impl FnOnce(String) -> Node,
) -> Option<(Node, usize)> {
    let open = delimiter.chars().count();
    let content_start = i + open;
    if chars.get(content_start).map_or(true, |c| c.is_whitespace()) {
        return None;
    }
    let mut from = content_start;
    loop {
        let close = find_closing(chars, from, delimiter)?;
        let end = close + open;
        if end_allowed(chars, end) {
            return Some((build(collect(chars, content_start, close)), end));
        }
        from = close + 1;
    }
}

/// Backquoted text: a hyperlink reference when followed by `_`/`__`,
/// otherwise interpreted text with `role` (default `title-reference`).
fn interpreted(chars: &[char], backquote: usize, role: Option<String>) -> Option<(Node, usize)> {
    let content_start = backquote + 1;
    if chars.get(content_start).map_or(true, |c| c.is_whitespace()) {
        return None;
    }
    let mut from = content_start;
    loop {
        let close = find_closing(chars, from, "`")?;
        let mut end = close + 1;
        let mut reference = false;
        if role.is_none() && chars.get(end) == Some(&'_') {
            reference = true;
            end += 1;
            if chars.get(end) == Some(&'_') {
                end += 1;
            }
        }
        if end_allowed(chars, end) {
            let inner = collect(chars, content_start, close);
            let node = if reference {
                Node::element(Element::Reference, vec![Node::text(display_text(&inner))])
            } else {
                role_node(role.as_deref().unwrap_or("title-reference"), &inner)
            };
            return Some((node, end));
        }
        from = close + 1;
    }
}

fn role(chars: &[char], i: usize) -> Option<(Node, usize)> {
    // Role names may themselves contain colons (`py:func`), so scan to the
    // backquote and require the colon right before it.
    let mut k = i + 1;
    while k < chars.len() && is_role_char(chars[k]) {
        k += 1;
    }
    if chars.get(k) != Some(&'`') || k < i + 3 || chars[k - 1] != ':' {
        return None;
    }
    let name = collect(chars, i + 1, k - 1);
    interpreted(chars, k, Some(name))
}

fn is_role_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || "-_.:+".contains(c)
}

fn role_node(role: &str, inner: &str) -> Node {
    match role {
        "emphasis" => Node::element(Element::Emphasis, vec![Node::text(inner)]),
        "strong" => Node::element(Element::Strong, vec![Node::text(inner)]),
        "literal" | "code" => Node::element(Element::Literal, vec![Node::text(inner)]),
        "math" => Node::element(
            Element::InterpretedText(role.to_string()),
            vec![Node::text(inner)],
        ),
        _ => Node::element(
            Element::InterpretedText(role.to_string()),
            vec![Node::text(display_text(inner))],
        ),
    }
}

/// Visible text of a reference or cross-reference target.
///
/// `Title <target>` shows `Title`; `<target>` alone shows the target;
/// `~a.b.c` shows `c`; a leading `!` is dropped.
fn display_text(inner: &str) -> String {
    let inner = inner.trim();
    if let Some(stripped) = inner.strip_suffix('>') {
        if let Some(open) = stripped.rfind('<') {
            let title = stripped[..open].trim();
            let target = stripped[open + 1..].trim();
            if open == 0 || stripped[..open].ends_with(char::is_whitespace) {
                return if title.is_empty() {
                    target.to_string()
                } else {
                    title.to_string()
                };
            }
        }
    }
    let inner = inner.strip_prefix('!').unwrap_or(inner);
    match inner.strip_prefix('~') {
        Some(path) => path.rsplit('.').next().unwrap_or(path).to_string(),
        None => inner.to_string(),
    }
}

fn substitution(chars: &[char], i: usize) -> Option<(Node, usize)> {
    let content_start = i + 1;
    if chars.get(content_start).map_or(true, |c| c.is_whitespace()) {
        return None;
    }
    let close = find_closing(chars, content_start, "|")?;
    let mut end = close + 1;
    while chars.get(end) == Some(&'_') && end < close + 3 {
        end += 1;
    }
    if !end_allowed(chars, end) {
        return None;
    }
    let name = collect(chars, content_start, close);
    Some((
        Node::element(Element::SubstitutionReference, vec![Node::text(name)]),
        end,
    ))
}

fn footnote_reference(chars: &[char], i: usize) -> Option<(Node, usize)> {
    let close = (i + 1..chars.len()).find(|&k| chars[k] == ']')?;
    if close == i + 1 || chars.get(close + 1) != Some(&'_') {
        return None;
    }
    let label = collect(chars, i + 1, close);
    if label.chars().any(char::is_whitespace) {
        return None;
    }
    let end = close + 2;
    if !end_allowed(chars, end) {
        return None;
    }
    Some((
        Node::element(Element::FootnoteReference, vec![Node::text(label)]),
        end,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_of(source: &str) -> String {
        parse_inline(source).iter().map(Node::as_text).collect()
    }

    fn kinds(source: &str) -> Vec<String> {
        parse_inline(source).iter().map(Node::label).collect()
    }

    #[test]
    fn plain_text_is_one_node() {
        let nodes = parse_inline("just words");
        assert_eq!(nodes, vec![Node::text("just words")]);
    }

    #[test]
    fn emphasis_strong_and_literal() {
        let nodes = parse_inline("a *b* **c** ``d``");
        assert_eq!(nodes.len(), 6);
        assert_eq!(nodes[1], Node::element(Element::Emphasis, vec![Node::text("b")]));
        assert_eq!(nodes[3], Node::element(Element::Strong, vec![Node::text("c")]));
        assert_eq!(nodes[5], Node::element(Element::Literal, vec![Node::text("d")]));
        assert_eq!(text_of("a *b* **c** ``d``"), "a b c d");
    }

    #[test]
    fn markup_needs_valid_start_and_end() {
        assert_eq!(text_of("2*3*4"), "2*3*4");
        assert_eq!(text_of("a * b * c"), "a * b * c");
        assert_eq!(text_of("*unclosed"), "*unclosed");
    }

    #[test]
    fn literal_keeps_backslashes_and_asterisks() {
        assert_eq!(text_of(r"``C:\path\*.txt``"), r"C:\path\*.txt");
    }

    #[test]
    fn escapes_prevent_markup() {
        assert_eq!(text_of(r"\*not emphasis\*"), "*not emphasis*");
        assert_eq!(text_of(r"word\ s"), "words");
    }

    #[test]
    fn roles_and_references_show_their_title() {
        assert_eq!(text_of(":ref:`Install guide <install>` now"), "Install guide now");
        assert_eq!(text_of("see `Python <https://python.org>`_."), "see Python.");
        assert_eq!(text_of(":func:`~pkg.mod.run`"), "run");
        assert_eq!(text_of(":doc:`<target>`"), "target");
        assert_eq!(text_of("`anon`__ link"), "anon link");
        assert_eq!(
            kinds(":emphasis:`x` `y`"),
            vec!["Emphasis", "Text", "InterpretedText[title-reference]"]
        );
    }

    #[test]
    fn word_references_lose_their_underscores() {
        assert_eq!(text_of("read docutils_ and sphinx__."), "read docutils and sphinx.");
        assert_eq!(text_of("keep __init__ and snake_case"), "keep __init__ and snake_case");
    }

    #[test]
    fn footnote_and_substitution_references() {
        let nodes = parse_inline("Value |version| cited [1]_ here");
        assert_eq!(
            nodes[1],
            Node::element(Element::SubstitutionReference, vec![Node::text("version")])
        );
        assert_eq!(
            nodes[3],
            Node::element(Element::FootnoteReference, vec![Node::text("1")])
        );
        assert_eq!(text_of("[not a ref] here"), "[not a ref] here");
    }
}

//! Text extraction: the best-effort string form of any tree node.
//!
//! # Rules
//!
//!     Applied by node kind, first match wins:
//!
//!     1. Text: the payload, or "" when the payload contains a denylisted
//!        diagnostic substring.
//!     2. LiteralBlock: the block's full text taken as one unit (children are
//!        not visited individually), run through the same filter and wrapped
//!        in ``` fences so consumers can tell code from prose.
//!     3. Lists and list items: each child is extracted, blank results are
//!        dropped and the trimmed rest joined with "\n". No bullet glyph is
//!        added, the newline is the list.
//!     4. Anything else (sections and titles included): the children's
//!        extractions concatenated with no separator.
//!
//!     The value handed back to callers is always trimmed. Inside rule 4,
//!     Text and LiteralBlock children contribute their untrimmed value so that
//!     inline runs such as "Hello " followed by an emphasis keep their spacing;
//!     every other child contributes its trimmed value.

use super::filter::DiagnosticFilter;
use crate::tree::{Node, NodeKind};

/// Delimiter placed before and after literal block text.
pub const CODE_FENCE: &str = "```";

/// Extract the trimmed text of `node`.
pub fn extract_text(node: &Node, filter: &DiagnosticFilter) -> String {
    extract_raw(node, filter).trim().to_string()
}

fn extract_raw(node: &Node, filter: &DiagnosticFilter) -> String {
    match &node.kind {
        NodeKind::Text(payload) => {
            if filter.matches(payload) {
                String::new()
            } else {
                payload.clone()
            }
        }
        NodeKind::LiteralBlock => {
            let code = node.as_text();
            if filter.matches(&code) {
                String::new()
            } else {
                format!("{CODE_FENCE}{code}{CODE_FENCE}")
            }
        }
        _ if node.is_list_like() => node
            .children
            .iter()
            .map(|child| extract_raw(child, filter))
            .filter(|item| !item.trim().is_empty())
            .map(|item| item.trim().to_string())
            .collect::<Vec<_>>()
            .join("\n")
            .trim()
            .to_string(),
        _ => node
            .children
            .iter()
            .map(|child| extract_raw(child, filter))
            .collect::<String>()
            .trim()
            .to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::Element;
    use proptest::prelude::*;

    fn filter() -> DiagnosticFilter {
        DiagnosticFilter::default()
    }

    #[test]
    fn text_is_trimmed_at_the_top() {
        assert_eq!(extract_text(&Node::text("  hello \n"), &filter()), "hello");
    }

    #[test]
    fn diagnostic_text_is_dropped() {
        let node = Node::text("Unknown directive type \"toctree\".");
        assert_eq!(extract_text(&node, &filter()), "");
    }

    #[test]
    fn literal_block_is_fenced_and_untouched_inside() {
        let node = Node::literal_block("  indented()\n\nlast line  ");
        assert_eq!(
            extract_text(&node, &filter()),
            "```  indented()\n\nlast line  ```"
        );
    }

    #[test]
    fn literal_block_with_diagnostic_is_dropped() {
        let node = Node::literal_block(".. foo::\n\nNo directive entry for \"foo\"");
        assert_eq!(extract_text(&node, &filter()), "");
    }

    #[test]
    fn literal_block_reads_nested_text_as_one_unit() {
        let node = Node::new(
            NodeKind::LiteralBlock,
            vec![
                Node::text("print("),
                Node::element(Element::Strong, vec![Node::text("x")]),
                Node::text(")"),
            ],
        );
        assert_eq!(extract_text(&node, &filter()), "```print(x)```");
    }

    #[test]
    fn list_drops_blank_items_and_joins_with_newline() {
        let list = Node::new(
            NodeKind::BulletList,
            vec![
                Node::new(NodeKind::ListItem, vec![Node::paragraph(vec![Node::text("a")])]),
                Node::new(NodeKind::ListItem, vec![Node::paragraph(vec![Node::text("  ")])]),
                Node::new(NodeKind::ListItem, vec![Node::paragraph(vec![Node::text("b")])]),
            ],
        );
        assert_eq!(extract_text(&list, &filter()), "a\nb");
    }

    #[test]
    fn list_item_with_nested_list_joins_lines() {
        let item = Node::new(
            NodeKind::ListItem,
            vec![
                Node::paragraph(vec![Node::text("parent")]),
                Node::new(
                    NodeKind::EnumeratedList,
                    vec![
                        Node::new(NodeKind::ListItem, vec![Node::text("one")]),
                        Node::new(NodeKind::ListItem, vec![Node::text("two")]),
                    ],
                ),
            ],
        );
        assert_eq!(extract_text(&item, &filter()), "parent\none\ntwo");
    }

    #[test]
    fn generic_nodes_concatenate_without_separator() {
        let paragraph = Node::paragraph(vec![
            Node::text("Hello "),
            Node::element(Element::Emphasis, vec![Node::text(" world ")]),
            Node::text("!"),
        ]);
        assert_eq!(extract_text(&paragraph, &filter()), "Hello world!");
    }

    #[test]
    fn adjacent_text_runs_keep_their_inner_whitespace() {
        let paragraph = Node::paragraph(vec![Node::text("  a "), Node::text(" b  ")]);
        assert_eq!(extract_text(&paragraph, &filter()), "a  b");
    }

    #[test]
    fn section_and_title_fall_through_to_concatenation() {
        let section = Node::section(vec![
            Node::title(vec![Node::text("Title")]),
            Node::paragraph(vec![Node::text("Body")]),
        ]);
        assert_eq!(extract_text(&section, &filter()), "TitleBody");
    }

    #[test]
    fn diagnostic_inside_paragraph_only_drops_that_run() {
        let message = Node::element(
            Element::SystemMessage,
            vec![Node::paragraph(vec![Node::text(
                "Unknown directive type \"automodule\".",
            )])],
        );
        let section = Node::element(
            Element::Container,
            vec![Node::paragraph(vec![Node::text("kept")]), message],
        );
        assert_eq!(extract_text(&section, &filter()), "kept");
    }

    #[test]
    fn disabled_filter_keeps_messages() {
        let node = Node::text("Unknown directive type \"x\".");
        assert_eq!(
            extract_text(&node, &DiagnosticFilter::disabled()),
            "Unknown directive type \"x\"."
        );
    }

    proptest! {
        #[test]
        fn clean_text_round_trips_trimmed(payload in "[a-zA-Z0-9 .,\n]{0,40}") {
            let node = Node::text(payload.clone());
            prop_assert_eq!(extract_text(&node, &filter()), payload.trim());
        }

        #[test]
        fn denylisted_text_is_always_empty(
            prefix in "[a-z ]{0,10}",
            suffix in "[a-z ]{0,10}",
            pick in 0usize..2,
        ) {
            let needle = super::super::filter::DEFAULT_DENYLIST[pick];
            let node = Node::text(format!("{prefix}{needle}{suffix}"));
            prop_assert_eq!(extract_text(&node, &filter()), "");
        }

        #[test]
        fn literal_payload_is_wrapped_verbatim(code in "[a-z(){} \n]{0,30}") {
            let node = Node::literal_block(code.clone());
            prop_assert_eq!(extract_text(&node, &filter()), format!("```{code}```"));
        }
    }
}

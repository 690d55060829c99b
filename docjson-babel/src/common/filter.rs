//! Diagnostic substring denylist.
//!
//! Parsers that report problems inline (as text nodes inside the tree)
//! leave messages like `Unknown directive type "toctree".` in the middle of
//! prose. The projector drops any text run containing one of these
//! substrings. This is plain substring matching: a paragraph that quotes one
//! of the phrases is dropped too.

/// Substrings dropped by default.
pub const DEFAULT_DENYLIST: &[&str] = &["Unknown directive type", "No directive entry"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosticFilter {
    denylist: Vec<String>,
}

impl DiagnosticFilter {
    pub fn new<I, S>(denylist: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        DiagnosticFilter {
            denylist: denylist
                .into_iter()
                .map(Into::into)
                .filter(|entry: &String| !entry.is_empty())
                .collect(),
        }
    }

    /// A filter that keeps everything.
    pub fn disabled() -> Self {
        DiagnosticFilter {
            denylist: Vec::new(),
        }
    }

    /// True when `text` contains a denylisted substring.
    pub fn matches(&self, text: &str) -> bool {
        self.denylist.iter().any(|entry| text.contains(entry.as_str()))
    }

    pub fn denylist(&self) -> &[String] {
        &self.denylist
    }
}

impl Default for DiagnosticFilter {
    fn default() -> Self {
        DiagnosticFilter::new(DEFAULT_DENYLIST.iter().copied())
    }
}

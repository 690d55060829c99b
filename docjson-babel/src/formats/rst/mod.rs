//! reStructuredText format implementation
//!
//! A self-contained block and inline parser builds the generic tree; the
//! shared section projection does the rest.
//!
//! # Element Mapping Table
//!
//! | reStructuredText                 | Generic tree                        |
//! |----------------------------------|-------------------------------------|
//! | Section title (adorned)          | Section + Title, nested by style    |
//! | Paragraph                        | Paragraph                           |
//! | `::` block, code directives      | LiteralBlock                        |
//! | `-`/`*`/`+` lists, `1.` lists    | BulletList / EnumeratedList         |
//! | Definition / field lists         | DefinitionList / FieldList          |
//! | Indented block                   | BlockQuote                          |
//! | Grid, simple, csv and list tables| Table / Row / Cell                  |
//! | Admonitions, topics              | Admonition / Topic (with Title)     |
//! | Comments, targets, substitutions | childless nodes, no text            |
//! | Unknown directive                | diagnostic (and SystemMessage)      |
//!
//! # Diagnostics
//!
//! Parser problems never fail a parse. They are collected on
//! [`Document::diagnostics`](crate::tree::Document) and logged by the
//! projection. [`RstOptions::inline_diagnostics`] additionally places the
//! message for unknown directives in the tree, where the projection's
//! denylist filters it out of the content.

mod blocks;
mod directives;
mod inline;
mod parser;
mod tables;

pub use parser::parse_rst;

use crate::error::FormatError;
use crate::format::Format;
use crate::tree::Document;

/// Parser settings for reStructuredText.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RstOptions {
    /// Insert a SystemMessage node where an unknown directive was found.
    pub inline_diagnostics: bool,
}

/// Format implementation for reStructuredText
#[derive(Debug, Clone, Default)]
pub struct RstFormat {
    options: RstOptions,
}

impl RstFormat {
    pub fn new(options: RstOptions) -> Self {
        RstFormat { options }
    }

    pub fn options(&self) -> RstOptions {
        self.options
    }
}

impl Format for RstFormat {
    fn name(&self) -> &str {
        "rst"
    }

    fn description(&self) -> &str {
        "reStructuredText"
    }

    fn file_extensions(&self) -> &[&str] {
        &["rst", "rest"]
    }

    fn supports_parsing(&self) -> bool {
        true
    }

    fn parse(&self, source: &str) -> Result<Document, FormatError> {
        Ok(parse_rst(source, &self.options))
    }
}

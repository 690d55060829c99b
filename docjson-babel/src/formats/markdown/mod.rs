//! Markdown format implementation
//!
//! Markdown sources are projected in one of two modes:
//!
//! | Mode         | Projection                                   |
//! |--------------|----------------------------------------------|
//! | `verbatim`   | `{"content": <whole file>}` (default)        |
//! | `structured` | section records, like reStructuredText       |
//!
//! # Library Choice
//!
//! Structured mode parses with `comrak` (CommonMark compliant, GFM tables
//! and front matter supported) and maps its AST onto the generic tree. The
//! heading hierarchy is rebuilt with a stack, see [`parser`].
//!
//! # Element Mapping Table
//!
//! | Markdown            | Generic tree                    |
//! |---------------------|---------------------------------|
//! | Heading (# ## ###)  | Section + Title, nested by level|
//! | Paragraph           | Paragraph of text runs          |
//! | Code block          | LiteralBlock                    |
//! | List (- / 1.)       | BulletList / EnumeratedList     |
//! | List item           | ListItem                        |
//! | Block quote         | BlockQuote                      |
//! | Table               | Table / Row / Cell              |
//! | HTML, front matter  | dropped                         |

pub mod parser;

use crate::common::{Projection, ProjectionOptions};
use crate::error::FormatError;
use crate::format::Format;
use crate::tree::Document;

/// How Markdown sources are projected.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MarkdownMode {
    /// Wrap the whole file as `{"content": ...}`.
    #[default]
    Verbatim,
    /// Parse headings into sections and project them.
    Structured,
}

/// Format implementation for Markdown
#[derive(Debug, Clone, Default)]
pub struct MarkdownFormat {
    mode: MarkdownMode,
}

impl MarkdownFormat {
    pub fn new(mode: MarkdownMode) -> Self {
        MarkdownFormat { mode }
    }

    pub fn mode(&self) -> MarkdownMode {
        self.mode
    }
}

impl Format for MarkdownFormat {
    fn name(&self) -> &str {
        "markdown"
    }

    fn description(&self) -> &str {
        "CommonMark Markdown"
    }

    fn file_extensions(&self) -> &[&str] {
        &["md", "markdown"]
    }

    fn supports_parsing(&self) -> bool {
        true
    }

    fn parse(&self, source: &str) -> Result<Document, FormatError> {
        Ok(parser::parse_markdown(source))
    }

    fn project(&self, source: &str, options: &ProjectionOptions) -> Result<Projection, FormatError> {
        match self.mode {
            MarkdownMode::Verbatim => Ok(Projection::flat(source)),
            MarkdownMode::Structured => {
                let doc = self.parse(source)?;
                Ok(Projection::Sections(
                    crate::common::sections::project_document(&doc, options),
                ))
            }
        }
    }
}

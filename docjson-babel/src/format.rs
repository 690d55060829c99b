//! Format trait definition
//!
//! This module defines the core Format trait that all source formats implement.
//! A format either builds a generic document tree (and gets the shared section
//! projection for free) or produces its projection directly.

use crate::common::sections::project_document;
use crate::common::{Projection, ProjectionOptions};
use crate::error::FormatError;
use crate::tree::Document;

/// Trait for source formats
///
/// Implementors turn source text into a [`Projection`]. Tree-producing
/// formats override [`Format::parse`] and keep the default
/// [`Format::project`]; flat formats override `project` only.
///
/// # Examples
///
/// ```ignore
/// struct MyFormat;
///
/// impl Format for MyFormat {
///     fn name(&self) -> &str {
///         "my-format"
///     }
///
///     fn file_extensions(&self) -> &[&str] {
///         &["my"]
///     }
///
///     fn supports_parsing(&self) -> bool {
///         true
///     }
///
///     fn parse(&self, source: &str) -> Result<Document, FormatError> {
///         // Build the generic tree
///         todo!()
///     }
/// }
/// ```
pub trait Format: Send + Sync {
    /// The name of this format (e.g., "rst", "markdown", "notebook")
    fn name(&self) -> &str;

    /// Optional description of this format
    fn description(&self) -> &str {
        ""
    }

    /// File extensions associated with this format (e.g., ["rst"], ["md", "markdown"])
    ///
    /// Returns a slice of file extensions without the leading dot.
    /// Used for dispatch by filename.
    fn file_extensions(&self) -> &[&str] {
        &[]
    }

    /// Whether this format builds a generic document tree
    fn supports_parsing(&self) -> bool {
        false
    }

    /// Parse source text into a generic document tree
    ///
    /// Default implementation returns NotSupported error.
    fn parse(&self, _source: &str) -> Result<Document, FormatError> {
        Err(FormatError::NotSupported(format!(
            "Format '{}' does not build a document tree",
            self.name()
        )))
    }

    /// Project source text into its JSON-ready records
    ///
    /// The default parses the source and projects every section of the tree.
    fn project(&self, source: &str, options: &ProjectionOptions) -> Result<Projection, FormatError> {
        let doc = self.parse(source)?;
        report_diagnostics(&doc);
        Ok(Projection::Sections(project_document(&doc, options)))
    }
}

/// Forward out-of-band parser diagnostics to the log.
pub(crate) fn report_diagnostics(doc: &Document) {
    use crate::tree::DiagnosticLevel;

    for diagnostic in &doc.diagnostics {
        match diagnostic.level {
            DiagnosticLevel::Info => {
                tracing::debug!(line = diagnostic.line, "{}", diagnostic.message)
            }
            DiagnosticLevel::Warning | DiagnosticLevel::Error => {
                tracing::warn!(line = diagnostic.line, "{}", diagnostic.message)
            }
        }
    }
}

//! Format registry for format discovery and dispatch
//!
//! This module provides a centralized registry for all available formats.
//! Formats can be registered and retrieved by name, and files are dispatched
//! to a format purely by extension.

use crate::common::{Projection, ProjectionOptions};
use crate::error::FormatError;
use crate::format::Format;
use crate::tree::Document;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Registry of source formats
///
/// # Examples
///
/// ```ignore
/// let mut registry = FormatRegistry::new();
/// registry.register(MyFormat);
///
/// let format = registry.get("my-format")?;
/// let projection = format.project("source text", &ProjectionOptions::default())?;
/// ```
pub struct FormatRegistry {
    formats: HashMap<String, Box<dyn Format>>,
}

impl FormatRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        FormatRegistry {
            formats: HashMap::new(),
        }
    }

    /// Register a format
    ///
    /// If a format with the same name already exists, it will be replaced.
    pub fn register<F: Format + 'static>(&mut self, format: F) {
        self.formats
            .insert(format.name().to_string(), Box::new(format));
    }

    /// Get a format by name
    pub fn get(&self, name: &str) -> Result<&dyn Format, FormatError> {
        self.formats
            .get(name)
            .map(|f| f.as_ref())
            .ok_or_else(|| FormatError::FormatNotFound(name.to_string()))
    }

    /// Check if a format exists
    pub fn has(&self, name: &str) -> bool {
        self.formats.contains_key(name)
    }

    /// List all available format names (sorted)
    pub fn list_formats(&self) -> Vec<String> {
        let mut names: Vec<_> = self.formats.keys().cloned().collect();
        names.sort();
        names
    }

    /// Detect format from filename based on file extension
    ///
    /// Returns the format name if a matching extension is found, or None otherwise.
    /// Matching is case-sensitive, as returned by `Path::extension()`.
    ///
    /// # Examples
    ///
    /// ```ignore
    /// let registry = FormatRegistry::default();
    /// assert_eq!(registry.detect_format_from_filename("doc.rst"), Some("rst".to_string()));
    /// assert_eq!(registry.detect_format_from_filename("doc.md"), Some("markdown".to_string()));
    /// assert_eq!(registry.detect_format_from_filename("doc.unknown"), None);
    /// ```
    pub fn detect_format_from_filename(&self, filename: impl AsRef<Path>) -> Option<String> {
        let extension = filename.as_ref().extension().and_then(|ext| ext.to_str())?;

        self.formats
            .values()
            .find(|format| format.file_extensions().contains(&extension))
            .map(|format| format.name().to_string())
    }

    /// Parse source text into a tree using the specified format
    pub fn parse(&self, source: &str, format: &str) -> Result<Document, FormatError> {
        let fmt = self.get(format)?;
        if !fmt.supports_parsing() {
            return Err(FormatError::NotSupported(format!(
                "Format '{format}' does not build a document tree"
            )));
        }
        fmt.parse(source)
    }

    /// Project source text using the specified format
    pub fn project(
        &self,
        source: &str,
        format: &str,
        options: &ProjectionOptions,
    ) -> Result<Projection, FormatError> {
        self.get(format)?.project(source, options)
    }

    /// Read and project a file, choosing the format by extension
    ///
    /// Returns `Ok(None)` for files no registered format claims.
    pub fn project_file(
        &self,
        path: &Path,
        options: &ProjectionOptions,
    ) -> Result<Option<Projection>, FormatError> {
        let Some(format) = self.detect_format_from_filename(path) else {
            return Ok(None);
        };
        let source = fs::read_to_string(path).map_err(|err| FormatError::io(path, err))?;
        self.project(&source, &format, options).map(Some)
    }

    /// Create a registry with default formats
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();

        registry.register(crate::formats::rst::RstFormat::default());
        registry.register(crate::formats::markdown::MarkdownFormat::default());
        registry.register(crate::formats::notebook::NotebookFormat);

        registry
    }
}

impl Default for FormatRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

//! Jupyter notebook format
//!
//! Notebooks are rendered to Markdown text (see [`render`]) and wrapped whole
//! as `{"content": ...}`, like verbatim Markdown.

pub mod render;

use crate::common::{Projection, ProjectionOptions};
use crate::error::FormatError;
use crate::format::Format;

/// Format implementation for `.ipynb` notebooks
pub struct NotebookFormat;

impl Format for NotebookFormat {
    fn name(&self) -> &str {
        "notebook"
    }

    fn description(&self) -> &str {
        "Jupyter notebook (nbformat 4), rendered to Markdown"
    }

    fn file_extensions(&self) -> &[&str] {
        &["ipynb"]
    }

    fn project(&self, source: &str, _options: &ProjectionOptions) -> Result<Projection, FormatError> {
        render::render_notebook(source).map(Projection::flat)
    }
}

//! Source format implementations

pub(crate) mod common;
pub mod markdown;
pub mod notebook;
pub mod rst;

pub use markdown::{MarkdownFormat, MarkdownMode};
pub use notebook::NotebookFormat;
pub use rst::{RstFormat, RstOptions};

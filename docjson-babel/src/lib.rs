//! Projection of documentation sources into nested JSON
//!
//!     This crate turns a tree of documentation files (reStructuredText, Markdown, Jupyter
//!     notebooks) into JSON records that keep the section hierarchy of each document.
//!
//!     TLDR: For format authors:
//!         - A format either builds the generic document tree (./tree) and gets the shared
//!           section projection for free, or produces its projection directly.
//!         - Formats never walk directories or write files; collection and publishing do that.
//!         - Each format has unit tests next to the code and fixture based tests under tests/.
//!
//! Architecture
//!
//!     Parser adapters (./formats) build a format agnostic tree of nodes (./tree). The projector
//!     (./common) turns any such tree into section records: a title, the flattened text of the
//!     section's own content and the records of its subsections. Formats with no useful structure
//!     (verbatim Markdown, rendered notebooks) skip the tree and wrap the whole text instead.
//!
//!     Above the formats sit the directory walk (./collection.rs), the partitioning passes over
//!     the resulting JSON mapping (./split.rs) and the output pipeline (./publish.rs).
//!
//!     This is a pure lib: it powers the docjson cli but is shell agnostic, no code here reads
//!     env vars or prints to stdout. Progress and per-file failures go through `tracing`.
//!
//!     The file structure :
//!     .
//!     ├── error.rs
//!     ├── format.rs               # Format trait definition
//!     ├── registry.rs             # FormatRegistry, dispatch by file extension
//!     ├── tree                    # Generic document tree and its text outline
//!     ├── common                  # Text extraction and section projection
//!     ├── formats
//!     │   ├── common              # Heading stack shared by tree builders
//!     │   ├── rst                 # reStructuredText block and inline parser
//!     │   ├── markdown            # Verbatim or comrak based structured mode
//!     │   └── notebook            # nbformat v4 to Markdown rendering
//!     ├── collection.rs           # Directory walk, path keyed collection
//!     ├── split.rs                # per-key, count and size partitioning
//!     ├── publish.rs              # Output modes and file writing
//!     └── lib.rs
//!
//! Testing
//!     tests
//!     ├── lib.rs
//!     ├── <area>
//!     │   └── mod.rs
//!     └── fixtures
//!         ├── guide.rst
//!         ├── readme.md
//!         └── analysis.ipynb
//!
//!     Note that rust does not by default discover tests in subdirectories, so tests/lib.rs
//!     pulls them in as modules.
//!
//! Core Algorithms
//!
//!     Text extraction (./common/extract.rs) flattens any node into a string. Text runs that
//!     contain a denylisted diagnostic substring are dropped, literal blocks are fenced, lists
//!     join their trimmed non-empty children with newlines and everything else concatenates
//!     its children. Text runs keep their spacing inside a concatenation; only the value
//!     handed back for the requested node is trimmed.
//!
//!     Section projection (./common/sections.rs) maps a section node to a record. The title is the
//!     first title node found anywhere below the section; content is the extracted text of each
//!     direct child that is neither a title nor a section; subsections recurse. Documents are
//!     projected by collecting every section of the tree in preorder.
//!
//! Library Choices
//!
//!     - comrak parses Markdown into an AST for the structured mode.
//!     - reStructuredText has no maintained Rust parser, the adapter in ./formats/rst is hand
//!       written with `regex` for the line level patterns.
//!     - walkdir drives the sorted directory walk, serde_json the output.

pub mod collection;
pub mod common;
pub mod error;
pub mod format;
pub mod formats;
pub mod publish;
pub mod registry;
pub mod split;
pub mod tree;

pub use collection::{collect_directory, Collection, FileFailure};
pub use common::{DiagnosticFilter, FlatRecord, Projection, ProjectionOptions, SectionRecord};
pub use error::FormatError;
pub use format::Format;
pub use formats::{MarkdownFormat, MarkdownMode, NotebookFormat, RstFormat, RstOptions};
pub use publish::{publish, split_file, OutputMode, PublishReport, PublishSpec};
pub use registry::FormatRegistry;
pub use tree::{Diagnostic, DiagnosticLevel, Document, Node};

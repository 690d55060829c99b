//! Generic document tree shared by every parser adapter.
//!
//! Adapters turn source text into a [`Document`]; the projector in
//! [`crate::common`] turns the tree into JSON-ready records. Nothing in the
//! tree is format specific apart from the informational [`Element`] tags.

pub mod nodes;
pub mod treeviz;

pub use nodes::{Descendants, Diagnostic, DiagnosticLevel, Document, Element, Node, NodeKind};

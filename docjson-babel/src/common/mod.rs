//! Format-agnostic projection core.
//!
//! Parser adapters in [`crate::formats`] only build trees; everything that
//! turns a tree into JSON-ready records lives here and is shared by every
//! tree-producing format:
//!
//! - [`extract`]: best-effort text of any node
//! - [`sections`]: section records, recursively
//! - [`filter`]: the diagnostic substring denylist
//! - [`records`]: the serializable output types

pub mod extract;
pub mod filter;
pub mod records;
pub mod sections;

pub use filter::DiagnosticFilter;
pub use records::{FlatRecord, Projection, SectionRecord};

/// Knobs of the projection step.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectionOptions {
    /// Text runs containing any of these substrings are dropped.
    pub filter: DiagnosticFilter,
    /// Let Title and Section children also contribute flattened text to a
    /// section's `content` (see [`sections`]).
    pub subsection_echo: bool,
}

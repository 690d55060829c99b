//! Output records of the projection.

use serde::{Deserialize, Serialize};

/// One projected section: its title, the text of its direct children and
/// its nested sections.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionRecord {
    pub title: String,
    pub content: Vec<String>,
    pub sections: Vec<SectionRecord>,
}

/// Flat-text sources (Markdown, notebooks) are wrapped whole.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlatRecord {
    pub content: String,
}

/// The projection of a single source file.
///
/// Serializes untagged: markup sources become a JSON array of section
/// records, flat sources a `{"content": ...}` object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Projection {
    Sections(Vec<SectionRecord>),
    Flat(FlatRecord),
}

impl Projection {
    pub fn flat(content: impl Into<String>) -> Self {
        Projection::Flat(FlatRecord {
            content: content.into(),
        })
    }
}

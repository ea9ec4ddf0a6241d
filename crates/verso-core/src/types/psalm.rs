//! Psalm-specific chapter metadata

use serde::{Deserialize, Serialize};

/// Section heading anchored inside a Psalm
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PsalmSection {
    /// Verse number after which the heading appears
    pub after_verse: String,

    /// Heading text
    pub heading: String,
}

/// Metadata extracted from a Psalm chapter
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PsalmMetadata {
    /// Psalm number
    pub number: u32,

    /// Whether any verse contains "Selah"
    pub has_selah: bool,

    /// Introductory title, e.g. "A Psalm of David."
    #[serde(skip_serializing_if = "Option::is_none")]
    pub superscription: Option<String>,

    /// Musical direction taken from the superscription
    #[serde(skip_serializing_if = "Option::is_none")]
    pub musical_notation: Option<String>,

    /// Headings inside the Psalm body
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub section_headings: Vec<PsalmSection>,
}

impl PsalmMetadata {
    /// Create metadata for the given Psalm number
    pub fn new(number: u32) -> Self {
        Self {
            number,
            ..Default::default()
        }
    }

    /// Record a section heading after the given verse
    pub fn push_section(&mut self, after_verse: impl Into<String>, heading: impl Into<String>) {
        self.section_headings.push(PsalmSection {
            after_verse: after_verse.into(),
            heading: heading.into(),
        });
    }
}

//! Footnote types

use serde::{Deserialize, Serialize};
use std::fmt;

/// Coarse semantic tag inferred from a footnote's body text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FootnoteKind {
    /// Notes on the underlying Hebrew
    Hebrew,
    /// Notes on the underlying Greek
    Greek,
    /// Alternative rendering ("Or ...")
    Alternative,
    /// Pointer to another passage
    CrossReference,
    /// Manuscript differences
    TextualVariant,
    /// Anything else
    #[default]
    Other,
}

impl FootnoteKind {
    /// Get the kind as its serialized string
    pub fn as_str(&self) -> &'static str {
        match self {
            FootnoteKind::Hebrew => "hebrew",
            FootnoteKind::Greek => "greek",
            FootnoteKind::Alternative => "alternative",
            FootnoteKind::CrossReference => "cross-reference",
            FootnoteKind::TextualVariant => "textual-variant",
            FootnoteKind::Other => "other",
        }
    }
}

impl fmt::Display for FootnoteKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Footnote attached to a verse
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Footnote {
    /// Marker glyph shown in the text ("a", "*", "†", ...)
    pub marker: String,

    /// Reference label such as "1:2" (origin of a cross reference)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,

    /// Footnote body, never empty
    pub content: String,

    /// Classification
    #[serde(default)]
    pub kind: FootnoteKind,
}

impl Footnote {
    /// Create a footnote
    pub fn new(marker: impl Into<String>, content: impl Into<String>, kind: FootnoteKind) -> Self {
        Self {
            marker: marker.into(),
            reference: None,
            content: content.into(),
            kind,
        }
    }

    /// Attach a reference label
    pub fn with_reference(mut self, reference: impl Into<String>) -> Self {
        let reference = reference.into();
        self.reference = if reference.trim().is_empty() {
            None
        } else {
            Some(reference)
        };
        self
    }

    /// Whether this note points elsewhere rather than commenting on the text
    pub fn is_cross_reference(&self) -> bool {
        self.kind == FootnoteKind::CrossReference
    }
}

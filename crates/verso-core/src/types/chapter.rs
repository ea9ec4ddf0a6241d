//! The canonical output unit

use super::{PsalmMetadata, Verse};
use crate::translation::Translation;
use serde::{Deserialize, Serialize};

/// Optional descriptive metadata for a chapter
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChapterMetadata {
    /// Copyright notice shipped with the payload
    #[serde(skip_serializing_if = "Option::is_none")]
    pub copyright: Option<String>,

    /// Display title of the book
    #[serde(skip_serializing_if = "Option::is_none")]
    pub book_title: Option<String>,

    /// Full name of the translation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub translation_name: Option<String>,
}

/// A fully parsed chapter
///
/// Parsers either return a complete `Chapter` with at least one verse or a
/// typed error; there is no partial result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chapter {
    /// Reference string as supplied, e.g. "Psalm 23"
    pub reference: String,

    /// Translation identifier
    pub translation: Translation,

    /// Book name decomposed from the reference
    pub book: String,

    /// Chapter number decomposed from the reference
    pub chapter: u32,

    /// Verses in source document order
    pub verses: Vec<Verse>,

    /// Descriptive metadata
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<ChapterMetadata>,

    /// Psalm-only metadata
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub psalm: Option<PsalmMetadata>,

    /// Original payload, kept for diagnostics only
    #[serde(skip)]
    pub raw: Option<serde_json::Value>,
}

impl Chapter {
    /// Look up a verse by its textual number
    pub fn verse(&self, number: &str) -> Option<&Verse> {
        self.verses.iter().find(|v| v.number == number)
    }

    /// Whether Psalm metadata was produced for this chapter
    pub fn is_psalm(&self) -> bool {
        self.psalm.is_some()
    }

    /// Iterate `(verse number, heading)` pairs in document order
    pub fn headings(&self) -> impl Iterator<Item = (&str, &str)> {
        self.verses
            .iter()
            .filter_map(|v| v.heading.as_deref().map(|h| (v.number.as_str(), h)))
    }

    /// Verse text joined with single spaces
    pub fn plain_text(&self) -> String {
        self.verses
            .iter()
            .map(|v| v.text.replace('\n', " "))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Drop the retained payload (e.g. before caching the chapter elsewhere)
    pub fn without_raw(mut self) -> Self {
        self.raw = None;
        self
    }
}

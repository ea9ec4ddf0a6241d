//! Verso Chapter Parsers
//!
//! Normalizes Bible chapters from three upstream payload shapes into the
//! canonical [`Chapter`] model from `verso-core`:
//! - [`passage`] - paragraph/line HTML with a footnote section (ESV style)
//! - [`verse_export`] - pseudo-XML `verse_export` blocks (NLT style)
//! - [`content_tree`] - structured JSON paragraph trees (API.Bible style)
//!
//! [`registry::ParserRegistry`] maps every supported [`Translation`] to the
//! parser for its family. Parsers are stateless and shareable across threads.

pub mod content_tree;
pub mod passage;
pub mod registry;
pub mod text;
pub mod verse_export;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

// Re-export main types for convenience
pub use content_tree::{ContentTreeParser, ContentTreePayload, Node, NodeKind};
pub use passage::{PassageParser, PassagePayload};
pub use registry::ParserRegistry;
pub use verse_export::{VerseExportParser, VerseExportPassage, VerseExportPayload};

pub use verso_core::{
    Chapter, ChapterError, ChapterParser, Footnote, FootnoteKind, ParserConfig, ParserError,
    ParserResult, PsalmMetadata, SourceFamily, Translation, Verse,
};

/// Parse a payload with the global registry's parser for `translation`
pub fn parse_chapter(
    translation: Translation,
    payload: &serde_json::Value,
) -> Result<Chapter, ChapterError> {
    ParserRegistry::global().parse(translation, payload)
}

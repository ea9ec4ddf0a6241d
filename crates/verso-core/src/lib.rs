//! Verso core types
//!
//! This crate holds the **canonical** chapter document model and the parser
//! abstraction every upstream format implements:
//! - `types::*` - `Chapter`, `Verse`, `Footnote`, `PsalmMetadata` and friends
//! - `translation::*` - the closed set of supported translations
//! - `error::*` - the parser failure taxonomy
//! - `traits::ChapterParser` - the seam between a raw payload and a `Chapter`
//!
//! The `verso-parser` crate depends on these types and provides the
//! format-specific implementations.

pub mod error;
pub mod traits;
pub mod translation;
pub mod types;

pub use error::{ChapterError, ParserError, ParserResult};
pub use traits::ChapterParser;
pub use translation::{SourceFamily, Translation};
pub use types::{
    Chapter, ChapterMetadata, Footnote, FootnoteKind, PoetryLine, PsalmMetadata, PsalmSection,
    SpeakerLabel, Verse,
};

// Config is part of the parser contract; re-export so implementors need one import.
pub use verso_config::ParserConfig;

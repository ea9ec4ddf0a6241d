//! Canonical chapter document model
//!
//! Every parser, whatever its upstream format, produces these types. They are
//! plain immutable values: created fresh per parse and owned by the returned
//! [`Chapter`].
//!
//! Serialization uses camelCase field names and omits empty optional fields,
//! which is the shape renderers consume.

mod chapter;
mod footnote;
mod psalm;
mod verse;

pub use chapter::{Chapter, ChapterMetadata};
pub use footnote::{Footnote, FootnoteKind};
pub use psalm::{PsalmMetadata, PsalmSection};
pub use verse::{PoetryLine, SpeakerLabel, Verse};

/// `skip_serializing_if` helper for plain flags
pub(crate) fn is_false(value: &bool) -> bool {
    !*value
}

/// `skip_serializing_if` helper for prose indentation
pub(crate) fn is_zero(value: &u8) -> bool {
    *value == 0
}

//! Parser error types

use crate::translation::Translation;
use thiserror::Error;

/// Parser error type
#[derive(Debug, Error)]
pub enum ParserError {
    /// Reference string does not end in "<book> <chapter>"
    #[error("Invalid reference: '{0}'")]
    InvalidReference(String),

    /// Payload lacks the container holding the chapter markup
    #[error("Payload is missing its '{expected}' container")]
    MissingPassage {
        /// Name of the field the parser looked for
        expected: &'static str,
    },

    /// Every scanning strategy produced zero verses
    #[error("No parsable verse content found")]
    NoParsableContent,

    /// Tree walk and both flat fallbacks produced zero verses
    #[error("No verses found in content tree")]
    NoVersesFound,

    /// Payload has the container but the wrong shape
    #[error("Malformed payload: {0}")]
    MalformedPayload(#[from] serde_json::Error),

    /// Translation code outside the supported set
    #[error("Unknown translation: '{0}'")]
    UnknownTranslation(String),
}

/// Specialized Result type for parser operations
pub type ParserResult<T> = Result<T, ParserError>;

impl ParserError {
    /// Create an invalid reference error
    pub fn invalid_reference(reference: impl Into<String>) -> Self {
        Self::InvalidReference(reference.into())
    }

    /// Create a missing container error
    pub fn missing(expected: &'static str) -> Self {
        Self::MissingPassage { expected }
    }

    /// True when the payload was well-formed but held nothing usable
    pub fn is_content_error(&self) -> bool {
        matches!(self, Self::NoParsableContent | Self::NoVersesFound)
    }

    /// True when the payload itself was unusable before any scanning
    pub fn is_payload_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidReference(_) | Self::MissingPassage { .. } | Self::MalformedPayload(_)
        )
    }
}

/// A [`ParserError`] with the diagnostics context callers surface to users
#[derive(Debug, Error)]
#[error("{translation} {}: {source}", .reference.as_deref().unwrap_or("<unknown reference>"))]
pub struct ChapterError {
    /// Translation whose parser failed
    pub translation: Translation,
    /// Reference string from the payload, when one could be read
    pub reference: Option<String>,
    /// Underlying failure
    #[source]
    pub source: ParserError,
}

impl ChapterError {
    /// Attach translation and reference context to a parser error
    pub fn new(translation: Translation, reference: Option<String>, source: ParserError) -> Self {
        Self {
            translation,
            reference,
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_classification() {
        assert!(ParserError::NoParsableContent.is_content_error());
        assert!(ParserError::NoVersesFound.is_content_error());
        assert!(!ParserError::missing("passages").is_content_error());

        assert!(ParserError::invalid_reference("Genesis").is_payload_error());
        assert!(ParserError::missing("content").is_payload_error());
        assert!(!ParserError::NoVersesFound.is_payload_error());
    }

    #[test]
    fn test_error_display() {
        let err = ParserError::missing("passages");
        assert_eq!(err.to_string(), "Payload is missing its 'passages' container");

        let err = ParserError::invalid_reference("Genesis");
        assert_eq!(err.to_string(), "Invalid reference: 'Genesis'");
    }

    #[test]
    fn test_chapter_error_context() {
        let err = ChapterError::new(
            Translation::Esv,
            Some("John 3".to_string()),
            ParserError::NoParsableContent,
        );
        assert_eq!(err.to_string(), "ESV John 3: No parsable verse content found");

        let err = ChapterError::new(Translation::Kjv, None, ParserError::missing("content"));
        assert_eq!(
            err.to_string(),
            "KJV <unknown reference>: Payload is missing its 'content' container"
        );
        assert!(std::error::Error::source(&err).is_some());
    }
}

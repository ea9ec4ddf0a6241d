//! Structured JSON content tree parser (API.Bible style)
//!
//! The payload carries `content`, an array of `para` nodes whose `items` are
//! verse markers, text leaves, `char` spans and `note`s. Paragraph styles
//! follow USFM: `s1`-`s3` headings, `sp` speakers, `b` blank lines, `d`
//! Psalm titles, `q1`-`q3` poetry. Verses are assembled by [`walk`]; two
//! flat `{name, text}` shapes are accepted as fallbacks.

mod node;
mod notes;
mod psalm;
mod walk;

pub use node::{Node, NodeKind};

use crate::text::{build_verse, clean, decompose_reference, is_selah, VerseOverrides};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use verso_core::{
    Chapter, ChapterMetadata, ChapterParser, ParserConfig, ParserError, ParserResult,
    SourceFamily, Translation, Verse,
};

/// Raw payload shape
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContentTreePayload {
    /// Reference such as "Genesis 1"
    #[serde(default)]
    pub reference: String,

    /// Paragraph nodes
    #[serde(default)]
    pub content: Vec<Node>,

    /// Root-level flat items, older shape
    #[serde(default)]
    pub items: Vec<Node>,

    /// Copyright notice
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub copyright: Option<String>,
}

/// Parser for content tree payloads
#[derive(Debug, Clone)]
pub struct ContentTreeParser {
    translation: Translation,
    config: Arc<ParserConfig>,
}

impl ContentTreeParser {
    /// Create a parser with the default configuration
    pub fn new(translation: Translation) -> Self {
        Self::with_config(translation, Arc::new(ParserConfig::default()))
    }

    /// Create a parser sharing an existing configuration
    pub fn with_config(translation: Translation, config: Arc<ParserConfig>) -> Self {
        Self {
            translation,
            config,
        }
    }

    /// Parse a typed payload
    ///
    /// An empty `content` together with empty `items` counts as missing.
    pub fn parse_payload(&self, payload: &ContentTreePayload) -> ParserResult<Chapter> {
        if payload.content.is_empty() && payload.items.is_empty() {
            tracing::warn!(translation = %self.translation, "content tree payload is empty");
            return Err(ParserError::missing("content"));
        }
        let (book, chapter_number) = decompose_reference(&payload.reference)?;

        let mut verses = walk::Walker::new(&self.config, chapter_number).run(&payload.content);
        if verses.is_empty() {
            tracing::debug!(reference = %payload.reference, "tree walk empty, trying flat paragraphs");
            let nested = payload
                .content
                .iter()
                .filter(|n| n.kind() == NodeKind::Para)
                .flat_map(|n| n.items.iter());
            verses = flat_verses(nested);
        }
        if verses.is_empty() {
            tracing::debug!(reference = %payload.reference, "trying root items");
            verses = flat_verses(payload.items.iter());
        }
        if verses.is_empty() {
            tracing::warn!(reference = %payload.reference, "no verses found in content tree");
            return Err(ParserError::NoVersesFound);
        }

        let psalm = self
            .config
            .is_psalm_book(&book)
            .then(|| psalm::psalm_metadata(&payload.content, chapter_number));

        tracing::debug!(reference = %payload.reference, verses = verses.len(), "content tree parsed");

        Ok(Chapter {
            reference: payload.reference.clone(),
            translation: self.translation,
            book: book.clone(),
            chapter: chapter_number,
            verses,
            metadata: Some(ChapterMetadata {
                copyright: payload
                    .copyright
                    .as_deref()
                    .map(clean)
                    .filter(|c| !c.is_empty()),
                book_title: Some(book),
                translation_name: Some(self.translation.full_name().to_string()),
            }),
            psalm,
            raw: None,
        })
    }
}

/// Verses from `{name: "<digits>", text}` entries
fn flat_verses<'a>(nodes: impl Iterator<Item = &'a Node>) -> Vec<Verse> {
    let mut verses: Vec<Verse> = Vec::new();
    for (number, text) in nodes.filter_map(Node::flat_verse) {
        let text = clean(text);
        if text.is_empty() {
            continue;
        }
        let verse = build_verse(
            number,
            &text,
            VerseOverrides {
                is_first_verse: verses.is_empty(),
                is_selah: is_selah(&text),
                ..Default::default()
            },
        );
        verses.push(verse);
    }
    verses
}

impl ChapterParser for ContentTreeParser {
    fn translation(&self) -> Translation {
        self.translation
    }

    fn family(&self) -> SourceFamily {
        SourceFamily::ContentTree
    }

    fn config(&self) -> &ParserConfig {
        &self.config
    }

    fn parse(&self, payload: &serde_json::Value) -> ParserResult<Chapter> {
        // Responses may arrive wrapped in a `data` envelope.
        let body = payload
            .get("data")
            .filter(|d| d.is_object())
            .unwrap_or(payload);
        let present = |key: &str| body.get(key).is_some_and(|v| !v.is_null());
        if !present("content") && !present("items") {
            tracing::warn!(translation = %self.translation, "payload has no content or items");
            return Err(ParserError::missing("content"));
        }

        let typed: ContentTreePayload = serde_json::from_value(body.clone())?;
        let mut chapter = self.parse_payload(&typed)?;
        chapter.raw = Some(payload.clone());
        Ok(chapter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parser() -> ContentTreeParser {
        ContentTreeParser::new(Translation::Kjv)
    }

    #[test]
    fn test_heading_then_verse() {
        let payload = json!({
            "reference": "Genesis 1",
            "content": [
                {"name": "para", "type": "tag", "attrs": {"style": "s1"},
                 "items": [{"text": "The Creation", "type": "text"}]},
                {"name": "para", "type": "tag", "attrs": {"style": "p"},
                 "items": [
                    {"name": "verse", "type": "tag", "attrs": {"number": "1", "style": "v"},
                     "items": [{"text": "1", "type": "text"}]},
                    {"text": "In the beginning God created the heaven and the earth.", "type": "text"}
                 ]}
            ],
            "copyright": "Public Domain"
        });
        let chapter = parser().parse(&payload).unwrap();
        assert_eq!(chapter.verses.len(), 1);
        let verse = &chapter.verses[0];
        assert_eq!(verse.number, "1");
        assert_eq!(verse.heading.as_deref(), Some("The Creation"));
        assert!(verse.is_first_verse);
        assert!(!verse.starts_paragraph);

        let json = serde_json::to_value(verse).unwrap();
        assert!(json.get("startsParagraph").is_none());
        assert_eq!(
            chapter.metadata.as_ref().and_then(|m| m.copyright.as_deref()),
            Some("Public Domain")
        );
        assert!(chapter.psalm.is_none());
    }

    #[test]
    fn test_data_envelope() {
        let payload = json!({"data": {
            "reference": "John 11",
            "content": [{"name": "para", "type": "tag", "attrs": {"style": "p"},
                "items": [{"name": "verse", "type": "tag", "attrs": {"number": "35"}}, {"text": "Jesus wept.", "type": "text"}]}]
        }});
        let chapter = parser().parse(&payload).unwrap();
        assert_eq!(chapter.verses[0].number, "35");
        assert_eq!(chapter.verses[0].text, "Jesus wept.");
    }

    #[test]
    fn test_flat_fallbacks() {
        let nested = json!({
            "reference": "John 11",
            "content": [{"name": "para", "type": "tag", "attrs": {"style": "p"},
                "items": [{"name": "35", "text": "Jesus wept."}, {"name": "36", "text": "Then said the Jews,"}]}]
        });
        let chapter = parser().parse(&nested).unwrap();
        assert_eq!(chapter.verses.len(), 2);
        assert!(chapter.verses[0].is_first_verse);
        assert!(!chapter.verses[1].is_first_verse);

        let root = json!({
            "reference": "John 11",
            "items": [{"name": "35", "text": "Jesus wept."}]
        });
        let chapter = parser().parse(&root).unwrap();
        assert_eq!(chapter.verses[0].text, "Jesus wept.");
    }

    #[test]
    fn test_errors() {
        assert!(matches!(
            parser().parse(&json!({"reference": "Genesis 1"})),
            Err(ParserError::MissingPassage { expected: "content" })
        ));
        assert!(matches!(
            parser().parse(&json!({"reference": "Genesis", "content": [{"name": "para"}]})),
            Err(ParserError::InvalidReference(_))
        ));
        assert!(matches!(
            parser().parse(&json!({"reference": "Genesis 1", "content": [{"name": "para", "items": []}]})),
            Err(ParserError::NoVersesFound)
        ));
        assert!(matches!(
            parser().parse(&json!({"reference": "Genesis 1", "content": "<p>html</p>"})),
            Err(ParserError::MalformedPayload(_))
        ));
    }

    #[test]
    fn test_psalm_metadata_is_attached() {
        let payload = json!({
            "reference": "Psalms 3",
            "content": [
                {"name": "para", "type": "tag", "attrs": {"style": "d"}, "items": [{"text": "A Psalm of David.", "type": "text"}]},
                {"name": "para", "type": "tag", "attrs": {"style": "q1"}, "items": [
                    {"name": "verse", "type": "tag", "attrs": {"number": "2"}},
                    {"text": "There is no help for him in God. Selah.", "type": "text"}
                ]}
            ]
        });
        let chapter = parser().parse(&payload).unwrap();
        let psalm = chapter.psalm.as_ref().unwrap();
        assert!(psalm.has_selah);
        assert_eq!(psalm.superscription.as_deref(), Some("A Psalm of David."));
        assert!(chapter.verses[0].is_selah);
        assert_eq!(chapter.verses[0].indent_level, 1);
    }
}

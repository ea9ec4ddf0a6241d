//! HTML passage parser (ESV / BibleGateway style)
//!
//! The payload is `{ "canonical": "Psalm 23", "passages": ["<html>"] }`. Two
//! scanning strategies run in order:
//!
//! 1. **Paragraphs**: `<p>` blocks with inline `<b class="chapter-num">` /
//!    `<b class="verse-num">` markers. Psalms with `<span class="line">`
//!    markup are read line by line.
//! 2. **Legacy spans**: nested `<span class="text Book-C-V">` elements with
//!    `chapternum` / `versenum` markers, extracted with depth counting.
//!
//! When both produce nothing the parse fails with
//! [`ParserError::NoParsableContent`].

mod footnotes;
mod headings;
mod legacy;
mod paragraphs;

use crate::text::{
    build_verse, clean, decompose_reference, heading_anchor, is_selah, musical_notation,
    nearest_preceding, VerseOverrides,
};
use footnotes::FootnoteTable;
use headings::HeadingMark;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, LazyLock};
use verso_core::{
    Chapter, ChapterMetadata, ChapterParser, Footnote, ParserConfig, ParserError, ParserResult,
    PoetryLine, PsalmMetadata, SourceFamily, Translation, Verse,
};

static PARAGRAPH_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<p\b([^>]*)>(.*?)</p>").expect("paragraph regex"));

/// Raw payload shape
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PassagePayload {
    /// Reference such as "John 3"
    #[serde(default)]
    pub canonical: String,

    /// Chapter markup; only the first entry is read
    #[serde(default)]
    pub passages: Vec<String>,
}

/// Parser for HTML passage payloads
#[derive(Debug, Clone)]
pub struct PassageParser {
    translation: Translation,
    config: Arc<ParserConfig>,
}

impl PassageParser {
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
    pub fn parse_payload(&self, payload: &PassagePayload) -> ParserResult<Chapter> {
        let html = match payload.passages.first() {
            Some(html) if !html.trim().is_empty() => html,
            _ => {
                tracing::warn!(translation = %self.translation, "passage payload has no markup");
                return Err(ParserError::missing("passages"));
            }
        };
        let (book, chapter_number) = decompose_reference(&payload.canonical)?;
        let is_psalm = self.config.is_psalm_book(&book);

        let copyright = PARAGRAPH_REGEX
            .captures_iter(html)
            .find(|caps| self.config.is_copyright(&caps[0]))
            .map(|caps| clean(&caps[2]))
            .filter(|c| !c.is_empty());

        let (html, table) = footnotes::extract(html);
        let all_headings = headings::scan(&html);
        let (superscription, section_headings) = if is_psalm {
            headings::split_superscription(all_headings, &self.config)
        } else {
            (None, all_headings)
        };

        tracing::debug!(
            reference = %payload.canonical,
            headings = section_headings.len(),
            footnotes = table.len(),
            "scanning passage"
        );

        let ctx = ScanContext {
            config: &self.config,
            is_psalm,
            footnotes: &table,
            headings: &section_headings,
        };

        let mut drafts = paragraphs::scan(&html, &ctx);
        if drafts.is_empty() {
            tracing::debug!(reference = %payload.canonical, "no paragraph markers, trying legacy spans");
            drafts = legacy::scan(&html, &ctx, superscription.as_ref());
        }
        if drafts.is_empty() {
            tracing::warn!(reference = %payload.canonical, "no verses found by any strategy");
            return Err(ParserError::NoParsableContent);
        }

        let verses: Vec<Verse> = drafts
            .into_iter()
            .map(|draft| draft.finish(chapter_number))
            .collect();

        let psalm = is_psalm.then(|| {
            let mut meta = PsalmMetadata::new(chapter_number);
            meta.has_selah = verses.iter().any(|v| v.is_selah);
            meta.musical_notation = superscription.as_ref().and_then(|s| musical_notation(&s.text));
            meta.superscription = superscription.map(|s| s.text);
            anchor_sections(&html, &section_headings, &mut meta);
            meta
        });

        tracing::debug!(reference = %payload.canonical, verses = verses.len(), "passage parsed");

        Ok(Chapter {
            reference: payload.canonical.clone(),
            translation: self.translation,
            book: book.clone(),
            chapter: chapter_number,
            verses,
            metadata: Some(ChapterMetadata {
                copyright,
                book_title: Some(book),
                translation_name: Some(self.translation.full_name().to_string()),
            }),
            psalm,
            raw: None,
        })
    }
}

impl ChapterParser for PassageParser {
    fn translation(&self) -> Translation {
        self.translation
    }

    fn family(&self) -> SourceFamily {
        SourceFamily::Passage
    }

    fn config(&self) -> &ParserConfig {
        &self.config
    }

    fn parse(&self, payload: &serde_json::Value) -> ParserResult<Chapter> {
        let has_passages = payload
            .get("passages")
            .and_then(|p| p.as_array())
            .is_some_and(|p| !p.is_empty());
        if !has_passages {
            tracing::warn!(translation = %self.translation, "payload has no passages array");
            return Err(ParserError::missing("passages"));
        }

        let typed: PassagePayload = serde_json::from_value(payload.clone())?;
        let mut chapter = self.parse_payload(&typed)?;
        chapter.raw = Some(payload.clone());
        Ok(chapter)
    }
}

/// Inputs shared by both scanning strategies
pub(crate) struct ScanContext<'a> {
    pub config: &'a ParserConfig,
    pub is_psalm: bool,
    pub footnotes: &'a FootnoteTable,
    pub headings: &'a [HeadingMark],
}

impl ScanContext<'_> {
    /// Index of the nearest heading that ends at or before `offset`
    fn heading_before(&self, offset: usize) -> Option<usize> {
        let ends: Vec<usize> = self.headings.iter().map(|h| h.end).collect();
        nearest_preceding(&ends, offset + 1)
    }
}

/// A verse under construction
#[derive(Debug, Default)]
pub(crate) struct VerseDraft {
    number: String,
    is_first_verse: bool,
    starts_paragraph: bool,
    stanza_break_after: bool,
    is_red_letter: bool,
    indent_level: u8,
    heading: Option<(String, Option<String>)>,
    prose: Vec<String>,
    prose_after: Vec<String>,
    lines: Vec<PoetryLine>,
    continuation: Vec<String>,
    raw: String,
    footnotes: Vec<Footnote>,
}

impl VerseDraft {
    fn new(number: impl Into<String>, is_first_verse: bool) -> Self {
        Self {
            number: number.into(),
            is_first_verse,
            ..Default::default()
        }
    }

    fn set_heading(&mut self, heading: &HeadingMark) {
        self.heading = Some((heading.text.clone(), heading.id.clone()));
    }

    /// Take in one markup segment: footnotes, red-letter, raw snapshot.
    /// Returns the cleaned text.
    fn absorb(&mut self, segment: &str, ctx: &ScanContext<'_>) -> (String, bool) {
        let (markup, notes) = footnotes::take_footnotes(segment, ctx.footnotes);
        let red = crate::text::contains_red_letter(&markup, ctx.config);
        self.is_red_letter |= red;
        self.footnotes.extend(notes);
        self.raw.push_str(segment);
        (clean(&markup), red)
    }

    fn push_prose(&mut self, segment: &str, ctx: &ScanContext<'_>) {
        let (text, _) = self.absorb(segment, ctx);
        if text.is_empty() {
            return;
        }
        if self.lines.is_empty() {
            self.prose.push(text);
        } else {
            self.prose_after.push(text);
        }
    }

    fn push_line(&mut self, segment: &str, indent: u8, new_stanza: bool, ctx: &ScanContext<'_>) {
        let (text, red) = self.absorb(segment, ctx);
        if text.is_empty() {
            return;
        }
        self.lines.push(PoetryLine {
            text,
            indent,
            is_red_letter: red,
            new_stanza,
        });
    }

    fn push_continuation(&mut self, segment: &str, ctx: &ScanContext<'_>) {
        let (text, _) = self.absorb(segment, ctx);
        if !text.is_empty() {
            self.continuation.push(text);
        }
    }

    fn finish(self, chapter: u32) -> Verse {
        let prose = self.prose.join(" ");
        let (text, lines, prose_before, indent) = if !self.lines.is_empty() {
            let lines: Vec<String> = self.lines.iter().map(|l| l.text.clone()).collect();
            let indent = self.lines[0].indent;
            (lines.join("\n"), lines, Some(prose), indent)
        } else if !self.continuation.is_empty() {
            let mut lines = vec![prose];
            lines.extend(self.continuation);
            lines.retain(|l| !l.is_empty());
            (lines.join("\n"), lines, None, self.indent_level)
        } else {
            (prose, Vec::new(), None, self.indent_level)
        };

        let prose_after = Some(self.prose_after.join(" "));
        let selah = is_selah(&text)
            || prose_before.as_deref().is_some_and(is_selah)
            || prose_after.as_deref().is_some_and(is_selah);
        let (heading, heading_id) = match self.heading {
            Some((text, id)) => {
                let id = id.unwrap_or_else(|| heading_anchor(chapter, &self.number));
                (Some(text), Some(id))
            }
            None => (None, None),
        };

        build_verse(
            self.number,
            &text,
            VerseOverrides {
                is_red_letter: self.is_red_letter,
                is_first_verse: self.is_first_verse,
                heading,
                heading_id,
                raw_html: (!self.raw.is_empty()).then_some(self.raw),
                indent_level: indent,
                is_selah: selah,
                stanza_break_after: self.stanza_break_after,
                starts_paragraph: self.starts_paragraph,
                poetry_lines: self.lines,
                lines,
                prose_before,
                prose_after,
                footnotes: self.footnotes,
                ..Default::default()
            },
        )
    }
}

/// Anchor each section heading to the verse marker before it
///
/// Headings with no marker before them (the opening heading of a Psalm)
/// belong to the first verse and are not sections.
fn anchor_sections(html: &str, headings: &[HeadingMark], meta: &mut PsalmMetadata) {
    let mut markers = paragraphs::markers(html)
        .into_iter()
        .map(|m| (m.start, m.number))
        .chain(legacy::markers(html))
        .collect::<Vec<_>>();
    markers.sort_by_key(|(start, _)| *start);
    let positions: Vec<usize> = markers.iter().map(|(start, _)| *start).collect();

    for heading in headings {
        match nearest_preceding(&positions, heading.start) {
            Some(index) => meta.push_section(markers[index].1.clone(), heading.text.clone()),
            None => tracing::trace!(heading = %heading.text, "heading precedes every verse"),
        }
    }
}

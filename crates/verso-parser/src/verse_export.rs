//! Pseudo-XML verse export parser (NLT style)
//!
//! The payload carries `passages[0].content`, a run of self-describing
//! blocks:
//!
//! ```text
//! <verse_export orig="..." bk="Psalm" ch="23" vn="1">
//!   <h2 class="chapter-number">23</h2>
//!   <h3 class="subhead">The Lord, Our Shepherd</h3>
//!   <p class="poet1"><span class="vn">1</span>The Lord is my shepherd;</p>
//! </verse_export>
//! ```
//!
//! When no block is present the content is split on `vn` decoration spans,
//! first strictly over the whole content and then paragraph by paragraph.

use crate::text::{
    attr, build_verse, clean, contains_red_letter, decompose_reference, has_class, heading_anchor,
    is_selah, make_footnote, musical_notation, remove_ranges, TagScanner, VerseOverrides,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, LazyLock};
use verso_core::{
    Chapter, ChapterMetadata, ChapterParser, Footnote, ParserConfig, ParserError, ParserResult,
    PoetryLine, PsalmMetadata, SourceFamily, Translation, Verse,
};

fn class_element(tag: &str, class: &str) -> Regex {
    let pattern = format!(
        r#"(?is)<{tag}\b[^>]*\bclass\s*=\s*["'][^"']*\b{class}\b[^"']*["'][^>]*>(.*?)</{tag}\s*>"#,
        tag = tag,
        class = regex::escape(class),
    );
    Regex::new(&pattern).expect("class element regex")
}

static BLOCK_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<verse_export\b([^>]*)>(.*?)</verse_export\s*>").expect("verse block regex")
});

static CHAPTER_NUMBER_REGEX: LazyLock<Regex> = LazyLock::new(|| class_element("h2", "chapter-number"));
static SUBHEAD_REGEX: LazyLock<Regex> = LazyLock::new(|| class_element("h3", "subhead"));
static PSALM_TITLE_REGEX: LazyLock<Regex> = LazyLock::new(|| class_element("h4", "psa-title"));
static PSALM_HEBREW_REGEX: LazyLock<Regex> = LazyLock::new(|| class_element("h4", "psa-hebrew"));
static VN_SPAN_REGEX: LazyLock<Regex> = LazyLock::new(|| class_element("span", "vn"));

static STRICT_VN_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<span class="vn">\s*([0-9]+[a-z]?)\s*</span>"#).expect("strict vn regex")
});

static PARAGRAPH_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<p\b([^>]*)>(.*?)</p>").expect("paragraph regex"));

static POET_CLASS_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\bclass\s*=\s*["'][^"']*\bpoet([12])\b"#).expect("poet class regex")
});

/// One passage of the payload
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerseExportPassage {
    /// Reference such as "Psalm 23"
    #[serde(default)]
    pub reference: String,

    /// Block markup
    #[serde(default)]
    pub content: String,
}

/// Raw payload shape
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerseExportPayload {
    /// Only the first passage is read
    #[serde(default)]
    pub passages: Vec<VerseExportPassage>,
}

/// Parser for pseudo-XML verse export payloads
#[derive(Debug, Clone)]
pub struct VerseExportParser {
    translation: Translation,
    config: Arc<ParserConfig>,
}

/// Cleaned verse body
#[derive(Debug, Default)]
struct Body {
    text: String,
    raw: String,
    is_red_letter: bool,
    indent_level: u8,
    poetry_lines: Vec<PoetryLine>,
    footnotes: Vec<Footnote>,
}

/// Verse located by a fallback split
#[derive(Debug)]
struct Pending {
    number: String,
    start: usize,
    fragments: Vec<String>,
}

impl VerseExportParser {
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
    pub fn parse_payload(&self, payload: &VerseExportPayload) -> ParserResult<Chapter> {
        let passage = match payload.passages.first() {
            Some(p) if !p.content.trim().is_empty() => p,
            _ => {
                tracing::warn!(translation = %self.translation, "verse export payload has no content");
                return Err(ParserError::missing("passages"));
            }
        };
        let (book, chapter_number) = decompose_reference(&passage.reference)?;
        let is_psalm = self.config.is_psalm_book(&book);
        let content = passage.content.as_str();

        let mut verses = self.scan_blocks(content, chapter_number, is_psalm);
        if verses.is_empty() {
            tracing::debug!(reference = %passage.reference, "no verse blocks, splitting on vn spans");
            verses = self.scan_strict(content, chapter_number, is_psalm);
        }
        if verses.is_empty() {
            tracing::debug!(reference = %passage.reference, "strict split empty, trying paragraphs");
            verses = self.scan_paragraphs(content, chapter_number, is_psalm);
        }
        if verses.is_empty() {
            tracing::warn!(reference = %passage.reference, "no verses found by any strategy");
            return Err(ParserError::NoParsableContent);
        }

        let copyright = PARAGRAPH_REGEX
            .captures_iter(content)
            .find(|caps| self.config.is_copyright(&caps[0]))
            .map(|caps| clean(&caps[2]))
            .filter(|c| !c.is_empty());
        let psalm = is_psalm.then(|| psalm_metadata(content, chapter_number, &verses));

        tracing::debug!(reference = %passage.reference, verses = verses.len(), "verse export parsed");

        Ok(Chapter {
            reference: passage.reference.clone(),
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

    fn scan_blocks(&self, content: &str, chapter: u32, is_psalm: bool) -> Vec<Verse> {
        let mut verses = Vec::new();
        for caps in BLOCK_REGEX.captures_iter(content) {
            let Some(number) = attr(&caps[1], "vn").filter(|n| !n.trim().is_empty()) else {
                tracing::debug!("verse block without a vn attribute");
                continue;
            };
            let block = &caps[2];

            let is_first_verse = CHAPTER_NUMBER_REGEX.is_match(block);
            let block = CHAPTER_NUMBER_REGEX.replace_all(block, "");
            let heading = SUBHEAD_REGEX
                .captures(&block)
                .map(|h| clean(&h[1]))
                .filter(|h| !h.is_empty());
            let block = SUBHEAD_REGEX.replace_all(&block, "");

            verses.push(self.verse(&number, &block, chapter, is_psalm, is_first_verse, heading));
        }
        verses
    }

    fn scan_strict(&self, content: &str, chapter: u32, is_psalm: bool) -> Vec<Verse> {
        let content = self.without_copyright(content);
        let content = content.as_str();
        let markers: Vec<_> = STRICT_VN_REGEX.captures_iter(content).collect();
        let pending: Vec<Pending> = markers
            .iter()
            .enumerate()
            .filter_map(|(k, caps)| {
                let whole = caps.get(0)?;
                let end = markers
                    .get(k + 1)
                    .and_then(|next| next.get(0))
                    .map_or(content.len(), |m| m.start());
                Some(Pending {
                    number: caps[1].to_string(),
                    start: whole.start(),
                    fragments: vec![content[whole.end()..end].to_string()],
                })
            })
            .collect();
        self.finish_fallback(content, pending, chapter, is_psalm)
    }

    /// Drop copyright paragraphs so they never run into the last verse
    fn without_copyright(&self, content: &str) -> String {
        let ranges: Vec<(usize, usize)> = PARAGRAPH_REGEX
            .find_iter(content)
            .filter(|m| self.config.is_copyright(m.as_str()))
            .map(|m| (m.start(), m.end()))
            .collect();
        remove_ranges(content, &ranges)
    }

    fn scan_paragraphs(&self, content: &str, chapter: u32, is_psalm: bool) -> Vec<Verse> {
        let mut pending: Vec<Pending> = Vec::new();
        for paragraph in PARAGRAPH_REGEX.captures_iter(content) {
            let (Some(whole), Some(inner)) = (paragraph.get(0), paragraph.get(2)) else {
                continue;
            };
            if self.config.is_copyright(whole.as_str()) {
                continue;
            }
            let inner_text = inner.as_str();
            let markers: Vec<_> = VN_SPAN_REGEX.captures_iter(inner_text).collect();
            let first_start = markers
                .first()
                .and_then(|m| m.get(0))
                .map_or(inner_text.len(), |m| m.start());

            let lead = &inner_text[..first_start];
            if !clean(lead).is_empty() {
                if let Some(last) = pending.last_mut() {
                    last.fragments.push(lead.to_string());
                }
            }

            for (k, caps) in markers.iter().enumerate() {
                let Some(marker) = caps.get(0) else { continue };
                let number = clean(&caps[1]);
                if number.is_empty() {
                    continue;
                }
                let end = markers
                    .get(k + 1)
                    .and_then(|next| next.get(0))
                    .map_or(inner_text.len(), |m| m.start());
                pending.push(Pending {
                    number,
                    start: inner.start() + marker.start(),
                    fragments: vec![inner_text[marker.end()..end].to_string()],
                });
            }
        }
        self.finish_fallback(content, pending, chapter, is_psalm)
    }

    /// Attach subheads to the verse that follows them and build the verses
    fn finish_fallback(
        &self,
        content: &str,
        pending: Vec<Pending>,
        chapter: u32,
        is_psalm: bool,
    ) -> Vec<Verse> {
        let starts: Vec<usize> = pending.iter().map(|p| p.start).collect();
        let mut headings: Vec<Option<String>> = vec![None; pending.len()];
        for caps in SUBHEAD_REGEX.captures_iter(content) {
            let Some(whole) = caps.get(0) else { continue };
            let index = starts.partition_point(|&s| s < whole.end());
            if let Some(slot) = headings.get_mut(index) {
                let text = clean(&caps[1]);
                if slot.is_none() && !text.is_empty() {
                    *slot = Some(text);
                }
            }
        }

        let opens_chapter = CHAPTER_NUMBER_REGEX.is_match(content);
        pending
            .into_iter()
            .zip(headings)
            .enumerate()
            .map(|(k, (p, heading))| {
                let body = p.fragments.join(" ");
                let body = CHAPTER_NUMBER_REGEX.replace_all(&body, "");
                let body = SUBHEAD_REGEX.replace_all(&body, "");
                let first = k == 0 && (opens_chapter || p.number == "1");
                self.verse(&p.number, &body, chapter, is_psalm, first, heading)
            })
            .collect()
    }

    fn verse(
        &self,
        number: &str,
        markup: &str,
        chapter: u32,
        is_psalm: bool,
        is_first_verse: bool,
        heading: Option<String>,
    ) -> Verse {
        let body = self.read_body(markup, is_psalm);
        let lines = if body.poetry_lines.len() > 1 {
            body.poetry_lines.iter().map(|l| l.text.clone()).collect()
        } else {
            Vec::new()
        };
        let heading_id = heading.as_ref().map(|_| heading_anchor(chapter, number.trim()));

        build_verse(
            number,
            &body.text,
            VerseOverrides {
                is_red_letter: body.is_red_letter,
                is_first_verse,
                heading,
                heading_id,
                raw_html: Some(body.raw),
                indent_level: body.indent_level,
                is_selah: is_psalm && is_selah(&body.text),
                poetry_lines: body.poetry_lines,
                lines,
                footnotes: body.footnotes,
                ..Default::default()
            },
        )
    }

    fn read_body(&self, markup: &str, is_psalm: bool) -> Body {
        let (without_notes, footnotes) = self.take_footnotes(markup);
        let stripped = VN_SPAN_REGEX.replace_all(&without_notes, "");
        let stripped = PSALM_TITLE_REGEX.replace_all(&stripped, "");
        let stripped = PSALM_HEBREW_REGEX.replace_all(&stripped, "").into_owned();

        let mut body = Body {
            text: clean(&stripped),
            raw: markup.trim().to_string(),
            is_red_letter: contains_red_letter(&stripped, &self.config),
            footnotes,
            ..Default::default()
        };
        if !is_psalm {
            return body;
        }

        body.indent_level = POET_CLASS_REGEX
            .captures_iter(&stripped)
            .filter_map(|caps| caps[1].parse::<u8>().ok())
            .max()
            .unwrap_or(0);

        let mut lines = Vec::new();
        let mut outside = Vec::new();
        let mut cursor = 0;
        for caps in PARAGRAPH_REGEX.captures_iter(&stripped) {
            let Some(whole) = caps.get(0) else { continue };
            let attrs = &caps[1];
            let indent = if has_class(attrs, "poet2") {
                2
            } else if has_class(attrs, "poet1") {
                1
            } else {
                continue;
            };
            outside.push(&stripped[cursor..whole.start()]);
            cursor = whole.end();
            let text = clean(&caps[2]);
            if !text.is_empty() {
                lines.push(PoetryLine {
                    is_red_letter: contains_red_letter(&caps[2], &self.config),
                    ..PoetryLine::new(text, indent)
                });
            }
        }
        outside.push(&stripped[cursor..]);

        let only_lines = outside.iter().all(|rest| clean(rest).is_empty());
        if !lines.is_empty() && only_lines {
            body.text = lines
                .iter()
                .map(|l| l.text.as_str())
                .collect::<Vec<_>>()
                .join("\n");
            body.poetry_lines = lines;
        }
        body
    }

    /// Remove `a-tn` / `tn` marker pairs, keeping the notes
    fn take_footnotes(&self, markup: &str) -> (String, Vec<Footnote>) {
        let anchors = TagScanner::new("a").with_class(markup, "a-tn");
        let spans = TagScanner::new("span");
        let notes = spans.with_class(markup, "tn");
        if anchors.is_empty() && notes.is_empty() {
            return (markup.to_string(), Vec::new());
        }

        let mut footnotes = Vec::new();
        let mut ranges: Vec<(usize, usize)> = Vec::new();
        for note in &notes {
            let marker = anchors
                .iter()
                .rev()
                .find(|a| a.end <= note.start && markup[a.end..note.start].trim().is_empty())
                .map(|a| clean(a.inner))
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| self.config.footnote_marker.clone());

            let refs = spans.with_class(note.inner, "tn-ref");
            let reference = refs.first().map(|r| clean(r.inner)).filter(|r| !r.is_empty());
            let ref_ranges: Vec<(usize, usize)> = refs.iter().map(|r| (r.start, r.end)).collect();
            let text = clean(&remove_ranges(note.inner, &ref_ranges));

            footnotes.extend(make_footnote(&marker, reference.as_deref(), &text));
            ranges.push((note.start, note.end));
        }
        ranges.extend(anchors.iter().map(|a| (a.start, a.end)));
        ranges.sort_unstable();

        (remove_ranges(markup, &ranges), footnotes)
    }
}

impl ChapterParser for VerseExportParser {
    fn translation(&self) -> Translation {
        self.translation
    }

    fn family(&self) -> SourceFamily {
        SourceFamily::VerseExport
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

        let typed: VerseExportPayload = serde_json::from_value(payload.clone())?;
        let mut chapter = self.parse_payload(&typed)?;
        chapter.raw = Some(payload.clone());
        Ok(chapter)
    }
}

/// Every `vn` seen in the content, as `(offset, number)` in document order
fn vn_positions(content: &str) -> Vec<(usize, String)> {
    let blocks = BLOCK_REGEX.captures_iter(content).filter_map(|caps| {
        let start = caps.get(0)?.start();
        attr(&caps[1], "vn").map(|vn| (start, vn.trim().to_string()))
    });
    let spans = VN_SPAN_REGEX
        .captures_iter(content)
        .filter_map(|caps| Some((caps.get(0)?.start(), clean(&caps[1]))));
    let mut all: Vec<_> = blocks.chain(spans).filter(|(_, vn)| !vn.is_empty()).collect();
    all.sort_by_key(|(start, _)| *start);
    all
}

fn psalm_metadata(content: &str, number: u32, verses: &[Verse]) -> PsalmMetadata {
    let mut meta = PsalmMetadata::new(number);
    meta.has_selah = verses.iter().any(|v| v.is_selah);
    meta.superscription = PSALM_TITLE_REGEX
        .captures(content)
        .or_else(|| PSALM_HEBREW_REGEX.captures(content))
        .map(|caps| clean(&caps[1]))
        .filter(|s| !s.is_empty());
    meta.musical_notation = meta.superscription.as_deref().and_then(musical_notation);

    let positions = vn_positions(content);
    let offsets: Vec<usize> = positions.iter().map(|(start, _)| *start).collect();
    for caps in SUBHEAD_REGEX.captures_iter(content) {
        let Some(whole) = caps.get(0) else { continue };
        let heading = clean(&caps[1]);
        if heading.is_empty() || meta.superscription.as_deref() == Some(heading.as_str()) {
            continue;
        }
        match crate::text::nearest_preceding(&offsets, whole.start()) {
            Some(index) => meta.push_section(positions[index].1.clone(), heading),
            None => tracing::trace!(heading = %heading, "subhead precedes every vn"),
        }
    }
    meta
}

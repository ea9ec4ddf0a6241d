//! Shared text utilities
//!
//! Everything the three format parsers have in common: reference
//! decomposition, whitespace and entity normalization, tag stripping,
//! red-letter detection, depth-counted element extraction and verse
//! construction with defaults.
//!
//! Only [`decompose_reference`] can fail; every other function is total.

use regex::{Captures, Regex};
use std::sync::LazyLock;
use verso_core::{
    Footnote, FootnoteKind, ParserConfig, ParserError, ParserResult, PoetryLine, SpeakerLabel,
    Verse,
};

static REFERENCE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.*\S)\s+(\d+)$").expect("reference regex"));

static WHITESPACE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[\s\u{00A0}\u{200B}\u{200C}\u{200D}\u{2028}\u{2029}\u{FEFF}]+")
        .expect("whitespace regex")
});

static BREAK_TAG_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<br\s*/?>").expect("break tag regex"));

static STRUCTURAL_TAG_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)</?(?:p|div|span|b|i|em|strong|sup|small|a|h[1-6]|ol|ul|li|section)\b[^>]*>",
    )
    .expect("structural tag regex")
});

static ANY_TAG_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^<>]*>").expect("any tag regex"));

static ENTITY_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"&(?:[A-Za-z][A-Za-z0-9]*|#[0-9]+|#[xX][0-9A-Fa-f]+);").expect("entity regex")
});

static OPEN_TAG_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<([A-Za-z][A-Za-z0-9_-]*)([^<>]*)>").expect("open tag regex"));

static ATTR_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"([A-Za-z_:][-A-Za-z0-9_:.]*)\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'>/]+))"#)
        .expect("attribute regex")
});

static SELAH_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bselah\b").expect("selah regex"));

static PSALM_WORD_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bpsalms?\b").expect("psalm word regex"));

static HEBREW_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bheb(?:\.|rew\b)").expect("hebrew regex"));

static GREEK_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(?:\bgk\.|\bgr\.|\bgreek\b)").expect("greek regex"));

static ALTERNATIVE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bor\b").expect("alternative regex"));

static MANUSCRIPT_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)manuscript").expect("manuscript regex"));

static SEE_ALSO_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(?:\bcompare\b|\bsee\b|\bcp\.)").expect("see-also regex"));

static MUSICAL_CUE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:choirmaster|chief musician|director of music|choir director|stringed instruments|flutes|according to|sheminith|gittith|shiggaion|alamoth|muth-labben)\b",
    )
    .expect("musical cue regex")
});

/// Split "Book Chapter" into its parts
///
/// The chapter is the trailing run of digits; everything before the
/// separating whitespace is the book name (which may itself contain digits,
/// as in "1 John 4").
pub fn decompose_reference(reference: &str) -> ParserResult<(String, u32)> {
    let trimmed = reference.trim();
    let caps = REFERENCE_REGEX
        .captures(trimmed)
        .ok_or_else(|| ParserError::invalid_reference(reference))?;

    let book = caps[1].trim().to_string();
    let chapter = caps[2]
        .parse::<u32>()
        .map_err(|_| ParserError::invalid_reference(reference))?;

    Ok((book, chapter))
}

/// Collapse every whitespace run (including NBSP and zero-width characters)
/// to a single ASCII space and trim the ends
pub fn normalize(text: &str) -> String {
    WHITESPACE_REGEX.replace_all(text, " ").trim().to_string()
}

/// Normalize each line separately, dropping blank lines, keeping `\n` joins
pub fn normalize_lines(text: &str) -> String {
    text.split('\n')
        .map(normalize)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Remove markup and decode the fixed entity set
///
/// Line breaks become spaces so adjacent words never fuse. The result never
/// contains `<` or `>`.
pub fn strip_tags(markup: &str) -> String {
    let text = BREAK_TAG_REGEX.replace_all(markup, " ");
    let text = STRUCTURAL_TAG_REGEX.replace_all(&text, "");
    let mut text = ANY_TAG_REGEX.replace_all(&text, "").into_owned();
    // Dropping a stray bracket can splice a new entity together.
    loop {
        let next = decode_entities(&text).replace(['<', '>'], "");
        if next == text {
            return next;
        }
        text = next;
    }
}

/// Decode `&nbsp; &amp; &lt; &gt; &quot; &#39; &mdash;`; drop any other entity
///
/// Runs until nothing changes, so double-escaped input (`&amp;lt;`) cannot
/// leave an allowlisted entity behind.
pub fn decode_entities(text: &str) -> String {
    let mut current = text.to_string();
    loop {
        let next = ENTITY_REGEX
            .replace_all(&current, |caps: &Captures| {
                match &caps[0] {
                    "&nbsp;" => " ",
                    "&amp;" => "&",
                    "&lt;" => "<",
                    "&gt;" => ">",
                    "&quot;" => "\"",
                    "&#39;" => "'",
                    "&mdash;" => "\u{2014}",
                    _ => "",
                }
                .to_string()
            })
            .into_owned();
        if next == current {
            return next;
        }
        current = next;
    }
}

/// Strip tags then normalize whitespace
pub fn clean(markup: &str) -> String {
    normalize(&strip_tags(markup))
}

/// Read one attribute value from the attribute part of a tag
pub fn attr(attrs: &str, name: &str) -> Option<String> {
    ATTR_REGEX.captures_iter(attrs).find_map(|caps| {
        if caps[1].eq_ignore_ascii_case(name) {
            caps.get(2)
                .or_else(|| caps.get(3))
                .or_else(|| caps.get(4))
                .map(|m| m.as_str().to_string())
        } else {
            None
        }
    })
}

/// Whether a tag's `class` attribute contains `class` as a whole token
pub fn has_class(attrs: &str, class: &str) -> bool {
    attr(attrs, "class")
        .map(|value| value.split_whitespace().any(|c| c.eq_ignore_ascii_case(class)))
        .unwrap_or(false)
}

/// Whole-fragment red-letter check
///
/// True only when one element wrapping the *entire* fragment is a red-letter
/// element (by tag name or class). Partial spans are the format parsers'
/// business; see [`contains_red_letter`].
pub fn extract_red_letter(markup: &str, config: &ParserConfig) -> (String, bool) {
    let trimmed = markup.trim();
    if let Some(caps) = OPEN_TAG_REGEX.captures(trimmed) {
        let open = caps.get(0).map(|m| m.start()).unwrap_or(usize::MAX);
        let tag = &caps[1];
        let attrs = &caps[2];
        if open == 0 && is_red_letter_tag(tag, attrs, config) {
            let scanner = TagScanner::new(tag);
            if let Some(element) = scanner.elements(trimmed, |_| true).into_iter().next() {
                if element.start == 0 && element.end == trimmed.len() {
                    return (clean(element.inner), true);
                }
            }
        }
    }
    (clean(markup), false)
}

/// Partial red-letter test: any red-letter element anywhere in the markup
pub fn contains_red_letter(markup: &str, config: &ParserConfig) -> bool {
    OPEN_TAG_REGEX
        .captures_iter(markup)
        .any(|caps| is_red_letter_tag(&caps[1], &caps[2], config))
}

fn is_red_letter_tag(tag: &str, attrs: &str, config: &ParserConfig) -> bool {
    if tag.eq_ignore_ascii_case("red") {
        return true;
    }
    attr(attrs, "class")
        .map(|class| config.class_list_has_red_letter(&class))
        .unwrap_or(false)
}

/// Case-insensitive whole-word "Selah"
pub fn is_selah(text: &str) -> bool {
    SELAH_REGEX.is_match(text)
}

/// Whether a heading reads like a Psalm superscription
pub fn is_superscription(text: &str, config: &ParserConfig) -> bool {
    let lowered = normalize(text).to_lowercase();
    if lowered.is_empty() {
        return false;
    }
    config
        .superscription_prefixes
        .iter()
        .any(|prefix| !prefix.is_empty() && lowered.starts_with(&prefix.to_lowercase()))
        || PSALM_WORD_REGEX.is_match(&lowered)
}

/// First clause of a superscription that carries a musical direction
pub fn musical_notation(superscription: &str) -> Option<String> {
    superscription
        .split(['.', ';'])
        .map(str::trim)
        .find(|clause| MUSICAL_CUE_REGEX.is_match(clause))
        .map(str::to_string)
}

/// Classify a footnote body
///
/// Precedence: hebrew, greek, alternative ("or"), textual variant
/// ("manuscript"), cross reference ("compare"/"see"), other.
pub fn classify_footnote(body: &str) -> FootnoteKind {
    if HEBREW_REGEX.is_match(body) {
        FootnoteKind::Hebrew
    } else if GREEK_REGEX.is_match(body) {
        FootnoteKind::Greek
    } else if ALTERNATIVE_REGEX.is_match(body) {
        FootnoteKind::Alternative
    } else if MANUSCRIPT_REGEX.is_match(body) {
        FootnoteKind::TextualVariant
    } else if SEE_ALSO_REGEX.is_match(body) {
        FootnoteKind::CrossReference
    } else {
        FootnoteKind::Other
    }
}

/// Build a classified footnote; `None` when the body is empty after cleaning
pub fn make_footnote(marker: &str, reference: Option<&str>, body: &str) -> Option<Footnote> {
    let content = normalize(body);
    if content.is_empty() {
        return None;
    }
    let kind = classify_footnote(&content);
    let mut note = Footnote::new(normalize(marker), content, kind);
    if let Some(reference) = reference {
        note = note.with_reference(normalize(reference));
    }
    Some(note)
}

/// Stable identifier for a heading that has no element id of its own
pub fn heading_anchor(chapter: u32, verse: &str) -> String {
    format!("heading-{}-{}", chapter, verse)
}

/// Caller-supplied values merged over the verse defaults
#[derive(Debug, Clone, Default)]
pub struct VerseOverrides {
    pub is_red_letter: bool,
    pub is_first_verse: bool,
    pub heading: Option<String>,
    pub heading_id: Option<String>,
    pub raw_html: Option<String>,
    pub indent_level: u8,
    pub is_selah: bool,
    pub stanza_break_after: bool,
    pub starts_paragraph: bool,
    pub poetry_lines: Vec<PoetryLine>,
    pub lines: Vec<String>,
    pub prose_before: Option<String>,
    pub prose_after: Option<String>,
    pub speakers: Vec<SpeakerLabel>,
    pub footnotes: Vec<Footnote>,
}

/// Construct a verse with defaults merged with `overrides`
///
/// The text is whitespace-normalized unless the overrides carry explicit
/// line structure, in which case each line is normalized on its own and the
/// line breaks survive.
pub fn build_verse(number: impl Into<String>, text: &str, overrides: VerseOverrides) -> Verse {
    let has_lines = !overrides.lines.is_empty() || !overrides.poetry_lines.is_empty();
    let text = if has_lines {
        normalize_lines(text)
    } else {
        normalize(text)
    };

    Verse {
        number: normalize(&number.into()),
        text,
        is_red_letter: overrides.is_red_letter,
        is_first_verse: overrides.is_first_verse,
        heading: overrides.heading.filter(|h| !h.is_empty()),
        heading_id: overrides.heading_id,
        raw_html: overrides.raw_html,
        indent_level: overrides.indent_level,
        is_selah: overrides.is_selah,
        stanza_break_after: overrides.stanza_break_after,
        starts_paragraph: overrides.starts_paragraph,
        poetry_lines: overrides.poetry_lines,
        lines: overrides.lines,
        prose_before: overrides.prose_before.filter(|p| !p.is_empty()),
        prose_after: overrides.prose_after.filter(|p| !p.is_empty()),
        speakers: overrides.speakers,
        footnotes: overrides.footnotes,
    }
}

/// An element located by [`TagScanner`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Element<'a> {
    /// Offset of the opening `<`
    pub start: usize,
    /// Offset just past the matching close tag (or end of input)
    pub end: usize,
    /// Offset where the inner content begins
    pub inner_start: usize,
    /// Raw attribute text of the opening tag
    pub attrs: &'a str,
    /// Content between the opening tag and its matching close
    pub inner: &'a str,
}

#[derive(Debug, Clone, Copy)]
struct TagToken {
    start: usize,
    end: usize,
    closing: bool,
    self_closing: bool,
    attrs: (usize, usize),
}

/// Depth-counting extractor for one element name
///
/// Naive "shortest match to the next close tag" truncates any element whose
/// content contains a nested element of the same name. The scanner walks
/// forward from each matching open tag, incrementing on nested opens and
/// decrementing on closes, and stops at the close that brings the depth back
/// to zero. An element left open runs to the end of the input.
pub struct TagScanner {
    tag: String,
    tag_regex: Regex,
}

impl TagScanner {
    /// Build a scanner for elements named `tag`
    pub fn new(tag: &str) -> Self {
        // The name must end at whitespace, `/` or `>`: `<span-note>` is not a span.
        let pattern = format!(r"(?i)<(/?){}((?:[\s/][^<>]*)?)>", regex::escape(tag));
        Self {
            tag: tag.to_ascii_lowercase(),
            tag_regex: Regex::new(&pattern).expect("tag scanner regex"),
        }
    }

    /// Element name this scanner matches
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Outermost elements whose opening-tag attributes satisfy `predicate`,
    /// in document order
    ///
    /// Matching elements nested inside an earlier match are part of that
    /// match's content and are not reported separately.
    pub fn elements<'a, F>(&self, html: &'a str, predicate: F) -> Vec<Element<'a>>
    where
        F: Fn(&str) -> bool,
    {
        let tokens: Vec<TagToken> = self
            .tag_regex
            .captures_iter(html)
            .filter_map(|caps| {
                let whole = caps.get(0)?;
                let attrs = caps.get(2)?;
                Some(TagToken {
                    start: whole.start(),
                    end: whole.end(),
                    closing: !caps[1].is_empty(),
                    self_closing: attrs.as_str().trim_end().ends_with('/'),
                    attrs: (attrs.start(), attrs.end()),
                })
            })
            .collect();

        let mut elements = Vec::new();
        let mut i = 0;
        while i < tokens.len() {
            let open = tokens[i];
            let attrs = &html[open.attrs.0..open.attrs.1];
            if open.closing || !predicate(attrs) {
                i += 1;
                continue;
            }

            if open.self_closing {
                elements.push(Element {
                    start: open.start,
                    end: open.end,
                    inner_start: open.end,
                    attrs,
                    inner: "",
                });
                i += 1;
                continue;
            }

            let mut depth = 1usize;
            let mut close: Option<(usize, usize, usize)> = None;
            for (j, token) in tokens.iter().enumerate().skip(i + 1) {
                if token.closing {
                    depth -= 1;
                    if depth == 0 {
                        close = Some((j, token.start, token.end));
                        break;
                    }
                } else if !token.self_closing {
                    depth += 1;
                }
            }

            match close {
                Some((j, close_start, close_end)) => {
                    elements.push(Element {
                        start: open.start,
                        end: close_end,
                        inner_start: open.end,
                        attrs,
                        inner: &html[open.end..close_start],
                    });
                    i = j + 1;
                }
                None => {
                    elements.push(Element {
                        start: open.start,
                        end: html.len(),
                        inner_start: open.end,
                        attrs,
                        inner: &html[open.end..],
                    });
                    break;
                }
            }
        }
        elements
    }

    /// Elements carrying `class` in their class list
    pub fn with_class<'a>(&self, html: &'a str, class: &str) -> Vec<Element<'a>> {
        self.elements(html, |attrs| has_class(attrs, class))
    }
}

/// Remove the given byte ranges (sorted, non-overlapping) from `html`
pub fn remove_ranges(html: &str, ranges: &[(usize, usize)]) -> String {
    let mut out = String::with_capacity(html.len());
    let mut cursor = 0;
    for &(start, end) in ranges {
        if start < cursor {
            continue;
        }
        out.push_str(&html[cursor..start]);
        cursor = end;
    }
    out.push_str(&html[cursor..]);
    out
}

/// Index of the last position in `sorted` that is strictly before `offset`
pub fn nearest_preceding(sorted: &[usize], offset: usize) -> Option<usize> {
    match sorted.partition_point(|&p| p < offset) {
        0 => None,
        n => Some(n - 1),
    }
}

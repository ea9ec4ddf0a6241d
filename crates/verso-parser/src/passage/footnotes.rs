//! Footnote table extraction and in-text marker resolution
//!
//! Two dialects are understood. The modern one lists notes as paragraphs
//! inside `<div class="footnotes">`, each linking back to the in-text anchor
//! id. The legacy one lists `<li id="fen-...">` items that in-text markers
//! point at through `data-fn`.

use crate::text::{attr, clean, has_class, make_footnote, remove_ranges, TagScanner};
use regex::Regex;
use std::sync::LazyLock;
use verso_core::Footnote;

static ANCHOR_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<a\b([^>]*)>(.*?)</a>").expect("anchor regex"));

static PARAGRAPH_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<p\b[^>]*>(.*?)</p>").expect("paragraph regex"));

/// One entry of the footnote section
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct FootnoteEntry {
    /// Ids this entry can be reached by
    pub keys: Vec<String>,
    pub reference: Option<String>,
    pub body: String,
}

/// Lookup table built from the passage's footnote section
#[derive(Debug, Clone, Default)]
pub(crate) struct FootnoteTable {
    entries: Vec<FootnoteEntry>,
}

impl FootnoteTable {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    fn find(&self, key: &str) -> Option<&FootnoteEntry> {
        let key = key.trim_start_matches('#');
        if key.is_empty() {
            return None;
        }
        self.entries.iter().find(|e| e.keys.iter().any(|k| k == key))
    }
}

/// Split the footnote section off the passage
///
/// Returns the passage without the section and the parsed table.
pub(crate) fn extract(html: &str) -> (String, FootnoteTable) {
    let sections = TagScanner::new("div").with_class(html, "footnotes");
    if sections.is_empty() {
        return (html.to_string(), FootnoteTable::default());
    }

    let mut entries = Vec::new();
    for section in &sections {
        entries.extend(legacy_entries(section.inner));
        entries.extend(modern_entries(section.inner));
    }
    let ranges: Vec<(usize, usize)> = sections.iter().map(|s| (s.start, s.end)).collect();
    tracing::trace!(entries = entries.len(), "footnote section extracted");

    (remove_ranges(html, &ranges), FootnoteTable { entries })
}

fn legacy_entries(section: &str) -> Vec<FootnoteEntry> {
    let spans = TagScanner::new("span");
    TagScanner::new("li")
        .elements(section, |attrs| attr(attrs, "id").is_some())
        .into_iter()
        .filter_map(|item| {
            let id = attr(item.attrs, "id")?;
            let body = spans
                .with_class(item.inner, "footnote-text")
                .first()
                .map(|span| clean(span.inner))?;
            let reference = ANCHOR_REGEX
                .captures(item.inner)
                .map(|caps| clean(&caps[2]))
                .filter(|r| !r.is_empty());
            Some(FootnoteEntry {
                keys: vec![id],
                reference,
                body,
            })
        })
        .collect()
}

fn modern_entries(section: &str) -> Vec<FootnoteEntry> {
    let spans = TagScanner::new("span");
    PARAGRAPH_REGEX
        .captures_iter(section)
        .filter_map(|caps| {
            let paragraph = caps.get(1)?.as_str();
            let label = spans.with_class(paragraph, "footnote").into_iter().next()?;
            let anchor = ANCHOR_REGEX.captures(label.inner)?;

            let mut keys = Vec::new();
            if let Some(href) = attr(&anchor[1], "href") {
                keys.push(href.trim_start_matches('#').to_string());
            }
            if let Some(id) = attr(&anchor[1], "id") {
                keys.push(id);
            }
            if keys.is_empty() {
                return None;
            }

            let reference_span = spans.with_class(paragraph, "footnote-ref").into_iter().next();
            let reference = reference_span.map(|s| clean(s.inner)).filter(|r| !r.is_empty());

            let mut ranges = vec![(label.start, label.end)];
            if let Some(span) = reference_span {
                ranges.push((span.start, span.end));
            }
            ranges.sort_unstable();
            let body = clean(&remove_ranges(paragraph, &ranges));

            Some(FootnoteEntry {
                keys,
                reference,
                body,
            })
        })
        .collect()
}

/// Resolve footnote markers in a verse segment and drop marker markup
///
/// Cross-reference superscripts are removed without producing notes. Markers
/// that resolve to nothing, or to an empty body, are dropped.
pub(crate) fn take_footnotes(segment: &str, table: &FootnoteTable) -> (String, Vec<Footnote>) {
    let sups = TagScanner::new("sup").elements(segment, |attrs| {
        has_class(attrs, "footnote") || has_class(attrs, "crossref") || has_class(attrs, "crossreference")
    });
    if sups.is_empty() {
        return (segment.to_string(), Vec::new());
    }

    let mut notes = Vec::new();
    for sup in &sups {
        if !has_class(sup.attrs, "footnote") {
            continue;
        }
        let mut keys: Vec<String> = attr(sup.attrs, "data-fn").into_iter().collect();
        if let Some(anchor) = ANCHOR_REGEX.captures(sup.inner) {
            keys.extend(attr(&anchor[1], "id"));
            keys.extend(attr(&anchor[1], "href"));
        }
        let marker = clean(sup.inner)
            .trim_matches(|c| c == '[' || c == ']')
            .to_string();

        match keys.iter().find_map(|k| table.find(k)) {
            Some(entry) => {
                notes.extend(make_footnote(&marker, entry.reference.as_deref(), &entry.body));
            }
            None => tracing::debug!(marker = %marker, "footnote marker without a table entry"),
        }
    }

    let ranges: Vec<(usize, usize)> = sups.iter().map(|s| (s.start, s.end)).collect();
    (remove_ranges(segment, &ranges), notes)
}

//! Heading pre-scan and Psalm superscription selection

use crate::text::{attr, clean, has_class, is_superscription};
use regex::Regex;
use std::sync::LazyLock;
use verso_core::ParserConfig;

static HEADING_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<(h[2-4])\b([^>]*)>(.*?)</h[2-4]\s*>").expect("heading regex")
});

static SUP_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<sup\b[^>]*>.*?</sup>").expect("sup regex"));

/// A heading element and where it sits in the passage
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct HeadingMark {
    pub start: usize,
    pub end: usize,
    pub text: String,
    pub id: Option<String>,
    pub psalm_title: bool,
}

/// Every `h2`-`h4` with non-empty text, in document order
///
/// Passage reference banners (`extra_text`) are not content headings.
pub(crate) fn scan(html: &str) -> Vec<HeadingMark> {
    HEADING_REGEX
        .captures_iter(html)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let attrs = caps.get(2).map(|m| m.as_str()).unwrap_or_default();
            if has_class(attrs, "extra_text") {
                return None;
            }
            let inner = SUP_REGEX.replace_all(&caps[3], "");
            let text = clean(&inner);
            if text.is_empty() {
                return None;
            }
            Some(HeadingMark {
                start: whole.start(),
                end: whole.end(),
                text,
                id: attr(attrs, "id"),
                psalm_title: has_class(attrs, "psalm-title"),
            })
        })
        .collect()
}

/// Pull the superscription out of a Psalm's headings
///
/// The candidate is the element explicitly classed as a Psalm title, or else
/// the first heading. It only counts when its text reads like a
/// superscription; otherwise it stays an ordinary section heading.
pub(crate) fn split_superscription(
    mut headings: Vec<HeadingMark>,
    config: &ParserConfig,
) -> (Option<HeadingMark>, Vec<HeadingMark>) {
    let candidate = headings
        .iter()
        .position(|h| h.psalm_title)
        .or(if headings.is_empty() { None } else { Some(0) });

    match candidate {
        Some(index) if is_superscription(&headings[index].text, config) => {
            let superscription = headings.remove(index);
            (Some(superscription), headings)
        }
        _ => (None, headings),
    }
}

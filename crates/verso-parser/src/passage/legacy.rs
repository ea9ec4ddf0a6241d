//! Legacy nested-span strategy
//!
//! Every verse lives in `<span class="text Book-C-V">`. Verse text may itself
//! contain spans (red-letter, divine name, small caps), so extraction goes
//! through the depth-counting [`TagScanner`].

use super::headings::HeadingMark;
use super::{ScanContext, VerseDraft};
use crate::text::{attr, clean, TagScanner};
use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

static CHAPTERNUM_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<span\b[^>]*\bclass\s*=\s*["'][^"']*\bchapternum\b[^"']*["'][^>]*>(.*?)</span>"#)
        .expect("chapternum regex")
});

static VERSENUM_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<sup\b[^>]*\bclass\s*=\s*["'][^"']*\bversenum\b[^"']*["'][^>]*>(.*?)</sup>"#)
        .expect("versenum regex")
});

/// `(offset, verse number)` for every legacy marker
pub(crate) fn markers(html: &str) -> Vec<(usize, String)> {
    let chapter = CHAPTERNUM_REGEX
        .find_iter(html)
        .map(|m| (m.start(), "1".to_string()));
    let verses = VERSENUM_REGEX
        .captures_iter(html)
        .filter_map(|caps| Some((caps.get(0)?.start(), clean(&caps[1]))));
    let mut all: Vec<_> = chapter.chain(verses).filter(|(_, n)| !n.is_empty()).collect();
    all.sort_by_key(|(start, _)| *start);
    all
}

/// Class tokens other than `text`, e.g. "Ps-23-1"
fn verse_key(attrs: &str) -> Option<String> {
    let class = attr(attrs, "class")?;
    let key: Vec<&str> = class
        .split_whitespace()
        .filter(|c| !c.eq_ignore_ascii_case("text"))
        .collect();
    (!key.is_empty()).then(|| key.join(" "))
}

pub(super) fn scan(
    html: &str,
    ctx: &ScanContext<'_>,
    superscription: Option<&HeadingMark>,
) -> Vec<VerseDraft> {
    let spans = TagScanner::new("span").with_class(html, "text");
    let excluded: Vec<(usize, usize)> = ctx
        .headings
        .iter()
        .chain(superscription)
        .map(|h| (h.start, h.end))
        .collect();
    let poetry: Vec<(usize, usize)> = TagScanner::new("div")
        .with_class(html, "poetry")
        .iter()
        .map(|d| (d.start, d.end))
        .collect();
    let within = |ranges: &[(usize, usize)], at: usize| ranges.iter().any(|&(s, e)| s <= at && at < e);

    let mut drafts: Vec<VerseDraft> = Vec::new();
    // (span offset, owning draft) for heading placement
    let mut owners: Vec<(usize, usize)> = Vec::new();
    let mut last_key: Option<String> = None;

    for span in spans {
        if within(&excluded, span.start) {
            continue;
        }
        let key = verse_key(span.attrs);

        let (number, first) = if CHAPTERNUM_REGEX.is_match(span.inner) {
            ("1".to_string(), true)
        } else if let Some(caps) = VERSENUM_REGEX.captures(span.inner) {
            (clean(&caps[1]), false)
        } else {
            match drafts.last_mut() {
                Some(last) if key.is_some() && key == last_key => {
                    last.push_continuation(span.inner, ctx);
                    owners.push((span.start, drafts.len() - 1));
                }
                _ => tracing::debug!(class = ?key, "discarding verse span without a marker"),
            }
            continue;
        };
        if number.is_empty() {
            tracing::debug!(class = ?key, "discarding verse span with an empty marker");
            continue;
        }

        let body = CHAPTERNUM_REGEX.replace_all(span.inner, "");
        let body = VERSENUM_REGEX.replace_all(&body, "");
        let mut draft = VerseDraft::new(number, first);
        if within(&poetry, span.start) {
            draft.indent_level = 1;
        }
        draft.push_prose(&body, ctx);

        owners.push((span.start, drafts.len()));
        drafts.push(draft);
        last_key = key;
    }

    let mut used_headings: HashSet<&str> = HashSet::new();
    for heading in ctx.headings {
        if used_headings.contains(heading.text.as_str()) {
            tracing::trace!(heading = %heading.text, "repeated heading text");
            continue;
        }
        let following = owners.iter().find(|(start, _)| *start >= heading.end);
        match following {
            Some(&(_, index)) if drafts[index].heading.is_none() => {
                drafts[index].set_heading(heading);
                used_headings.insert(&heading.text);
            }
            Some(_) => {}
            None => tracing::trace!(heading = %heading.text, "heading follows every verse"),
        }
    }

    drafts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::passage::PassageParser;
    use serde_json::json;
    use tracing_test::traced_test;
    use verso_core::{ChapterParser, Translation};

    fn parse(canonical: &str, html: &str) -> verso_core::Chapter {
        PassageParser::new(Translation::Niv)
            .parse(&json!({"canonical": canonical, "passages": [html]}))
            .unwrap()
    }

    #[test]
    fn test_nested_span_is_not_truncated() {
        let html = r#"<p><span class="text John-11-35"><span class="chapternum">11 </span>Jesus <span class="woj">wept</span> openly.</span> <span class="text John-11-36"><sup class="versenum">36 </sup>So the Jews said,</span></p>"#;
        let chapter = parse("John 11", html);
        assert_eq!(chapter.verses.len(), 2);
        assert_eq!(chapter.verses[0].text, "Jesus wept openly.");
        assert!(chapter.verses[0].is_first_verse);
        assert!(chapter.verses[0].is_red_letter);
        assert_eq!(chapter.verses[1].number, "36");
        assert_eq!(chapter.verses[1].text, "So the Jews said,");
    }

    #[test]
    fn test_heading_goes_to_following_span() {
        let html = r#"<h3><span class="text Gen-1-1">The Beginning</span></h3><p><span class="text Gen-1-1"><span class="chapternum">1 </span>In the beginning</span></p><h3>Day Two</h3><p><span class="text Gen-1-6"><sup class="versenum">6 </sup>And God said</span></p>"#;
        let chapter = parse("Genesis 1", html);
        assert_eq!(chapter.verses.len(), 2);
        assert_eq!(chapter.verses[0].heading.as_deref(), Some("The Beginning"));
        assert_eq!(chapter.verses[1].heading.as_deref(), Some("Day Two"));
        assert_eq!(chapter.verses[1].heading_id.as_deref(), Some("heading-1-6"));
    }

    #[test]
    fn test_repeated_heading_text_attaches_once() {
        let html = r#"<h3>Praise</h3><p><span class="text Ps-150-1"><span class="chapternum">150 </span>Praise the LORD!</span></p><h3>Praise</h3><p><span class="text Ps-150-2"><sup class="versenum">2 </sup>Praise him for his mighty deeds;</span></p>"#;
        let chapter = parse("Psalm 150", html);
        assert_eq!(chapter.verses.len(), 2);
        assert_eq!(chapter.verses[0].heading.as_deref(), Some("Praise"));
        assert!(chapter.verses[1].heading.is_none());
    }

    #[test]
    fn test_poetry_continuation_lines() {
        let html = r#"<div class="poetry"><p class="line"><span class="text Ps-23-1"><span class="chapternum">23 </span>The Lord is my shepherd,</span><br /><span class="text Ps-23-1">I lack nothing.</span></p></div>"#;
        let chapter = parse("Psalm 23", html);
        let verse = &chapter.verses[0];
        assert_eq!(verse.text, "The Lord is my shepherd,\nI lack nothing.");
        assert_eq!(verse.lines, vec!["The Lord is my shepherd,", "I lack nothing."]);
        assert_eq!(verse.indent_level, 1);
    }

    #[test]
    #[traced_test]
    fn test_unmarked_span_is_discarded_with_diagnostic() {
        let html = r#"<p><span class="text Gen-1-1"><span class="chapternum">1 </span>In the beginning</span><span class="text Gen-1-9">stray</span></p>"#;
        let chapter = parse("Genesis 1", html);
        assert_eq!(chapter.verses.len(), 1);
        assert_eq!(chapter.verses[0].text, "In the beginning");
        assert!(logs_contain("discarding verse span without a marker"));
    }

    #[test]
    fn test_markers_are_ordered() {
        let html = r#"<span class="chapternum">1 </span>a<sup class="versenum">2 </sup>b"#;
        let sup = html.find("<sup").unwrap();
        assert_eq!(markers(html), vec![(0, "1".to_string()), (sup, "2".to_string())]);
    }
}

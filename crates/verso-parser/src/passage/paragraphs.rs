//! Paragraph-marker strategy, with line-by-line reading for Psalms

use super::{ScanContext, VerseDraft, PARAGRAPH_REGEX};
use crate::text::{attr, clean, has_class, TagScanner};
use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

static MARKER_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<b\b([^>]*)>(.*?)</b>").expect("verse marker regex"));

static GROUP_END_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<span\b[^>]*\bclass\s*=\s*["'][^"']*\bend-line-group\b[^"']*["'][^>]*>"#)
        .expect("line group regex")
});

/// A `chapter-num` or `verse-num` marker
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Marker {
    pub start: usize,
    pub end: usize,
    pub number: String,
    pub first: bool,
}

/// Verse markers in document order
///
/// `chapter-num` carries "C:V" (or just "C" for the first verse) and marks
/// the chapter's first verse.
pub(crate) fn markers(html: &str) -> Vec<Marker> {
    MARKER_REGEX
        .captures_iter(html)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let attrs = caps.get(1)?.as_str();
            let first = has_class(attrs, "chapter-num");
            if !first && !has_class(attrs, "verse-num") {
                return None;
            }
            let label = clean(&caps[2]);
            let number = if first {
                match label.split_once(':') {
                    Some((_, verse)) => verse.trim().to_string(),
                    None => "1".to_string(),
                }
            } else {
                label
            };
            if number.is_empty() {
                return None;
            }
            Some(Marker {
                start: whole.start(),
                end: whole.end(),
                number,
                first,
            })
        })
        .collect()
}

pub(super) fn scan(html: &str, ctx: &ScanContext<'_>) -> Vec<VerseDraft> {
    let lines = TagScanner::new("span");
    let mut state = ScanState {
        ctx,
        drafts: Vec::new(),
        used_headings: HashSet::new(),
        pending_heading: None,
        pending_stanza: false,
    };

    for caps in PARAGRAPH_REGEX.captures_iter(html) {
        let (Some(whole), Some(inner)) = (caps.get(0), caps.get(2)) else {
            continue;
        };
        if ctx.config.is_copyright(whole.as_str()) {
            continue;
        }
        state.pending_heading = ctx
            .heading_before(whole.start())
            .filter(|&i| !state.used_headings.contains(&ctx.headings[i].text));

        let inner = inner.as_str();
        let line_spans = if ctx.is_psalm {
            lines.with_class(inner, "line")
        } else {
            Vec::new()
        };
        if line_spans.is_empty() {
            state.prose(inner);
        } else {
            state.poetry(inner, &line_spans);
        }
    }

    state.drafts
}

struct ScanState<'c, 'a> {
    ctx: &'c ScanContext<'a>,
    drafts: Vec<VerseDraft>,
    used_headings: HashSet<String>,
    pending_heading: Option<usize>,
    pending_stanza: bool,
}

impl ScanState<'_, '_> {
    fn open(&mut self, marker: &Marker) -> VerseDraft {
        let mut draft = VerseDraft::new(marker.number.clone(), marker.first);
        if let Some(index) = self.pending_heading.take() {
            let heading = &self.ctx.headings[index];
            self.used_headings.insert(heading.text.clone());
            draft.set_heading(heading);
        }
        draft
    }

    fn prose(&mut self, inner: &str) {
        self.inline(inner, true);
    }

    /// Prose between or after the line spans of a poetry paragraph
    fn gap(&mut self, segment: &str) {
        if !clean(segment).is_empty() {
            self.inline(segment, false);
        }
    }

    /// Unmarked lead text continues the previous verse; each marker opens a
    /// new one. Only a marker at the top of a paragraph starts a paragraph.
    fn inline(&mut self, inner: &str, paragraph_start: bool) {
        let marks = markers(inner);
        let Some(first) = marks.first() else {
            if let Some(last) = self.drafts.last_mut() {
                last.push_prose(inner, self.ctx);
            }
            return;
        };

        let lead = &inner[..first.start];
        let has_lead = !clean(lead).is_empty();
        if has_lead {
            if let Some(last) = self.drafts.last_mut() {
                last.push_prose(lead, self.ctx);
            }
        }

        for (k, marker) in marks.iter().enumerate() {
            let end = marks.get(k + 1).map_or(inner.len(), |next| next.start);
            let mut draft = self.open(marker);
            if k == 0 && paragraph_start {
                draft.starts_paragraph = !has_lead && !self.drafts.is_empty();
            }
            draft.push_prose(&inner[marker.end..end], self.ctx);
            self.drafts.push(draft);
        }
    }

    fn poetry(&mut self, inner: &str, line_spans: &[crate::text::Element<'_>]) {
        let group_ends: Vec<usize> = GROUP_END_REGEX.find_iter(inner).map(|m| m.start()).collect();
        let mut g = 0;

        let lead = &inner[..line_spans[0].start];
        if !markers(lead).is_empty() {
            self.prose(lead);
        } else if !clean(lead).is_empty() {
            if let Some(last) = self.drafts.last_mut() {
                last.push_prose(lead, self.ctx);
            }
        }

        let mut cursor = line_spans[0].start;
        for line in line_spans {
            while g < group_ends.len() && group_ends[g] < line.start {
                self.stanza_break();
                g += 1;
            }
            self.gap(&inner[cursor..line.start]);
            cursor = line.end;

            let indent = if attr(line.attrs, "class")
                .is_some_and(|c| c.split_whitespace().any(|t| t.starts_with("indent")))
            {
                2
            } else {
                1
            };
            let mut new_stanza = std::mem::take(&mut self.pending_stanza);

            let marks = markers(line.inner);
            let lead_end = marks.first().map_or(line.inner.len(), |m| m.start);
            let lead = &line.inner[..lead_end];
            if !clean(lead).is_empty() {
                match self.drafts.last_mut() {
                    Some(last) => {
                        last.push_line(lead, indent, new_stanza, self.ctx);
                        new_stanza = false;
                    }
                    None => tracing::debug!("poetry line before any verse marker"),
                }
            }

            for (k, marker) in marks.iter().enumerate() {
                let end = marks.get(k + 1).map_or(line.inner.len(), |next| next.start);
                let mut draft = self.open(marker);
                draft.push_line(&line.inner[marker.end..end], indent, new_stanza, self.ctx);
                new_stanza = false;
                self.drafts.push(draft);
            }
        }

        while g < group_ends.len() {
            self.stanza_break();
            g += 1;
        }
        self.gap(&inner[cursor..]);
    }

    fn stanza_break(&mut self) {
        if let Some(last) = self.drafts.last_mut() {
            if !last.lines.is_empty() {
                last.stanza_break_after = true;
                self.pending_stanza = true;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::passage::PassageParser;
    use serde_json::json;
    use verso_core::{ChapterParser, Translation};

    const PSALM_23: &str = r#"<h2 class="extra_text">Psalm 23</h2>
<h3 id="h-shepherd">The LORD Is My Shepherd</h3>
<h4 class="psalm-title">A Psalm of David.</h4>
<p class="block-indent"><span class="begin-line-group"></span>
<span class="line"><b class="chapter-num">23:1&nbsp;</b>&nbsp;&nbsp;The <span class="divine-name">Lord</span> is my shepherd; I shall not want.</span><br />
<span class="line"><b class="verse-num">2</b>&nbsp;&nbsp;He makes me lie down in green pastures.</span><br />
<span class="indent line">He leads me beside still waters.</span><br />
<span class="end-line-group"></span>
<span class="begin-line-group"></span>
<span class="line"><b class="verse-num">3</b>He restores my soul. Selah</span>
<span class="end-line-group"></span></p>
<h3>A Table Before Me</h3>
<p class="block-indent"><span class="line"><b class="verse-num">4</b>You prepare a table before me.</span></p>"#;

    #[test]
    fn test_markers() {
        let found = markers(r#"<b class="chapter-num">3:1&nbsp;</b>x<b class="verse-num">2</b><b>bold</b>"#);
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].number, "1");
        assert!(found[0].first);
        assert_eq!(found[1].number, "2");
        assert!(!found[1].first);

        let bare = markers(r#"<b class="chapter-num">7&nbsp;</b>"#);
        assert_eq!(bare[0].number, "1");
    }

    #[test]
    fn test_psalm_lines_and_stanzas() {
        let chapter = PassageParser::new(Translation::Esv)
            .parse(&json!({"canonical": "Psalm 23", "passages": [PSALM_23]}))
            .unwrap();
        assert_eq!(chapter.verses.len(), 4);

        let v1 = &chapter.verses[0];
        assert!(v1.is_first_verse);
        assert_eq!(v1.text, "The Lord is my shepherd; I shall not want.");
        assert_eq!(v1.heading.as_deref(), Some("The LORD Is My Shepherd"));
        assert_eq!(v1.heading_id.as_deref(), Some("h-shepherd"));
        assert_eq!(v1.indent_level, 1);

        let v2 = &chapter.verses[1];
        assert_eq!(
            v2.text,
            "He makes me lie down in green pastures.\nHe leads me beside still waters."
        );
        assert_eq!(v2.lines.len(), 2);
        assert_eq!(v2.poetry_lines[1].indent, 2);
        assert!(v2.stanza_break_after);

        let v3 = &chapter.verses[2];
        assert!(v3.poetry_lines[0].new_stanza);
        assert!(v3.is_selah);
        assert!(v3.stanza_break_after);

        let v4 = &chapter.verses[3];
        assert_eq!(v4.heading.as_deref(), Some("A Table Before Me"));

        let psalm = chapter.psalm.as_ref().unwrap();
        assert_eq!(psalm.number, 23);
        assert!(psalm.has_selah);
        assert_eq!(psalm.superscription.as_deref(), Some("A Psalm of David."));
        assert_eq!(psalm.section_headings.len(), 1);
        assert_eq!(psalm.section_headings[0].after_verse, "3");
        assert_eq!(psalm.section_headings[0].heading, "A Table Before Me");
    }

    #[test]
    fn test_markers_outside_line_spans_are_kept() {
        let html = r#"<p class="block-indent"><span class="line"><b class="chapter-num">3:1&nbsp;</b>O LORD, how many are my foes!</span><br /><b class="verse-num">2</b>many are saying of my soul,<span class="line">there is no salvation for him in God.</span> Selah<b class="verse-num">3</b>But you, O LORD, are a shield about me.</p>"#;
        let chapter = PassageParser::new(Translation::Esv)
            .parse(&json!({"canonical": "Psalm 3", "passages": [html]}))
            .unwrap();
        let numbers: Vec<&str> = chapter.verses.iter().map(|v| v.number.as_str()).collect();
        assert_eq!(numbers, ["1", "2", "3"]);

        let v2 = &chapter.verses[1];
        assert!(!v2.starts_paragraph);
        assert_eq!(v2.prose_before.as_deref(), Some("many are saying of my soul,"));
        assert_eq!(v2.text, "there is no salvation for him in God.");
        assert_eq!(v2.prose_after.as_deref(), Some("Selah"));
        assert!(v2.is_selah);

        assert_eq!(chapter.verses[2].text, "But you, O LORD, are a shield about me.");
    }

    #[test]
    fn test_prose_then_lines_splits_prose_before() {
        let html = r#"<p><b class="chapter-num">18:1&nbsp;</b>He said:</p><p class="block-indent"><span class="line">I love you, O LORD, my strength.</span></p><p>And the rest followed.</p>"#;
        let chapter = PassageParser::new(Translation::Esv)
            .parse(&json!({"canonical": "Psalm 18", "passages": [html]}))
            .unwrap();
        let verse = &chapter.verses[0];
        assert_eq!(verse.prose_before.as_deref(), Some("He said:"));
        assert_eq!(verse.text, "I love you, O LORD, my strength.");
        assert_eq!(verse.prose_after.as_deref(), Some("And the rest followed."));
    }
}

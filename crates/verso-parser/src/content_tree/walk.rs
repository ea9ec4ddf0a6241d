//! Paragraph walk and the verse accumulator state machine
//!
//! ```text
//! Idle --verse marker--> Accumulating
//! Accumulating --verse marker--> Accumulating   (flush, then reopen)
//! Accumulating --end of paragraphs--> Idle       (final flush)
//! ```
//!
//! Headings, speakers and blank-line paragraphs are remembered until the next
//! verse-bearing paragraph. Its first meaningful item decides where they go:
//! a verse marker hands them to the new verse, text hands them to the verse
//! still being accumulated.

use super::node::{Node, NodeKind};
use super::notes::{append_piece, footnote};
use crate::text::{build_verse, heading_anchor, is_selah, normalize, VerseOverrides};
use std::mem;
use verso_core::{Footnote, ParserConfig, PoetryLine, SpeakerLabel, Verse};

/// How a paragraph style is treated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ParaRole {
    Heading,
    Speaker,
    Blank,
    PsalmTitle,
    Prose,
    Poetry(u8),
}

impl ParaRole {
    pub fn of(style: &str) -> Self {
        match style {
            "s" | "s1" | "s2" | "s3" | "s4" | "ms" | "ms1" | "ms2" | "mr" => Self::Heading,
            "sp" => Self::Speaker,
            "b" => Self::Blank,
            "d" => Self::PsalmTitle,
            _ if style.starts_with('q') => {
                let level = style.trim_start_matches(|c: char| c.is_ascii_alphabetic());
                match level {
                    "2" | "3" | "4" => Self::Poetry(2),
                    _ => Self::Poetry(1),
                }
            }
            _ => Self::Prose,
        }
    }
}

/// Verse being assembled
#[derive(Debug, Default)]
struct VerseAccumulator {
    number: String,
    is_first_verse: bool,
    starts_paragraph: bool,
    stanza_break_after: bool,
    is_red_letter: bool,
    heading: Option<String>,
    prose_before: String,
    prose_after: String,
    lines: Vec<PoetryLine>,
    speakers: Vec<SpeakerLabel>,
    footnotes: Vec<Footnote>,
}

impl VerseAccumulator {
    fn push_text(&mut self, text: &str, poetry: Option<u8>, red: bool, line_open: &mut bool) {
        match poetry {
            Some(indent) => {
                if !*line_open {
                    self.lines.push(PoetryLine::new(String::new(), indent));
                    *line_open = true;
                }
                if let Some(line) = self.lines.last_mut() {
                    append_piece(&mut line.text, text);
                    line.is_red_letter |= red && !text.trim().is_empty();
                }
            }
            None if self.lines.is_empty() => append_piece(&mut self.prose_before, text),
            None => append_piece(&mut self.prose_after, text),
        }
        if red && !text.trim().is_empty() {
            self.is_red_letter = true;
        }
    }

    fn into_verse(self, chapter: u32) -> Option<Verse> {
        let lines: Vec<PoetryLine> = self
            .lines
            .into_iter()
            .map(|mut line| {
                line.text = normalize(&line.text);
                line
            })
            .filter(|line| !line.text.is_empty())
            .collect();

        let (text, line_texts, prose_before, prose_after) = if lines.is_empty() {
            let mut prose = self.prose_before;
            append_piece(&mut prose, &self.prose_after);
            (normalize(&prose), Vec::new(), None, None)
        } else {
            let texts: Vec<String> = lines.iter().map(|l| l.text.clone()).collect();
            (
                texts.join("\n"),
                texts,
                Some(normalize(&self.prose_before)),
                Some(normalize(&self.prose_after)),
            )
        };
        if text.is_empty() && prose_before.as_deref().unwrap_or_default().is_empty() {
            tracing::debug!(verse = %self.number, "dropping verse with no text");
            return None;
        }

        let selah = is_selah(&text)
            || prose_before.as_deref().is_some_and(is_selah)
            || prose_after.as_deref().is_some_and(is_selah);
        let heading_id = self
            .heading
            .as_ref()
            .map(|_| heading_anchor(chapter, &self.number));
        let indent_level = lines.first().map_or(0, |l| l.indent);

        Some(build_verse(
            self.number,
            &text,
            VerseOverrides {
                is_red_letter: self.is_red_letter,
                is_first_verse: self.is_first_verse,
                heading: self.heading,
                heading_id,
                indent_level,
                is_selah: selah,
                stanza_break_after: self.stanza_break_after,
                starts_paragraph: self.starts_paragraph,
                poetry_lines: lines,
                lines: line_texts,
                prose_before,
                prose_after,
                speakers: self.speakers,
                footnotes: self.footnotes,
                ..Default::default()
            },
        ))
    }
}

#[derive(Debug, Default)]
enum State {
    #[default]
    Idle,
    Accumulating(VerseAccumulator),
}

/// Signals from skip-only paragraphs waiting for the next verse-bearing one
#[derive(Debug, Default)]
struct Pending {
    heading: Option<String>,
    speaker: Option<String>,
    stanza: bool,
}

/// Per-paragraph scratch state
struct Paragraph {
    poetry: Option<u8>,
    /// No verse marker or text seen yet in this paragraph
    fresh: bool,
    /// First verse opened here has not been flagged yet
    opens: bool,
    line_open: bool,
    new_stanza: bool,
    speaker: Option<String>,
}

pub(crate) struct Walker<'a> {
    config: &'a ParserConfig,
    chapter: u32,
    state: State,
    pending: Pending,
    verses: Vec<Verse>,
}

impl<'a> Walker<'a> {
    pub fn new(config: &'a ParserConfig, chapter: u32) -> Self {
        Self {
            config,
            chapter,
            state: State::Idle,
            pending: Pending::default(),
            verses: Vec::new(),
        }
    }

    /// Walk every top-level paragraph and return the flushed verses
    pub fn run(mut self, paragraphs: &[Node]) -> Vec<Verse> {
        for node in paragraphs {
            if node.kind() != NodeKind::Para {
                continue;
            }
            match ParaRole::of(node.style()) {
                ParaRole::Heading => {
                    let text = normalize(&node.plain_text());
                    if !text.is_empty() {
                        self.pending.heading = Some(text);
                    }
                }
                ParaRole::Speaker => {
                    let text = normalize(&node.plain_text());
                    if !text.is_empty() {
                        self.pending.speaker = Some(text);
                    }
                }
                ParaRole::Blank => self.pending.stanza = true,
                ParaRole::PsalmTitle => {}
                ParaRole::Prose => self.paragraph(node, None),
                ParaRole::Poetry(indent) => self.paragraph(node, Some(indent)),
            }
        }
        self.flush();
        self.verses
    }

    fn paragraph(&mut self, node: &Node, poetry: Option<u8>) {
        let mut para = Paragraph {
            poetry,
            fresh: true,
            opens: true,
            line_open: false,
            new_stanza: false,
            speaker: None,
        };
        self.items(&node.items, &mut para, false);
    }

    fn items(&mut self, items: &[Node], para: &mut Paragraph, red: bool) {
        for item in items {
            match item.kind() {
                NodeKind::Verse => self.open(item, para),
                NodeKind::Text => {
                    let text = item.text.as_deref().unwrap_or_default();
                    if text.trim().is_empty() && para.fresh {
                        continue;
                    }
                    self.text(text, para, red);
                }
                NodeKind::Char => {
                    let red = red || self.config.is_red_letter_class(item.style());
                    self.items(&item.items, para, red);
                }
                NodeKind::Note => self.note(item),
                NodeKind::Para | NodeKind::Other => self.items(&item.items, para, red),
            }
        }
    }

    /// First meaningful item of a paragraph is text: boundary signals belong
    /// to the verse still open
    fn resolve_continuation(&mut self, para: &mut Paragraph) {
        if !mem::replace(&mut para.fresh, false) {
            return;
        }
        let stanza = mem::take(&mut self.pending.stanza);
        let speaker = self.pending.speaker.take();
        if let State::Accumulating(acc) = &self.state {
            para.new_stanza = stanza && para.poetry.is_some() && !acc.lines.is_empty();
            para.speaker = speaker;
        }
    }

    fn text(&mut self, text: &str, para: &mut Paragraph, red: bool) {
        self.resolve_continuation(para);
        let State::Accumulating(acc) = &mut self.state else {
            tracing::trace!("text before the first verse marker");
            return;
        };

        let opening_line = para.poetry.is_some() && !para.line_open;
        if opening_line {
            if let Some(label) = para.speaker.take() {
                acc.speakers.push(SpeakerLabel {
                    line_index: acc.lines.len(),
                    label,
                });
            }
        }
        acc.push_text(text, para.poetry, red, &mut para.line_open);
        if opening_line && mem::take(&mut para.new_stanza) {
            if let Some(line) = acc.lines.last_mut() {
                line.new_stanza = true;
            }
        }
    }

    fn open(&mut self, marker: &Node, para: &mut Paragraph) {
        let Some(number) = marker.verse_number() else {
            tracing::debug!("verse marker without a number");
            return;
        };

        let at_boundary = mem::replace(&mut para.fresh, false);
        if at_boundary && mem::take(&mut self.pending.stanza) {
            if let State::Accumulating(acc) = &mut self.state {
                acc.stanza_break_after = true;
            }
        }
        self.flush();

        let mut acc = VerseAccumulator {
            number,
            is_first_verse: self.verses.is_empty(),
            heading: self.pending.heading.take(),
            ..Default::default()
        };
        if mem::take(&mut para.opens) {
            acc.starts_paragraph = !self.verses.is_empty();
        }
        if let Some(label) = self.pending.speaker.take().or_else(|| para.speaker.take()) {
            acc.speakers.push(SpeakerLabel {
                line_index: 0,
                label,
            });
        }
        para.line_open = false;
        self.state = State::Accumulating(acc);
    }

    fn note(&mut self, note: &Node) {
        match &mut self.state {
            State::Accumulating(acc) => acc.footnotes.extend(footnote(note, self.config)),
            State::Idle => tracing::debug!("note before the first verse marker"),
        }
    }

    fn flush(&mut self) {
        if let State::Accumulating(acc) = mem::take(&mut self.state) {
            self.verses.extend(acc.into_verse(self.chapter));
        }
    }
}

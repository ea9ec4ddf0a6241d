//! Verse records and their poetry attributes

use super::{is_false, is_zero, Footnote};
use serde::{Deserialize, Serialize};

/// One line of a poetic verse
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PoetryLine {
    /// Line text
    pub text: String,

    /// Indentation level (1 = line, 2 = indented line)
    pub indent: u8,

    /// Whether the line carries red-letter speech
    #[serde(skip_serializing_if = "is_false")]
    pub is_red_letter: bool,

    /// Whether extra stanza spacing precedes this line
    #[serde(skip_serializing_if = "is_false")]
    pub new_stanza: bool,
}

impl PoetryLine {
    /// Create a poetry line
    pub fn new(text: impl Into<String>, indent: u8) -> Self {
        Self {
            text: text.into(),
            indent,
            ..Default::default()
        }
    }
}

/// Speaker attribution anchored to a line index within a verse
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeakerLabel {
    /// Index of the first line spoken by this speaker
    pub line_index: usize,

    /// Label text, e.g. "The Bride"
    pub label: String,
}

/// A single verse in canonical form
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Verse {
    /// Verse number; kept textual ("12a", "3-4")
    pub number: String,

    /// Detagged verse text
    pub text: String,

    /// Whether any part of the verse is red-letter speech
    pub is_red_letter: bool,

    /// Whether this is the first verse emitted for the chapter
    pub is_first_verse: bool,

    /// Section heading directly preceding this verse
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heading: Option<String>,

    /// Identifier of the heading element
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heading_id: Option<String>,

    /// Source markup snapshot for renderer fallback
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_html: Option<String>,

    /// 0 = prose, 1/2 = stanza nesting
    #[serde(skip_serializing_if = "is_zero")]
    pub indent_level: u8,

    /// Verse contains "Selah"
    #[serde(skip_serializing_if = "is_false")]
    pub is_selah: bool,

    /// A stanza break follows this verse
    #[serde(skip_serializing_if = "is_false")]
    pub stanza_break_after: bool,

    /// This verse opens a new paragraph
    #[serde(skip_serializing_if = "is_false")]
    pub starts_paragraph: bool,

    /// Structured poetry lines
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub poetry_lines: Vec<PoetryLine>,

    /// Literal continuation lines
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub lines: Vec<String>,

    /// Prose lead-in before the poetic body
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prose_before: Option<String>,

    /// Prose following the poetic body
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prose_after: Option<String>,

    /// Speaker labels for multi-voice passages
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub speakers: Vec<SpeakerLabel>,

    /// Footnotes attached to this verse
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub footnotes: Vec<Footnote>,
}

impl Verse {
    /// Whether the verse carries line structure rather than flowing prose
    pub fn is_poetry(&self) -> bool {
        self.indent_level > 0 || !self.poetry_lines.is_empty() || !self.lines.is_empty()
    }

    /// Numeric value of the verse number, when it starts with digits
    pub fn numeric(&self) -> Option<u32> {
        let digits: String = self
            .number
            .chars()
            .take_while(|c| c.is_ascii_digit())
            .collect();
        digits.parse().ok()
    }
}

//! Content tree nodes

use crate::text::normalize;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// What a node is, derived from its `type` and `name`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// Paragraph carrying a style tag
    Para,
    /// Verse marker
    Verse,
    /// Text leaf
    Text,
    /// Inline character formatting
    Char,
    /// Footnote or cross-reference
    Note,
    /// Anything else; ignored
    Other,
}

/// One node of the content tree
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// `"tag"` or `"text"`
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub node_type: Option<String>,

    /// Tag name (`para`, `verse`, `char`, `note`) or a bare verse number in
    /// the flat shape
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Text of a leaf
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    /// Style, number, caller and the like
    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "Map::is_empty")]
    pub attrs: Map<String, Value>,

    /// Children
    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<Node>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl Node {
    /// Paragraph with a style
    pub fn para(style: &str, items: Vec<Node>) -> Self {
        Self::tag("para", style, items)
    }

    /// Verse marker
    pub fn verse(number: &str) -> Self {
        let mut node = Self::tag("verse", "v", vec![Self::text(number)]);
        node.attrs.insert("number".into(), Value::String(number.into()));
        node
    }

    /// Text leaf
    pub fn text(text: &str) -> Self {
        Self {
            node_type: Some("text".into()),
            text: Some(text.into()),
            ..Default::default()
        }
    }

    /// Inline character span
    pub fn char(style: &str, items: Vec<Node>) -> Self {
        Self::tag("char", style, items)
    }

    /// Note with an optional caller
    pub fn note(style: &str, caller: Option<&str>, items: Vec<Node>) -> Self {
        let mut node = Self::tag("note", style, items);
        if let Some(caller) = caller {
            node.attrs.insert("caller".into(), Value::String(caller.into()));
        }
        node
    }

    fn tag(name: &str, style: &str, items: Vec<Node>) -> Self {
        let mut attrs = Map::new();
        attrs.insert("style".into(), Value::String(style.into()));
        Self {
            node_type: Some("tag".into()),
            name: Some(name.into()),
            attrs,
            items,
            ..Default::default()
        }
    }

    /// Classify the node
    pub fn kind(&self) -> NodeKind {
        if self.node_type.as_deref() == Some("text") {
            return NodeKind::Text;
        }
        match self.name.as_deref() {
            Some("para") => NodeKind::Para,
            Some("verse") => NodeKind::Verse,
            Some("char") => NodeKind::Char,
            Some("note") => NodeKind::Note,
            None if self.text.is_some() => NodeKind::Text,
            _ => NodeKind::Other,
        }
    }

    /// String attribute
    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attrs.get(key).and_then(Value::as_str)
    }

    /// `style` attribute, empty when absent
    pub fn style(&self) -> &str {
        self.attr("style").unwrap_or_default()
    }

    /// Concatenated text of the subtree, skipping notes
    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        match self.kind() {
            NodeKind::Note => {}
            NodeKind::Text => out.push_str(self.text.as_deref().unwrap_or_default()),
            _ => {
                for item in &self.items {
                    item.collect_text(out);
                }
            }
        }
    }

    /// Number of a verse marker: the `number` attribute, else its text
    pub fn verse_number(&self) -> Option<String> {
        let number = match self.attr("number") {
            Some(n) => normalize(n),
            None => normalize(&self.plain_text()),
        };
        (!number.is_empty()).then_some(number)
    }

    /// `{name: "<digits>", text}` entries of the flat shape
    pub fn flat_verse(&self) -> Option<(&str, &str)> {
        let name = self.name.as_deref()?;
        let text = self.text.as_deref()?;
        let numeric = !name.is_empty() && name.chars().all(|c| c.is_ascii_digit());
        numeric.then_some((name, text))
    }

    /// Any text leaf in the subtree (notes skipped) satisfies `predicate`
    pub fn any_text(&self, predicate: &impl Fn(&str) -> bool) -> bool {
        match self.kind() {
            NodeKind::Note => false,
            NodeKind::Text => self.text.as_deref().is_some_and(predicate),
            _ => self.items.iter().any(|item| item.any_text(predicate)),
        }
    }
}

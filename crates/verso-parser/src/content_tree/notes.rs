//! Note nodes to footnotes

use super::node::{Node, NodeKind};
use crate::text::{make_footnote, normalize};
use verso_core::{Footnote, FootnoteKind, ParserConfig};

/// Append a text piece, inserting a space only where two words would fuse
pub(crate) fn append_piece(out: &mut String, piece: &str) {
    if piece.is_empty() {
        return;
    }
    let fuses = out.chars().last().is_some_and(|c| !c.is_whitespace())
        && piece.chars().next().is_some_and(|c| c.is_alphanumeric());
    if fuses {
        out.push(' ');
    }
    out.push_str(piece);
}

/// Build a footnote from a `note` node
///
/// `f`/`fe` notes take their reference from `fr` and their body from the
/// remaining character spans, and are classified from the body. `x` notes
/// take `xo` / `xt` and are always cross references. A caller of `+`, `-` or
/// nothing means the configured default marker.
pub(crate) fn footnote(note: &Node, config: &ParserConfig) -> Option<Footnote> {
    let cross = matches!(note.style(), "x" | "ex");
    let marker = note
        .attr("caller")
        .map(str::trim)
        .filter(|c| !c.is_empty() && *c != "+" && *c != "-")
        .map(str::to_string)
        .unwrap_or_else(|| {
            if cross {
                config.cross_reference_marker.clone()
            } else {
                config.footnote_marker.clone()
            }
        });

    let mut reference = String::new();
    let mut body = String::new();
    for item in &note.items {
        match item.kind() {
            NodeKind::Char if matches!(item.style(), "fr" | "xo") => {
                append_piece(&mut reference, &item.plain_text());
            }
            NodeKind::Char => append_piece(&mut body, &item.plain_text()),
            NodeKind::Text => append_piece(&mut body, item.text.as_deref().unwrap_or_default()),
            _ => {}
        }
    }

    let reference = normalize(&reference);
    let reference = (!reference.is_empty()).then_some(reference.as_str());
    if !cross {
        return make_footnote(&marker, reference, &body);
    }

    let content = normalize(&body);
    if content.is_empty() {
        return None;
    }
    let note = Footnote::new(marker, content, FootnoteKind::CrossReference);
    Some(match reference {
        Some(reference) => note.with_reference(reference),
        None => note,
    })
}

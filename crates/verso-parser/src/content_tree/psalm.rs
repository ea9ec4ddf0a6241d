//! Psalm metadata from the content tree

use super::node::{Node, NodeKind};
use crate::text::{is_selah, musical_notation, normalize};
use verso_core::PsalmMetadata;

/// Number of the last verse marker in the subtree, notes skipped
fn last_marker(node: &Node) -> Option<String> {
    match node.kind() {
        NodeKind::Verse => node.verse_number(),
        NodeKind::Note | NodeKind::Text => None,
        _ => node.items.iter().rev().find_map(last_marker),
    }
}

pub(crate) fn psalm_metadata(paragraphs: &[Node], number: u32) -> PsalmMetadata {
    let mut meta = PsalmMetadata::new(number);
    meta.has_selah = paragraphs.iter().any(|p| p.any_text(&is_selah));

    meta.superscription = paragraphs
        .iter()
        .find(|p| p.kind() == NodeKind::Para)
        .filter(|p| matches!(p.style(), "d" | "s1"))
        .map(|p| normalize(&p.plain_text()))
        .filter(|s| !s.is_empty());
    meta.musical_notation = meta.superscription.as_deref().and_then(musical_notation);

    let mut latest: Option<String> = None;
    for paragraph in paragraphs.iter().filter(|p| p.kind() == NodeKind::Para) {
        match paragraph.style() {
            "s2" | "s3" => {
                let heading = normalize(&paragraph.plain_text());
                match (&latest, heading.is_empty()) {
                    (Some(verse), false) => meta.push_section(verse.clone(), heading),
                    (None, false) => tracing::trace!(heading = %heading, "section heading precedes every verse"),
                    _ => {}
                }
            }
            _ => {
                if let Some(marker) = last_marker(paragraph) {
                    latest = Some(marker);
                }
            }
        }
    }
    meta
}

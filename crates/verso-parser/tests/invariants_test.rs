//! Properties every parser must uphold regardless of payload family

use proptest::prelude::*;
use std::collections::HashSet;
use verso_core::{Chapter, ParserError, Translation};
use verso_parser::content_tree::Node;
use verso_parser::test_utils::{
    content_tree_payload, parse_chapter, passage_payload, sample_content_tree,
    sample_psalm_passage, sample_verse_export, verse_block, verse_export_payload,
};
use verso_parser::text::{decompose_reference, strip_tags};

fn samples() -> Vec<(Translation, serde_json::Value)> {
    vec![
        (Translation::Esv, sample_psalm_passage()),
        (Translation::Nlt, sample_verse_export()),
        (Translation::Kjv, sample_content_tree()),
    ]
}

#[test]
fn test_parsing_is_idempotent() {
    for (translation, payload) in samples() {
        let first = parse_chapter(translation, &payload).unwrap();
        let second = parse_chapter(translation, &payload).unwrap();
        assert_eq!(first, second, "{} differs between runs", translation);
    }
}

#[test]
fn test_output_text_has_no_markup() {
    for (translation, payload) in samples() {
        let chapter = parse_chapter(translation, &payload).unwrap();
        for verse in &chapter.verses {
            assert!(
                !verse.text.contains(['<', '>']),
                "{} verse {}: {:?}",
                translation,
                verse.number,
                verse.text
            );
            assert!(!verse.text.contains("&nbsp;"));
        }
    }
}

#[test]
fn test_footnotes_are_never_empty() {
    let html = r##"<p><b class="chapter-num">1:1&nbsp;</b>In the beginning<sup class="footnote"><a class="fn" href="#f1" id="b1">1</a></sup> God<sup class="footnote"><a class="fn" href="#f2" id="b2">2</a></sup></p><div class="footnotes"><p><span class="footnote"><a href="#b1" id="f1">[1]</a></span> <span class="footnote-ref">1:1</span> </p><p><span class="footnote"><a href="#b2" id="f2">[2]</a></span> <span class="footnote-ref">1:1</span> Hebrew <em>Elohim</em></p></div>"##;
    let tree = content_tree_payload(
        "Genesis 1",
        vec![Node::para(
            "p",
            vec![
                Node::verse("1"),
                Node::text("In the beginning"),
                Node::note("f", Some("+"), vec![Node::char("fr", vec![Node::text("1:1")])]),
            ],
        )],
    );

    let mut chapters: Vec<Chapter> = samples()
        .into_iter()
        .map(|(t, p)| parse_chapter(t, &p).unwrap())
        .collect();
    chapters.push(parse_chapter(Translation::Esv, &passage_payload("Genesis 1", html)).unwrap());
    chapters.push(parse_chapter(Translation::Kjv, &tree).unwrap());

    for chapter in &chapters {
        for footnote in chapter.verses.iter().flat_map(|v| &v.footnotes) {
            assert!(!footnote.content.trim().is_empty(), "{}", chapter.reference);
        }
    }
    let genesis = &chapters[3];
    assert_eq!(genesis.verses[0].footnotes.len(), 1);
    assert!(chapters[4].verses[0].footnotes.is_empty());
}

#[test]
fn test_headings_attach_once() {
    let html = r#"<h3>The Creation</h3><p><b class="chapter-num">1:1&nbsp;</b>One.</p><p><b class="verse-num">2</b>Two.</p><p>Still two.</p><h3>The Creation</h3><p><b class="verse-num">3</b>Three.</p>"#;
    let tree = content_tree_payload(
        "Genesis 1",
        vec![
            Node::para("s1", vec![Node::text("The Creation")]),
            Node::para("p", vec![Node::verse("1"), Node::text("One.")]),
            Node::para("p", vec![Node::verse("2"), Node::text("Two.")]),
            Node::para("p", vec![Node::text("Still two.")]),
        ],
    );

    for (translation, payload) in [
        (Translation::Esv, passage_payload("Genesis 1", html)),
        (Translation::Kjv, tree),
    ] {
        let chapter = parse_chapter(translation, &payload).unwrap();
        let headings: Vec<&str> = chapter
            .verses
            .iter()
            .filter_map(|v| v.heading.as_deref())
            .collect();
        let distinct: HashSet<&str> = headings.iter().copied().collect();
        assert_eq!(headings.len(), distinct.len(), "{}: {:?}", translation, headings);
        assert_eq!(chapter.verses[0].heading.as_deref(), Some("The Creation"));
    }
}

#[test]
fn test_red_letter_follows_markers() {
    let html = r#"<p><b class="chapter-num">11:34&nbsp;</b>And he said, <span class="woc">"Where have you laid him?"</span></p><p><b class="verse-num">35</b>Jesus wept.</p>"#;
    let chapter = parse_chapter(Translation::Esv, &passage_payload("John 11", html)).unwrap();
    assert!(chapter.verses[0].is_red_letter);
    assert!(!chapter.verses[1].is_red_letter);

    let export = verse_export_payload(
        "John 11",
        &[
            verse_block("34", r#"<p><span class="vn">34</span>"<red>Where have you put him?</red>" he asked.</p>"#),
            verse_block("35", r#"<p><span class="vn">35</span>Then Jesus wept.</p>"#),
        ]
        .concat(),
    );
    let chapter = parse_chapter(Translation::Nlt, &export).unwrap();
    assert!(chapter.verses[0].is_red_letter);
    assert!(!chapter.verses[1].is_red_letter);

    let tree = content_tree_payload(
        "John 11",
        vec![Node::para(
            "p",
            vec![
                Node::verse("34"),
                Node::text("And said, "),
                Node::char("wj", vec![Node::text("Where have ye laid him?")]),
                Node::verse("35"),
                Node::text("Jesus wept."),
            ],
        )],
    );
    let chapter = parse_chapter(Translation::Kjv, &tree).unwrap();
    assert!(chapter.verses[0].is_red_letter);
    assert!(!chapter.verses[1].is_red_letter);
}

#[test]
fn test_reference_without_chapter_fails_everywhere() {
    for (translation, mut payload) in samples() {
        if let Some(canonical) = payload.get_mut("canonical") {
            *canonical = "Psalm".into();
        }
        if let Some(reference) = payload.get_mut("reference") {
            *reference = "Genesis".into();
        }
        if let Some(reference) = payload.pointer_mut("/passages/0/reference") {
            *reference = "John".into();
        }
        let err = parse_chapter(translation, &payload).unwrap_err();
        let err = err.downcast_ref::<verso_core::ChapterError>().unwrap();
        assert!(
            matches!(err.source, ParserError::InvalidReference(_)),
            "{}: {:?}",
            translation,
            err.source
        );
    }
}

proptest! {
    #[test]
    fn prop_reference_decomposes(
        prefix in prop::option::of(1u8..=3),
        name in "[A-Z][a-z]{2,12}( of [A-Z][a-z]{2,8})?",
        chapter in 1u32..=150,
    ) {
        let book = match prefix {
            Some(n) => format!("{} {}", n, name),
            None => name,
        };
        let (parsed_book, parsed_chapter) =
            decompose_reference(&format!("{} {}", book, chapter)).unwrap();
        prop_assert_eq!(parsed_book, book);
        prop_assert_eq!(parsed_chapter, chapter);
    }

    #[test]
    fn prop_reference_without_number_fails(name in "[A-Za-z ]{0,20}[A-Za-z]") {
        let is_invalid = matches!(
            decompose_reference(&name),
            Err(ParserError::InvalidReference(_))
        );
        prop_assert!(is_invalid);
    }

    #[test]
    fn prop_strip_tags_leaves_no_markup(input in r#"[a-z <>/&;#="'0-9]{0,64}"#) {
        let stripped = strip_tags(&input);
        prop_assert!(!stripped.contains('<'));
        prop_assert!(!stripped.contains('>'));
        for entity in ["&nbsp;", "&amp;", "&lt;", "&gt;", "&quot;", "&#39;", "&mdash;"] {
            prop_assert!(!stripped.contains(entity), "{:?} -> {:?}", input, stripped);
        }
    }

    #[test]
    fn prop_strip_tags_keeps_plain_text(input in "[A-Za-z0-9 ,.]{0,64}") {
        prop_assert_eq!(strip_tags(&input), input);
    }
}

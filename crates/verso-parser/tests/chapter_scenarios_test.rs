//! End-to-end chapter scenarios for each payload family
//!
//! Every test goes through the public registry, the same way callers do.

use serde_json::json;
use verso_core::{FootnoteKind, ParserError, Translation};
use verso_parser::content_tree::Node;
use verso_parser::test_utils::{
    content_tree_payload, parse_chapter, passage_payload, sample_psalm_passage,
    sample_verse_export, verse_block, verse_export_payload,
};
use verso_parser::ParserRegistry;

fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

#[test]
fn test_content_tree_heading_then_verse() {
    let payload = content_tree_payload(
        "Genesis 1",
        vec![
            Node::para("s1", vec![Node::text("The Creation")]),
            Node::para(
                "p",
                vec![
                    Node::verse("1"),
                    Node::text("In the beginning God created the heaven and the earth."),
                ],
            ),
        ],
    );

    let chapter = parse_chapter(Translation::Kjv, &payload).unwrap();

    assert_eq!(chapter.verses.len(), 1);
    let verse = &chapter.verses[0];
    assert_eq!(verse.number, "1");
    assert_eq!(verse.heading.as_deref(), Some("The Creation"));
    assert!(verse.is_first_verse);
    let json = serde_json::to_value(verse).unwrap();
    assert!(json.get("startsParagraph").is_none());
    assert_eq!(json["isFirstVerse"], json!(true));
}

#[test]
fn test_verse_export_chapter_number_block() {
    init_test_logging();
    let content = [
        verse_block("1", r#"<h2 class="chapter-number">3</h2>Hello"#),
        verse_block("2", "World"),
    ]
    .concat();

    let chapter = parse_chapter(Translation::Nlt, &verse_export_payload("John 3", &content)).unwrap();

    assert_eq!(chapter.verses.len(), 2);
    assert!(chapter.verses[0].is_first_verse);
    assert_eq!(chapter.verses[0].text, "Hello");
    assert!(!chapter.verses[1].is_first_verse);
    assert_eq!(chapter.verses[1].text, "World");
}

#[test]
fn test_verse_export_sample() {
    let chapter = parse_chapter(Translation::Nlt, &sample_verse_export()).unwrap();

    let first = &chapter.verses[0];
    assert_eq!(first.number, "16");
    assert_eq!(first.heading.as_deref(), Some("God's Love"));
    assert_eq!(first.heading_id.as_deref(), Some("heading-3-16"));
    assert!(first.is_red_letter);
    assert!(!first.text.contains("3:16"));
    assert_eq!(first.footnotes.len(), 1);
    assert_eq!(first.footnotes[0].reference.as_deref(), Some("3:16"));
    assert_eq!(first.footnotes[0].kind, FootnoteKind::Alternative);

    assert!(chapter.verses[1].is_red_letter);
    assert!(chapter.verses[1].heading.is_none());
}

#[test]
fn test_passage_legacy_nested_span() {
    init_test_logging();
    let html = r#"<div class="passage-text"><p><span class="text John-11-35"><span class="chapternum">11 </span>Jesus <span class="woj">wept</span> at the tomb.</span> <span class="text John-11-36"><sup class="versenum">36 </sup>So the Jews said, "See how he loved him!"</span></p></div>"#;

    let chapter = parse_chapter(Translation::Niv, &passage_payload("John 11", html)).unwrap();

    assert_eq!(chapter.verses.len(), 2);
    assert_eq!(chapter.verses[0].number, "1");
    assert_eq!(chapter.verses[0].text, "Jesus wept at the tomb.");
    assert_eq!(chapter.verses[1].number, "36");
    assert_eq!(chapter.verses[1].text, "So the Jews said, \"See how he loved him!\"");
}

#[test]
fn test_missing_container_for_every_family() {
    let registry = ParserRegistry::global();
    for translation in Translation::ALL {
        let err = registry
            .parse(translation, &json!({"reference": "Genesis", "canonical": "Genesis"}))
            .unwrap_err();
        assert!(
            matches!(err.source, ParserError::MissingPassage { .. }),
            "{} raised {:?}",
            translation,
            err.source
        );
    }
}

#[test]
fn test_psalm_selah_in_every_family() {
    init_test_logging();
    let passage = passage_payload(
        "Psalm 3",
        r#"<h4 class="psalm-title">A Psalm of David, when he fled from Absalom his son.</h4><p><b class="chapter-num">3:1&nbsp;</b>O LORD, how many are my foes!</p><p><b class="verse-num">2</b>many are saying of my soul, there is no salvation for him in God. Selah</p>"#,
    );
    let export = verse_export_payload(
        "Psalm 3",
        &[
            verse_block("1", r#"<p class="poet1"><span class="vn">1</span>O LORD, I have so many enemies;</p>"#),
            verse_block("2", r#"<p class="poet1"><span class="vn">2</span>So many are saying, "God will never rescue him!" <span class="selah">Interlude</span></p><p class="poet1">Selah</p>"#),
        ]
        .concat(),
    );
    let tree = content_tree_payload(
        "Psalms 3",
        vec![
            Node::para("d", vec![Node::text("A Psalm of David.")]),
            Node::para("q1", vec![Node::verse("1"), Node::text("LORD, how are they increased that trouble me!")]),
            Node::para("q1", vec![Node::verse("2"), Node::text("There is no help for him in God. Selah.")]),
        ],
    );

    for (translation, payload) in [
        (Translation::Esv, passage),
        (Translation::Nlt, export),
        (Translation::Kjv, tree),
    ] {
        let chapter = parse_chapter(translation, &payload).unwrap();
        let psalm = chapter.psalm.as_ref().expect("psalm metadata");
        assert!(psalm.has_selah, "{}", translation);
        assert_eq!(psalm.number, 3);
        let verse = chapter.verse("2").expect("verse 2");
        assert!(verse.is_selah, "{}", translation);
        assert!(!chapter.verse("1").unwrap().is_selah);
    }
}

#[test]
fn test_psalm_passage_sample() {
    let chapter = parse_chapter(Translation::Esv, &sample_psalm_passage()).unwrap();

    let psalm = chapter.psalm.as_ref().unwrap();
    assert_eq!(psalm.superscription.as_deref(), Some("A Psalm of David."));
    assert!(!psalm.has_selah);

    let first = &chapter.verses[0];
    assert_eq!(first.heading.as_deref(), Some("The LORD Is My Shepherd"));
    assert!(first.is_first_verse);

    let second = chapter.verse("2").unwrap();
    assert_eq!(second.lines.len(), 2);
    assert_eq!(second.footnotes.len(), 1);
    assert_eq!(second.footnotes[0].kind, FootnoteKind::Hebrew);
    assert!(second.stanza_break_after);

    let metadata = chapter.metadata.as_ref().unwrap();
    assert_eq!(metadata.copyright.as_deref(), Some("(ESV)"));
    assert_eq!(metadata.book_title.as_deref(), Some("Psalm"));
}

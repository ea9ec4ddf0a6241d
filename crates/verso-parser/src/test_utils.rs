//! Test utilities for parser-related tests.
//!
//! Payload builders for each upstream shape plus small, realistic sample
//! chapters. Enable with the `test-utils` feature.
//!
//! # Usage
//!
//! In `Cargo.toml`:
//! ```toml
//! [dev-dependencies]
//! verso-parser = { path = "../verso-parser", features = ["test-utils"] }
//! ```
//!
//! In tests:
//! ```rust,ignore
//! use verso_parser::test_utils::{parse_chapter, passage_payload};
//! use verso_core::Translation;
//!
//! #[test]
//! fn test_parsing() {
//!     let payload = passage_payload("John 11", r#"<p><b class="chapter-num">11:35&nbsp;</b>Jesus wept.</p>"#);
//!     let chapter = parse_chapter(Translation::Esv, &payload).unwrap();
//!     assert_eq!(chapter.verses.len(), 1);
//! }
//! ```

use crate::content_tree::Node;
use crate::registry::ParserRegistry;
use serde_json::{json, Value};
use verso_core::{Chapter, Translation};

/// Parse a payload through the global registry, boxing the error.
pub fn parse_chapter(
    translation: Translation,
    payload: &Value,
) -> Result<Chapter, Box<dyn std::error::Error>> {
    Ok(ParserRegistry::global().parse(translation, payload)?)
}

/// `{ canonical, passages: [html] }`
pub fn passage_payload(canonical: &str, html: &str) -> Value {
    json!({ "canonical": canonical, "passages": [html] })
}

/// `{ passages: [{ reference, content }] }`
pub fn verse_export_payload(reference: &str, content: &str) -> Value {
    json!({ "passages": [{ "reference": reference, "content": content }] })
}

/// `{ reference, content: [...] }`
pub fn content_tree_payload(reference: &str, content: Vec<Node>) -> Value {
    json!({ "reference": reference, "content": content })
}

/// One `verse_export` block
pub fn verse_block(vn: &str, body: &str) -> String {
    format!(r#"<verse_export orig="" bk="" ch="" vn="{}">{}</verse_export>"#, vn, body)
}

/// Psalm 23 in the paragraph/line dialect, with a footnote section
pub fn sample_psalm_passage() -> Value {
    passage_payload(
        "Psalm 23",
        r##"<h2 class="extra_text">Psalm 23</h2>
<h3 id="p19023001_01-1">The LORD Is My Shepherd</h3>
<h4 class="psalm-title">A Psalm of David.</h4>
<p class="block-indent"><span class="begin-line-group"></span>
<span class="line"><b class="chapter-num">23:1&nbsp;</b>&nbsp;&nbsp;The <span class="divine-name">Lord</span> is my shepherd; I shall not want.</span><br />
<span class="line"><b class="verse-num">2&nbsp;</b>&nbsp;&nbsp;He makes me lie down in green pastures.</span><br />
<span class="indent line">He leads me beside still waters.<sup class="footnote"><a class="fn" href="#f1-1" id="b1-1">1</a></sup></span><br />
<span class="end-line-group"></span>
<span class="begin-line-group"></span>
<span class="line"><b class="verse-num">3&nbsp;</b>&nbsp;&nbsp;He restores my soul.</span><br />
<span class="indent line">He leads me in paths of righteousness for his name&#39;s sake.</span><br />
<span class="end-line-group"></span></p>
<p>(<a href="http://www.esv.org" class="copyright">ESV</a>)</p>
<div class="footnotes extra_text"><h3>Footnotes</h3>
<p><span class="footnote"><a href="#b1-1" id="f1-1">[1]</a></span> <span class="footnote-ref">23:2</span> Hebrew <em>beside waters of rest</em></p>
</div>"##,
    )
}

/// John 3 in the block dialect, with a heading, red letter and a note
pub fn sample_verse_export() -> Value {
    let content = [
        verse_block(
            "16",
            r#"<h3 class="subhead">God's Love</h3><p class="body"><span class="vn">16</span><red>"For this is how God loved the world<a class="a-tn">*</a><span class="tn"><span class="tn-ref">3:16</span> Or <i>For God loved the world so much</i></span>: He gave his one and only Son."</red></p>"#,
        ),
        verse_block(
            "17",
            r#"<p class="body"><span class="vn">17</span><red>God sent his Son into the world not to judge the world, but to save the world through him.</red></p>"#,
        ),
    ]
    .concat();
    verse_export_payload("John 3", &content)
}

/// Genesis 1 in the content tree dialect
pub fn sample_content_tree() -> Value {
    content_tree_payload(
        "Genesis 1",
        vec![
            Node::para("s1", vec![Node::text("The Creation")]),
            Node::para(
                "p",
                vec![
                    Node::verse("1"),
                    Node::text("In the beginning God created the heaven and the earth. "),
                    Node::verse("2"),
                    Node::text("And the earth was without form, and void;"),
                    Node::note(
                        "f",
                        Some("+"),
                        vec![
                            Node::char("fr", vec![Node::text("1:2 ")]),
                            Node::char("ft", vec![Node::text("Hebrew tohu wabohu")]),
                        ],
                    ),
                ],
            ),
            Node::para(
                "p",
                vec![
                    Node::verse("3"),
                    Node::text("And God said, Let there be light: and there was light."),
                ],
            ),
        ],
    )
}

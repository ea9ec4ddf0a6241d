//! Benchmark: chapter parsing per payload family

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use serde_json::Value;
use std::hint::black_box;
use verso_core::Translation;
use verso_parser::content_tree::Node;
use verso_parser::test_utils::{
    content_tree_payload, passage_payload, sample_content_tree, sample_psalm_passage,
    sample_verse_export, verse_block, verse_export_payload,
};
use verso_parser::ParserRegistry;

const VERSES: usize = 150;

/// A long prose chapter in the paragraph-marker dialect
fn long_passage() -> Value {
    let mut html = String::from(r#"<h3>A Long Chapter</h3><p><b class="chapter-num">1:1&nbsp;</b>In the beginning was the Word.</p>"#);
    for n in 2..=VERSES {
        html.push_str(&format!(
            r#"<p><b class="verse-num">{n}</b>And the Word was with God, <span class="woc">and the Word was God</span>, verse {n}.</p>"#
        ));
    }
    passage_payload("John 1", &html)
}

fn long_verse_export() -> Value {
    let content: String = (1..=VERSES)
        .map(|n| {
            verse_block(
                &n.to_string(),
                &format!(r#"<p class="body"><span class="vn">{n}</span>He went up to the mountain, verse {n}.</p>"#),
            )
        })
        .collect();
    verse_export_payload("Matthew 5", &content)
}

fn long_content_tree() -> Value {
    let paragraphs = (1..=VERSES)
        .map(|n| {
            Node::para(
                "p",
                vec![
                    Node::verse(&n.to_string()),
                    Node::text("And God said, Let there be light: and there was light. "),
                    Node::char("wj", vec![Node::text("Follow me.")]),
                ],
            )
        })
        .collect();
    content_tree_payload("Genesis 1", paragraphs)
}

fn benchmark_families(c: &mut Criterion) {
    let registry = ParserRegistry::global();
    let cases = [
        ("passage/psalm", Translation::Esv, sample_psalm_passage()),
        ("passage/long", Translation::Esv, long_passage()),
        ("verse_export/sample", Translation::Nlt, sample_verse_export()),
        ("verse_export/long", Translation::Nlt, long_verse_export()),
        ("content_tree/sample", Translation::Kjv, sample_content_tree()),
        ("content_tree/long", Translation::Kjv, long_content_tree()),
    ];

    let mut group = c.benchmark_group("parse_chapter");
    for (name, translation, payload) in &cases {
        group.throughput(Throughput::Bytes(payload.to_string().len() as u64));
        group.bench_with_input(BenchmarkId::new("parse", name), payload, |b, payload| {
            b.iter(|| registry.parse(*translation, black_box(payload)))
        });
    }
    group.finish();
}

criterion_group!(benches, benchmark_families);
criterion_main!(benches);

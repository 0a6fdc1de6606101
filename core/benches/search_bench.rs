use criterion::{criterion_group, criterion_main, Criterion};
use sift_core::builder::index_text;
use sift_core::query::query_terms;
use sift_core::tokenizer::tokenize;
use sift_core::InvertedIndex;

const WORDS: &[&str] = &[
    "river", "stone", "garden", "market", "harbor", "lantern", "meadow", "signal", "thunder", "orchard",
    "copper", "willow", "canyon", "ember", "glacier", "harvest", "island", "journey", "kettle", "ladder",
];

fn corpus(docs: usize, words: usize) -> Vec<(String, String)> {
    (0..docs)
        .map(|d| {
            let text = (0..words).map(|w| WORDS[(d * 7 + w * 13) % WORDS.len()]).collect::<Vec<_>>().join(" ");
            (format!("doc{d}.txt"), text)
        })
        .collect()
}

fn bench_tokenize(c: &mut Criterion) {
    let text = corpus(1, 2_000).remove(0).1;
    c.bench_function("tokenize_2k_words", |b| b.iter(|| tokenize(&text)));
}

fn bench_search(c: &mut Criterion) {
    let mut index = InvertedIndex::new();
    for (path, text) in corpus(500, 200) {
        index_text(&text, &path, &mut index);
    }
    let exact = query_terms("river garden thunder");
    let partial = query_terms("ha ca");
    c.bench_function("exact_search_3_terms", |b| b.iter(|| index.exact_search(&exact)));
    c.bench_function("partial_search_2_prefixes", |b| b.iter(|| index.partial_search(&partial)));
}

criterion_group!(benches, bench_tokenize, bench_search);
criterion_main!(benches);

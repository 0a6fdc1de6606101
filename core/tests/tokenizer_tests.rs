use sift_core::tokenizer::{normalize, parse, tokenize};

#[test]
fn it_normalizes_and_stems() {
    let words = tokenize("Running Runners RUN! The café's menu.");
    // Stemming to "run" should appear
    assert!(words.contains(&"run".to_string()));
    // Diacritics are dropped: café -> cafe
    assert!(words.contains(&"cafe".to_string()));
}

#[test]
fn it_keeps_every_word_for_positions() {
    let words = tokenize("The quick brown fox and the lazy dog");
    assert_eq!(words.len(), 8);
    assert_eq!(words.iter().filter(|w| *w == "the").count(), 2);
}

#[test]
fn it_splits_on_any_whitespace() {
    assert_eq!(parse("alpha\tbeta\u{00A0}gamma\n"), vec!["alpha", "beta", "gamma"]);
    assert_eq!(normalize("cats"), "cat");
}

use lazy_static::lazy_static;
use regex::Regex;
use rust_stemmers::{Algorithm, Stemmer};
use unicode_normalization::UnicodeNormalization;

lazy_static! {
    static ref NON_LETTER: Regex = Regex::new(r"(?u)[^\p{L}\s]+").expect("valid regex");
    static ref STEMMER: Stemmer = Stemmer::create(Algorithm::English);
}

/// Split text into cleaned, lowercased words. Diacritics are decomposed and dropped
/// along with every other non-letter character.
pub fn parse(text: &str) -> Vec<String> {
    let decomposed = text.nfd().collect::<String>().to_lowercase();
    NON_LETTER
        .replace_all(&decomposed, "")
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// Stem one cleaned word. An empty result means the token should be discarded.
pub fn normalize(token: &str) -> String {
    STEMMER.stem(token).into_owned()
}

/// Parse and stem a line of text into index terms, in stream order.
pub fn tokenize(text: &str) -> Vec<String> {
    parse(text)
        .iter()
        .map(|word| normalize(word))
        .filter(|term| !term.is_empty())
        .collect()
}

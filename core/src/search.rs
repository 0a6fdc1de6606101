use serde::Serialize;
use std::cmp::Ordering;
use std::collections::BTreeSet;

/// One document matching a query, scored by matches over document length.
#[derive(Debug, Clone, Serialize)]
pub struct SearchResult {
    #[serde(rename = "where")]
    path: String,
    #[serde(skip)]
    word_count: usize,
    count: usize,
    score: f64,
}

impl SearchResult {
    pub fn new(path: impl Into<String>, word_count: usize, count: usize) -> Self {
        Self { path: path.into(), word_count, count, score: ratio(count, word_count) }
    }

    /// Fold the matches of another query term into this result.
    pub fn aggregate(&mut self, count: usize) {
        self.count += count;
        self.score = ratio(self.count, self.word_count);
    }

    pub fn path(&self) -> &str { &self.path }
    pub fn word_count(&self) -> usize { self.word_count }
    pub fn count(&self) -> usize { self.count }
    pub fn score(&self) -> f64 { self.score }
}

fn ratio(count: usize, word_count: usize) -> f64 {
    if word_count == 0 { 0.0 } else { count as f64 / word_count as f64 }
}

impl Ord for SearchResult {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .score
            .total_cmp(&self.score)
            .then_with(|| other.count.cmp(&self.count))
            .then_with(|| self.path.to_lowercase().cmp(&other.path.to_lowercase()))
            .then_with(|| self.path.cmp(&other.path))
    }
}

impl PartialOrd for SearchResult {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> { Some(self.cmp(other)) }
}

impl PartialEq for SearchResult {
    fn eq(&self, other: &Self) -> bool { self.cmp(other) == Ordering::Equal }
}

impl Eq for SearchResult {}

/// Anything that can answer a canonical term set with a ranked result list.
pub trait Searchable: Send + Sync {
    fn search(&self, terms: &BTreeSet<String>, exact: bool) -> Vec<SearchResult>;
}

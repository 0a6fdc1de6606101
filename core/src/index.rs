use crate::error::IndexError;
use crate::json;
use crate::search::{SearchResult, Searchable};
use anyhow::Result;
use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::ops::Bound;
use std::path::Path;

pub type Position = usize;
pub type Postings = BTreeMap<String, BTreeSet<Position>>;

/// Term -> document path -> word positions, plus the per-document word count.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct InvertedIndex {
    index: BTreeMap<String, Postings>,
    counts: BTreeMap<String, usize>,
}

impl InvertedIndex {
    pub fn new() -> Self { Self::default() }

    /// Record `term` at `position` in `path`. Returns true if the position was new,
    /// in which case the document's word count grows by one.
    pub fn add(&mut self, term: &str, path: &str, position: Position) -> bool {
        let inserted = self
            .index
            .entry(term.to_string())
            .or_default()
            .entry(path.to_string())
            .or_default()
            .insert(position);
        if inserted {
            *self.counts.entry(path.to_string()).or_insert(0) += 1;
        }
        inserted
    }

    /// Absorb a fully built index. Every document must come from exactly one producer:
    /// a document already known here must carry the same word count in `other`.
    /// Conflicts are detected before anything is modified.
    pub fn merge(&mut self, other: InvertedIndex) -> Result<(), IndexError> {
        for (path, &incoming) in &other.counts {
            if let Some(&existing) = self.counts.get(path) {
                if existing != incoming {
                    return Err(IndexError::DocumentConflict { path: path.clone(), existing, incoming });
                }
            }
        }

        for (term, postings) in other.index {
            match self.index.entry(term) {
                Entry::Vacant(slot) => {
                    slot.insert(postings);
                }
                Entry::Occupied(mut slot) => {
                    let target = slot.get_mut();
                    for (path, positions) in postings {
                        target.entry(path).or_default().extend(positions);
                    }
                }
            }
        }
        for (path, count) in other.counts {
            self.counts.entry(path).or_insert(count);
        }
        Ok(())
    }

    pub fn search(&self, terms: &BTreeSet<String>, exact: bool) -> Vec<SearchResult> {
        if exact { self.exact_search(terms) } else { self.partial_search(terms) }
    }

    pub fn exact_search(&self, terms: &BTreeSet<String>) -> Vec<SearchResult> {
        let mut hits = Hits::default();
        for term in terms {
            if let Some(postings) = self.index.get(term) {
                hits.collect(postings, &self.counts);
            }
        }
        hits.ranked()
    }

    /// Matches every indexed term that starts with a query term. Only the contiguous
    /// run of keys sharing the prefix is visited.
    pub fn partial_search(&self, terms: &BTreeSet<String>) -> Vec<SearchResult> {
        let mut hits = Hits::default();
        for term in terms {
            let run = self
                .index
                .range::<str, _>((Bound::Included(term.as_str()), Bound::Unbounded))
                .take_while(|(word, _)| word.starts_with(term.as_str()));
            for (_, postings) in run {
                hits.collect(postings, &self.counts);
            }
        }
        hits.ranked()
    }

    pub fn contains_word(&self, term: &str) -> bool { self.index.contains_key(term) }

    pub fn contains_path(&self, term: &str, path: &str) -> bool {
        self.index.get(term).is_some_and(|postings| postings.contains_key(path))
    }

    pub fn contains_position(&self, term: &str, path: &str, position: Position) -> bool {
        self.positions(term, path).is_some_and(|positions| positions.contains(&position))
    }

    pub fn words(&self) -> impl Iterator<Item = &str> + '_ { self.index.keys().map(String::as_str) }

    pub fn paths(&self, term: &str) -> Option<impl Iterator<Item = &str> + '_> {
        self.index.get(term).map(|postings| postings.keys().map(String::as_str))
    }

    pub fn positions(&self, term: &str, path: &str) -> Option<&BTreeSet<Position>> {
        self.index.get(term)?.get(path)
    }

    pub fn counts(&self) -> &BTreeMap<String, usize> { &self.counts }

    /// Total words recorded for a document; 0 for unknown documents.
    pub fn word_count(&self, path: &str) -> usize { self.counts.get(path).copied().unwrap_or(0) }

    pub fn is_empty(&self) -> bool { self.index.is_empty() }

    /// Number of distinct terms.
    pub fn len(&self) -> usize { self.index.len() }

    pub fn to_index_json(&self) -> Result<String> { json::to_pretty_string(&self.index) }

    pub fn to_counts_json(&self) -> Result<String> { json::to_pretty_string(&self.counts) }

    pub fn write_index_json(&self, path: &Path) -> Result<()> { json::write_pretty(&self.index, path) }

    pub fn write_counts_json(&self, path: &Path) -> Result<()> { json::write_pretty(&self.counts, path) }
}

impl Searchable for InvertedIndex {
    fn search(&self, terms: &BTreeSet<String>, exact: bool) -> Vec<SearchResult> {
        InvertedIndex::search(self, terms, exact)
    }
}

/// Per-query accumulator: one result per document, in first-seen order until ranked.
#[derive(Default)]
struct Hits {
    by_path: HashMap<String, usize>,
    results: Vec<SearchResult>,
}

impl Hits {
    fn collect(&mut self, postings: &Postings, counts: &BTreeMap<String, usize>) {
        for (path, positions) in postings {
            match self.by_path.get(path) {
                Some(&slot) => self.results[slot].aggregate(positions.len()),
                None => {
                    let word_count = counts.get(path).copied().unwrap_or(0);
                    self.by_path.insert(path.clone(), self.results.len());
                    self.results.push(SearchResult::new(path.clone(), word_count, positions.len()));
                }
            }
        }
    }

    fn ranked(mut self) -> Vec<SearchResult> {
        self.results.sort();
        self.results
    }
}

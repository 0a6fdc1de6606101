use crate::error::IndexError;
use crate::index::{InvertedIndex, Position};
use crate::search::{SearchResult, Searchable};
use anyhow::Result;
use parking_lot::{RwLock, RwLockReadGuard};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

/// An [`InvertedIndex`] behind a reader/writer lock. Mutations take the write lock,
/// reads and searches share the read lock. Every operation holds its guard for one
/// scope only.
#[derive(Debug, Default)]
pub struct SharedIndex {
    inner: RwLock<InvertedIndex>,
}

impl SharedIndex {
    pub fn new() -> Self { Self::default() }

    pub fn add(&self, term: &str, path: &str, position: Position) -> bool {
        self.inner.write().add(term, path, position)
    }

    /// Merge a locally built index. Callers build `other` without holding any lock, so
    /// the write lock covers only the merge itself.
    pub fn merge(&self, other: InvertedIndex) -> Result<(), IndexError> {
        self.inner.write().merge(other)
    }

    pub fn search(&self, terms: &BTreeSet<String>, exact: bool) -> Vec<SearchResult> {
        let index = self.inner.read();
        if exact { index.exact_search(terms) } else { index.partial_search(terms) }
    }

    pub fn exact_search(&self, terms: &BTreeSet<String>) -> Vec<SearchResult> {
        self.inner.read().exact_search(terms)
    }

    pub fn partial_search(&self, terms: &BTreeSet<String>) -> Vec<SearchResult> {
        self.inner.read().partial_search(terms)
    }

    /// Scoped read access to the whole index, e.g. to walk several views consistently.
    pub fn read(&self) -> RwLockReadGuard<'_, InvertedIndex> { self.inner.read() }

    pub fn contains_word(&self, term: &str) -> bool { self.inner.read().contains_word(term) }

    pub fn contains_path(&self, term: &str, path: &str) -> bool { self.inner.read().contains_path(term, path) }

    pub fn contains_position(&self, term: &str, path: &str, position: Position) -> bool {
        self.inner.read().contains_position(term, path, position)
    }

    pub fn words(&self) -> Vec<String> { self.inner.read().words().map(str::to_string).collect() }

    pub fn paths(&self, term: &str) -> Option<Vec<String>> {
        self.inner.read().paths(term).map(|paths| paths.map(str::to_string).collect())
    }

    pub fn positions(&self, term: &str, path: &str) -> Option<BTreeSet<Position>> {
        self.inner.read().positions(term, path).cloned()
    }

    pub fn counts(&self) -> BTreeMap<String, usize> { self.inner.read().counts().clone() }

    pub fn word_count(&self, path: &str) -> usize { self.inner.read().word_count(path) }

    pub fn is_empty(&self) -> bool { self.inner.read().is_empty() }

    pub fn len(&self) -> usize { self.inner.read().len() }

    pub fn write_index_json(&self, path: &Path) -> Result<()> { self.inner.read().write_index_json(path) }

    pub fn write_counts_json(&self, path: &Path) -> Result<()> { self.inner.read().write_counts_json(path) }

    pub fn into_inner(self) -> InvertedIndex { self.inner.into_inner() }
}

impl Searchable for SharedIndex {
    fn search(&self, terms: &BTreeSet<String>, exact: bool) -> Vec<SearchResult> {
        SharedIndex::search(self, terms, exact)
    }
}

impl From<InvertedIndex> for SharedIndex {
    fn from(index: InvertedIndex) -> Self { Self { inner: RwLock::new(index) } }
}

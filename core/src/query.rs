use crate::json;
use crate::scheduler::WorkQueue;
use crate::search::{SearchResult, Searchable};
use crate::tokenizer::tokenize;
use anyhow::{Context, Result};
use parking_lot::Mutex;
use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, BTreeSet};
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;
use std::sync::Arc;

pub type QueryResults = BTreeMap<String, Vec<SearchResult>>;

/// The sorted, duplicate-free term set of one query line.
pub fn query_terms(line: &str) -> BTreeSet<String> { tokenize(line).into_iter().collect() }

pub fn canonical_key(terms: &BTreeSet<String>) -> String {
    terms.iter().map(String::as_str).collect::<Vec<_>>().join(" ")
}

/// Hand each line of `reader` to `handle`. A line that is not valid UTF-8 is logged and
/// skipped; any other read error ends the loop and is returned. Returns the number of
/// lines handled.
fn read_lines(reader: &mut dyn BufRead, mut handle: impl FnMut(String)) -> Result<usize> {
    let mut handled = 0;
    for (number, line) in reader.lines().enumerate() {
        match line {
            Ok(line) => {
                handle(line);
                handled += 1;
            }
            Err(err) if err.kind() == io::ErrorKind::InvalidData => {
                tracing::warn!(line = number + 1, error = %err, "skipping undecodable query line");
            }
            Err(err) => return Err(err).with_context(|| format!("reading query line {}", number + 1)),
        }
    }
    Ok(handled)
}

/// Reads a query source line by line and keeps one ranked result list per distinct query.
pub trait QueryEngine {
    fn parse_line(&mut self, line: &str, exact: bool);

    /// Run every line of `reader`. Blocks until all of them are answered.
    fn parse_lines(&mut self, reader: &mut dyn BufRead, exact: bool) -> Result<()>;

    fn results(&self) -> QueryResults;

    fn parse_file(&mut self, path: &Path, exact: bool) -> Result<()> {
        let f = File::open(path).with_context(|| format!("opening query file {}", path.display()))?;
        self.parse_lines(&mut BufReader::new(f), exact)
    }

    fn write_results(&self, path: &Path) -> Result<()> { json::write_pretty(&self.results(), path) }
}

/// Answers queries inline on the calling thread.
pub struct QueryParser<'a, I: Searchable> {
    index: &'a I,
    results: QueryResults,
}

impl<'a, I: Searchable> QueryParser<'a, I> {
    pub fn new(index: &'a I) -> Self { Self { index, results: QueryResults::new() } }
}

impl<I: Searchable> QueryEngine for QueryParser<'_, I> {
    fn parse_line(&mut self, line: &str, exact: bool) {
        let terms = query_terms(line);
        if terms.is_empty() {
            return;
        }
        if let Entry::Vacant(slot) = self.results.entry(canonical_key(&terms)) {
            slot.insert(self.index.search(&terms, exact));
        }
    }

    fn parse_lines(&mut self, reader: &mut dyn BufRead, exact: bool) -> Result<()> {
        let lines = read_lines(reader, |line| self.parse_line(&line, exact))?;
        tracing::info!(lines, queries = self.results.len(), "queries answered");
        Ok(())
    }

    fn results(&self) -> QueryResults { self.results.clone() }
}

/// Answers each query line as its own task on a [`WorkQueue`]. The first task to claim a
/// canonical query reserves its slot under the lock; later duplicates skip it.
pub struct ConcurrentQueryParser<I: Searchable + 'static> {
    index: Arc<I>,
    queue: Arc<WorkQueue>,
    results: Arc<Mutex<QueryResults>>,
}

impl<I: Searchable + 'static> ConcurrentQueryParser<I> {
    pub fn new(index: Arc<I>, queue: Arc<WorkQueue>) -> Self {
        Self { index, queue, results: Arc::new(Mutex::new(QueryResults::new())) }
    }

    fn submit_line(&self, line: String, exact: bool) {
        let index = Arc::clone(&self.index);
        let results = Arc::clone(&self.results);
        self.queue.submit(move || {
            answer(index.as_ref(), &results, &line, exact);
            Ok(())
        });
    }
}

fn answer<I: Searchable>(index: &I, results: &Mutex<QueryResults>, line: &str, exact: bool) {
    let terms = query_terms(line);
    if terms.is_empty() {
        return;
    }
    let key = canonical_key(&terms);
    {
        let mut results = results.lock();
        match results.entry(key.clone()) {
            Entry::Occupied(_) => return,
            Entry::Vacant(slot) => {
                slot.insert(Vec::new());
            }
        }
    }
    let ranked = index.search(&terms, exact);
    results.lock().insert(key, ranked);
}

impl<I: Searchable + 'static> QueryEngine for ConcurrentQueryParser<I> {
    fn parse_line(&mut self, line: &str, exact: bool) {
        self.submit_line(line.to_string(), exact);
        self.queue.finish();
    }

    /// Tasks already submitted are always waited for, even when reading stops early.
    fn parse_lines(&mut self, reader: &mut dyn BufRead, exact: bool) -> Result<()> {
        let read = read_lines(reader, |line| self.submit_line(line, exact));
        self.queue.finish();
        let lines = read?;
        tracing::info!(lines, queries = self.results.lock().len(), "queries answered");
        Ok(())
    }

    fn results(&self) -> QueryResults { self.results.lock().clone() }
}

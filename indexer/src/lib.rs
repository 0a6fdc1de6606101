//! The `sift` driver: build an index from files or a crawl, write it out, answer a query
//! file and write the ranked results.
//!
//! Stages run in order (build, index/locations output, queries, results output). A stage
//! that fails is logged and recorded in the [`RunReport`], and the rest still run.

pub mod config;

pub use config::{Args, ConfigError, Mode, RunConfig, Source, DEFAULT_LIMIT};

use anyhow::{anyhow, Context, Result};
use sift_core::builder::{build, build_concurrent};
use sift_core::{ConcurrentQueryParser, InvertedIndex, QueryEngine, QueryParser, SharedIndex, WorkQueue};
use sift_crawler::{FetchConfig, HttpFetcher, PageSource, WebCrawler};
use std::sync::Arc;
use std::time::{Duration, Instant};

#[derive(Debug, Default)]
pub struct RunReport {
    /// `stage: error` for every stage that failed.
    pub failures: Vec<String>,
    pub elapsed: Duration,
}

impl RunReport {
    fn stage(&mut self, name: &str, result: Result<()>) {
        if let Err(err) = result {
            tracing::error!(stage = name, error = %format!("{err:#}"), "stage failed");
            self.failures.push(format!("{name}: {err:#}"));
        }
    }

    pub fn is_ok(&self) -> bool { self.failures.is_empty() }
}

/// Run every configured stage, fetching crawled pages over HTTP.
pub fn run(config: &RunConfig) -> RunReport {
    run_with_source(config, || {
        let fetcher: Arc<dyn PageSource> = Arc::new(HttpFetcher::new(&FetchConfig::default())?);
        Ok(fetcher)
    })
}

/// Same as [`run`], with pages for `--url` served by whatever `connect` returns. It is
/// called only when a crawl is configured.
pub fn run_with_source<F>(config: &RunConfig, connect: F) -> RunReport
where
    F: FnOnce() -> Result<Arc<dyn PageSource>>,
{
    let started = Instant::now();
    let mut report = RunReport::default();
    match config.mode {
        Mode::Sequential => run_sequential(config, &mut report),
        Mode::Concurrent { threads } => run_concurrent(config, threads, connect, &mut report),
    }
    report.elapsed = started.elapsed();
    report
}

fn run_sequential(config: &RunConfig, report: &mut RunReport) {
    let mut index = InvertedIndex::new();
    let built = match &config.source {
        Ok(Source::Path(root)) => build(root, &mut index).map(drop),
        Ok(Source::Crawl { .. }) => Err(anyhow!("crawling requires multithreaded mode")),
        Err(err) => Err(anyhow!("{err}")),
    };
    report.stage("build", built.context("building index"));
    write_outputs(config, &index, report);

    let mut parser = QueryParser::new(&index);
    answer_queries(config, &mut parser, report);
}

fn run_concurrent<F>(config: &RunConfig, threads: usize, connect: F, report: &mut RunReport)
where
    F: FnOnce() -> Result<Arc<dyn PageSource>>,
{
    let queue = Arc::new(WorkQueue::new(threads));
    let index = Arc::new(SharedIndex::new());
    let built = match &config.source {
        Ok(Source::Path(root)) => build_concurrent(root, &index, &queue).map(drop),
        Ok(Source::Crawl { seed, limit }) => connect().map(|source| {
            WebCrawler::new(Arc::clone(&queue), Arc::clone(&index), source, *limit).crawl(seed.clone());
        }),
        Err(err) => Err(anyhow!("{err}")),
    };
    report.stage("build", built.context("building index"));
    write_outputs(config, &index.read(), report);

    let mut parser = ConcurrentQueryParser::new(Arc::clone(&index), Arc::clone(&queue));
    answer_queries(config, &mut parser, report);
    queue.shutdown();
}

fn write_outputs(config: &RunConfig, index: &InvertedIndex, report: &mut RunReport) {
    if let Some(out) = &config.index_out {
        report.stage("index output", index.write_index_json(out));
    }
    if let Some(out) = &config.locations_out {
        report.stage("locations output", index.write_counts_json(out));
    }
}

fn answer_queries(config: &RunConfig, parser: &mut dyn QueryEngine, report: &mut RunReport) {
    if let Some(query) = &config.query {
        report.stage("queries", parser.parse_file(query, config.exact));
    }
    if let Some(out) = &config.results_out {
        report.stage("results output", parser.write_results(out));
    }
}

/// Seconds with six fractional digits, as printed at the end of a run.
pub fn format_elapsed(elapsed: Duration) -> String { format!("Elapsed: {:.6} seconds", elapsed.as_secs_f64()) }

use clap::Parser;
use sift_core::WorkQueue;
use std::path::PathBuf;
use thiserror::Error;
use url::Url;

pub const DEFAULT_LIMIT: usize = 50;

#[derive(Debug, Parser, Default)]
#[command(name = "sift")]
#[command(about = "Build an inverted index from text files or a web crawl and answer queries against it", long_about = None)]
pub struct Args {
    /// Directory (or single file) of .txt/.text documents to index
    #[arg(long, conflicts_with = "url")]
    pub path: Option<PathBuf>,
    /// Seed URL to crawl; implies multithreaded mode
    #[arg(long)]
    pub url: Option<String>,
    /// Maximum number of distinct URLs to crawl
    #[arg(long)]
    pub limit: Option<String>,
    /// Enable multithreaded mode with this many workers
    #[arg(long, num_args = 0..=1, default_missing_value = "")]
    pub threads: Option<String>,
    /// Write the inverted index as JSON
    #[arg(long, num_args = 0..=1, default_missing_value = "index.json")]
    pub index: Option<PathBuf>,
    /// Write per-document word counts as JSON
    #[arg(long, alias = "counts", num_args = 0..=1, default_missing_value = "locations.json")]
    pub locations: Option<PathBuf>,
    /// File with one query per line
    #[arg(long)]
    pub query: Option<PathBuf>,
    /// Match query terms exactly instead of by prefix
    #[arg(long, default_value_t = false)]
    pub exact: bool,
    /// Write query results as JSON
    #[arg(long, num_args = 0..=1, default_missing_value = "results.json")]
    pub results: Option<PathBuf>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no input given; pass --path or --url")]
    MissingSource,
    #[error("invalid seed url {url:?}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("invalid crawl limit {0:?}")]
    InvalidLimit(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Sequential,
    Concurrent { threads: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Path(PathBuf),
    Crawl { seed: Url, limit: usize },
}

/// Validated run settings. A bad source is kept as its error so the other stages can
/// still run.
#[derive(Debug)]
pub struct RunConfig {
    pub source: Result<Source, ConfigError>,
    pub mode: Mode,
    pub index_out: Option<PathBuf>,
    pub locations_out: Option<PathBuf>,
    pub query: Option<PathBuf>,
    pub exact: bool,
    pub results_out: Option<PathBuf>,
}

impl RunConfig {
    pub fn from_args(args: Args) -> Self {
        let mode = match (&args.threads, &args.url) {
            (Some(raw), _) => Mode::Concurrent { threads: parse_threads(raw) },
            (None, Some(_)) => Mode::Concurrent { threads: WorkQueue::DEFAULT_THREADS },
            (None, None) => Mode::Sequential,
        };
        let source = resolve_source(args.path, args.url, args.limit.as_deref());
        Self {
            source,
            mode,
            index_out: args.index,
            locations_out: args.locations,
            query: args.query,
            exact: args.exact,
            results_out: args.results,
        }
    }
}

fn parse_threads(raw: &str) -> usize {
    match raw.trim().parse::<usize>() {
        Ok(n) if n >= 1 => n,
        _ => {
            if !raw.is_empty() {
                tracing::warn!(threads = raw, default = WorkQueue::DEFAULT_THREADS, "invalid thread count, using default");
            }
            WorkQueue::DEFAULT_THREADS
        }
    }
}

fn resolve_source(path: Option<PathBuf>, url: Option<String>, limit: Option<&str>) -> Result<Source, ConfigError> {
    if let Some(raw) = url {
        let seed = Url::parse(raw.trim()).map_err(|source| ConfigError::InvalidUrl { url: raw.clone(), source })?;
        let limit = match limit {
            None => DEFAULT_LIMIT,
            Some(l) => l.trim().parse::<usize>().map_err(|_| ConfigError::InvalidLimit(l.to_string()))?,
        };
        return Ok(Source::Crawl { seed, limit });
    }
    path.map(Source::Path).ok_or(ConfigError::MissingSource)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(argv: &[&str]) -> RunConfig {
        let mut full = vec!["sift"];
        full.extend_from_slice(argv);
        RunConfig::from_args(Args::try_parse_from(full).unwrap())
    }

    #[test]
    fn path_without_threads_is_sequential() {
        let cfg = config(&["--path", "docs", "--index", "--query", "q.txt"]);
        assert_eq!(cfg.mode, Mode::Sequential);
        assert!(matches!(cfg.source, Ok(Source::Path(ref p)) if p == &PathBuf::from("docs")));
        assert_eq!(cfg.index_out, Some(PathBuf::from("index.json")));
        assert_eq!(cfg.locations_out, None);
        assert_eq!(cfg.results_out, None);
        assert!(!cfg.exact);
    }

    #[test]
    fn output_flags_take_optional_file_names() {
        let cfg = config(&["--path", "d", "--locations", "--results", "out/r.json", "--index", "i.json"]);
        assert_eq!(cfg.locations_out, Some(PathBuf::from("locations.json")));
        assert_eq!(cfg.results_out, Some(PathBuf::from("out/r.json")));
        assert_eq!(cfg.index_out, Some(PathBuf::from("i.json")));
    }

    #[test]
    fn counts_is_an_alias_for_locations() {
        let cfg = config(&["--path", "d", "--counts", "wc.json"]);
        assert_eq!(cfg.locations_out, Some(PathBuf::from("wc.json")));
    }

    #[test]
    fn thread_counts_fall_back_to_default() {
        assert_eq!(config(&["--path", "d", "--threads", "3"]).mode, Mode::Concurrent { threads: 3 });
        for bad in [&["--threads"][..], &["--threads", "0"], &["--threads", "many"]] {
            let mut argv = vec!["--path", "d"];
            argv.extend_from_slice(bad);
            assert_eq!(config(&argv).mode, Mode::Concurrent { threads: WorkQueue::DEFAULT_THREADS }, "{bad:?}");
        }
    }

    #[test]
    fn url_implies_concurrent_crawl() {
        let cfg = config(&["--url", "https://example.com/start", "--limit", "12"]);
        assert_eq!(cfg.mode, Mode::Concurrent { threads: WorkQueue::DEFAULT_THREADS });
        match cfg.source {
            Ok(Source::Crawl { seed, limit }) => {
                assert_eq!(seed.as_str(), "https://example.com/start");
                assert_eq!(limit, 12);
            }
            other => panic!("unexpected source {other:?}"),
        }
        let cfg = config(&["--url", "https://example.com/", "--threads", "2"]);
        assert_eq!(cfg.mode, Mode::Concurrent { threads: 2 });
        assert!(matches!(cfg.source, Ok(Source::Crawl { limit: DEFAULT_LIMIT, .. })));
    }

    #[test]
    fn bad_sources_are_reported() {
        assert!(matches!(config(&["--index"]).source, Err(ConfigError::MissingSource)));
        assert!(matches!(config(&["--url", "not a url"]).source, Err(ConfigError::InvalidUrl { .. })));
        assert!(matches!(
            config(&["--url", "https://example.com/", "--limit", "lots"]).source,
            Err(ConfigError::InvalidLimit(ref l)) if l == "lots"
        ));
    }

    #[test]
    fn path_and_url_conflict() {
        assert!(Args::try_parse_from(["sift", "--path", "d", "--url", "https://example.com/"]).is_err());
    }
}

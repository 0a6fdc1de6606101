//! Bounded breadth-first web crawl feeding a [`SharedIndex`].
//!
//! Each URL is one task on the shared [`WorkQueue`]. A task fetches its page, admits
//! new links into the frontier and queues them, then indexes the page text privately
//! and merges it.

pub mod fetch;
pub mod frontier;
pub mod html;

pub use fetch::{FetchConfig, HttpFetcher, PageSource};
pub use frontier::Frontier;

use anyhow::{Context, Result};
use sift_core::builder::index_text;
use sift_core::{InvertedIndex, SharedIndex, Spawner, WorkQueue};
use std::sync::Arc;
use url::Url;

pub struct WebCrawler {
    queue: Arc<WorkQueue>,
    index: Arc<SharedIndex>,
    source: Arc<dyn PageSource>,
    limit: usize,
}

struct CrawlContext {
    spawner: Spawner,
    index: Arc<SharedIndex>,
    source: Arc<dyn PageSource>,
    frontier: Frontier,
}

impl WebCrawler {
    /// `limit` caps the number of distinct URLs discovered, seed included. The seed is
    /// always crawled.
    pub fn new(queue: Arc<WorkQueue>, index: Arc<SharedIndex>, source: Arc<dyn PageSource>, limit: usize) -> Self {
        Self { queue, index, source, limit: limit.max(1) }
    }

    /// Crawl from `seed` and block until every admitted page is processed. Returns every
    /// admitted URL, sorted.
    pub fn crawl(&self, seed: Url) -> Vec<Url> {
        let ctx = Arc::new(CrawlContext {
            spawner: self.queue.spawner(),
            index: Arc::clone(&self.index),
            source: Arc::clone(&self.source),
            frontier: Frontier::new(self.limit),
        });
        if ctx.frontier.admit(&seed) {
            submit(&ctx, seed);
        }
        self.queue.finish();

        let urls = ctx.frontier.urls();
        tracing::info!(pages = urls.len(), limit = self.limit, terms = self.index.len(), "crawl complete");
        urls
    }
}

fn submit(ctx: &Arc<CrawlContext>, url: Url) {
    let task_ctx = Arc::clone(ctx);
    ctx.spawner.submit(move || crawl_page(&task_ctx, url));
}

fn crawl_page(ctx: &Arc<CrawlContext>, url: Url) -> Result<()> {
    tracing::info!(url = %url, "processing");
    let html = match ctx.source.fetch_html(&url).with_context(|| format!("fetching {url}"))? {
        Some(html) => html,
        None => {
            tracing::debug!(url = %url, "no html content");
            return Ok(());
        }
    };

    if !ctx.frontier.is_full() {
        for link in ctx.frontier.admit_all(html::list_links(&url, &html)) {
            submit(ctx, link);
        }
    }

    let mut local = InvertedIndex::new();
    index_text(&html::strip_tags(&html), url.as_str(), &mut local);
    ctx.index.merge(local).with_context(|| format!("merging {url}"))?;
    Ok(())
}

use anyhow::{bail, Result};
use parking_lot::Mutex;
use sift_core::{SharedIndex, WorkQueue};
use sift_crawler::{PageSource, WebCrawler};
use std::collections::HashMap;
use std::sync::Arc;
use url::Url;

/// Serves pages from memory and counts how often each URL is fetched.
#[derive(Default)]
struct FakeWeb {
    pages: HashMap<String, String>,
    broken: Vec<String>,
    fetches: Mutex<HashMap<String, usize>>,
}

impl FakeWeb {
    fn page(mut self, url: &str, body: &str, links: &[&str]) -> Self {
        let anchors: String = links.iter().map(|l| format!("<a href=\"{l}\">link</a>")).collect();
        self.pages.insert(url.to_string(), format!("<html><body><p>{body}</p>{anchors}</body></html>"));
        self
    }

    fn broken(mut self, url: &str) -> Self {
        self.broken.push(url.to_string());
        self
    }

    fn fetch_counts(&self) -> HashMap<String, usize> { self.fetches.lock().clone() }
}

impl PageSource for FakeWeb {
    fn fetch_html(&self, url: &Url) -> Result<Option<String>> {
        *self.fetches.lock().entry(url.to_string()).or_insert(0) += 1;
        if self.broken.contains(&url.to_string()) {
            bail!("connection reset");
        }
        Ok(self.pages.get(url.as_str()).cloned())
    }
}

fn crawl(web: Arc<FakeWeb>, seed: &str, limit: usize, threads: usize) -> (Arc<SharedIndex>, Vec<Url>) {
    let index = Arc::new(SharedIndex::new());
    let queue = Arc::new(WorkQueue::new(threads));
    let crawler = WebCrawler::new(queue, Arc::clone(&index), web, limit);
    let urls = crawler.crawl(Url::parse(seed).unwrap());
    (index, urls)
}

/// Seed links to 10 hubs, each hub links to 10 leaves plus back to the seed and its siblings.
fn wide_web() -> FakeWeb {
    let mut web = FakeWeb::default();
    let hubs: Vec<String> = (0..10).map(|h| format!("http://w.example/h{h}")).collect();
    let hub_refs: Vec<&str> = hubs.iter().map(String::as_str).collect();
    web = web.page("http://w.example/", "seed page", &hub_refs);
    for h in 0..10 {
        let mut links: Vec<String> = (0..10).map(|l| format!("http://w.example/h{h}/l{l}")).collect();
        links.push("http://w.example/".to_string());
        links.extend(hubs.iter().cloned());
        let refs: Vec<&str> = links.iter().map(String::as_str).collect();
        web = web.page(&hubs[h], &format!("hub number {h}"), &refs);
        for l in 0..10 {
            web = web.page(&format!("http://w.example/h{h}/l{l}"), "leaf text", &["http://w.example/"]);
        }
    }
    web
}

#[test]
fn indexes_linked_pages_keyed_by_url() {
    let web = Arc::new(
        FakeWeb::default()
            .page("http://site.example/", "welcome to the garden", &["/flowers", "trees#top", "http://site.example/"])
            .page("http://site.example/flowers", "roses and tulips in the garden", &["/"])
            .page("http://site.example/trees", "oak trees", &[]),
    );
    let (index, urls) = crawl(Arc::clone(&web), "http://site.example/", 50, 4);

    assert_eq!(urls.len(), 3);
    assert_eq!(index.word_count("http://site.example/"), 7);
    assert_eq!(index.word_count("http://site.example/flowers"), 7);
    assert!(index.contains_path("garden", "http://site.example/flowers"));
    assert!(index.contains_position("oak", "http://site.example/trees", 1));
    // anchor text is page text too
    assert!(index.contains_word("link"));
    assert!(web.fetch_counts().values().all(|&n| n == 1));
}

#[test]
fn crawl_never_exceeds_limit_or_revisits() {
    for (limit, threads) in [(1, 1), (7, 4), (25, 8), (500, 8)] {
        let web = Arc::new(wide_web());
        let (index, urls) = crawl(Arc::clone(&web), "http://w.example/", limit, threads);

        let expected = limit.min(111);
        assert_eq!(urls.len(), expected, "limit={limit}");
        let fetches = web.fetch_counts();
        assert_eq!(fetches.len(), expected, "limit={limit}");
        assert!(fetches.values().all(|&n| n == 1), "limit={limit}: {fetches:?}");
        assert_eq!(index.counts().len(), expected);
    }
}

#[test]
fn missing_and_failing_pages_are_skipped() {
    let web = Arc::new(
        FakeWeb::default()
            .page("http://x.example/", "root", &["/gone", "/broken", "/ok"])
            .page("http://x.example/ok", "fine page", &[])
            .broken("http://x.example/broken"),
    );
    let (index, urls) = crawl(Arc::clone(&web), "http://x.example/", 10, 2);

    assert_eq!(urls.len(), 4);
    let counts = index.counts();
    assert_eq!(counts.keys().collect::<Vec<_>>(), vec!["http://x.example/", "http://x.example/ok"]);
    assert_eq!(web.fetch_counts()["http://x.example/broken"], 1);
}

#[test]
fn unreachable_seed_leaves_index_empty() {
    let web = Arc::new(FakeWeb::default());
    let (index, urls) = crawl(web, "http://nowhere.example/", 10, 2);
    assert_eq!(urls.len(), 1);
    assert!(index.is_empty());
}

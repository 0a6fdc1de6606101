use parking_lot::Mutex;
use std::collections::HashSet;
use url::Url;

/// Every URL the crawl has discovered, capped at `limit`. Admission checks membership,
/// checks the cap and inserts under one lock, so no URL is admitted twice and the cap
/// is never exceeded.
#[derive(Debug)]
pub struct Frontier {
    seen: Mutex<HashSet<Url>>,
    limit: usize,
}

impl Frontier {
    pub fn new(limit: usize) -> Self { Self { seen: Mutex::new(HashSet::new()), limit } }

    pub fn admit(&self, url: &Url) -> bool {
        let mut seen = self.seen.lock();
        seen.len() < self.limit && seen.insert(url.clone())
    }

    /// Admit links in order until the cap is reached; returns the newly admitted ones.
    pub fn admit_all(&self, links: impl IntoIterator<Item = Url>) -> Vec<Url> {
        let mut seen = self.seen.lock();
        let mut admitted = Vec::new();
        for link in links {
            if seen.len() >= self.limit {
                break;
            }
            if seen.insert(link.clone()) {
                admitted.push(link);
            }
        }
        admitted
    }

    pub fn is_full(&self) -> bool { self.seen.lock().len() >= self.limit }

    pub fn len(&self) -> usize { self.seen.lock().len() }

    pub fn is_empty(&self) -> bool { self.seen.lock().is_empty() }

    pub fn limit(&self) -> usize { self.limit }

    pub fn urls(&self) -> Vec<Url> {
        let mut urls: Vec<Url> = self.seen.lock().iter().cloned().collect();
        urls.sort();
        urls
    }
}

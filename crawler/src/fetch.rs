use anyhow::Result;
use reqwest::blocking::Client;
use reqwest::{header, redirect};
use std::time::Duration;
use url::Url;

/// Where crawl tasks get their pages from.
pub trait PageSource: Send + Sync {
    /// The page's HTML, or `None` when the resource is missing, not HTML, or
    /// reachable only through too many redirects.
    fn fetch_html(&self, url: &Url) -> Result<Option<String>>;
}

#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub max_redirects: usize,
    pub timeout: Duration,
    pub max_bytes: usize,
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            max_redirects: 3,
            timeout: Duration::from_secs(12),
            max_bytes: 2 * 1024 * 1024,
            user_agent: "sift-bot/0.1".to_string(),
        }
    }
}

/// Blocking HTTP fetcher; safe to call from worker threads.
pub struct HttpFetcher {
    client: Client,
    max_bytes: usize,
}

impl HttpFetcher {
    pub fn new(config: &FetchConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .redirect(redirect::Policy::limited(config.max_redirects))
            .timeout(config.timeout)
            .build()?;
        Ok(Self { client, max_bytes: config.max_bytes })
    }
}

impl PageSource for HttpFetcher {
    fn fetch_html(&self, url: &Url) -> Result<Option<String>> {
        let resp = match self.client.get(url.clone()).send() {
            Ok(resp) => resp,
            Err(err) if err.is_redirect() => {
                tracing::debug!(url = %url, "too many redirects");
                return Ok(None);
            }
            Err(err) => return Err(err.into()),
        };
        if !resp.status().is_success() {
            return Ok(None);
        }
        let is_html = resp
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.trim_start().to_ascii_lowercase().starts_with("text/html"));
        if !is_html {
            return Ok(None);
        }
        let bytes = resp.bytes()?;
        if bytes.len() > self.max_bytes {
            tracing::debug!(url = %url, bytes = bytes.len(), "page too large");
            return Ok(None);
        }
        Ok(Some(String::from_utf8_lossy(&bytes).into_owned()))
    }
}

// src/fetch/mod.rs

//! Rate-limited page fetcher.
//!
//! Consults the on-disk cache before the network. The rate limiter is timed
//! off the last *actual* network request, so interleaved cache hits never
//! shrink the spacing the API sees.

pub mod cache;

use std::time::{Duration, Instant};

use reqwest::StatusCode;
use url::Url;

use crate::config::FetchConfig;
use crate::error::{AppError, Result};
use crate::models::RawPage;

pub use cache::PageCache;

/// Fetches one page of raw posts per call, cache first.
pub struct PageFetcher {
    client: reqwest::Client,
    cache: PageCache,
    posts_url: Url,
    api_key: String,
    blog: String,
    page_size: u64,
    interval: Duration,
    last_request: Option<Instant>,
}

impl PageFetcher {
    /// Create a fetcher for one blog.
    ///
    /// `cache` should point at an already-bootstrapped directory; it is
    /// created lazily on the first write either way.
    pub fn new(
        client: reqwest::Client,
        config: &FetchConfig,
        blog: &str,
        api_key: String,
        cache: PageCache,
    ) -> Result<Self> {
        let base = Url::parse(&config.api_base)?;
        let posts_url = base.join(&format!("/v2/blog/{blog}.tumblr.com/posts/"))?;

        Ok(Self {
            client,
            cache,
            posts_url,
            api_key,
            blog: blog.to_string(),
            page_size: config.page_size,
            interval: Duration::from_secs(config.rate_limit_secs),
            last_request: None,
        })
    }

    /// Get the raw page at `offset`.
    ///
    /// Cache hits return immediately with no network call and no delay.
    /// Cache misses wait out the rate limit, issue the request, and persist
    /// the response body verbatim before returning.
    pub async fn get(&mut self, offset: u64) -> Result<RawPage> {
        if let Some(body) = self.cache.load(offset).await? {
            log::debug!("cache hit for offset {offset}");
            return self.parse(offset, &body);
        }

        self.wait_for_slot().await;
        self.last_request = Some(Instant::now());

        let response = self
            .client
            .get(self.posts_url.clone())
            .query(&[
                ("api_key", self.api_key.clone()),
                ("offset", offset.to_string()),
                ("limit", self.page_size.to_string()),
            ])
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(AppError::BlogNotFound(self.blog.clone()));
        }

        let body = response.text().await?;
        let page = self.parse(offset, &body)?;

        self.cache.save(offset, &body).await?;
        Ok(page)
    }

    /// Block until the configured interval has passed since the last
    /// network request. Cache hits neither wait here nor reset the timer.
    async fn wait_for_slot(&self) {
        if let Some(last) = self.last_request {
            let elapsed = last.elapsed();
            if elapsed < self.interval {
                let wait = self.interval - elapsed;
                log::debug!("rate limit: waiting {}ms", wait.as_millis());
                tokio::time::sleep(wait).await;
            }
        }
    }

    /// Parse a response body, logging the contents on page-level failure.
    fn parse(&self, offset: u64, body: &str) -> Result<RawPage> {
        RawPage::parse(body).map_err(|e| {
            log::error!("malformed response at offset {offset}: {e}");
            log::error!("page contents: {body}");
            AppError::MalformedResponse { offset }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const BLOG: &str = "testblog";

    fn test_config(server_uri: &str, rate_limit_secs: u64) -> FetchConfig {
        FetchConfig {
            api_base: server_uri.to_string(),
            rate_limit_secs,
            ..FetchConfig::default()
        }
    }

    fn fetcher(server_uri: &str, cache_dir: &std::path::Path, rate_limit_secs: u64) -> PageFetcher {
        let config = test_config(server_uri, rate_limit_secs);
        PageFetcher::new(
            reqwest::Client::new(),
            &config,
            BLOG,
            "k".to_string(),
            PageCache::new(cache_dir),
        )
        .unwrap()
    }

    fn posts_body(ids: &[u64]) -> String {
        let posts: Vec<String> = ids
            .iter()
            .map(|id| format!(r#"{{"type": "text", "id": {id}, "date": "d", "title": "t", "body": "b"}}"#))
            .collect();
        format!(r#"{{"response": {{"posts": [{}]}}}}"#, posts.join(","))
    }

    #[tokio::test]
    async fn fetch_miss_hits_network_and_fills_cache() {
        let server = MockServer::start().await;
        let tmp = TempDir::new().unwrap();

        Mock::given(method("GET"))
            .and(path(format!("/v2/blog/{BLOG}.tumblr.com/posts/")))
            .and(query_param("offset", "0"))
            .and(query_param("api_key", "k"))
            .respond_with(ResponseTemplate::new(200).set_body_string(posts_body(&[1, 2])))
            .expect(1)
            .mount(&server)
            .await;

        let mut fetcher = fetcher(&server.uri(), tmp.path(), 0);
        let page = fetcher.get(0).await.unwrap();
        assert_eq!(page.len(), 2);
        assert!(tmp.path().join("0.json").exists());
    }

    #[tokio::test]
    async fn second_get_is_served_from_cache() {
        let server = MockServer::start().await;
        let tmp = TempDir::new().unwrap();

        Mock::given(method("GET"))
            .and(path(format!("/v2/blog/{BLOG}.tumblr.com/posts/")))
            .respond_with(ResponseTemplate::new(200).set_body_string(posts_body(&[7])))
            .expect(1) // the cached second call must not reach the server
            .mount(&server)
            .await;

        let mut fetcher = fetcher(&server.uri(), tmp.path(), 0);
        let first = fetcher.get(40).await.unwrap();
        let second = fetcher.get(40).await.unwrap();
        assert_eq!(first.posts[0].id, second.posts[0].id);
    }

    #[tokio::test]
    async fn pre_seeded_cache_skips_network_entirely() {
        let tmp = TempDir::new().unwrap();
        let cache = PageCache::new(tmp.path());
        cache.save(0, &posts_body(&[3])).await.unwrap();

        // Unroutable base URL: any network attempt would fail.
        let config = test_config("http://127.0.0.1:1", 0);
        let mut fetcher = PageFetcher::new(
            reqwest::Client::new(),
            &config,
            BLOG,
            "k".to_string(),
            cache,
        )
        .unwrap();

        let page = fetcher.get(0).await.unwrap();
        assert_eq!(page.posts[0].id, 3);
    }

    #[tokio::test]
    async fn remote_404_is_blog_not_found() {
        let server = MockServer::start().await;
        let tmp = TempDir::new().unwrap();

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let mut fetcher = fetcher(&server.uri(), tmp.path(), 0);
        match fetcher.get(0).await {
            Err(AppError::BlogNotFound(blog)) => assert_eq!(blog, BLOG),
            other => panic!("expected BlogNotFound, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn unexpected_shape_is_malformed_and_not_cached() {
        let server = MockServer::start().await;
        let tmp = TempDir::new().unwrap();

        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200).set_body_string(r#"{"meta": {"status": 200}}"#),
            )
            .mount(&server)
            .await;

        let mut fetcher = fetcher(&server.uri(), tmp.path(), 0);
        match fetcher.get(0).await {
            Err(AppError::MalformedResponse { offset }) => assert_eq!(offset, 0),
            other => panic!("expected MalformedResponse, got {other:?}"),
        }
        assert!(!tmp.path().join("0.json").exists());
    }

    #[tokio::test]
    async fn consecutive_misses_respect_the_interval() {
        let server = MockServer::start().await;
        let tmp = TempDir::new().unwrap();

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string(posts_body(&[1])))
            .mount(&server)
            .await;

        let mut fetcher = fetcher(&server.uri(), tmp.path(), 1);
        let start = Instant::now();
        fetcher.get(0).await.unwrap();
        fetcher.get(20).await.unwrap();
        // Two misses: elapsed >= (2 - 1) * interval
        assert!(start.elapsed() >= Duration::from_secs(1));
    }

    #[tokio::test]
    async fn cache_hits_do_not_wait() {
        let server = MockServer::start().await;
        let tmp = TempDir::new().unwrap();

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string(posts_body(&[1])))
            .mount(&server)
            .await;

        let mut fetcher = fetcher(&server.uri(), tmp.path(), 5);
        fetcher.get(0).await.unwrap();

        // Hitting the cache right after a network request must not block
        // on the 5s interval.
        let start = Instant::now();
        fetcher.get(0).await.unwrap();
        assert!(start.elapsed() < Duration::from_secs(1));
    }
}

use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use serde::Deserialize;

pub mod cve;
pub mod import;
pub mod normalize;

pub const DEFAULT_ENDPOINT: &str = "https://services.nvd.nist.gov/rest/json/cves/2.0";

pub const DEFAULT_PAGE_SIZE: u32 = 2000;
/// One request every 7 seconds stays under the public limit of 5 requests per
/// rolling 30 seconds, with margin.
pub const DEFAULT_REQUEST_INTERVAL: Duration = Duration::from_secs(7);

/// One page of the paginated feed. The first page's `results_per_page` and
/// `total_results` are authoritative for the whole walk.
#[derive(Debug, Default, Deserialize)]
pub struct FeedPage {
    #[serde(rename = "resultsPerPage")]
    pub results_per_page: u32,
    #[serde(rename = "totalResults")]
    pub total_results: u32,
    #[serde(default)]
    pub vulnerabilities: Vec<Vulnerability>,
}

/// Feed entries wrap each record under a nested `cve` key.
#[derive(Debug, Default, Deserialize)]
pub struct Vulnerability {
    pub cve: cve::CVE,
}

#[derive(thiserror::Error, Debug)]
pub enum FetchError {
    #[error("feed returned status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Seam between the pager and the wire. The blocking reqwest client is the
/// production implementation.
pub trait PageFetcher {
    fn fetch_page(&self, results_per_page: u32, start_index: u32) -> Result<FeedPage, FetchError>;
}

pub struct FeedClient {
    http: reqwest::blocking::Client,
    endpoint: String,
}

impl FeedClient {
    pub fn new(endpoint: impl Into<String>) -> Result<Self, FetchError> {
        let http = reqwest::blocking::Client::builder()
            .timeout(Some(Duration::from_secs(300)))
            .build()?;
        Ok(Self {
            http,
            endpoint: endpoint.into(),
        })
    }
}

impl PageFetcher for FeedClient {
    fn fetch_page(&self, results_per_page: u32, start_index: u32) -> Result<FeedPage, FetchError> {
        let response = self
            .http
            .get(&self.endpoint)
            .query(&[
                ("resultsPerPage", results_per_page),
                ("startIndex", start_index),
            ])
            .send()?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(FetchError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.json()?)
    }
}

/// Walks the feed page by page. The first successful response fixes the page
/// size and total result count used for every later iteration; each fetch
/// past the first waits out the remainder of `min_interval`, measured from
/// the start of the previous fetch.
pub struct FeedPager<'a, F> {
    fetcher: &'a F,
    page_size: u32,
    min_interval: Duration,
    page: u32,
    total_pages: Option<u32>,
    last_fetch_started: Option<Instant>,
}

impl<'a, F: PageFetcher> FeedPager<'a, F> {
    pub fn new(fetcher: &'a F, page_size_hint: u32, min_interval: Duration) -> Self {
        Self {
            fetcher,
            page_size: page_size_hint,
            min_interval,
            page: 0,
            total_pages: None,
            last_fetch_started: None,
        }
    }

    /// Known after the first successful fetch.
    pub fn total_pages(&self) -> Option<u32> {
        self.total_pages
    }

    pub fn pages_fetched(&self) -> u32 {
        self.page
    }

    pub fn next_page(&mut self) -> Result<Option<FeedPage>> {
        if let Some(total) = self.total_pages {
            if self.page >= total {
                return Ok(None);
            }
        }

        if let Some(started) = self.last_fetch_started {
            let wait = self.min_interval.saturating_sub(started.elapsed());
            if !wait.is_zero() {
                thread::sleep(wait);
            }
        }

        let page_index = self.page;
        self.last_fetch_started = Some(Instant::now());
        let page = self
            .fetcher
            .fetch_page(self.page_size, page_index * self.page_size)
            .with_context(|| format!("failed fetching feed page {page_index}"))?;

        if self.total_pages.is_none() {
            // the returned page size is authoritative, the requested one only
            // a hint
            if page.results_per_page > 0 {
                self.page_size = page.results_per_page;
            }
            self.total_pages = Some(page.total_results.div_ceil(self.page_size.max(1)));
        }

        self.page += 1;
        Ok(Some(page))
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;

    struct StubFetcher {
        results_per_page: u32,
        total_results: u32,
        /// (results_per_page, start_index) per issued fetch
        calls: RefCell<Vec<(u32, u32)>>,
    }

    impl StubFetcher {
        fn new(results_per_page: u32, total_results: u32) -> Self {
            Self {
                results_per_page,
                total_results,
                calls: RefCell::new(Vec::new()),
            }
        }
    }

    impl PageFetcher for StubFetcher {
        fn fetch_page(
            &self,
            results_per_page: u32,
            start_index: u32,
        ) -> Result<FeedPage, FetchError> {
            self.calls.borrow_mut().push((results_per_page, start_index));
            Ok(FeedPage {
                results_per_page: self.results_per_page,
                total_results: self.total_results,
                vulnerabilities: Vec::new(),
            })
        }
    }

    struct FailingFetcher;

    impl PageFetcher for FailingFetcher {
        fn fetch_page(&self, _: u32, _: u32) -> Result<FeedPage, FetchError> {
            Err(FetchError::Status {
                status: 503,
                body: "Request forbidden by administrative rules".into(),
            })
        }
    }

    #[test]
    fn test_feed_page_deserialization() {
        let body = r#"{
            "resultsPerPage": 2,
            "startIndex": 0,
            "totalResults": 4500,
            "format": "NVD_CVE",
            "version": "2.0",
            "timestamp": "2024-05-01T00:00:00.000",
            "vulnerabilities": [
                {"cve": {"id": "CVE-1999-0001"}},
                {"cve": {"id": "CVE-1999-0002"}}
            ]
        }"#;

        let page: FeedPage = serde_json::from_str(body).unwrap();
        assert_eq!(page.results_per_page, 2);
        assert_eq!(page.total_results, 4500);
        assert_eq!(
            page.vulnerabilities
                .iter()
                .map(|v| v.cve.id.as_str())
                .collect::<Vec<_>>(),
            vec!["CVE-1999-0001", "CVE-1999-0002"]
        );
    }

    #[test]
    fn test_pager_terminates_after_computed_page_count() {
        let fetcher = StubFetcher::new(2000, 4500);
        let mut pager = FeedPager::new(&fetcher, 2000, Duration::ZERO);

        let mut pages = 0;
        while pager.next_page().unwrap().is_some() {
            pages += 1;
        }

        // ceil(4500 / 2000) = 3
        assert_eq!(pages, 3);
        assert_eq!(pager.total_pages(), Some(3));
        assert_eq!(
            *fetcher.calls.borrow(),
            vec![(2000, 0), (2000, 2000), (2000, 4000)]
        );
    }

    #[test]
    fn test_pager_adopts_upstream_page_size() {
        // requested 2000, upstream answers with 1000 per page
        let fetcher = StubFetcher::new(1000, 2500);
        let mut pager = FeedPager::new(&fetcher, 2000, Duration::ZERO);

        while pager.next_page().unwrap().is_some() {}

        assert_eq!(pager.total_pages(), Some(3));
        assert_eq!(
            *fetcher.calls.borrow(),
            vec![(2000, 0), (1000, 1000), (1000, 2000)]
        );
    }

    #[test]
    fn test_pager_empty_feed() {
        let fetcher = StubFetcher::new(0, 0);
        let mut pager = FeedPager::new(&fetcher, 2000, Duration::ZERO);

        let first = pager.next_page().unwrap();
        assert!(first.is_some());
        assert!(first.unwrap().vulnerabilities.is_empty());
        assert!(pager.next_page().unwrap().is_none());
        assert_eq!(fetcher.calls.borrow().len(), 1);
    }

    #[test]
    fn test_pager_surfaces_page_and_status_on_failure() {
        let fetcher = FailingFetcher;
        let mut pager = FeedPager::new(&fetcher, 2000, Duration::ZERO);

        let err = pager.next_page().unwrap_err();
        assert!(err.to_string().contains("page 0"));
        assert!(err.root_cause().to_string().contains("503"));
    }

    #[test]
    fn test_pager_paces_requests() {
        let fetcher = StubFetcher::new(10, 30);
        let interval = Duration::from_millis(40);
        let mut pager = FeedPager::new(&fetcher, 10, interval);

        let started = Instant::now();
        while pager.next_page().unwrap().is_some() {}

        // 3 fetches, 2 enforced gaps
        assert_eq!(fetcher.calls.borrow().len(), 3);
        assert!(started.elapsed() >= interval * 2);
    }
}

use std::time::Duration;

use anyhow::Result;

use super::{normalize, FeedPager, PageFetcher, DEFAULT_PAGE_SIZE, DEFAULT_REQUEST_INTERVAL};
use crate::db::{self, PostgresRepository};

#[derive(Debug, Clone)]
pub struct SyncOptions {
    /// Requested page size; the feed's returned page size is authoritative.
    pub page_size: u32,
    /// Minimum time between the starts of two consecutive fetches.
    pub request_interval: Duration,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            request_interval: DEFAULT_REQUEST_INTERVAL,
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SyncReport {
    pub pages: u32,
    pub records: u64,
    pub skipped_metrics: u64,
}

/// Runs one full synchronization pass: walk every feed page, flatten each
/// record into the five row-sets and upsert them, parent table first. There
/// is no resume checkpoint; any failure aborts the run and a restart begins
/// at page zero, which is safe because every write is a keyed upsert.
pub fn run<F: PageFetcher>(
    repository: &PostgresRepository,
    fetcher: &F,
    options: &SyncOptions,
) -> Result<SyncReport> {
    // the single connection for the whole run; dropped (and thereby released)
    // on every exit path, error or not
    let mut conn = repository.connection()?;

    log::info!("connected to database, syncing records ...");

    let mut pager = FeedPager::new(fetcher, options.page_size, options.request_interval);
    let mut report = SyncReport::default();

    while let Some(page) = pager.next_page()? {
        log::info!(
            "processing page {} of {} ({} records) ...",
            pager.pages_fetched(),
            pager.total_pages().unwrap_or_default(),
            page.vulnerabilities.len()
        );

        let mut rows = normalize::PageRows::default();
        for item in &page.vulnerabilities {
            normalize::extract_record(&item.cve, &mut rows);
        }

        report.records += page.vulnerabilities.len() as u64;
        report.skipped_metrics += u64::from(rows.skipped_metrics);

        // parent batch first; the child tables reference cves(id)
        db::upsert_cves(&mut conn, &rows.cves)?;
        db::upsert_descriptions(&mut conn, &rows.descriptions)?;
        db::upsert_impacts(&mut conn, &rows.impacts)?;
        db::upsert_cpe_matches(&mut conn, &rows.cpe_matches)?;
        db::upsert_references(&mut conn, &rows.references)?;

        report.pages += 1;
    }

    Ok(report)
}

//! Crawl driver
//!
//! One crawl run is: fetch the contest page, parse it against the current
//! year in the calendar's time zone, and replace the stored event set. A
//! failure at any step leaves the stored set untouched.

pub mod fetcher;

use async_trait::async_trait;
use chrono::{DateTime, Datelike, FixedOffset, Utc};
use std::sync::Arc;

use crate::models::CrawlReport;
use crate::parser::scan_events;
use crate::storage::SharedEventRepository;
use crate::utils::error::{CrawlerError, FetchError};

pub use fetcher::ContestFetcher;

/// Anything that can supply the contest page HTML
#[async_trait]
pub trait PageSource: Send + Sync {
    async fn fetch_page(&self) -> Result<String, FetchError>;
}

#[async_trait]
impl PageSource for ContestFetcher {
    async fn fetch_page(&self) -> Result<String, FetchError> {
        self.fetch().await
    }
}

/// Page source backed by an in-memory document (saved pages, tests)
#[derive(Debug, Clone)]
pub struct StaticPage {
    html: String,
}

impl StaticPage {
    pub fn new(html: impl Into<String>) -> Self {
        Self { html: html.into() }
    }
}

#[async_trait]
impl PageSource for StaticPage {
    async fn fetch_page(&self) -> Result<String, FetchError> {
        Ok(self.html.clone())
    }
}

/// Fetches, parses and persists the contest calendar
pub struct Crawler {
    source: Arc<dyn PageSource>,
    repository: SharedEventRepository,
    offset: FixedOffset,
}

impl Crawler {
    /// Create a crawler whose seed year is taken in the given UTC offset
    ///
    /// # Errors
    ///
    /// Returns `CrawlerError::Config` if `utc_offset_hours` is not a
    /// valid offset.
    pub fn new(
        source: Arc<dyn PageSource>,
        repository: SharedEventRepository,
        utc_offset_hours: i32,
    ) -> Result<Self, CrawlerError> {
        let offset = fixed_offset(utc_offset_hours).ok_or_else(|| {
            CrawlerError::Config(format!("invalid UTC offset {utc_offset_hours}h"))
        })?;

        Ok(Self {
            source,
            repository,
            offset,
        })
    }

    /// Shared handle to the repository this crawler writes to
    pub fn repository(&self) -> &SharedEventRepository {
        &self.repository
    }

    /// Year the listing starts in when crawled at `now`
    pub fn seed_year_at(&self, now: DateTime<Utc>) -> i32 {
        now.with_timezone(&self.offset).year()
    }

    /// Run one crawl with the seed year taken from the current time
    ///
    /// # Errors
    ///
    /// Any fetch or persistence failure, or a page without the contest
    /// table. Nothing is written in those cases; malformed rows are only
    /// skipped.
    pub async fn run(&self) -> Result<CrawlReport, CrawlerError> {
        self.run_with_seed_year(self.seed_year_at(Utc::now())).await
    }

    /// Run one crawl with an explicit seed year
    ///
    /// # Errors
    ///
    /// See [`run`](Self::run).
    pub async fn run_with_seed_year(&self, seed_year: i32) -> Result<CrawlReport, CrawlerError> {
        let started_at = Utc::now();
        tracing::info!(seed_year, "Starting contest crawl");

        let html = self.source.fetch_page().await?;
        tracing::debug!(bytes = html.len(), "Fetched contest page");

        let scan = scan_events(&html, seed_year).inspect_err(|e| {
            tracing::error!(error = %e, "Contest table structure not recognized, keeping stored events");
        })?;

        self.repository
            .replace_all(&scan.records)
            .map_err(|e| CrawlerError::Storage(format!("{e:#}")))?;

        let report =
            CrawlReport::from_records(seed_year, &scan.records, scan.skipped.len(), started_at);
        tracing::info!(
            events = report.events,
            canceled = report.canceled,
            entry_closed = report.entry_closed,
            skipped = report.skipped,
            elapsed_ms = report.duration().num_milliseconds(),
            "Contest crawl finished"
        );
        Ok(report)
    }
}

/// `FixedOffset` east of UTC by whole hours
pub fn fixed_offset(hours: i32) -> Option<FixedOffset> {
    FixedOffset::east_opt(hours.checked_mul(3600)?)
}

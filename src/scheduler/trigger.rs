//! Crawl trigger
//!
//! Fires the crawl driver at fixed local hours (03:00 and 15:00 in UTC+8
//! by default). Runs never overlap: a trigger that arrives while a crawl
//! is in progress is rejected with `CrawlerError::AlreadyRunning`.

use chrono::{DateTime, Duration, FixedOffset, NaiveTime, Utc};
use std::future::Future;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

use super::error::{SchedulerError, SchedulerResult};
use crate::config::ScheduleConfig;
use crate::crawler::{fixed_offset, Crawler};
use crate::error::RacecalErrorTrait;
use crate::models::CrawlReport;
use crate::utils::error::CrawlerError;

// ============================================================================
// Crawl Schedule
// ============================================================================

/// Fixed daily crawl times in one UTC offset
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlSchedule {
    times: Vec<NaiveTime>,
    offset: FixedOffset,
    run_on_startup: bool,
}

impl CrawlSchedule {
    /// Create a schedule from local hours
    ///
    /// # Errors
    ///
    /// Returns a `SchedulerError` for an empty hour list, an hour past 23,
    /// or an impossible offset.
    pub fn new(hours: &[u32], utc_offset_hours: i32) -> SchedulerResult<Self> {
        if hours.is_empty() {
            return Err(SchedulerError::EmptySchedule);
        }

        let mut times = hours
            .iter()
            .map(|&hour| {
                NaiveTime::from_hms_opt(hour, 0, 0).ok_or(SchedulerError::invalid_hour(hour))
            })
            .collect::<SchedulerResult<Vec<_>>>()?;
        times.sort();
        times.dedup();

        let offset = fixed_offset(utc_offset_hours).ok_or(SchedulerError::InvalidOffset {
            hours: utc_offset_hours,
        })?;

        Ok(Self {
            times,
            offset,
            run_on_startup: false,
        })
    }

    /// Create a schedule from the `[schedule]` configuration section
    pub fn from_config(config: &ScheduleConfig) -> SchedulerResult<Self> {
        Ok(Self::new(&config.hours, config.utc_offset_hours)?
            .with_run_on_startup(config.run_on_startup))
    }

    /// Also crawl once as soon as the scheduler starts
    #[must_use]
    pub fn with_run_on_startup(mut self, value: bool) -> Self {
        self.run_on_startup = value;
        self
    }

    pub fn run_on_startup(&self) -> bool {
        self.run_on_startup
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    /// First scheduled time strictly after `now`
    pub fn next_run_after(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        let today = now.with_timezone(&self.offset).date_naive();

        std::iter::once(today)
            .chain(today.succ_opt())
            .flat_map(|day| self.times.iter().map(move |time| day.and_time(*time)))
            .filter_map(|local| local.and_local_timezone(self.offset).single())
            .map(|at| at.with_timezone(&Utc))
            .find(|at| *at > now)
            .unwrap_or_else(|| now + Duration::days(1))
    }

    /// Time to wait from `now` until the next run
    pub fn duration_until_next(&self, now: DateTime<Utc>) -> std::time::Duration {
        (self.next_run_after(now) - now).to_std().unwrap_or_default()
    }
}

// ============================================================================
// Crawl Scheduler
// ============================================================================

/// Runs the crawler on a [`CrawlSchedule`]
pub struct CrawlScheduler {
    schedule: CrawlSchedule,
    crawler: Arc<Crawler>,
    in_progress: Mutex<()>,
    last_report: RwLock<Option<CrawlReport>>,
}

impl CrawlScheduler {
    pub fn new(schedule: CrawlSchedule, crawler: Arc<Crawler>) -> Self {
        Self {
            schedule,
            crawler,
            in_progress: Mutex::new(()),
            last_report: RwLock::new(None),
        }
    }

    pub fn schedule(&self) -> &CrawlSchedule {
        &self.schedule
    }

    /// Report of the most recent successful crawl
    pub async fn last_report(&self) -> Option<CrawlReport> {
        self.last_report.read().await.clone()
    }

    /// Crawl now unless a crawl is already running
    ///
    /// # Errors
    ///
    /// `CrawlerError::AlreadyRunning` if another run holds the lock, or the
    /// crawl's own failure.
    pub async fn run_once(&self) -> Result<CrawlReport, CrawlerError> {
        let _guard = self
            .in_progress
            .try_lock()
            .map_err(|_| CrawlerError::AlreadyRunning)?;

        let report = self.crawler.run().await?;
        *self.last_report.write().await = Some(report.clone());
        Ok(report)
    }

    /// Run scheduled crawls until `shutdown` resolves
    ///
    /// A failed crawl is logged and the scheduler waits for the next slot;
    /// the stored events stay as they were.
    pub async fn run_until(&self, shutdown: impl Future<Output = ()>) {
        tokio::pin!(shutdown);

        if self.schedule.run_on_startup {
            self.trigger("startup").await;
        }

        loop {
            let now = Utc::now();
            let next = self.schedule.next_run_after(now);
            tracing::info!(
                next_run = %next.with_timezone(&self.schedule.offset),
                "Next contest crawl scheduled"
            );

            tokio::select! {
                _ = tokio::time::sleep(self.schedule.duration_until_next(now)) => {
                    self.trigger("schedule").await;
                }
                _ = &mut shutdown => {
                    tracing::info!("Crawl scheduler stopped");
                    break;
                }
            }
        }
    }

    async fn trigger(&self, reason: &str) {
        match self.run_once().await {
            Ok(report) => {
                tracing::info!(reason, events = report.events, "Scheduled crawl succeeded");
            }
            Err(e) => {
                tracing::error!(
                    reason,
                    error = %e,
                    category = %e.category(),
                    recoverable = e.is_recoverable(),
                    "Scheduled crawl failed"
                );
            }
        }
    }
}

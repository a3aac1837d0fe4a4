//! Crawl scheduling
//!
//! [`CrawlSchedule`] computes when the next crawl is due; [`CrawlScheduler`]
//! sleeps until then, runs the crawler, and keeps going after failures.

pub mod error;
pub mod trigger;

pub use error::{SchedulerError, SchedulerResult};
pub use trigger::{CrawlSchedule, CrawlScheduler};

//! racecal - Taipei road race calendar crawler
//!
//! Scrapes the road race contest table, turns each row into a structured
//! event record, keeps the latest crawl in SQLite and serves it through a
//! filterable HTTP query API.
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - [`config`] - Configuration management and settings
//! - [`crawler`] - Page fetching and the crawl driver
//! - [`parser`] - Contest table scanning and cell normalization
//! - [`models`] - Event records and crawl reports
//! - [`storage`] - Event repository (SQLite, in-memory)
//! - [`query`] - Event filtering, sorting and pagination
//! - [`scheduler`] - Fixed-time crawl trigger
//! - [`server`] - HTTP query API
//! - [`utils`] - Common utilities and helpers
//!
//! # Example
//!
//! ```no_run
//! use racecal::parser::parse_events;
//!
//! let html = std::fs::read_to_string("contest.html").unwrap();
//! for event in parse_events(&html, 2025).unwrap() {
//!     println!("{} {}", event.date, event.name);
//! }
//! ```

pub mod config;
pub mod crawler;
pub mod error;
pub mod models;
pub mod parser;
pub mod query;
pub mod scheduler;
pub mod server;
pub mod storage;
pub mod utils;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::Config;
    pub use crate::crawler::{ContestFetcher, Crawler, PageSource};
    pub use crate::error::{Error, ErrorCategory, RacecalErrorTrait, Result};
    pub use crate::models::{CrawlReport, DistanceCategory, EventRecord, StoredEvent};
    pub use crate::parser::parse_events;
    pub use crate::query::{EventQuery, EventQueryParams};
    pub use crate::storage::{EventRepository, SharedEventRepository};
}

// Direct re-exports for convenience
pub use models::{EventRecord, StoredEvent};

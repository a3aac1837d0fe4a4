//! Error types for the racecal crawler
//!
//! This module defines the fetch and parse error types used by the
//! crawl pipeline. Field-level parse problems never show up here: the
//! extractors resolve them to `None`. Only structural problems that make
//! a whole row unusable are errors.

use thiserror::Error;

/// Errors that can occur while fetching the contest page
#[derive(Error, Debug)]
pub enum FetchError {
    /// HTTP request error
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Server answered with a non-success status code
    #[error("Server error: {0}")]
    ServerError(u16),

    /// Request timeout
    #[error("Request timeout")]
    Timeout,

    /// Maximum retry attempts exceeded
    #[error("Maximum retry attempts exceeded")]
    MaxRetriesExceeded,

    /// Content decoding error
    #[error("Decoding error: {0}")]
    Decode(String),

    /// Invalid URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

/// Structural failures of the contest table
///
/// A missing table aborts the scan; the row-level variants only cause that
/// row to be skipped. Row numbers are 1-based positions in the table,
/// counting the header row as row 0.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// The `table.gridview` element is missing from the document
    #[error("Contest table not found in document")]
    TableNotFound,

    /// A row has fewer cells than the fixed column layout requires
    #[error("Row {row}: missing cell {index}")]
    MissingCell { row: usize, index: usize },

    /// A month header is present but is not one of `1月`..`12月`
    #[error("Row {row}: unknown month header '{label}'")]
    UnknownMonth { row: usize, label: String },

    /// The event date token could not be resolved to a calendar date
    #[error("Row {row}: invalid event date '{value}'")]
    InvalidEventDate { row: usize, value: String },
}

/// General crawler errors
#[derive(Error, Debug)]
pub enum CrawlerError {
    /// Fetch error
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    /// Persisting the parsed events failed
    #[error("Storage error: {0}")]
    Storage(String),

    /// The crawler was set up with unusable settings
    #[error("Invalid crawler configuration: {0}")]
    Config(String),

    /// A crawl is already in progress
    #[error("Crawl already running")]
    AlreadyRunning,
}

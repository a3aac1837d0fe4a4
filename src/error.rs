//! Unified error handling for the racecal crate
//!
//! Domain errors live next to the code that raises them
//! ([`FetchError`], [`ParseError`], [`CrawlerError`]). This module gives
//! them a common classification and holds the [`Error`] type returned by
//! the query API.
//!
//! # Architecture
//!
//! - [`RacecalErrorTrait`] - Common interface implemented by all error types
//! - [`ErrorCategory`] - Classification of errors for handling strategies
//! - [`Error`] - Errors surfaced to API clients
//!
//! # Usage
//!
//! ```rust
//! use racecal::error::{FetchError, RacecalErrorTrait};
//!
//! let err = FetchError::ServerError(503);
//! if err.is_recoverable() {
//!     println!("{} failure, retrying later: {err}", err.category());
//! }
//! ```

use thiserror::Error;

pub use crate::utils::error::{CrawlerError, FetchError, ParseError};

/// Common trait for all racecal error types
pub trait RacecalErrorTrait: std::error::Error {
    /// Check if this error is recoverable (a later crawl may succeed)
    fn is_recoverable(&self) -> bool;

    /// Get the error category for handling strategies
    fn category(&self) -> ErrorCategory;
}

/// Classification of errors for handling strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Network-related errors (HTTP, timeout, server status)
    Network,
    /// Contest table structure errors
    Parsing,
    /// Storage and I/O errors
    Storage,
    /// Configuration and validation errors
    Config,
    /// Query parameter errors
    Query,
    /// Other/unknown errors
    Other,
}

impl ErrorCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Network => "network",
            Self::Parsing => "parsing",
            Self::Storage => "storage",
            Self::Config => "config",
            Self::Query => "query",
            Self::Other => "other",
        }
    }
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl RacecalErrorTrait for FetchError {
    fn is_recoverable(&self) -> bool {
        match self {
            Self::Http(_) | Self::Timeout | Self::MaxRetriesExceeded => true,
            Self::ServerError(status) => *status == 429 || *status >= 500,
            Self::Decode(_) | Self::InvalidUrl(_) => false,
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidUrl(_) => ErrorCategory::Config,
            _ => ErrorCategory::Network,
        }
    }
}

impl RacecalErrorTrait for ParseError {
    fn is_recoverable(&self) -> bool {
        false
    }

    fn category(&self) -> ErrorCategory {
        ErrorCategory::Parsing
    }
}

impl RacecalErrorTrait for CrawlerError {
    fn is_recoverable(&self) -> bool {
        match self {
            Self::Fetch(e) => e.is_recoverable(),
            Self::Parse(e) => e.is_recoverable(),
            Self::Storage(_) | Self::AlreadyRunning => true,
            Self::Config(_) => false,
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::Fetch(e) => e.category(),
            Self::Parse(e) => e.category(),
            Self::Storage(_) => ErrorCategory::Storage,
            Self::Config(_) => ErrorCategory::Config,
            Self::AlreadyRunning => ErrorCategory::Other,
        }
    }
}

/// Errors returned by the event query API
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid event query
    #[error("Invalid query: {0}")]
    Query(String),

    /// The event store could not be read
    #[error("Storage error: {0}")]
    Storage(String),
}

impl RacecalErrorTrait for Error {
    fn is_recoverable(&self) -> bool {
        match self {
            Self::Query(_) => false,
            Self::Storage(_) => true,
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::Query(_) => ErrorCategory::Query,
            Self::Storage(_) => ErrorCategory::Storage,
        }
    }
}

impl Error {
    /// Create a query validation error
    pub fn query(msg: impl Into<String>) -> Self {
        Self::Query(msg.into())
    }

    /// Create a storage error from a repository failure
    pub fn storage(err: &anyhow::Error) -> Self {
        Self::Storage(format!("{err:#}"))
    }
}

/// Result type alias using the unified Error type
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_error_classification() {
        assert!(FetchError::Timeout.is_recoverable());
        assert!(FetchError::ServerError(503).is_recoverable());
        assert!(FetchError::ServerError(429).is_recoverable());
        assert!(!FetchError::ServerError(404).is_recoverable());
        assert_eq!(FetchError::Timeout.category(), ErrorCategory::Network);
        assert_eq!(
            FetchError::InvalidUrl("x".to_string()).category(),
            ErrorCategory::Config
        );
    }

    #[test]
    fn test_crawler_error_delegates() {
        let parse_err: CrawlerError = ParseError::TableNotFound.into();
        assert!(matches!(parse_err, CrawlerError::Parse(_)));
        assert_eq!(parse_err.category(), ErrorCategory::Parsing);
        assert!(!parse_err.is_recoverable());

        let fetch_err: CrawlerError = FetchError::MaxRetriesExceeded.into();
        assert_eq!(fetch_err.category(), ErrorCategory::Network);
        assert!(fetch_err.is_recoverable());

        let storage_err = CrawlerError::Storage("locked".to_string());
        assert_eq!(storage_err.category(), ErrorCategory::Storage);
        assert_eq!(CrawlerError::AlreadyRunning.category(), ErrorCategory::Other);
    }

    #[test]
    fn test_query_error() {
        let err = Error::query("offset without limit");
        assert_eq!(err.category(), ErrorCategory::Query);
        assert!(!err.is_recoverable());
        assert_eq!(err.to_string(), "Invalid query: offset without limit");
    }

    #[test]
    fn test_storage_error_keeps_context_chain() {
        let source = anyhow::anyhow!("database is locked").context("Failed to read events");
        let err = Error::storage(&source);
        assert_eq!(err.category(), ErrorCategory::Storage);
        assert!(err.is_recoverable());
        assert_eq!(
            err.to_string(),
            "Storage error: Failed to read events: database is locked"
        );
    }

    #[test]
    fn test_category_display() {
        assert_eq!(ErrorCategory::Parsing.to_string(), "parsing");
        assert_eq!(ErrorCategory::Other.to_string(), "other");
    }
}

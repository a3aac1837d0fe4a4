//! HTML parsing and data extraction
//!
//! This module turns the contest listing page into normalized
//! [`EventRecord`]s. The pieces, leaf first:
//!
//! - [`title`] splits a title into name and parenthetical info
//! - [`classify`] maps styling and icons to status and certificate
//! - [`distance`] parses distance buttons (label, price, capacity)
//! - [`entry`] parses the registration window
//! - [`scanner`] tracks the implicit year across month headers
//! - [`row`] composes the extractors for one table row
//! - [`html`] walks the table and threads the scan state

pub mod classify;
pub mod distance;
pub mod entry;
pub mod html;
pub mod row;
pub mod scanner;
pub mod selectors;
pub mod title;

pub use entry::{EntryState, EntryWindow, ENTRY_CLOSED};
pub use html::{EventTableParser, TableScan};
pub use scanner::{month_index, resolve_years, ScanState};
pub use title::{split_title, SplitTitle};

use crate::models::EventRecord;
use crate::utils::error::ParseError;

/// Parse the contest page into event records
///
/// A pure function of its inputs: the same HTML and seed year always give
/// the same records.
///
/// # Errors
///
/// Returns `ParseError::TableNotFound` when the page has no contest table.
/// Malformed rows are skipped, see [`scan_events`].
pub fn parse_events(html: &str, seed_year: i32) -> Result<Vec<EventRecord>, ParseError> {
    EventTableParser::new().parse(html, seed_year)
}

/// Parse the contest page, also reporting the rows that were skipped
///
/// # Errors
///
/// Returns `ParseError::TableNotFound` when the page has no contest table.
pub fn scan_events(html: &str, seed_year: i32) -> Result<TableScan, ParseError> {
    EventTableParser::new().scan(html, seed_year)
}

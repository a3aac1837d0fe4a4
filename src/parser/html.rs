//! Contest table parser
//!
//! Walks `table.gridview` rows in document order, threading the scan state
//! from row to row, and transforms each row into an event record. A row
//! that breaks the column contract is skipped with a warning; the rest of
//! the table is still returned.

use scraper::Html;

use crate::models::EventRecord;
use crate::parser::row::{transform_row, RowCells};
use crate::parser::scanner::ScanState;
use crate::parser::selectors::{ROW, TABLE};
use crate::utils::error::ParseError;

/// Result of one table scan
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableScan {
    /// Records of every usable row, in document order
    pub records: Vec<EventRecord>,

    /// Why each skipped row was rejected, in document order
    pub skipped: Vec<ParseError>,
}

/// Parser for the contest listing page
///
/// Holds no state between calls; each [`scan`](Self::scan) starts from the
/// seed year.
#[derive(Debug, Clone, Copy, Default)]
pub struct EventTableParser;

impl EventTableParser {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Parse every usable event row of the document
    ///
    /// # Errors
    /// Returns `ParseError::TableNotFound` if the page has no event table.
    pub fn parse(&self, html: &str, seed_year: i32) -> Result<Vec<EventRecord>, ParseError> {
        self.scan(html, seed_year).map(|scan| scan.records)
    }

    /// Scan the table, keeping the records and the reasons rows were skipped
    ///
    /// # Arguments
    /// * `html` - Raw contest page HTML
    /// * `seed_year` - Year of the first listed month (normally the current year)
    ///
    /// A valid month header still advances the year when the rest of its row
    /// is rejected. An unknown month header leaves the year unchanged.
    ///
    /// # Errors
    /// Returns `ParseError::TableNotFound` if the page has no event table.
    pub fn scan(&self, html: &str, seed_year: i32) -> Result<TableScan, ParseError> {
        let document = Html::parse_document(html);
        let table = document
            .select(&TABLE)
            .next()
            .ok_or(ParseError::TableNotFound)?;

        let mut state = ScanState::new(seed_year);
        let mut scan = TableScan::default();

        for (row, tr) in table.select(&ROW).enumerate().skip(1) {
            let record = RowCells::from_row(row, tr).and_then(|cells| {
                state = state.observe(row, cells.month_label().as_deref())?;
                transform_row(&cells, state.current_year())
            });

            match record {
                Ok(record) => scan.records.push(record),
                Err(e) => {
                    tracing::warn!(row, error = %e, "Skipping malformed contest row");
                    scan.skipped.push(e);
                }
            }
        }

        tracing::debug!(
            rows = scan.records.len(),
            skipped = scan.skipped.len(),
            seed_year,
            "Parsed contest table"
        );
        Ok(scan)
    }
}

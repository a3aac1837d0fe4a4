//! Year tracking across the contest table
//!
//! The table never states a year. A month header (`11月`) appears only on
//! the first row of each month, and the listing runs forward in time, so
//! the year is recovered by walking rows in document order: a month index
//! lower than the previous one means the listing crossed New Year.

use crate::utils::error::ParseError;

/// Month headers as they appear in the first column, January first
pub const MONTH_LABELS: [&str; 12] = [
    "1月", "2月", "3月", "4月", "5月", "6月", "7月", "8月", "9月", "10月", "11月", "12月",
];

/// Zero-based month index for an exact month header label
pub fn month_index(label: &str) -> Option<u32> {
    MONTH_LABELS
        .iter()
        .position(|m| *m == label)
        .map(|i| i as u32)
}

/// Year/month state carried from row to row during one scan
///
/// Created from the seed year for every scan and dropped when the scan
/// ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanState {
    current_year: i32,
    last_month_index: Option<u32>,
}

impl ScanState {
    pub fn new(seed_year: i32) -> Self {
        Self {
            current_year: seed_year,
            last_month_index: None,
        }
    }

    /// Year that applies to the row just observed
    pub fn current_year(&self) -> i32 {
        self.current_year
    }

    pub fn last_month_index(&self) -> Option<u32> {
        self.last_month_index
    }

    /// State after a row with the given month index, or unchanged for rows
    /// without a month header
    #[must_use]
    pub fn advance(self, month_index: Option<u32>) -> Self {
        let Some(month_index) = month_index else {
            return self;
        };

        let crossed_new_year = self
            .last_month_index
            .is_some_and(|last| month_index < last);

        Self {
            current_year: if crossed_new_year {
                self.current_year + 1
            } else {
                self.current_year
            },
            last_month_index: Some(month_index),
        }
    }

    /// Advance over a raw month header cell
    ///
    /// Empty labels carry the state over. A label that is not a month is a
    /// structural failure for row `row`.
    pub fn observe(self, row: usize, label: Option<&str>) -> Result<Self, ParseError> {
        match label.map(str::trim).filter(|l| !l.is_empty()) {
            None => Ok(self),
            Some(label) => month_index(label)
                .map(|index| self.advance(Some(index)))
                .ok_or_else(|| ParseError::UnknownMonth {
                    row,
                    label: label.to_string(),
                }),
        }
    }
}

/// Resolve the year of every row from its month header, in document order
///
/// Rows are numbered from 1, matching the table rows after the header.
/// Unlike the table scan, which skips such rows, this pre-pass stops at the
/// first unknown label since every later year depends on it.
///
/// # Errors
///
/// Returns `ParseError::UnknownMonth` for the first unrecognized label.
pub fn resolve_years<'a, I>(labels: I, seed_year: i32) -> Result<Vec<i32>, ParseError>
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    labels
        .into_iter()
        .enumerate()
        .try_fold(
            (ScanState::new(seed_year), Vec::new()),
            |(state, mut years), (i, label)| {
                let state = state.observe(i + 1, label)?;
                years.push(state.current_year());
                Ok((state, years))
            },
        )
        .map(|(_, years)| years)
}

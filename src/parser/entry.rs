//! Registration window parser
//!
//! The last column holds either the closed sentinel `已截止` or a range of
//! year-less Chinese dates such as `01月05日~01月20日`, where either side may
//! be missing. Years come from the row scanner.

use chrono::{Months, NaiveDate};
use regex::Regex;
use std::sync::LazyLock;

use crate::utils::strip_whitespace;

/// Registration text meaning "registration closed"
pub const ENTRY_CLOSED: &str = "已截止";

static CHINESE_DATE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(0?[1-9]|1[0-2])月(0?[1-9]|[12]\d|30|31)日").expect("Invalid regex pattern")
});

/// Which parts of the registration text were present
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryState {
    Closed,
    OpenNoDates,
    OpenStartOnly,
    OpenEndOnly,
    OpenBothDates,
}

/// Parsed registration window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryWindow {
    pub state: EntryState,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl EntryWindow {
    /// Parse registration text against the row's year
    ///
    /// Whitespace is stripped first. An end date before the start date is
    /// moved one year forward, since the window crosses New Year.
    pub fn parse(text: &str, year: i32) -> Self {
        let text = strip_whitespace(text).replace('～', "~");

        if text == ENTRY_CLOSED {
            return Self {
                state: EntryState::Closed,
                start: None,
                end: None,
            };
        }

        let mut parts = text.split('~');
        let start_text = parts.next().filter(|s| !s.is_empty());
        let end_text = parts.next().filter(|s| !s.is_empty());

        let state = match (start_text, end_text) {
            (None, None) => EntryState::OpenNoDates,
            (Some(_), None) => EntryState::OpenStartOnly,
            (None, Some(_)) => EntryState::OpenEndOnly,
            (Some(_), Some(_)) => EntryState::OpenBothDates,
        };

        let start = start_text.and_then(|s| parse_chinese_date(s, year));
        let mut end = end_text.and_then(|s| parse_chinese_date(s, year));

        if let (Some(start), Some(end_date)) = (start, end) {
            if end_date < start {
                end = end_date.checked_add_months(Months::new(12));
            }
        }

        Self { state, start, end }
    }

    /// Whether the text was the closed sentinel
    pub fn is_closed(&self) -> bool {
        self.state == EntryState::Closed
    }
}

/// Resolve the leading `M月D日` token of `text` in `year`
///
/// Returns `None` when there is no token or the day does not exist in that
/// month.
pub fn parse_chinese_date(text: &str, year: i32) -> Option<NaiveDate> {
    let caps = CHINESE_DATE_REGEX.captures(text)?;
    let month = caps.get(1)?.as_str().parse::<u32>().ok()?;
    let day = caps.get(2)?.as_str().parse::<u32>().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

//! Row transformer
//!
//! Turns one table row into an [`EventRecord`] given the year the scanner
//! resolved for it. Column layout:
//!
//! | cell | content                          |
//! |------|----------------------------------|
//! | 0    | month header (`<span>`, optional)|
//! | 1    | title, link, strike-through      |
//! | 2    | certificate icon                 |
//! | 3    | date, weekday, time              |
//! | 4    | location                         |
//! | 5    | distance buttons                 |
//! | 6    | agent                            |
//! | 7    | registration window              |

use chrono::NaiveDate;
use regex::Regex;
use scraper::ElementRef;
use std::sync::LazyLock;

use crate::models::{Certificate, DistanceEntry, EventRecord};
use crate::parser::classify::{classify_certificate, classify_status};
use crate::parser::distance::parse_distance;
use crate::parser::entry::EntryWindow;
use crate::parser::selectors::{ANCHOR, DISTANCE_BUTTON, ICON, MONTH};
use crate::parser::title::split_title;
use crate::utils::error::ParseError;
use crate::utils::normalize_whitespace;

/// Number of cells every event row must have
pub const CELL_COUNT: usize = 8;

const MONTH_CELL: usize = 0;
const TITLE_CELL: usize = 1;
const CERTIFICATE_CELL: usize = 2;
const DATE_CELL: usize = 3;
const LOCATION_CELL: usize = 4;
const DISTANCE_CELL: usize = 5;
const AGENT_CELL: usize = 6;
const ENTRY_CELL: usize = 7;

static EVENT_DATE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{1,2})/(\d{1,2})$").expect("Invalid regex pattern"));

/// The `<td>` cells of one event row, checked against the column layout
#[derive(Debug)]
pub struct RowCells<'a> {
    row: usize,
    cells: Vec<ElementRef<'a>>,
}

impl<'a> RowCells<'a> {
    /// Collect the direct `<td>` children of a `<tr>`
    ///
    /// # Errors
    ///
    /// Returns `ParseError::MissingCell` when the row has fewer than
    /// [`CELL_COUNT`] cells.
    pub fn from_row(row: usize, tr: ElementRef<'a>) -> Result<Self, ParseError> {
        let cells: Vec<ElementRef<'a>> = tr
            .children()
            .filter_map(ElementRef::wrap)
            .filter(|el| el.value().name() == "td")
            .collect();

        if cells.len() < CELL_COUNT {
            return Err(ParseError::MissingCell {
                row,
                index: cells.len(),
            });
        }

        Ok(Self { row, cells })
    }

    /// Row number within the table (header row is 0)
    pub fn row(&self) -> usize {
        self.row
    }

    /// Month header text, `None` for rows the header spans over
    pub fn month_label(&self) -> Option<String> {
        self.cell(MONTH_CELL)
            .select(&MONTH)
            .next()
            .map(text_of)
            .filter(|text| !text.is_empty())
    }

    fn cell(&self, index: usize) -> ElementRef<'a> {
        self.cells[index]
    }
}

/// Build the event record for one row in the given year
///
/// # Errors
///
/// Returns `ParseError::InvalidEventDate` when the event date cannot be
/// resolved. Every other field degrades to `None` instead of failing.
pub fn transform_row(cells: &RowCells<'_>, year: i32) -> Result<EventRecord, ParseError> {
    let title = split_title(&title_text(cells));
    let (date, time) = date_and_time(cells, year)?;
    let entry = EntryWindow::parse(&text_of(cells.cell(ENTRY_CELL)), year);

    Ok(EventRecord {
        name: title.name,
        info: title.info,
        link: link(cells),
        status: classify_status(cells.cell(TITLE_CELL).value().attr("style")),
        certificate: certificate(cells),
        date,
        time,
        location: location(cells),
        distances: distances(cells),
        agent: text_of(cells.cell(AGENT_CELL)),
        entry_is_end: entry.is_closed(),
        entry_start_date: entry.start,
        entry_end_date: entry.end,
    })
}

/// Anchor text when present and non-empty, otherwise the whole cell
fn title_text(cells: &RowCells<'_>) -> String {
    let cell = cells.cell(TITLE_CELL);
    anchor_with_text(cell)
        .map(|(_, text)| text)
        .unwrap_or_else(|| text_of(cell))
}

fn link(cells: &RowCells<'_>) -> Option<String> {
    anchor_with_text(cells.cell(TITLE_CELL))
        .and_then(|(anchor, _)| anchor.value().attr("href"))
        .map(|href| href.trim().to_string())
        .filter(|href| !href.is_empty())
}

fn anchor_with_text<'a>(cell: ElementRef<'a>) -> Option<(ElementRef<'a>, String)> {
    let anchor = cell.select(&ANCHOR).next()?;
    let text = text_of(anchor);
    (!text.is_empty()).then_some((anchor, text))
}

fn certificate(cells: &RowCells<'_>) -> Option<Certificate> {
    let src = cells
        .cell(CERTIFICATE_CELL)
        .select(&ICON)
        .next()
        .and_then(|img| img.value().attr("src"));
    classify_certificate(src)
}

/// Date cell reads `MM/DD (weekday) HH:MM`; the time is optional
fn date_and_time(
    cells: &RowCells<'_>,
    year: i32,
) -> Result<(NaiveDate, Option<String>), ParseError> {
    let text = text_of(cells.cell(DATE_CELL));
    let mut tokens = text.split_whitespace();
    let date_token = tokens.next().unwrap_or_default();
    let time = tokens.nth(1).map(str::to_string);

    let date = parse_event_date(date_token, year).ok_or_else(|| ParseError::InvalidEventDate {
        row: cells.row(),
        value: text.clone(),
    })?;

    Ok((date, time))
}

/// Resolve an `M/D` token in `year`
pub fn parse_event_date(token: &str, year: i32) -> Option<NaiveDate> {
    let caps = EVENT_DATE_REGEX.captures(token.trim())?;
    let month = caps.get(1)?.as_str().parse::<u32>().ok()?;
    let day = caps.get(2)?.as_str().parse::<u32>().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

fn location(cells: &RowCells<'_>) -> Option<String> {
    Some(text_of(cells.cell(LOCATION_CELL))).filter(|text| !text.is_empty())
}

fn distances(cells: &RowCells<'_>) -> Vec<DistanceEntry> {
    cells
        .cell(DISTANCE_CELL)
        .select(&DISTANCE_BUTTON)
        .map(|button| parse_distance(&text_of(button), button.value().attr("title")))
        .collect()
}

/// Collected, whitespace-normalized text of an element
fn text_of(element: ElementRef<'_>) -> String {
    normalize_whitespace(&element.text().collect::<String>())
}

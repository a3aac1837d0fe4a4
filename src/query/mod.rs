//! Event query: filtering, sorting and pagination over stored events
//!
//! Query strings arrive as [`EventQueryParams`] (every value a raw string,
//! list values comma-separated) and are validated into an [`EventQuery`],
//! which is then applied to the stored event set.
//!
//! Date range filters take one or two bounds. One bound selects that date
//! and later; two bounds select the inclusive range between them.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};
use serde::Deserialize;
use std::cmp::Ordering;

use crate::error::{Error, Result};
use crate::models::{DistanceCategory, EventRecord, StoredEvent};

/// Date format of `dateRange`, `entryStartDates` and `entryEndDates`
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Timestamp format of `createdAtTimes`
pub const CREATED_AT_FORMAT: &str = "%Y/%m/%d %H:%M:%S";

/// Raw query string parameters, as received by the HTTP API
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventQueryParams {
    pub keywords: Option<String>,
    pub date_range: Option<String>,
    pub distances: Option<String>,
    pub only_registering: Option<String>,
    pub entry_is_end: Option<String>,
    pub offset: Option<String>,
    pub limit: Option<String>,
    pub created_at_times: Option<String>,
    pub entry_start_dates: Option<String>,
    pub entry_end_dates: Option<String>,
    pub sort_by: Option<String>,
    pub order_by: Option<String>,
}

/// An open-ended or closed inclusive range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bounds<T> {
    pub start: T,
    pub end: Option<T>,
}

impl<T: PartialOrd> Bounds<T> {
    pub fn contains(&self, value: &T) -> bool {
        *value >= self.start && self.end.as_ref().map_or(true, |end| value <= end)
    }
}

/// Field to sort by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    #[default]
    EventDate,
    EntryStartDate,
    EntryEndDate,
}

impl SortKey {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "eventDate" => Some(Self::EventDate),
            "entryStartDate" => Some(Self::EntryStartDate),
            "entryEndDate" => Some(Self::EntryEndDate),
            _ => None,
        }
    }

    fn key(&self, record: &EventRecord) -> Option<NaiveDate> {
        match self {
            Self::EventDate => Some(record.date),
            Self::EntryStartDate => record.entry_start_date,
            Self::EntryEndDate => record.entry_end_date,
        }
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "asc" => Some(Self::Asc),
            "desc" => Some(Self::Desc),
            _ => None,
        }
    }
}

/// Skip `offset` events, then return at most `limit`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub offset: usize,
    pub limit: usize,
}

/// A validated event query
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventQuery {
    /// Case-insensitive substring of the event name or location
    pub keywords: Option<String>,
    pub date_range: Option<Bounds<NaiveDate>>,
    /// Creation time bounds, in the calendar's local time
    pub created_at: Option<Bounds<NaiveDateTime>>,
    pub entry_start_dates: Option<Bounds<NaiveDate>>,
    pub entry_end_dates: Option<Bounds<NaiveDate>>,
    /// Events offering at least one of these categories
    pub distances: Vec<DistanceCategory>,
    pub only_registering: bool,
    pub entry_is_end: Option<bool>,
    pub page: Option<Page>,
    pub sort_by: SortKey,
    pub order_by: SortOrder,
}

impl EventQuery {
    /// Validate raw query parameters
    ///
    /// # Errors
    ///
    /// Returns `Error::Query` naming the first offending parameter.
    pub fn from_params(params: &EventQueryParams) -> Result<Self> {
        let keywords = params
            .keywords
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .map(str::to_string);

        let distances = split_list(params.distances.as_deref())
            .into_iter()
            .map(|d| {
                DistanceCategory::parse(d)
                    .ok_or_else(|| Error::query(format!("distances: unknown category '{d}'")))
            })
            .collect::<Result<Vec<_>>>()?;

        let page = match (params.offset.as_deref(), params.limit.as_deref()) {
            (None, None) => None,
            (Some(offset), Some(limit)) => Some(Page {
                offset: parse_count("offset", offset)?,
                limit: parse_count("limit", limit)?,
            }),
            _ => {
                return Err(Error::query("offset and limit must be given together"));
            }
        };

        let sort_by = match params.sort_by.as_deref() {
            None => SortKey::default(),
            Some(s) => SortKey::parse(s).ok_or_else(|| {
                Error::query(format!(
                    "sortBy must be one of eventDate, entryStartDate, entryEndDate (got '{s}')"
                ))
            })?,
        };

        let order_by = match params.order_by.as_deref() {
            None => SortOrder::default(),
            Some(s) => SortOrder::parse(s)
                .ok_or_else(|| Error::query(format!("orderBy must be asc or desc (got '{s}')")))?,
        };

        Ok(Self {
            keywords,
            date_range: parse_bounds("dateRange", params.date_range.as_deref(), parse_date)?,
            created_at: parse_bounds(
                "createdAtTimes",
                params.created_at_times.as_deref(),
                parse_timestamp,
            )?,
            entry_start_dates: parse_bounds(
                "entryStartDates",
                params.entry_start_dates.as_deref(),
                parse_date,
            )?,
            entry_end_dates: parse_bounds(
                "entryEndDates",
                params.entry_end_dates.as_deref(),
                parse_date,
            )?,
            distances,
            only_registering: params.only_registering.as_deref() == Some("true"),
            entry_is_end: params.entry_is_end.as_deref().map(|v| v == "true"),
            page,
            sort_by,
            order_by,
        })
    }

    /// Whether a stored event passes every filter, evaluated at `now`
    pub fn matches(&self, event: &StoredEvent, now: DateTime<FixedOffset>) -> bool {
        let record = &event.record;

        if let Some(keywords) = &self.keywords {
            let needle = keywords.to_lowercase();
            let in_name = record.name.to_lowercase().contains(&needle);
            let in_location = record
                .location
                .as_deref()
                .is_some_and(|l| l.to_lowercase().contains(&needle));
            if !in_name && !in_location {
                return false;
            }
        }

        if let Some(range) = &self.date_range {
            if !range.contains(&record.date) {
                return false;
            }
        }

        if let Some(range) = &self.created_at {
            let local = event.created_at.with_timezone(now.offset()).naive_local();
            if !range.contains(&local) {
                return false;
            }
        }

        if !within(self.entry_start_dates.as_ref(), record.entry_start_date)
            || !within(self.entry_end_dates.as_ref(), record.entry_end_date)
        {
            return false;
        }

        if !self.distances.is_empty()
            && !self
                .distances
                .iter()
                .any(|c| record.has_distance_category(*c))
        {
            return false;
        }

        if self.only_registering && !record.is_registering_on(now.date_naive()) {
            return false;
        }

        if let Some(entry_is_end) = self.entry_is_end {
            if record.entry_is_end != entry_is_end {
                return false;
            }
        }

        true
    }

    /// Filter, sort and paginate `events`
    ///
    /// Sorting is stable. Events without the sort key come last in either
    /// direction.
    pub fn apply(&self, events: Vec<StoredEvent>, now: DateTime<FixedOffset>) -> Vec<StoredEvent> {
        let mut selected: Vec<StoredEvent> =
            events.into_iter().filter(|e| self.matches(e, now)).collect();

        selected.sort_by(|a, b| {
            match (self.sort_by.key(&a.record), self.sort_by.key(&b.record)) {
                (Some(x), Some(y)) => match self.order_by {
                    SortOrder::Asc => x.cmp(&y),
                    SortOrder::Desc => y.cmp(&x),
                },
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            }
        });

        match self.page {
            Some(page) => selected
                .into_iter()
                .skip(page.offset)
                .take(page.limit)
                .collect(),
            None => selected,
        }
    }
}

impl TryFrom<&EventQueryParams> for EventQuery {
    type Error = Error;

    fn try_from(params: &EventQueryParams) -> Result<Self> {
        Self::from_params(params)
    }
}

/// A present filter excludes events that lack the value
fn within(bounds: Option<&Bounds<NaiveDate>>, value: Option<NaiveDate>) -> bool {
    match (bounds, value) {
        (None, _) => true,
        (Some(bounds), Some(value)) => bounds.contains(&value),
        (Some(_), None) => false,
    }
}

fn split_list(value: Option<&str>) -> Vec<&str> {
    value
        .map(|v| {
            v.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .collect()
        })
        .unwrap_or_default()
}

fn parse_bounds<T>(
    name: &str,
    value: Option<&str>,
    parse: fn(&str) -> Option<T>,
) -> Result<Option<Bounds<T>>> {
    let values = split_list(value)
        .into_iter()
        .map(|v| parse(v).ok_or_else(|| Error::query(format!("{name}: invalid value '{v}'"))))
        .collect::<Result<Vec<T>>>()?;

    let mut values = values.into_iter();
    match (values.next(), values.next(), values.next()) {
        (None, _, _) => Ok(None),
        (Some(start), end, None) => Ok(Some(Bounds { start, end })),
        _ => Err(Error::query(format!("{name}: at most two values allowed"))),
    }
}

fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value, DATE_FORMAT).ok()
}

fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value, CREATED_AT_FORMAT).ok()
}

fn parse_count(name: &str, value: &str) -> Result<usize> {
    value
        .trim()
        .parse::<usize>()
        .map_err(|_| Error::query(format!("{name} must be a non-negative integer (got '{value}')")))
}

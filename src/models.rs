// Core data structures for racecal

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// One normalized race event, produced from one row of the contest table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRecord {
    pub name: String,
    pub info: Option<String>,
    pub link: Option<String>,
    pub status: EventStatus,
    pub certificate: Option<Certificate>,
    pub date: NaiveDate,
    pub time: Option<String>,
    pub location: Option<String>,
    pub distances: Vec<DistanceEntry>,
    pub agent: String,
    pub entry_is_end: bool,
    pub entry_start_date: Option<NaiveDate>,
    pub entry_end_date: Option<NaiveDate>,
}

impl EventRecord {
    /// Whether any distance offering falls into the given category
    pub fn has_distance_category(&self, category: DistanceCategory) -> bool {
        self.distances
            .iter()
            .filter_map(|d| d.distance)
            .any(|km| category.contains(km))
    }

    /// Whether registration is open on the given day
    ///
    /// Missing window bounds are treated as open-ended.
    pub fn is_registering_on(&self, day: NaiveDate) -> bool {
        if self.entry_is_end {
            return false;
        }
        let started = self.entry_start_date.map_or(true, |start| start <= day);
        let not_ended = self.entry_end_date.map_or(true, |end| day <= end);
        started && not_ended
    }
}

/// One race distance offering with its price and capacity
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DistanceEntry {
    /// Kilometers, present only for clean `<number>K` labels
    pub distance: Option<f64>,
    /// Raw label for everything else (relays, `5K+10K`, kids' runs, ...)
    pub complex_distance: Option<String>,
    pub event_price: Option<i64>,
    pub event_limit: Option<i64>,
}

/// Event status derived from the title cell styling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventStatus {
    Normal,
    CanceledOrPostponed,
}

impl EventStatus {
    /// Get string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Normal => "NORMAL",
            Self::CanceledOrPostponed => "CANCELED_OR_POSTPONED",
        }
    }

    /// Create from string representation
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "NORMAL" => Some(Self::Normal),
            "CANCELED_OR_POSTPONED" => Some(Self::CanceledOrPostponed),
            _ => None,
        }
    }
}

/// Course certification shown as an icon next to the event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Certificate {
    Iaaf,
    Aims,
    CourseCalculated,
}

impl Certificate {
    /// Get string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Iaaf => "IAAF",
            Self::Aims => "AIMS",
            Self::CourseCalculated => "COURSE_CALCULATED",
        }
    }

    /// Create from string representation
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "IAAF" => Some(Self::Iaaf),
            "AIMS" => Some(Self::Aims),
            "COURSE_CALCULATED" => Some(Self::CourseCalculated),
            _ => None,
        }
    }
}

impl std::fmt::Display for Certificate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Distance buckets used by the query API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DistanceCategory {
    /// Exactly 10 km
    TenK,
    /// More than 21 km, up to and including 22 km
    HalfMarathon,
    /// At least 42 km, less than 43 km
    Marathon,
}

impl DistanceCategory {
    /// Whether a distance in kilometers belongs to this category
    pub fn contains(&self, km: f64) -> bool {
        match self {
            Self::TenK => km == 10.0,
            Self::HalfMarathon => km > 21.0 && km <= 22.0,
            Self::Marathon => (42.0..43.0).contains(&km),
        }
    }

    /// Create from string (`TEN_K`, `HALF_MARATHON`, `MARATHON`)
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "TEN_K" => Some(Self::TenK),
            "HALF_MARATHON" => Some(Self::HalfMarathon),
            "MARATHON" => Some(Self::Marathon),
            _ => None,
        }
    }
}

/// A persisted event together with the time it was stored
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredEvent {
    #[serde(flatten)]
    pub record: EventRecord,
    pub created_at: DateTime<Utc>,
}

/// Summary of one crawl run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlReport {
    pub seed_year: i32,
    pub events: usize,
    pub canceled: usize,
    pub entry_closed: usize,
    /// Table rows rejected as malformed
    pub skipped: usize,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl CrawlReport {
    /// Build a report from a freshly parsed record set
    pub fn from_records(
        seed_year: i32,
        records: &[EventRecord],
        skipped: usize,
        started_at: DateTime<Utc>,
    ) -> Self {
        Self {
            seed_year,
            events: records.len(),
            canceled: records
                .iter()
                .filter(|r| r.status == EventStatus::CanceledOrPostponed)
                .count(),
            entry_closed: records.iter().filter(|r| r.entry_is_end).count(),
            skipped,
            started_at,
            finished_at: Utc::now(),
        }
    }

    /// Elapsed wall time of the run
    pub fn duration(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }
}

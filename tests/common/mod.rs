//! Common test utilities

use chrono::{NaiveDate, TimeZone, Utc};
use racecal::models::{DistanceEntry, EventRecord, EventStatus, StoredEvent};
use std::fs;

/// Test fixture paths
pub const FIXTURES_DIR: &str = "tests/fixtures/html";

/// Year the contest fixture starts in (November)
#[allow(dead_code)]
pub const FIXTURE_SEED_YEAR: i32 = 2024;

#[allow(dead_code)]
pub fn load_fixture(filename: &str) -> String {
    let path = format!("{FIXTURES_DIR}/{filename}");
    fs::read_to_string(&path).unwrap_or_else(|_| panic!("Failed to load fixture: {path}"))
}

#[allow(dead_code)]
pub fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Create a test event with default values
#[allow(dead_code)]
pub fn create_test_event(name: &str, date: NaiveDate) -> EventRecord {
    EventRecord {
        name: name.to_string(),
        info: None,
        link: None,
        status: EventStatus::Normal,
        certificate: None,
        date,
        time: Some("06:30".to_string()),
        location: Some("臺北市".to_string()),
        distances: vec![DistanceEntry {
            distance: Some(10.0),
            event_price: Some(600),
            event_limit: Some(1000),
            ..Default::default()
        }],
        agent: "主辦單位".to_string(),
        entry_is_end: false,
        entry_start_date: None,
        entry_end_date: None,
    }
}

/// Wrap a record as stored at noon UTC on the given day
#[allow(dead_code)]
pub fn stored_on(record: EventRecord, created: NaiveDate) -> StoredEvent {
    StoredEvent {
        record,
        created_at: Utc.from_utc_datetime(&created.and_hms_opt(12, 0, 0).unwrap()),
    }
}

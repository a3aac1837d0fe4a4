//! Repository Pattern for event persistence
//!
//! This module provides a trait-based repository abstraction to decouple
//! the crawl pipeline and query API from the storage implementation:
//! - SQLite for production
//! - In-memory mock for tests
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │            Crawler (replace_all) / Server (list_all)        │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     EventRepository                         │
//! └─────────────────────────────────────────────────────────────┘
//!                    │                      │
//!                    ▼                      ▼
//!          ┌─────────────────┐    ┌─────────────────┐
//!          │     SQLite      │    │      Mock       │
//!          └─────────────────┘    └─────────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust
//! use racecal::storage::repository::{EventRepository, MockEventRepository};
//!
//! let repo = MockEventRepository::new();
//! repo.replace_all(&[]).unwrap();
//! assert_eq!(repo.count().unwrap(), 0);
//! ```

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, RwLock};

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection};

use crate::models::{Certificate, DistanceEntry, EventRecord, EventStatus, StoredEvent};

// ============================================================================
// Repository Trait
// ============================================================================

/// Storage for the current event set
///
/// The stored set is always the result of exactly one crawl: writes replace
/// everything, never merge.
pub trait EventRepository: Send + Sync {
    /// Delete every stored event and insert `records` in order, atomically
    ///
    /// Returns the number of inserted events.
    fn replace_all(&self, records: &[EventRecord]) -> Result<usize>;

    /// All stored events in insertion order
    fn list_all(&self) -> Result<Vec<StoredEvent>>;

    /// Number of stored events
    fn count(&self) -> Result<usize>;
}

// ============================================================================
// SQLite Implementation
// ============================================================================

/// SQLite implementation of EventRepository
///
/// Uses `Mutex` to ensure thread-safety for the SQLite connection.
pub struct SqliteEventRepository {
    conn: Mutex<Connection>,
}

impl SqliteEventRepository {
    /// Open (or create) a database file
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }

        let conn = Connection::open(path).context("Failed to open SQLite database")?;

        // Enable WAL mode so the API can read during a crawl
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;

        let repo = Self {
            conn: Mutex::new(conn),
        };
        repo.create_schema()?;

        tracing::info!(path = %path.display(), "SQLite event repository initialized");
        Ok(repo)
    }

    /// Create in-memory repository (for testing)
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("Failed to create in-memory SQLite")?;
        let repo = Self {
            conn: Mutex::new(conn),
        };
        repo.create_schema()?;
        Ok(repo)
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| anyhow!("SQLite connection mutex poisoned"))
    }

    fn create_schema(&self) -> Result<()> {
        let conn = self.conn()?;
        conn.execute_batch(
            r#"
                CREATE TABLE IF NOT EXISTS events (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    name TEXT NOT NULL,
                    info TEXT,
                    link TEXT,
                    status TEXT NOT NULL,
                    certificate TEXT,
                    event_date TEXT NOT NULL,
                    event_time TEXT,
                    location TEXT,
                    distances TEXT NOT NULL,
                    agent TEXT NOT NULL,
                    entry_is_end INTEGER NOT NULL,
                    entry_start_date TEXT,
                    entry_end_date TEXT,
                    created_at TEXT NOT NULL
                );

                CREATE INDEX IF NOT EXISTS idx_events_date
                    ON events(event_date);
                "#,
        )
        .context("Failed to create SQLite schema")?;

        Ok(())
    }
}

/// Column values of one `events` row before conversion
struct EventRow {
    name: String,
    info: Option<String>,
    link: Option<String>,
    status: String,
    certificate: Option<String>,
    date: String,
    time: Option<String>,
    location: Option<String>,
    distances: String,
    agent: String,
    entry_is_end: bool,
    entry_start_date: Option<String>,
    entry_end_date: Option<String>,
    created_at: String,
}

impl TryFrom<EventRow> for StoredEvent {
    type Error = anyhow::Error;

    fn try_from(row: EventRow) -> Result<Self> {
        let status = EventStatus::parse(&row.status)
            .with_context(|| format!("Unknown event status '{}'", row.status))?;
        let certificate = row
            .certificate
            .as_deref()
            .map(|c| Certificate::parse(c).with_context(|| format!("Unknown certificate '{c}'")))
            .transpose()?;
        let distances: Vec<DistanceEntry> =
            serde_json::from_str(&row.distances).context("Invalid distances column")?;

        Ok(StoredEvent {
            record: EventRecord {
                name: row.name,
                info: row.info,
                link: row.link,
                status,
                certificate,
                date: parse_date(&row.date)?,
                time: row.time,
                location: row.location,
                distances,
                agent: row.agent,
                entry_is_end: row.entry_is_end,
                entry_start_date: row.entry_start_date.as_deref().map(parse_date).transpose()?,
                entry_end_date: row.entry_end_date.as_deref().map(parse_date).transpose()?,
            },
            created_at: DateTime::parse_from_rfc3339(&row.created_at)
                .with_context(|| format!("Invalid created_at '{}'", row.created_at))?
                .with_timezone(&Utc),
        })
    }
}

fn parse_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .with_context(|| format!("Invalid stored date '{value}'"))
}

impl EventRepository for SqliteEventRepository {
    fn replace_all(&self, records: &[EventRecord]) -> Result<usize> {
        let mut conn = self.conn()?;
        let now = Utc::now().to_rfc3339();

        let tx = conn.transaction().context("Failed to begin transaction")?;
        let removed = tx
            .execute("DELETE FROM events", [])
            .context("Failed to clear events")?;

        {
            let mut stmt = tx
                .prepare(
                    r#"
                    INSERT INTO events (
                        name, info, link, status, certificate, event_date, event_time,
                        location, distances, agent, entry_is_end, entry_start_date,
                        entry_end_date, created_at
                    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)
                    "#,
                )
                .context("Failed to prepare insert")?;

            for record in records {
                let distances = serde_json::to_string(&record.distances)?;
                stmt.execute(params![
                    record.name,
                    record.info,
                    record.link,
                    record.status.as_str(),
                    record.certificate.map(|c| c.as_str()),
                    record.date.to_string(),
                    record.time,
                    record.location,
                    distances,
                    record.agent,
                    record.entry_is_end,
                    record.entry_start_date.map(|d| d.to_string()),
                    record.entry_end_date.map(|d| d.to_string()),
                    now,
                ])
                .with_context(|| format!("Failed to insert event '{}'", record.name))?;
            }
        }

        tx.commit().context("Failed to commit event replacement")?;

        tracing::info!(removed, inserted = records.len(), "Replaced stored events");
        Ok(records.len())
    }

    fn list_all(&self) -> Result<Vec<StoredEvent>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT name, info, link, status, certificate, event_date, event_time, location,
                   distances, agent, entry_is_end, entry_start_date, entry_end_date, created_at
            FROM events ORDER BY id
            "#,
        )?;

        let rows = stmt
            .query_map([], |row| {
                Ok(EventRow {
                    name: row.get(0)?,
                    info: row.get(1)?,
                    link: row.get(2)?,
                    status: row.get(3)?,
                    certificate: row.get(4)?,
                    date: row.get(5)?,
                    time: row.get(6)?,
                    location: row.get(7)?,
                    distances: row.get(8)?,
                    agent: row.get(9)?,
                    entry_is_end: row.get(10)?,
                    entry_start_date: row.get(11)?,
                    entry_end_date: row.get(12)?,
                    created_at: row.get(13)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()
            .context("Failed to read events")?;

        rows.into_iter().map(StoredEvent::try_from).collect()
    }

    fn count(&self) -> Result<usize> {
        let conn = self.conn()?;
        let total: i64 = conn.query_row("SELECT COUNT(*) FROM events", [], |row| row.get(0))?;
        Ok(usize::try_from(total).unwrap_or_default())
    }
}

// ============================================================================
// Mock Implementation (for testing)
// ============================================================================

/// In-memory mock implementation of EventRepository
pub struct MockEventRepository {
    events: RwLock<Vec<StoredEvent>>,
}

impl MockEventRepository {
    /// Create a new mock repository
    pub fn new() -> Self {
        Self {
            events: RwLock::new(Vec::new()),
        }
    }

    /// Create a mock already holding `events`
    pub fn with_events(events: Vec<StoredEvent>) -> Self {
        Self {
            events: RwLock::new(events),
        }
    }
}

impl Default for MockEventRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl EventRepository for MockEventRepository {
    fn replace_all(&self, records: &[EventRecord]) -> Result<usize> {
        let now = Utc::now();
        let mut events = self
            .events
            .write()
            .map_err(|_| anyhow!("event store lock poisoned"))?;
        *events = records
            .iter()
            .cloned()
            .map(|record| StoredEvent {
                record,
                created_at: now,
            })
            .collect();
        Ok(events.len())
    }

    fn list_all(&self) -> Result<Vec<StoredEvent>> {
        let events = self
            .events
            .read()
            .map_err(|_| anyhow!("event store lock poisoned"))?;
        Ok(events.clone())
    }

    fn count(&self) -> Result<usize> {
        let events = self
            .events
            .read()
            .map_err(|_| anyhow!("event store lock poisoned"))?;
        Ok(events.len())
    }
}

// ============================================================================
// Shared Repository Types
// ============================================================================

/// Thread-safe shared repository wrapper
pub type SharedEventRepository = Arc<dyn EventRepository>;

/// Create a shared SQLite repository
pub fn create_sqlite_repository(path: impl AsRef<Path>) -> Result<SharedEventRepository> {
    let repo = SqliteEventRepository::new(path)?;
    Ok(Arc::new(repo))
}

/// Create a shared mock repository
pub fn create_mock_repository() -> SharedEventRepository {
    Arc::new(MockEventRepository::new())
}

// ============================================================================
// Tests
// ============================================================================

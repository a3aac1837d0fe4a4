//! Event persistence
//!
//! The stored event set is replaced wholesale by every successful crawl.
//! See [`repository`] for the trait and its SQLite and in-memory
//! implementations.

pub mod repository;

pub use repository::{
    create_mock_repository, create_sqlite_repository, EventRepository, MockEventRepository,
    SharedEventRepository, SqliteEventRepository,
};

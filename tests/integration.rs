//! Integration tests entry point
//!
//! This file serves as the entry point for all integration tests.
//! It includes the integration_tests module which contains:
//! - Crawl pipeline tests (fetch, parse, store, query)
//! - Error scenario tests

mod integration_tests;

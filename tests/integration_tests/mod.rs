//! Integration tests module
//!
//! End-to-end tests for the racecal crawler and query API:
//! - Complete fetch → parse → store → query pipeline
//! - Failure handling that must leave stored events untouched

pub mod error_scenarios;
pub mod fixtures;
pub mod pipeline_test;

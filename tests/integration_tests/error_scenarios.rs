//! Error scenario integration tests
//!
//! Every failed crawl must leave the previously stored events in place:
//! 1. Server errors after retries
//! 2. Non-retryable HTTP status
//! 3. Page without the contest table
//!
//! A malformed row inside an otherwise valid table is skipped instead.

use racecal::error::{ErrorCategory, RacecalErrorTrait};
use racecal::utils::error::{CrawlerError, FetchError, ParseError};
use wiremock::MockServer;

use super::fixtures::{
    crawler, mount_page, temp_repository, CONTEST_EVENTS, CONTEST_HTML, MAINTENANCE_HTML,
    SEED_YEAR,
};

/// Crawl the full fixture into a fresh repository, then crawl `body` with
/// `status` and return the second crawl's error
async fn failing_recrawl(
    status: u16,
    body: &str,
) -> (CrawlerError, racecal::storage::SharedEventRepository, tempfile::TempDir) {
    let good_server = MockServer::start().await;
    mount_page(&good_server, 200, CONTEST_HTML).await;

    let (temp_dir, repository) = temp_repository();
    crawler(&good_server, repository.clone(), 0)
        .run_with_seed_year(SEED_YEAR)
        .await
        .unwrap();

    let bad_server = MockServer::start().await;
    mount_page(&bad_server, status, body).await;
    let err = crawler(&bad_server, repository.clone(), 2)
        .run_with_seed_year(SEED_YEAR)
        .await
        .unwrap_err();

    (err, repository, temp_dir)
}

// ============================================================================
// Network Error Tests
// ============================================================================

#[tokio::test]
async fn test_server_error_keeps_events() {
    let (err, repository, _temp_dir) = failing_recrawl(503, "Service Unavailable").await;

    assert!(matches!(
        err,
        CrawlerError::Fetch(FetchError::MaxRetriesExceeded)
    ));
    assert_eq!(err.category(), ErrorCategory::Network);
    assert!(err.is_recoverable());
    assert_eq!(repository.count().unwrap(), CONTEST_EVENTS);
}

#[tokio::test]
async fn test_not_found_keeps_events() {
    let (err, repository, _temp_dir) = failing_recrawl(404, "Not Found").await;

    assert!(matches!(err, CrawlerError::Fetch(FetchError::ServerError(404))));
    assert!(!err.is_recoverable());
    assert_eq!(repository.count().unwrap(), CONTEST_EVENTS);
}

// ============================================================================
// Structural Failure Tests
// ============================================================================

#[tokio::test]
async fn test_missing_table_keeps_events() {
    let (err, repository, _temp_dir) = failing_recrawl(200, MAINTENANCE_HTML).await;

    assert!(matches!(err, CrawlerError::Parse(ParseError::TableNotFound)));
    assert_eq!(err.category(), ErrorCategory::Parsing);
    assert!(!err.is_recoverable());

    let stored = repository.list_all().unwrap();
    assert_eq!(stored.len(), CONTEST_EVENTS);
    assert_eq!(stored[0].record.name, "2024新北市萬金石馬拉松");
}

#[tokio::test]
async fn test_malformed_row_is_skipped() {
    let broken = CONTEST_HTML.replacen("<td>雙溪區公所</td>", "", 1);
    let mock_server = MockServer::start().await;
    mount_page(&mock_server, 200, &broken).await;

    let (_temp_dir, repository) = temp_repository();
    let report = crawler(&mock_server, repository.clone(), 0)
        .run_with_seed_year(SEED_YEAR)
        .await
        .unwrap();

    assert_eq!(report.events, CONTEST_EVENTS - 1);
    assert_eq!(report.skipped, 1);

    let stored = repository.list_all().unwrap();
    assert_eq!(stored.len(), CONTEST_EVENTS - 1);
    assert!(stored.iter().all(|e| e.record.name != "雙溪山城路跑"));
}

#[tokio::test]
async fn test_first_crawl_failure_leaves_store_empty() {
    let mock_server = MockServer::start().await;
    mount_page(&mock_server, 200, MAINTENANCE_HTML).await;

    let (_temp_dir, repository) = temp_repository();
    let result = crawler(&mock_server, repository.clone(), 0)
        .run_with_seed_year(SEED_YEAR)
        .await;

    assert!(result.is_err());
    assert_eq!(repository.count().unwrap(), 0);
}

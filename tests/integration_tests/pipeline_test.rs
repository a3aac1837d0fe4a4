//! End-to-end pipeline integration tests
//!
//! Tests the complete workflow:
//! 1. HTTP fetch (mocked)
//! 2. Contest table parsing
//! 3. Event storage (SQLite)
//! 4. Querying through the HTTP API

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use racecal::models::EventStatus;
use racecal::server::{create_router, AppState};
use racecal::storage::SharedEventRepository;
use tower::ServiceExt;
use wiremock::MockServer;

use super::fixtures::{
    crawler, mount_page, temp_repository, CONTEST_EVENTS, CONTEST_HTML, SEED_YEAR,
    SINGLE_EVENT_HTML,
};

async fn crawled_repository() -> (tempfile::TempDir, SharedEventRepository) {
    let mock_server = MockServer::start().await;
    mount_page(&mock_server, 200, CONTEST_HTML).await;

    let (temp_dir, repository) = temp_repository();
    crawler(&mock_server, repository.clone(), 0)
        .run_with_seed_year(SEED_YEAR)
        .await
        .unwrap();

    (temp_dir, repository)
}

async fn query_names(repository: &SharedEventRepository, query: &str) -> Vec<String> {
    let (status, body) = get_json(repository, &format!("/events{query}")).await;
    assert_eq!(status, StatusCode::OK, "{query}: {body}");

    body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["name"].as_str().unwrap().to_string())
        .collect()
}

async fn get_json(repository: &SharedEventRepository, uri: &str) -> (StatusCode, serde_json::Value) {
    let router = create_router(AppState::new(repository.clone(), 8).unwrap());
    let response = router
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&body).unwrap())
}

// ============================================================================
// Complete Pipeline Tests
// ============================================================================

#[tokio::test]
async fn test_crawl_stores_every_event() {
    let mock_server = MockServer::start().await;
    mount_page(&mock_server, 200, CONTEST_HTML).await;

    let (_temp_dir, repository) = temp_repository();
    let report = crawler(&mock_server, repository.clone(), 0)
        .run_with_seed_year(SEED_YEAR)
        .await
        .unwrap();

    assert_eq!(report.seed_year, SEED_YEAR);
    assert_eq!(report.events, CONTEST_EVENTS);
    assert_eq!(report.canceled, 1);
    assert_eq!(report.entry_closed, 1);
    assert_eq!(report.skipped, 0);

    let stored = repository.list_all().unwrap();
    assert_eq!(stored.len(), CONTEST_EVENTS);
    assert_eq!(stored[0].record.name, "2024新北市萬金石馬拉松");
    assert_eq!(stored[1].record.status, EventStatus::CanceledOrPostponed);
    assert_eq!(stored[5].record.name, "春節健走");
    assert!(stored.iter().all(|e| e.created_at >= report.started_at));
}

#[tokio::test]
async fn test_second_crawl_replaces_events() {
    let (_temp_dir, repository) = crawled_repository().await;
    assert_eq!(repository.count().unwrap(), CONTEST_EVENTS);

    let next_server = MockServer::start().await;
    mount_page(&next_server, 200, SINGLE_EVENT_HTML).await;
    let report = crawler(&next_server, repository.clone(), 0)
        .run_with_seed_year(2025)
        .await
        .unwrap();

    assert_eq!(report.events, 1);
    let stored = repository.list_all().unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].record.name, "春季路跑");
    assert_eq!(stored[0].record.info.as_deref(), Some("迎春組"));
    assert_eq!(
        stored[0].record.date,
        chrono::NaiveDate::from_ymd_opt(2025, 3, 16).unwrap()
    );
}

// ============================================================================
// Query API Tests
// ============================================================================

#[tokio::test]
async fn test_query_all_sorted_by_date() {
    let (_temp_dir, repository) = crawled_repository().await;

    let names = query_names(&repository, "").await;
    assert_eq!(
        names,
        vec![
            "2024新北市萬金石馬拉松",
            "雙溪山城路跑",
            "臺北馬拉松",
            "金門馬拉松",
            "冬季路跑",
            "春節健走",
        ]
    );
}

#[tokio::test]
async fn test_query_by_distance() {
    let (_temp_dir, repository) = crawled_repository().await;

    assert_eq!(
        query_names(&repository, "?distances=MARATHON").await,
        vec!["2024新北市萬金石馬拉松", "臺北馬拉松", "金門馬拉松"]
    );
    assert_eq!(
        query_names(&repository, "?distances=TEN_K,HALF_MARATHON").await,
        vec!["2024新北市萬金石馬拉松", "雙溪山城路跑", "臺北馬拉松"]
    );
}

#[tokio::test]
async fn test_query_by_date_range_and_keyword() {
    let (_temp_dir, repository) = crawled_repository().await;

    assert_eq!(
        query_names(&repository, "?dateRange=2025-01-01,2025-01-31").await,
        vec!["金門馬拉松", "冬季路跑"]
    );

    let keyword: String = url::form_urlencoded::byte_serialize("新北市".as_bytes()).collect();
    assert_eq!(
        query_names(&repository, &format!("?keywords={keyword}")).await,
        vec!["2024新北市萬金石馬拉松", "雙溪山城路跑"]
    );
}

#[tokio::test]
async fn test_query_entry_filters_and_sort() {
    let (_temp_dir, repository) = crawled_repository().await;

    assert_eq!(
        query_names(&repository, "?entryIsEnd=true").await,
        vec!["2024新北市萬金石馬拉松"]
    );
    assert_eq!(
        query_names(&repository, "?entryEndDates=2024-09-01,2024-12-31").await,
        vec!["雙溪山城路跑", "臺北馬拉松"]
    );
    assert_eq!(
        query_names(&repository, "?sortBy=entryEndDate&orderBy=desc").await,
        vec![
            "冬季路跑",
            "金門馬拉松",
            "雙溪山城路跑",
            "臺北馬拉松",
            "2024新北市萬金石馬拉松",
            "春節健走",
        ]
    );
}

#[tokio::test]
async fn test_query_pagination() {
    let (_temp_dir, repository) = crawled_repository().await;

    assert_eq!(
        query_names(&repository, "?offset=2&limit=2").await,
        vec!["臺北馬拉松", "金門馬拉松"]
    );
    assert!(query_names(&repository, "?offset=10&limit=5")
        .await
        .is_empty());
}

#[tokio::test]
async fn test_query_rejects_bad_parameters() {
    let (_temp_dir, repository) = crawled_repository().await;

    for query in [
        "?distances=ULTRA",
        "?dateRange=2025/01/01",
        "?dateRange=2025-01-01,2025-02-01,2025-03-01",
        "?sortBy=name",
        "?limit=5",
    ] {
        let (status, body) = get_json(&repository, &format!("/events{query}")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{query}");
        assert_eq!(body["success"], false, "{query}");
        assert!(body["error"].is_string(), "{query}");
    }
}

#[tokio::test]
async fn test_health_reports_event_count() {
    let (_temp_dir, repository) = crawled_repository().await;

    let (status, body) = get_json(&repository, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "healthy");
    assert_eq!(body["data"]["events"], CONTEST_EVENTS);
}

//! Test fixtures for integration tests
//!
//! Provides sample contest pages and helper functions for testing

use racecal::crawler::{ContestFetcher, Crawler};
use racecal::storage::{create_sqlite_repository, SharedEventRepository};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// The full contest page fixture (Nov through Feb, six events)
pub const CONTEST_HTML: &str = include_str!("../fixtures/html/contest.html");

/// Year the contest fixture starts in
pub const SEED_YEAR: i32 = 2024;

/// Number of events in [`CONTEST_HTML`]
pub const CONTEST_EVENTS: usize = 6;

/// A contest page with a single event, for checking replacement
pub const SINGLE_EVENT_HTML: &str = r#"
<html><body>
<table class="gridview">
  <tr><th>月份</th><th>賽事名稱</th><th>認證</th><th>日期</th><th>地點</th><th>項目</th><th>主辦單位</th><th>報名期間</th></tr>
  <tr>
    <td><span>3月</span></td>
    <td><a href="https://www.example.tw/spring">春季路跑（迎春組）</a></td>
    <td></td>
    <td>03/16 (日) 06:00</td>
    <td>臺中市 西屯區</td>
    <td><button title="報名費：500<br/>名額：2000">10K</button></td>
    <td>臺中市體育總會</td>
    <td>01月10日~02月28日</td>
  </tr>
</table>
</body></html>
"#;

/// Maintenance page served while the site is down
pub const MAINTENANCE_HTML: &str = r#"
<html><body><h1>系統維護中</h1><p>請稍後再試</p></body></html>
"#;

/// Page path used on the mock server
pub const PAGE_PATH: &str = "/contest/contest.aspx";

/// Mount a page that is served for every request
pub async fn mount_page(server: &MockServer, status: u16, body: &str) {
    Mock::given(method("GET"))
        .and(path(PAGE_PATH))
        .respond_with(
            ResponseTemplate::new(status)
                .insert_header("content-type", "text/html; charset=utf-8")
                .set_body_string(body),
        )
        .mount(server)
        .await;
}

/// Fetcher pointed at the mock server with fast retries
pub fn mock_fetcher(server: &MockServer, max_retries: u32) -> ContestFetcher {
    ContestFetcher::with_config(
        &format!("{}{PAGE_PATH}", server.uri()),
        max_retries,
        Duration::from_secs(5),
    )
    .unwrap()
    .with_base_delay(Duration::from_millis(5))
}

/// SQLite repository in a fresh temporary directory
pub fn temp_repository() -> (TempDir, SharedEventRepository) {
    let temp_dir = TempDir::new().unwrap();
    let repository = create_sqlite_repository(temp_dir.path().join("events.db")).unwrap();
    (temp_dir, repository)
}

/// Crawler for the mock server writing to `repository`
pub fn crawler(
    server: &MockServer,
    repository: SharedEventRepository,
    max_retries: u32,
) -> Crawler {
    Crawler::new(Arc::new(mock_fetcher(server, max_retries)), repository, 8).unwrap()
}

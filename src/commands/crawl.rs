use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;

use racecal::config::Config;
use racecal::crawler::{fixed_offset, ContestFetcher, Crawler};
use racecal::models::CrawlReport;
use racecal::parser::scan_events;
use racecal::query::{EventQuery, EventQueryParams};
use racecal::storage::{create_mock_repository, create_sqlite_repository};

pub async fn crawl(config: &Config, dry_run: bool) -> Result<()> {
    println!("Starting Contest Crawl");
    println!("======================");
    println!("Source: {}", config.source.url);

    let fetcher = Arc::new(ContestFetcher::from_config(&config.source)?);
    let repository = if dry_run {
        create_mock_repository()
    } else {
        create_sqlite_repository(&config.database.sqlite_path)?
    };

    let crawler = Crawler::new(fetcher, repository, config.schedule.utc_offset_hours)?;
    let report = crawler.run().await?;
    print_report(&report);

    if dry_run {
        let events = crawler.repository().list_all()?;
        println!("{}", serde_json::to_string_pretty(&events)?);
    } else {
        println!("Database: {}", config.database.sqlite_path.display());
    }

    Ok(())
}

pub fn parse(html_file: &Path, year: i32) -> Result<()> {
    let html = std::fs::read_to_string(html_file)
        .with_context(|| format!("Failed to read {}", html_file.display()))?;

    let scan = scan_events(&html, year)?;
    tracing::info!(
        events = scan.records.len(),
        skipped = scan.skipped.len(),
        "Parsed saved contest page"
    );
    println!("{}", serde_json::to_string_pretty(&scan.records)?);

    Ok(())
}

pub fn events(config: &Config, query: &str) -> Result<()> {
    let params = query_params(query)?;
    let query = EventQuery::from_params(&params)?;

    let offset = fixed_offset(config.schedule.utc_offset_hours)
        .context("Invalid UTC offset in configuration")?;
    let repository = create_sqlite_repository(&config.database.sqlite_path)?;
    let events = query.apply(repository.list_all()?, chrono::Utc::now().with_timezone(&offset));

    println!("{}", serde_json::to_string_pretty(&events)?);
    Ok(())
}

/// Decode a `key=value&...` string into the HTTP query parameters
fn query_params(query: &str) -> Result<EventQueryParams> {
    let map: serde_json::Map<String, serde_json::Value> =
        url::form_urlencoded::parse(query.trim_start_matches('?').as_bytes())
            .map(|(k, v)| (k.into_owned(), serde_json::Value::String(v.into_owned())))
            .collect();

    serde_json::from_value(serde_json::Value::Object(map)).context("Invalid query string")
}

fn print_report(report: &CrawlReport) {
    println!("\nCrawl Summary");
    println!("=============");
    println!("Seed year: {}", report.seed_year);
    println!("Events: {}", report.events);
    println!("Canceled or postponed: {}", report.canceled);
    println!("Entry closed: {}", report.entry_closed);
    println!("Skipped rows: {}", report.skipped);
    println!("Duration: {}ms", report.duration().num_milliseconds());
}

use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::sync::watch;

use racecal::config::Config;
use racecal::crawler::{ContestFetcher, Crawler};
use racecal::scheduler::{CrawlSchedule, CrawlScheduler};
use racecal::server::{self, AppState};
use racecal::storage::create_sqlite_repository;

/// Serve the event API, crawling on schedule until Ctrl+C
pub async fn serve(config: Config, with_scheduler: bool) -> Result<()> {
    let repository = create_sqlite_repository(&config.database.sqlite_path)?;
    let state = AppState::new(repository.clone(), config.schedule.utc_offset_hours)?;
    let bind_address = config.bind_address();

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                tracing::info!("Shutdown signal received");
            }
            Err(e) => {
                tracing::error!("Failed to wait for Ctrl+C: {}", e);
            }
        }
        let _ = shutdown_tx.send(true);
    });

    let scheduler_handle = if with_scheduler {
        let fetcher = Arc::new(ContestFetcher::from_config(&config.source)?);
        let crawler = Crawler::new(fetcher, repository, config.schedule.utc_offset_hours)?;
        let schedule =
            CrawlSchedule::from_config(&config.schedule).context("Invalid crawl schedule")?;
        let scheduler = Arc::new(CrawlScheduler::new(schedule, Arc::new(crawler)));

        println!(
            "Crawl schedule: hours {:?} at UTC{:+}",
            config.schedule.hours, config.schedule.utc_offset_hours
        );
        let rx = shutdown_rx.clone();
        Some(tokio::spawn(async move {
            scheduler.run_until(wait_for_shutdown(rx)).await;
        }))
    } else {
        None
    };

    println!("Event API endpoints:");
    println!("  GET  /health  - Health check");
    println!("  GET  /events  - Query events");
    println!();
    println!("Event API listening on http://{bind_address}");
    println!("Press Ctrl+C to stop.\n");

    server::serve(&bind_address, state, wait_for_shutdown(shutdown_rx)).await?;

    if let Some(handle) = scheduler_handle {
        handle.await.context("Crawl scheduler task panicked")?;
    }

    println!("Event API stopped.");
    Ok(())
}

async fn wait_for_shutdown(mut rx: watch::Receiver<bool>) {
    // A dropped sender also means shutdown
    let _ = rx.wait_for(|stop| *stop).await;
}

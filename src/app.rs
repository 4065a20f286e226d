use std::sync::Arc;

use tracing::info;

use crate::config::Config;
use crate::db;
use crate::error::Result;
use crate::notifier::TelegramNotifier;
use crate::providers::YahooClient;
use crate::tracker::{RunSummary, Tracker};

pub async fn run(config: Config) -> Result<RunSummary> {
    info!("💰 Wealth tracker started");
    info!("================================");
    info!("Watchlist: {:?}", config.watchlist);

    let store = db::connect(&config.storage, config.request_timeout).await?;
    store.initialize().await?;

    let source = Arc::new(YahooClient::new(config.request_timeout)?);
    let notifier = Arc::new(TelegramNotifier::new(config.telegram.clone(), config.request_timeout)?);

    let tracker = Tracker::new(source, store, notifier);
    let summary = tracker.run(&config.watchlist).await;

    info!(
        "Run finished: {} tracked, {} failed",
        summary.succeeded(),
        summary.failed()
    );

    Ok(summary)
}

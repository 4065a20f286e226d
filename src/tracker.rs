//! Fetch -> store -> report pipeline over the watchlist.

use std::sync::Arc;

use chrono::{Local, NaiveDate};
use tracing::{error, info};

use crate::currency::{self, Currency};
use crate::db::{PriceStore, UpsertOutcome};
use crate::notifier::NotificationSink;
use crate::providers::{PriceSource, Quote};
use crate::utils::retry::RetryPolicy;

#[derive(Debug, Clone, PartialEq)]
pub enum AssetStatus {
    Created(Quote),
    /// The (trading date, asset) row already existed and was refreshed.
    Refreshed(Quote),
    FetchFailed,
    StoreFailed(Quote),
}

#[derive(Debug, Clone, PartialEq)]
pub struct AssetReport {
    pub asset_name: String,
    pub currency: Currency,
    pub status: AssetStatus,
}

impl AssetReport {
    pub fn is_success(&self) -> bool {
        matches!(self.status, AssetStatus::Created(_) | AssetStatus::Refreshed(_))
    }

    /// One line of the operator summary.
    pub fn line(&self) -> String {
        match &self.status {
            AssetStatus::Created(quote) => format!(
                "✅ {}: {} created",
                self.asset_name,
                self.currency.format(quote.price)
            ),
            AssetStatus::Refreshed(quote) => format!(
                "ℹ️ {}: {} already tracked",
                self.asset_name,
                self.currency.format(quote.price)
            ),
            AssetStatus::FetchFailed => format!("❌ {}: fetch failed", self.asset_name),
            AssetStatus::StoreFailed(_) => format!("❌ {}: store failed", self.asset_name),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub run_date: NaiveDate,
    pub reports: Vec<AssetReport>,
}

impl RunSummary {
    pub fn succeeded(&self) -> usize {
        self.reports.iter().filter(|r| r.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.reports.len() - self.succeeded()
    }

    /// Notification text, or `None` when nothing was tracked.
    pub fn message(&self) -> Option<String> {
        if self.reports.is_empty() {
            return None;
        }

        let lines: Vec<String> = self.reports.iter().map(AssetReport::line).collect();
        Some(format!(
            "💰 Daily Stocks Price for {}:\n\n{}",
            self.run_date.format("%d/%m/%Y"),
            lines.join("\n")
        ))
    }
}

pub struct Tracker {
    source: Arc<dyn PriceSource>,
    store: Arc<dyn PriceStore>,
    notifier: Arc<dyn NotificationSink>,
    retry: RetryPolicy,
}

impl Tracker {
    pub fn new(
        source: Arc<dyn PriceSource>,
        store: Arc<dyn PriceStore>,
        notifier: Arc<dyn NotificationSink>,
    ) -> Self {
        Self {
            source,
            store,
            notifier,
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Tracks every asset in turn, then sends one summary. An empty
    /// watchlist touches neither the store nor the notifier.
    pub async fn run(&self, watchlist: &[String]) -> RunSummary {
        let run_date = Local::now().date_naive();
        let mut reports = Vec::with_capacity(watchlist.len());

        for asset_name in watchlist.iter().map(|s| s.trim()).filter(|s| !s.is_empty()) {
            reports.push(self.track_asset(asset_name).await);
        }

        let summary = RunSummary { run_date, reports };

        match summary.message() {
            Some(message) => self.notifier.notify(&message).await,
            None => info!("Watchlist is empty, no summary sent"),
        }

        summary
    }

    pub async fn track_asset(&self, asset_name: &str) -> AssetReport {
        let currency = currency::for_asset(asset_name);
        let report = |status| AssetReport {
            asset_name: asset_name.to_string(),
            currency,
            status,
        };

        let fetched = self
            .retry
            .run(&format!("fetch {}", asset_name), |_| self.source.fetch(asset_name))
            .await;

        let quote = match fetched {
            Ok(quote) if quote.is_usable() => quote,
            Ok(quote) => {
                error!("❌ Fetch FAILED for {}: unusable price {}", asset_name, quote.price);
                return report(AssetStatus::FetchFailed);
            }
            Err(e) => {
                error!("❌ Fetch FAILED for {}: {}", asset_name, e);
                return report(AssetStatus::FetchFailed);
            }
        };

        let stored = self
            .retry
            .run(&format!("store {}", asset_name), |_| {
                self.store
                    .upsert(quote.trading_date, asset_name, quote.price, currency.code)
            })
            .await;

        match stored {
            Ok(UpsertOutcome::Created) => {
                info!(
                    "✅ Saved {} for {}: {}",
                    asset_name,
                    quote.trading_date,
                    currency.format(quote.price)
                );
                report(AssetStatus::Created(quote))
            }
            Ok(UpsertOutcome::Refreshed) => {
                info!(
                    "ℹ️ {} already tracked for {}, price refreshed to {}",
                    asset_name,
                    quote.trading_date,
                    currency.format(quote.price)
                );
                report(AssetStatus::Refreshed(quote))
            }
            Err(e) => {
                error!("❌ Database FAILED for {}: {}", asset_name, e);
                report(AssetStatus::StoreFailed(quote))
            }
        }
    }
}

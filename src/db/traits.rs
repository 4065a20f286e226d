use std::cmp::Ordering;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceRecord {
    pub date: NaiveDate,
    pub asset_name: String,
    pub price: f64,
    pub currency: String,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    /// No row existed for (date, asset_name).
    Created,
    /// An existing row had its price and timestamp refreshed.
    Refreshed,
}

/// Durable (date, asset_name) -> price storage.
///
/// Implementations must keep at most one row per (date, asset_name) and
/// return `fetch_all` newest date first, ties ordered by asset name.
#[async_trait]
pub trait PriceStore: Send + Sync {
    /// Prepares the backend. Safe to call on every start, from several
    /// processes at once.
    async fn initialize(&self) -> Result<()>;

    async fn upsert(
        &self,
        date: NaiveDate,
        asset_name: &str,
        price: f64,
        currency: &str,
    ) -> Result<UpsertOutcome>;

    async fn fetch_all(&self) -> Result<Vec<PriceRecord>>;
}

pub(crate) fn newest_first(a: &PriceRecord, b: &PriceRecord) -> Ordering {
    b.date
        .cmp(&a.date)
        .then_with(|| a.asset_name.cmp(&b.asset_name))
}

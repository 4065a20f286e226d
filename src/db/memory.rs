use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use crate::db::traits::{newest_first, PriceRecord, PriceStore, UpsertOutcome};
use crate::error::Result;

/// Non-durable store with the same keying rules as the real backends.
#[derive(Default)]
pub struct MemoryStore {
    records: DashMap<(NaiveDate, String), PriceRecord>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[async_trait]
impl PriceStore for MemoryStore {
    async fn initialize(&self) -> Result<()> {
        Ok(())
    }

    async fn upsert(
        &self,
        date: NaiveDate,
        asset_name: &str,
        price: f64,
        currency: &str,
    ) -> Result<UpsertOutcome> {
        let now = Utc::now();

        match self.records.entry((date, asset_name.to_string())) {
            Entry::Occupied(mut entry) => {
                let record = entry.get_mut();
                record.price = price;
                record.updated_at = now;
                Ok(UpsertOutcome::Refreshed)
            }
            Entry::Vacant(entry) => {
                entry.insert(PriceRecord {
                    date,
                    asset_name: asset_name.to_string(),
                    price,
                    currency: currency.to_string(),
                    updated_at: now,
                });
                Ok(UpsertOutcome::Created)
            }
        }
    }

    async fn fetch_all(&self) -> Result<Vec<PriceRecord>> {
        let mut records: Vec<PriceRecord> = self
            .records
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        records.sort_by(newest_first);
        Ok(records)
    }
}

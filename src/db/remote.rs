//! Supabase (PostgREST) backend.
//!
//! The table is provisioned outside this crate and must carry the same
//! composite key as the embedded backend, otherwise `on_conflict` has nothing
//! to merge against and every run appends a duplicate row:
//!
//! ```sql
//! create table assetprice (
//!     date        date             not null,
//!     asset_name  text collate "C" not null,
//!     price       double precision not null,
//!     currency    char(3)          not null,
//!     updated_at  timestamptz      not null default now(),
//!     primary key (date, asset_name)
//! );
//! ```
//!
//! `collate "C"` keeps the `asset_name` tie-break in byte order, which is how
//! SQLite compares text.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::{Client as HttpClient, RequestBuilder, Response};
use tracing::debug;
use url::Url;

use crate::config::SupabaseConfig;
use crate::db::traits::{PriceRecord, PriceStore, UpsertOutcome};
use crate::error::{Error, Result};

/// Rows requested per page. The server may return fewer when its own
/// `max_rows` is lower, so only an empty page ends the read.
const PAGE_SIZE: usize = 1000;

pub struct RemoteStore {
    http: HttpClient,
    endpoint: Url,
}

impl RemoteStore {
    pub fn new(config: &SupabaseConfig, timeout: Duration) -> Result<Self> {
        let mut base = config.url.clone();
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let endpoint = base.join(&format!("rest/v1/{}", config.table))?;

        let mut headers = HeaderMap::new();
        headers.insert("apikey", header_value(&config.api_key)?);
        headers.insert(AUTHORIZATION, header_value(&format!("Bearer {}", config.api_key))?);

        let http = HttpClient::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()?;

        Ok(Self { http, endpoint })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    async fn send(request: RequestBuilder) -> Result<Response> {
        let resp = request.send().await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Database(format!("Supabase HTTP {}: {}", status, body)));
        }

        Ok(resp)
    }

    async fn exists(&self, date: NaiveDate, asset_name: &str) -> Result<bool> {
        let request = self.http.get(self.endpoint.clone()).query(&[
            ("select", "date".to_string()),
            ("date", format!("eq.{}", date)),
            ("asset_name", format!("eq.{}", asset_name)),
        ]);

        let rows: Vec<serde_json::Value> = Self::send(request).await?.json().await?;
        Ok(!rows.is_empty())
    }
}

fn header_value(value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value)
        .map_err(|e| Error::Config(format!("Invalid Supabase API key: {}", e)))
}

#[async_trait]
impl PriceStore for RemoteStore {
    /// The remote table is provisioned ahead of time.
    async fn initialize(&self) -> Result<()> {
        debug!("Remote store at {}, nothing to initialize", self.endpoint);
        Ok(())
    }

    async fn upsert(
        &self,
        date: NaiveDate,
        asset_name: &str,
        price: f64,
        currency: &str,
    ) -> Result<UpsertOutcome> {
        let existed = self.exists(date, asset_name).await?;

        let row = PriceRecord {
            date,
            asset_name: asset_name.to_string(),
            price,
            currency: currency.to_string(),
            updated_at: Utc::now(),
        };

        let request = self
            .http
            .post(self.endpoint.clone())
            .query(&[("on_conflict", "date,asset_name")])
            .header("Prefer", "resolution=merge-duplicates,return=minimal")
            .json(&[row]);

        Self::send(request).await?;

        Ok(if existed {
            UpsertOutcome::Refreshed
        } else {
            UpsertOutcome::Created
        })
    }

    async fn fetch_all(&self) -> Result<Vec<PriceRecord>> {
        let mut records = Vec::new();

        loop {
            let request = self.http.get(self.endpoint.clone()).query(&[
                ("select", "*".to_string()),
                ("order", "date.desc,asset_name.asc".to_string()),
                ("limit", PAGE_SIZE.to_string()),
                ("offset", records.len().to_string()),
            ]);

            let page: Vec<PriceRecord> = Self::send(request).await?.json().await?;
            if page.is_empty() {
                break;
            }
            records.extend(page);
        }

        Ok(records)
    }
}

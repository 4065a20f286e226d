//! Yahoo Finance chart client

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, NaiveDate};
use chrono_tz::Tz;
use reqwest::{Client as HttpClient, StatusCode};
use tracing::debug;

use super::models::{ChartMeta, ChartResponse};
use crate::constants::{USER_AGENT, YAHOO_CHART_URL};
use crate::error::{Error, Result};
use crate::providers::traits::{Listing, PriceSource, Quote};

pub struct YahooClient {
    http: HttpClient,
    base_url: String,
}

impl YahooClient {
    /// Every request is bounded by `timeout`.
    pub fn new(timeout: Duration) -> Result<Self> {
        Self::with_base_url(YAHOO_CHART_URL, timeout)
    }

    pub fn with_base_url(base_url: &str, timeout: Duration) -> Result<Self> {
        let http = HttpClient::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Name, currency and last price for one ticker. Unknown symbols are
    /// `Error::Fetch`.
    pub async fn lookup(&self, symbol: &str) -> Result<Listing> {
        let listing = listing_from_chart(symbol, self.chart(symbol).await?)?;

        debug!("{} listing: {:?}", symbol, listing);
        Ok(listing)
    }

    async fn chart(&self, symbol: &str) -> Result<ChartResponse> {
        let url = format!("{}/v8/finance/chart/{}", self.base_url, symbol);

        let resp = self
            .http
            .get(&url)
            .query(&[("range", "5d"), ("interval", "1d")])
            .send()
            .await?;

        // Yahoo answers unknown symbols with 404 and a chart.error body
        if !resp.status().is_success() && resp.status() != StatusCode::NOT_FOUND {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Http(format!("HTTP {}: {}", status, body)));
        }

        Ok(resp.json().await?)
    }
}

#[async_trait]
impl PriceSource for YahooClient {
    async fn fetch(&self, symbol: &str) -> Result<Quote> {
        let quote = quote_from_chart(symbol, self.chart(symbol).await?)?;

        debug!("{} quote: {} on {}", symbol, quote.price, quote.trading_date);
        Ok(quote)
    }
}

pub fn quote_from_chart(symbol: &str, body: ChartResponse) -> Result<Quote> {
    let meta = chart_meta(symbol, body)?;

    let price = meta
        .regular_market_price
        .ok_or_else(|| Error::Fetch(format!("{}: missing regularMarketPrice", symbol)))?;

    let trading_date = trading_date(&meta)
        .ok_or_else(|| Error::Fetch(format!("{}: missing regularMarketTime", symbol)))?;

    Ok(Quote { price, trading_date })
}

pub fn listing_from_chart(symbol: &str, body: ChartResponse) -> Result<Listing> {
    let meta = chart_meta(symbol, body)?;

    let price = meta
        .regular_market_price
        .ok_or_else(|| Error::Fetch(format!("{}: missing regularMarketPrice", symbol)))?;

    Ok(Listing {
        symbol: meta.symbol.unwrap_or_else(|| symbol.to_string()),
        long_name: meta.long_name,
        currency: meta.currency,
        price,
    })
}

fn chart_meta(symbol: &str, body: ChartResponse) -> Result<ChartMeta> {
    if let Some(err) = body.chart.error {
        return Err(Error::Fetch(format!(
            "{}: {}",
            symbol,
            err.description.or(err.code).unwrap_or_else(|| "unknown error".into())
        )));
    }

    body.chart
        .result
        .and_then(|mut results| results.pop())
        .map(|result| result.meta)
        .ok_or_else(|| Error::Fetch(format!("{}: no recent trading data", symbol)))
}

/// Date of the last trade in the exchange's own timezone.
fn trading_date(meta: &ChartMeta) -> Option<NaiveDate> {
    let traded_at = DateTime::from_timestamp(meta.regular_market_time?, 0)?;

    if let Some(tz) = meta
        .exchange_timezone_name
        .as_deref()
        .and_then(|name| name.parse::<Tz>().ok())
    {
        return Some(traded_at.with_timezone(&tz).date_naive());
    }

    match meta.gmtoffset.and_then(FixedOffset::east_opt) {
        Some(offset) => Some(traded_at.with_timezone(&offset).date_naive()),
        None => Some(traded_at.date_naive()),
    }
}

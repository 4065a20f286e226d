use async_trait::async_trait;
use chrono::NaiveDate;

use crate::error::Result;

/// Last traded price and the exchange date it belongs to.
#[derive(Debug, Clone, PartialEq)]
pub struct Quote {
    pub price: f64,
    pub trading_date: NaiveDate,
}

/// What the exchange reports about a single ticker.
#[derive(Debug, Clone, PartialEq)]
pub struct Listing {
    pub symbol: String,
    pub long_name: Option<String>,
    pub currency: Option<String>,
    pub price: f64,
}

impl Quote {
    pub fn is_usable(&self) -> bool {
        self.price.is_finite() && self.price > 0.0
    }
}

#[async_trait]
pub trait PriceSource: Send + Sync {
    /// Latest quote for `symbol`. Network errors, timeouts and responses
    /// without a price or timestamp all come back as `Err`.
    async fn fetch(&self, symbol: &str) -> Result<Quote>;
}

use std::time::Duration;

pub const YAHOO_CHART_URL: &str = "https://query1.finance.yahoo.com";
pub const TELEGRAM_API_URL: &str = "https://api.telegram.org";

/// Yahoo rejects requests without a browser-like user agent.
pub const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) wealth-tracker/0.1";

pub const DEFAULT_TABLE: &str = "assetprice";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

pub const MAX_ATTEMPTS: u32 = 3;
pub const RETRY_BACKOFF: Duration = Duration::from_secs(2);

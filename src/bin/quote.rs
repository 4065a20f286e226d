//! Looks up a single ticker and prints its name, currency and last price.

use anyhow::Context;
use wealth_tracker::config::request_timeout_from_env;
use wealth_tracker::logging::init;
use wealth_tracker::providers::YahooClient;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init()?;

    let symbol = std::env::args()
        .nth(1)
        .map(|s| s.trim().to_uppercase())
        .filter(|s| !s.is_empty())
        .context("usage: quote <TICKER>")?;

    let client = YahooClient::new(request_timeout_from_env()?)?;
    let listing = client.lookup(&symbol).await?;

    println!("symbol:   {}", listing.symbol);
    println!("name:     {}", listing.long_name.as_deref().unwrap_or("N/A"));
    println!("currency: {}", listing.currency.as_deref().unwrap_or("N/A"));
    println!("price:    {:.2}", listing.price);

    Ok(())
}

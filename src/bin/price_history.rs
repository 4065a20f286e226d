//! Prints stored prices. With an asset argument, prints that asset's series
//! oldest first.

use wealth_tracker::config::{request_timeout_from_env, StorageConfig};
use wealth_tracker::db::{self, PriceRecord};
use wealth_tracker::logging::init;

fn print_rows(records: &[PriceRecord]) {
    println!("{:<12} {:<12} {:>14} {:<4} {}", "date", "asset", "price", "ccy", "updated_at");
    for r in records {
        println!(
            "{:<12} {:<12} {:>14.2} {:<4} {}",
            r.date,
            r.asset_name,
            r.price,
            r.currency,
            r.updated_at.format("%Y-%m-%d %H:%M:%S")
        );
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init()?;

    let storage = StorageConfig::from_env()?;
    let store = db::connect(&storage, request_timeout_from_env()?).await?;
    store.initialize().await?;

    let records = store.fetch_all().await?;

    match std::env::args().nth(1) {
        Some(asset) => {
            let series = db::series(&records, &asset.trim().to_uppercase());
            if series.is_empty() {
                anyhow::bail!("no records for {}", asset);
            }
            print_rows(&series);
        }
        None => print_rows(&records),
    }

    Ok(())
}

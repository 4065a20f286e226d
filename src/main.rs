use wealth_tracker::app::run;
use wealth_tracker::config::Config;
use wealth_tracker::error::Result;
use wealth_tracker::logging::init;

#[tokio::main]
async fn main() -> Result<()> {
    init()?;

    let config = Config::from_env()?;

    run(config).await?;

    Ok(())
}

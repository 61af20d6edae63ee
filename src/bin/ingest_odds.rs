//! Odds ingestion batch job.
//!
//! Exits non-zero on setup failure (missing credentials, unreachable
//! database) or when the top-level event fetch fails; individual event
//! failures are logged and do not affect the exit code.

use anyhow::Result;
use football_ingestion::config::OddsConfig;
use football_ingestion::ingest::OddsPipeline;
use football_ingestion::odds_api::OddsApiClient;
use football_ingestion::db;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("football_ingestion=info".parse()?)
                .add_directive("ingest_odds=info".parse()?),
        )
        .init();

    info!("Starting football odds ingestion");

    let config = OddsConfig::from_env()?;
    let pool = db::connect(&config.database_url).await?;
    let client = OddsApiClient::new(config.odds_api_key)?;

    OddsPipeline::new(pool, client).run().await?;

    info!("Odds ingestion task completed successfully");
    Ok(())
}

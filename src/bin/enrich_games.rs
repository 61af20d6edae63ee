//! Enrichment batch job (odds-first approach).
//!
//! Only processes games the odds job already created; enriches them with
//! teams, injury reports and game detail from the stats provider. Per-game
//! failures are logged and skipped.

use anyhow::Result;
use football_ingestion::config::EnrichConfig;
use football_ingestion::db;
use football_ingestion::enrich::EnrichmentPass;
use football_ingestion::football_api::FootballApiClient;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("football_ingestion=info".parse()?)
                .add_directive("enrich_games=info".parse()?),
        )
        .init();

    info!("Starting football data enrichment");

    let config = EnrichConfig::from_env()?;
    let pool = db::connect(&config.database_url).await?;
    let client = FootballApiClient::new(config.football_api_key)?;

    EnrichmentPass::new(pool, client).run().await?;

    info!("Enrichment task completed successfully");
    Ok(())
}

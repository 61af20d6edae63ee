//! Environment configuration for the two batch jobs.
//!
//! Missing credentials are setup errors: they abort the run before any
//! network call is made.

use anyhow::{anyhow, Result};
use std::env;

/// Configuration for the odds ingestion job.
#[derive(Clone)]
pub struct OddsConfig {
    pub odds_api_key: String,
    pub database_url: String,
}

impl OddsConfig {
    pub fn from_env() -> Result<Self> {
        let odds_api_key = require_env("ODDS_API_KEY")?;
        reject_placeholder("ODDS_API_KEY", &odds_api_key)?;
        Ok(Self {
            odds_api_key,
            database_url: require_env("DATABASE_URL")?,
        })
    }
}

/// Configuration for the enrichment job.
#[derive(Clone)]
pub struct EnrichConfig {
    pub football_api_key: String,
    pub database_url: String,
}

impl EnrichConfig {
    pub fn from_env() -> Result<Self> {
        let football_api_key = require_env("FOOTBALL_API_KEY")?;
        reject_placeholder("FOOTBALL_API_KEY", &football_api_key)?;
        Ok(Self {
            football_api_key,
            database_url: require_env("DATABASE_URL")?,
        })
    }
}

fn require_env(name: &str) -> Result<String> {
    match env::var(name) {
        Ok(v) if !v.trim().is_empty() => Ok(v),
        Ok(_) => Err(anyhow!("{} is set but empty", name)),
        Err(_) => Err(anyhow!("{} environment variable is required", name)),
    }
}

/// Prevent accidental use of sample/placeholder keys.
fn reject_placeholder(name: &str, value: &str) -> Result<()> {
    let lower = value.trim().to_lowercase();
    if lower.contains("change_me") || lower.contains("your_") || lower.starts_with("sample") {
        return Err(anyhow!(
            "{} appears to be a placeholder value; replace with your real key",
            name
        ));
    }
    Ok(())
}

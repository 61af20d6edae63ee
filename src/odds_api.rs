//! Client for The Odds API (v4).
//!
//! Auth is an `apiKey` query parameter. The client throttles itself to the
//! provider's request budget and retries transient failures; 4xx responses
//! fail immediately. `/events` and single-event lookups do not count against
//! the provider's quota, but they still pass through the throttle.

use crate::error::ApiError;
use crate::throttle::{with_retries, RetryPolicy, Throttle};
use crate::models::OddsEvent;
use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::info;

const BASE_URL: &str = "https://api.the-odds-api.com/v4";
const REQUESTS_PER_MINUTE: u32 = 500;

pub const NFL_SPORT_KEY: &str = "americanfootball_nfl";
pub const FANDUEL_BOOKMAKER: &str = "fanduel";
pub const DEFAULT_REGIONS: &str = "us";
pub const AMERICAN_ODDS_FORMAT: &str = "american";
pub const ISO_DATE_FORMAT: &str = "iso";

pub struct OddsApiClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    throttle: Throttle,
    retry: RetryPolicy,
}

impl OddsApiClient {
    pub fn new(api_key: String) -> Result<Self> {
        Self::with_base_url(api_key, BASE_URL.to_string())
    }

    pub fn with_base_url(api_key: String, base_url: String) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            http,
            base_url,
            api_key,
            throttle: Throttle::per_minute(REQUESTS_PER_MINUTE),
            retry: RetryPolicy {
                attempts: 3,
                multiplier: 1.5,
                initial_delay: Duration::from_millis(500),
            },
        })
    }

    /// Total requests issued by this client instance.
    pub fn request_count(&self) -> u64 {
        self.throttle.request_count()
    }

    /// List upcoming events for a sport (no odds attached).
    pub async fn get_events(&self, sport: &str) -> Result<Vec<OddsEvent>, ApiError> {
        let url = format!("{}/sports/{}/events", self.base_url, sport);
        let query = vec![
            ("apiKey".to_string(), self.api_key.clone()),
            ("dateFormat".to_string(), ISO_DATE_FORMAT.to_string()),
        ];
        self.get_json(&url, &query).await
    }

    /// Fetch odds for all upcoming events of a sport in one call.
    pub async fn get_odds(
        &self,
        sport: &str,
        regions: &str,
        markets: &str,
        bookmakers: &str,
    ) -> Result<Vec<OddsEvent>, ApiError> {
        let url = format!("{}/sports/{}/odds", self.base_url, sport);
        let query = vec![
            ("apiKey".to_string(), self.api_key.clone()),
            ("regions".to_string(), regions.to_string()),
            ("markets".to_string(), markets.to_string()),
            ("bookmakers".to_string(), bookmakers.to_string()),
            ("dateFormat".to_string(), ISO_DATE_FORMAT.to_string()),
            ("oddsFormat".to_string(), AMERICAN_ODDS_FORMAT.to_string()),
        ];
        self.get_json(&url, &query).await
    }

    /// Fetch odds for a single event. Supports markets (player props,
    /// alternate lines) that the bulk odds endpoint does not carry.
    pub async fn get_event_odds(
        &self,
        sport: &str,
        event_id: &str,
        regions: &str,
        markets: &str,
        bookmakers: &str,
    ) -> Result<OddsEvent, ApiError> {
        let url = format!("{}/sports/{}/events/{}/odds", self.base_url, sport, event_id);
        let query = vec![
            ("apiKey".to_string(), self.api_key.clone()),
            ("regions".to_string(), regions.to_string()),
            ("markets".to_string(), markets.to_string()),
            ("bookmakers".to_string(), bookmakers.to_string()),
            ("dateFormat".to_string(), ISO_DATE_FORMAT.to_string()),
            ("oddsFormat".to_string(), AMERICAN_ODDS_FORMAT.to_string()),
        ];
        self.get_json(&url, &query).await
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(String, String)],
    ) -> Result<T, ApiError> {
        with_retries(&self.retry, || self.try_get(url, query)).await
    }

    async fn try_get<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(String, String)],
    ) -> Result<T, ApiError> {
        self.throttle.acquire().await;

        let response = self.http.get(url).query(query).send().await?;

        // Log remaining quota from headers
        if let Some(remaining) = response.headers().get("x-requests-remaining") {
            info!(
                "Odds API requests remaining: {}",
                remaining.to_str().unwrap_or("?")
            );
        }

        let status = response.status();
        let body = response.text().await?;

        if status.as_u16() == 429 {
            return Err(ApiError::RateLimited(body));
        }
        if !status.is_success() {
            return Err(ApiError::Provider {
                status: status.as_u16(),
                message: body,
            });
        }

        serde_json::from_str(&body).map_err(|e| ApiError::Parse(e.to_string()))
    }
}

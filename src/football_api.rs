//! Client for API-American-Football (api-sports.io).
//!
//! Auth is the `X-RapidAPI-Key` header. All endpoints return the
//! `{results, response: [T]}` envelope. This provider's budget is tighter
//! than the odds provider's, so the throttle interval is longer and the
//! backoff steeper.

use crate::error::ApiError;
use crate::models::{ApiGame, ApiInjury, ApiPlayer, ApiResponse, PlayerStatistic};
use crate::throttle::{with_retries, RetryPolicy, Throttle};
use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use std::time::Duration;

const BASE_URL: &str = "https://v1.american-football.api-sports.io";
const KEY_HEADER: &str = "X-RapidAPI-Key";
const REQUESTS_PER_MINUTE: u32 = 100;

/// League id for the NFL in the stats provider's namespace.
pub const NFL_LEAGUE_ID: &str = "1";

pub struct FootballApiClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    throttle: Throttle,
    retry: RetryPolicy,
}

impl FootballApiClient {
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
                multiplier: 2.0,
                initial_delay: Duration::from_millis(1000),
            },
        })
    }

    /// Total requests issued by this client instance.
    pub fn request_count(&self) -> u64 {
        self.throttle.request_count()
    }

    /// Game schedule, optionally narrowed to a week or team.
    pub async fn get_games(
        &self,
        league: &str,
        season: i32,
        week: Option<&str>,
        team: Option<i64>,
    ) -> Result<ApiResponse<ApiGame>, ApiError> {
        let mut query = vec![
            ("league".to_string(), league.to_string()),
            ("season".to_string(), season.to_string()),
        ];
        if let Some(week) = week {
            query.push(("week".to_string(), week.to_string()));
        }
        if let Some(team) = team {
            query.push(("team".to_string(), team.to_string()));
        }
        self.get_json("/games", &query).await
    }

    /// Player roster, optionally narrowed to a team and season.
    pub async fn get_players(
        &self,
        team: Option<i64>,
        season: Option<i32>,
    ) -> Result<ApiResponse<ApiPlayer>, ApiError> {
        let mut query = Vec::new();
        if let Some(team) = team {
            query.push(("team".to_string(), team.to_string()));
        }
        if let Some(season) = season {
            query.push(("season".to_string(), season.to_string()));
        }
        self.get_json("/players", &query).await
    }

    /// Season player statistics. The team block on each row is the only
    /// cross-provider source of team identity, so this doubles as the
    /// team-lookup payload.
    pub async fn get_player_statistics(
        &self,
        league: &str,
        season: i32,
        team: Option<i64>,
    ) -> Result<ApiResponse<PlayerStatistic>, ApiError> {
        let mut query = vec![
            ("league".to_string(), league.to_string()),
            ("season".to_string(), season.to_string()),
        ];
        if let Some(team) = team {
            query.push(("team".to_string(), team.to_string()));
        }
        self.get_json("/players/statistics", &query).await
    }

    /// Injury reports for a team.
    pub async fn get_injuries(
        &self,
        league: &str,
        season: i32,
        team: i64,
    ) -> Result<ApiResponse<ApiInjury>, ApiError> {
        let query = vec![
            ("league".to_string(), league.to_string()),
            ("season".to_string(), season.to_string()),
            ("team".to_string(), team.to_string()),
        ];
        self.get_json("/injuries", &query).await
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(String, String)],
    ) -> Result<T, ApiError> {
        let url = format!("{}{}", self.base_url, path);
        with_retries(&self.retry, || self.try_get(&url, query)).await
    }

    async fn try_get<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(String, String)],
    ) -> Result<T, ApiError> {
        self.throttle.acquire().await;

        let response = self
            .http
            .get(url)
            .header(KEY_HEADER, &self.api_key)
            .query(query)
            .send()
            .await?;

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

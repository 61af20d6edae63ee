//! Provider payload types and store row types.
//!
//! Provider structs use `#[serde(default)]` so partially populated JSON
//! (events without bookmakers, outcomes without points) deserializes
//! without failing. Missing fields stay `None` and are never written as
//! zero downstream.

use chrono::{DateTime, Utc};
use serde::Deserialize;

// ---------------------------------------------------------------------------
// The Odds API
// ---------------------------------------------------------------------------

/// An event as returned by The Odds API, with or without odds attached.
///
/// The `/events` endpoint omits `bookmakers`; the odds endpoints include it.
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct OddsEvent {
    pub id: String,
    pub sport_key: String,
    pub sport_title: String,
    pub commence_time: Option<DateTime<Utc>>,
    pub home_team: String,
    pub away_team: String,
    pub bookmakers: Vec<Bookmaker>,
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Bookmaker {
    pub key: String,
    pub title: String,
    pub last_update: Option<DateTime<Utc>>,
    pub markets: Vec<Market>,
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Market {
    pub key: String,
    pub last_update: Option<DateTime<Utc>>,
    pub outcomes: Vec<Outcome>,
}

/// One priced selection within a market. `point` carries the line (spread
/// or total) and is absent for moneyline-style markets.
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Outcome {
    pub name: String,
    pub price: Option<i32>,
    pub point: Option<f64>,
}

// ---------------------------------------------------------------------------
// API-American-Football
// ---------------------------------------------------------------------------

/// Standard `{results, response: [T]}` envelope for all stats endpoints.
#[derive(Debug, Deserialize, Clone)]
pub struct ApiResponse<T> {
    #[serde(default)]
    pub results: i64,
    #[serde(default)]
    pub response: Vec<T>,
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct ApiTeam {
    pub id: i64,
    pub name: String,
    pub code: String,
    pub city: String,
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct ApiPlayer {
    pub id: i64,
    pub name: String,
    pub position: Option<String>,
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct ApiVenue {
    pub name: Option<String>,
    pub city: Option<String>,
    pub surface: Option<String>,
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct ApiGameStatus {
    pub short: String,
    pub long: String,
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct ApiGameTeams {
    pub home: ApiTeam,
    pub away: ApiTeam,
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct ApiGameScores {
    pub home: Option<i32>,
    pub away: Option<i32>,
}

/// A game as returned by the stats provider's `/games` endpoint, trimmed to
/// the fields the enrichment pass consumes.
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct ApiGame {
    pub id: i64,
    pub date: String,
    pub timestamp: Option<i64>,
    pub week: String,
    pub status: ApiGameStatus,
    pub teams: ApiGameTeams,
    pub scores: ApiGameScores,
    pub venue: ApiVenue,
}

/// One row of the season player-statistics payload. Only the team block is
/// used (for cross-provider team lookup), but the player is kept for logging.
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct PlayerStatistic {
    pub player: ApiPlayer,
    pub team: Option<ApiTeam>,
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct ApiInjuryStatus {
    #[serde(rename = "type")]
    pub status_type: String,
    pub detail: Option<String>,
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct ApiInjury {
    pub player: ApiPlayer,
    pub team: ApiTeam,
    pub status: ApiInjuryStatus,
    pub date: Option<String>,
}

// ---------------------------------------------------------------------------
// Store rows
// ---------------------------------------------------------------------------

/// An odds-provider event as persisted, keyed by the provider's event id.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct EventRow {
    pub id: i64,
    pub event_id: String,
    pub home_team: String,
    pub away_team: String,
    pub start_time: DateTime<Utc>,
}

/// A contest in the system's own namespace. Created by the odds pipeline,
/// enriched later with stats-provider detail.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct GameRow {
    pub id: i64,
    pub home_team: String,
    pub away_team: String,
    pub game_date: DateTime<Utc>,
    pub week: Option<i32>,
    pub season: i32,
    pub status: String,
    pub home_score: Option<i32>,
    pub away_score: Option<i32>,
    pub venue: Option<String>,
    pub surface_type: Option<String>,
}

/// Stats-derived fields written back onto a game by the enrichment pass.
#[derive(Debug, Clone, Default)]
pub struct GameDetailUpdate {
    pub week: Option<i32>,
    pub status: String,
    pub home_score: Option<i32>,
    pub away_score: Option<i32>,
    pub venue: Option<String>,
    pub surface_type: Option<String>,
}

/// An injury report to append. Injury rows are intentionally not
/// deduplicated; each run records the report as a time series.
#[derive(Debug, Clone)]
pub struct NewInjury {
    pub player_name: String,
    pub team: String,
    pub position: Option<String>,
    pub status: String,
    pub description: Option<String>,
    pub game_id: i64,
    pub reported_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_without_bookmakers_deserializes() {
        let json = r#"{
            "id": "abc123",
            "sport_key": "americanfootball_nfl",
            "sport_title": "NFL",
            "commence_time": "2024-09-08T17:00:00Z",
            "home_team": "Kansas City Chiefs",
            "away_team": "Buffalo Bills"
        }"#;
        let event: OddsEvent = serde_json::from_str(json).unwrap();
        assert_eq!(event.home_team, "Kansas City Chiefs");
        assert!(event.bookmakers.is_empty());
        assert!(event.commence_time.is_some());
    }

    #[test]
    fn outcome_point_is_optional() {
        let json = r#"{"name": "Kansas City Chiefs", "price": -150}"#;
        let outcome: Outcome = serde_json::from_str(json).unwrap();
        assert_eq!(outcome.price, Some(-150));
        assert_eq!(outcome.point, None);
    }

    #[test]
    fn zero_price_is_preserved_not_dropped() {
        let json = r#"{"name": "Over", "price": 0, "point": 47.5}"#;
        let outcome: Outcome = serde_json::from_str(json).unwrap();
        assert_eq!(outcome.price, Some(0));
    }

    #[test]
    fn stats_envelope_deserializes() {
        let json = r#"{
            "results": 1,
            "response": [{
                "player": {"id": 7, "name": "Patrick Mahomes", "position": "QB"},
                "team": {"id": 25, "name": "Kansas City Chiefs", "code": "KC", "city": "Kansas City"}
            }]
        }"#;
        let parsed: ApiResponse<PlayerStatistic> = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.results, 1);
        assert_eq!(parsed.response[0].team.as_ref().unwrap().code, "KC");
    }

    #[test]
    fn injury_status_type_field_renames() {
        let json = r#"{
            "player": {"id": 1, "name": "Some Player"},
            "team": {"id": 2, "name": "Buffalo Bills", "code": "BUF", "city": "Buffalo"},
            "status": {"type": "Questionable", "detail": "Ankle"},
            "date": "2024-09-06"
        }"#;
        let injury: ApiInjury = serde_json::from_str(json).unwrap();
        assert_eq!(injury.status.status_type, "Questionable");
        assert_eq!(injury.status.detail.as_deref(), Some("Ankle"));
    }
}

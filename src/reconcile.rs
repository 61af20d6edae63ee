//! Cross-provider reconciliation.
//!
//! The two providers share no identifiers, so an odds event is matched to a
//! stored game by team names and date proximity, and a stored team name is
//! matched to a stats-provider team by bidirectional substring. Both are
//! best-effort heuristics; the substring match in particular can produce
//! false positives for short or nested franchise names.

use crate::db;
use crate::error::ApiError;
use crate::football_api::{FootballApiClient, NFL_LEAGUE_ID};
use crate::models::{ApiTeam, GameRow, OddsEvent};
use anyhow::Result;
use chrono::{DateTime, Datelike, Utc};
use sqlx::PgPool;
use tracing::info;

/// Whether two instants fall on the same UTC calendar day.
pub fn same_utc_day(a: DateTime<Utc>, b: DateTime<Utc>) -> bool {
    a.date_naive() == b.date_naive()
}

/// Select the game matching an odds event among games sharing its home team.
///
/// Candidates must match the away team exactly and fall on the same UTC day
/// as the commence time. When several candidates survive (doubleheaders),
/// the one whose stored date is nearest the commence time wins; exact ties
/// keep the lowest id.
pub fn pick_candidate<'a>(
    games: &'a [GameRow],
    away_team: &str,
    commence: DateTime<Utc>,
) -> Option<&'a GameRow> {
    games
        .iter()
        .filter(|g| g.away_team == away_team && same_utc_day(g.game_date, commence))
        .min_by_key(|g| ((g.game_date - commence).num_seconds().abs(), g.id))
}

/// Match an odds event to a stored game, creating a minimal record when
/// nothing matches: status `NS`, season = UTC year of the commence time.
pub async fn find_or_create_game(pool: &PgPool, event: &OddsEvent) -> Result<GameRow> {
    let commence = event.commence_time.unwrap_or_else(Utc::now);

    let candidates = db::games_by_home_team(pool, &event.home_team).await?;
    if let Some(game) = pick_candidate(&candidates, &event.away_team, commence) {
        return Ok(game.clone());
    }

    let game = db::insert_game(
        pool,
        &event.home_team,
        &event.away_team,
        commence,
        commence.year(),
        "NS",
    )
    .await?;
    info!(
        "Created game {} for {} vs {}",
        game.id, event.home_team, event.away_team
    );
    Ok(game)
}

/// Bidirectional substring match between two team names.
pub fn names_match(a: &str, b: &str) -> bool {
    a == b || a.contains(b) || b.contains(a)
}

/// Look up a team in the stats provider's namespace by name.
///
/// The current-season player-statistics payload is the only place the
/// provider exposes team identity, so teams are enumerated from it; the
/// first row whose team name matches wins.
pub async fn find_team_by_name(
    client: &FootballApiClient,
    season: i32,
    team_name: &str,
) -> Result<Option<ApiTeam>, ApiError> {
    let statistics = client
        .get_player_statistics(NFL_LEAGUE_ID, season, None)
        .await?;

    for stat in statistics.response {
        if let Some(team) = stat.team {
            if names_match(&team.name, team_name) {
                return Ok(Some(team));
            }
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utc(s: &str) -> DateTime<Utc> {
        s.parse().unwrap()
    }

    fn game(id: i64, home: &str, away: &str, date: &str) -> GameRow {
        GameRow {
            id,
            home_team: home.to_string(),
            away_team: away.to_string(),
            game_date: utc(date),
            week: None,
            season: 2024,
            status: "NS".to_string(),
            home_score: None,
            away_score: None,
            venue: None,
            surface_type: None,
        }
    }

    #[test]
    fn same_day_matches_across_a_time_shift() {
        // Commence times a few hours apart on the same UTC day are one game.
        let games = vec![game(
            1,
            "Kansas City Chiefs",
            "Buffalo Bills",
            "2024-09-08T17:00:00Z",
        )];
        let picked = pick_candidate(&games, "Buffalo Bills", utc("2024-09-08T20:00:00Z"));
        assert_eq!(picked.map(|g| g.id), Some(1));
    }

    #[test]
    fn different_utc_day_does_not_match() {
        let games = vec![game(
            1,
            "Kansas City Chiefs",
            "Buffalo Bills",
            "2024-09-08T23:00:00Z",
        )];
        assert!(pick_candidate(&games, "Buffalo Bills", utc("2024-09-09T01:00:00Z")).is_none());
    }

    #[test]
    fn away_team_must_match_exactly() {
        let games = vec![game(
            1,
            "Kansas City Chiefs",
            "Buffalo Bills",
            "2024-09-08T17:00:00Z",
        )];
        assert!(pick_candidate(&games, "Bills", utc("2024-09-08T17:00:00Z")).is_none());
    }

    #[test]
    fn nearest_start_time_breaks_ties() {
        let games = vec![
            game(1, "Home", "Away", "2024-09-08T13:00:00Z"),
            game(2, "Home", "Away", "2024-09-08T20:00:00Z"),
        ];
        let picked = pick_candidate(&games, "Away", utc("2024-09-08T19:00:00Z"));
        assert_eq!(picked.map(|g| g.id), Some(2));
    }

    #[test]
    fn exact_tie_keeps_lowest_id() {
        let games = vec![
            game(2, "Home", "Away", "2024-09-08T17:00:00Z"),
            game(1, "Home", "Away", "2024-09-08T17:00:00Z"),
        ];
        let picked = pick_candidate(&games, "Away", utc("2024-09-08T17:00:00Z"));
        assert_eq!(picked.map(|g| g.id), Some(1));
    }

    #[test]
    fn name_matching_is_bidirectional_substring() {
        assert!(names_match("Kansas City Chiefs", "Kansas City Chiefs"));
        assert!(names_match("Kansas City Chiefs", "Chiefs"));
        assert!(names_match("Chiefs", "Kansas City Chiefs"));
        assert!(!names_match("Buffalo Bills", "Kansas City Chiefs"));
    }
}

//! The enrichment pass: odds-first, stats second.
//!
//! Only games already created by the odds pipeline are touched. For each
//! game in the rolling window, both teams are resolved in the stats
//! provider's namespace, team rows are created if absent, injury reports
//! are appended, and the game's stats-derived fields are overwritten from
//! the provider's own schedule. Everything is best-effort per game.

use crate::db;
use crate::football_api::{FootballApiClient, NFL_LEAGUE_ID};
use crate::models::{ApiGame, ApiTeam, GameDetailUpdate, GameRow, NewInjury};
use crate::reconcile;
use crate::status;
use crate::window::{self, ENRICHMENT_WINDOW_DAYS};
use anyhow::{Context, Result};
use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, TimeZone, Utc};
use sqlx::PgPool;
use tracing::{error, info, warn};

const ONE_DAY_SECONDS: i64 = 24 * 60 * 60;

pub struct EnrichmentPass {
    db: PgPool,
    client: FootballApiClient,
}

impl EnrichmentPass {
    pub fn new(db: PgPool, client: FootballApiClient) -> Self {
        Self { db, client }
    }

    pub async fn run(&self) -> Result<()> {
        let window = window::around(Utc::now(), ENRICHMENT_WINDOW_DAYS);
        let games = db::games_in_window(&self.db, window).await?;

        if games.is_empty() {
            info!("No games in enrichment window; run odds ingestion first");
            return Ok(());
        }
        info!("Found {} games to enrich", games.len());

        let mut enriched = 0usize;
        let mut skipped = 0usize;
        for game in &games {
            match self.enrich_game(game).await {
                Ok(true) => enriched += 1,
                Ok(false) => skipped += 1,
                Err(e) => {
                    skipped += 1;
                    error!(
                        "Failed to enrich {} vs {}: {:#}",
                        game.home_team, game.away_team, e
                    );
                }
            }
        }

        info!(
            "Enrichment complete: {} enriched, {} skipped, {} provider requests",
            enriched,
            skipped,
            self.client.request_count()
        );
        Ok(())
    }

    /// Enrich a single game. Returns false when the game was skipped because
    /// a team could not be resolved across providers.
    async fn enrich_game(&self, game: &GameRow) -> Result<bool> {
        info!("Enriching {} vs {}", game.home_team, game.away_team);
        let season = Utc::now().year();

        let home = reconcile::find_team_by_name(&self.client, season, &game.home_team)
            .await
            .context("Home team lookup failed")?;
        let away = reconcile::find_team_by_name(&self.client, season, &game.away_team)
            .await
            .context("Away team lookup failed")?;

        let (Some(home), Some(away)) = (home, away) else {
            warn!(
                "Could not resolve teams for {} vs {}",
                game.home_team, game.away_team
            );
            return Ok(false);
        };

        self.ensure_team(&home).await?;
        self.ensure_team(&away).await?;

        // Each step below is best-effort; a failed injury fetch must not
        // block the game-detail update and vice versa.
        for team in [&home, &away] {
            if let Err(e) = self.store_injuries(game, team, season).await {
                warn!("Failed to store injuries for {}: {:#}", team.name, e);
            }
        }
        if let Err(e) = self.update_game_details(game, home.id, season).await {
            warn!(
                "Failed to update details for {} vs {}: {:#}",
                game.home_team, game.away_team, e
            );
        }

        Ok(true)
    }

    async fn ensure_team(&self, team: &ApiTeam) -> Result<()> {
        if db::ensure_team(&self.db, &team.name, &team.city, &team.code).await? {
            info!("Created team: {}", team.name);
        }
        Ok(())
    }

    async fn store_injuries(&self, game: &GameRow, team: &ApiTeam, season: i32) -> Result<()> {
        let injuries = self
            .client
            .get_injuries(NFL_LEAGUE_ID, season, team.id)
            .await?;

        let count = injuries.response.len();
        for injury in injuries.response {
            let record = NewInjury {
                player_name: injury.player.name,
                team: injury.team.name,
                position: injury.player.position,
                status: status::map_injury_status(&injury.status.status_type),
                description: injury.status.detail,
                game_id: game.id,
                reported_at: parse_report_date(injury.date.as_deref()),
            };
            db::insert_injury(&self.db, &record).await?;
        }

        info!("Found {} injury reports for {}", count, team.name);
        Ok(())
    }

    async fn update_game_details(
        &self,
        game: &GameRow,
        home_team_id: i64,
        season: i32,
    ) -> Result<()> {
        let schedule = self
            .client
            .get_games(NFL_LEAGUE_ID, season, None, Some(home_team_id))
            .await?;

        let Some(api_game) = schedule
            .response
            .iter()
            .find(|g| game_detail_matches(g, game))
        else {
            return Ok(());
        };

        let update = build_detail_update(api_game, game);
        db::update_game_details(&self.db, game.id, &update).await?;
        info!("Updated game {} with provider detail", game.id);
        Ok(())
    }
}

/// Whether a stats-provider game describes the same contest: date within one
/// calendar day and either team name matching exactly.
pub fn game_detail_matches(api_game: &ApiGame, game: &GameRow) -> bool {
    let Some(date) = api_game_datetime(api_game) else {
        return false;
    };
    (date - game.game_date).num_seconds().abs() < ONE_DAY_SECONDS
        && (api_game.teams.home.name == game.home_team
            || api_game.teams.away.name == game.away_team)
}

/// Merge provider detail over the stored game, keeping stored values where
/// the provider field is empty.
pub fn build_detail_update(api_game: &ApiGame, game: &GameRow) -> GameDetailUpdate {
    GameDetailUpdate {
        week: parse_week(&api_game.week).or(game.week),
        status: status::map_game_status(&api_game.status.short),
        home_score: api_game.scores.home.or(game.home_score),
        away_score: api_game.scores.away.or(game.away_score),
        venue: api_game.venue.name.clone().or_else(|| game.venue.clone()),
        surface_type: api_game
            .venue
            .surface
            .clone()
            .or_else(|| game.surface_type.clone()),
    }
}

/// The provider reports the week as a string, sometimes prefixed ("Week 3").
pub fn parse_week(week: &str) -> Option<i32> {
    let digits: String = week.chars().filter(|c| c.is_ascii_digit()).collect();
    digits.parse().ok()
}

/// Game instant from the provider's unix timestamp, falling back to the
/// date string at midnight UTC.
pub fn api_game_datetime(api_game: &ApiGame) -> Option<DateTime<Utc>> {
    if let Some(ts) = api_game.timestamp {
        if let Some(dt) = Utc.timestamp_opt(ts, 0).single() {
            return Some(dt);
        }
    }
    api_game
        .date
        .parse::<NaiveDate>()
        .ok()
        .map(|d| Utc.from_utc_datetime(&d.and_time(NaiveTime::MIN)))
}

/// Injury report date: full timestamp, bare date, or now as a last resort.
pub fn parse_report_date(date: Option<&str>) -> DateTime<Utc> {
    let Some(date) = date else {
        return Utc::now();
    };
    if let Ok(dt) = date.parse::<DateTime<Utc>>() {
        return dt;
    }
    if let Ok(d) = date.parse::<NaiveDate>() {
        return Utc.from_utc_datetime(&d.and_time(NaiveTime::MIN));
    }
    Utc::now()
}

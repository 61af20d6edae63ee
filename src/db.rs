//! Postgres access: pool setup and the idempotent upsert layer.
//!
//! Every write goes through a deterministic natural key so re-running a
//! pipeline over unchanged provider data is a no-op and re-running after a
//! price move converges to the latest values:
//!
//! - events: `event_id` (the provider's id)
//! - odds rows: `(event_id, market, name, point)` — nulls not distinct
//! - betting lines: `(game_id, bookmaker)` — full overwrite
//! - teams: `name`, insert-if-absent, existing fields never touched
//! - player injuries: no key, unconditional append by design
//!
//! Each statement is its own atomic unit; there is no transaction spanning
//! a whole payload.

use crate::markets::{BettingLineUpdate, OutcomeRow};
use crate::models::{EventRow, GameDetailUpdate, GameRow, NewInjury, OddsEvent};
use crate::window::TimeWindow;
use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::time::Duration;
use tracing::{info, warn};

/// Connect to Postgres with retry, as transient DNS/startup failures are
/// common when the job is launched alongside the database.
pub async fn connect(url: &str) -> Result<PgPool> {
    let max_retries = 5;
    let mut attempt = 0;
    loop {
        match PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(10))
            .connect(url)
            .await
        {
            Ok(pool) => {
                info!("Connected to PostgreSQL");
                return Ok(pool);
            }
            Err(e) => {
                attempt += 1;
                if attempt >= max_retries {
                    return Err(anyhow!(
                        "Failed to connect to database after {} attempts: {}",
                        max_retries,
                        e
                    ));
                }
                warn!("Database connection attempt {} failed: {}. Retrying...", attempt, e);
                tokio::time::sleep(Duration::from_secs(2u64.pow(attempt))).await;
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

pub async fn events_in_window(pool: &PgPool, window: TimeWindow) -> Result<Vec<EventRow>> {
    let rows = sqlx::query_as::<_, EventRow>(
        r#"
        SELECT id, event_id, home_team, away_team, start_time
        FROM events
        WHERE start_time >= $1 AND start_time < $2
        ORDER BY start_time
        "#,
    )
    .bind(window.start)
    .bind(window.end)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Upsert an event by its provider id. Team names and start time converge
/// to the latest provider values; the row is never deleted.
pub async fn upsert_event(pool: &PgPool, event: &OddsEvent) -> Result<EventRow> {
    let start_time = event.commence_time.unwrap_or_else(Utc::now);
    let row = sqlx::query_as::<_, EventRow>(
        r#"
        INSERT INTO events (event_id, home_team, away_team, start_time)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (event_id) DO UPDATE SET
            home_team = EXCLUDED.home_team,
            away_team = EXCLUDED.away_team,
            start_time = EXCLUDED.start_time,
            updated_at = now()
        RETURNING id, event_id, home_team, away_team, start_time
        "#,
    )
    .bind(&event.id)
    .bind(&event.home_team)
    .bind(&event.away_team)
    .bind(start_time)
    .fetch_one(pool)
    .await?;
    Ok(row)
}

// ---------------------------------------------------------------------------
// Games
// ---------------------------------------------------------------------------

const GAME_COLUMNS: &str = "id, home_team, away_team, game_date, week, season, status, \
                            home_score, away_score, venue, surface_type";

pub async fn games_by_home_team(pool: &PgPool, home_team: &str) -> Result<Vec<GameRow>> {
    let rows = sqlx::query_as::<_, GameRow>(&format!(
        "SELECT {GAME_COLUMNS} FROM games WHERE home_team = $1 ORDER BY id"
    ))
    .bind(home_team)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn games_in_window(pool: &PgPool, window: TimeWindow) -> Result<Vec<GameRow>> {
    let rows = sqlx::query_as::<_, GameRow>(&format!(
        "SELECT {GAME_COLUMNS} FROM games \
         WHERE game_date >= $1 AND game_date < $2 ORDER BY game_date"
    ))
    .bind(window.start)
    .bind(window.end)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Create a minimal game record from an odds event that matched nothing.
pub async fn insert_game(
    pool: &PgPool,
    home_team: &str,
    away_team: &str,
    game_date: DateTime<Utc>,
    season: i32,
    status: &str,
) -> Result<GameRow> {
    let row = sqlx::query_as::<_, GameRow>(&format!(
        "INSERT INTO games (home_team, away_team, game_date, season, status) \
         VALUES ($1, $2, $3, $4, $5) \
         RETURNING {GAME_COLUMNS}"
    ))
    .bind(home_team)
    .bind(away_team)
    .bind(game_date)
    .bind(season)
    .bind(status)
    .fetch_one(pool)
    .await?;
    Ok(row)
}

/// Overwrite a game's stats-derived fields. The enrichment pass is the sole
/// caller and the sole updater of these columns.
pub async fn update_game_details(
    pool: &PgPool,
    game_id: i64,
    update: &GameDetailUpdate,
) -> Result<()> {
    sqlx::query(
        r#"
        UPDATE games SET
            week = $2,
            status = $3,
            home_score = $4,
            away_score = $5,
            venue = $6,
            surface_type = $7,
            updated_at = now()
        WHERE id = $1
        "#,
    )
    .bind(game_id)
    .bind(update.week)
    .bind(&update.status)
    .bind(update.home_score)
    .bind(update.away_score)
    .bind(&update.venue)
    .bind(&update.surface_type)
    .execute(pool)
    .await?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Teams
// ---------------------------------------------------------------------------

/// Insert a team if no row with that name exists. Existing rows are never
/// updated here. Returns whether a row was created.
pub async fn ensure_team(
    pool: &PgPool,
    name: &str,
    city: &str,
    abbreviation: &str,
) -> Result<bool> {
    let result = sqlx::query(
        r#"
        INSERT INTO teams (name, city, abbreviation)
        VALUES ($1, $2, $3)
        ON CONFLICT (name) DO NOTHING
        "#,
    )
    .bind(name)
    .bind(city)
    .bind(abbreviation)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}

// ---------------------------------------------------------------------------
// Odds rows
// ---------------------------------------------------------------------------

/// Upsert one flat outcome row. The unique constraint treats a null point
/// as equal to null, so pointless markets (h2h) stay idempotent too.
pub async fn upsert_outcome(pool: &PgPool, event_id: i64, row: &OutcomeRow) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO odds (event_id, market, name, price, point)
        VALUES ($1, $2, $3, $4, $5)
        ON CONFLICT (event_id, market, name, point) DO UPDATE SET
            price = EXCLUDED.price,
            updated_at = now()
        "#,
    )
    .bind(event_id)
    .bind(&row.market)
    .bind(&row.name)
    .bind(row.price)
    .bind(row.point)
    .execute(pool)
    .await?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Betting lines
// ---------------------------------------------------------------------------

/// Upsert the denormalized per-game summary. Last write wins: every non-key
/// field is overwritten, including back to null when a market disappeared
/// from the payload.
pub async fn upsert_betting_line(
    pool: &PgPool,
    game_id: i64,
    bookmaker: &str,
    line: &BettingLineUpdate,
) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO betting_lines (
            game_id, bookmaker,
            spread_home, spread_away, spread_home_odds, spread_away_odds,
            moneyline_home, moneyline_away,
            total_points, over_odds, under_odds,
            last_updated
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
        ON CONFLICT (game_id, bookmaker) DO UPDATE SET
            spread_home = EXCLUDED.spread_home,
            spread_away = EXCLUDED.spread_away,
            spread_home_odds = EXCLUDED.spread_home_odds,
            spread_away_odds = EXCLUDED.spread_away_odds,
            moneyline_home = EXCLUDED.moneyline_home,
            moneyline_away = EXCLUDED.moneyline_away,
            total_points = EXCLUDED.total_points,
            over_odds = EXCLUDED.over_odds,
            under_odds = EXCLUDED.under_odds,
            last_updated = EXCLUDED.last_updated
        "#,
    )
    .bind(game_id)
    .bind(bookmaker)
    .bind(line.spread_home)
    .bind(line.spread_away)
    .bind(line.spread_home_odds)
    .bind(line.spread_away_odds)
    .bind(line.moneyline_home)
    .bind(line.moneyline_away)
    .bind(line.total_points)
    .bind(line.over_odds)
    .bind(line.under_odds)
    .bind(line.last_updated.unwrap_or_else(Utc::now))
    .execute(pool)
    .await?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Player injuries
// ---------------------------------------------------------------------------

/// Append an injury report. No dedup: duplicates across runs are kept as a
/// history of the report over time.
pub async fn insert_injury(pool: &PgPool, injury: &NewInjury) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO player_injuries (
            player_name, team, position, injury_status, description, game_id, reported_at
        ) VALUES ($1, $2, $3, $4, $5, $6, $7)
        "#,
    )
    .bind(&injury.player_name)
    .bind(&injury.team)
    .bind(&injury.position)
    .bind(&injury.status)
    .bind(&injury.description)
    .bind(injury.game_id)
    .bind(injury.reported_at)
    .execute(pool)
    .await?;
    Ok(())
}

//! The odds ingestion pipeline.
//!
//! Flow: current-week window → events from the store (or the provider when
//! the window is empty) → per-event odds fetch → reconcile to a game →
//! decompose markets → upsert betting line and flat odds rows. A failure on
//! one event is logged and skipped; the batch continues.

use crate::db;
use crate::markets;
use crate::models::EventRow;
use crate::odds_api::{
    OddsApiClient, DEFAULT_REGIONS, FANDUEL_BOOKMAKER, NFL_SPORT_KEY,
};
use crate::reconcile;
use crate::window::{self, TimeWindow};
use anyhow::{Context, Result};
use chrono::Utc;
use sqlx::PgPool;
use tracing::{error, info, warn};

/// NFL markets requested per event, covering the summary three plus player
/// props and alternate lines for the fine-grained odds table.
pub const NFL_MARKETS: &[&str] = &[
    "totals",
    "team_totals",
    "spreads",
    "player_rush_yds_q1",
    "player_rush_yds_alternate",
    "player_rush_yds",
    "player_rush_reception_yds_alternate",
    "player_rush_reception_yds",
    "player_receptions_alternate",
    "player_rush_attempts",
    "player_receptions",
    "player_reception_yds_alternate",
    "player_reception_yds",
    "player_pass_yds_alternate",
    "player_pass_yds",
    "player_pass_tds_alternate",
    "player_pass_tds",
    "player_anytime_td",
    "h2h",
    "alternate_totals",
    "alternate_team_totals",
    "alternate_spreads",
];

pub struct OddsPipeline {
    db: PgPool,
    client: OddsApiClient,
}

impl OddsPipeline {
    pub fn new(db: PgPool, client: OddsApiClient) -> Self {
        Self { db, client }
    }

    pub async fn run(&self) -> Result<()> {
        let window = window::current_week(Utc::now());
        info!(
            "Week range: {} to {}",
            window.start.format("%Y-%m-%d"),
            window.end.format("%Y-%m-%d")
        );

        let events = self.events_for_window(window).await?;

        let mut processed = 0usize;
        let mut skipped = 0usize;
        for event in &events {
            match self.process_event(event).await {
                Ok(()) => processed += 1,
                Err(e) => {
                    skipped += 1;
                    error!(
                        "Failed to process event {} ({} vs {}): {:#}",
                        event.event_id, event.home_team, event.away_team, e
                    );
                }
            }
        }

        info!(
            "Odds ingestion complete: {} processed, {} skipped, {} provider requests",
            processed,
            skipped,
            self.client.request_count()
        );
        Ok(())
    }

    /// Events for the window, from the store first. The provider is only
    /// consulted when the window holds no stored events; fetched events are
    /// upserted by provider id so a re-fetch converges rather than appends.
    async fn events_for_window(&self, window: TimeWindow) -> Result<Vec<EventRow>> {
        let existing = db::events_in_window(&self.db, window).await?;
        if !existing.is_empty() {
            info!("Found {} events in database", existing.len());
            return Ok(existing);
        }

        info!("No events in window, fetching from provider");
        let api_events = self
            .client
            .get_events(NFL_SPORT_KEY)
            .await
            .context("Failed to fetch events")?;
        info!("Fetched {} events from provider", api_events.len());

        let mut rows = Vec::with_capacity(api_events.len());
        for api_event in &api_events {
            rows.push(db::upsert_event(&self.db, api_event).await?);
        }
        info!("Upserted {} events", rows.len());

        // The provider returns all upcoming events; only this week's feed
        // the odds pass.
        Ok(rows
            .into_iter()
            .filter(|row| window.contains(row.start_time))
            .collect())
    }

    async fn process_event(&self, event: &EventRow) -> Result<()> {
        info!(
            "Processing odds for {} vs {}",
            event.home_team, event.away_team
        );

        let odds = self
            .client
            .get_event_odds(
                NFL_SPORT_KEY,
                &event.event_id,
                DEFAULT_REGIONS,
                &NFL_MARKETS.join(","),
                FANDUEL_BOOKMAKER,
            )
            .await
            .context("Failed to fetch event odds")?;

        let Some(bookmaker) = odds
            .bookmakers
            .iter()
            .find(|b| b.key == FANDUEL_BOOKMAKER)
        else {
            warn!(
                "No {} odds for {} vs {}",
                FANDUEL_BOOKMAKER, event.home_team, event.away_team
            );
            return Ok(());
        };

        // Fine-grained rows across all markets, keyed by the stored event.
        let rows = markets::outcome_rows(bookmaker);
        for row in &rows {
            db::upsert_outcome(&self.db, event.id, row).await?;
        }

        // Denormalized summary, keyed by (game, bookmaker).
        let game = reconcile::find_or_create_game(&self.db, &odds).await?;
        let line = markets::betting_line(bookmaker, &odds.home_team, &odds.away_team);
        db::upsert_betting_line(&self.db, game.id, &bookmaker.key, &line).await?;

        info!(
            "Stored {} outcome rows and betting line for game {}",
            rows.len(),
            game.id
        );
        Ok(())
    }
}

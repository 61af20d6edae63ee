//! NFL odds and stats ingestion pipeline.
//!
//! Two batch jobs share this library:
//!
//! - `ingest-odds` pulls events and FanDuel odds from The Odds API for the
//!   current calendar week, reconciles them to games, and upserts betting
//!   lines and flat outcome rows.
//! - `enrich-games` takes games the odds job created and attaches stats
//!   provider detail: teams, injury reports, scores, venue.
//!
//! Both are idempotent: re-running over overlapping windows converges to
//! the latest provider values instead of duplicating rows (injury reports
//! excepted — those accumulate as a time series by design).

pub mod config;
pub mod db;
pub mod enrich;
pub mod error;
pub mod football_api;
pub mod ingest;
pub mod markets;
pub mod models;
pub mod odds_api;
pub mod reconcile;
pub mod status;
pub mod throttle;
pub mod window;

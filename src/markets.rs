//! Market decomposition: flattening a bookmaker's nested market/outcome
//! payload into the two shapes the store persists.
//!
//! A single bookmaker payload yields:
//! - one denormalized [`BettingLineUpdate`] summarizing the `h2h`,
//!   `spreads` and `totals` markets, and
//! - one flat [`OutcomeRow`] per (market, outcome) pair across *all*
//!   markets, including player props and alternate lines.
//!
//! A market absent from the payload, or an outcome not found by name
//! match, stays `None`. "No price" is never stored as a price of zero.

use crate::models::{Bookmaker, Market, Outcome};
use chrono::{DateTime, Utc};

pub const H2H_MARKET: &str = "h2h";
pub const SPREADS_MARKET: &str = "spreads";
pub const TOTALS_MARKET: &str = "totals";

/// Denormalized per-game summary of moneyline, spread and total prices.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BettingLineUpdate {
    pub spread_home: Option<f64>,
    pub spread_away: Option<f64>,
    pub spread_home_odds: Option<i32>,
    pub spread_away_odds: Option<i32>,
    pub moneyline_home: Option<i32>,
    pub moneyline_away: Option<i32>,
    pub total_points: Option<f64>,
    pub over_odds: Option<i32>,
    pub under_odds: Option<i32>,
    pub last_updated: Option<DateTime<Utc>>,
}

/// One flat outcome row, keyed downstream by (event, market, name, point).
#[derive(Debug, Clone, PartialEq)]
pub struct OutcomeRow {
    pub market: String,
    pub name: String,
    pub price: Option<i32>,
    pub point: Option<f64>,
}

fn find_market<'a>(bookmaker: &'a Bookmaker, key: &str) -> Option<&'a Market> {
    bookmaker.markets.iter().find(|m| m.key == key)
}

fn outcome_named<'a>(market: &'a Market, name: &str) -> Option<&'a Outcome> {
    market.outcomes.iter().find(|o| o.name == name)
}

/// Build the betting-line summary from a bookmaker payload.
///
/// Moneyline and spread outcomes are matched to the home/away team by exact
/// name; totals outcomes by the case-sensitive names `Over` / `Under`. The
/// total line is shared between the two totals outcomes.
pub fn betting_line(bookmaker: &Bookmaker, home_team: &str, away_team: &str) -> BettingLineUpdate {
    let mut line = BettingLineUpdate {
        last_updated: bookmaker.last_update,
        ..Default::default()
    };

    if let Some(market) = find_market(bookmaker, H2H_MARKET) {
        line.moneyline_home = outcome_named(market, home_team).and_then(|o| o.price);
        line.moneyline_away = outcome_named(market, away_team).and_then(|o| o.price);
    }

    if let Some(market) = find_market(bookmaker, SPREADS_MARKET) {
        if let Some(home) = outcome_named(market, home_team) {
            line.spread_home = home.point;
            line.spread_home_odds = home.price;
        }
        if let Some(away) = outcome_named(market, away_team) {
            line.spread_away = away.point;
            line.spread_away_odds = away.price;
        }
    }

    if let Some(market) = find_market(bookmaker, TOTALS_MARKET) {
        let over = outcome_named(market, "Over");
        let under = outcome_named(market, "Under");
        line.total_points = over
            .and_then(|o| o.point)
            .or_else(|| under.and_then(|o| o.point));
        line.over_odds = over.and_then(|o| o.price);
        line.under_odds = under.and_then(|o| o.price);
    }

    line
}

/// Emit one flat row per (market, outcome) pair across all markets.
pub fn outcome_rows(bookmaker: &Bookmaker) -> Vec<OutcomeRow> {
    bookmaker
        .markets
        .iter()
        .flat_map(|market| {
            market.outcomes.iter().map(move |outcome| OutcomeRow {
                market: market.key.clone(),
                name: outcome.name.clone(),
                price: outcome.price,
                point: outcome.point,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const HOME: &str = "Kansas City Chiefs";
    const AWAY: &str = "Buffalo Bills";

    fn outcome(name: &str, price: Option<i32>, point: Option<f64>) -> Outcome {
        Outcome {
            name: name.to_string(),
            price,
            point,
        }
    }

    fn market(key: &str, outcomes: Vec<Outcome>) -> Market {
        Market {
            key: key.to_string(),
            last_update: None,
            outcomes,
        }
    }

    fn bookmaker(markets: Vec<Market>) -> Bookmaker {
        Bookmaker {
            key: "fanduel".to_string(),
            title: "FanDuel".to_string(),
            last_update: None,
            markets,
        }
    }

    #[test]
    fn moneyline_matches_outcomes_by_team_name() {
        let bm = bookmaker(vec![market(
            "h2h",
            vec![
                outcome(HOME, Some(-150), None),
                outcome(AWAY, Some(130), None),
            ],
        )]);
        let line = betting_line(&bm, HOME, AWAY);
        assert_eq!(line.moneyline_home, Some(-150));
        assert_eq!(line.moneyline_away, Some(130));
    }

    #[test]
    fn moneyline_name_mismatch_yields_none_not_a_crash() {
        let bm = bookmaker(vec![market(
            "h2h",
            vec![
                outcome("KC Chiefs", Some(-150), None),
                outcome("Bills", Some(130), None),
            ],
        )]);
        let line = betting_line(&bm, HOME, AWAY);
        assert_eq!(line.moneyline_home, None);
        assert_eq!(line.moneyline_away, None);
    }

    #[test]
    fn spreads_keep_both_price_and_point() {
        let bm = bookmaker(vec![market(
            "spreads",
            vec![
                outcome(HOME, Some(-110), Some(-3.5)),
                outcome(AWAY, Some(-110), Some(3.5)),
            ],
        )]);
        let line = betting_line(&bm, HOME, AWAY);
        assert_eq!(line.spread_home, Some(-3.5));
        assert_eq!(line.spread_away, Some(3.5));
        assert_eq!(line.spread_home_odds, Some(-110));
        assert_eq!(line.spread_away_odds, Some(-110));
    }

    #[test]
    fn totals_share_the_point_between_over_and_under() {
        let bm = bookmaker(vec![market(
            "totals",
            vec![
                outcome("Over", Some(-108), Some(47.5)),
                outcome("Under", Some(-112), Some(47.5)),
            ],
        )]);
        let line = betting_line(&bm, HOME, AWAY);
        assert_eq!(line.total_points, Some(47.5));
        assert_eq!(line.over_odds, Some(-108));
        assert_eq!(line.under_odds, Some(-112));
    }

    #[test]
    fn totals_names_are_case_sensitive() {
        let bm = bookmaker(vec![market(
            "totals",
            vec![
                outcome("over", Some(-108), Some(47.5)),
                outcome("UNDER", Some(-112), Some(47.5)),
            ],
        )]);
        let line = betting_line(&bm, HOME, AWAY);
        assert_eq!(line.total_points, None);
        assert_eq!(line.over_odds, None);
        assert_eq!(line.under_odds, None);
    }

    #[test]
    fn absent_markets_leave_fields_none() {
        let bm = bookmaker(vec![market(
            "h2h",
            vec![outcome(HOME, Some(-150), None)],
        )]);
        let line = betting_line(&bm, HOME, AWAY);
        assert_eq!(line.spread_home, None);
        assert_eq!(line.total_points, None);
        // Matched home outcome still comes through.
        assert_eq!(line.moneyline_home, Some(-150));
        assert_eq!(line.moneyline_away, None);
    }

    #[test]
    fn flat_rows_cover_all_markets_not_just_the_summary_three() {
        let bm = bookmaker(vec![
            market(
                "h2h",
                vec![
                    outcome(HOME, Some(-150), None),
                    outcome(AWAY, Some(130), None),
                ],
            ),
            market(
                "player_anytime_td",
                vec![
                    outcome("Travis Kelce", Some(140), None),
                    outcome("James Cook", Some(165), None),
                ],
            ),
            market(
                "player_pass_yds",
                vec![
                    outcome("Over", Some(-115), Some(272.5)),
                    outcome("Under", Some(-105), Some(272.5)),
                ],
            ),
        ]);
        let rows = outcome_rows(&bm);
        assert_eq!(rows.len(), 6);
        assert!(rows
            .iter()
            .any(|r| r.market == "player_anytime_td" && r.name == "Travis Kelce"));
        let pass_over = rows
            .iter()
            .find(|r| r.market == "player_pass_yds" && r.name == "Over")
            .unwrap();
        assert_eq!(pass_over.point, Some(272.5));
    }

    #[test]
    fn zero_price_survives_decomposition() {
        let bm = bookmaker(vec![market("h2h", vec![outcome(HOME, Some(0), None)])]);
        let line = betting_line(&bm, HOME, AWAY);
        assert_eq!(line.moneyline_home, Some(0));
        let rows = outcome_rows(&bm);
        assert_eq!(rows[0].price, Some(0));
    }
}

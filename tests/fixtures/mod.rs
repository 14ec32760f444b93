//! Test fixtures and session builders for integration testing

#![allow(dead_code)]

use chrono::NaiveDate;
use poker_elo::types::Session;
use poker_elo::RatingEngine;

/// Session results export with a preamble row, an unnamed trailing column
/// and a player sitting out the second game
pub const SAMPLE_SHEET: &str = "\
Home game results,,,,
Date,Alice,Bob,Carol,Dave
2024-01-05,120,-40,-80,
2024-01-12,,60,-20,-40
2024-01-19,-50,-50,25,75
2024-01-26,200,-100,-100,0
";

/// Builds a session with a date derived from its index
pub fn session(index: usize, profits: &[(&str, f64)]) -> Session {
    let date = NaiveDate::from_ymd_opt(2024, 1, 1)
        .unwrap()
        .checked_add_days(chrono::Days::new(7 * index as u64))
        .unwrap();
    Session::new(index, profits.iter().map(|(player, profit)| (*player, *profit))).with_date(date)
}

/// Sessions built from profit rows, indexed in order
pub fn sessions(rows: &[&[(&str, f64)]]) -> Vec<Session> {
    rows.iter()
        .enumerate()
        .map(|(index, profits)| session(index, profits))
        .collect()
}

/// A default engine that has already rated `sessions`
pub fn rated_engine(sessions: &[Session]) -> RatingEngine {
    let mut engine: RatingEngine = RatingEngine::default();
    engine.run(sessions).unwrap();
    engine
}

//! Read-only projections over committed engine state
//!
//! Current ratings, ranking, per-player series and the serializable report
//! consumed by the exporters.

use crate::engine::history::{HistoryLog, SessionRecord};
use crate::rating::table::{RatingEntry, RatingTable};
use crate::types::{HistoryEntry, PlayerName, RankingEntry};
use crate::utils::{current_timestamp, ranking_order, round_rating};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::iter::FusedIterator;

/// Borrowed view over the rating table and history log
#[derive(Debug, Clone, Copy)]
pub struct RatingView<'a> {
    table: &'a RatingTable,
    history: &'a HistoryLog,
}

/// Every known player's rating right after one session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    #[serde(rename = "session")]
    pub session_index: usize,
    pub date: Option<NaiveDate>,
    pub ratings: BTreeMap<PlayerName, f64>,
}

/// One point of a player's rating series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    #[serde(rename = "session")]
    pub session_index: usize,
    pub date: Option<NaiveDate>,
    pub rating: f64,
}

/// Serializable summary of a run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RatingReport {
    pub last_updated: String,
    pub current_ratings: BTreeMap<PlayerName, f64>,
    pub rankings: Vec<RankingEntry>,
    pub history: Vec<SessionSnapshot>,
    pub players: BTreeMap<PlayerName, Vec<SeriesPoint>>,
}

/// Lazy, restartable rating series of one player
#[derive(Debug, Clone, Copy)]
pub struct PlayerHistory<'a> {
    entries: &'a [HistoryEntry],
    positions: &'a [usize],
}

/// Iterator over `(session_index, rating)` pairs of a [`PlayerHistory`]
#[derive(Debug, Clone)]
pub struct PlayerHistoryIter<'a> {
    entries: &'a [HistoryEntry],
    positions: std::slice::Iter<'a, usize>,
}

impl<'a> PlayerHistory<'a> {
    /// Start (or restart) iteration from the player's first session
    pub fn iter(&self) -> PlayerHistoryIter<'a> {
        let positions: &'a [usize] = self.positions;
        PlayerHistoryIter {
            entries: self.entries,
            positions: positions.iter(),
        }
    }

    /// Full entries, including dates
    pub fn entries(&self) -> impl Iterator<Item = &'a HistoryEntry> + 'a {
        let entries = self.entries;
        let positions: &'a [usize] = self.positions;
        positions.iter().map(move |&i| &entries[i])
    }

    pub fn latest(&self) -> Option<(usize, f64)> {
        self.iter().last()
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

impl<'a> Iterator for PlayerHistoryIter<'a> {
    type Item = (usize, f64);

    fn next(&mut self) -> Option<Self::Item> {
        self.positions.next().map(|&i| {
            let entry = &self.entries[i];
            (entry.session_index, entry.rating)
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.positions.size_hint()
    }
}

impl ExactSizeIterator for PlayerHistoryIter<'_> {}

impl FusedIterator for PlayerHistoryIter<'_> {}

impl<'a> IntoIterator for PlayerHistory<'a> {
    type Item = (usize, f64);
    type IntoIter = PlayerHistoryIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a> RatingView<'a> {
    pub fn new(table: &'a RatingTable, history: &'a HistoryLog) -> Self {
        Self { table, history }
    }

    /// Current rating of every player seen so far
    pub fn current_ratings(&self) -> BTreeMap<PlayerName, f64> {
        self.table.ratings()
    }

    /// Players by rating descending; equal ratings fall back to name ascending
    pub fn ranking(&self) -> Vec<RankingEntry> {
        let mut ordered: Vec<&RatingEntry> = self.table.iter().collect();
        ordered.sort_by(|a, b| {
            ranking_order((a.player.as_str(), a.rating), (b.player.as_str(), b.rating))
        });

        ordered
            .into_iter()
            .enumerate()
            .map(|(i, entry)| RankingEntry {
                rank: i + 1,
                player: entry.player.clone(),
                rating: entry.rating,
                sessions_played: entry.sessions_played,
            })
            .collect()
    }

    /// Rating series for one player; empty if they never played
    pub fn history(&self, player: &str) -> PlayerHistory<'a> {
        PlayerHistory {
            entries: self.history.entries(),
            positions: self.history.positions_of(player),
        }
    }

    /// Full history log in commit order
    pub fn entries(&self) -> &'a [HistoryEntry] {
        self.history.entries()
    }

    pub fn sessions(&self) -> &'a [SessionRecord] {
        self.history.sessions()
    }

    /// Players in order of first appearance
    pub fn players(&self) -> &'a [PlayerName] {
        self.table.players()
    }

    /// After every session, the latest rating of every player seen so far
    pub fn snapshots(&self) -> Vec<SessionSnapshot> {
        let mut running = BTreeMap::new();
        self.history
            .sessions()
            .iter()
            .map(|record| {
                for change in &record.changes {
                    running.insert(change.player.clone(), change.new_rating);
                }
                SessionSnapshot {
                    session_index: record.session_index,
                    date: record.date,
                    ratings: running.clone(),
                }
            })
            .collect()
    }

    /// Build the serializable report; displayed ratings are rounded to cents
    pub fn report(&self) -> RatingReport {
        let rankings = self
            .ranking()
            .into_iter()
            .map(|entry| RankingEntry {
                rating: round_rating(entry.rating),
                ..entry
            })
            .collect();

        let history = self
            .snapshots()
            .into_iter()
            .map(|snapshot| SessionSnapshot {
                ratings: snapshot
                    .ratings
                    .into_iter()
                    .map(|(player, rating)| (player, round_rating(rating)))
                    .collect(),
                ..snapshot
            })
            .collect();

        let players = self
            .table
            .players()
            .iter()
            .map(|player| {
                let series = self
                    .history(player)
                    .entries()
                    .map(|entry| SeriesPoint {
                        session_index: entry.session_index,
                        date: entry.date,
                        rating: round_rating(entry.rating),
                    })
                    .collect();
                (player.clone(), series)
            })
            .collect();

        RatingReport {
            last_updated: current_timestamp().format("%Y-%m-%d %H:%M:%S").to_string(),
            current_ratings: self.current_ratings(),
            rankings,
            history,
            players,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RatingChange;

    fn record(session_index: usize, changes: &[(&str, f64, f64)]) -> SessionRecord {
        SessionRecord {
            session_index,
            date: NaiveDate::from_ymd_opt(2024, 1, 1 + session_index as u32),
            changes: changes
                .iter()
                .map(|(player, old_rating, new_rating)| RatingChange {
                    player: player.to_string(),
                    old_rating: *old_rating,
                    new_rating: *new_rating,
                    delta: new_rating - old_rating,
                })
                .collect(),
        }
    }

    fn fixture() -> (RatingTable, HistoryLog) {
        let mut table = RatingTable::new();
        let mut history = HistoryLog::new();

        for rec in [
            record(0, &[("bob", 1500.0, 1520.0), ("alice", 1500.0, 1480.0)]),
            record(1, &[("alice", 1480.0, 1520.0), ("carol", 1500.0, 1460.0)]),
        ] {
            table.apply_session(&rec.changes);
            history.record_session(rec);
        }

        (table, history)
    }

    #[test]
    fn test_ranking_ties_break_by_name() {
        let (table, history) = fixture();
        let view = RatingView::new(&table, &history);

        let ranking = view.ranking();
        assert_eq!(ranking.len(), 3);
        assert_eq!(ranking[0].player, "alice");
        assert_eq!(ranking[0].rank, 1);
        assert_eq!(ranking[0].sessions_played, 2);
        assert_eq!(ranking[1].player, "bob");
        assert_eq!(ranking[1].rank, 2);
        assert_eq!(ranking[2].player, "carol");

        // Repeated calls agree
        assert_eq!(view.ranking(), ranking);
    }

    #[test]
    fn test_player_history_is_restartable() {
        let (table, history) = fixture();
        let view = RatingView::new(&table, &history);

        let alice = view.history("alice");
        assert_eq!(alice.len(), 2);
        let first: Vec<_> = alice.iter().collect();
        let second: Vec<_> = alice.into_iter().collect();
        assert_eq!(first, vec![(0, 1480.0), (1, 1520.0)]);
        assert_eq!(first, second);
        assert_eq!(alice.latest(), Some((1, 1520.0)));

        assert!(view.history("dave").is_empty());
        assert_eq!(view.history("dave").iter().count(), 0);
    }

    #[test]
    fn test_snapshots_carry_ratings_forward() {
        let (table, history) = fixture();
        let view = RatingView::new(&table, &history);

        let snapshots = view.snapshots();
        assert_eq!(snapshots.len(), 2);
        assert_eq!(snapshots[0].ratings.len(), 2);
        assert!(!snapshots[0].ratings.contains_key("carol"));
        // bob sat out session 1 and keeps the earlier rating
        assert_eq!(snapshots[1].ratings["bob"], 1520.0);
        assert_eq!(snapshots[1].ratings["carol"], 1460.0);
    }

    #[test]
    fn test_report_shape() {
        let (table, history) = fixture();
        let view = RatingView::new(&table, &history);

        let report = view.report();
        assert_eq!(report.rankings.len(), 3);
        assert_eq!(report.history.len(), 2);
        assert_eq!(report.players["alice"].len(), 2);
        assert_eq!(report.players["bob"].len(), 1);
        assert_eq!(report.current_ratings["carol"], 1460.0);

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["rankings"][0]["player"], "alice");
        assert_eq!(json["rankings"][2]["sessions_played"], 1);
        assert_eq!(json["history"][1]["session"], 1);
        assert_eq!(json["history"][1]["date"], "2024-01-02");
    }
}

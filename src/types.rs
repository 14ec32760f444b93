//! Common types used throughout the rating engine

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Players are identified by their (case-sensitive) name
pub type PlayerName = String;

/// A single player cell of the session table, as produced by the loader.
///
/// Absence means the player did not sit in that session; it is never the same
/// thing as a zero result.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Cell {
    Present(f64),
    Absent,
}

impl Cell {
    pub fn value(&self) -> Option<f64> {
        match self {
            Cell::Present(profit) => Some(*profit),
            Cell::Absent => None,
        }
    }

    pub fn is_present(&self) -> bool {
        matches!(self, Cell::Present(_))
    }
}

impl From<Option<f64>> for Cell {
    fn from(value: Option<f64>) -> Self {
        match value {
            Some(profit) => Cell::Present(profit),
            None => Cell::Absent,
        }
    }
}

/// One recorded poker session.
///
/// `index` is the chronological position (0-based); `date` is carried for
/// display and export only and never used for ordering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub index: usize,
    pub date: Option<NaiveDate>,
    /// Participants and their net profit, in column order
    pub profits: Vec<(PlayerName, f64)>,
}

impl Session {
    /// Create a session from (player, profit) pairs
    pub fn new<I, S>(index: usize, profits: I) -> Self
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<PlayerName>,
    {
        Self {
            index,
            date: None,
            profits: profits
                .into_iter()
                .map(|(player, profit)| (player.into(), profit))
                .collect(),
        }
    }

    /// Build a session from loader cells, keeping only present values
    pub fn from_cells(
        index: usize,
        date: Option<NaiveDate>,
        cells: Vec<(PlayerName, Cell)>,
    ) -> Self {
        let profits = cells
            .into_iter()
            .filter_map(|(player, cell)| cell.value().map(|profit| (player, profit)))
            .collect();

        Self {
            index,
            date,
            profits,
        }
    }

    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    pub fn participants(&self) -> impl Iterator<Item = &str> {
        self.profits.iter().map(|(player, _)| player.as_str())
    }

    pub fn profit_of(&self, player: &str) -> Option<f64> {
        self.profits
            .iter()
            .find(|(name, _)| name == player)
            .map(|(_, profit)| *profit)
    }

    pub fn len(&self) -> usize {
        self.profits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profits.is_empty()
    }
}

/// Rating of one participant after one committed session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub session_index: usize,
    pub date: Option<NaiveDate>,
    pub player: PlayerName,
    pub rating: f64,
}

/// Position of a player in the current ranking (1 = best)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingEntry {
    pub rank: usize,
    pub player: PlayerName,
    pub rating: f64,
    pub sessions_played: u64,
}

/// Rating change information for a player within one session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatingChange {
    pub player: PlayerName,
    pub old_rating: f64,
    pub new_rating: f64,
    pub delta: f64,
}

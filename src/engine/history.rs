//! Append-only history log

use crate::types::{HistoryEntry, PlayerName, RatingChange};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// What one committed session did to its participants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub session_index: usize,
    pub date: Option<NaiveDate>,
    pub changes: Vec<RatingChange>,
}

/// Ordered log of history entries with a per-player index.
///
/// Entries are never revised once written.
#[derive(Debug, Clone, Default)]
pub struct HistoryLog {
    entries: Vec<HistoryEntry>,
    by_player: HashMap<PlayerName, Vec<usize>>,
    sessions: Vec<SessionRecord>,
}

impl HistoryLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one entry per participant of a committed session
    pub fn record_session(&mut self, record: SessionRecord) {
        for change in &record.changes {
            let positions = self.by_player.entry(change.player.clone()).or_default();
            debug_assert!(positions
                .last()
                .map_or(true, |&last| self.entries[last].session_index < record.session_index));

            positions.push(self.entries.len());
            self.entries.push(HistoryEntry {
                session_index: record.session_index,
                date: record.date,
                player: change.player.clone(),
                rating: change.new_rating,
            });
        }
        self.sessions.push(record);
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn sessions(&self) -> &[SessionRecord] {
        &self.sessions
    }

    /// Positions in [`entries`](Self::entries) belonging to `player`
    pub fn positions_of(&self, player: &str) -> &[usize] {
        self.by_player
            .get(player)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

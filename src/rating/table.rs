//! Current-rating table
//!
//! Holds exactly one rating per player that has appeared in at least one
//! committed session. The engine is the only writer.

use crate::types::{PlayerName, RatingChange};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Table entry for a player's rating with metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatingEntry {
    pub player: PlayerName,
    pub rating: f64,
    pub sessions_played: u64,
}

impl RatingEntry {
    /// Create an entry for a player after their first session
    pub fn new(player: PlayerName, rating: f64) -> Self {
        Self {
            player,
            rating,
            sessions_played: 1,
        }
    }

    /// Update the rating and increment sessions played
    pub fn update_rating(&mut self, new_rating: f64) {
        self.rating = new_rating;
        self.sessions_played += 1;
    }
}

/// Player → current rating, remembering the order players first appeared in
#[derive(Debug, Clone, Default)]
pub struct RatingTable {
    entries: HashMap<PlayerName, RatingEntry>,
    order: Vec<PlayerName>,
}

impl RatingTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_rating(&self, player: &str) -> Option<f64> {
        self.entries.get(player).map(|entry| entry.rating)
    }

    pub fn get_entry(&self, player: &str) -> Option<&RatingEntry> {
        self.entries.get(player)
    }

    pub fn contains(&self, player: &str) -> bool {
        self.entries.contains_key(player)
    }

    /// Commit one session's changes in a single step
    pub fn apply_session(&mut self, changes: &[RatingChange]) {
        for change in changes {
            match self.entries.get_mut(&change.player) {
                Some(entry) => entry.update_rating(change.new_rating),
                None => {
                    self.order.push(change.player.clone());
                    self.entries.insert(
                        change.player.clone(),
                        RatingEntry::new(change.player.clone(), change.new_rating),
                    );
                }
            }
        }
    }

    /// Entries in order of first appearance
    pub fn iter(&self) -> impl Iterator<Item = &RatingEntry> {
        self.order.iter().filter_map(|player| self.entries.get(player))
    }

    /// Player names in order of first appearance
    pub fn players(&self) -> &[PlayerName] {
        &self.order
    }

    pub fn ratings(&self) -> BTreeMap<PlayerName, f64> {
        self.entries
            .iter()
            .map(|(player, entry)| (player.clone(), entry.rating))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

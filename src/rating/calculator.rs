//! Rating calculator trait
//!
//! This module defines the interface the engine uses to turn one session into
//! per-player rating changes.

use crate::types::{PlayerName, RatingChange, Session};
use serde::{Deserialize, Serialize};

/// Result of rating one session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RatingCalculationResult {
    /// Rating changes for all participants, in session order
    pub rating_changes: Vec<RatingChange>,
    /// Number of virtual matches evaluated
    pub match_count: usize,
}

impl RatingCalculationResult {
    /// Sum of all deltas in the session
    pub fn delta_sum(&self) -> f64 {
        self.rating_changes.iter().map(|change| change.delta).sum()
    }
}

/// Trait for calculating rating changes after a session
pub trait RatingCalculator {
    /// Calculate rating changes for every participant of a session
    ///
    /// # Arguments
    /// * `session` - The session with each participant's net profit
    /// * `players` - (player, pre-session rating) for every participant
    ///
    /// # Returns
    /// Result containing one rating change per participant. The calculator
    /// must not read ratings updated within the same session.
    fn calculate_rating_changes(
        &self,
        session: &Session,
        players: &[(PlayerName, f64)],
    ) -> crate::error::Result<RatingCalculationResult>;

    /// Get the initial rating for new players
    fn initial_rating(&self) -> f64;
}

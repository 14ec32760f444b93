//! Rating system: pairwise synthesis and the profit-aware ELO update
//!
//! This module turns a multi-player session into virtual two-player matches,
//! computes ELO deltas from them and keeps the table of current ratings.

pub mod calculator;
pub mod elo;
pub mod pairwise;
pub mod table;

// Re-export commonly used types
pub use calculator::{RatingCalculationResult, RatingCalculator};
pub use elo::EloRatingCalculator;
pub use pairwise::{synthesize_matches, validate_session, MatchOutcome, VirtualMatch};
pub use table::{RatingEntry, RatingTable};

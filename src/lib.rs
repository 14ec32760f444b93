//! Poker ELO - profit-aware ratings for recurring poker games
//!
//! This crate rates a fixed pool of players across repeated multi-player
//! sessions. Each session's profits are turned into pairwise virtual matches
//! and fed through an ELO update whose K-factor scales with the profit gap.

pub mod config;
pub mod engine;
pub mod error;
pub mod io;
pub mod rating;
pub mod types;
pub mod utils;

// Re-export commonly used types and traits
pub use error::{RatingError, Result};
pub use types::*;

// Re-export key components
pub use engine::{EngineState, RatingEngine, RatingView, RunSummary};
pub use rating::{EloRatingCalculator, RatingCalculator};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

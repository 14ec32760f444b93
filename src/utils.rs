//! Utility functions for the rating engine

use chrono::{DateTime, Utc};
use std::cmp::Ordering;

/// Get the current UTC timestamp
pub fn current_timestamp() -> DateTime<Utc> {
    Utc::now()
}

/// Absolute difference between two profits
pub fn profit_difference(profit1: f64, profit2: f64) -> f64 {
    (profit1 - profit2).abs()
}

/// Round a rating to two decimals for display and export
pub fn round_rating(rating: f64) -> f64 {
    (rating * 100.0).round() / 100.0
}

/// Ranking order: rating descending, then name ascending
pub fn ranking_order(a: (&str, f64), b: (&str, f64)) -> Ordering {
    b.1.total_cmp(&a.1).then_with(|| a.0.cmp(b.0))
}

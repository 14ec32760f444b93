//! Profit-aware ELO rating calculator
//!
//! This module provides the concrete rating calculator: the standard logistic
//! ELO expected score (via the skillratings crate) combined with a K-factor
//! that grows with the profit gap between the two players of a virtual match.

use crate::config::rating::{KFactorMode, RatingConfig};
use crate::error::RatingError;
use crate::rating::calculator::{RatingCalculationResult, RatingCalculator};
use crate::rating::pairwise::{synthesize_matches, VirtualMatch};
use crate::types::{PlayerName, RatingChange, Session};
use skillratings::elo::{expected_score, EloRating};
use std::collections::HashMap;
use tracing::debug;

/// Keeps the session-relative scale finite when every profit is zero
const SESSION_SCALE_EPSILON: f64 = 1e-6;

/// ELO rating calculator with a dynamic K-factor
#[derive(Debug, Clone, Default)]
pub struct EloRatingCalculator {
    config: RatingConfig,
}

impl EloRatingCalculator {
    /// Create a new ELO rating calculator
    pub fn new(config: RatingConfig) -> crate::error::Result<Self> {
        config.validate()?;

        Ok(Self { config })
    }

    pub fn rating_config(&self) -> &RatingConfig {
        &self.config
    }

    /// Expected scores `(E_A, E_B)` for two ratings on the 400-point logistic curve
    pub fn expected_scores(&self, rating_a: f64, rating_b: f64) -> (f64, f64) {
        expected_score(
            &EloRating { rating: rating_a },
            &EloRating { rating: rating_b },
        )
    }

    /// K-factor for a pair with the given profit gap.
    ///
    /// `session_scale` is the mean absolute profit of the session and only
    /// matters in [`KFactorMode::SessionRelative`].
    pub fn k_factor(&self, magnitude: f64, session_scale: f64) -> f64 {
        match self.config.k_mode {
            KFactorMode::Clamped => {
                let multiplier = (magnitude / self.config.reference_magnitude)
                    .clamp(self.config.min_k_scale, self.config.max_k_scale);
                self.config.k_base * multiplier
            }
            KFactorMode::SessionRelative => {
                self.config.k_base * (1.0 + magnitude / session_scale)
            }
        }
    }

    /// Deltas `(delta_A, delta_B)` for one virtual match at pre-session ratings
    pub fn match_deltas(
        &self,
        virtual_match: &VirtualMatch<'_>,
        rating_a: f64,
        rating_b: f64,
        session_scale: f64,
    ) -> (f64, f64) {
        let outcome = virtual_match.outcome();
        let (expected_a, expected_b) = self.expected_scores(rating_a, rating_b);
        let k = self.k_factor(virtual_match.magnitude(), session_scale);

        (
            k * (outcome.score_a() - expected_a),
            k * (outcome.score_b() - expected_b),
        )
    }

    fn session_scale(session: &Session) -> f64 {
        let total: f64 = session.profits.iter().map(|(_, profit)| profit.abs()).sum();
        total / session.len() as f64 + SESSION_SCALE_EPSILON
    }
}

impl RatingCalculator for EloRatingCalculator {
    fn calculate_rating_changes(
        &self,
        session: &Session,
        players: &[(PlayerName, f64)],
    ) -> crate::error::Result<RatingCalculationResult> {
        let matches = synthesize_matches(session)?;

        // Pre-session ratings; nothing below writes to them
        let pre_session: HashMap<&str, f64> = players
            .iter()
            .map(|(player, rating)| (player.as_str(), *rating))
            .collect();

        let rating_of = |player: &str| -> crate::error::Result<f64> {
            pre_session.get(player).copied().ok_or_else(|| {
                RatingError::UnknownPlayerState {
                    player: player.to_string(),
                    session_index: session.index,
                }
                .into()
            })
        };

        let position: HashMap<&str, usize> = session
            .participants()
            .enumerate()
            .map(|(i, player)| (player, i))
            .collect();
        let mut deltas = vec![0.0; session.len()];

        let session_scale = Self::session_scale(session);
        if self.config.k_mode == KFactorMode::SessionRelative && !session_scale.is_finite() {
            return Err(RatingError::InvalidSession {
                session_index: session.index,
                reason: "profits are too large to rate: mean absolute profit overflows"
                    .to_string(),
            }
            .into());
        }
        for virtual_match in &matches {
            let rating_a = rating_of(virtual_match.player_a)?;
            let rating_b = rating_of(virtual_match.player_b)?;
            let (delta_a, delta_b) =
                self.match_deltas(virtual_match, rating_a, rating_b, session_scale);

            debug!(
                "session {}: {} vs {} gap={:.2} -> {:+.3} / {:+.3}",
                session.index,
                virtual_match.player_a,
                virtual_match.player_b,
                virtual_match.magnitude(),
                delta_a,
                delta_b
            );

            deltas[position[virtual_match.player_a]] += delta_a;
            deltas[position[virtual_match.player_b]] += delta_b;
        }

        let mut rating_changes = Vec::with_capacity(session.len());
        for ((player, _), delta) in session.profits.iter().zip(deltas) {
            let old_rating = rating_of(player)?;
            rating_changes.push(RatingChange {
                player: player.clone(),
                old_rating,
                new_rating: old_rating + delta,
                delta,
            });
        }

        Ok(RatingCalculationResult {
            rating_changes,
            match_count: matches.len(),
        })
    }

    fn initial_rating(&self) -> f64 {
        self.config.initial_rating
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pre_session(players: &[(&str, f64)]) -> Vec<(PlayerName, f64)> {
        players
            .iter()
            .map(|(player, rating)| (player.to_string(), *rating))
            .collect()
    }

    fn change_for<'a>(result: &'a RatingCalculationResult, player: &str) -> &'a RatingChange {
        result
            .rating_changes
            .iter()
            .find(|change| change.player == player)
            .unwrap()
    }

    #[test]
    fn test_expected_scores() {
        let calculator = EloRatingCalculator::default();

        let (e_a, e_b) = calculator.expected_scores(1500.0, 1500.0);
        assert_eq!(e_a, 0.5);
        assert_eq!(e_b, 0.5);

        // 400 points apart is 10:1 odds
        let (strong, weak) = calculator.expected_scores(1900.0, 1500.0);
        assert!((strong - 10.0 / 11.0).abs() < 1e-12);
        assert!((strong + weak - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_k_factor_clamping() {
        let calculator = EloRatingCalculator::default();

        assert_eq!(calculator.k_factor(100.0, 1.0), 32.0);
        assert_eq!(calculator.k_factor(200.0, 1.0), 64.0);
        // Outlier swing is capped
        assert_eq!(calculator.k_factor(10_000.0, 1.0), 64.0);
        // Tiny swing still moves ratings a little
        assert_eq!(calculator.k_factor(0.0, 1.0), 16.0);
        assert_eq!(calculator.k_factor(75.0, 1.0), 24.0);
    }

    #[test]
    fn test_session_relative_k_factor() {
        let config = RatingConfig {
            k_base: 30.0,
            k_mode: KFactorMode::SessionRelative,
            ..RatingConfig::default()
        };
        let calculator = EloRatingCalculator::new(config).unwrap();

        assert_eq!(calculator.k_factor(0.0, 10.0), 30.0);
        assert_eq!(calculator.k_factor(20.0, 10.0), 90.0);
    }

    #[test]
    fn test_two_player_example() {
        let calculator = EloRatingCalculator::default();
        let session = Session::new(0, [("A", 100.0), ("B", -100.0)]);
        let players = pre_session(&[("A", 1500.0), ("B", 1500.0)]);

        let result = calculator
            .calculate_rating_changes(&session, &players)
            .unwrap();

        assert_eq!(result.match_count, 1);
        assert_eq!(change_for(&result, "A").new_rating, 1532.0);
        assert_eq!(change_for(&result, "B").new_rating, 1468.0);
        assert_eq!(change_for(&result, "A").delta, 32.0);
    }

    #[test]
    fn test_push_between_equals_changes_nothing() {
        let calculator = EloRatingCalculator::default();
        let session = Session::new(0, [("A", 25.0), ("B", 25.0)]);
        let players = pre_session(&[("A", 1500.0), ("B", 1500.0)]);

        let result = calculator
            .calculate_rating_changes(&session, &players)
            .unwrap();

        assert_eq!(change_for(&result, "A").delta, 0.0);
        assert_eq!(change_for(&result, "B").delta, 0.0);
    }

    #[test]
    fn test_upset_moves_more_than_expected_win() {
        let calculator = EloRatingCalculator::default();
        let players = pre_session(&[("strong", 1700.0), ("weak", 1300.0)]);

        let expected = Session::new(0, [("strong", 100.0), ("weak", -100.0)]);
        let upset = Session::new(0, [("strong", -100.0), ("weak", 100.0)]);

        let expected_gain = change_for(
            &calculator.calculate_rating_changes(&expected, &players).unwrap(),
            "strong",
        )
        .delta;
        let upset_gain = change_for(
            &calculator.calculate_rating_changes(&upset, &players).unwrap(),
            "weak",
        )
        .delta;

        assert!(expected_gain > 0.0);
        assert!(upset_gain > expected_gain);
    }

    #[test]
    fn test_deltas_use_pre_session_ratings_only() {
        let calculator = EloRatingCalculator::default();
        let players = pre_session(&[("a", 1520.0), ("b", 1480.0), ("c", 1500.0)]);

        let forward = Session::new(0, [("a", 50.0), ("b", -20.0), ("c", -30.0)]);
        let reversed = Session::new(0, [("c", -30.0), ("b", -20.0), ("a", 50.0)]);

        let forward = calculator
            .calculate_rating_changes(&forward, &players)
            .unwrap();
        let reversed = calculator
            .calculate_rating_changes(&reversed, &players)
            .unwrap();

        for player in ["a", "b", "c"] {
            let d1 = change_for(&forward, player).delta;
            let d2 = change_for(&reversed, player).delta;
            assert!((d1 - d2).abs() < 1e-9, "{} differs: {} vs {}", player, d1, d2);
        }
    }

    #[test]
    fn test_session_delta_sum_is_zero() {
        let calculator = EloRatingCalculator::default();
        let session = Session::new(0, [("a", 10.0), ("b", 5.0), ("c", -15.0), ("d", 250.0)]);
        let players = pre_session(&[("a", 1610.0), ("b", 1500.0), ("c", 1422.5), ("d", 1500.0)]);

        let result = calculator
            .calculate_rating_changes(&session, &players)
            .unwrap();
        assert_eq!(result.match_count, 6);
        assert!(result.delta_sum().abs() < 1e-9);
    }

    #[test]
    fn test_missing_pre_session_rating() {
        let calculator = EloRatingCalculator::default();
        let session = Session::new(7, [("a", 10.0), ("b", -10.0)]);
        let players = pre_session(&[("a", 1500.0)]);

        let err = calculator
            .calculate_rating_changes(&session, &players)
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<RatingError>(),
            Some(RatingError::UnknownPlayerState { session_index: 7, .. })
        ));
    }

    #[test]
    fn test_new_validates_config() {
        let calculator = EloRatingCalculator::new(RatingConfig {
            initial_rating: 1200.0,
            ..RatingConfig::default()
        })
        .unwrap();
        assert_eq!(calculator.initial_rating(), 1200.0);
        assert_eq!(EloRatingCalculator::default().initial_rating(), 1500.0);

        let invalid = RatingConfig {
            k_base: -1.0,
            ..RatingConfig::default()
        };
        assert!(EloRatingCalculator::new(invalid).is_err());
    }

    #[test]
    fn test_overflowing_session_scale_is_reported() {
        let calculator = EloRatingCalculator::new(RatingConfig {
            k_mode: KFactorMode::SessionRelative,
            ..RatingConfig::default()
        })
        .unwrap();
        let session = Session::new(0, [("A", 1e308), ("B", -1e308)]);
        let players = pre_session(&[("A", 1500.0), ("B", 1500.0)]);

        let err = calculator
            .calculate_rating_changes(&session, &players)
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<RatingError>(),
            Some(RatingError::InvalidSession { session_index: 0, .. })
        ));
        assert!(err.to_string().contains("too large to rate"));

        // Clamped mode caps the multiplier and still rates the session
        let result = EloRatingCalculator::default()
            .calculate_rating_changes(&session, &players)
            .unwrap();
        assert_eq!(change_for(&result, "A").delta, 32.0);
    }
}

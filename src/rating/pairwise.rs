//! Pairwise outcome synthesis
//!
//! Turns one multi-player session into a set of two-player "virtual matches",
//! one per unordered pair of participants, so that the classic two-player ELO
//! update can be applied to every pair.

use crate::error::RatingError;
use crate::types::Session;
use crate::utils::profit_difference;
use std::collections::HashSet;

/// Result of a virtual match from the first player's point of view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchOutcome {
    WinA,
    WinB,
    Push,
}

impl MatchOutcome {
    pub fn score_a(&self) -> f64 {
        match self {
            MatchOutcome::WinA => 1.0,
            MatchOutcome::WinB => 0.0,
            MatchOutcome::Push => 0.5,
        }
    }

    pub fn score_b(&self) -> f64 {
        1.0 - self.score_a()
    }
}

/// A synthesized comparison between two participants of one session
#[derive(Debug, Clone, PartialEq)]
pub struct VirtualMatch<'a> {
    pub player_a: &'a str,
    pub player_b: &'a str,
    pub profit_a: f64,
    pub profit_b: f64,
}

impl VirtualMatch<'_> {
    pub fn outcome(&self) -> MatchOutcome {
        if self.profit_a > self.profit_b {
            MatchOutcome::WinA
        } else if self.profit_a < self.profit_b {
            MatchOutcome::WinB
        } else {
            MatchOutcome::Push
        }
    }

    /// Size of the profit gap; scales the K-factor, independent of who won
    pub fn magnitude(&self) -> f64 {
        profit_difference(self.profit_a, self.profit_b)
    }
}

/// Check that a session can be rated
pub fn validate_session(session: &Session) -> crate::error::Result<()> {
    let invalid = |reason: String| RatingError::InvalidSession {
        session_index: session.index,
        reason,
    };

    if session.is_empty() {
        return Err(invalid("no recorded profits".to_string()).into());
    }

    if session.len() < 2 {
        return Err(invalid(format!(
            "only one participant ({}), need at least two",
            session.profits[0].0
        ))
        .into());
    }

    let mut seen = HashSet::with_capacity(session.len());
    for (player, profit) in &session.profits {
        if !profit.is_finite() {
            return Err(invalid(format!("profit for {} is not a finite number", player)).into());
        }
        if !seen.insert(player.as_str()) {
            return Err(invalid(format!("player {} appears more than once", player)).into());
        }
    }

    Ok(())
}

/// Build one virtual match per unordered pair of participants.
///
/// Pairs are produced in participant order (`i < j`), giving C(n, 2) matches.
pub fn synthesize_matches(session: &Session) -> crate::error::Result<Vec<VirtualMatch<'_>>> {
    validate_session(session)?;

    let n = session.len();
    let mut matches = Vec::with_capacity(n * (n - 1) / 2);
    for (i, (player_a, profit_a)) in session.profits.iter().enumerate() {
        for (player_b, profit_b) in &session.profits[i + 1..] {
            matches.push(VirtualMatch {
                player_a: player_a.as_str(),
                player_b: player_b.as_str(),
                profit_a: *profit_a,
                profit_b: *profit_b,
            });
        }
    }

    Ok(matches)
}

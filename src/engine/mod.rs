//! Rating engine
//!
//! Owns the current-rating table and the history log, and drives sessions
//! through the rating calculator strictly in input order.

pub mod history;
pub mod view;

pub use history::{HistoryLog, SessionRecord};
pub use view::{
    PlayerHistory, PlayerHistoryIter, RatingReport, RatingView, SeriesPoint, SessionSnapshot,
};

use crate::config::rating::RatingConfig;
use crate::error::{RatingError, Result};
use crate::rating::calculator::RatingCalculator;
use crate::rating::elo::EloRatingCalculator;
use crate::rating::table::RatingTable;
use crate::types::{PlayerName, RankingEntry, RatingChange, Session};
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use tracing::{debug, info, warn};

/// Lifecycle of an engine run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum EngineState {
    /// No session processed yet
    Uninitialized,
    /// `session_index` was the last committed session
    Processing { session_index: usize },
    /// All input consumed
    Done { sessions: usize },
    /// Aborted on `session_index`; earlier history is kept for inspection only
    Failed { session_index: usize, reason: String },
}

impl fmt::Display for EngineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineState::Uninitialized => write!(f, "uninitialized"),
            EngineState::Processing { session_index } => {
                write!(f, "processing (last session {})", session_index)
            }
            EngineState::Done { sessions } => write!(f, "done ({} sessions)", sessions),
            EngineState::Failed {
                session_index,
                reason,
            } => write!(f, "failed at session {}: {}", session_index, reason),
        }
    }
}

/// Outcome of a full run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub sessions_processed: usize,
    pub players: usize,
    pub matches_evaluated: usize,
}

/// Sequential rating engine
#[derive(Debug)]
pub struct RatingEngine<C = EloRatingCalculator> {
    calculator: C,
    table: RatingTable,
    history: HistoryLog,
    state: EngineState,
    matches_evaluated: usize,
}

impl Default for RatingEngine<EloRatingCalculator> {
    fn default() -> Self {
        Self::new(EloRatingCalculator::default())
    }
}

impl RatingEngine<EloRatingCalculator> {
    /// Engine backed by the profit-aware ELO calculator
    pub fn with_config(config: RatingConfig) -> Result<Self> {
        Ok(Self::new(EloRatingCalculator::new(config)?))
    }
}

impl<C: RatingCalculator> RatingEngine<C> {
    /// Create an engine with an empty rating table
    pub fn new(calculator: C) -> Self {
        Self {
            calculator,
            table: RatingTable::new(),
            history: HistoryLog::new(),
            state: EngineState::Uninitialized,
            matches_evaluated: 0,
        }
    }

    pub fn calculator(&self) -> &C {
        &self.calculator
    }

    pub fn state(&self) -> &EngineState {
        &self.state
    }

    /// True only once every session has been processed without error
    pub fn is_complete(&self) -> bool {
        matches!(self.state, EngineState::Done { .. })
    }

    pub fn sessions_processed(&self) -> usize {
        self.history.session_count()
    }

    /// Process every session in order, stopping at the first invalid one
    pub fn run(&mut self, sessions: &[Session]) -> Result<RunSummary> {
        info!("Rating {} sessions", sessions.len());

        for session in sessions {
            let changes = self.process_session(session)?;

            if tracing::enabled!(tracing::Level::INFO) {
                let movers: Vec<String> = changes
                    .iter()
                    .map(|change| format!("{} {:+.2}", change.player, change.delta))
                    .collect();
                info!(
                    "Session {}{}: {}",
                    session.index,
                    session
                        .date
                        .map(|d| format!(" ({})", d))
                        .unwrap_or_default(),
                    movers.join(", ")
                );
            }

            if tracing::enabled!(tracing::Level::DEBUG) {
                debug!("Ranking after session {}:", session.index);
                for entry in self.ranking() {
                    debug!(
                        "  {}. {}: {:.2} ({} sessions)",
                        entry.rank, entry.player, entry.rating, entry.sessions_played
                    );
                }
            }
        }

        self.finish()
    }

    /// Mark the input as exhausted
    pub fn finish(&mut self) -> Result<RunSummary> {
        if let EngineState::Failed {
            session_index,
            reason,
        } = &self.state
        {
            return Err(RatingError::InvalidInput {
                reason: format!("run failed at session {}: {}", session_index, reason),
            }
            .into());
        }

        if !self.is_complete() {
            self.state = EngineState::Done {
                sessions: self.sessions_processed(),
            };
        }

        let summary = RunSummary {
            sessions_processed: self.sessions_processed(),
            players: self.table.len(),
            matches_evaluated: self.matches_evaluated,
        };
        info!(
            "Processed {} sessions, {} players, {} virtual matches",
            summary.sessions_processed, summary.players, summary.matches_evaluated
        );
        Ok(summary)
    }

    /// Rate one session and commit its changes.
    ///
    /// Nothing is written unless every pair of the session was evaluated.
    pub fn process_session(&mut self, session: &Session) -> Result<Vec<RatingChange>> {
        match &self.state {
            EngineState::Failed { session_index, .. } => {
                return Err(RatingError::InvalidInput {
                    reason: format!(
                        "engine already failed at session {}; start a new run",
                        session_index
                    ),
                }
                .into());
            }
            EngineState::Done { .. } => {
                return Err(RatingError::InvalidInput {
                    reason: "engine already finished".to_string(),
                }
                .into());
            }
            EngineState::Uninitialized | EngineState::Processing { .. } => {}
        }

        let expected_index = self.sessions_processed();
        if session.index != expected_index {
            let err = RatingError::InvalidSession {
                session_index: session.index,
                reason: format!("out of order, expected session {}", expected_index),
            };
            return Err(self.fail(session.index, err.into()));
        }

        // First appearance starts at the initial rating; nothing is written yet
        let players: Vec<(PlayerName, f64)> = session
            .profits
            .iter()
            .map(|(player, _)| {
                let rating = self.table.get_rating(player).unwrap_or_else(|| {
                    debug!("New player {} in session {}", player, session.index);
                    self.calculator.initial_rating()
                });
                (player.clone(), rating)
            })
            .collect();

        let result = match self.calculator.calculate_rating_changes(session, &players) {
            Ok(result) => result,
            Err(err) => return Err(self.fail(session.index, err)),
        };

        if let Err(err) = self.check_changes(session, &result.rating_changes) {
            return Err(self.fail(session.index, err));
        }

        self.table.apply_session(&result.rating_changes);
        self.history.record_session(SessionRecord {
            session_index: session.index,
            date: session.date,
            changes: result.rating_changes.clone(),
        });
        self.matches_evaluated += result.match_count;
        self.state = EngineState::Processing {
            session_index: session.index,
        };

        Ok(result.rating_changes)
    }

    /// Every participant gets exactly one change, and nobody else
    fn check_changes(&self, session: &Session, changes: &[RatingChange]) -> Result<()> {
        let participants: HashSet<&str> = session.participants().collect();
        let mut seen = HashSet::with_capacity(changes.len());

        for change in changes {
            let player = change.player.as_str();
            if !participants.contains(player) || !seen.insert(player) {
                return Err(RatingError::UnknownPlayerState {
                    player: change.player.clone(),
                    session_index: session.index,
                }
                .into());
            }
            if !change.new_rating.is_finite() {
                return Err(RatingError::InvalidSession {
                    session_index: session.index,
                    reason: format!("rating for {} is not finite", change.player),
                }
                .into());
            }
        }

        if let Some(missing) = participants.iter().find(|p| !seen.contains(*p)) {
            return Err(RatingError::UnknownPlayerState {
                player: missing.to_string(),
                session_index: session.index,
            }
            .into());
        }

        Ok(())
    }

    fn fail(&mut self, session_index: usize, err: anyhow::Error) -> anyhow::Error {
        warn!("Aborting run at session {}: {}", session_index, err);
        self.state = EngineState::Failed {
            session_index,
            reason: err.to_string(),
        };
        err
    }

    /// Read-only view over committed state
    pub fn view(&self) -> RatingView<'_> {
        RatingView::new(&self.table, &self.history)
    }

    pub fn current_ratings(&self) -> BTreeMap<PlayerName, f64> {
        self.view().current_ratings()
    }

    pub fn ranking(&self) -> Vec<RankingEntry> {
        self.view().ranking()
    }

    pub fn history(&self, player: &str) -> PlayerHistory<'_> {
        self.view().history(player)
    }

    pub fn table(&self) -> &RatingTable {
        &self.table
    }
}

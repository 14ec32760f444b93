//! Error types for the rating engine
//!
//! This module defines all error types using anyhow for consistent error handling
//! throughout the application. Typed variants can be recovered from an
//! `anyhow::Error` with `downcast_ref::<RatingError>()`.

/// Result type alias for convenience
pub type Result<T> = anyhow::Result<T>;

/// Custom error types for specific rating scenarios
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RatingError {
    #[error("Invalid session {session_index}: {reason}")]
    InvalidSession { session_index: usize, reason: String },

    /// Raised when a participant has no rating after initialization.
    /// Indicates a bug in the engine rather than bad input.
    #[error("No rating state for player {player} in session {session_index}")]
    UnknownPlayerState {
        player: String,
        session_index: usize,
    },

    #[error("Invalid input: {reason}")]
    InvalidInput { reason: String },

    #[error("Configuration error: {message}")]
    ConfigurationError { message: String },

    #[error("Export failed: {message}")]
    ExportFailed { message: String },
}

impl RatingError {
    /// Session index carried by session-scoped errors
    pub fn session_index(&self) -> Option<usize> {
        match self {
            RatingError::InvalidSession { session_index, .. }
            | RatingError::UnknownPlayerState { session_index, .. } => Some(*session_index),
            _ => None,
        }
    }
}

//! Hand engine error types.

use thiserror::Error;

use super::entities::{GameId, Stage};
use crate::db::StoreError;

/// Errors surfaced by hand actions
#[derive(Debug, Error)]
pub enum HandError {
    /// No stored state for the game id
    #[error("Game {0} not found")]
    GameNotFound(GameId),

    /// Tried to draw more cards than the deck holds
    #[error("Deck exhausted: needed {needed} card(s), {remaining} remaining")]
    DeckExhausted { needed: usize, remaining: usize },

    /// Malformed arguments, rejected before any state is touched
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Action requested out of order (e.g. turn before the flop)
    #[error("Illegal transition from {from} to {to}")]
    IllegalTransition { from: Stage, to: Stage },

    /// Persistence failed; nothing was committed
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl HandError {
    /// Whether the caller may retry the same action unchanged.
    pub fn is_retryable(&self) -> bool {
        match self {
            HandError::Store(e) => e.is_retryable(),
            _ => false,
        }
    }

    /// Message safe to hand back to callers. Database details are hidden.
    pub fn client_message(&self) -> String {
        match self {
            HandError::Store(e) => e.client_message(),
            _ => self.to_string(),
        }
    }
}

/// Result type for hand operations
pub type HandResult<T> = Result<T, HandError>;

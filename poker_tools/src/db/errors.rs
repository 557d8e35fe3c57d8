//! Store error types.

use std::time::Duration;
use thiserror::Error;

use crate::game::GameId;

/// Persistence errors
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Query did not finish in time
    #[error("Store operation timed out after {0:?}")]
    Timeout(Duration),

    /// Stored state could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Stored row is unreadable
    #[error("Corrupt record: {0}")]
    Corrupt(String),

    /// Another writer committed first
    #[error("Write conflict on game {id}: revision {revision} is stale")]
    Conflict { id: GameId, revision: i64 },

    /// The owner of the game id is shutting down
    #[error("Game {0} is unavailable, retry")]
    Unavailable(GameId),
}

impl StoreError {
    /// Transient failures the caller may retry.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, StoreError::Serialization(_) | StoreError::Corrupt(_))
    }

    /// Get a client-safe error message that doesn't leak storage internals
    pub fn client_message(&self) -> String {
        match self {
            StoreError::Database(_) | StoreError::Timeout(_) => {
                "Storage temporarily unavailable".to_string()
            }
            StoreError::Serialization(_) | StoreError::Corrupt(_) => {
                "Stored game is unreadable".to_string()
            }
            _ => self.to_string(),
        }
    }
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

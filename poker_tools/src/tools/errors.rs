//! Tool façade error types.

use thiserror::Error;

use crate::game::HandError;

/// Errors returned by tool invocations
#[derive(Debug, Error)]
pub enum ToolError {
    /// Name not in the tool catalog
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    /// Arguments don't match the tool's input schema
    #[error("Invalid arguments for {tool}: {reason}")]
    InvalidArguments { tool: &'static str, reason: String },

    /// The hand action itself failed
    #[error(transparent)]
    Hand(#[from] HandError),

    /// Output couldn't be encoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ToolError {
    /// Whether the caller may retry the same invocation unchanged.
    pub fn is_retryable(&self) -> bool {
        match self {
            ToolError::Hand(e) => e.is_retryable(),
            _ => false,
        }
    }

    /// Message safe to hand back to the caller
    pub fn client_message(&self) -> String {
        match self {
            ToolError::Hand(e) => e.client_message(),
            ToolError::Serialization(_) => "Internal error encoding result".to_string(),
            _ => self.to_string(),
        }
    }
}

/// Result type for tool invocations
pub type ToolResult<T> = Result<T, ToolError>;

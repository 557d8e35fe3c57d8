//! Table actor message types.

use crate::{
    db::StoreError,
    game::{GameState, HandError, HandResult, HandSetup, Street, Transition},
};
use serde::Serialize;
use tokio::sync::oneshot;

/// Reply channel carrying the outcome of one hand action
pub type ActionReply = oneshot::Sender<HandResult<ActionOutcome>>;

/// Messages that can be sent to a TableActor
#[derive(Debug)]
pub enum TableMessage {
    /// Persist a fresh game in the setup stage
    Create { response: ActionReply },

    /// Start a new hand, overwriting the previous one
    StartHand {
        setup: HandSetup,
        response: ActionReply,
    },

    /// Deal the community cards of one street
    DealStreet {
        street: Street,
        bet: i64,
        response: ActionReply,
    },

    /// Run out the board and close the hand
    Showdown {
        bet: i64,
        is_fold: bool,
        response: ActionReply,
    },

    /// Get current game state
    GetState {
        response: oneshot::Sender<HandResult<GameState>>,
    },

    /// Delete the stored game and stop the actor
    Delete {
        response: oneshot::Sender<HandResult<()>>,
    },
}

impl TableMessage {
    /// Answer the message with a store error without processing it.
    pub fn reject(self, error: StoreError) {
        let error = HandError::Store(error);
        match self {
            TableMessage::Create { response }
            | TableMessage::StartHand { response, .. }
            | TableMessage::DealStreet { response, .. }
            | TableMessage::Showdown { response, .. } => {
                let _ = response.send(Err(error));
            }
            TableMessage::GetState { response } => {
                let _ = response.send(Err(error));
            }
            TableMessage::Delete { response } => {
                let _ = response.send(Err(error));
            }
        }
    }

    /// Short name for logs
    pub fn kind(&self) -> &'static str {
        match self {
            TableMessage::Create { .. } => "create",
            TableMessage::StartHand { .. } => "start_hand",
            TableMessage::DealStreet { .. } => "deal_street",
            TableMessage::Showdown { .. } => "showdown",
            TableMessage::GetState { .. } => "get_state",
            TableMessage::Delete { .. } => "delete",
        }
    }
}

/// State after an action, and whether the action changed it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionOutcome {
    pub state: GameState,
    pub transition: Transition,
}

impl ActionOutcome {
    /// Check if the action was a replay of one already applied
    pub fn is_replay(&self) -> bool {
        self.transition == Transition::Replay
    }
}

//! Table actor implementation with async message handling.

use super::messages::{ActionOutcome, TableMessage};
use crate::{
    db::{GameRepository, StoreError, StoreResult},
    game::{
        GameId, GameState, HandError, HandResult, HandSetup, Street, Transition,
        hand,
    },
};
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Default capacity of a table actor's inbox
pub const DEFAULT_MAILBOX_CAPACITY: usize = 64;

/// Table actor handle for sending messages
#[derive(Clone, Debug)]
pub struct TableHandle {
    sender: mpsc::Sender<TableMessage>,
    game_id: GameId,
}

impl TableHandle {
    /// Create a new table handle
    pub fn new(sender: mpsc::Sender<TableMessage>, game_id: GameId) -> Self {
        Self { sender, game_id }
    }

    /// Get game ID
    pub fn game_id(&self) -> &GameId {
        &self.game_id
    }

    /// Send a message to the table
    ///
    /// Fails with [`StoreError::Unavailable`] once the actor has stopped.
    pub async fn send(&self, message: TableMessage) -> StoreResult<()> {
        self.sender
            .send(message)
            .await
            .map_err(|_| StoreError::Unavailable(self.game_id.clone()))
    }

    /// Check if both handles reach the same actor
    pub fn same_actor(&self, other: &TableHandle) -> bool {
        self.sender.same_channel(&other.sender)
    }

    /// Check if the actor has stopped
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }

    /// Number of live handles to this actor, this one included
    pub fn handle_count(&self) -> usize {
        self.sender.strong_count()
    }
}

/// Whether the actor keeps running after a message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Stop,
}

/// Single owner of one game id.
///
/// Messages are handled one at a time, so each action's load, mutate and
/// persist steps never interleave with another action on the same game.
pub struct TableActor {
    /// Game ID
    id: GameId,

    /// Game state store
    repository: Arc<dyn GameRepository>,

    /// Message inbox
    inbox: mpsc::Receiver<TableMessage>,
}

impl TableActor {
    /// Create a new table actor
    ///
    /// # Arguments
    ///
    /// * `id` - Game ID owned by this actor
    /// * `repository` - Game state store
    /// * `mailbox_capacity` - Inbox size; senders wait when it is full
    ///
    /// # Returns
    ///
    /// * `(TableActor, TableHandle)` - Actor and handle for sending messages
    pub fn new(
        id: GameId,
        repository: Arc<dyn GameRepository>,
        mailbox_capacity: usize,
    ) -> (Self, TableHandle) {
        let (sender, inbox) = mpsc::channel(mailbox_capacity.max(1));
        let handle = TableHandle::new(sender, id.clone());

        let actor = Self {
            id,
            repository,
            inbox,
        };

        (actor, handle)
    }

    /// Run the table actor event loop
    ///
    /// Returns once every handle is dropped and the inbox is empty, or after a
    /// delete.
    pub async fn run(mut self) {
        log::debug!("Table {} starting", self.id);

        while let Some(message) = self.inbox.recv().await {
            if self.handle_message(message).await == Flow::Stop {
                break;
            }
        }

        // Anything queued behind a stop is answered, never dropped silently.
        self.inbox.close();
        while let Some(message) = self.inbox.recv().await {
            log::debug!(
                "Table {}: rejecting {} after stop",
                self.id,
                message.kind()
            );
            message.reject(StoreError::Unavailable(self.id.clone()));
        }

        log::debug!("Table {} stopped", self.id);
    }

    /// Handle a table message
    async fn handle_message(&mut self, message: TableMessage) -> Flow {
        match message {
            TableMessage::Create { response } => {
                let result = self.handle_create().await;
                let _ = response.send(result);
            }

            TableMessage::StartHand { setup, response } => {
                let result = self.handle_start_hand(&setup).await;
                let _ = response.send(result);
            }

            TableMessage::DealStreet {
                street,
                bet,
                response,
            } => {
                let result = self.handle_deal_street(street, bet).await;
                let _ = response.send(result);
            }

            TableMessage::Showdown {
                bet,
                is_fold,
                response,
            } => {
                let result = self.handle_showdown(bet, is_fold).await;
                let _ = response.send(result);
            }

            TableMessage::GetState { response } => {
                let result = self.load().await;
                let _ = response.send(result);
            }

            TableMessage::Delete { response } => {
                let result = self.repository.delete(&self.id).await.map_err(HandError::from);
                match &result {
                    Ok(()) => log::info!("Game {} deleted", self.id),
                    Err(e) => log::error!("Game {}: delete failed: {}", self.id, e),
                }
                let _ = response.send(result);
                return Flow::Stop;
            }
        }

        Flow::Continue
    }

    /// Persist a fresh setup-stage game. An existing record is left alone.
    async fn handle_create(&self) -> HandResult<ActionOutcome> {
        if let Some(existing) = self.repository.get(&self.id).await? {
            log::warn!("Game {} already exists, not recreating", self.id);
            return Ok(ActionOutcome {
                state: existing,
                transition: Transition::Replay,
            });
        }

        let state = self.persist(GameState::new(self.id.clone())).await?;
        log::info!("Game {} created", self.id);
        Ok(ActionOutcome {
            state,
            transition: Transition::Advance,
        })
    }

    /// Start a hand; an unknown id gets a new record.
    async fn handle_start_hand(&self, setup: &HandSetup) -> HandResult<ActionOutcome> {
        let mut state = match self.repository.get(&self.id).await? {
            Some(state) => state,
            None => GameState::new(self.id.clone()),
        };

        shuffle_and_deal(&mut state, setup)?;

        let state = self.persist(state).await?;
        Ok(ActionOutcome {
            state,
            transition: Transition::Advance,
        })
    }

    async fn handle_deal_street(&self, street: Street, bet: i64) -> HandResult<ActionOutcome> {
        let mut state = self.load().await?;
        let transition = hand::deal_street(&mut state, street, bet)?;
        self.commit(state, transition).await
    }

    async fn handle_showdown(&self, bet: i64, is_fold: bool) -> HandResult<ActionOutcome> {
        let mut state = self.load().await?;
        let transition = hand::showdown(&mut state, bet, is_fold)?;
        self.commit(state, transition).await
    }

    async fn load(&self) -> HandResult<GameState> {
        self.repository
            .get(&self.id)
            .await?
            .ok_or_else(|| HandError::GameNotFound(self.id.clone()))
    }

    /// Persist only when the action moved the state forward
    async fn commit(&self, state: GameState, transition: Transition) -> HandResult<ActionOutcome> {
        let state = match transition {
            Transition::Advance => self.persist(state).await?,
            Transition::Replay => state,
        };
        Ok(ActionOutcome { state, transition })
    }

    /// Write `state` as the next revision of this game
    async fn persist(&self, mut state: GameState) -> HandResult<GameState> {
        state.revision += 1;
        state.updated_at = Utc::now();

        if let Err(e) = self.repository.put(&state).await {
            log::error!(
                "Game {}: failed to persist revision {}: {}",
                self.id,
                state.revision,
                e
            );
            return Err(e.into());
        }

        Ok(state)
    }
}

/// Runs the hand start with the thread-local CSPRNG, kept out of async code
/// because the generator is not `Send`.
fn shuffle_and_deal(state: &mut GameState, setup: &HandSetup) -> HandResult<()> {
    hand::start_hand(state, setup, &mut rand::rng())
}

//! Table manager routing each game id to its own table actor.

use super::{
    actor::{DEFAULT_MAILBOX_CAPACITY, TableActor, TableHandle},
    messages::{ActionOutcome, TableMessage},
};
use crate::{
    db::{GameRepository, GameSummary, StoreError},
    game::{GameId, GameState, HandError, HandResult, HandSetup, Street},
};
use std::{collections::HashMap, sync::Arc};
use tokio::sync::{RwLock, oneshot};

/// Table manager for managing one actor per game
///
/// Actors are spawned on first use of a game id and released once no call on
/// that id is in flight. Operations on the same id are queued on that actor;
/// different ids never wait on each other.
#[derive(Clone)]
pub struct TableManager {
    /// Game state store shared by all actors
    repository: Arc<dyn GameRepository>,

    /// Active table handles
    tables: Arc<RwLock<HashMap<GameId, TableHandle>>>,

    /// Inbox capacity for newly spawned actors
    mailbox_capacity: usize,
}

impl TableManager {
    /// Create a new table manager
    ///
    /// # Arguments
    ///
    /// * `repository` - Game state store
    ///
    /// # Returns
    ///
    /// * `TableManager` - New table manager instance
    pub fn new(repository: Arc<dyn GameRepository>) -> Self {
        Self::with_mailbox_capacity(repository, DEFAULT_MAILBOX_CAPACITY)
    }

    pub fn with_mailbox_capacity(repository: Arc<dyn GameRepository>, mailbox_capacity: usize) -> Self {
        Self {
            repository,
            tables: Arc::new(RwLock::new(HashMap::new())),
            mailbox_capacity,
        }
    }

    /// Get the handle for a game, spawning its actor if needed
    pub async fn handle_for(&self, id: &GameId) -> TableHandle {
        {
            let tables = self.tables.read().await;
            if let Some(handle) = tables.get(id)
                && !handle.is_closed()
            {
                return handle.clone();
            }
        }

        let mut tables = self.tables.write().await;
        if let Some(handle) = tables.get(id)
            && !handle.is_closed()
        {
            return handle.clone();
        }

        let (actor, handle) =
            TableActor::new(id.clone(), self.repository.clone(), self.mailbox_capacity);
        tables.insert(id.clone(), handle.clone());
        drop(tables);

        tokio::spawn(actor.run());
        log::debug!("Spawned table actor for game {}", id);

        handle
    }

    /// Create a new game in the setup stage
    ///
    /// # Returns
    ///
    /// * `HandResult<GameState>` - Stored state with a freshly generated id
    pub async fn new_table(&self) -> HandResult<GameState> {
        let id = GameId::generate();
        let outcome = self
            .request(&id, |response| TableMessage::Create { response })
            .await?;
        Ok(outcome.state)
    }

    /// Start a new hand on a game
    ///
    /// # Arguments
    ///
    /// * `id` - Game ID; created if it has no record yet
    /// * `setup` - Blinds and starting stacks
    pub async fn start_hand(&self, id: &GameId, setup: HandSetup) -> HandResult<ActionOutcome> {
        setup.validate()?;
        self.request(id, |response| TableMessage::StartHand { setup, response })
            .await
    }

    /// Deal a street with a matched bet
    pub async fn deal_street(
        &self,
        id: &GameId,
        street: Street,
        bet: i64,
    ) -> HandResult<ActionOutcome> {
        self.request(id, |response| TableMessage::DealStreet {
            street,
            bet,
            response,
        })
        .await
    }

    /// Close the hand with a final matched bet
    pub async fn showdown(&self, id: &GameId, bet: i64, is_fold: bool) -> HandResult<ActionOutcome> {
        self.request(id, |response| TableMessage::Showdown {
            bet,
            is_fold,
            response,
        })
        .await
    }

    /// Get current game state
    pub async fn get_state(&self, id: &GameId) -> HandResult<GameState> {
        self.request(id, |response| TableMessage::GetState { response })
            .await
    }

    /// Delete a game's record and stop its actor
    ///
    /// Deleting an unknown id succeeds.
    pub async fn delete_table(&self, id: &GameId) -> HandResult<()> {
        let mut tables = self.tables.write().await;

        let Some(handle) = tables.remove(id) else {
            drop(tables);
            self.repository.delete(id).await?;
            log::info!("Game {} deleted", id);
            return Ok(());
        };

        // Held until the actor answers so no new actor starts for this id
        // while the old one drains.
        let (response, reply) = oneshot::channel();
        match handle.send(TableMessage::Delete { response }).await {
            Ok(()) => reply
                .await
                .map_err(|_| StoreError::Unavailable(id.clone()))?,
            Err(_) => {
                self.repository.delete(id).await?;
                Ok(())
            }
        }
    }

    /// List stored games, most recently updated first
    pub async fn list_tables(&self, limit: usize) -> HandResult<Vec<GameSummary>> {
        Ok(self.repository.list(limit).await?)
    }

    /// Number of table actors currently in use
    pub async fn active_table_count(&self) -> usize {
        let tables = self.tables.read().await;
        tables.values().filter(|handle| !handle.is_closed()).count()
    }

    async fn request<T>(
        &self,
        id: &GameId,
        message: impl FnOnce(oneshot::Sender<HandResult<T>>) -> TableMessage,
    ) -> HandResult<T> {
        let handle = self.handle_for(id).await;
        let (response, reply) = oneshot::channel();

        if let Err(e) = handle.send(message(response)).await {
            self.forget(&handle).await;
            return Err(e.into());
        }

        let result = reply
            .await
            .map_err(|_| HandError::from(StoreError::Unavailable(id.clone())));

        self.release(handle).await;
        result?
    }

    /// Drop a handle whose actor has stopped
    async fn forget(&self, handle: &TableHandle) {
        let mut tables = self.tables.write().await;
        if tables
            .get(handle.game_id())
            .is_some_and(|current| current.same_actor(handle))
        {
            tables.remove(handle.game_id());
        }
    }

    /// Let an actor stop once no other call holds a handle to it
    ///
    /// Calls get their handle from the map under its lock, so when the map
    /// entry and `handle` are the last two, every queued message has been
    /// answered and the actor has no work left. Dropping both closes its inbox.
    async fn release(&self, handle: TableHandle) {
        let mut tables = self.tables.write().await;
        let id = handle.game_id().clone();
        let idle = tables
            .get(&id)
            .is_some_and(|current| current.same_actor(&handle) && current.handle_count() == 2);

        // Dropped under the lock so the next caller's count is exact.
        drop(handle);
        if idle {
            tables.remove(&id);
            log::debug!("Released table actor for game {}", id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryGameRepository;
    use crate::game::{Stage, Transition};

    fn manager() -> TableManager {
        TableManager::new(Arc::new(MemoryGameRepository::new()))
    }

    fn setup() -> HandSetup {
        HandSetup {
            big_blind: 10,
            small_blind: 5,
            hero_stack: 1000,
            ai_stack: 1000,
        }
    }

    #[tokio::test]
    async fn test_new_table_is_stored_in_setup() {
        let manager = manager();
        let state = manager.new_table().await.unwrap();

        assert_eq!(state.stage, Stage::Setup);
        assert_eq!(manager.get_state(&state.id).await.unwrap(), state);
        assert_eq!(manager.active_table_count().await, 0);
    }

    #[tokio::test]
    async fn test_start_hand_validates_before_routing() {
        let manager = manager();
        let id = GameId::parse("G1").unwrap();
        let bad = HandSetup {
            big_blind: -10,
            ..setup()
        };

        assert!(matches!(
            manager.start_hand(&id, bad).await,
            Err(HandError::InvalidInput(_))
        ));
        assert_eq!(manager.active_table_count().await, 0);
    }

    #[tokio::test]
    async fn test_start_hand_on_unknown_id_creates_game() {
        let manager = manager();
        let id = GameId::parse("fresh").unwrap();

        let outcome = manager.start_hand(&id, setup()).await.unwrap();
        assert_eq!(outcome.transition, Transition::Advance);
        assert_eq!(outcome.state.stage, Stage::Preflop);
        assert_eq!(manager.get_state(&id).await.unwrap().pot, 15);
    }

    #[tokio::test]
    async fn test_unknown_game_releases_actor() {
        let manager = manager();
        let id = GameId::parse("ghost").unwrap();

        let err = manager.deal_street(&id, Street::Postflop, 0).await.unwrap_err();
        assert!(matches!(err, HandError::GameNotFound(_)));
        assert!(!err.is_retryable());
        assert_eq!(manager.active_table_count().await, 0);
    }

    #[tokio::test]
    async fn test_delete_table_is_idempotent() {
        let manager = manager();
        let state = manager.new_table().await.unwrap();

        manager.delete_table(&state.id).await.unwrap();
        manager.delete_table(&state.id).await.unwrap();

        assert!(matches!(
            manager.get_state(&state.id).await,
            Err(HandError::GameNotFound(_))
        ));
        assert!(manager.list_tables(10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_games_are_independent() {
        let manager = manager();
        let a = manager.new_table().await.unwrap().id;
        let b = manager.new_table().await.unwrap().id;

        manager.start_hand(&a, setup()).await.unwrap();
        manager.deal_street(&a, Street::Postflop, 20).await.unwrap();

        assert_eq!(manager.get_state(&b).await.unwrap().stage, Stage::Setup);
        assert_eq!(manager.get_state(&a).await.unwrap().stage, Stage::Postflop);
        assert_eq!(manager.list_tables(10).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_finished_hands_release_their_actors() {
        let manager = manager();

        for _ in 0..50 {
            let id = manager.new_table().await.unwrap().id;
            manager.start_hand(&id, setup()).await.unwrap();
            manager.showdown(&id, 0, true).await.unwrap();
        }
        assert_eq!(manager.active_table_count().await, 0);
        assert_eq!(manager.list_tables(100).await.unwrap().len(), 50);
    }

    #[tokio::test]
    async fn test_busy_actor_is_kept_until_last_call() {
        let manager = manager();
        let id = manager.new_table().await.unwrap().id;

        let held = manager.handle_for(&id).await;
        manager.start_hand(&id, setup()).await.unwrap();
        assert_eq!(manager.active_table_count().await, 1);
        assert!(manager.handle_for(&id).await.same_actor(&held));

        drop(held);
        manager.deal_street(&id, Street::Postflop, 20).await.unwrap();
        assert_eq!(manager.active_table_count().await, 0);

        // A later call spawns a fresh actor over the stored state.
        assert_eq!(manager.get_state(&id).await.unwrap().stage, Stage::Postflop);
        assert_eq!(manager.active_table_count().await, 0);
    }

    #[tokio::test]
    async fn test_deck_exhausted_showdown_persists_nothing() {
        let repository = Arc::new(MemoryGameRepository::new());
        let manager = TableManager::new(repository.clone());
        let id = manager.new_table().await.unwrap().id;
        manager.start_hand(&id, setup()).await.unwrap();
        manager.deal_street(&id, Street::Postflop, 20).await.unwrap();

        let mut short = repository.get(&id).await.unwrap().unwrap();
        let remaining = short.deck.len();
        short.deck.draw_many(remaining - 1).unwrap();
        short.revision += 1;
        repository.put(&short).await.unwrap();
        let before = serde_json::to_vec(&repository.get(&id).await.unwrap().unwrap()).unwrap();

        let err = manager.showdown(&id, 10, false).await.unwrap_err();
        assert!(matches!(
            err,
            HandError::DeckExhausted {
                needed: 2,
                remaining: 1
            }
        ));

        let after = serde_json::to_vec(&repository.get(&id).await.unwrap().unwrap()).unwrap();
        assert_eq!(before, after);
        assert_eq!(manager.get_state(&id).await.unwrap().revision, short.revision);
        assert_eq!(manager.active_table_count().await, 0);
    }
}

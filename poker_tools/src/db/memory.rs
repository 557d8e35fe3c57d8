//! In-process game store.

use async_trait::async_trait;
use std::{collections::HashMap, sync::Arc};
use tokio::sync::RwLock;

use super::errors::{StoreError, StoreResult};
use super::repository::{GameRepository, GameSummary};
use crate::game::{GameId, GameState};

/// [`GameRepository`] backed by a map. State lives as long as the process.
#[derive(Clone, Default)]
pub struct MemoryGameRepository {
    games: Arc<RwLock<HashMap<GameId, GameState>>>,
}

impl MemoryGameRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored games
    pub async fn len(&self) -> usize {
        self.games.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.games.read().await.is_empty()
    }
}

#[async_trait]
impl GameRepository for MemoryGameRepository {
    async fn get(&self, id: &GameId) -> StoreResult<Option<GameState>> {
        let games = self.games.read().await;
        Ok(games.get(id).cloned())
    }

    async fn put(&self, state: &GameState) -> StoreResult<()> {
        let mut games = self.games.write().await;
        if let Some(existing) = games.get(&state.id)
            && existing.revision + 1 != state.revision
        {
            return Err(StoreError::Conflict {
                id: state.id.clone(),
                revision: state.revision,
            });
        }
        games.insert(state.id.clone(), state.clone());
        Ok(())
    }

    async fn delete(&self, id: &GameId) -> StoreResult<()> {
        let mut games = self.games.write().await;
        games.remove(id);
        Ok(())
    }

    async fn list(&self, limit: usize) -> StoreResult<Vec<GameSummary>> {
        let games = self.games.read().await;
        let mut summaries: Vec<GameSummary> = games.values().map(GameSummary::from).collect();
        summaries.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        summaries.truncate(limit);
        Ok(summaries)
    }
}

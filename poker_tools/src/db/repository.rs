//! Repository trait for game state persistence and its PostgreSQL backend.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{PgPool, Row, types::Json};
use std::time::Duration;

use super::errors::{StoreError, StoreResult};
use super::timeouts::{DEFAULT_QUERY_TIMEOUT, LONG_OPERATION_TIMEOUT, with_timeout};
use crate::game::{GameId, GameState, Stage};

/// Operator-facing summary of one stored game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameSummary {
    pub id: GameId,
    pub stage: Stage,
    pub revision: i64,
    pub updated_at: DateTime<Utc>,
}

impl From<&GameState> for GameSummary {
    fn from(state: &GameState) -> Self {
        Self {
            id: state.id.clone(),
            stage: state.stage,
            revision: state.revision,
            updated_at: state.updated_at,
        }
    }
}

/// Key-value persistence of [`GameState`] by game id.
///
/// `put` is a full overwrite guarded by the revision counter: it succeeds when
/// no record exists yet, or when the stored revision is exactly one below
/// `state.revision`. Anything else is [`StoreError::Conflict`].
#[async_trait]
pub trait GameRepository: Send + Sync {
    /// Load a game; `None` if the id has no record
    async fn get(&self, id: &GameId) -> StoreResult<Option<GameState>>;

    /// Overwrite the record at `state.id`
    async fn put(&self, state: &GameState) -> StoreResult<()>;

    /// Remove a record; deleting a missing id is not an error
    async fn delete(&self, id: &GameId) -> StoreResult<()>;

    /// Most recently updated games first
    async fn list(&self, limit: usize) -> StoreResult<Vec<GameSummary>>;
}

/// PostgreSQL implementation of [`GameRepository`].
///
/// One row per game in `poker_games`, full state as JSONB.
pub struct PgGameRepository {
    pool: PgPool,
    query_timeout: Duration,
}

impl PgGameRepository {
    pub fn new(pool: PgPool) -> Self {
        Self::with_timeout(pool, DEFAULT_QUERY_TIMEOUT)
    }

    pub fn with_timeout(pool: PgPool, query_timeout: Duration) -> Self {
        Self {
            pool,
            query_timeout,
        }
    }

    /// Create the `poker_games` table if it doesn't exist yet.
    pub async fn migrate(&self) -> StoreResult<()> {
        with_timeout(
            LONG_OPERATION_TIMEOUT,
            sqlx::query(
                r#"
                CREATE TABLE IF NOT EXISTS poker_games (
                    id TEXT PRIMARY KEY,
                    revision BIGINT NOT NULL,
                    stage TEXT NOT NULL,
                    state JSONB NOT NULL,
                    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
                )
                "#,
            )
            .execute(&self.pool),
        )
        .await?;

        with_timeout(
            LONG_OPERATION_TIMEOUT,
            sqlx::query(
                "CREATE INDEX IF NOT EXISTS poker_games_updated_at_idx ON poker_games (updated_at DESC)",
            )
            .execute(&self.pool),
        )
        .await?;

        log::info!("poker_games schema ready");
        Ok(())
    }
}

#[async_trait]
impl GameRepository for PgGameRepository {
    async fn get(&self, id: &GameId) -> StoreResult<Option<GameState>> {
        let row = with_timeout(
            self.query_timeout,
            sqlx::query("SELECT state FROM poker_games WHERE id = $1")
                .bind(id.as_str())
                .fetch_optional(&self.pool),
        )
        .await?;

        match row {
            Some(row) => {
                let Json(state): Json<GameState> = row.try_get("state")?;
                Ok(Some(state))
            }
            None => Ok(None),
        }
    }

    async fn put(&self, state: &GameState) -> StoreResult<()> {
        let result = with_timeout(
            self.query_timeout,
            sqlx::query(
                r#"
                INSERT INTO poker_games (id, revision, stage, state, updated_at)
                VALUES ($1, $2, $3, $4, $5)
                ON CONFLICT (id) DO UPDATE
                SET revision = EXCLUDED.revision,
                    stage = EXCLUDED.stage,
                    state = EXCLUDED.state,
                    updated_at = EXCLUDED.updated_at
                WHERE poker_games.revision = EXCLUDED.revision - 1
                "#,
            )
            .bind(state.id.as_str())
            .bind(state.revision)
            .bind(state.stage.to_string())
            .bind(Json(state))
            .bind(state.updated_at)
            .execute(&self.pool),
        )
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::Conflict {
                id: state.id.clone(),
                revision: state.revision,
            });
        }
        Ok(())
    }

    async fn delete(&self, id: &GameId) -> StoreResult<()> {
        with_timeout(
            self.query_timeout,
            sqlx::query("DELETE FROM poker_games WHERE id = $1")
                .bind(id.as_str())
                .execute(&self.pool),
        )
        .await?;
        Ok(())
    }

    async fn list(&self, limit: usize) -> StoreResult<Vec<GameSummary>> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let rows = with_timeout(
            self.query_timeout,
            sqlx::query(
                r#"
                SELECT id, stage, revision, updated_at
                FROM poker_games
                ORDER BY updated_at DESC
                LIMIT $1
                "#,
            )
            .bind(limit)
            .fetch_all(&self.pool),
        )
        .await?;

        rows.into_iter()
            .map(|row| -> StoreResult<GameSummary> {
                let id: String = row.try_get("id")?;
                let stage: String = row.try_get("stage")?;
                Ok(GameSummary {
                    id: GameId::parse(&id).map_err(|e| StoreError::Corrupt(e.to_string()))?,
                    stage: stage
                        .parse::<Stage>()
                        .map_err(|e| StoreError::Corrupt(e.to_string()))?,
                    revision: row.try_get("revision")?,
                    updated_at: row.try_get("updated_at")?,
                })
            })
            .collect()
    }
}

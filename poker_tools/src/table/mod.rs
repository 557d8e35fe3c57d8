//! Table module: one async actor per game id.
//!
//! This module implements:
//! - TableActor: owns a single game and runs its load, mutate and persist cycle
//! - TableManager: spawns actors on demand and routes requests by game id
//! - Message-based communication with tokio channels
//!
//! ## Architecture
//!
//! Each game runs in a separate Tokio task with an mpsc message inbox. The
//! actor handles one message at a time, which serializes every read-modify-write
//! on its game. Actors for different games share nothing but the repository.
//!
//! ## Example
//!
//! ```no_run
//! use poker_tools::db::MemoryGameRepository;
//! use poker_tools::game::{HandSetup, Street};
//! use poker_tools::table::TableManager;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), poker_tools::game::HandError> {
//!     let manager = TableManager::new(Arc::new(MemoryGameRepository::new()));
//!     let game = manager.new_table().await?;
//!
//!     let setup = HandSetup { big_blind: 10, small_blind: 5, hero_stack: 1000, ai_stack: 1000 };
//!     manager.start_hand(&game.id, setup).await?;
//!     manager.deal_street(&game.id, Street::Postflop, 20).await?;
//!     manager.showdown(&game.id, 0, false).await?;
//!     Ok(())
//! }
//! ```

pub mod actor;
pub mod manager;
pub mod messages;

pub use actor::{DEFAULT_MAILBOX_CAPACITY, TableActor, TableHandle};
pub use manager::TableManager;
pub use messages::{ActionOutcome, TableMessage};

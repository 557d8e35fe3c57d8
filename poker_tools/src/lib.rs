//! # Poker Tools
//!
//! A heads-up Texas Hold'em hand engine (hero against an AI opponent) exposed
//! as four callable tools, with per-game persistent state.
//!
//! The engine deals and keeps the books; it does not evaluate hands or decide
//! bets. Bet amounts arrive already agreed by the caller, and the winner is
//! left to whoever reads the showdown result.
//!
//! ## Architecture
//!
//! A hand moves through an explicit stage machine:
//!
//! - **Setup**: table created, nothing dealt
//! - **Preflop**: deck shuffled, button chosen, blinds posted, hole cards dealt
//! - **Postflop/Turn/River**: community cards dealt, matched bets moved to the pot
//! - **Showdown**: board run out to five cards, both hands revealed
//!
//! Repeating an action for a stage the hand already reached is a replay: the
//! current state comes back unchanged, so every call is safe to retry.
//!
//! ## Core Modules
//!
//! - [`game`]: cards, deck, game state and the hand lifecycle
//! - [`db`]: game state repositories (in-memory and PostgreSQL)
//! - [`table`]: one actor per game id, serializing every read-modify-write
//! - [`tools`]: the named tool façade with its catalog and output channels
//!
//! ## Example
//!
//! ```no_run
//! use poker_tools::{MemoryGameRepository, PokerTools};
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), poker_tools::ToolError> {
//!     let tools = PokerTools::with_repository(Arc::new(MemoryGameRepository::new()));
//!
//!     let table = tools.call("poker.new_table", json!({})).await?;
//!     let game_id = table.structured["game_id"].clone();
//!
//!     tools
//!         .call(
//!             "poker.start_hand",
//!             json!({"game_id": game_id, "bb": 10, "sb": 5, "hero_stack": 1000, "ai_stack": 1000}),
//!         )
//!         .await?;
//!     let flop = tools
//!         .call("poker.deal", json!({"game_id": game_id, "street": "postflop", "bet": 20}))
//!         .await?;
//!     println!("{}", flop.text);
//!     Ok(())
//! }
//! ```

/// Card, deck and hand lifecycle logic.
pub mod game;
pub use game::{
    Card, Deck, GameId, GameState, HandError, HandResult, HandSetup, Seat, Stage, Street,
    Transition,
};

/// Persistence of game state.
pub mod db;
pub use db::{GameRepository, MemoryGameRepository, PgGameRepository, StoreError};

/// Per-game actors.
pub mod table;
pub use table::{ActionOutcome, TableManager};

/// Named tools.
pub mod tools;
pub use tools::{PokerTools, ToolError, ToolName, ToolOutput};

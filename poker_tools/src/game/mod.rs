//! Hand engine: cards, deck, per-game state and the hand state machine.
//!
//! This module provides:
//! - Value types for cards, decks, seats, stages and streets
//! - [`GameState`], the record persisted for each game id
//! - The hand lifecycle (`start_hand`, `deal_street`, `showdown`) with an
//!   explicit stage transition table and replay detection

pub mod entities;
pub mod errors;
pub mod hand;

pub use entities::{
    Card, DECK_SIZE, Deck, FULL_BOARD, GameId, GameState, PlayerState, Rank, Seat, Stage, Street,
    Suit,
};
pub use errors::{HandError, HandResult};
pub use hand::{HandSetup, Transition};

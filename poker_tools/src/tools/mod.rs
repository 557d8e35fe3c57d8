//! Tool façade: the four named actions callers use to drive a hand.
//!
//! - `poker.new_table`: create a game and return its id
//! - `poker.start_hand`: shuffle, post blinds, deal hole cards
//! - `poker.deal`: deal the flop, turn or river
//! - `poker.showdown`: run out the board and reveal both hands
//!
//! Every call returns a narrative `text` and two JSON channels, see
//! [`ToolOutput`].

pub mod catalog;
pub mod errors;
pub mod manager;
pub mod models;

pub use catalog::{ToolDescriptor, catalog};
pub use errors::{ToolError, ToolResult};
pub use manager::PokerTools;
pub use models::{
    DealArgs, NewTableArgs, SeatView, ShowdownArgs, StartHandArgs, ToolName, ToolOutput,
};

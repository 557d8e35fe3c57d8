//! Tool names, argument types and output views.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::{fmt, str::FromStr};

use super::errors::ToolError;
use crate::{
    game::{Card, GameState, HandSetup, Seat, Stage, Street},
    table::ActionOutcome,
};

/// The four callable tools
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolName {
    NewTable,
    StartHand,
    Deal,
    Showdown,
}

impl ToolName {
    pub const ALL: [ToolName; 4] = [
        ToolName::NewTable,
        ToolName::StartHand,
        ToolName::Deal,
        ToolName::Showdown,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ToolName::NewTable => "poker.new_table",
            ToolName::StartHand => "poker.start_hand",
            ToolName::Deal => "poker.deal",
            ToolName::Showdown => "poker.showdown",
        }
    }
}

impl fmt::Display for ToolName {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ToolName {
    type Err = ToolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Older hosts registered the last tool as `poker.shutdown`.
        if s == "poker.shutdown" {
            return Ok(ToolName::Showdown);
        }
        ToolName::ALL
            .into_iter()
            .find(|tool| tool.as_str() == s)
            .ok_or_else(|| ToolError::UnknownTool(s.to_string()))
    }
}

/// `poker.new_table` takes no arguments
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewTableArgs {}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StartHandArgs {
    pub game_id: String,
    pub bb: i64,
    pub sb: i64,
    pub hero_stack: i64,
    pub ai_stack: i64,
}

impl StartHandArgs {
    pub fn setup(&self) -> HandSetup {
        HandSetup {
            big_blind: self.bb,
            small_blind: self.sb,
            hero_stack: self.hero_stack,
            ai_stack: self.ai_stack,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DealArgs {
    pub game_id: String,
    #[serde(alias = "stage")]
    pub street: Street,
    /// Amount each player matched on the street
    #[serde(default)]
    pub bet: i64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ShowdownArgs {
    pub game_id: String,
    #[serde(default)]
    pub bet: i64,
    #[serde(default)]
    pub is_fold: bool,
}

/// Result of one tool call.
///
/// `structured` is read by the orchestrating caller, which plays the AI seat.
/// `widget` is rendered for the human player. Before showdown each channel
/// carries only its own seat's hole cards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolOutput {
    pub text: String,
    pub structured: Value,
    pub widget: Value,
}

/// Table as seen from one seat
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SeatView {
    pub game_id: String,
    pub viewer: Seat,
    pub stage: Stage,
    pub board: Vec<Card>,
    pub pot: i64,
    pub hero_stack: i64,
    pub ai_stack: i64,
    pub button: Option<Seat>,
    pub sb: i64,
    pub bb: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hero_hole: Option<[Card; 2]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ai_hole: Option<[Card; 2]>,
    pub ended_by_fold: bool,
    /// True when the call repeated an action already applied
    pub replay: bool,
}

impl SeatView {
    /// Project `state` for `viewer`. The opponent's hole cards appear only
    /// once the hand reached showdown.
    pub fn new(state: &GameState, viewer: Seat, replay: bool) -> Self {
        let revealed = state.stage == Stage::Showdown;
        let visible = |seat: Seat| {
            if seat == viewer || revealed {
                state.player(seat).hole
            } else {
                None
            }
        };

        Self {
            game_id: state.id.to_string(),
            viewer,
            stage: state.stage,
            board: state.board.clone(),
            pot: state.pot,
            hero_stack: state.hero.stack,
            ai_stack: state.ai.stack,
            button: state.button,
            sb: state.sb,
            bb: state.bb,
            hero_hole: visible(Seat::Hero),
            ai_hole: visible(Seat::Ai),
            ended_by_fold: state.ended_by_fold,
            replay,
        }
    }
}

impl ToolOutput {
    /// Build both channels for an action outcome
    pub fn from_outcome(text: String, outcome: &ActionOutcome) -> Result<Self, ToolError> {
        let replay = outcome.is_replay();
        Ok(Self {
            text,
            structured: serde_json::to_value(SeatView::new(&outcome.state, Seat::Ai, replay))?,
            widget: serde_json::to_value(SeatView::new(&outcome.state, Seat::Hero, replay))?,
        })
    }
}

/// Space-separated card list for narration
pub(crate) fn describe_cards(cards: &[Card]) -> String {
    cards
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}

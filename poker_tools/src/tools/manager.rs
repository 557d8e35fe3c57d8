//! Tool dispatch: parse arguments, run the hand action, narrate the result.

use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::sync::Arc;

use super::{
    errors::{ToolError, ToolResult},
    models::{
        DealArgs, NewTableArgs, ShowdownArgs, StartHandArgs, ToolName, ToolOutput,
        describe_cards,
    },
};
use crate::{
    db::GameRepository,
    game::{GameId, GameState, Seat, Street},
    table::{ActionOutcome, TableManager},
};

/// Entry point for the four poker tools
#[derive(Clone)]
pub struct PokerTools {
    manager: TableManager,
}

impl PokerTools {
    pub fn new(manager: TableManager) -> Self {
        Self { manager }
    }

    /// Tools over a fresh [`TableManager`] for `repository`
    pub fn with_repository(repository: Arc<dyn GameRepository>) -> Self {
        Self::new(TableManager::new(repository))
    }

    pub fn manager(&self) -> &TableManager {
        &self.manager
    }

    /// Invoke a tool by name with JSON arguments
    ///
    /// # Arguments
    ///
    /// * `name` - Tool name, e.g. `poker.deal`
    /// * `arguments` - JSON object matching the tool's input schema; `null`
    ///   counts as an empty object
    ///
    /// # Returns
    ///
    /// * `ToolResult<ToolOutput>` - Narrative plus both structured channels
    pub async fn call(&self, name: &str, arguments: Value) -> ToolResult<ToolOutput> {
        let tool: ToolName = name.parse()?;
        log::debug!("Tool call {} with {}", tool, arguments);

        match tool {
            ToolName::NewTable => {
                let NewTableArgs {} = parse_args(tool, arguments)?;
                self.new_table().await
            }
            ToolName::StartHand => self.start_hand(parse_args(tool, arguments)?).await,
            ToolName::Deal => self.deal(parse_args(tool, arguments)?).await,
            ToolName::Showdown => self.showdown(parse_args(tool, arguments)?).await,
        }
    }

    pub async fn new_table(&self) -> ToolResult<ToolOutput> {
        let state = self.manager.new_table().await?;
        let payload = json!({ "game_id": state.id, "stage": state.stage });

        Ok(ToolOutput {
            text: format!("New table {} is ready. Start a hand to deal cards.", state.id),
            structured: payload.clone(),
            widget: payload,
        })
    }

    pub async fn start_hand(&self, args: StartHandArgs) -> ToolResult<ToolOutput> {
        let id = GameId::parse(&args.game_id)?;
        let outcome = self.manager.start_hand(&id, args.setup()).await?;
        let state = &outcome.state;

        let (sb_seat, bb_seat) = match state.button {
            Some(button) => (button, button.other()),
            None => (Seat::Hero, Seat::Ai),
        };
        let text = format!(
            "New hand on table {}. {} has the button and posts the small blind of {}; {} posts \
             the big blind of {}. Pot {}. Stacks: hero {}, ai {}.",
            state.id,
            sb_seat,
            state.sb,
            bb_seat,
            state.bb,
            state.pot,
            state.hero.stack,
            state.ai.stack
        );

        ToolOutput::from_outcome(text, &outcome)
    }

    pub async fn deal(&self, args: DealArgs) -> ToolResult<ToolOutput> {
        let id = GameId::parse(&args.game_id)?;
        let outcome = self.manager.deal_street(&id, args.street, args.bet).await?;
        ToolOutput::from_outcome(narrate_street(args.street, &outcome), &outcome)
    }

    pub async fn showdown(&self, args: ShowdownArgs) -> ToolResult<ToolOutput> {
        let id = GameId::parse(&args.game_id)?;
        let outcome = self.manager.showdown(&id, args.bet, args.is_fold).await?;
        ToolOutput::from_outcome(narrate_showdown(&outcome), &outcome)
    }
}

fn parse_args<T: DeserializeOwned>(tool: ToolName, arguments: Value) -> ToolResult<T> {
    let arguments = match arguments {
        Value::Null => Value::Object(Default::default()),
        other => other,
    };
    serde_json::from_value(arguments).map_err(|e| ToolError::InvalidArguments {
        tool: tool.as_str(),
        reason: e.to_string(),
    })
}

fn narrate_street(street: Street, outcome: &ActionOutcome) -> String {
    let state = &outcome.state;
    if outcome.is_replay() {
        return format!(
            "The {} was already dealt; nothing changed. Board: {}. Pot {}.",
            street,
            describe_cards(&state.board),
            state.pot
        );
    }

    let dealt = &state.board[state.board.len().saturating_sub(street.cards_dealt())..];
    format!(
        "{} dealt: {}. Board: {}. Pot {}. Stacks: hero {}, ai {}.",
        capitalize(street.to_string()),
        describe_cards(dealt),
        describe_cards(&state.board),
        state.pot,
        state.hero.stack,
        state.ai.stack
    )
}

fn narrate_showdown(outcome: &ActionOutcome) -> String {
    let state = &outcome.state;
    let prefix = match (outcome.is_replay(), state.ended_by_fold) {
        (true, _) => "Showdown was already reached; nothing changed.",
        (false, true) => "Hand ended by a fold; board run out.",
        (false, false) => "Showdown.",
    };
    format!(
        "{} Board: {}. Hero shows {}, ai shows {}. Pot {}. Stacks: hero {}, ai {}.",
        prefix,
        describe_cards(&state.board),
        hole_text(state, Seat::Hero),
        hole_text(state, Seat::Ai),
        state.pot,
        state.hero.stack,
        state.ai.stack
    )
}

fn hole_text(state: &GameState, seat: Seat) -> String {
    match state.player(seat).hole {
        Some(hole) => describe_cards(&hole),
        None => "nothing".to_string(),
    }
}

fn capitalize(word: String) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => word,
    }
}

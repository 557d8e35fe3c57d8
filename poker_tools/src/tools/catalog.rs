//! Tool metadata published to the invoking host.

use serde::Serialize;
use serde_json::{Value, json};

use super::models::ToolName;

/// What a host needs to list and invoke one tool
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolDescriptor {
    pub name: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    /// Status line shown while the call runs
    pub invoking: &'static str,
    /// Status line shown once the call returns
    pub invoked: &'static str,
    pub input_schema: Value,
}

impl ToolName {
    pub fn descriptor(self) -> ToolDescriptor {
        match self {
            ToolName::NewTable => ToolDescriptor {
                name: self.as_str(),
                title: "New poker table",
                description: "Create a heads-up table and return its game_id.",
                invoking: "Setting up the table",
                invoked: "Table ready",
                input_schema: json!({
                    "type": "object",
                    "properties": {},
                    "additionalProperties": false
                }),
            },
            ToolName::StartHand => ToolDescriptor {
                name: self.as_str(),
                title: "Start hand",
                description: "Shuffle, pick the button, post blinds and deal two hole cards to \
                              hero and ai. Overwrites any previous hand at this table.",
                invoking: "Shuffling and dealing",
                invoked: "Cards dealt",
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "game_id": { "type": "string" },
                        "bb": { "type": "integer", "exclusiveMinimum": 0 },
                        "sb": { "type": "integer", "exclusiveMinimum": 0 },
                        "hero_stack": { "type": "integer", "minimum": 0 },
                        "ai_stack": { "type": "integer", "minimum": 0 }
                    },
                    "required": ["game_id", "bb", "sb", "hero_stack", "ai_stack"],
                    "additionalProperties": false
                }),
            },
            ToolName::Deal => ToolDescriptor {
                name: self.as_str(),
                title: "Deal street",
                description: "Deal the flop, turn or river after both players matched `bet`. \
                              Repeating a street already dealt changes nothing.",
                invoking: "Dealing",
                invoked: "Street dealt",
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "game_id": { "type": "string" },
                        "street": { "type": "string", "enum": ["postflop", "flop", "turn", "river"] },
                        "bet": { "type": "integer", "minimum": 0, "default": 0 }
                    },
                    "required": ["game_id", "street"],
                    "additionalProperties": false
                }),
            },
            ToolName::Showdown => ToolDescriptor {
                name: self.as_str(),
                title: "Showdown",
                description: "Run the board out to five cards, take the final matched `bet` \
                              and reveal both hands. No winner is computed.",
                invoking: "Revealing hands",
                invoked: "Hands revealed",
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "game_id": { "type": "string" },
                        "bet": { "type": "integer", "minimum": 0, "default": 0 },
                        "is_fold": { "type": "boolean", "default": false }
                    },
                    "required": ["game_id"],
                    "additionalProperties": false
                }),
            },
        }
    }
}

/// Descriptors for every tool, in invocation order
pub fn catalog() -> Vec<ToolDescriptor> {
    ToolName::ALL.into_iter().map(ToolName::descriptor).collect()
}

//! Integration tests for the tool façade.
//!
//! Drives complete hands through `PokerTools::call` with JSON arguments and
//! checks that each output channel only reveals its own seat's hole cards
//! before showdown.

use poker_tools::db::MemoryGameRepository;
use poker_tools::tools::{PokerTools, ToolError, ToolName, ToolOutput, catalog};
use poker_tools::game::HandError;
use serde_json::{Value, json};
use std::sync::Arc;

fn tools() -> PokerTools {
    PokerTools::with_repository(Arc::new(MemoryGameRepository::new()))
}

async fn new_game(tools: &PokerTools) -> Value {
    let output = tools.call("poker.new_table", json!({})).await.unwrap();
    assert_eq!(output.structured["stage"], "setup");
    output.structured["game_id"].clone()
}

async fn start(tools: &PokerTools, game_id: &Value) -> ToolOutput {
    tools
        .call(
            "poker.start_hand",
            json!({"game_id": game_id, "bb": 10, "sb": 5, "hero_stack": 1000, "ai_stack": 1000}),
        )
        .await
        .unwrap()
}

fn stacks(output: &Value) -> (i64, i64) {
    (
        output["hero_stack"].as_i64().unwrap(),
        output["ai_stack"].as_i64().unwrap(),
    )
}

#[tokio::test]
async fn test_hole_cards_stay_on_their_channel_until_showdown() {
    let tools = tools();
    let game_id = new_game(&tools).await;

    let started = start(&tools, &game_id).await;
    assert!(started.widget["hero_hole"].is_array());
    assert!(started.widget.get("ai_hole").is_none());
    assert!(started.structured["ai_hole"].is_array());
    assert!(started.structured.get("hero_hole").is_none());

    let hero_hole = started.widget["hero_hole"].clone();
    let ai_hole = started.structured["ai_hole"].clone();
    assert_ne!(hero_hole, ai_hole);
    for card in hero_hole.as_array().unwrap() {
        assert!(!started.text.contains(card.as_str().unwrap()));
    }

    let flop = tools
        .call("poker.deal", json!({"game_id": game_id, "street": "postflop", "bet": 20}))
        .await
        .unwrap();
    assert!(flop.widget.get("ai_hole").is_none());
    assert!(flop.structured.get("hero_hole").is_none());

    let shown = tools
        .call("poker.showdown", json!({"game_id": game_id, "bet": 0, "is_fold": false}))
        .await
        .unwrap();
    for channel in [&shown.widget, &shown.structured] {
        assert_eq!(channel["hero_hole"], hero_hole);
        assert_eq!(channel["ai_hole"], ai_hole);
        assert_eq!(channel["stage"], "showdown");
        assert_eq!(channel["board"].as_array().unwrap().len(), 5);
    }
}

#[tokio::test]
async fn test_reference_hand_through_tools() {
    let tools = tools();
    let game_id = new_game(&tools).await;

    let started = start(&tools, &game_id).await;
    assert_eq!(started.structured["pot"], 15);
    let (hero, ai) = stacks(&started.structured);
    let mut blinds = [hero, ai];
    blinds.sort();
    assert_eq!(blinds, [990, 995]);
    assert!(started.structured["board"].as_array().unwrap().is_empty());

    let flop = tools
        .call("poker.deal", json!({"game_id": game_id, "street": "flop", "bet": 20}))
        .await
        .unwrap();
    assert_eq!(flop.structured["pot"], 55);
    assert_eq!(flop.structured["board"].as_array().unwrap().len(), 3);
    assert_eq!(stacks(&flop.structured), (hero - 20, ai - 20));

    let fold = tools
        .call("poker.showdown", json!({"game_id": game_id, "is_fold": true}))
        .await
        .unwrap();
    assert_eq!(fold.structured["board"].as_array().unwrap().len(), 5);
    assert_eq!(fold.structured["ended_by_fold"], true);
    assert_eq!(stacks(&fold.structured), (hero - 20, ai - 20));
    assert!(fold.text.contains("fold"));
}

#[tokio::test]
async fn test_shutdown_name_closes_the_hand() {
    let tools = tools();
    let game_id = new_game(&tools).await;
    start(&tools, &game_id).await;

    let first = tools
        .call("poker.shutdown", json!({"game_id": game_id, "is_fold": true}))
        .await
        .unwrap();
    assert_eq!(first.structured["stage"], "showdown");
    assert_eq!(first.structured["board"].as_array().unwrap().len(), 5);

    let again = tools
        .call("poker.showdown", json!({"game_id": game_id, "is_fold": true}))
        .await
        .unwrap();
    assert_eq!(again.structured["board"], first.structured["board"]);
    assert_eq!(again.structured["pot"], first.structured["pot"]);
}

#[tokio::test]
async fn test_missing_game_is_reported() {
    let tools = tools();
    let err = tools
        .call("poker.deal", json!({"game_id": "nope", "street": "turn", "bet": 0}))
        .await
        .unwrap_err();

    assert!(matches!(err, ToolError::Hand(HandError::GameNotFound(_))));
    assert_eq!(err.client_message(), "Game nope not found");
}

#[tokio::test]
async fn test_unknown_street_is_invalid_arguments() {
    let tools = tools();
    let game_id = new_game(&tools).await;
    start(&tools, &game_id).await;

    let err = tools
        .call("poker.deal", json!({"game_id": game_id, "street": "fourth", "bet": 0}))
        .await
        .unwrap_err();
    assert!(matches!(err, ToolError::InvalidArguments { tool: "poker.deal", .. }));
}

#[test]
fn test_catalog_covers_every_tool_name() {
    let catalog = catalog();
    assert_eq!(catalog.len(), ToolName::ALL.len());
    for (descriptor, tool) in catalog.iter().zip(ToolName::ALL) {
        assert_eq!(descriptor.name, tool.as_str());
        assert_eq!(descriptor.input_schema["type"], "object");
        assert!(!descriptor.invoking.is_empty());
        assert!(!descriptor.invoked.is_empty());
    }
}

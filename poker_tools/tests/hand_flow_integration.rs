//! Integration tests for complete hands driven through the table manager.
//!
//! Covers the reference scenarios (a full hand on one table, a fold before
//! the river), replay of repeated actions and missing-game errors.

use poker_tools::db::MemoryGameRepository;
use poker_tools::game::{GameId, HandError, HandSetup, Seat, Stage, Street, Transition};
use poker_tools::table::TableManager;
use std::collections::BTreeSet;
use std::sync::Arc;

fn manager() -> TableManager {
    TableManager::new(Arc::new(MemoryGameRepository::new()))
}

fn setup() -> HandSetup {
    HandSetup {
        big_blind: 10,
        small_blind: 5,
        hero_stack: 1000,
        ai_stack: 1000,
    }
}

#[tokio::test]
async fn test_full_hand_scenario() {
    let manager = manager();
    let game = manager.new_table().await.unwrap();
    assert_eq!(game.stage, Stage::Setup);
    assert!(game.deck.is_empty());
    assert!(game.board.is_empty());

    let started = manager.start_hand(&game.id, setup()).await.unwrap().state;
    assert_eq!(started.pot, 15);
    let button = started.button.unwrap();
    assert_eq!(started.player(button).stack, 995);
    assert_eq!(started.player(button.other()).stack, 990);
    assert!(started.hero.hole.is_some());
    assert!(started.ai.hole.is_some());
    assert!(started.board.is_empty());

    let flop = manager
        .deal_street(&game.id, Street::Postflop, 20)
        .await
        .unwrap()
        .state;
    assert_eq!(flop.board.len(), 3);
    assert_eq!(flop.pot, 55);
    assert_eq!(flop.hero.stack, started.hero.stack - 20);
    assert_eq!(flop.ai.stack, started.ai.stack - 20);

    let shown = manager.showdown(&game.id, 0, false).await.unwrap().state;
    assert_eq!(shown.board.len(), 5);
    assert_eq!(&shown.board[..3], &flop.board[..]);
    assert_eq!(shown.stage, Stage::Showdown);
    assert_eq!(shown.hero.stack, flop.hero.stack);
    assert_eq!(shown.ai.stack, flop.ai.stack);
    assert_eq!(shown.total_chips(), 2000);
    assert!(!shown.ended_by_fold);
    assert!(shown.is_consistent());
}

#[tokio::test]
async fn test_fold_before_river_runs_out_board() {
    let manager = manager();
    let id = manager.new_table().await.unwrap().id;
    manager.start_hand(&id, setup()).await.unwrap();
    manager.deal_street(&id, Street::Postflop, 20).await.unwrap();

    let outcome = manager.showdown(&id, 0, true).await.unwrap();
    assert_eq!(outcome.transition, Transition::Advance);
    assert_eq!(outcome.state.board.len(), 5);
    assert_eq!(outcome.state.stage, Stage::Showdown);
    assert!(outcome.state.ended_by_fold);
    assert_eq!(outcome.state.deck.len(), 52 - 4 - 5);
}

#[tokio::test]
async fn test_every_street_in_order() {
    let manager = manager();
    let id = manager.new_table().await.unwrap().id;
    manager.start_hand(&id, setup()).await.unwrap();

    for (street, board_len) in [(Street::Postflop, 3), (Street::Turn, 4), (Street::River, 5)] {
        let state = manager.deal_street(&id, street, 10).await.unwrap().state;
        assert_eq!(state.board.len(), board_len);
        assert_eq!(state.stage, street.stage());
    }

    let state = manager.showdown(&id, 50, false).await.unwrap().state;
    assert_eq!(state.pot, 15 + 3 * 20 + 100);
    assert_eq!(state.total_chips(), 2000);

    let cards: BTreeSet<_> = state
        .board
        .iter()
        .chain(state.hero.hole.iter().flatten())
        .chain(state.ai.hole.iter().flatten())
        .chain(state.deck.cards())
        .collect();
    assert_eq!(cards.len(), 52);
}

#[tokio::test]
async fn test_repeated_deal_is_a_replay() {
    let manager = manager();
    let id = manager.new_table().await.unwrap().id;
    manager.start_hand(&id, setup()).await.unwrap();

    let first = manager.deal_street(&id, Street::Postflop, 20).await.unwrap();
    let second = manager.deal_street(&id, Street::Postflop, 20).await.unwrap();

    assert_eq!(first.transition, Transition::Advance);
    assert_eq!(second.transition, Transition::Replay);
    assert_eq!(second.state, first.state);
    assert_eq!(manager.get_state(&id).await.unwrap(), first.state);
}

#[tokio::test]
async fn test_repeated_showdown_does_not_charge_twice() {
    let manager = manager();
    let id = manager.new_table().await.unwrap().id;
    manager.start_hand(&id, setup()).await.unwrap();

    let first = manager.showdown(&id, 30, false).await.unwrap().state;
    let second = manager.showdown(&id, 30, false).await.unwrap();

    assert!(second.is_replay());
    assert_eq!(second.state.pot, first.pot);
    assert_eq!(second.state.hero.stack, first.hero.stack);
    assert_eq!(second.state.ai.stack, first.ai.stack);
}

#[tokio::test]
async fn test_new_hand_overwrites_finished_hand() {
    let manager = manager();
    let id = manager.new_table().await.unwrap().id;
    manager.start_hand(&id, setup()).await.unwrap();
    manager.showdown(&id, 0, true).await.unwrap();

    let next = HandSetup {
        big_blind: 20,
        small_blind: 10,
        hero_stack: 1500,
        ai_stack: 500,
    };
    let state = manager.start_hand(&id, next).await.unwrap().state;
    assert_eq!(state.stage, Stage::Preflop);
    assert_eq!(state.pot, 30);
    assert_eq!(state.deck.len(), 48);
    assert_eq!(state.total_chips(), 2000);
    assert!(state.board.is_empty());
}

#[tokio::test]
async fn test_deal_unknown_game_fails() {
    let manager = manager();
    let id = GameId::parse("does-not-exist").unwrap();

    let err = manager
        .deal_street(&id, Street::Postflop, 0)
        .await
        .unwrap_err();
    assert!(matches!(err, HandError::GameNotFound(ref missing) if *missing == id));
    assert!(!err.is_retryable());

    assert!(matches!(
        manager.showdown(&id, 0, false).await,
        Err(HandError::GameNotFound(_))
    ));
}

#[tokio::test]
async fn test_out_of_order_actions_are_rejected() {
    let manager = manager();
    let id = manager.new_table().await.unwrap().id;

    assert!(matches!(
        manager.deal_street(&id, Street::Postflop, 0).await,
        Err(HandError::IllegalTransition { from: Stage::Setup, .. })
    ));

    manager.start_hand(&id, setup()).await.unwrap();
    assert!(matches!(
        manager.deal_street(&id, Street::River, 0).await,
        Err(HandError::IllegalTransition { from: Stage::Preflop, to: Stage::River })
    ));
    assert!(matches!(
        manager.deal_street(&id, Street::Postflop, -5).await,
        Err(HandError::InvalidInput(_))
    ));

    let state = manager.get_state(&id).await.unwrap();
    assert_eq!(state.stage, Stage::Preflop);
    assert_eq!(state.pot, 15);
}

#[tokio::test]
async fn test_button_posts_small_blind() {
    let manager = manager();
    let id = manager.new_table().await.unwrap().id;
    let uneven = HandSetup {
        big_blind: 40,
        small_blind: 15,
        hero_stack: 1000,
        ai_stack: 1000,
    };

    let state = manager.start_hand(&id, uneven).await.unwrap().state;
    let expected = |seat: Seat| {
        if state.button == Some(seat) { 985 } else { 960 }
    };
    assert_eq!(state.hero.stack, expected(Seat::Hero));
    assert_eq!(state.ai.stack, expected(Seat::Ai));
}

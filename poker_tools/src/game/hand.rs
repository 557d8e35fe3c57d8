//! Hand lifecycle: blinds, streets and showdown applied to a [`GameState`].
//!
//! These functions are pure with respect to storage: they mutate the state they
//! are given and leave it untouched when they fail. Persisting the result is
//! the table actor's job.

use rand::{CryptoRng, Rng};
use serde::{Deserialize, Serialize};

use super::entities::{FULL_BOARD, Deck, GameState, PlayerState, Seat, Stage, Street};
use super::errors::{HandError, HandResult};

/// What an action did to the state.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Transition {
    /// State moved forward and must be persisted.
    Advance,
    /// Repeat of an action already applied; state untouched.
    Replay,
}

impl Stage {
    /// Transition table for the hand state machine.
    ///
    /// A new hand may start from anywhere. Streets advance one at a time and
    /// showdown may follow any dealt stage. Asking for a stage the hand has
    /// already reached is a replay.
    pub fn transition_to(self, target: Stage) -> HandResult<Transition> {
        use Stage::*;

        match (self, target) {
            (_, Preflop) => Ok(Transition::Advance),
            (Preflop, Postflop) | (Postflop, Turn) | (Turn, River) => Ok(Transition::Advance),
            (Preflop | Postflop | Turn | River, Showdown) => Ok(Transition::Advance),
            (Setup, _) | (_, Setup) => Err(HandError::IllegalTransition {
                from: self,
                to: target,
            }),
            (from, to) if from >= to => Ok(Transition::Replay),
            (from, to) => Err(HandError::IllegalTransition { from, to }),
        }
    }
}

/// Blinds and starting stacks supplied when a hand starts.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct HandSetup {
    pub big_blind: i64,
    pub small_blind: i64,
    pub hero_stack: i64,
    pub ai_stack: i64,
}

impl HandSetup {
    pub fn validate(&self) -> HandResult<()> {
        if self.big_blind <= 0 {
            return Err(HandError::InvalidInput(format!(
                "bb must be positive, got {}",
                self.big_blind
            )));
        }
        if self.small_blind <= 0 {
            return Err(HandError::InvalidInput(format!(
                "sb must be positive, got {}",
                self.small_blind
            )));
        }
        if self.hero_stack < 0 {
            return Err(HandError::InvalidInput(format!(
                "hero_stack must not be negative, got {}",
                self.hero_stack
            )));
        }
        if self.ai_stack < 0 {
            return Err(HandError::InvalidInput(format!(
                "ai_stack must not be negative, got {}",
                self.ai_stack
            )));
        }
        Ok(())
    }
}

/// Start a new hand: fresh shuffled deck, random button, blinds posted and
/// two hole cards each (hero first).
///
/// Overwrites whatever hand was in `state` before.
pub fn start_hand<R: Rng + CryptoRng>(
    state: &mut GameState,
    setup: &HandSetup,
    rng: &mut R,
) -> HandResult<()> {
    setup.validate()?;
    state.stage.transition_to(Stage::Preflop)?;

    let pot = setup
        .small_blind
        .checked_add(setup.big_blind)
        .ok_or_else(|| HandError::InvalidInput("blinds overflow".into()))?;

    let mut deck = Deck::standard();
    deck.shuffle_with(rng);

    let button = if rng.random_bool(0.5) {
        Seat::Hero
    } else {
        Seat::Ai
    };

    let blind_for = |seat: Seat| {
        if seat == button {
            setup.small_blind
        } else {
            setup.big_blind
        }
    };

    let hero_hole = [deck.draw()?, deck.draw()?];
    let ai_hole = [deck.draw()?, deck.draw()?];

    state.deck = deck;
    state.board.clear();
    state.hero = PlayerState {
        hole: Some(hero_hole),
        folded: false,
        stack: setup.hero_stack - blind_for(Seat::Hero),
    };
    state.ai = PlayerState {
        hole: Some(ai_hole),
        folded: false,
        stack: setup.ai_stack - blind_for(Seat::Ai),
    };
    state.pot = pot;
    state.sb = setup.small_blind;
    state.bb = setup.big_blind;
    state.button = Some(button);
    state.stage = Stage::Preflop;
    state.ended_by_fold = false;

    warn_on_negative_stacks(state);
    log::info!(
        "Game {}: hand started, button {}, blinds {}/{}",
        state.id,
        button,
        setup.small_blind,
        setup.big_blind
    );

    Ok(())
}

/// Deal the community cards of `street` and take the matched `bet` from both
/// players.
///
/// Returns [`Transition::Replay`] without touching anything if the street has
/// already been dealt.
pub fn deal_street(state: &mut GameState, street: Street, bet: i64) -> HandResult<Transition> {
    validate_bet(bet)?;

    if state.stage.transition_to(street.stage())? == Transition::Replay {
        log::debug!(
            "Game {}: {} already dealt (stage {}), replaying",
            state.id,
            street,
            state.stage
        );
        return Ok(Transition::Replay);
    }

    let charged = charge_matched_bet(state, bet)?;
    let cards = state.deck.draw_many(street.cards_dealt())?;
    charged.apply(state);
    state.board.extend(cards);
    state.stage = street.stage();

    log::info!(
        "Game {}: {} dealt, pot {}",
        state.id,
        street,
        state.pot
    );

    Ok(Transition::Advance)
}

/// Run the board out to five cards, take the final matched `bet` and move to
/// showdown.
///
/// A second call after showdown is a replay and does not charge the bet again.
/// No winner is computed.
pub fn showdown(state: &mut GameState, bet: i64, is_fold: bool) -> HandResult<Transition> {
    validate_bet(bet)?;

    if state.stage.transition_to(Stage::Showdown)? == Transition::Replay {
        log::debug!("Game {}: showdown already applied, replaying", state.id);
        return Ok(Transition::Replay);
    }

    let missing = FULL_BOARD.saturating_sub(state.board.len());
    let charged = charge_matched_bet(state, bet)?;
    let run_out = state.deck.draw_many(missing)?;
    charged.apply(state);
    state.board.extend(run_out);
    state.stage = Stage::Showdown;
    state.ended_by_fold = is_fold;

    log::info!(
        "Game {}: showdown{}, pot {}",
        state.id,
        if is_fold { " after fold" } else { "" },
        state.pot
    );

    Ok(Transition::Advance)
}

fn validate_bet(bet: i64) -> HandResult<()> {
    if bet < 0 {
        return Err(HandError::InvalidInput(format!(
            "bet must not be negative, got {bet}"
        )));
    }
    Ok(())
}

/// Chip counts after both players put the same bet in.
struct Charged {
    pot: i64,
    hero_stack: i64,
    ai_stack: i64,
}

impl Charged {
    fn apply(self, state: &mut GameState) {
        state.pot = self.pot;
        state.hero.stack = self.hero_stack;
        state.ai.stack = self.ai_stack;
        warn_on_negative_stacks(state);
    }
}

/// Pot grows by twice the bet, each stack shrinks by the bet.
fn charge_matched_bet(state: &GameState, bet: i64) -> HandResult<Charged> {
    let overflow = || HandError::InvalidInput(format!("bet {bet} overflows chip arithmetic"));

    Ok(Charged {
        pot: bet
            .checked_mul(2)
            .and_then(|both| state.pot.checked_add(both))
            .ok_or_else(overflow)?,
        hero_stack: state.hero.stack.checked_sub(bet).ok_or_else(overflow)?,
        ai_stack: state.ai.stack.checked_sub(bet).ok_or_else(overflow)?,
    })
}

fn warn_on_negative_stacks(state: &GameState) {
    for seat in [Seat::Hero, Seat::Ai] {
        let stack = state.player(seat).stack;
        if stack < 0 {
            log::warn!(
                "Game {}: {} stack is negative ({}); bets exceed what the player holds",
                state.id,
                seat,
                stack
            );
        }
    }
}

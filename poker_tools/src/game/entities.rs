use chrono::{DateTime, Utc};
use rand::{CryptoRng, Rng};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::{fmt, str::FromStr};
use uuid::Uuid;

use super::errors::{HandError, HandResult};

/// Number of cards in a standard deck (no jokers).
pub const DECK_SIZE: usize = 52;

/// Number of community cards once the board is complete.
pub const FULL_BOARD: usize = 5;

/// Longest game id accepted from callers.
pub const MAX_GAME_ID_LENGTH: usize = 128;

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Suit {
    Club,
    Diamond,
    Heart,
    Spade,
}

impl Suit {
    pub const ALL: [Self; 4] = [Self::Club, Self::Diamond, Self::Heart, Self::Spade];

    pub fn symbol(self) -> char {
        match self {
            Self::Club => '♣',
            Self::Diamond => '♦',
            Self::Heart => '♥',
            Self::Spade => '♠',
        }
    }

    fn from_symbol(c: char) -> Option<Self> {
        match c {
            '♣' | 'c' | 'C' => Some(Self::Club),
            '♦' | 'd' | 'D' => Some(Self::Diamond),
            '♥' | 'h' | 'H' => Some(Self::Heart),
            '♠' | 's' | 'S' => Some(Self::Spade),
            _ => None,
        }
    }
}

impl fmt::Display for Suit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Rank {
    Two,
    Three,
    Four,
    Five,
    Six,
    Seven,
    Eight,
    Nine,
    Ten,
    Jack,
    Queen,
    King,
    Ace,
}

impl Rank {
    pub const ALL: [Self; 13] = [
        Self::Two,
        Self::Three,
        Self::Four,
        Self::Five,
        Self::Six,
        Self::Seven,
        Self::Eight,
        Self::Nine,
        Self::Ten,
        Self::Jack,
        Self::Queen,
        Self::King,
        Self::Ace,
    ];

    /// Single-character form used on the wire. Ten is written `T`.
    pub fn as_char(self) -> char {
        match self {
            Self::Two => '2',
            Self::Three => '3',
            Self::Four => '4',
            Self::Five => '5',
            Self::Six => '6',
            Self::Seven => '7',
            Self::Eight => '8',
            Self::Nine => '9',
            Self::Ten => 'T',
            Self::Jack => 'J',
            Self::Queen => 'Q',
            Self::King => 'K',
            Self::Ace => 'A',
        }
    }

    fn parse(s: &str) -> Option<Self> {
        if s == "10" {
            return Some(Self::Ten);
        }
        let mut chars = s.chars();
        let c = chars.next()?;
        if chars.next().is_some() {
            return None;
        }
        Self::ALL
            .into_iter()
            .find(|rank| rank.as_char() == c.to_ascii_uppercase())
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// A playing card. Ordered by rank first, then suit.
///
/// The external form is the suit symbol followed by the rank character,
/// e.g. `♦T` or `♠A`. That string is only produced at the serde boundary;
/// everything inside the crate works with the two enums.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Card {
    pub rank: Rank,
    pub suit: Suit,
}

impl Card {
    pub const fn new(rank: Rank, suit: Suit) -> Self {
        Self { rank, suit }
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}{}", self.suit, self.rank)
    }
}

/// Error returned when a card string can't be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid card {0:?}")]
pub struct ParseCardError(String);

impl FromStr for Card {
    type Err = ParseCardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        let suit = chars
            .next()
            .and_then(Suit::from_symbol)
            .ok_or_else(|| ParseCardError(s.to_string()))?;
        let rank = Rank::parse(chars.as_str()).ok_or_else(|| ParseCardError(s.to_string()))?;
        Ok(Self { rank, suit })
    }
}

impl Serialize for Card {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Card {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Remaining cards of one hand. Cards leave from the end only.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Deck {
    cards: Vec<Card>,
}

impl Deck {
    /// All 52 cards, ranks ascending and suits in [`Suit::ALL`] order within a rank.
    pub fn standard() -> Self {
        let cards = Rank::ALL
            .into_iter()
            .flat_map(|rank| Suit::ALL.into_iter().map(move |suit| Card::new(rank, suit)))
            .collect();
        Self { cards }
    }

    /// Shuffle in place with the thread-local CSPRNG.
    pub fn shuffle(&mut self) {
        self.shuffle_with(&mut rand::rng());
    }

    /// Fisher–Yates shuffle. The swap index for position `i` is drawn
    /// uniformly from `[0, i]`, walking `i` down from the last index to 1.
    pub fn shuffle_with<R: Rng + CryptoRng>(&mut self, rng: &mut R) {
        for i in (1..self.cards.len()).rev() {
            let j = rng.random_range(0..=i);
            self.cards.swap(i, j);
        }
    }

    pub fn draw(&mut self) -> HandResult<Card> {
        self.cards.pop().ok_or(HandError::DeckExhausted {
            needed: 1,
            remaining: 0,
        })
    }

    /// Draw `count` cards, or none at all if the deck can't supply them.
    pub fn draw_many(&mut self, count: usize) -> HandResult<Vec<Card>> {
        if self.cards.len() < count {
            return Err(HandError::DeckExhausted {
                needed: count,
                remaining: self.cards.len(),
            });
        }
        let mut drawn = Vec::with_capacity(count);
        for _ in 0..count {
            drawn.push(self.draw()?);
        }
        Ok(drawn)
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }
}

/// One of the two seats at a heads-up table.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Seat {
    Hero,
    Ai,
}

impl Seat {
    pub fn other(self) -> Self {
        match self {
            Self::Hero => Self::Ai,
            Self::Ai => Self::Hero,
        }
    }
}

impl fmt::Display for Seat {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let repr = match self {
            Self::Hero => "hero",
            Self::Ai => "ai",
        };
        write!(f, "{repr}")
    }
}

/// Hand progression. Ordered, so `a < b` means `a` comes earlier in a hand.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    #[default]
    Setup,
    Preflop,
    Postflop,
    Turn,
    River,
    Showdown,
}

impl Stage {
    /// Community card count implied by this stage.
    pub fn board_len(self) -> usize {
        match self {
            Self::Setup | Self::Preflop => 0,
            Self::Postflop => 3,
            Self::Turn => 4,
            Self::River | Self::Showdown => FULL_BOARD,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let repr = match self {
            Self::Setup => "setup",
            Self::Preflop => "preflop",
            Self::Postflop => "postflop",
            Self::Turn => "turn",
            Self::River => "river",
            Self::Showdown => "showdown",
        };
        write!(f, "{repr}")
    }
}

impl FromStr for Stage {
    type Err = HandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "setup" => Ok(Self::Setup),
            "preflop" => Ok(Self::Preflop),
            "postflop" | "flop" => Ok(Self::Postflop),
            "turn" => Ok(Self::Turn),
            "river" => Ok(Self::River),
            "showdown" => Ok(Self::Showdown),
            other => Err(HandError::InvalidInput(format!("unknown stage {other:?}"))),
        }
    }
}

/// A street that deals community cards.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Street {
    #[serde(alias = "flop")]
    Postflop,
    Turn,
    River,
}

impl Street {
    pub fn stage(self) -> Stage {
        match self {
            Self::Postflop => Stage::Postflop,
            Self::Turn => Stage::Turn,
            Self::River => Stage::River,
        }
    }

    /// Cards drawn when this street is dealt.
    pub fn cards_dealt(self) -> usize {
        match self {
            Self::Postflop => 3,
            Self::Turn | Self::River => 1,
        }
    }
}

impl fmt::Display for Street {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.stage().fmt(f)
    }
}

impl FromStr for Street {
    type Err = HandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.parse::<Stage>()? {
            Stage::Postflop => Ok(Self::Postflop),
            Stage::Turn => Ok(Self::Turn),
            Stage::River => Ok(Self::River),
            other => Err(HandError::InvalidInput(format!(
                "{other} is not a dealable street"
            ))),
        }
    }
}

/// Opaque game identifier.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct GameId(String);

impl GameId {
    /// Fresh random id (UUID v4).
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn parse(s: &str) -> HandResult<Self> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(HandError::InvalidInput("game_id must not be empty".into()));
        }
        if trimmed.len() > MAX_GAME_ID_LENGTH {
            return Err(HandError::InvalidInput(format!(
                "game_id longer than {MAX_GAME_ID_LENGTH} bytes"
            )));
        }
        if trimmed.chars().any(char::is_control) {
            return Err(HandError::InvalidInput(
                "game_id contains control characters".into(),
            ));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for GameId {
    type Error = HandError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<GameId> for String {
    fn from(value: GameId) -> Self {
        value.0
    }
}

impl fmt::Display for GameId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct PlayerState {
    /// Private cards; `None` until the hand is dealt.
    #[serde(default)]
    pub hole: Option<[Card; 2]>,
    #[serde(default)]
    pub folded: bool,
    /// Chip count. Signed so intermediate arithmetic can't wrap.
    #[serde(default)]
    pub stack: i64,
}

/// Everything persisted for one game id.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct GameState {
    pub id: GameId,
    /// Write counter; bumped on every persisted mutation.
    #[serde(default)]
    pub revision: i64,
    pub deck: Deck,
    pub board: Vec<Card>,
    pub hero: PlayerState,
    pub ai: PlayerState,
    pub pot: i64,
    pub sb: i64,
    pub bb: i64,
    /// Dealer for the current hand; chosen when the hand starts.
    pub button: Option<Seat>,
    pub stage: Stage,
    /// Whether the last showdown was reached through a fold.
    #[serde(default)]
    pub ended_by_fold: bool,
    pub updated_at: DateTime<Utc>,
}

impl GameState {
    /// Empty table: no deck, no cards, `stage = setup`.
    pub fn new(id: GameId) -> Self {
        Self {
            id,
            revision: 0,
            deck: Deck::default(),
            board: Vec::new(),
            hero: PlayerState::default(),
            ai: PlayerState::default(),
            pot: 0,
            sb: 0,
            bb: 0,
            button: None,
            stage: Stage::Setup,
            ended_by_fold: false,
            updated_at: Utc::now(),
        }
    }

    pub fn player(&self, seat: Seat) -> &PlayerState {
        match seat {
            Seat::Hero => &self.hero,
            Seat::Ai => &self.ai,
        }
    }

    /// Chips on the table: both stacks plus the pot.
    ///
    /// Widened so two `i64::MAX` stacks still add up.
    pub fn total_chips(&self) -> i128 {
        i128::from(self.hero.stack) + i128::from(self.ai.stack) + i128::from(self.pot)
    }

    /// Cards accounted for: deck, board and both hole pairs.
    pub fn cards_in_play(&self) -> usize {
        let holes = [&self.hero, &self.ai]
            .iter()
            .filter(|p| p.hole.is_some())
            .count()
            * 2;
        self.deck.len() + self.board.len() + holes
    }

    /// Board length agrees with the stage, and once a hand is dealt every
    /// card of the deck is accounted for exactly once.
    pub fn is_consistent(&self) -> bool {
        if self.board.len() != self.stage.board_len() {
            return false;
        }
        if self.stage == Stage::Setup {
            return true;
        }
        let mut seen: Vec<Card> = self.deck.cards().to_vec();
        seen.extend(&self.board);
        for player in [&self.hero, &self.ai] {
            if let Some(hole) = player.hole {
                seen.extend(hole);
            }
        }
        let total = seen.len();
        seen.sort();
        seen.dedup();
        total == DECK_SIZE && seen.len() == DECK_SIZE
    }
}

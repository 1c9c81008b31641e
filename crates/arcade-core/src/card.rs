//! Memory cards and their symbols.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identity of a card within a board.
///
/// Ids are assigned sequentially by the board generator in post-shuffle order,
/// so they double as the card's position on a freshly generated board.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Default,
    Serialize,
    Deserialize,
    derive_more::Display,
    derive_more::From,
)]
#[serde(transparent)]
pub struct CardId(u32);

impl CardId {
    /// Creates a card id from its raw value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Returns the raw id value.
    #[must_use]
    pub const fn value(self) -> u32 {
        self.0
    }
}

/// A symbol token printed on the face of a card.
///
/// Symbols are opaque strings (typically a single emoji) supplied by the category
/// catalog. Two cards match when their symbols compare equal.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Symbol(String);

impl Symbol {
    /// Creates a symbol from any string-like token.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Returns the token as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Symbol {
    fn from(token: &str) -> Self {
        Self::new(token)
    }
}

impl From<String> for Symbol {
    fn from(token: String) -> Self {
        Self(token)
    }
}

/// A single memory card.
///
/// A card is face down until flipped. Once matched it stays face up for the rest
/// of the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    id: CardId,
    value: Symbol,
    is_flipped: bool,
    is_matched: bool,
}

impl Card {
    /// Creates a face-down, unmatched card.
    #[must_use]
    pub fn new(id: CardId, value: Symbol) -> Self {
        Self {
            id,
            value,
            is_flipped: false,
            is_matched: false,
        }
    }

    /// Returns the card's identity.
    #[must_use]
    pub fn id(&self) -> CardId {
        self.id
    }

    /// Returns the symbol on the card's face.
    #[must_use]
    pub fn value(&self) -> &Symbol {
        &self.value
    }

    /// Returns `true` if the card is face up.
    #[must_use]
    pub fn is_flipped(&self) -> bool {
        self.is_flipped
    }

    /// Returns `true` if the card has been matched with its pair.
    #[must_use]
    pub fn is_matched(&self) -> bool {
        self.is_matched
    }

    /// Returns `true` if the card is face up but not yet matched.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.is_flipped && !self.is_matched
    }

    /// Returns `true` if the card can be flipped by the player.
    #[must_use]
    pub fn is_face_down(&self) -> bool {
        !self.is_flipped && !self.is_matched
    }

    /// Turns the card face up.
    pub fn flip_up(&mut self) {
        self.is_flipped = true;
    }

    /// Turns an unmatched card face down again.
    ///
    /// Matched cards stay face up; calling this on one has no effect.
    pub fn flip_down(&mut self) {
        if !self.is_matched {
            self.is_flipped = false;
        }
    }

    /// Marks the card as matched. Matched cards are always face up.
    pub fn mark_matched(&mut self) {
        self.is_flipped = true;
        self.is_matched = true;
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_flipped || self.is_matched {
            write!(f, "{}", self.value)
        } else {
            f.write_str("?")
        }
    }
}

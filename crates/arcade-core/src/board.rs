//! The memory-game board.

use std::{
    collections::{HashMap, HashSet},
    fmt,
};

use serde::Serialize;

use crate::{Card, CardId, Symbol};

/// Errors returned when a card sequence does not form a well-formed board.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum BoardError {
    /// The board holds an odd number of cards.
    #[display("board has an odd number of cards: {len}")]
    OddCardCount {
        /// Number of cards supplied.
        len: usize,
    },
    /// Two cards share the same id.
    #[display("duplicate card id: {id}")]
    DuplicateId {
        /// The repeated id.
        id: CardId,
    },
    /// A symbol is carried by a number of cards other than two.
    #[display("symbol {value} appears on {count} cards")]
    UnpairedValue {
        /// The offending symbol.
        value: Symbol,
        /// Number of cards carrying it.
        count: usize,
    },
    /// More than two cards are face up and unmatched.
    #[display("{count} cards are pending resolution")]
    TooManyPending {
        /// Number of pending cards.
        count: usize,
    },
}

/// An ordered collection of memory cards.
///
/// A board always satisfies two invariants:
///
/// - every symbol present is carried by exactly two cards, and
/// - at most two cards are face up without being matched.
///
/// Construction through [`Board::from_cards`] checks both. Mutation happens only
/// through [`Board::card_mut`], which the game engine uses to drive its state
/// machine; the engine re-establishes the pending invariant on every transition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Board {
    cards: Vec<Card>,
}

impl Board {
    /// Maximum number of cards that may be face up and unmatched at once.
    pub const MAX_PENDING: usize = 2;

    /// Creates an empty board.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a board from a card sequence, validating its invariants.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::OddCardCount`] if the number of cards is odd,
    /// [`BoardError::DuplicateId`] if two cards share an id,
    /// [`BoardError::UnpairedValue`] if a symbol does not appear exactly twice, and
    /// [`BoardError::TooManyPending`] if more than two cards are pending.
    pub fn from_cards(cards: Vec<Card>) -> Result<Self, BoardError> {
        if cards.len() % 2 != 0 {
            return Err(BoardError::OddCardCount { len: cards.len() });
        }

        let mut ids = HashSet::with_capacity(cards.len());
        let mut counts: HashMap<&Symbol, usize> = HashMap::new();
        for card in &cards {
            if !ids.insert(card.id()) {
                return Err(BoardError::DuplicateId { id: card.id() });
            }
            *counts.entry(card.value()).or_default() += 1;
        }
        // Report in board order so the error is stable across runs.
        for card in &cards {
            let count = counts[card.value()];
            if count != 2 {
                return Err(BoardError::UnpairedValue {
                    value: card.value().clone(),
                    count,
                });
            }
        }

        let pending = cards.iter().filter(|card| card.is_pending()).count();
        if pending > Self::MAX_PENDING {
            return Err(BoardError::TooManyPending { count: pending });
        }

        Ok(Self { cards })
    }

    /// Returns the number of cards on the board.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    /// Returns `true` if the board holds no cards.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Returns the number of symbol pairs on the board.
    #[must_use]
    pub fn pair_count(&self) -> usize {
        self.cards.len() / 2
    }

    /// Returns the cards in board order.
    #[must_use]
    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    /// Looks up a card by id.
    #[must_use]
    pub fn card(&self, id: CardId) -> Option<&Card> {
        self.cards.iter().find(|card| card.id() == id)
    }

    /// Looks up a card by id for mutation.
    pub fn card_mut(&mut self, id: CardId) -> Option<&mut Card> {
        self.cards.iter_mut().find(|card| card.id() == id)
    }

    /// Returns the ids of cards that are face up but not yet matched, in board order.
    pub fn pending_ids(&self) -> impl Iterator<Item = CardId> + '_ {
        self.cards
            .iter()
            .filter(|card| card.is_pending())
            .map(Card::id)
    }

    /// Returns the number of matched cards.
    #[must_use]
    pub fn matched_count(&self) -> usize {
        self.cards.iter().filter(|card| card.is_matched()).count()
    }

    /// Returns `true` if the board is non-empty and every card is matched.
    ///
    /// An empty board is never considered complete, so a session generated from an
    /// empty catalog cannot be won.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        !self.cards.is_empty() && self.cards.iter().all(Card::is_matched)
    }
}

impl fmt::Display for Board {
    /// Formats the board as rows of four cards, face-down cards shown as `?`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const ROW: usize = 4;
        for (i, row) in self.cards.chunks(ROW).enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            for (j, card) in row.iter().enumerate() {
                if j > 0 {
                    f.write_str(" ")?;
                }
                write!(f, "[{:>2}:{}]", card.id(), card)?;
            }
        }
        Ok(())
    }
}

//! Game engines for the arcade hub.
//!
//! [`MemoryMatchEngine`] runs the flip-and-match card game and
//! [`SlidingPuzzleEngine`] runs the sliding tile puzzle. Both are plain state
//! machines: player actions are synchronous calls that return an outcome, and the
//! delayed transitions (resolving a revealed pair, revealing a shuffle frame) sit
//! on a [`Schedule`] that the host drives with `advance`.
//!
//! Neither engine reads the wall clock or spawns work, so a host can drive them
//! from an event loop, a test, or a replay with identical results.
//!
//! # Examples
//!
//! ```
//! use std::time::Duration;
//!
//! use arcade_core::{Board, Card, CardId, Symbol};
//! use arcade_game::{FlipOutcome, MemoryEvent, MemoryMatchEngine, MemoryTimings, PairOutcome};
//!
//! let cat = Symbol::from("🐱");
//! let board = Board::from_cards(vec![
//!     Card::new(CardId::new(0), cat.clone()),
//!     Card::new(CardId::new(1), cat),
//! ])
//! .unwrap();
//!
//! let mut engine = MemoryMatchEngine::new(board, MemoryTimings::default());
//! engine.flip(CardId::new(0));
//! assert_eq!(
//!     engine.flip(CardId::new(1)),
//!     FlipOutcome::PairRevealed(PairOutcome::Matching)
//! );
//!
//! let events = engine.advance(Duration::from_millis(500));
//! assert!(matches!(events.last(), Some(MemoryEvent::Won { moves: 1 })));
//! ```

pub use self::{memory::*, puzzle::*, schedule::*};

mod memory;
mod puzzle;
mod schedule;

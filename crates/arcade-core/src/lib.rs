//! Core data structures for the arcade minigames.
//!
//! This crate provides the value types shared by the generators and the game
//! engines. Nothing here is random or time-dependent; the types only enforce the
//! structural invariants of a well-formed game state.
//!
//! # Overview
//!
//! - [`card`]: A single memory card ([`Card`]) with its identity ([`CardId`]) and
//!   symbol ([`Symbol`]).
//! - [`board`]: The memory-game [`Board`], an ordered collection of paired cards.
//! - [`grid`]: The sliding-puzzle [`Grid`], a square arrangement of [`Tile`]s with
//!   exactly one empty cell, and its [`GridPosition`] index type.
//!
//! # Examples
//!
//! ```
//! use arcade_core::{Grid, GridPosition};
//!
//! let mut grid = Grid::solved(3).unwrap();
//! assert!(grid.is_solved());
//!
//! // The empty cell starts in the bottom-right corner.
//! assert_eq!(grid.empty_position(), GridPosition::new(8));
//!
//! // Slide the tile to its left into the gap.
//! grid.slide(GridPosition::new(7)).unwrap();
//! assert!(!grid.is_solved());
//! ```

pub mod board;
pub mod card;
pub mod grid;

pub use self::{
    board::{Board, BoardError},
    card::{Card, CardId, Symbol},
    grid::{Grid, GridError, GridPosition, IllegalSlide, Neighbors, Tile},
};

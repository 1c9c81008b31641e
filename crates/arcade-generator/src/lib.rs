//! Randomized generation of memory boards and scrambled puzzle grids.
//!
//! Both generators are pure functions of their inputs and a random source. The
//! random source is either injected directly (`*_with_rng`) or derived from a
//! [`GameSeed`], which makes every generated game reproducible.
//!
//! # Examples
//!
//! ```
//! use arcade_core::Symbol;
//! use arcade_generator::{BoardGenerator, GameSeed, PuzzleShuffler};
//!
//! let symbols: Vec<Symbol> = ["🐶", "🐱", "🐭"].into_iter().map(Symbol::from).collect();
//! let generated = BoardGenerator::new(&symbols, 3).generate();
//! assert_eq!(generated.board.len(), 6);
//!
//! let shuffler = PuzzleShuffler::new(4, 100).unwrap();
//! let seed = GameSeed::from_phrase("example");
//! let first = shuffler.generate_with_seed(seed);
//! let second = shuffler.generate_with_seed(seed);
//! assert_eq!(first.grid, second.grid);
//! assert!(first.grid.is_solvable());
//! ```

pub use self::{board_generator::*, seed::*, shuffler::*};

mod board_generator;
mod seed;
mod shuffler;

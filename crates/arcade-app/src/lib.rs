//! Arcade hub host: category catalogs, session owners, score reporting, settings,
//! and the terminal front end that drives the game engines.
//!
//! The game rules live in `arcade-game`; this crate wires the engines to their
//! collaborators. [`memory_session::MemorySession`] deals boards from a
//! [`catalog::CategoryCatalog`], and [`puzzle_session::PuzzleSession`] reports
//! solved puzzles through a [`score::ScoreReporter`] when a
//! [`owner::SessionOwner`] is signed in.

pub mod catalog;
pub mod cli;
pub mod memory_session;
pub mod owner;
pub mod puzzle_session;
pub mod score;
pub mod settings;

//! Tunable parameters of the hub games.

use std::time::Duration;

use arcade_core::GridError;
use arcade_game::{MemoryTimings, ShufflePacing};
use arcade_generator::PuzzleShuffler;

/// Settings for every game in the hub.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArcadeSettings {
    /// Memory-match settings.
    pub memory: MemorySettings,
    /// Sliding-puzzle settings.
    pub puzzle: PuzzleSettings,
}

/// Memory-match settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemorySettings {
    /// Pairs per board, capped by the size of the selected category.
    pub pair_count: usize,
    /// Delay before a matching pair is marked as matched.
    pub match_delay: Duration,
    /// Delay before a mismatched pair is turned face down.
    pub mismatch_delay: Duration,
    /// Category selected at start when the catalog has it.
    pub default_category: String,
}

impl Default for MemorySettings {
    fn default() -> Self {
        let timings = MemoryTimings::default();
        Self {
            pair_count: 8,
            match_delay: timings.match_delay,
            mismatch_delay: timings.mismatch_delay,
            default_category: "animales".to_owned(),
        }
    }
}

impl MemorySettings {
    /// Returns the engine timings.
    #[must_use]
    pub fn timings(&self) -> MemoryTimings {
        MemoryTimings {
            match_delay: self.match_delay,
            mismatch_delay: self.mismatch_delay,
        }
    }
}

/// Sliding-puzzle settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PuzzleSettings {
    /// Tiles per row and column.
    pub dimension: usize,
    /// Random-walk steps per scramble.
    pub walk_length: usize,
    /// How a new scramble is revealed.
    pub pacing: ShufflePacing,
}

impl Default for PuzzleSettings {
    fn default() -> Self {
        Self {
            dimension: 4,
            walk_length: PuzzleShuffler::DEFAULT_WALK_LENGTH,
            pacing: ShufflePacing::default(),
        }
    }
}

impl PuzzleSettings {
    /// Builds the shuffler for these settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the dimension is too small or too large.
    pub fn shuffler(&self) -> Result<PuzzleShuffler, GridError> {
        PuzzleShuffler::new(self.dimension, self.walk_length)
    }
}

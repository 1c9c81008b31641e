use arcade_core::{Grid, GridError, GridPosition};
use rand::{Rng, seq::IndexedRandom as _};

use crate::GameSeed;

/// The random walk that scrambled a puzzle grid.
///
/// Each step records the position whose tile slid into the empty cell; after the
/// step that position is the new empty cell. Replaying the steps from the solved
/// grid reproduces the scramble, and replaying [`ShuffleWalk::undo_steps`] on the
/// scrambled grid solves it again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShuffleWalk {
    start: Grid,
    steps: Vec<GridPosition>,
}

impl ShuffleWalk {
    /// Returns the solved grid the walk starts from.
    #[must_use]
    pub fn start(&self) -> &Grid {
        &self.start
    }

    /// Returns the applied steps in order.
    #[must_use]
    pub fn steps(&self) -> &[GridPosition] {
        &self.steps
    }

    /// Returns the number of applied steps.
    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Returns `true` if the walk applied no steps.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Replays the first `count` steps from the start grid.
    ///
    /// `count` is clamped to the walk length.
    #[must_use]
    pub fn grid_after(&self, count: usize) -> Grid {
        let mut grid = self.start.clone();
        for &pos in &self.steps[..count.min(self.steps.len())] {
            grid.slide(pos)
                .expect("recorded steps are adjacent to the empty cell");
        }
        grid
    }

    /// Replays the whole walk, returning the scrambled grid.
    #[must_use]
    pub fn finish(&self) -> Grid {
        self.grid_after(self.steps.len())
    }

    /// Returns the slides that undo the walk, in the order they must be applied.
    ///
    /// Every step is its own inverse: sliding back the tile that now sits where the
    /// empty cell was before the step restores the previous grid.
    #[must_use]
    pub fn undo_steps(&self) -> Vec<GridPosition> {
        let mut previous_empty = Vec::with_capacity(self.steps.len());
        previous_empty.push(self.start.empty_position());
        previous_empty.extend_from_slice(&self.steps);
        previous_empty.pop();
        previous_empty.reverse();
        previous_empty
    }
}

/// A scrambled puzzle grid together with the walk and seed that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedGrid {
    /// The scrambled grid.
    pub grid: Grid,
    /// The random walk applied to the solved grid.
    pub walk: ShuffleWalk,
    /// Seed used for the walk.
    pub seed: GameSeed,
}

/// Scrambles a sliding puzzle by a random walk of legal slides.
///
/// Starting from the solved grid, each step picks uniformly among the empty cell's
/// orthogonal neighbors, excluding the cell the empty marker occupied before the
/// previous step, and slides that neighbor's tile into the gap. Because every
/// grid produced this way is reachable from the solved grid through legal moves,
/// it is always solvable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PuzzleShuffler {
    dimension: usize,
    walk_length: usize,
}

impl PuzzleShuffler {
    /// Walk length that gives a thorough scramble of a 4×4 grid.
    pub const DEFAULT_WALK_LENGTH: usize = 100;

    /// Creates a shuffler for grids of the given dimension.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::DimensionTooSmall`] or [`GridError::DimensionTooLarge`]
    /// if no grid of that dimension can be built.
    pub fn new(dimension: usize, walk_length: usize) -> Result<Self, GridError> {
        Grid::solved(dimension)?;
        Ok(Self {
            dimension,
            walk_length,
        })
    }

    /// Returns the grid dimension.
    #[must_use]
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Returns the number of walk steps attempted per shuffle.
    #[must_use]
    pub fn walk_length(&self) -> usize {
        self.walk_length
    }

    /// Generates a scrambled grid from a fresh random seed.
    #[must_use]
    pub fn generate(&self) -> GeneratedGrid {
        self.generate_with_seed(GameSeed::random())
    }

    /// Generates the scrambled grid determined by `seed`.
    #[must_use]
    pub fn generate_with_seed(&self, seed: GameSeed) -> GeneratedGrid {
        let walk = self.walk_with_rng(&mut seed.rng());
        GeneratedGrid {
            grid: walk.finish(),
            walk,
            seed,
        }
    }

    /// Scrambles a grid using the supplied random source.
    pub fn shuffle_with_rng<R>(&self, rng: &mut R) -> Grid
    where
        R: Rng + ?Sized,
    {
        self.walk_with_rng(rng).finish()
    }

    /// Performs the random walk using the supplied random source.
    pub fn walk_with_rng<R>(&self, rng: &mut R) -> ShuffleWalk
    where
        R: Rng + ?Sized,
    {
        let start = Grid::solved(self.dimension).expect("dimension is checked on construction");
        let mut grid = start.clone();
        let mut steps = Vec::with_capacity(self.walk_length);
        let mut previous = None;

        for _ in 0..self.walk_length {
            let empty = grid.empty_position();
            let eligible: Vec<GridPosition> = grid
                .neighbors(empty)
                .into_iter()
                .filter(|pos| Some(*pos) != previous)
                .collect();
            let Some(&next) = eligible.choose(rng) else {
                continue;
            };
            grid.slide(next)
                .expect("neighbors of the empty cell can always slide");
            previous = Some(empty);
            steps.push(next);
        }

        ShuffleWalk { start, steps }
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn test_new_rejects_small_dimension() {
        assert!(PuzzleShuffler::new(1, 10).is_err());
        assert!(PuzzleShuffler::new(2, 0).is_ok());
    }

    #[test]
    fn test_zero_walk_is_solved() {
        let shuffler = PuzzleShuffler::new(4, 0).unwrap();
        let generated = shuffler.generate();
        assert!(generated.walk.is_empty());
        assert!(generated.grid.is_solved());
    }

    #[test]
    fn test_walk_never_steps_straight_back() {
        let shuffler = PuzzleShuffler::new(4, PuzzleShuffler::DEFAULT_WALK_LENGTH).unwrap();
        let generated = shuffler.generate_with_seed(GameSeed::from_phrase("no-backtrack"));
        let walk = &generated.walk;
        assert_eq!(walk.len(), PuzzleShuffler::DEFAULT_WALK_LENGTH);

        let mut empties = vec![walk.start().empty_position()];
        empties.extend_from_slice(walk.steps());
        for window in empties.windows(3) {
            assert_ne!(window[0], window[2]);
        }
    }

    #[test]
    fn test_undo_steps_restore_solved_grid() {
        let shuffler = PuzzleShuffler::new(4, 100).unwrap();
        let generated = shuffler.generate_with_seed(GameSeed::from_phrase("undo"));
        let mut grid = generated.grid.clone();
        for pos in generated.walk.undo_steps() {
            grid.slide(pos).unwrap();
        }
        assert!(grid.is_solved());
    }

    #[test]
    fn test_grid_after_replays_prefix() {
        let shuffler = PuzzleShuffler::new(3, 20).unwrap();
        let walk = shuffler.walk_with_rng(&mut GameSeed::from_phrase("prefix").rng());
        assert_eq!(walk.grid_after(0), *walk.start());
        assert_eq!(walk.grid_after(usize::MAX), walk.finish());

        let mut grid = walk.grid_after(5);
        grid.slide(walk.steps()[5]).unwrap();
        assert_eq!(grid, walk.grid_after(6));
    }

    #[test]
    fn test_same_seed_same_grid() {
        let shuffler = PuzzleShuffler::new(4, 100).unwrap();
        let seed = GameSeed::from_phrase("repeat");
        assert_eq!(
            shuffler.generate_with_seed(seed),
            shuffler.generate_with_seed(seed)
        );
        assert_eq!(
            shuffler.shuffle_with_rng(&mut seed.rng()),
            shuffler.generate_with_seed(seed).grid
        );
    }

    proptest! {
        #[test]
        fn prop_shuffled_grid_is_solvable(
            dimension in 2usize..7,
            walk_length in 0usize..300,
            seed in any::<[u8; 32]>(),
        ) {
            let shuffler = PuzzleShuffler::new(dimension, walk_length).unwrap();
            let generated = shuffler.generate_with_seed(GameSeed::from_bytes(seed));
            prop_assert!(generated.grid.is_solvable());

            let rebuilt = Grid::from_cells(dimension, generated.grid.cells().to_vec());
            prop_assert_eq!(rebuilt, Ok(generated.grid.clone()));

            let mut grid = generated.grid;
            for pos in generated.walk.undo_steps() {
                prop_assert!(grid.slide(pos).is_ok());
            }
            prop_assert!(grid.is_solved());
        }
    }
}

use std::{fmt, num::NonZero, time::Duration};

use arcade_core::{Grid, GridPosition, IllegalSlide};
use arcade_generator::{GameSeed, PuzzleShuffler, ShuffleWalk};

use crate::Schedule;

/// How a new scramble is revealed while the engine is [`PuzzleState::Shuffling`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShufflePacing {
    /// The scrambled grid is installed synchronously and the game is immediately
    /// playable.
    Immediate,
    /// The solved grid is shown first, then the walk is replayed in visible frames.
    Paced {
        /// How long the solved grid stays visible before the walk starts.
        initial_delay: Duration,
        /// Delay between frames.
        frame_interval: Duration,
        /// Walk steps applied per frame.
        frame_stride: NonZero<usize>,
    },
}

impl Default for ShufflePacing {
    fn default() -> Self {
        Self::Paced {
            initial_delay: Duration::from_millis(1000),
            frame_interval: Duration::from_millis(10),
            frame_stride: NonZero::new(5).expect("stride is non-zero"),
        }
    }
}

/// State of a sliding-puzzle session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::IsVariant)]
pub enum PuzzleState {
    /// A scramble is being generated or revealed; moves are rejected.
    #[display("shuffling")]
    Shuffling,
    /// The player may slide tiles.
    #[display("playable")]
    Playable,
    /// The grid was solved. Terminal until the next game.
    #[display("solved")]
    Solved,
}

/// Why a move request was ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum MoveRejection {
    /// The engine is not accepting moves in this state.
    #[display("puzzle is {_0}")]
    NotPlayable(PuzzleState),
    /// The target tile cannot slide into the empty cell.
    #[display("{_0}")]
    Illegal(IllegalSlide),
}

/// Result of a move request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::IsVariant)]
pub enum MoveOutcome {
    /// The request was ignored; the session is unchanged.
    Rejected(MoveRejection),
    /// The tile slid into the empty cell.
    Moved,
    /// The tile slid into the empty cell and solved the puzzle. Produced exactly
    /// once per session.
    Solved {
        /// Final move count.
        moves: u32,
    },
}

/// Observable result of a delayed shuffle transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PuzzleEvent {
    /// More of the scramble walk became visible.
    ShuffleFrame {
        /// Walk steps revealed so far.
        revealed: usize,
        /// Total walk steps.
        total: usize,
    },
    /// The scramble is complete and the game is playable.
    ShuffleComplete,
}

/// A read-only view of a puzzle session for rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PuzzleSnapshot {
    /// The grid as currently displayed.
    pub grid: Grid,
    /// Current session state.
    pub state: PuzzleState,
    /// Number of tiles slid so far.
    pub move_count: u32,
}

impl PuzzleSnapshot {
    /// Returns `true` if the session is solved.
    #[must_use]
    pub fn is_solved(&self) -> bool {
        self.state.is_solved()
    }
}

impl fmt::Display for PuzzleSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.grid)?;
        write!(f, "moves: {}, state: {}", self.move_count, self.state)
    }
}

#[derive(Debug, Clone, Copy)]
struct RevealFrame;

/// The sliding-puzzle state machine.
///
/// A session starts in [`PuzzleState::Shuffling`] while a scramble is generated
/// (and, with [`ShufflePacing::Paced`], revealed frame by frame), becomes
/// [`PuzzleState::Playable`], and ends in [`PuzzleState::Solved`] when the tiles
/// are back in order.
///
/// Move requests for positions that are not orthogonal neighbors of the empty
/// cell, or made outside the playable state, are ignored and reported as
/// [`MoveOutcome::Rejected`]; they never change state.
///
/// # Example
///
/// ```
/// use arcade_core::GridPosition;
/// use arcade_game::{MoveOutcome, SlidingPuzzleEngine};
///
/// let mut engine = SlidingPuzzleEngine::from_grid("1 0 2 _".parse().unwrap());
///
/// // Position 0 is not next to the empty cell at position 3.
/// assert!(engine.request_move(GridPosition::new(0)).is_rejected());
///
/// assert_eq!(engine.request_move(GridPosition::new(2)), MoveOutcome::Moved);
/// assert_eq!(engine.grid().to_string(), "1 0\n_ 2");
/// assert_eq!(engine.move_count(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct SlidingPuzzleEngine {
    grid: Grid,
    state: PuzzleState,
    move_count: u32,
    shuffler: PuzzleShuffler,
    pacing: ShufflePacing,
    seed: Option<GameSeed>,
    walk: Option<ShuffleWalk>,
    revealed: usize,
    schedule: Schedule<RevealFrame>,
}

impl SlidingPuzzleEngine {
    /// Creates an engine and starts a game from a fresh random seed.
    #[must_use]
    pub fn new(shuffler: PuzzleShuffler, pacing: ShufflePacing) -> Self {
        Self::with_seed(shuffler, pacing, GameSeed::random())
    }

    /// Creates an engine and starts the game determined by `seed`.
    #[must_use]
    pub fn with_seed(shuffler: PuzzleShuffler, pacing: ShufflePacing, seed: GameSeed) -> Self {
        let mut engine = Self::idle(shuffler, pacing);
        engine.new_game_with_seed(seed);
        engine
    }

    /// Creates a playable engine on an existing grid.
    ///
    /// Later calls to [`Self::new_game`] scramble a grid of the same dimension with
    /// the default walk length and no pacing.
    #[must_use]
    pub fn from_grid(grid: Grid) -> Self {
        let shuffler = PuzzleShuffler::new(grid.dimension(), PuzzleShuffler::DEFAULT_WALK_LENGTH)
            .expect("an existing grid has a valid dimension");
        let mut engine = Self::idle(shuffler, ShufflePacing::Immediate);
        engine.grid = grid;
        engine.state = PuzzleState::Playable;
        engine
    }

    fn idle(shuffler: PuzzleShuffler, pacing: ShufflePacing) -> Self {
        Self {
            grid: Grid::solved(shuffler.dimension()).expect("shuffler dimension is valid"),
            state: PuzzleState::Shuffling,
            move_count: 0,
            shuffler,
            pacing,
            seed: None,
            walk: None,
            revealed: 0,
            schedule: Schedule::new(),
        }
    }

    /// Returns the grid as currently displayed.
    #[must_use]
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Returns the current state.
    #[must_use]
    pub fn state(&self) -> PuzzleState {
        self.state
    }

    /// Returns the number of tiles slid in this session.
    #[must_use]
    pub fn move_count(&self) -> u32 {
        self.move_count
    }

    /// Returns `true` once the grid is solved.
    #[must_use]
    pub fn is_solved(&self) -> bool {
        self.state.is_solved()
    }

    /// Returns the seed of the current scramble, if it was generated by this engine.
    #[must_use]
    pub fn seed(&self) -> Option<GameSeed> {
        self.seed
    }

    /// Returns the configured shuffler.
    #[must_use]
    pub fn shuffler(&self) -> PuzzleShuffler {
        self.shuffler
    }

    /// Returns a read-only copy of the session for rendering.
    #[must_use]
    pub fn snapshot(&self) -> PuzzleSnapshot {
        PuzzleSnapshot {
            grid: self.grid.clone(),
            state: self.state,
            move_count: self.move_count,
        }
    }

    /// Returns the time until the next shuffle frame, if one is pending.
    #[must_use]
    pub fn time_until_next_transition(&self) -> Option<Duration> {
        self.schedule.time_until_next()
    }

    /// Discards the current session and starts a new scramble from a fresh seed.
    pub fn new_game(&mut self) {
        self.new_game_with_seed(GameSeed::random());
    }

    /// Discards the current session and starts the scramble determined by `seed`.
    ///
    /// Pending shuffle frames of the previous session are cancelled first. With
    /// [`ShufflePacing::Immediate`] the engine is playable when this returns;
    /// otherwise it stays in [`PuzzleState::Shuffling`] until the reveal finishes.
    pub fn new_game_with_seed(&mut self, seed: GameSeed) {
        let cancelled = self.schedule.cancel_all();
        if cancelled > 0 {
            log::debug!("new puzzle game cancelled {cancelled} pending shuffle frame(s)");
        }

        self.state = PuzzleState::Shuffling;
        self.move_count = 0;
        self.seed = Some(seed);

        let generated = self.shuffler.generate_with_seed(seed);
        log::debug!(
            "puzzle scrambled: {0}x{0} grid, {1} steps, seed {seed}",
            self.shuffler.dimension(),
            generated.walk.len()
        );

        match self.pacing {
            ShufflePacing::Immediate => {
                self.grid = generated.grid;
                self.walk = None;
                self.revealed = 0;
                self.state = PuzzleState::Playable;
            }
            ShufflePacing::Paced { initial_delay, .. } => {
                self.grid = generated.walk.start().clone();
                self.walk = Some(generated.walk);
                self.revealed = 0;
                self.schedule.schedule(initial_delay, RevealFrame);
            }
        }
    }

    /// Slides the tile at `target` into the empty cell.
    ///
    /// Only tiles orthogonally adjacent to the empty cell may move, and only while
    /// the engine is playable. A move that restores the solved arrangement ends the
    /// session and returns [`MoveOutcome::Solved`].
    pub fn request_move(&mut self, target: GridPosition) -> MoveOutcome {
        if !self.state.is_playable() {
            log::trace!("move to {target} ignored: puzzle is {}", self.state);
            return MoveOutcome::Rejected(MoveRejection::NotPlayable(self.state));
        }
        if let Err(illegal) = self.grid.slide(target) {
            log::trace!("move to {target} ignored: {illegal}");
            return MoveOutcome::Rejected(MoveRejection::Illegal(illegal));
        }

        self.move_count += 1;
        if self.grid.is_solved() {
            self.state = PuzzleState::Solved;
            log::info!("puzzle solved in {} moves", self.move_count);
            return MoveOutcome::Solved {
                moves: self.move_count,
            };
        }
        MoveOutcome::Moved
    }

    /// Advances the engine clock by `elapsed`, revealing any shuffle frames that
    /// became due.
    pub fn advance(&mut self, elapsed: Duration) -> Vec<PuzzleEvent> {
        let deadline = self.schedule.now() + elapsed;
        let mut events = Vec::new();
        while let Some(RevealFrame) = self.schedule.pop_due(deadline) {
            self.reveal_frame(&mut events);
        }
        self.schedule.advance_to(deadline);
        events
    }

    /// Reveals the rest of a paced scramble immediately.
    pub fn flush(&mut self) -> Vec<PuzzleEvent> {
        let mut events = Vec::new();
        while let Some(RevealFrame) = self.schedule.pop_next() {
            self.reveal_frame(&mut events);
        }
        events
    }

    fn reveal_frame(&mut self, events: &mut Vec<PuzzleEvent>) {
        let ShufflePacing::Paced {
            frame_interval,
            frame_stride,
            ..
        } = self.pacing
        else {
            return;
        };
        let Some(walk) = &self.walk else {
            return;
        };

        let total = walk.len();
        let end = (self.revealed + frame_stride.get()).min(total);
        for &pos in &walk.steps()[self.revealed..end] {
            self.grid
                .slide(pos)
                .expect("recorded steps are adjacent to the empty cell");
        }
        if end > self.revealed {
            events.push(PuzzleEvent::ShuffleFrame {
                revealed: end,
                total,
            });
        }
        self.revealed = end;

        if end < total {
            self.schedule.schedule(frame_interval, RevealFrame);
        } else {
            self.walk = None;
            self.state = PuzzleState::Playable;
            log::debug!("puzzle shuffle revealed, game is playable");
            events.push(PuzzleEvent::ShuffleComplete);
        }
    }
}

use std::{fmt, time::Duration};

use arcade_core::{Board, CardId};
use tinyvec::ArrayVec;

use crate::Schedule;

/// Delays before a revealed pair is resolved.
///
/// Matches resolve faster than mismatches so the player gets a longer look at two
/// cards that do not belong together.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryTimings {
    /// Delay before a matching pair is marked as matched.
    pub match_delay: Duration,
    /// Delay before a mismatched pair is turned face down again.
    pub mismatch_delay: Duration,
}

impl Default for MemoryTimings {
    fn default() -> Self {
        Self {
            match_delay: Duration::from_millis(500),
            mismatch_delay: Duration::from_millis(1000),
        }
    }
}

impl MemoryTimings {
    /// Uses the same delay for matches and mismatches.
    #[must_use]
    pub const fn uniform(delay: Duration) -> Self {
        Self {
            match_delay: delay,
            mismatch_delay: delay,
        }
    }
}

/// Outcome of comparing the two revealed cards of a move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::IsVariant)]
pub enum PairOutcome {
    /// Both cards carry the same symbol.
    #[display("matching")]
    Matching,
    /// The cards carry different symbols.
    #[display("mismatching")]
    Mismatching,
}

/// State of a memory-match session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::IsVariant)]
pub enum MemoryState {
    /// No card is face up pending resolution.
    #[display("idle")]
    Idle,
    /// One card is face up, waiting for its partner.
    #[display("one pending")]
    OnePending,
    /// Two cards are face up and the pair is resolving; flips are rejected until
    /// the delayed resolution fires.
    #[display("locked ({_0})")]
    Locked(PairOutcome),
    /// Every card is matched. Terminal until the session is replaced.
    #[display("won")]
    Won,
}

/// Why a flip request was ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum FlipRejection {
    /// A revealed pair is still resolving.
    #[display("board is locked")]
    Locked,
    /// The session is already won.
    #[display("game is already won")]
    Won,
    /// No card has the requested id.
    #[display("no such card")]
    UnknownCard,
    /// The card is already face up.
    #[display("card is already flipped")]
    AlreadyFlipped,
    /// The card is already matched.
    #[display("card is already matched")]
    AlreadyMatched,
}

/// Result of a flip request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::IsVariant)]
pub enum FlipOutcome {
    /// The request was ignored; the session is unchanged.
    Rejected(FlipRejection),
    /// The card is now the single pending card.
    Revealed,
    /// The card completed a pair; the move is counted and resolution is scheduled.
    PairRevealed(PairOutcome),
}

/// Observable result of a delayed transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoryEvent {
    /// A revealed pair was resolved.
    PairResolved {
        /// First card of the pair, in flip order.
        first: CardId,
        /// Second card of the pair, in flip order.
        second: CardId,
        /// Whether the cards matched.
        outcome: PairOutcome,
    },
    /// The last pair was matched. Emitted exactly once per session.
    Won {
        /// Final move count.
        moves: u32,
    },
}

/// A read-only view of a memory session for rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemorySnapshot {
    /// The board, including face-up and matched flags.
    pub board: Board,
    /// Current session state.
    pub state: MemoryState,
    /// Number of pairs revealed so far.
    pub move_count: u32,
}

impl MemorySnapshot {
    /// Returns `true` if the session is won.
    #[must_use]
    pub fn is_won(&self) -> bool {
        self.state.is_won()
    }
}

impl fmt::Display for MemorySnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.board)?;
        write!(f, "moves: {}, state: {}", self.move_count, self.state)
    }
}

#[derive(Debug, Clone, Copy)]
struct PairResolution {
    first: CardId,
    second: CardId,
    outcome: PairOutcome,
}

/// The memory-match state machine.
///
/// The engine owns one session at a time: a [`Board`], its move counter, and the
/// delayed resolution of the currently revealed pair. Flipping a second card
/// counts the move immediately and locks the board; the pair is resolved when the
/// engine's clock is advanced past the configured delay (see [`Self::advance`]).
///
/// Invalid flips (stale ids, cards already face up, flips while locked) are
/// ignored and reported as [`FlipOutcome::Rejected`]; they never change state.
///
/// # Example
///
/// ```
/// use arcade_core::{Board, Card, CardId, Symbol};
/// use arcade_game::{MemoryEvent, MemoryMatchEngine, MemoryState, MemoryTimings};
///
/// let board = Board::from_cards(vec![
///     Card::new(CardId::new(0), Symbol::from("x")),
///     Card::new(CardId::new(1), Symbol::from("x")),
/// ])
/// .unwrap();
/// let mut engine = MemoryMatchEngine::new(board, MemoryTimings::default());
///
/// engine.flip(CardId::new(0));
/// engine.flip(CardId::new(1));
/// assert_eq!(engine.move_count(), 1);
///
/// let events = engine.flush();
/// assert!(events.contains(&MemoryEvent::Won { moves: 1 }));
/// assert_eq!(engine.state(), MemoryState::Won);
/// ```
#[derive(Debug, Clone)]
pub struct MemoryMatchEngine {
    board: Board,
    state: MemoryState,
    pending: ArrayVec<[CardId; 2]>,
    move_count: u32,
    timings: MemoryTimings,
    schedule: Schedule<PairResolution>,
}

impl MemoryMatchEngine {
    /// Starts a session on `board`.
    ///
    /// # Panics
    ///
    /// Panics if `board` already has cards pending resolution; a new session must
    /// start with every unmatched card face down.
    #[must_use]
    pub fn new(board: Board, timings: MemoryTimings) -> Self {
        let mut engine = Self {
            board: Board::new(),
            state: MemoryState::Idle,
            pending: ArrayVec::new(),
            move_count: 0,
            timings,
            schedule: Schedule::new(),
        };
        engine.reset(board);
        engine
    }

    /// Replaces the current session with a new one on `board`.
    ///
    /// Any pending resolution is cancelled before the new board is installed, so a
    /// stale transition can never touch the new session.
    ///
    /// # Panics
    ///
    /// Panics if `board` already has cards pending resolution.
    pub fn reset(&mut self, board: Board) {
        assert_eq!(
            board.pending_ids().count(),
            0,
            "a new memory session must start with no pending cards"
        );
        let cancelled = self.schedule.cancel_all();
        if cancelled > 0 {
            log::debug!("memory session reset cancelled {cancelled} pending resolution(s)");
        }
        self.pending.clear();
        self.move_count = 0;
        self.state = if board.is_complete() {
            MemoryState::Won
        } else {
            MemoryState::Idle
        };
        self.board = board;
        log::debug!(
            "memory session started: {} pairs",
            self.board.pair_count()
        );
    }

    /// Returns the board.
    #[must_use]
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Returns the current state.
    #[must_use]
    pub fn state(&self) -> MemoryState {
        self.state
    }

    /// Returns the number of pairs revealed in this session.
    #[must_use]
    pub fn move_count(&self) -> u32 {
        self.move_count
    }

    /// Returns `true` once every card is matched.
    #[must_use]
    pub fn is_won(&self) -> bool {
        self.state.is_won()
    }

    /// Returns the configured resolution delays.
    #[must_use]
    pub fn timings(&self) -> MemoryTimings {
        self.timings
    }

    /// Returns the face-up, unmatched cards in flip order.
    #[must_use]
    pub fn pending(&self) -> &[CardId] {
        &self.pending
    }

    /// Returns a read-only copy of the session for rendering.
    #[must_use]
    pub fn snapshot(&self) -> MemorySnapshot {
        MemorySnapshot {
            board: self.board.clone(),
            state: self.state,
            move_count: self.move_count,
        }
    }

    /// Returns the time until the pending resolution fires, if any.
    #[must_use]
    pub fn time_until_next_transition(&self) -> Option<Duration> {
        self.schedule.time_until_next()
    }

    /// Turns a card face up.
    ///
    /// Flipping the second card of a pair counts one move, locks the board, and
    /// schedules the pair's resolution.
    pub fn flip(&mut self, id: CardId) -> FlipOutcome {
        match self.try_flip(id) {
            Ok(outcome) => outcome,
            Err(reason) => {
                log::trace!("flip of card {id} ignored: {reason}");
                FlipOutcome::Rejected(reason)
            }
        }
    }

    fn try_flip(&mut self, id: CardId) -> Result<FlipOutcome, FlipRejection> {
        match self.state {
            MemoryState::Locked(_) => return Err(FlipRejection::Locked),
            MemoryState::Won => return Err(FlipRejection::Won),
            MemoryState::Idle | MemoryState::OnePending => {}
        }
        if self.pending.len() >= Board::MAX_PENDING {
            return Err(FlipRejection::Locked);
        }

        let card = self.board.card_mut(id).ok_or(FlipRejection::UnknownCard)?;
        if card.is_matched() {
            return Err(FlipRejection::AlreadyMatched);
        }
        if card.is_flipped() {
            return Err(FlipRejection::AlreadyFlipped);
        }
        card.flip_up();
        self.pending.push(id);

        let &[first, second] = self.pending.as_slice() else {
            self.state = MemoryState::OnePending;
            return Ok(FlipOutcome::Revealed);
        };
        Ok(FlipOutcome::PairRevealed(self.begin_resolution(first, second)))
    }

    fn begin_resolution(&mut self, first: CardId, second: CardId) -> PairOutcome {
        let same = self.board.card(first).map(|card| card.value())
            == self.board.card(second).map(|card| card.value());
        let (outcome, delay) = if same {
            (PairOutcome::Matching, self.timings.match_delay)
        } else {
            (PairOutcome::Mismatching, self.timings.mismatch_delay)
        };

        self.move_count += 1;
        self.state = MemoryState::Locked(outcome);
        self.schedule.schedule(
            delay,
            PairResolution {
                first,
                second,
                outcome,
            },
        );
        log::debug!(
            "move {}: cards {first} and {second} are {outcome}, resolving in {delay:?}",
            self.move_count
        );
        outcome
    }

    /// Advances the engine clock by `elapsed`, firing any resolution that became due.
    pub fn advance(&mut self, elapsed: Duration) -> Vec<MemoryEvent> {
        let deadline = self.schedule.now() + elapsed;
        let mut events = Vec::new();
        while let Some(resolution) = self.schedule.pop_due(deadline) {
            self.resolve(resolution, &mut events);
        }
        self.schedule.advance_to(deadline);
        events
    }

    /// Fires every pending resolution immediately, as if its delay had elapsed.
    pub fn flush(&mut self) -> Vec<MemoryEvent> {
        let mut events = Vec::new();
        while let Some(resolution) = self.schedule.pop_next() {
            self.resolve(resolution, &mut events);
        }
        events
    }

    fn resolve(&mut self, resolution: PairResolution, events: &mut Vec<MemoryEvent>) {
        let PairResolution {
            first,
            second,
            outcome,
        } = resolution;
        self.pending.clear();

        for id in [first, second] {
            if let Some(card) = self.board.card_mut(id) {
                match outcome {
                    PairOutcome::Matching => card.mark_matched(),
                    PairOutcome::Mismatching => card.flip_down(),
                }
            }
        }
        events.push(MemoryEvent::PairResolved {
            first,
            second,
            outcome,
        });

        if outcome.is_matching() && self.board.is_complete() {
            self.state = MemoryState::Won;
            log::info!("memory game won in {} moves", self.move_count);
            events.push(MemoryEvent::Won {
                moves: self.move_count,
            });
        } else {
            self.state = MemoryState::Idle;
        }
    }
}

#[cfg(test)]
mod tests {
    use arcade_core::{Card, Symbol};
    use arcade_generator::{BoardGenerator, GameSeed};
    use proptest::prelude::*;

    use super::*;

    const MS: Duration = Duration::from_millis(1);

    fn board(values: &[&str]) -> Board {
        let cards = (0u32..)
            .zip(values)
            .map(|(id, value)| Card::new(CardId::new(id), Symbol::from(*value)))
            .collect();
        Board::from_cards(cards).unwrap()
    }

    fn id(value: u32) -> CardId {
        CardId::new(value)
    }

    fn engine(values: &[&str]) -> MemoryMatchEngine {
        MemoryMatchEngine::new(board(values), MemoryTimings::default())
    }

    #[test]
    fn test_single_pair_is_won_after_resolution() {
        let mut engine = engine(&["x", "x"]);

        assert_eq!(engine.flip(id(0)), FlipOutcome::Revealed);
        assert_eq!(engine.state(), MemoryState::OnePending);
        assert_eq!(
            engine.flip(id(1)),
            FlipOutcome::PairRevealed(PairOutcome::Matching)
        );
        assert_eq!(engine.move_count(), 1);
        assert_eq!(engine.state(), MemoryState::Locked(PairOutcome::Matching));
        assert!(!engine.is_won());

        let events = engine.advance(500 * MS);
        assert_eq!(
            events,
            [
                MemoryEvent::PairResolved {
                    first: id(0),
                    second: id(1),
                    outcome: PairOutcome::Matching
                },
                MemoryEvent::Won { moves: 1 }
            ]
        );
        assert_eq!(engine.state(), MemoryState::Won);
        assert_eq!(engine.move_count(), 1);
        for card in engine.board().cards() {
            assert!(card.is_matched());
            assert!(card.is_flipped());
        }
    }

    #[test]
    fn test_mismatch_turns_cards_back_after_longer_delay() {
        let mut engine = engine(&["a", "b", "a", "b"]);
        engine.flip(id(0));
        assert_eq!(
            engine.flip(id(1)),
            FlipOutcome::PairRevealed(PairOutcome::Mismatching)
        );
        assert_eq!(engine.time_until_next_transition(), Some(1000 * MS));

        assert!(engine.advance(999 * MS).is_empty());
        assert!(engine.board().card(id(0)).unwrap().is_flipped());

        let events = engine.advance(MS);
        assert_eq!(events.len(), 1);
        assert_eq!(engine.state(), MemoryState::Idle);
        assert_eq!(engine.move_count(), 1);
        assert!(engine.board().card(id(0)).unwrap().is_face_down());
        assert!(engine.board().card(id(1)).unwrap().is_face_down());
    }

    #[test]
    fn test_flips_are_rejected_while_locked() {
        let mut engine = engine(&["a", "b", "a", "b"]);
        engine.flip(id(0));
        engine.flip(id(1));

        let before = engine.snapshot();
        assert_eq!(
            engine.flip(id(2)),
            FlipOutcome::Rejected(FlipRejection::Locked)
        );
        assert_eq!(engine.snapshot(), before);
        assert_eq!(engine.board().pending_ids().count(), 2);
    }

    #[test]
    fn test_invalid_flips_are_ignored() {
        let mut engine = engine(&["a", "b", "a", "b"]);
        assert_eq!(
            engine.flip(id(9)),
            FlipOutcome::Rejected(FlipRejection::UnknownCard)
        );
        engine.flip(id(0));
        assert_eq!(
            engine.flip(id(0)),
            FlipOutcome::Rejected(FlipRejection::AlreadyFlipped)
        );
        assert_eq!(engine.state(), MemoryState::OnePending);
        assert_eq!(engine.move_count(), 0);

        engine.flip(id(2));
        engine.flush();
        assert_eq!(
            engine.flip(id(2)),
            FlipOutcome::Rejected(FlipRejection::AlreadyMatched)
        );
        assert_eq!(engine.move_count(), 1);
    }

    #[test]
    fn test_move_count_counts_pairs_not_flips() {
        let mut engine = engine(&["a", "b", "c", "a", "b", "c"]);
        engine.flip(id(0));
        assert_eq!(engine.move_count(), 0);
        engine.flip(id(1));
        assert_eq!(engine.move_count(), 1);
        engine.flush();

        engine.flip(id(0));
        engine.flip(id(3));
        engine.flush();
        assert_eq!(engine.move_count(), 2);
        assert_eq!(engine.board().matched_count(), 2);
    }

    #[test]
    fn test_full_game_wins_exactly_once() {
        let mut engine = engine(&["a", "b", "a", "b"]);
        let mut wins = 0;
        for (first, second) in [(0, 1), (0, 2), (1, 3)] {
            engine.flip(id(first));
            engine.flip(id(second));
            for event in engine.flush() {
                if matches!(event, MemoryEvent::Won { .. }) {
                    wins += 1;
                }
            }
        }
        assert_eq!(wins, 1);
        assert_eq!(engine.move_count(), 3);
        assert!(engine.is_won());
        assert_eq!(
            engine.flip(id(0)),
            FlipOutcome::Rejected(FlipRejection::Won)
        );
        assert!(engine.flush().is_empty());
    }

    #[test]
    fn test_mismatch_resolution_never_wins() {
        let mut engine = engine(&["a", "b", "a", "b"]);
        engine.flip(id(0));
        engine.flip(id(2));
        engine.flush();

        engine.flip(id(1));
        assert_eq!(
            engine.flip(id(0)),
            FlipOutcome::Rejected(FlipRejection::AlreadyMatched)
        );
        assert_eq!(engine.state(), MemoryState::OnePending);

        let mut engine = self::engine(&["a", "b", "a", "b"]);
        engine.flip(id(0));
        engine.flip(id(1));
        assert_eq!(engine.state(), MemoryState::Locked(PairOutcome::Mismatching));
        let events = engine.flush();
        assert!(!events.iter().any(|event| matches!(event, MemoryEvent::Won { .. })));
        assert_eq!(engine.state(), MemoryState::Idle);
        assert!(!engine.is_won());
    }

    #[test]
    fn test_reset_cancels_pending_resolution() {
        let mut engine = engine(&["a", "a"]);
        engine.flip(id(0));
        engine.flip(id(1));

        engine.reset(board(&["a", "b", "a", "b"]));
        assert_eq!(engine.state(), MemoryState::Idle);
        assert_eq!(engine.move_count(), 0);
        assert_eq!(engine.time_until_next_transition(), None);

        assert!(engine.advance(10_000 * MS).is_empty());
        assert_eq!(engine.board().matched_count(), 0);
        assert!(engine.board().cards().iter().all(|card| card.is_face_down()));
    }

    #[test]
    fn test_reset_while_locked_accepts_new_flips() {
        let mut engine = engine(&["a", "b", "a", "b"]);
        engine.flip(id(0));
        engine.flip(id(1));
        assert_eq!(
            engine.flip(id(2)),
            FlipOutcome::Rejected(FlipRejection::Locked)
        );

        engine.reset(board(&["a", "b", "a", "b"]));
        assert_eq!(engine.flip(id(0)), FlipOutcome::Revealed);
        assert_eq!(engine.state(), MemoryState::OnePending);
    }

    #[test]
    fn test_uniform_timings() {
        let mut engine =
            MemoryMatchEngine::new(board(&["a", "b", "a", "b"]), MemoryTimings::uniform(MS));
        engine.flip(id(0));
        engine.flip(id(1));
        assert_eq!(engine.advance(MS).len(), 1);
        assert_eq!(engine.state(), MemoryState::Idle);
    }

    #[test]
    fn test_empty_board_is_never_won() {
        let mut engine = MemoryMatchEngine::new(Board::new(), MemoryTimings::default());
        assert_eq!(engine.state(), MemoryState::Idle);
        assert_eq!(
            engine.flip(id(0)),
            FlipOutcome::Rejected(FlipRejection::UnknownCard)
        );
        assert!(!engine.is_won());
    }

    #[test]
    #[should_panic(expected = "no pending cards")]
    fn test_reset_rejects_board_with_pending_cards() {
        let mut cards = vec![
            Card::new(id(0), Symbol::from("a")),
            Card::new(id(1), Symbol::from("a")),
        ];
        cards[0].flip_up();
        let board = Board::from_cards(cards).unwrap();
        let _ = MemoryMatchEngine::new(board, MemoryTimings::default());
    }

    proptest! {
        #[test]
        fn prop_random_play_keeps_pair_invariants(
            pair_count in 1usize..6,
            seed in any::<[u8; 32]>(),
            actions in prop::collection::vec(prop::option::of(0u32..12), 0..80),
        ) {
            let symbols: Vec<Symbol> = (0..pair_count)
                .map(|i| Symbol::new(format!("s{i}")))
                .collect();
            let board = BoardGenerator::new(&symbols, pair_count)
                .generate_with_seed(GameSeed::from_bytes(seed))
                .board;
            let mut engine = MemoryMatchEngine::new(board, MemoryTimings::default());

            // `Some(id)` flips a card, `None` lets every pending resolution fire.
            for action in actions {
                let moves_before = engine.move_count();
                let matched_before = engine.board().matched_count();
                match action {
                    Some(card) => {
                        let outcome = engine.flip(id(card));
                        let counted = u32::from(matches!(outcome, FlipOutcome::PairRevealed(_)));
                        prop_assert_eq!(engine.move_count(), moves_before + counted);
                    }
                    None => {
                        for event in engine.flush() {
                            if let MemoryEvent::PairResolved { first, second, outcome } = event {
                                let first = engine.board().card(first).unwrap();
                                let second = engine.board().card(second).unwrap();
                                prop_assert_eq!(outcome.is_matching(), first.value() == second.value());
                                if outcome.is_matching() {
                                    prop_assert!(first.is_matched() && second.is_matched());
                                } else {
                                    prop_assert!(first.is_face_down() && second.is_face_down());
                                }
                            }
                        }
                        prop_assert_eq!(engine.move_count(), moves_before);
                    }
                }

                let pending = engine.board().cards().iter().filter(|card| card.is_pending()).count();
                prop_assert!(pending <= 2);
                prop_assert_eq!(pending, engine.pending().len());
                prop_assert!(engine.board().matched_count() >= matched_before);
                prop_assert_eq!(engine.is_won(), engine.board().is_complete());
            }
        }
    }
}

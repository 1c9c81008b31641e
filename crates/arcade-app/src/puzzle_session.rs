//! Sliding-puzzle host session with score reporting.

use std::time::Duration;

use arcade_core::{GridError, GridPosition};
use arcade_game::{MoveOutcome, PuzzleEvent, PuzzleSnapshot, SlidingPuzzleEngine};
use arcade_generator::GameSeed;

use crate::{
    owner::SessionOwner,
    score::{GameKind, ScoreReport, ScoreReporter, submit_score},
    settings::PuzzleSettings,
};

/// Hosts a sliding-puzzle game and reports solved games for the session owner.
pub struct PuzzleSession {
    engine: SlidingPuzzleEngine,
    owner: Option<SessionOwner>,
    reporter: Box<dyn ScoreReporter>,
    last_report: Option<ScoreReport>,
}

impl PuzzleSession {
    /// Starts a session with a fresh random scramble.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured dimension is too small.
    pub fn new(
        settings: &PuzzleSettings,
        owner: Option<SessionOwner>,
        reporter: Box<dyn ScoreReporter>,
    ) -> Result<Self, GridError> {
        Self::with_seed(settings, owner, reporter, GameSeed::random())
    }

    /// Starts a session with the scramble determined by `seed`.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured dimension is too small.
    pub fn with_seed(
        settings: &PuzzleSettings,
        owner: Option<SessionOwner>,
        reporter: Box<dyn ScoreReporter>,
        seed: GameSeed,
    ) -> Result<Self, GridError> {
        let engine = SlidingPuzzleEngine::with_seed(settings.shuffler()?, settings.pacing, seed);
        Ok(Self::from_engine(engine, owner, reporter))
    }

    /// Hosts an existing engine.
    #[must_use]
    pub fn from_engine(
        engine: SlidingPuzzleEngine,
        owner: Option<SessionOwner>,
        reporter: Box<dyn ScoreReporter>,
    ) -> Self {
        Self {
            engine,
            owner,
            reporter,
            last_report: None,
        }
    }

    /// Returns the engine.
    #[must_use]
    pub fn engine(&self) -> &SlidingPuzzleEngine {
        &self.engine
    }

    /// Returns the session owner, if one is signed in.
    #[must_use]
    pub fn owner(&self) -> Option<&SessionOwner> {
        self.owner.as_ref()
    }

    /// Returns the report submitted for the most recent solved game.
    #[must_use]
    pub fn last_report(&self) -> Option<&ScoreReport> {
        self.last_report.as_ref()
    }

    /// Returns a snapshot of the current game.
    #[must_use]
    pub fn snapshot(&self) -> PuzzleSnapshot {
        self.engine.snapshot()
    }

    /// Requests a tile move, reporting the score if it solves the puzzle.
    pub fn request_move(&mut self, target: GridPosition) -> MoveOutcome {
        let outcome = self.engine.request_move(target);
        if let MoveOutcome::Solved { moves } = outcome {
            self.last_report = submit_score(
                &mut *self.reporter,
                self.owner.as_ref(),
                GameKind::Puzzle,
                moves,
            );
        }
        outcome
    }

    /// Starts a new scramble from a fresh seed.
    pub fn new_game(&mut self) {
        self.engine.new_game();
    }

    /// Starts the scramble determined by `seed`.
    pub fn new_game_with_seed(&mut self, seed: GameSeed) {
        self.engine.new_game_with_seed(seed);
    }

    /// Advances the engine clock.
    pub fn advance(&mut self, elapsed: Duration) -> Vec<PuzzleEvent> {
        self.engine.advance(elapsed)
    }

    /// Reveals the rest of a paced scramble immediately.
    pub fn flush(&mut self) -> Vec<PuzzleEvent> {
        self.engine.flush()
    }

    /// Returns the time until the next pending transition.
    #[must_use]
    pub fn time_until_next_transition(&self) -> Option<Duration> {
        self.engine.time_until_next_transition()
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, rc::Rc};

    use arcade_game::{PuzzleState, ShufflePacing};

    use super::*;
    use crate::score::ScoreReportError;

    #[derive(Clone, Default)]
    struct Shared(Rc<RefCell<Vec<ScoreReport>>>);

    impl ScoreReporter for Shared {
        fn report(&mut self, report: &ScoreReport) -> Result<(), ScoreReportError> {
            self.0.borrow_mut().push(report.clone());
            Ok(())
        }
    }

    fn nearly_solved(owner: Option<SessionOwner>, reports: &Shared) -> PuzzleSession {
        let engine = SlidingPuzzleEngine::from_grid("0 1 2 3 4 5 6 _ 7".parse().unwrap());
        PuzzleSession::from_engine(engine, owner, Box::new(reports.clone()))
    }

    #[test]
    fn test_solved_game_is_reported_for_owner() {
        let reports = Shared::default();
        let mut session = nearly_solved(Some(SessionOwner::new(5, "ana")), &reports);

        assert_eq!(
            session.request_move(GridPosition::new(8)),
            MoveOutcome::Solved { moves: 1 }
        );
        let expected = ScoreReport {
            user_id: 5,
            game: GameKind::Puzzle,
            score: 1,
        };
        assert_eq!(*reports.0.borrow(), [expected.clone()]);
        assert_eq!(session.last_report(), Some(&expected));

        session.request_move(GridPosition::new(7));
        assert_eq!(reports.0.borrow().len(), 1);
    }

    #[test]
    fn test_solved_game_without_owner_is_not_reported() {
        let reports = Shared::default();
        let mut session = nearly_solved(None, &reports);
        assert!(session.request_move(GridPosition::new(8)).is_solved());
        assert!(reports.0.borrow().is_empty());
        assert_eq!(session.last_report(), None);
    }

    #[test]
    fn test_rejected_moves_are_not_reported() {
        let reports = Shared::default();
        let mut session = nearly_solved(Some(SessionOwner::new(5, "ana")), &reports);
        assert!(session.request_move(GridPosition::new(0)).is_rejected());
        assert_eq!(session.snapshot().move_count, 0);
        assert!(reports.0.borrow().is_empty());
    }

    #[test]
    fn test_new_session_from_settings() {
        let settings = PuzzleSettings {
            dimension: 3,
            walk_length: 40,
            pacing: ShufflePacing::Immediate,
        };
        let seed = GameSeed::from_phrase("session");
        let session =
            PuzzleSession::with_seed(&settings, None, Box::new(Shared::default()), seed).unwrap();
        assert_eq!(session.snapshot().state, PuzzleState::Playable);
        assert_eq!(session.snapshot().grid.dimension(), 3);
        assert_eq!(session.engine().seed(), Some(seed));

        let tiny = PuzzleSettings {
            dimension: 1,
            ..settings
        };
        assert!(PuzzleSession::new(&tiny, None, Box::new(Shared::default())).is_err());
    }

    #[test]
    fn test_paced_session_waits_for_shuffle() {
        let reports = Shared::default();
        let mut session = PuzzleSession::with_seed(
            &PuzzleSettings::default(),
            None,
            Box::new(reports),
            GameSeed::from_phrase("paced"),
        )
        .unwrap();
        assert_eq!(session.snapshot().state, PuzzleState::Shuffling);
        assert_eq!(
            session.time_until_next_transition(),
            Some(Duration::from_millis(1000))
        );
        assert_eq!(session.flush().last(), Some(&PuzzleEvent::ShuffleComplete));
        assert_eq!(session.snapshot().state, PuzzleState::Playable);
    }
}

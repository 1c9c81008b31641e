//! Memory-match host session.

use std::time::Duration;

use arcade_core::CardId;
use arcade_game::{FlipOutcome, MemoryEvent, MemoryMatchEngine, MemorySnapshot};
use arcade_generator::{BoardGenerator, GameSeed};

use crate::{
    catalog::{CategoryCatalog, FALLBACK_CATEGORY},
    settings::MemorySettings,
};

/// Hosts a memory-match game on top of a category catalog.
///
/// The session owns the catalog and the selected category, and replaces the
/// engine's board whenever the category changes or the board is reset.
#[derive(Debug, Clone)]
pub struct MemorySession {
    catalog: CategoryCatalog,
    category: String,
    pair_count: usize,
    seed: GameSeed,
    engine: MemoryMatchEngine,
}

impl MemorySession {
    /// Starts a session with a fresh random board.
    ///
    /// An empty catalog is replaced by the fallback catalog.
    #[must_use]
    pub fn new(catalog: CategoryCatalog, settings: &MemorySettings) -> Self {
        Self::with_seed(catalog, settings, GameSeed::random())
    }

    /// Starts a session whose first board is determined by `seed`.
    #[must_use]
    pub fn with_seed(catalog: CategoryCatalog, settings: &MemorySettings, seed: GameSeed) -> Self {
        let catalog = if catalog.is_empty() {
            log::warn!("empty category catalog, using fallback");
            CategoryCatalog::fallback()
        } else {
            catalog
        };
        let category = catalog
            .initial_category(&settings.default_category)
            .unwrap_or(FALLBACK_CATEGORY)
            .to_owned();

        let generated = BoardGenerator::new(
            catalog.get(&category).unwrap_or_default(),
            settings.pair_count,
        )
        .generate_with_seed(seed);
        log::debug!("memory session started with category {category:?}, seed {seed}");

        Self {
            engine: MemoryMatchEngine::new(generated.board, settings.timings()),
            catalog,
            category,
            pair_count: settings.pair_count,
            seed,
        }
    }

    /// Returns the catalog.
    #[must_use]
    pub fn catalog(&self) -> &CategoryCatalog {
        &self.catalog
    }

    /// Returns the selected category key.
    #[must_use]
    pub fn category(&self) -> &str {
        &self.category
    }

    /// Returns the seed of the current board.
    #[must_use]
    pub fn seed(&self) -> GameSeed {
        self.seed
    }

    /// Returns the engine running the current board.
    #[must_use]
    pub fn engine(&self) -> &MemoryMatchEngine {
        &self.engine
    }

    /// Returns a snapshot of the current board.
    #[must_use]
    pub fn snapshot(&self) -> MemorySnapshot {
        self.engine.snapshot()
    }

    /// Flips a card.
    pub fn flip(&mut self, id: CardId) -> FlipOutcome {
        self.engine.flip(id)
    }

    /// Advances the engine clock.
    pub fn advance(&mut self, elapsed: Duration) -> Vec<MemoryEvent> {
        self.engine.advance(elapsed)
    }

    /// Fires every pending transition immediately.
    pub fn flush(&mut self) -> Vec<MemoryEvent> {
        self.engine.flush()
    }

    /// Returns the time until the next pending transition.
    #[must_use]
    pub fn time_until_next_transition(&self) -> Option<Duration> {
        self.engine.time_until_next_transition()
    }

    /// Switches to another category and deals a new board.
    ///
    /// Unknown keys are ignored and return `false`.
    pub fn select_category(&mut self, key: &str) -> bool {
        if !self.catalog.contains(key) {
            log::trace!("category {key:?} ignored: not in catalog");
            return false;
        }
        key.clone_into(&mut self.category);
        self.reset_board();
        true
    }

    /// Deals a new board from the current category.
    pub fn reset_board(&mut self) {
        self.reset_board_with_seed(GameSeed::random());
    }

    /// Deals the board determined by `seed` from the current category.
    ///
    /// A pending pair resolution of the previous board is cancelled.
    pub fn reset_board_with_seed(&mut self, seed: GameSeed) {
        let symbols = self.catalog.get(&self.category).unwrap_or_default();
        let generated = BoardGenerator::new(symbols, self.pair_count).generate_with_seed(seed);
        self.seed = seed;
        self.engine.reset(generated.board);
    }
}

#[cfg(test)]
mod tests {
    use arcade_core::{Board, Symbol};
    use arcade_game::MemoryState;

    use super::*;

    fn catalog() -> CategoryCatalog {
        let mut catalog = CategoryCatalog::new();
        catalog.insert(
            "frutas",
            ["🍎", "🍌", "🍇"].into_iter().map(Symbol::from).collect(),
        );
        catalog.insert(
            "animales",
            ["🐶", "🐱", "🐭", "🐹", "🐰", "🦊", "🐻", "🐼", "🐨"]
                .into_iter()
                .map(Symbol::from)
                .collect(),
        );
        catalog
    }

    fn find_partner(board: &Board, id: CardId) -> CardId {
        let value = board.card(id).unwrap().value();
        board
            .cards()
            .iter()
            .find(|card| card.id() != id && card.value() == value)
            .unwrap()
            .id()
    }

    #[test]
    fn test_starts_with_default_category() {
        let session = MemorySession::new(catalog(), &MemorySettings::default());
        assert_eq!(session.category(), "animales");
        assert_eq!(session.snapshot().board.len(), 16);
        assert_eq!(session.snapshot().state, MemoryState::Idle);
    }

    #[test]
    fn test_starts_with_first_category_without_default() {
        let settings = MemorySettings {
            default_category: "deportes".to_owned(),
            ..MemorySettings::default()
        };
        let session = MemorySession::new(catalog(), &settings);
        assert_eq!(session.category(), "frutas");
        assert_eq!(session.snapshot().board.len(), 6);
    }

    #[test]
    fn test_empty_catalog_uses_fallback() {
        let session = MemorySession::new(CategoryCatalog::new(), &MemorySettings::default());
        assert_eq!(session.category(), FALLBACK_CATEGORY);
        assert_eq!(session.snapshot().board.pair_count(), 8);
    }

    #[test]
    fn test_catalog_with_repeated_tokens_deals_pairs() {
        let mut catalog = CategoryCatalog::new();
        catalog.insert(
            "animales",
            ["🐶", "🐶", "🐱"].into_iter().map(Symbol::from).collect(),
        );
        let settings = MemorySettings {
            pair_count: 2,
            ..MemorySettings::default()
        };
        let session = MemorySession::new(catalog, &settings);
        let board = session.snapshot().board;
        assert_eq!(board.pair_count(), 2);
        assert_eq!(board.len(), 4);
    }

    #[test]
    fn test_same_seed_same_board() {
        let seed = GameSeed::from_phrase("deal");
        let a = MemorySession::with_seed(catalog(), &MemorySettings::default(), seed);
        let b = MemorySession::with_seed(catalog(), &MemorySettings::default(), seed);
        assert_eq!(a.snapshot(), b.snapshot());
        assert_eq!(a.seed(), seed);
    }

    #[test]
    fn test_select_category_deals_new_board() {
        let mut session = MemorySession::new(catalog(), &MemorySettings::default());
        session.flip(CardId::new(0));

        assert!(session.select_category("frutas"));
        assert_eq!(session.category(), "frutas");
        let snapshot = session.snapshot();
        assert_eq!(snapshot.board.len(), 6);
        assert_eq!(snapshot.move_count, 0);
        assert_eq!(snapshot.state, MemoryState::Idle);
        assert!(snapshot.board.cards().iter().all(|card| card.is_face_down()));

        assert!(!session.select_category("deportes"));
        assert_eq!(session.category(), "frutas");
    }

    #[test]
    fn test_reset_cancels_pending_resolution() {
        let mut session = MemorySession::new(catalog(), &MemorySettings::default());
        let first = CardId::new(0);
        let partner = find_partner(&session.snapshot().board, first);
        session.flip(first);
        session.flip(partner);
        assert!(session.time_until_next_transition().is_some());

        session.reset_board_with_seed(GameSeed::from_phrase("fresh"));
        assert_eq!(session.time_until_next_transition(), None);
        assert!(session.advance(Duration::from_secs(5)).is_empty());
        assert_eq!(session.snapshot().board.matched_count(), 0);
        assert_eq!(session.snapshot().move_count, 0);
    }

    #[test]
    fn test_full_game_through_session() {
        let settings = MemorySettings {
            pair_count: 3,
            ..MemorySettings::default()
        };
        let mut session = MemorySession::new(catalog(), &settings);
        let board = session.snapshot().board;

        let mut won = Vec::new();
        let mut seen = Vec::new();
        for card in board.cards() {
            if seen.contains(&card.id()) {
                continue;
            }
            let partner = find_partner(&board, card.id());
            seen.extend([card.id(), partner]);
            session.flip(card.id());
            session.flip(partner);
            won.extend(
                session
                    .advance(settings.match_delay)
                    .into_iter()
                    .filter(|event| matches!(event, MemoryEvent::Won { .. })),
            );
        }
        assert_eq!(won, [MemoryEvent::Won { moves: 3 }]);
        assert!(session.snapshot().is_won());
    }
}

use std::collections::HashSet;

use arcade_core::{Board, Card, CardId, Symbol};
use rand::Rng;

use crate::GameSeed;

/// A generated memory board together with the seed that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedBoard {
    /// The shuffled board.
    pub board: Board,
    /// Seed used for the shuffle.
    pub seed: GameSeed,
}

/// Builds shuffled memory boards from a symbol catalog.
///
/// The generator takes the first `pair_count` distinct symbols, duplicates each
/// one, and applies a uniform Fisher–Yates permutation. Card ids are assigned
/// sequentially in post-shuffle order.
///
/// Repeated symbols count once, at their first occurrence. A `pair_count` larger
/// than the number of distinct symbols is truncated to the symbols available; a
/// zero pair count or an empty catalog yields an empty board.
#[derive(Debug, Clone, Copy)]
pub struct BoardGenerator<'a> {
    symbols: &'a [Symbol],
    pair_count: usize,
}

impl<'a> BoardGenerator<'a> {
    /// Creates a generator over the given symbols.
    #[must_use]
    pub fn new(symbols: &'a [Symbol], pair_count: usize) -> Self {
        Self {
            symbols,
            pair_count,
        }
    }

    /// Returns the number of pairs generated boards will hold.
    #[must_use]
    pub fn effective_pair_count(&self) -> usize {
        self.chosen_symbols().len()
    }

    fn chosen_symbols(&self) -> Vec<&'a Symbol> {
        let mut seen = HashSet::new();
        self.symbols
            .iter()
            .filter(|symbol| seen.insert(*symbol))
            .take(self.pair_count)
            .collect()
    }

    /// Generates a board from a fresh random seed.
    #[must_use]
    pub fn generate(&self) -> GeneratedBoard {
        self.generate_with_seed(GameSeed::random())
    }

    /// Generates the board determined by `seed`.
    #[must_use]
    pub fn generate_with_seed(&self, seed: GameSeed) -> GeneratedBoard {
        let board = self.generate_with_rng(&mut seed.rng());
        GeneratedBoard { board, seed }
    }

    /// Generates a board using the supplied random source.
    pub fn generate_with_rng<R>(&self, rng: &mut R) -> Board
    where
        R: Rng + ?Sized,
    {
        let chosen = self.chosen_symbols();
        let mut values: Vec<&Symbol> = chosen.iter().chain(&chosen).copied().collect();
        fisher_yates(&mut values, rng);

        let cards = (0..)
            .zip(values)
            .map(|(id, value)| Card::new(CardId::new(id), value.clone()))
            .collect();
        Board::from_cards(cards).expect("duplicated symbols always form pairs")
    }
}

/// Shuffles `items` in place with a uniform Fisher–Yates permutation.
///
/// For each index from the last down to 1, the element is swapped with a uniformly
/// chosen index in `0..=i`, so every ordering is equally likely.
pub fn fisher_yates<T, R>(items: &mut [T], rng: &mut R)
where
    R: Rng + ?Sized,
{
    for i in (1..items.len()).rev() {
        let j = rng.random_range(0..=i);
        items.swap(i, j);
    }
}

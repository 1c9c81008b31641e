//! The sliding-puzzle grid.

use std::{fmt, str::FromStr};

use serde::Serialize;
use tinyvec::ArrayVec;

/// A puzzle tile identified by its home position.
///
/// On an `N × N` grid the tiles are numbered `0..N²-1`; tile `i` belongs at
/// position `i` in the solved arrangement.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Default,
    Serialize,
    derive_more::Display,
    derive_more::From,
)]
#[serde(transparent)]
pub struct Tile(u16);

impl Tile {
    /// Creates a tile from its identifier.
    #[must_use]
    pub const fn new(id: u16) -> Self {
        Self(id)
    }

    /// Returns the tile identifier.
    #[must_use]
    pub const fn id(self) -> u16 {
        self.0
    }

    /// Returns the position this tile occupies in the solved grid.
    #[must_use]
    pub fn home(self) -> GridPosition {
        GridPosition::new(usize::from(self.0))
    }
}

/// A row-major cell index into a [`Grid`].
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Default,
    Serialize,
    derive_more::Display,
    derive_more::From,
)]
#[serde(transparent)]
pub struct GridPosition(usize);

impl GridPosition {
    /// Creates a position from a row-major index.
    #[must_use]
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    /// Creates a position from a row and column on a grid of the given dimension.
    #[must_use]
    pub const fn from_row_col(row: usize, col: usize, dimension: usize) -> Self {
        Self(row * dimension + col)
    }

    /// Returns the row-major index.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }

    /// Returns the row of this position on a grid of the given dimension.
    #[must_use]
    pub const fn row(self, dimension: usize) -> usize {
        self.0 / dimension
    }

    /// Returns the column of this position on a grid of the given dimension.
    #[must_use]
    pub const fn col(self, dimension: usize) -> usize {
        self.0 % dimension
    }
}

/// The orthogonal neighbors of a grid cell, in up, down, left, right order.
pub type Neighbors = ArrayVec<[GridPosition; 4]>;

/// Errors returned when a cell sequence does not form a well-formed grid.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum GridError {
    /// The grid dimension is below the minimum of 2.
    #[display("grid dimension must be at least {min}, got {dimension}")]
    DimensionTooSmall {
        /// Requested dimension.
        dimension: usize,
        /// Smallest supported dimension.
        min: usize,
    },
    /// The grid dimension has more tiles than tile identifiers can number.
    #[display("grid dimension must be at most {max}, got {dimension}")]
    DimensionTooLarge {
        /// Requested dimension.
        dimension: usize,
        /// Largest supported dimension.
        max: usize,
    },
    /// The number of cells does not form a square grid.
    #[display("expected {expected} cells, got {actual}")]
    WrongCellCount {
        /// Number of cells for the requested dimension.
        expected: usize,
        /// Number of cells supplied.
        actual: usize,
    },
    /// The grid has no empty cell.
    #[display("grid has no empty cell")]
    MissingEmpty,
    /// The grid has more than one empty cell.
    #[display("grid has {count} empty cells")]
    MultipleEmpty {
        /// Number of empty cells found.
        count: usize,
    },
    /// A tile identifier is outside the range for this dimension.
    #[display("tile {tile} is out of range for a {dimension}x{dimension} grid")]
    TileOutOfRange {
        /// The offending tile.
        tile: Tile,
        /// Grid dimension.
        dimension: usize,
    },
    /// A tile appears more than once.
    #[display("tile {tile} appears more than once")]
    DuplicateTile {
        /// The repeated tile.
        tile: Tile,
    },
    /// A textual grid contained a token that is neither a tile nor an empty marker.
    #[display("invalid grid token: {token:?}")]
    InvalidToken {
        /// The unparseable token.
        token: String,
    },
}

/// Why a tile could not slide into the empty cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum IllegalSlide {
    /// The position lies outside the grid.
    #[display("position is outside the grid")]
    OutOfRange,
    /// The position is the empty cell itself.
    #[display("position is the empty cell")]
    EmptyCell,
    /// The position is not orthogonally adjacent to the empty cell.
    #[display("position is not adjacent to the empty cell")]
    NotAdjacent,
}

/// A square sliding-puzzle grid with exactly one empty cell.
///
/// Every tile `0..N²-1` appears exactly once. The grid can only change by sliding
/// a tile adjacent to the empty cell into it, so tiles are never created or
/// destroyed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Grid {
    dimension: usize,
    cells: Vec<Option<Tile>>,
    empty: GridPosition,
}

impl Grid {
    /// Smallest supported grid dimension.
    pub const MIN_DIMENSION: usize = 2;

    /// Largest supported grid dimension; its `N² - 1` tiles still fit in a [`Tile`].
    pub const MAX_DIMENSION: usize = 256;

    /// Creates the solved grid of the given dimension.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::DimensionTooSmall`] or [`GridError::DimensionTooLarge`]
    /// if `dimension` lies outside [`Grid::MIN_DIMENSION`] and [`Grid::MAX_DIMENSION`].
    pub fn solved(dimension: usize) -> Result<Self, GridError> {
        let len = check_dimension(dimension)?;
        let mut cells = Vec::with_capacity(len);
        cells.extend((0..=u16::MAX).take(len - 1).map(|id| Some(Tile::new(id))));
        cells.push(None);
        Ok(Self {
            dimension,
            cells,
            empty: GridPosition::new(len - 1),
        })
    }

    /// Creates a grid from its cells in row-major order, validating its invariants.
    ///
    /// # Errors
    ///
    /// Returns a [`GridError`] if the dimension is unsupported, the cell count is not
    /// `dimension²`, the number of empty cells is not exactly one, or the tiles are
    /// not a permutation of `0..dimension²-1`.
    pub fn from_cells(dimension: usize, cells: Vec<Option<Tile>>) -> Result<Self, GridError> {
        let len = check_dimension(dimension)?;
        if cells.len() != len {
            return Err(GridError::WrongCellCount {
                expected: len,
                actual: cells.len(),
            });
        }

        let mut seen = vec![false; len - 1];
        let mut empty = None;
        let mut empty_count = 0;
        for (i, cell) in cells.iter().enumerate() {
            match cell {
                None => {
                    empty_count += 1;
                    empty.get_or_insert(GridPosition::new(i));
                }
                Some(tile) => {
                    let slot = seen
                        .get_mut(usize::from(tile.id()))
                        .ok_or(GridError::TileOutOfRange {
                            tile: *tile,
                            dimension,
                        })?;
                    if *slot {
                        return Err(GridError::DuplicateTile { tile: *tile });
                    }
                    *slot = true;
                }
            }
        }

        if empty_count > 1 {
            return Err(GridError::MultipleEmpty { count: empty_count });
        }
        let empty = empty.ok_or(GridError::MissingEmpty)?;
        Ok(Self {
            dimension,
            cells,
            empty,
        })
    }

    /// Returns the grid dimension `N` of an `N × N` grid.
    #[must_use]
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Returns the number of cells.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Always `false`; a grid has at least four cells.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Returns the cells in row-major order; `None` is the empty cell.
    #[must_use]
    pub fn cells(&self) -> &[Option<Tile>] {
        &self.cells
    }

    /// Returns the content of the cell at `pos`, or `None` if `pos` is the empty
    /// cell or lies outside the grid.
    #[must_use]
    pub fn tile_at(&self, pos: GridPosition) -> Option<Tile> {
        self.cells.get(pos.index()).copied().flatten()
    }

    /// Returns `true` if `pos` lies inside the grid.
    #[must_use]
    pub fn contains(&self, pos: GridPosition) -> bool {
        pos.index() < self.cells.len()
    }

    /// Returns the position of the empty cell.
    #[must_use]
    pub fn empty_position(&self) -> GridPosition {
        self.empty
    }

    /// Returns the orthogonal neighbors of `pos`, clipped at the grid edges.
    ///
    /// The order is up, down, left, right. Positions outside the grid have no
    /// neighbors.
    #[must_use]
    pub fn neighbors(&self, pos: GridPosition) -> Neighbors {
        let mut neighbors = Neighbors::new();
        if !self.contains(pos) {
            return neighbors;
        }
        let n = self.dimension;
        let (row, col) = (pos.row(n), pos.col(n));
        if row > 0 {
            neighbors.push(GridPosition::new(pos.index() - n));
        }
        if row < n - 1 {
            neighbors.push(GridPosition::new(pos.index() + n));
        }
        if col > 0 {
            neighbors.push(GridPosition::new(pos.index() - 1));
        }
        if col < n - 1 {
            neighbors.push(GridPosition::new(pos.index() + 1));
        }
        neighbors
    }

    /// Returns the positions whose tiles may slide into the empty cell.
    #[must_use]
    pub fn movable_positions(&self) -> Neighbors {
        self.neighbors(self.empty)
    }

    /// Checks whether the tile at `pos` may slide into the empty cell.
    ///
    /// # Errors
    ///
    /// Returns the reason the slide is illegal.
    pub fn check_slide(&self, pos: GridPosition) -> Result<(), IllegalSlide> {
        if !self.contains(pos) {
            return Err(IllegalSlide::OutOfRange);
        }
        if pos == self.empty {
            return Err(IllegalSlide::EmptyCell);
        }
        if !self.movable_positions().contains(&pos) {
            return Err(IllegalSlide::NotAdjacent);
        }
        Ok(())
    }

    /// Slides the tile at `pos` into the empty cell; `pos` becomes the new empty cell.
    ///
    /// # Errors
    ///
    /// Returns the reason the slide is illegal; the grid is left unchanged.
    pub fn slide(&mut self, pos: GridPosition) -> Result<(), IllegalSlide> {
        self.check_slide(pos)?;
        self.cells.swap(pos.index(), self.empty.index());
        self.empty = pos;
        Ok(())
    }

    /// Returns `true` if every tile is at its home position and the empty cell is last.
    #[must_use]
    pub fn is_solved(&self) -> bool {
        self.empty.index() == self.cells.len() - 1
            && self.cells[..self.cells.len() - 1]
                .iter()
                .enumerate()
                .all(|(i, cell)| cell.is_some_and(|tile| tile.home().index() == i))
    }

    /// Returns the number of tile pairs that appear in the wrong relative order.
    #[must_use]
    pub fn inversions(&self) -> usize {
        let tiles: Vec<Tile> = self.cells.iter().flatten().copied().collect();
        tiles
            .iter()
            .enumerate()
            .map(|(i, a)| tiles[i + 1..].iter().filter(|b| a > *b).count())
            .sum()
    }

    /// Returns `true` if the solved arrangement is reachable through legal slides.
    ///
    /// Horizontal slides never change the inversion count. A vertical slide moves a
    /// tile past `N - 1` others and the empty cell by one row, so for odd `N` the
    /// inversion parity is invariant and for even `N` the parity of inversions plus
    /// the empty cell's row is.
    #[must_use]
    pub fn is_solvable(&self) -> bool {
        let n = self.dimension;
        let inversions = self.inversions();
        if n % 2 == 1 {
            inversions % 2 == 0
        } else {
            (inversions + self.empty.row(n)) % 2 == (n - 1) % 2
        }
    }
}

/// Returns the cell count of a grid with the given dimension.
fn check_dimension(dimension: usize) -> Result<usize, GridError> {
    if dimension < Grid::MIN_DIMENSION {
        return Err(GridError::DimensionTooSmall {
            dimension,
            min: Grid::MIN_DIMENSION,
        });
    }
    // Tiles are numbered 0..len-1 and must all fit in a u16.
    dimension
        .checked_mul(dimension)
        .filter(|len| len - 1 <= usize::from(u16::MAX) + 1)
        .ok_or(GridError::DimensionTooLarge {
            dimension,
            max: Grid::MAX_DIMENSION,
        })
}

impl fmt::Display for Grid {
    /// Formats the grid as whitespace-separated rows, the empty cell shown as `_`.
    ///
    /// The output parses back with [`Grid::from_str`].
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = (self.cells.len() - 1).to_string().len();
        for (i, row) in self.cells.chunks(self.dimension).enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            for (j, cell) in row.iter().enumerate() {
                if j > 0 {
                    f.write_str(" ")?;
                }
                match cell {
                    Some(tile) => write!(f, "{:>width$}", tile.id())?,
                    None => write!(f, "{:>width$}", "_")?,
                }
            }
        }
        Ok(())
    }
}

impl FromStr for Grid {
    type Err = GridError;

    /// Parses whitespace-separated cells in row-major order.
    ///
    /// Tiles are decimal identifiers; `_` or `.` marks the empty cell. The
    /// dimension is inferred from the number of cells.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let cells = s
            .split_whitespace()
            .map(|token| match token {
                "_" | "." => Ok(None),
                _ => token
                    .parse::<u16>()
                    .map(|id| Some(Tile::new(id)))
                    .map_err(|_| GridError::InvalidToken {
                        token: token.to_owned(),
                    }),
            })
            .collect::<Result<Vec<_>, _>>()?;

        let dimension = cells.len().isqrt();
        if dimension * dimension != cells.len() {
            return Err(GridError::WrongCellCount {
                expected: (dimension + 1) * (dimension + 1),
                actual: cells.len(),
            });
        }
        Self::from_cells(dimension, cells)
    }
}

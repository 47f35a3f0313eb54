//! Core domain types: marks, parity labels, squares, coordinates and boards.

use derive_more::{Display, Error};
use serde::de::Deserializer;
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// Symbolic mark written into a square.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
pub enum Mark {
    /// First seat's mark.
    X,
    /// Second seat's mark.
    O,
}

impl Mark {
    /// Returns the opposing mark.
    pub fn opponent(self) -> Self {
        match self {
            Mark::X => Mark::O,
            Mark::O => Mark::X,
        }
    }
}

/// Parity label used as the player identity in the counter regime.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
pub enum Parity {
    /// Odd counters.
    Odd,
    /// Even counters.
    Even,
}

impl Parity {
    /// Parity of a counter value.
    pub fn of(value: u32) -> Self {
        if value % 2 == 0 {
            Parity::Even
        } else {
            Parity::Odd
        }
    }

    /// Returns the opposing label.
    pub fn opponent(self) -> Self {
        match self {
            Parity::Odd => Parity::Even,
            Parity::Even => Parity::Odd,
        }
    }
}

/// A square in the symbolic regime.
///
/// Serializes as `null` when empty and as the mark otherwise.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Option<Mark>", into = "Option<Mark>")]
pub enum Square {
    /// Nobody has played here.
    #[default]
    Empty,
    /// Square claimed by a mark.
    Occupied(Mark),
}

impl From<Option<Mark>> for Square {
    fn from(mark: Option<Mark>) -> Self {
        mark.map_or(Square::Empty, Square::Occupied)
    }
}

impl From<Square> for Option<Mark> {
    fn from(square: Square) -> Self {
        match square {
            Square::Empty => None,
            Square::Occupied(mark) => Some(mark),
        }
    }
}

impl std::fmt::Display for Square {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Square::Empty => write!(f, "."),
            Square::Occupied(mark) => write!(f, "{}", mark),
        }
    }
}

/// A `(row, col)` coordinate, serialized as a two-element array.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, derive_more::Display,
)]
#[serde(from = "(usize, usize)", into = "(usize, usize)")]
#[display("({}, {})", row, col)]
pub struct Coord {
    /// Zero-based row.
    pub row: usize,
    /// Zero-based column.
    pub col: usize,
}

impl Coord {
    /// Creates a coordinate.
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

impl From<(usize, usize)> for Coord {
    fn from((row, col): (usize, usize)) -> Self {
        Self { row, col }
    }
}

impl From<Coord> for (usize, usize) {
    fn from(coord: Coord) -> Self {
        (coord.row, coord.col)
    }
}

/// A matrix that is not N×N.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
pub enum BoardShapeError {
    /// No rows at all.
    #[display("board has no rows")]
    Empty,
    /// A row whose length differs from the row count.
    #[display("row {} has {} cells, expected {}", row, len, expected)]
    Ragged {
        /// Offending row index.
        row: usize,
        /// Its length.
        len: usize,
        /// The row count, which every row must match.
        expected: usize,
    },
}

/// Square N×N board of cells stored in row-major order.
///
/// The dimension is fixed at construction. On the wire a board is a
/// JSON array of rows; decoding rejects anything that is not square.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Board<C> {
    size: usize,
    cells: Vec<C>,
}

impl<C: Copy + Default> Board<C> {
    /// Creates an all-default (empty / zeroed) board.
    #[instrument]
    pub fn new(size: usize) -> Self {
        Self {
            size,
            cells: vec![C::default(); size * size],
        }
    }

    /// Restores every cell to its default value, keeping the dimension.
    pub fn reset(&mut self) {
        self.cells.fill(C::default());
    }
}

impl<C: Copy> Board<C> {
    /// Builds a board from a matrix of rows.
    pub fn from_rows(rows: Vec<Vec<C>>) -> Result<Self, BoardShapeError> {
        let size = rows.len();
        if size == 0 {
            return Err(BoardShapeError::Empty);
        }
        let mut cells = Vec::with_capacity(size * size);
        for (row, values) in rows.into_iter().enumerate() {
            if values.len() != size {
                return Err(BoardShapeError::Ragged {
                    row,
                    len: values.len(),
                    expected: size,
                });
            }
            cells.extend(values);
        }
        Ok(Self { size, cells })
    }

    /// Side length N.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Whether the coordinate lies on the board.
    pub fn contains(&self, at: Coord) -> bool {
        at.row < self.size && at.col < self.size
    }

    /// Cell at a coordinate, `None` when off the board.
    pub fn get(&self, at: Coord) -> Option<C> {
        self.contains(at)
            .then(|| self.cells[at.row * self.size + at.col])
    }

    /// Overwrites a cell. Returns `false` when the coordinate is off the board.
    pub fn set(&mut self, at: Coord, cell: C) -> bool {
        if !self.contains(at) {
            return false;
        }
        self.cells[at.row * self.size + at.col] = cell;
        true
    }

    /// All cells in row-major order.
    pub fn cells(&self) -> &[C] {
        &self.cells
    }

    /// Iterates rows as slices.
    pub fn rows(&self) -> impl Iterator<Item = &[C]> {
        // size is never 0 for decoded boards; guard chunks() anyway
        self.cells.chunks(self.size.max(1))
    }

    /// Copies the board out as a matrix of rows.
    pub fn to_rows(&self) -> Vec<Vec<C>> {
        self.rows().map(<[C]>::to_vec).collect()
    }
}

impl<C: Copy + Default + PartialEq> Board<C> {
    /// True when no move has touched the board since creation or reset.
    pub fn is_pristine(&self) -> bool {
        self.cells.iter().all(|cell| *cell == C::default())
    }
}

impl<C: Copy + std::fmt::Display> Board<C> {
    /// Formats the board as a human-readable grid with row and column indices.
    pub fn display(&self) -> String {
        let width = self
            .cells
            .iter()
            .map(|cell| cell.to_string().len())
            .max()
            .unwrap_or(1)
            .max(self.size.saturating_sub(1).to_string().len());

        let mut out = String::new();
        out.push_str(&" ".repeat(width + 1));
        for col in 0..self.size {
            out.push_str(&format!(" {:>width$}", col));
        }
        for (row, values) in self.rows().enumerate() {
            out.push('\n');
            out.push_str(&format!("{:>width$} ", row));
            for cell in values {
                out.push_str(&format!(" {:>width$}", cell.to_string()));
            }
        }
        out
    }
}

impl<C: Copy + std::fmt::Display> std::fmt::Display for Board<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display())
    }
}

impl<C: Serialize> Serialize for Board<C> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.cells.chunks(self.size.max(1)))
    }
}

impl<'de, C: Copy + Deserialize<'de>> Deserialize<'de> for Board<C> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let rows = Vec::<Vec<C>>::deserialize(deserializer)?;
        Board::from_rows(rows).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_board_is_pristine() {
        let board: Board<u32> = Board::new(5);
        assert_eq!(board.size(), 5);
        assert_eq!(board.cells().len(), 25);
        assert!(board.is_pristine());
    }

    #[test]
    fn test_set_and_get() {
        let mut board: Board<Square> = Board::new(3);
        assert!(board.set(Coord::new(1, 2), Square::Occupied(Mark::O)));
        assert_eq!(board.get(Coord::new(1, 2)), Some(Square::Occupied(Mark::O)));
        assert_eq!(board.get(Coord::new(3, 0)), None);
        assert!(!board.set(Coord::new(0, 3), Square::Occupied(Mark::X)));
        assert!(!board.is_pristine());
    }

    #[test]
    fn test_reset_keeps_dimension() {
        let mut board: Board<u32> = Board::new(4);
        board.set(Coord::new(2, 2), 7);
        board.reset();
        assert_eq!(board.size(), 4);
        assert!(board.is_pristine());
    }

    #[test]
    fn test_board_serializes_as_matrix() {
        let mut board: Board<u32> = Board::new(2);
        board.set(Coord::new(0, 1), 3);
        let json = serde_json::to_string(&board).unwrap();
        assert_eq!(json, "[[0,3],[0,0]]");
        let back: Board<u32> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, board);
    }

    #[test]
    fn test_symbolic_board_serializes_nulls() {
        let mut board: Board<Square> = Board::new(2);
        board.set(Coord::new(1, 0), Square::Occupied(Mark::X));
        let json = serde_json::to_string(&board).unwrap();
        assert_eq!(json, r#"[[null,null],["X",null]]"#);
    }

    #[test]
    fn test_ragged_matrix_rejected() {
        let err = serde_json::from_str::<Board<u32>>("[[0,0],[0]]").unwrap_err();
        assert!(err.to_string().contains("row 1 has 1 cells"));
        assert!(serde_json::from_str::<Board<u32>>("[]").is_err());
    }

    #[test]
    fn test_coord_serializes_as_pair() {
        let json = serde_json::to_string(&Coord::new(4, 1)).unwrap();
        assert_eq!(json, "[4,1]");
    }

    #[test]
    fn test_display_lists_indices() {
        let mut board: Board<Square> = Board::new(3);
        board.set(Coord::new(0, 0), Square::Occupied(Mark::X));
        let text = board.display();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[1].trim_end().ends_with("X . ."));
    }

    #[test]
    fn test_parity_of() {
        assert_eq!(Parity::of(0), Parity::Even);
        assert_eq!(Parity::of(7), Parity::Odd);
        assert_eq!(Parity::Odd.opponent(), Parity::Even);
    }
}

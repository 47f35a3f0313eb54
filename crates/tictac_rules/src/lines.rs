//! Line enumeration in evaluation priority order.

use super::types::Coord;
use serde::{Deserialize, Serialize};

/// Which row, column or diagonal a line is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LineKind {
    /// Row `i`.
    Row(usize),
    /// Column `i`.
    Column(usize),
    /// Top-left to bottom-right.
    MainDiagonal,
    /// Top-right to bottom-left.
    AntiDiagonal,
}

/// A full-length line on an N×N board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Line {
    kind: LineKind,
    size: usize,
}

impl Line {
    /// Creates a line of the given kind on a board of side `size`.
    pub fn new(kind: LineKind, size: usize) -> Self {
        Self { kind, size }
    }

    /// The line's kind.
    pub fn kind(&self) -> LineKind {
        self.kind
    }

    /// Coordinates along the line, starting from its first cell.
    pub fn coords(&self) -> impl Iterator<Item = Coord> + '_ {
        let n = self.size;
        (0..n).map(move |i| match self.kind {
            LineKind::Row(row) => Coord::new(row, i),
            LineKind::Column(col) => Coord::new(i, col),
            LineKind::MainDiagonal => Coord::new(i, i),
            LineKind::AntiDiagonal => Coord::new(i, n - 1 - i),
        })
    }
}

/// All `2N + 2` lines: rows, then columns, then the main and anti diagonals.
pub fn lines(size: usize) -> impl Iterator<Item = Line> {
    let rows = (0..size).map(LineKind::Row);
    let columns = (0..size).map(LineKind::Column);
    rows.chain(columns)
        .chain([LineKind::MainDiagonal, LineKind::AntiDiagonal])
        .map(move |kind| Line::new(kind, size))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_count_and_order() {
        let all: Vec<_> = lines(5).map(|line| line.kind()).collect();
        assert_eq!(all.len(), 12);
        assert_eq!(all[0], LineKind::Row(0));
        assert_eq!(all[4], LineKind::Row(4));
        assert_eq!(all[5], LineKind::Column(0));
        assert_eq!(all[10], LineKind::MainDiagonal);
        assert_eq!(all[11], LineKind::AntiDiagonal);
    }

    #[test]
    fn test_anti_diagonal_coords() {
        let coords: Vec<_> = Line::new(LineKind::AntiDiagonal, 3).coords().collect();
        assert_eq!(
            coords,
            vec![Coord::new(0, 2), Coord::new(1, 1), Coord::new(2, 0)]
        );
    }

    #[test]
    fn test_column_coords() {
        let coords: Vec<_> = Line::new(LineKind::Column(1), 3).coords().collect();
        assert_eq!(
            coords,
            vec![Coord::new(0, 1), Coord::new(1, 1), Coord::new(2, 1)]
        );
    }
}

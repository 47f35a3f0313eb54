//! Matching rules: what a cell holds, when a line agrees, who a line belongs to.
//!
//! The evaluator is written once against [`MatchRule`]. Two regimes ship:
//!
//! - [`Symbolic`]: squares hold a mark, written once. A line wins when all
//!   of its squares carry the same mark; the winner is that mark.
//! - [`Counter`]: cells hold counters bumped by every move. A line wins when
//!   every counter is positive and shares the first counter's parity; the
//!   winner is the parity label of the first counter, whoever moved last.

use super::types::{Coord, Mark, Parity, Square};
use derive_more::{Display, Error};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fmt::{Debug, Display as FmtDisplay};
use std::hash::Hash;

/// Why a move cannot be applied to a board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Error)]
pub enum MoveError {
    /// Coordinate lies outside the board.
    #[display("position {} is off the board", _0)]
    OutOfBounds(#[error(not(source))] Coord),
    /// Square already carries a mark (symbolic regime).
    #[display("position {} is already occupied", _0)]
    Occupied(#[error(not(source))] Coord),
    /// Counter cannot be incremented any further.
    #[display("counter at {} overflowed", _0)]
    Overflow(#[error(not(source))] Coord),
}

/// A cell could not accept a move; the board layer attaches the coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellRejection {
    /// Already written.
    Occupied,
    /// Counter at its maximum.
    Overflow,
}

impl CellRejection {
    /// Attaches the coordinate the move targeted.
    pub fn at(self, coord: Coord) -> MoveError {
        match self {
            CellRejection::Occupied => MoveError::Occupied(coord),
            CellRejection::Overflow => MoveError::Overflow(coord),
        }
    }
}

/// Pluggable cell semantics for the line evaluator and move application.
pub trait MatchRule: Copy + Debug + Default + PartialEq + Eq + Send + Sync + 'static {
    /// Value stored in each board cell.
    type Cell: Copy
        + Debug
        + Default
        + PartialEq
        + Eq
        + FmtDisplay
        + Send
        + Sync
        + Serialize
        + DeserializeOwned
        + 'static;

    /// Winner label, also used as the player role.
    type Label: Copy
        + Debug
        + PartialEq
        + Eq
        + Hash
        + FmtDisplay
        + Send
        + Sync
        + Serialize
        + DeserializeOwned
        + 'static;

    /// Whether the cell counts as played.
    fn occupied(&self, cell: &Self::Cell) -> bool;

    /// Whether `cell` agrees with the first cell of its line.
    fn matches(&self, first: &Self::Cell, cell: &Self::Cell) -> bool;

    /// Winner label of a line whose first cell is `first`.
    fn label(&self, first: &Self::Cell) -> Option<Self::Label>;

    /// The two seat roles, in join order.
    fn roles(&self) -> [Self::Label; 2];

    /// Role a client assumes when it is alone in a room.
    fn default_role(&self) -> Self::Label {
        self.roles()[0]
    }

    /// Whether a client may propose a move onto this cell.
    fn accepts(&self, cell: &Self::Cell) -> bool;

    /// Whether the same cell may be played more than once.
    fn repeatable(&self) -> bool;

    /// The cell after `role` plays on it.
    fn apply(&self, cell: Self::Cell, role: Self::Label) -> Result<Self::Cell, CellRejection>;
}

/// Write-once marks; a line wins on equal marks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Symbolic;

impl MatchRule for Symbolic {
    type Cell = Square;
    type Label = Mark;

    fn occupied(&self, cell: &Square) -> bool {
        matches!(cell, Square::Occupied(_))
    }

    fn matches(&self, first: &Square, cell: &Square) -> bool {
        first == cell
    }

    fn label(&self, first: &Square) -> Option<Mark> {
        match first {
            Square::Occupied(mark) => Some(*mark),
            Square::Empty => None,
        }
    }

    fn roles(&self) -> [Mark; 2] {
        [Mark::X, Mark::O]
    }

    fn accepts(&self, cell: &Square) -> bool {
        *cell == Square::Empty
    }

    fn repeatable(&self) -> bool {
        false
    }

    fn apply(&self, cell: Square, role: Mark) -> Result<Square, CellRejection> {
        match cell {
            Square::Empty => Ok(Square::Occupied(role)),
            Square::Occupied(_) => Err(CellRejection::Occupied),
        }
    }
}

/// Incrementing counters; a line wins on shared parity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Counter;

impl MatchRule for Counter {
    type Cell = u32;
    type Label = Parity;

    fn occupied(&self, cell: &u32) -> bool {
        *cell > 0
    }

    fn matches(&self, first: &u32, cell: &u32) -> bool {
        first.abs_diff(*cell) % 2 == 0
    }

    fn label(&self, first: &u32) -> Option<Parity> {
        Some(Parity::of(*first))
    }

    fn roles(&self) -> [Parity; 2] {
        [Parity::Odd, Parity::Even]
    }

    fn accepts(&self, _cell: &u32) -> bool {
        true
    }

    fn repeatable(&self) -> bool {
        true
    }

    fn apply(&self, cell: u32, _role: Parity) -> Result<u32, CellRejection> {
        cell.checked_add(1).ok_or(CellRejection::Overflow)
    }
}

/// Which regime a deployment runs.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    serde::Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Regime {
    /// [`Symbolic`] marks.
    Symbolic,
    /// [`Counter`] parity.
    #[default]
    Counter,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_symbolic_apply_writes_once() {
        let cell = Symbolic.apply(Square::Empty, Mark::O).unwrap();
        assert_eq!(cell, Square::Occupied(Mark::O));
        assert_eq!(Symbolic.apply(cell, Mark::X), Err(CellRejection::Occupied));
        assert!(!Symbolic.accepts(&cell));
    }

    #[test]
    fn test_counter_apply_increments() {
        let cell = Counter.apply(0, Parity::Odd).unwrap();
        let cell = Counter.apply(cell, Parity::Even).unwrap();
        assert_eq!(cell, 2);
        assert!(Counter.accepts(&cell));
        assert_eq!(Counter.apply(u32::MAX, Parity::Odd), Err(CellRejection::Overflow));
    }

    #[test]
    fn test_counter_matches_on_parity() {
        assert!(Counter.matches(&3, &7));
        assert!(Counter.matches(&8, &2));
        assert!(!Counter.matches(&1, &2));
    }

    #[test]
    fn test_default_roles() {
        assert_eq!(Symbolic.default_role(), Mark::X);
        assert_eq!(Counter.default_role(), Parity::Odd);
    }

    #[test]
    fn test_regime_parses() {
        assert_eq!(Regime::from_str("symbolic").unwrap(), Regime::Symbolic);
        assert_eq!(Regime::Counter.to_string(), "counter");
        assert_eq!(Regime::default(), Regime::Counter);
    }
}

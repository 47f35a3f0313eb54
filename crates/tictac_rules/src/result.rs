//! End-of-game results.

use super::lines::lines;
use super::types::Coord;
use serde::{Deserialize, Serialize};

/// Outcome of a finished game.
///
/// A win carries the winner label and the N coordinates of the winning
/// line. A draw has no winner and an empty line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameResult<L> {
    winner: Option<L>,
    #[serde(default)]
    winning_line: Vec<Coord>,
}

impl<L: Copy + PartialEq> GameResult<L> {
    /// A win for `winner` along `winning_line`.
    pub fn win(winner: L, winning_line: Vec<Coord>) -> Self {
        Self {
            winner: Some(winner),
            winning_line,
        }
    }

    /// A draw.
    pub fn draw() -> Self {
        Self {
            winner: None,
            winning_line: Vec::new(),
        }
    }

    /// The winner, `None` for a draw.
    pub fn winner(&self) -> Option<L> {
        self.winner
    }

    /// Coordinates of the winning line, empty for a draw.
    pub fn winning_line(&self) -> &[Coord] {
        &self.winning_line
    }

    /// True when nobody won.
    pub fn is_draw(&self) -> bool {
        self.winner.is_none()
    }

    /// Whether the coordinate is part of the winning line.
    pub fn highlights(&self, at: Coord) -> bool {
        self.winning_line.contains(&at)
    }

    /// Checks the result against a board of side `size`.
    ///
    /// A draw must carry no line. A win must carry exactly the cells of
    /// one row, column or diagonal.
    pub fn is_well_formed(&self, size: usize) -> bool {
        if self.winner.is_none() {
            return self.winning_line.is_empty();
        }
        if self.winning_line.len() != size {
            return false;
        }
        let mut claimed = self.winning_line.clone();
        claimed.sort();
        lines(size).any(|line| {
            let mut cells: Vec<Coord> = line.coords().collect();
            cells.sort();
            cells == claimed
        })
    }
}

//! Game rules.
//!
//! Pure functions for judging and mutating boards under a [`MatchRule`].
//! Rules are separated from board storage so that the evaluator can be
//! reused by any collaborator holding a board snapshot.

pub mod draw;
pub mod win;

pub use draw::is_full;
pub use win::check_winner;

use crate::result::GameResult;
use crate::rule::{MatchRule, MoveError};
use crate::types::{Board, Coord};
use tracing::{debug, instrument};

/// Judges a board: a win, a draw, or `None` while the game goes on.
///
/// Lines are tried rows first, then columns, then the two diagonals; the
/// first satisfied line wins. A full board without a line is a draw.
#[instrument(skip(board, rule), fields(size = board.size()))]
pub fn evaluate<R: MatchRule>(board: &Board<R::Cell>, rule: &R) -> Option<GameResult<R::Label>> {
    if let Some(result) = check_winner(board, rule) {
        debug!(winner = ?result.winner(), "Winning line found");
        return Some(result);
    }
    if is_full(board, rule) {
        debug!("Board full without a line");
        return Some(GameResult::draw());
    }
    None
}

/// Plays `role` at `at`, following the rule's cell semantics.
#[instrument(skip(board, rule), fields(size = board.size()))]
pub fn apply_move<R: MatchRule>(
    board: &mut Board<R::Cell>,
    rule: &R,
    at: Coord,
    role: R::Label,
) -> Result<(), MoveError> {
    let cell = board.get(at).ok_or(MoveError::OutOfBounds(at))?;
    let next = rule.apply(cell, role).map_err(|rejection| rejection.at(at))?;
    board.set(at, next);
    Ok(())
}

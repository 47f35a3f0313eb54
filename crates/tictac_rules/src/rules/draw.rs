//! Draw detection.

use crate::rule::MatchRule;
use crate::types::Board;
use tracing::instrument;

/// Checks if every cell has been played.
///
/// A full board with no winning line is a draw.
#[instrument(skip(board, rule), fields(size = board.size()))]
pub fn is_full<R: MatchRule>(board: &Board<R::Cell>, rule: &R) -> bool {
    board.cells().iter().all(|cell| rule.occupied(cell))
}

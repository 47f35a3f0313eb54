//! Win detection: the first line whose cells all agree under the rule.

use crate::lines::lines;
use crate::result::GameResult;
use crate::rule::MatchRule;
use crate::types::Board;
use tracing::instrument;

/// Returns the first winning line in priority order, if any.
///
/// Rows are checked before columns, columns before the main diagonal,
/// and the main diagonal before the anti-diagonal.
#[instrument(skip(board, rule), fields(size = board.size()))]
pub fn check_winner<R: MatchRule>(board: &Board<R::Cell>, rule: &R) -> Option<GameResult<R::Label>> {
    let size = board.size();
    lines(size).find_map(|line| {
        let mut cells = line.coords().filter_map(|at| board.get(at));
        let first = cells.next()?;
        if !rule.occupied(&first) {
            return None;
        }
        let agreed = cells.all(|cell| rule.occupied(&cell) && rule.matches(&first, &cell));
        if !agreed {
            return None;
        }
        let winner = rule.label(&first)?;
        Some(GameResult::win(winner, line.coords().collect()))
    })
}

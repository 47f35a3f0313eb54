//! Pure line-matching game logic for tictac_arena.
//!
//! Boards are N×N grids of cells. A [`MatchRule`] decides what a cell
//! holds, when a line of cells agrees, and which label wins it:
//!
//! - [`Symbolic`]: classic write-once `X`/`O` marks.
//! - [`Counter`]: every move bumps a counter; lines win on shared parity
//!   and are labelled [`Parity::Even`] or [`Parity::Odd`].
//!
//! [`evaluate`] judges a snapshot: a win with its line, a draw, or nothing
//! while play continues. No I/O happens in this crate.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod lines;
mod result;
mod rule;
pub mod rules;
mod types;

pub use lines::{Line, LineKind, lines};
pub use result::GameResult;
pub use rule::{CellRejection, Counter, MatchRule, MoveError, Regime, Symbolic};
pub use rules::{apply_move, check_winner, evaluate, is_full};
pub use types::{Board, BoardShapeError, Coord, Mark, Parity, Square};

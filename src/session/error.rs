//! Session error types.

use super::state::Phase;
use crate::connection::TransportError;
use crate::protocol::RoomId;
use derive_more::{Display, Error, From};
use tictac_rules::Coord;

/// Why a local move proposal was not forwarded.
///
/// Rejections never reach the collaborator; the caller decides whether to
/// surface them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Error)]
pub enum MoveRejected {
    /// Phase is not `Playing`.
    #[display("no game in progress ({})", _0)]
    NotPlaying(#[error(not(source))] Phase),
    /// A result has already been announced.
    #[display("game is over")]
    GameOver,
    /// No role has been assigned yet.
    #[display("no role assigned")]
    Unassigned,
    /// Coordinate lies outside the board.
    #[display("position {} is off the board", _0)]
    OutOfBounds(#[error(not(source))] Coord),
    /// Target square is already marked.
    #[display("position {} is already occupied", _0)]
    Occupied(#[error(not(source))] Coord),
    /// A proposal for this square is still waiting for its echo.
    #[display("position {} is awaiting the server echo", _0)]
    AwaitingEcho(#[error(not(source))] Coord),
}

/// Session-level failures.
#[derive(Debug, Clone, Display, Error, From)]
pub enum SessionError {
    /// The collaborator refused the join (full room, invalid id).
    #[display("join to room {} rejected: {}", room, reason)]
    #[from(ignore)]
    JoinRejected {
        /// Room that refused.
        room: RoomId,
        /// Reason reported by the collaborator.
        reason: String,
    },
    /// The transport failed.
    #[display("{}", _0)]
    Transport(TransportError),
    /// The local guard refused a move; nothing was sent.
    #[display("move not sent: {}", _0)]
    Rejected(MoveRejected),
    /// Replay is only possible once a game has finished.
    #[display("replay unavailable while {}", _0)]
    #[from(ignore)]
    ReplayUnavailable(#[error(not(source))] Phase),
}

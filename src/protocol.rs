//! Event contract with the room collaborator.
//!
//! Every event travels as one JSON object `{"event": <name>, "data": <payload>}`.
//! Event names follow the collaborator's vocabulary (`room:join`,
//! `game:move`, `start-game`, ...). Transport-level `Connected` and
//! `Disconnected` never appear on the wire; connections synthesize them.

use crate::connection::TransportError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tictac_rules::{Board, Coord, GameResult, MatchRule};
use tracing::instrument;

/// Identifier of a shared room, e.g. `AB12CD34`.
pub type RoomId = String;

/// Events a client sends to the collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all_fields = "camelCase")]
pub enum ClientEvent {
    /// Ask for a seat in a room, creating it if needed.
    #[serde(rename = "room:join")]
    Join {
        /// Room to join.
        room_id: RoomId,
    },
    /// Best-effort notice that the client is leaving.
    #[serde(rename = "room:leave")]
    Leave {
        /// Room being left.
        room_id: RoomId,
    },
    /// Proposed move; the board is only updated by the echo.
    #[serde(rename = "game:move")]
    Move {
        /// Target row.
        row: usize,
        /// Target column.
        col: usize,
        /// Room the move belongs to.
        room_id: RoomId,
    },
    /// Request for a fresh game after a finished one.
    #[serde(rename = "game:reset")]
    Reset {
        /// Room to reset.
        room_id: RoomId,
    },
}

impl ClientEvent {
    /// Builds a move proposal.
    pub fn play(room_id: impl Into<RoomId>, at: Coord) -> Self {
        Self::Move {
            row: at.row,
            col: at.col,
            room_id: room_id.into(),
        }
    }

    /// Wire name of the event.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Join { .. } => "room:join",
            Self::Leave { .. } => "room:leave",
            Self::Move { .. } => "game:move",
            Self::Reset { .. } => "game:reset",
        }
    }

    /// Room the event addresses.
    pub fn room_id(&self) -> &str {
        match self {
            Self::Join { room_id }
            | Self::Leave { room_id }
            | Self::Move { room_id, .. }
            | Self::Reset { room_id } => room_id,
        }
    }
}

/// Acknowledgment of a `room:join` request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinAck<L> {
    /// Whether a seat was granted.
    pub ok: bool,
    /// Seat role when granted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<L>,
    /// Refusal reason when not granted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<L> JoinAck<L> {
    /// A granted seat.
    pub fn accepted(role: L) -> Self {
        Self {
            ok: true,
            role: Some(role),
            error: None,
        }
    }

    /// A refusal, e.g. a full room.
    pub fn rejected(reason: impl Into<String>) -> Self {
        Self {
            ok: false,
            role: None,
            error: Some(reason.into()),
        }
    }
}

/// Events a client receives, in receipt order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", bound = "")]
pub enum ServerEvent<R: MatchRule> {
    /// Transport came up.
    #[serde(skip)]
    Connected,
    /// Transport went away.
    #[serde(skip)]
    Disconnected,
    /// Answer to `room:join`.
    #[serde(rename = "room:joined")]
    Joined(JoinAck<R::Label>),
    /// Both seats are filled.
    #[serde(rename = "start-game")]
    StartGame,
    /// The opponent left; the client is alone in the room.
    #[serde(rename = "single-room")]
    SingleRoom,
    /// Authoritative board after a move.
    #[serde(rename = "game:move")]
    Board(Board<R::Cell>),
    /// Authoritative end of game.
    #[serde(rename = "game:result")]
    Result(GameResult<R::Label>),
    /// Authoritative reset broadcast.
    #[serde(rename = "game:reset")]
    Reset,
}

impl<R: MatchRule> ServerEvent<R> {
    /// Wire name of the event, or a transport marker.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Connected => "connect",
            Self::Disconnected => "disconnect",
            Self::Joined(_) => "room:joined",
            Self::StartGame => "start-game",
            Self::SingleRoom => "single-room",
            Self::Board(_) => "game:move",
            Self::Result(_) => "game:result",
            Self::Reset => "game:reset",
        }
    }
}

/// Frame encoding and decoding for the line-delimited JSON transport.
pub struct Protocol;

impl Protocol {
    /// Serializes an event into a single-line frame (no trailing newline).
    #[instrument(skip(event))]
    pub fn encode<T: Serialize>(event: &T) -> Result<String, TransportError> {
        Ok(serde_json::to_string(event)?)
    }

    /// Parses a single frame.
    #[instrument(skip(frame), fields(len = frame.len()))]
    pub fn decode<T: DeserializeOwned>(frame: &str) -> Result<T, TransportError> {
        Ok(serde_json::from_str(frame.trim())?)
    }
}

//! tictac_arena - room sessions for a two-player line-matching grid game
//!
//! Two clients share a room on a collaborator that assigns roles, orders
//! moves and broadcasts the authoritative board. This crate is the client
//! side of that arrangement.
//!
//! # Architecture
//!
//! - **Session**: state machine folding collaborator events into a local
//!   view of role, board, phase and result
//! - **Protocol**: JSON event frames exchanged with the collaborator
//! - **Connection**: transport seam with TCP and in-process implementations
//! - **Client**: driver that owns a session and its connection
//!
//! Board types and the win evaluator live in [`tictac_rules`] and are
//! re-exported here.
//!
//! # Example
//!
//! ```no_run
//! use tictac_arena::{LoopbackHub, RoomClient, Symbolic};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let hub = LoopbackHub::new(Symbolic, 3);
//! let client = RoomClient::join(hub.connect(), "AB12CD34", Symbolic, 3).await?;
//! println!("{}", client.session().status());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Private module declarations
mod client;
mod config;
mod connection;
mod protocol;
mod session;
mod terminal;

// Crate-level exports - Driver
pub use client::{Command, RoomClient};

// Crate-level exports - Configuration
pub use config::{ArenaConfig, ConfigError, MAX_BOARD_SIZE, MIN_BOARD_SIZE, SERVER_ENV};

// Crate-level exports - Transport
pub use connection::{
    Connection, LoopbackConnection, LoopbackHub, MAX_FRAME_LEN, TcpConnection, TransportError,
};

// Crate-level exports - Wire events
pub use protocol::{ClientEvent, JoinAck, Protocol, RoomId, ServerEvent};

// Crate-level exports - Session state machine
pub use session::{MoveRejected, Phase, Session, SessionError, Status, Transition};

// Crate-level exports - Terminal front end
pub use terminal::{parse_command, play_local, play_remote, render};

// Crate-level exports - Rules
pub use tictac_rules::{
    Board, Coord, Counter, GameResult, Mark, MatchRule, MoveError, Parity, Regime, Square, Symbolic,
    apply_move, evaluate,
};

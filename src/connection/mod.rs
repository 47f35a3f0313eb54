//! Connection seam between a room session and its collaborator.
//!
//! A [`Connection`] is an explicitly constructed, owned handle: the client
//! driver receives one at join time and closes it when it leaves. Two
//! implementations ship:
//!
//! - [`TcpConnection`] speaks line-delimited JSON frames to a remote server.
//! - [`LoopbackHub`] hands out in-process [`LoopbackConnection`]s for local
//!   play and tests.

mod loopback;
mod tcp;

pub use loopback::{LoopbackConnection, LoopbackHub};
pub use tcp::{MAX_FRAME_LEN, TcpConnection};

use crate::protocol::{ClientEvent, ServerEvent};
use derive_more::{Display, Error};
use tictac_rules::MatchRule;
use tracing::instrument;

/// Duplex event channel to the room collaborator.
#[async_trait::async_trait]
pub trait Connection<R: MatchRule>: Send {
    /// Sends one event.
    async fn send(&mut self, event: ClientEvent) -> Result<(), TransportError>;

    /// Waits for the next inbound event; `None` once the transport is gone.
    async fn recv(&mut self) -> Option<ServerEvent<R>>;

    /// Tears the transport down.
    async fn close(&mut self) -> Result<(), TransportError>;
}

/// Transport failure with location tracking.
#[derive(Debug, Clone, Display, Error)]
#[display("Transport error: {} at {}:{}", message, file, line)]
pub struct TransportError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl TransportError {
    /// Creates a new transport error with caller location tracking.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }
}

impl From<std::io::Error> for TransportError {
    #[track_caller]
    fn from(err: std::io::Error) -> Self {
        Self::new(format!("I/O error: {}", err))
    }
}

impl From<serde_json::Error> for TransportError {
    #[track_caller]
    fn from(err: serde_json::Error) -> Self {
        Self::new(format!("Codec error: {}", err))
    }
}

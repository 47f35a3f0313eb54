//! Line-delimited JSON over TCP.

use super::{Connection, TransportError};
use crate::protocol::{ClientEvent, Protocol, ServerEvent};
use futures::StreamExt;
use std::marker::PhantomData;
use std::net::SocketAddr;
use tictac_rules::MatchRule;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio_util::codec::{FramedRead, LinesCodec, LinesCodecError};
use tracing::{debug, info, instrument, warn};

/// Longest inbound frame accepted, in bytes. Longer lines are discarded.
pub const MAX_FRAME_LEN: usize = 64 * 1024;

/// Connection to a remote room server, one JSON frame per line.
pub struct TcpConnection<R: MatchRule> {
    peer: SocketAddr,
    reader: FramedRead<OwnedReadHalf, LinesCodec>,
    writer: OwnedWriteHalf,
    open: bool,
    // The codec yields one `None` right after an error; that is not EOF.
    resyncing: bool,
    _rule: PhantomData<fn() -> R>,
}

impl<R: MatchRule> TcpConnection<R> {
    /// Connects to `addr` (e.g. `127.0.0.1:3000`).
    #[instrument]
    pub async fn connect(addr: &str) -> Result<Self, TransportError> {
        let stream = TcpStream::connect(addr).await?;
        Self::from_stream(stream)
    }

    /// Wraps an already connected stream.
    #[instrument(skip(stream))]
    pub fn from_stream(stream: TcpStream) -> Result<Self, TransportError> {
        let peer = stream.peer_addr()?;
        stream.set_nodelay(true)?;
        let (read, writer) = stream.into_split();
        info!(%peer, "Connected to room server");
        Ok(Self {
            peer,
            reader: FramedRead::new(read, LinesCodec::new_with_max_length(MAX_FRAME_LEN)),
            writer,
            open: true,
            resyncing: false,
            _rule: PhantomData,
        })
    }

    /// Remote address.
    pub fn peer(&self) -> SocketAddr {
        self.peer
    }
}

#[async_trait::async_trait]
impl<R: MatchRule> Connection<R> for TcpConnection<R> {
    #[instrument(skip(self, event), fields(peer = %self.peer, event = event.name()))]
    async fn send(&mut self, event: ClientEvent) -> Result<(), TransportError> {
        if !self.open {
            return Err(TransportError::new("connection is closed"));
        }
        let mut frame = Protocol::encode(&event)?;
        frame.push('\n');
        self.writer.write_all(frame.as_bytes()).await?;
        self.writer.flush().await?;
        debug!("Frame sent");
        Ok(())
    }

    #[instrument(skip(self), fields(peer = %self.peer))]
    async fn recv(&mut self) -> Option<ServerEvent<R>> {
        while self.open {
            match self.reader.next().await {
                Some(Ok(line)) => {
                    self.resyncing = false;
                    if line.trim().is_empty() {
                        continue;
                    }
                    match Protocol::decode::<ServerEvent<R>>(&line) {
                        Ok(event) => {
                            debug!(event = event.name(), "Frame received");
                            return Some(event);
                        }
                        Err(e) => warn!(error = %e, "Dropping undecodable frame"),
                    }
                }
                Some(Err(LinesCodecError::MaxLineLengthExceeded)) => {
                    warn!(limit = MAX_FRAME_LEN, "Dropping oversized frame");
                    self.resyncing = true;
                }
                Some(Err(LinesCodecError::Io(e))) => {
                    warn!(error = %e, "Read failed");
                    self.open = false;
                }
                None if self.resyncing => self.resyncing = false,
                None => {
                    info!("Server closed the connection");
                    self.open = false;
                }
            }
        }
        None
    }

    #[instrument(skip(self), fields(peer = %self.peer))]
    async fn close(&mut self) -> Result<(), TransportError> {
        if !self.open {
            return Ok(());
        }
        self.open = false;
        self.writer.shutdown().await?;
        info!("Connection closed");
        Ok(())
    }
}

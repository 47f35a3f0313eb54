//! Room client driver: owns one session and its connection.

use crate::connection::{Connection, TransportError};
use crate::protocol::{ClientEvent, RoomId, ServerEvent};
use crate::session::{Session, SessionError, Transition};
use tictac_rules::{Coord, MatchRule};
use tokio::sync::mpsc;
use tracing::{debug, info, instrument, warn};

/// Local commands fed to [`RoomClient::run`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Propose a move.
    Move(Coord),
    /// Start over after a finished game.
    Replay,
    /// Leave the room and stop.
    Leave,
}

/// Drives a [`Session`] over a [`Connection`].
///
/// Events are handled one at a time in receipt order. Moves are never
/// applied locally; the board only changes when the collaborator echoes it.
pub struct RoomClient<R: MatchRule, C: Connection<R>> {
    session: Session<R>,
    conn: C,
}

impl<R: MatchRule, C: Connection<R>> RoomClient<R, C> {
    /// Joins `room` over `conn` and waits for the acknowledgment.
    ///
    /// Events arriving before the acknowledgment are applied in order. A
    /// refusal closes the connection and is returned as
    /// [`SessionError::JoinRejected`]; there is no retry.
    #[instrument(skip(conn, room, rule), fields(room = tracing::field::Empty))]
    pub async fn join(
        mut conn: C,
        room: impl Into<RoomId>,
        rule: R,
        size: usize,
    ) -> Result<Self, SessionError> {
        let room = room.into();
        tracing::Span::current().record("room", room.as_str());

        let mut session = Session::new(&room, rule, size);
        session.apply(ServerEvent::Connected)?;
        conn.send(ClientEvent::Join {
            room_id: room.clone(),
        })
        .await?;

        loop {
            let Some(event) = conn.recv().await else {
                session.apply(ServerEvent::Disconnected)?;
                return Err(TransportError::new("connection closed before join was acknowledged").into());
            };
            let is_ack = matches!(event, ServerEvent::Joined(_));
            match session.apply(event) {
                Ok(_) if is_ack => break,
                Ok(_) => continue,
                Err(e) => {
                    if let Err(close) = conn.close().await {
                        debug!(error = %close, "Close after rejected join failed");
                    }
                    return Err(e);
                }
            }
        }

        info!(role = ?session.role(), "Joined room");
        Ok(Self { session, conn })
    }

    /// Current session view.
    pub fn session(&self) -> &Session<R> {
        &self.session
    }

    /// Validates and forwards a move.
    ///
    /// A locally refused move produces no outbound event and is returned as
    /// [`SessionError::Rejected`].
    #[instrument(skip(self))]
    pub async fn submit_move(&mut self, at: Coord) -> Result<(), SessionError> {
        let event = self.session.submit_move(at)?;
        if let Err(e) = self.conn.send(event).await {
            self.session.release(at);
            return Err(e.into());
        }
        Ok(())
    }

    /// Resets locally and asks the collaborator for a reset.
    ///
    /// The local reset stands even if the request cannot be sent.
    #[instrument(skip(self))]
    pub async fn replay(&mut self) -> Result<(), SessionError> {
        let request = self.session.replay()?;
        if let Err(e) = self.conn.send(request).await {
            warn!(error = %e, "Reset request not delivered");
        }
        Ok(())
    }

    /// Waits for and applies the next inbound event.
    pub async fn next_event(&mut self) -> Result<Transition, SessionError> {
        let event = self.conn.recv().await.unwrap_or(ServerEvent::Disconnected);
        self.session.apply(event)
    }

    /// Sends `room:leave` best-effort and closes the connection.
    #[instrument(skip(self), fields(room = %self.session.room()))]
    pub async fn leave(&mut self) {
        if let Err(e) = self.conn.send(self.session.leave_event()).await {
            debug!(error = %e, "Leave notice not delivered");
        }
        if let Err(e) = self.conn.close().await {
            debug!(error = %e, "Close failed");
        }
        self.session.apply(ServerEvent::Disconnected).ok();
        info!("Left room");
    }

    /// Runs the event loop until the player leaves or the transport drops.
    ///
    /// Every state change is published to `updates`.
    #[instrument(skip_all, fields(room = %self.session.room()))]
    pub async fn run(
        mut self,
        mut commands: mpsc::Receiver<Command>,
        updates: mpsc::UnboundedSender<Session<R>>,
    ) -> Session<R> {
        let _ = updates.send(self.session.clone());

        loop {
            tokio::select! {
                command = commands.recv() => match command {
                    Some(Command::Move(at)) => match self.submit_move(at).await {
                        Ok(()) => {}
                        Err(SessionError::Rejected(reason)) => debug!(%reason, "Move not forwarded"),
                        Err(e) => {
                            warn!(error = %e, "Move failed, leaving room");
                            self.leave().await;
                            break;
                        }
                    },
                    Some(Command::Replay) => match self.replay().await {
                        Ok(()) => {
                            let _ = updates.send(self.session.clone());
                        }
                        Err(e) => debug!(error = %e, "Replay ignored"),
                    },
                    Some(Command::Leave) | None => {
                        self.leave().await;
                        break;
                    }
                },
                event = self.conn.recv() => {
                    let event = event.unwrap_or(ServerEvent::Disconnected);
                    match self.session.apply(event) {
                        Ok(Transition::Applied) => {
                            let _ = updates.send(self.session.clone());
                        }
                        Ok(Transition::Ignored) => {}
                        Ok(Transition::Disconnected) => {
                            info!("Transport dropped, stopping");
                            let _ = updates.send(self.session.clone());
                            break;
                        }
                        Err(e) => warn!(error = %e, "Event rejected"),
                    }
                }
            }
        }

        self.session
    }
}

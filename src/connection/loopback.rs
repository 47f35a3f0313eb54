//! In-process room collaborator for local play and tests.
//!
//! The hub keeps one authoritative board per room, seats at most two
//! connections, lets the seats move in turn and broadcasts every echo and
//! result to both seats. The first seat moves first.

use super::{Connection, TransportError};
use crate::protocol::{ClientEvent, JoinAck, RoomId, ServerEvent};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tictac_rules::{Board, Coord, GameResult, MatchRule, apply_move, evaluate};
use tokio::sync::{Mutex, mpsc};
use tracing::{debug, info, instrument, warn};

type Outbox<R> = mpsc::UnboundedSender<ServerEvent<R>>;

#[derive(Debug, derive_new::new)]
struct Seat<R: MatchRule> {
    id: u64,
    role: R::Label,
    outbox: Outbox<R>,
}

#[derive(Debug)]
struct Room<R: MatchRule> {
    board: Board<R::Cell>,
    seats: [Option<Seat<R>>; 2],
    to_move: R::Label,
    result: Option<GameResult<R::Label>>,
}

impl<R: MatchRule> Room<R> {
    fn new(rule: &R, size: usize) -> Self {
        Self {
            board: Board::new(size),
            seats: [None, None],
            to_move: rule.roles()[0],
            result: None,
        }
    }

    fn seat_of(&self, id: u64) -> Option<&Seat<R>> {
        self.seats.iter().flatten().find(|seat| seat.id == id)
    }

    fn occupants(&self) -> usize {
        self.seats.iter().flatten().count()
    }

    fn restart(&mut self, rule: &R) {
        self.board.reset();
        self.result = None;
        self.to_move = rule.roles()[0];
    }

    fn broadcast(&self, event: ServerEvent<R>) {
        for seat in self.seats.iter().flatten() {
            // Departed seats are evicted before the next join or move.
            let _ = seat.outbox.send(event.clone());
        }
    }

    /// Frees seat `index`. The one left behind falls back to the first seat
    /// and is told it is alone. Returns whether the room is now empty.
    fn vacate(&mut self, index: usize, rule: &R) -> bool {
        self.seats[index] = None;
        let remaining = self.seats.iter_mut().find_map(Option::take);
        match remaining {
            Some(mut remaining) => {
                remaining.role = rule.default_role();
                let _ = remaining.outbox.send(ServerEvent::SingleRoom);
                self.seats = [Some(remaining), None];
                self.restart(rule);
                debug!("Remaining seat notified");
                false
            }
            None => true,
        }
    }

    /// Frees seats whose connection was dropped without leaving.
    fn evict_departed(&mut self, rule: &R) -> bool {
        let mut empty = self.occupants() == 0;
        while let Some(index) = self
            .seats
            .iter()
            .position(|seat| seat.as_ref().is_some_and(|s| s.outbox.is_closed()))
        {
            warn!(index, "Evicting departed seat");
            empty = self.vacate(index, rule);
        }
        empty
    }
}

/// Shared in-process collaborator. Clones share the same room table.
#[derive(Debug, Clone)]
pub struct LoopbackHub<R: MatchRule> {
    rule: R,
    size: usize,
    rooms: Arc<Mutex<HashMap<RoomId, Room<R>>>>,
    next_id: Arc<AtomicU64>,
}

impl<R: MatchRule> LoopbackHub<R> {
    /// Creates a hub whose rooms use boards of side `size`.
    #[instrument]
    pub fn new(rule: R, size: usize) -> Self {
        info!("Creating loopback hub");
        Self {
            rule,
            size,
            rooms: Arc::new(Mutex::new(HashMap::new())),
            next_id: Arc::new(AtomicU64::new(1)),
        }
    }

    /// Opens a new connection to the hub.
    #[instrument(skip(self))]
    pub fn connect(&self) -> LoopbackConnection<R> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (outbox, inbox) = mpsc::unbounded_channel();
        // Connected is the first thing every connection sees.
        let _ = outbox.send(ServerEvent::Connected);
        debug!(connection = id, "Loopback connection opened");
        LoopbackConnection {
            hub: self.clone(),
            id,
            outbox,
            inbox,
            room: None,
            open: true,
        }
    }

    /// Number of seated connections in a room.
    pub async fn occupants(&self, room_id: &str) -> usize {
        let mut rooms = self.rooms.lock().await;
        let Some(room) = rooms.get_mut(room_id) else {
            return 0;
        };
        if room.evict_departed(&self.rule) {
            rooms.remove(room_id);
            return 0;
        }
        room.occupants()
    }

    /// Role expected to move next, while a game is running in the room.
    pub async fn to_move(&self, room_id: &str) -> Option<R::Label> {
        self.rooms
            .lock()
            .await
            .get(room_id)
            .filter(|room| room.occupants() == 2 && room.result.is_none())
            .map(|room| room.to_move)
    }

    #[instrument(skip(self, outbox))]
    async fn join(&self, id: u64, room_id: &str, outbox: &Outbox<R>) -> bool {
        if room_id.trim().is_empty() {
            warn!("Join refused: empty room id");
            let _ = outbox.send(ServerEvent::Joined(JoinAck::rejected("invalid room id")));
            return false;
        }

        let mut rooms = self.rooms.lock().await;
        let room = rooms
            .entry(room_id.to_string())
            .or_insert_with(|| Room::new(&self.rule, self.size));
        if room.evict_departed(&self.rule) {
            *room = Room::new(&self.rule, self.size);
        }

        if let Some(seat) = room.seat_of(id) {
            debug!(role = %seat.role, "Connection already seated");
            let _ = outbox.send(ServerEvent::Joined(JoinAck::accepted(seat.role)));
            return true;
        }

        let Some(index) = room.seats.iter().position(Option::is_none) else {
            warn!("Join refused: room is full");
            let _ = outbox.send(ServerEvent::Joined(JoinAck::rejected("room is full")));
            return false;
        };

        let role = self.rule.roles()[index];
        room.seats[index] = Some(Seat::new(id, role, outbox.clone()));
        info!(%role, "Seat assigned");
        let _ = outbox.send(ServerEvent::Joined(JoinAck::accepted(role)));

        if room.occupants() == 2 {
            info!("Both seats filled, starting game");
            room.restart(&self.rule);
            room.broadcast(ServerEvent::StartGame);
        }
        true
    }

    #[instrument(skip(self))]
    async fn leave(&self, id: u64, room_id: &str) {
        let mut rooms = self.rooms.lock().await;
        let Some(room) = rooms.get_mut(room_id) else {
            return;
        };
        let Some(index) = room
            .seats
            .iter()
            .position(|seat| seat.as_ref().is_some_and(|s| s.id == id))
        else {
            return;
        };
        info!("Seat released");
        if room.vacate(index, &self.rule) {
            rooms.remove(room_id);
            debug!("Room emptied and removed");
        }
    }

    #[instrument(skip(self))]
    async fn play(&self, id: u64, room_id: &str, at: Coord) {
        let mut rooms = self.rooms.lock().await;
        let Some(room) = rooms.get_mut(room_id) else {
            debug!("Move for unknown room ignored");
            return;
        };
        room.evict_departed(&self.rule);
        let Some(role) = room.seat_of(id).map(|seat| seat.role) else {
            debug!("Move from unseated connection ignored");
            return;
        };
        if room.occupants() < 2 || room.result.is_some() {
            debug!("Move outside of a running game ignored");
            return;
        }
        if role != room.to_move {
            debug!(%role, to_move = %room.to_move, "Move out of turn ignored");
            return;
        }
        if let Err(e) = apply_move(&mut room.board, &self.rule, at, role) {
            debug!(error = %e, "Illegal move ignored");
            return;
        }

        room.to_move = self.rule.roles()[if role == self.rule.roles()[0] { 1 } else { 0 }];
        room.broadcast(ServerEvent::Board(room.board.clone()));

        if let Some(result) = evaluate(&room.board, &self.rule) {
            info!(winner = ?result.winner(), "Game finished");
            room.result = Some(result.clone());
            room.broadcast(ServerEvent::Result(result));
        }
    }

    #[instrument(skip(self))]
    async fn reset(&self, id: u64, room_id: &str) {
        let mut rooms = self.rooms.lock().await;
        let Some(room) = rooms.get_mut(room_id) else {
            return;
        };
        if room.seat_of(id).is_none() || room.result.is_none() {
            debug!("Reset outside of a finished game ignored");
            return;
        }
        room.restart(&self.rule);
        room.broadcast(ServerEvent::Reset);
        info!("Room reset");
    }
}

/// One client's connection to a [`LoopbackHub`].
#[derive(Debug)]
pub struct LoopbackConnection<R: MatchRule> {
    hub: LoopbackHub<R>,
    id: u64,
    outbox: Outbox<R>,
    inbox: mpsc::UnboundedReceiver<ServerEvent<R>>,
    room: Option<RoomId>,
    open: bool,
}

#[async_trait::async_trait]
impl<R: MatchRule> Connection<R> for LoopbackConnection<R> {
    #[instrument(skip(self, event), fields(connection = self.id, event = event.name()))]
    async fn send(&mut self, event: ClientEvent) -> Result<(), TransportError> {
        if !self.open {
            return Err(TransportError::new("connection is closed"));
        }
        match event {
            ClientEvent::Join { room_id } => {
                if self.hub.join(self.id, &room_id, &self.outbox).await {
                    self.room = Some(room_id);
                }
            }
            ClientEvent::Leave { room_id } => {
                self.hub.leave(self.id, &room_id).await;
                if self.room.as_deref() == Some(room_id.as_str()) {
                    self.room = None;
                }
            }
            ClientEvent::Move { row, col, room_id } => {
                self.hub.play(self.id, &room_id, Coord::new(row, col)).await;
            }
            ClientEvent::Reset { room_id } => {
                self.hub.reset(self.id, &room_id).await;
            }
        }
        Ok(())
    }

    async fn recv(&mut self) -> Option<ServerEvent<R>> {
        if !self.open {
            return None;
        }
        self.inbox.recv().await
    }

    #[instrument(skip(self), fields(connection = self.id))]
    async fn close(&mut self) -> Result<(), TransportError> {
        if !self.open {
            return Ok(());
        }
        if let Some(room_id) = self.room.take() {
            self.hub.leave(self.id, &room_id).await;
        }
        self.open = false;
        self.inbox.close();
        debug!("Loopback connection closed");
        Ok(())
    }
}

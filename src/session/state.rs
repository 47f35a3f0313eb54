//! Local view of a room: role, board, phase and result.

use super::error::{MoveRejected, SessionError};
use crate::protocol::{ClientEvent, JoinAck, RoomId, ServerEvent};
use derive_getters::Getters;
use std::collections::HashSet;
use std::fmt;
use tictac_rules::{Board, Coord, GameResult, MatchRule, evaluate};
use tracing::{debug, info, instrument, warn};

/// Game lifecycle phase.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, strum::Display, strum::EnumString, strum::EnumIter,
)]
pub enum Phase {
    /// Seated, waiting for a start signal.
    #[default]
    Waiting,
    /// Moves are accepted.
    Playing,
    /// A result has been announced.
    Finished,
}

/// Status line shown to the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status<L> {
    /// `Waiting for opponent...`
    WaitingForOpponent,
    /// `The game begins!`
    GameBegins,
    /// `You are X player`
    InPlay(L),
    /// `You win`
    YouWin,
    /// `You lose`
    YouLose,
    /// `It's a draw`
    Draw,
}

impl<L: fmt::Display> fmt::Display for Status<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::WaitingForOpponent => write!(f, "Waiting for opponent..."),
            Status::GameBegins => write!(f, "The game begins!"),
            Status::InPlay(role) => write!(f, "You are {} player", role),
            Status::YouWin => write!(f, "You win"),
            Status::YouLose => write!(f, "You lose"),
            Status::Draw => write!(f, "It's a draw"),
        }
    }
}

/// What an inbound event did to the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// State changed.
    Applied,
    /// Event was stale, duplicate or malformed and left no trace.
    Ignored,
    /// The transport went away.
    Disconnected,
}

/// One client's session in one room.
///
/// The board and result are only ever replaced by collaborator events;
/// local move submission never touches them.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct Session<R: MatchRule> {
    /// Room this session belongs to.
    room: RoomId,
    /// Active matching rule.
    rule: R,
    /// Assigned role, if any.
    role: Option<R::Label>,
    /// Last authoritative board.
    board: Board<R::Cell>,
    /// Lifecycle phase.
    phase: Phase,
    /// Announced result.
    result: Option<GameResult<R::Label>>,
    /// Whether a second player is seated.
    opponent_present: bool,
    /// Whether the transport is up.
    connected: bool,
    #[getter(skip)]
    awaiting_echo: HashSet<Coord>,
}

impl<R: MatchRule> Session<R> {
    /// Creates an unassigned, waiting session with an empty board.
    #[instrument(skip(room), fields(room = %room.as_ref()))]
    pub fn new(room: impl AsRef<str>, rule: R, size: usize) -> Self {
        debug!("Creating session");
        Self {
            room: room.as_ref().to_string(),
            rule,
            role: None,
            board: Board::new(size),
            phase: Phase::Waiting,
            result: None,
            opponent_present: false,
            connected: false,
            awaiting_echo: HashSet::new(),
        }
    }

    /// Creates a session that has self-assigned the default role.
    pub fn solo(room: impl AsRef<str>, rule: R, size: usize) -> Self {
        let mut session = Self::new(room, rule, size);
        session.role = Some(rule.default_role());
        session
    }

    /// Whether a proposal on `at` is still waiting for its echo.
    pub fn is_awaiting(&self, at: Coord) -> bool {
        self.awaiting_echo.contains(&at)
    }

    /// Feeds one inbound event through the state machine.
    #[instrument(skip(self, event), fields(room = %self.room, event = event.name(), phase = ?self.phase))]
    pub fn apply(&mut self, event: ServerEvent<R>) -> Result<Transition, SessionError> {
        match event {
            ServerEvent::Connected => {
                self.connected = true;
                Ok(Transition::Applied)
            }
            ServerEvent::Disconnected => {
                info!("Transport gone");
                self.connected = false;
                self.awaiting_echo.clear();
                Ok(Transition::Disconnected)
            }
            ServerEvent::Joined(ack) => self.on_joined(ack),
            ServerEvent::StartGame => Ok(self.on_start()),
            ServerEvent::SingleRoom => {
                info!("Opponent left, waiting alone");
                self.role = Some(self.rule.default_role());
                self.opponent_present = false;
                self.clear();
                self.phase = Phase::Waiting;
                Ok(Transition::Applied)
            }
            ServerEvent::Board(board) => Ok(self.on_board(board)),
            ServerEvent::Result(result) => Ok(self.on_result(result)),
            ServerEvent::Reset => {
                info!("Collaborator reset the room");
                self.restart();
                Ok(Transition::Applied)
            }
        }
    }

    fn on_joined(&mut self, ack: JoinAck<R::Label>) -> Result<Transition, SessionError> {
        if !ack.ok {
            let reason = ack.error.unwrap_or_else(|| "join refused".to_string());
            warn!(%reason, "Join rejected");
            return Err(SessionError::JoinRejected {
                room: self.room.clone(),
                reason,
            });
        }
        let role = ack.role.unwrap_or_else(|| self.rule.default_role());
        info!(%role, "Role assigned");
        self.role = Some(role);
        Ok(Transition::Applied)
    }

    fn on_start(&mut self) -> Transition {
        self.opponent_present = true;
        match self.phase {
            Phase::Playing => {
                debug!("Duplicate start signal");
                Transition::Ignored
            }
            Phase::Finished => {
                self.clear();
                self.phase = Phase::Playing;
                Transition::Applied
            }
            Phase::Waiting => {
                info!("The game begins");
                self.phase = Phase::Playing;
                Transition::Applied
            }
        }
    }

    fn on_board(&mut self, board: Board<R::Cell>) -> Transition {
        if board.size() != self.board.size() {
            warn!(
                expected = self.board.size(),
                got = board.size(),
                "Discarding board echo with wrong dimensions"
            );
            return Transition::Ignored;
        }
        self.board = board;
        self.awaiting_echo.clear();
        Transition::Applied
    }

    fn on_result(&mut self, result: GameResult<R::Label>) -> Transition {
        if !result.is_well_formed(self.board.size()) {
            warn!(?result, "Discarding malformed result");
            return Transition::Ignored;
        }
        let local = self.local_evaluation();
        if local.as_ref() != Some(&result) {
            warn!(remote = ?result, local = ?local, "Local evaluation disagrees with result");
        }
        info!(winner = ?result.winner(), "Game finished");
        self.result = Some(result);
        self.phase = Phase::Finished;
        self.awaiting_echo.clear();
        Transition::Applied
    }

    /// Validates a local move and turns it into an outbound proposal.
    ///
    /// The board is not mutated. In regimes where a cell is written once, the
    /// cell is locked until the next board echo.
    #[instrument(skip(self), fields(room = %self.room, phase = ?self.phase))]
    pub fn submit_move(&mut self, at: Coord) -> Result<ClientEvent, MoveRejected> {
        if self.phase != Phase::Playing {
            return Err(MoveRejected::NotPlaying(self.phase));
        }
        if self.result.is_some() {
            return Err(MoveRejected::GameOver);
        }
        if self.role.is_none() {
            return Err(MoveRejected::Unassigned);
        }
        let cell = self.board.get(at).ok_or(MoveRejected::OutOfBounds(at))?;
        if !self.rule.accepts(&cell) {
            return Err(MoveRejected::Occupied(at));
        }
        if !self.rule.repeatable() && !self.awaiting_echo.insert(at) {
            return Err(MoveRejected::AwaitingEcho(at));
        }
        debug!(row = at.row, col = at.col, "Move proposed");
        Ok(ClientEvent::play(self.room.clone(), at))
    }

    /// Drops the advisory lock on `at`, e.g. after a failed send.
    pub fn release(&mut self, at: Coord) {
        self.awaiting_echo.remove(&at);
    }

    /// Local replay after a finished game.
    ///
    /// Returns the reset request to forward to the collaborator.
    #[instrument(skip(self), fields(room = %self.room))]
    pub fn replay(&mut self) -> Result<ClientEvent, SessionError> {
        if self.phase != Phase::Finished {
            return Err(SessionError::ReplayUnavailable(self.phase));
        }
        self.restart();
        info!(phase = %self.phase, "Replay");
        Ok(ClientEvent::Reset {
            room_id: self.room.clone(),
        })
    }

    /// Outbound notice for leaving the room.
    pub fn leave_event(&self) -> ClientEvent {
        ClientEvent::Leave {
            room_id: self.room.clone(),
        }
    }

    /// Projects the current state onto a status line.
    pub fn status(&self) -> Status<R::Label> {
        match (self.phase, &self.result) {
            (Phase::Waiting, _) => Status::WaitingForOpponent,
            (Phase::Finished, Some(result)) => match result.winner() {
                None => Status::Draw,
                Some(winner) if Some(winner) == self.role => Status::YouWin,
                Some(_) => Status::YouLose,
            },
            (_, _) => match self.role {
                Some(role) if !self.board.is_pristine() => Status::InPlay(role),
                _ => Status::GameBegins,
            },
        }
    }

    /// Runs the evaluator over the current board.
    pub fn local_evaluation(&self) -> Option<GameResult<R::Label>> {
        evaluate(&self.board, &self.rule)
    }

    fn clear(&mut self) {
        self.board.reset();
        self.result = None;
        self.awaiting_echo.clear();
    }

    fn restart(&mut self) {
        self.clear();
        self.phase = if self.opponent_present {
            Phase::Playing
        } else {
            Phase::Waiting
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tictac_rules::{Counter, Mark, Parity, Square, Symbolic};

    fn playing_symbolic() -> Session<Symbolic> {
        let mut session = Session::new("ROOM", Symbolic, 3);
        session.apply(ServerEvent::Joined(JoinAck::accepted(Mark::X))).unwrap();
        session.apply(ServerEvent::StartGame).unwrap();
        session
    }

    #[test]
    fn test_join_then_start() {
        let mut session = Session::new("ROOM", Counter, 5);
        assert_eq!(session.status(), Status::WaitingForOpponent);

        session.apply(ServerEvent::Joined(JoinAck::accepted(Parity::Even))).unwrap();
        assert_eq!(*session.role(), Some(Parity::Even));
        assert_eq!(*session.phase(), Phase::Waiting);

        session.apply(ServerEvent::StartGame).unwrap();
        assert_eq!(*session.phase(), Phase::Playing);
        assert_eq!(session.status().to_string(), "The game begins!");
        assert_eq!(session.apply(ServerEvent::StartGame).unwrap(), Transition::Ignored);
    }

    #[test]
    fn test_join_rejected() {
        let mut session: Session<Symbolic> = Session::new("FULL", Symbolic, 3);
        let err = session
            .apply(ServerEvent::Joined(JoinAck::rejected("room is full")))
            .unwrap_err();
        assert!(matches!(err, SessionError::JoinRejected { ref reason, .. } if reason == "room is full"));
        assert_eq!(*session.role(), None);
    }

    #[test]
    fn test_submit_requires_playing() {
        let mut session = Session::new("ROOM", Symbolic, 3);
        assert_eq!(
            session.submit_move(Coord::new(0, 0)),
            Err(MoveRejected::NotPlaying(Phase::Waiting))
        );
    }

    #[test]
    fn test_submit_does_not_touch_board() {
        let mut session = playing_symbolic();
        let event = session.submit_move(Coord::new(1, 2)).unwrap();
        assert_eq!(event, ClientEvent::play("ROOM", Coord::new(1, 2)));
        assert!(session.board().is_pristine());
        assert!(session.is_awaiting(Coord::new(1, 2)));
    }

    #[test]
    fn test_out_of_bounds_rejected() {
        let mut session = playing_symbolic();
        assert_eq!(
            session.submit_move(Coord::new(3, 0)),
            Err(MoveRejected::OutOfBounds(Coord::new(3, 0)))
        );
    }

    #[test]
    fn test_occupied_rejected_after_echo() {
        let mut session = playing_symbolic();
        let mut board = Board::new(3);
        board.set(Coord::new(0, 0), Square::Occupied(Mark::O));
        session.apply(ServerEvent::Board(board)).unwrap();
        assert_eq!(
            session.submit_move(Coord::new(0, 0)),
            Err(MoveRejected::Occupied(Coord::new(0, 0)))
        );
        assert_eq!(session.status(), Status::InPlay(Mark::X));
        assert_eq!(session.status().to_string(), "You are X player");
    }

    #[test]
    fn test_wrong_size_echo_discarded() {
        let mut session = playing_symbolic();
        let board: Board<Square> = Board::new(4);
        assert_eq!(session.apply(ServerEvent::Board(board)).unwrap(), Transition::Ignored);
        assert_eq!(session.board().size(), 3);
    }

    #[test]
    fn test_result_finishes_and_blocks_moves() {
        let mut session = playing_symbolic();
        let line = vec![Coord::new(0, 0), Coord::new(0, 1), Coord::new(0, 2)];
        session
            .apply(ServerEvent::Result(GameResult::win(Mark::O, line)))
            .unwrap();
        assert_eq!(*session.phase(), Phase::Finished);
        assert_eq!(session.status(), Status::YouLose);
        assert_eq!(session.submit_move(Coord::new(1, 1)), Err(MoveRejected::NotPlaying(Phase::Finished)));
    }

    #[test]
    fn test_draw_status() {
        let mut session = playing_symbolic();
        session.apply(ServerEvent::Result(GameResult::draw())).unwrap();
        assert_eq!(session.status().to_string(), "It's a draw");
    }

    #[test]
    fn test_replay_only_when_finished() {
        let mut session = playing_symbolic();
        assert!(matches!(
            session.replay(),
            Err(SessionError::ReplayUnavailable(Phase::Playing))
        ));
    }

    #[test]
    fn test_remote_reset_without_opponent_waits() {
        let mut session = Session::solo("ROOM", Counter, 3);
        session.apply(ServerEvent::Reset).unwrap();
        assert_eq!(*session.phase(), Phase::Waiting);
    }

    #[test]
    fn test_disconnect_is_reported() {
        let mut session = Session::solo("ROOM", Counter, 3);
        session.apply(ServerEvent::Connected).unwrap();
        assert!(*session.connected());
        assert_eq!(session.apply(ServerEvent::Disconnected).unwrap(), Transition::Disconnected);
        assert!(!*session.connected());
    }
}

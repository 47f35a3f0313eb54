//! Tests for the room session state machine, without a transport.

use tictac_arena::{
    Board, ClientEvent, Coord, Counter, GameResult, JoinAck, Mark, MoveRejected, Phase, ServerEvent,
    Session, Square, Status, Symbolic, Transition,
};

fn started(role: Mark) -> Session<Symbolic> {
    let mut session = Session::new("AB12CD34", Symbolic, 3);
    session.apply(ServerEvent::Joined(JoinAck::accepted(role))).unwrap();
    session.apply(ServerEvent::StartGame).unwrap();
    session
}

fn top_row() -> Vec<Coord> {
    vec![Coord::new(0, 0), Coord::new(0, 1), Coord::new(0, 2)]
}

#[test]
fn test_replay_restores_fresh_game_for_any_result() {
    let results = [
        GameResult::win(Mark::X, top_row()),
        GameResult::win(Mark::O, top_row()),
        GameResult::draw(),
    ];
    for result in results {
        let mut session = started(Mark::X);
        let mut board = Board::new(3);
        board.set(Coord::new(2, 2), Square::Occupied(Mark::O));
        session.apply(ServerEvent::Board(board)).unwrap();
        session.apply(ServerEvent::Result(result)).unwrap();
        assert_eq!(*session.phase(), Phase::Finished);

        let request = session.replay().unwrap();
        assert_eq!(
            request,
            ClientEvent::Reset {
                room_id: "AB12CD34".into()
            }
        );
        assert_eq!(*session.phase(), Phase::Playing);
        assert!(session.board().is_pristine());
        assert_eq!(*session.result(), None);
    }
}

#[test]
fn test_replay_without_opponent_waits() {
    let mut session = Session::solo("AB12CD34", Symbolic, 3);
    session.apply(ServerEvent::Connected).unwrap();
    let mut board = Board::new(3);
    for at in top_row() {
        board.set(at, Square::Occupied(Mark::X));
    }
    session.apply(ServerEvent::Board(board)).unwrap();
    session
        .apply(ServerEvent::Result(GameResult::win(Mark::X, top_row())))
        .unwrap();
    assert_eq!(*session.phase(), Phase::Finished);
    assert!(!*session.opponent_present());

    session.replay().unwrap();
    assert_eq!(*session.phase(), Phase::Waiting);
    assert!(session.board().is_pristine());
    assert_eq!(*session.result(), None);
    assert_eq!(*session.role(), Some(Mark::X));
    assert_eq!(session.status(), Status::WaitingForOpponent);
}

#[test]
fn test_solo_signal_resets_role() {
    let mut session = started(Mark::O);
    let mut board = Board::new(3);
    board.set(Coord::new(1, 1), Square::Occupied(Mark::X));
    session.apply(ServerEvent::Board(board)).unwrap();

    session.apply(ServerEvent::SingleRoom).unwrap();
    assert_eq!(*session.role(), Some(Mark::X));
    assert_eq!(*session.phase(), Phase::Waiting);
    assert!(!*session.opponent_present());
    assert!(session.board().is_pristine());
    assert_eq!(session.status(), Status::WaitingForOpponent);
}

#[test]
fn test_lock_blocks_second_proposal_until_echo() {
    let mut session = started(Mark::X);
    let at = Coord::new(0, 1);
    session.submit_move(at).unwrap();
    assert_eq!(session.submit_move(at), Err(MoveRejected::AwaitingEcho(at)));

    // An echo that does not contain the move still releases the lock.
    let mut board = Board::new(3);
    board.set(Coord::new(2, 0), Square::Occupied(Mark::O));
    assert_eq!(session.apply(ServerEvent::Board(board)).unwrap(), Transition::Applied);
    assert!(!session.is_awaiting(at));
    assert!(session.submit_move(at).is_ok());
}

#[test]
fn test_counter_allows_repeated_proposals() {
    let mut session: Session<Counter> = Session::new("ROOM", Counter, 5);
    session.apply(ServerEvent::Joined(JoinAck::accepted(tictac_arena::Parity::Odd))).unwrap();
    session.apply(ServerEvent::StartGame).unwrap();

    let at = Coord::new(2, 2);
    assert!(session.submit_move(at).is_ok());
    assert!(session.submit_move(at).is_ok());
    assert!(!session.is_awaiting(at));
}

#[test]
fn test_remote_winner_survives_cross_check() {
    let mut session = started(Mark::X);
    let board = Board::from_rows(vec![
        vec![Square::Occupied(Mark::X); 3],
        vec![Square::Empty, Square::Occupied(Mark::O), Square::Empty],
        vec![Square::Empty, Square::Occupied(Mark::O), Square::Empty],
    ])
    .unwrap();
    session.apply(ServerEvent::Board(board)).unwrap();
    assert_eq!(
        session.local_evaluation().and_then(|result| result.winner()),
        Some(Mark::X)
    );

    let remote = GameResult::win(
        Mark::O,
        vec![Coord::new(0, 1), Coord::new(1, 1), Coord::new(2, 1)],
    );
    session.apply(ServerEvent::Result(remote.clone())).unwrap();
    assert_eq!(*session.result(), Some(remote));
    assert_eq!(session.status(), Status::YouLose);
}

#[test]
fn test_malformed_result_ignored() {
    let mut session = started(Mark::X);
    let short = GameResult::win(Mark::X, vec![Coord::new(0, 0), Coord::new(1, 1)]);
    assert_eq!(session.apply(ServerEvent::Result(short)).unwrap(), Transition::Ignored);

    let bent = GameResult::win(
        Mark::X,
        vec![Coord::new(0, 0), Coord::new(0, 1), Coord::new(1, 2)],
    );
    assert_eq!(session.apply(ServerEvent::Result(bent)).unwrap(), Transition::Ignored);
    assert_eq!(*session.phase(), Phase::Playing);
    assert_eq!(*session.result(), None);
}

#[test]
fn test_start_after_finish_clears_board() {
    let mut session = started(Mark::X);
    session.apply(ServerEvent::Result(GameResult::draw())).unwrap();
    assert_eq!(session.status().to_string(), "It's a draw");

    session.apply(ServerEvent::StartGame).unwrap();
    assert_eq!(*session.phase(), Phase::Playing);
    assert_eq!(*session.result(), None);
}

#[test]
fn test_winner_sees_win() {
    let mut session = started(Mark::X);
    session
        .apply(ServerEvent::Result(GameResult::win(Mark::X, top_row())))
        .unwrap();
    assert_eq!(session.status().to_string(), "You win");
}

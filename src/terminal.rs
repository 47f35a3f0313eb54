//! Line-oriented terminal front end.

use crate::client::{Command, RoomClient};
use crate::config::ArenaConfig;
use crate::connection::{LoopbackHub, TcpConnection};
use crate::session::Session;
use anyhow::Result;
use tictac_rules::{Coord, MatchRule};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{info, instrument, warn};

const HELP: &str = "commands: <row> <col> | replay | quit";

/// Parses one line of player input.
///
/// Accepts `row col` (space or comma separated), `replay`/`r` and
/// `quit`/`q`/`leave`.
pub fn parse_command(line: &str) -> Option<Command> {
    let line = line.trim().to_ascii_lowercase();
    match line.as_str() {
        "replay" | "r" => return Some(Command::Replay),
        "quit" | "q" | "leave" => return Some(Command::Leave),
        _ => {}
    }
    let mut parts = line
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|part| !part.is_empty());
    let row = parts.next()?.parse().ok()?;
    let col = parts.next()?.parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some(Command::Move(Coord::new(row, col)))
}

/// Renders a session as board, winning line and status.
pub fn render<R: MatchRule>(session: &Session<R>) -> String {
    let mut out = session.board().display();
    if let Some(result) = session.result().as_ref().filter(|result| !result.is_draw()) {
        let line: Vec<String> = result.winning_line().iter().map(ToString::to_string).collect();
        out.push_str(&format!("winning line: {}\n", line.join(" ")));
    }
    out.push_str(&session.status().to_string());
    out
}

/// Joins a room on a remote server and plays from stdin.
#[instrument(skip(rule, config))]
pub async fn play_remote<R: MatchRule>(rule: R, config: &ArenaConfig, room: String) -> Result<()> {
    let conn = TcpConnection::<R>::connect(config.server()).await?;
    let client = RoomClient::join(conn, room, rule, *config.board_size()).await?;
    println!("{}", HELP);

    let (commands, mut updates, driver) = spawn_driver(client);
    drive_stdin(&Seats::Single(commands), &mut updates).await?;

    let session = driver.await?;
    info!(status = %session.status(), "Session ended");
    Ok(())
}

/// Two seats at one terminal against the in-process collaborator.
///
/// Each move is routed to the seat whose turn it is. The board is shown from
/// the first seat's view.
#[instrument(skip(rule, config))]
pub async fn play_local<R: MatchRule>(rule: R, config: &ArenaConfig, room: String) -> Result<()> {
    let hub = LoopbackHub::new(rule, *config.board_size());
    let first = RoomClient::join(hub.connect(), room.clone(), rule, *config.board_size()).await?;
    let second = RoomClient::join(hub.connect(), room.clone(), rule, *config.board_size()).await?;
    println!("{}", HELP);

    let (first_commands, mut first_updates, first_driver) = spawn_driver(first);
    let (second_commands, _, second_driver) = spawn_driver(second);
    let seats = Seats::Hotseat {
        hub,
        room,
        seats: [first_commands, second_commands],
    };
    drive_stdin(&seats, &mut first_updates).await?;

    let session = first_driver.await?;
    second_driver.await?;
    info!(status = %session.status(), "Local game ended");
    Ok(())
}

/// Where stdin commands go.
enum Seats<R: MatchRule> {
    /// One remote seat.
    Single(mpsc::Sender<Command>),
    /// Both seats of a loopback room.
    Hotseat {
        hub: LoopbackHub<R>,
        room: String,
        seats: [mpsc::Sender<Command>; 2],
    },
}

impl<R: MatchRule> Seats<R> {
    async fn dispatch(&self, command: Command) {
        let targets: Vec<&mpsc::Sender<Command>> = match self {
            Seats::Single(seat) => vec![seat],
            Seats::Hotseat { hub, room, seats } => match command {
                Command::Move(_) => {
                    let roles = R::default().roles();
                    let index = hub
                        .to_move(room)
                        .await
                        .and_then(|role| roles.iter().position(|r| *r == role))
                        .unwrap_or(0);
                    vec![&seats[index]]
                }
                Command::Replay | Command::Leave => seats.iter().collect(),
            },
        };
        for seat in targets {
            if seat.send(command).await.is_err() {
                warn!("Driver already stopped");
            }
        }
    }
}

fn spawn_driver<R, C>(
    client: RoomClient<R, C>,
) -> (
    mpsc::Sender<Command>,
    mpsc::UnboundedReceiver<Session<R>>,
    JoinHandle<Session<R>>,
)
where
    R: MatchRule,
    C: crate::connection::Connection<R> + 'static,
{
    let (command_tx, command_rx) = mpsc::channel(16);
    let (update_tx, update_rx) = mpsc::unbounded_channel();
    let driver = tokio::spawn(client.run(command_rx, update_tx));
    (command_tx, update_rx, driver)
}

async fn drive_stdin<R: MatchRule>(
    seats: &Seats<R>,
    updates: &mut mpsc::UnboundedReceiver<Session<R>>,
) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            update = updates.recv() => match update {
                Some(session) => println!("\n{}", render(&session)),
                None => break,
            },
            line = lines.next_line() => {
                let command = match line? {
                    Some(line) => match parse_command(&line) {
                        Some(command) => command,
                        None => {
                            println!("{}", HELP);
                            continue;
                        }
                    },
                    None => Command::Leave,
                };
                seats.dispatch(command).await;
                if command == Command::Leave {
                    break;
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::ServerEvent;
    use tictac_rules::{Counter, Parity};

    #[test]
    fn test_parse_move() {
        assert_eq!(parse_command("1 2"), Some(Command::Move(Coord::new(1, 2))));
        assert_eq!(parse_command(" 0,4 "), Some(Command::Move(Coord::new(0, 4))));
        assert_eq!(parse_command("1 2 3"), None);
        assert_eq!(parse_command("x y"), None);
        assert_eq!(parse_command("-1 0"), None);
    }

    #[test]
    fn test_parse_words() {
        assert_eq!(parse_command("Replay"), Some(Command::Replay));
        assert_eq!(parse_command("q"), Some(Command::Leave));
        assert_eq!(parse_command(""), None);
    }

    #[test]
    fn test_render_shows_status() {
        let mut session = Session::solo("ROOM", Counter, 3);
        assert!(render(&session).ends_with("Waiting for opponent..."));
        session
            .apply(ServerEvent::Joined(crate::protocol::JoinAck::accepted(Parity::Even)))
            .unwrap();
        session.apply(ServerEvent::StartGame).unwrap();
        assert!(render(&session).ends_with("The game begins!"));
    }
}

//! tictac_arena - terminal client
//!
//! Joins a shared room and plays the line-matching grid game.

#![warn(missing_docs)]

mod cli;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Command};
use tictac_arena::{ArenaConfig, Counter, Regime, Symbolic, play_local, play_remote};
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Logs go to stderr so they do not interleave with the board on stdout.
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,tictac_arena=debug")),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let server = match &cli.command {
        Command::Play { server, .. } => server.clone(),
        Command::Local { .. } => None,
    };
    let config = ArenaConfig::load(&cli.config)?.with_overrides(cli.regime, cli.size, server)?;
    info!(
        regime = %config.regime(),
        board_size = config.board_size(),
        player = %config.player_name(),
        "Starting tictac_arena"
    );

    match (cli.command, *config.regime()) {
        (Command::Play { room, .. }, Regime::Symbolic) => play_remote(Symbolic, &config, room).await,
        (Command::Play { room, .. }, Regime::Counter) => play_remote(Counter, &config, room).await,
        (Command::Local { room }, Regime::Symbolic) => play_local(Symbolic, &config, room).await,
        (Command::Local { room }, Regime::Counter) => play_local(Counter, &config, room).await,
    }
}

//! Command-line interface for tictac_arena.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tictac_rules::Regime;

/// tictac_arena - two-player line-matching grid game
#[derive(Parser, Debug)]
#[command(name = "tictac_arena")]
#[command(about = "Play a two-player grid game in a shared room", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Path to the TOML configuration file
    #[arg(long, global = true, default_value = "tictac_arena.toml")]
    pub config: PathBuf,

    /// Cell regime, overriding the config file
    #[arg(long, global = true)]
    pub regime: Option<Regime>,

    /// Board side length, overriding the config file
    #[arg(long, global = true)]
    pub size: Option<usize>,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Join a room on a remote server and play from the terminal
    Play {
        /// Server address (host:port); defaults to the configured server
        #[arg(long)]
        server: Option<String>,

        /// Room code to join
        #[arg(long)]
        room: String,
    },

    /// Hot-seat game for two players at one terminal
    Local {
        /// Room name for the in-process game
        #[arg(long, default_value = "LOCAL")]
        room: String,
    },
}

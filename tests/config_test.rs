//! Tests for configuration loading.

use std::io::Write;
use tictac_arena::{ArenaConfig, Regime};

#[test]
fn test_load_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        "board_size = 3\nregime = \"symbolic\"\nplayer_name = \"ada\""
    )
    .unwrap();

    let config = ArenaConfig::from_file(file.path()).unwrap();
    assert_eq!(*config.board_size(), 3);
    assert_eq!(*config.regime(), Regime::Symbolic);
    assert_eq!(config.player_name(), "ada");
    assert_eq!(config.server(), "127.0.0.1:3000");
}

#[test]
fn test_missing_file_gives_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let config = ArenaConfig::load(dir.path().join("absent.toml")).unwrap();
    assert_eq!(*config.board_size(), 5);
    assert_eq!(*config.regime(), Regime::Counter);
}

#[test]
fn test_unknown_regime_rejected() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "regime = \"hexagonal\"").unwrap();
    let err = ArenaConfig::from_file(file.path()).unwrap_err();
    assert!(err.message.contains("Failed to parse config"));
}

#[test]
fn test_oversized_board_rejected() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "board_size = 64").unwrap();
    assert!(ArenaConfig::from_file(file.path()).is_err());
}

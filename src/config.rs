//! Arena configuration loaded from TOML.

use derive_getters::Getters;
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tictac_rules::Regime;
use tracing::{debug, info, instrument};

/// Environment variable overriding the server address.
pub const SERVER_ENV: &str = "TICTAC_ARENA_SERVER";

/// Smallest supported board side.
pub const MIN_BOARD_SIZE: usize = 3;

/// Largest supported board side.
pub const MAX_BOARD_SIZE: usize = 16;

/// Deployment settings.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
pub struct ArenaConfig {
    /// Board side length, fixed for every room.
    #[serde(default = "default_board_size")]
    board_size: usize,

    /// Cell regime (`symbolic` or `counter`).
    #[serde(default)]
    regime: Regime,

    /// Room server address, `host:port`.
    #[serde(default = "default_server")]
    server: String,

    /// Name shown in logs.
    #[serde(default = "default_player_name")]
    player_name: String,
}

fn default_board_size() -> usize {
    5
}

fn default_server() -> String {
    "127.0.0.1:3000".to_string()
}

fn default_player_name() -> String {
    "player".to_string()
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            board_size: default_board_size(),
            regime: Regime::default(),
            server: default_server(),
            player_name: default_player_name(),
        }
    }
}

impl ArenaConfig {
    /// Parses configuration from TOML text.
    #[instrument(skip(content))]
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Loads configuration from a TOML file.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;
        let config = Self::from_toml(&content)?;
        info!(regime = %config.regime, board_size = config.board_size, "Config loaded");
        Ok(config)
    }

    /// Loads `path` if it exists, otherwise the defaults, then applies the
    /// environment override.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let mut config = if path.as_ref().exists() {
            Self::from_file(path)?
        } else {
            debug!("No config file, using defaults");
            Self::default()
        };
        if let Ok(server) = std::env::var(SERVER_ENV) {
            debug!(%server, "Server address from environment");
            config.server = server;
        }
        Ok(config)
    }

    /// Applies command-line overrides.
    #[instrument(skip(self))]
    pub fn with_overrides(
        mut self,
        regime: Option<Regime>,
        board_size: Option<usize>,
        server: Option<String>,
    ) -> Result<Self, ConfigError> {
        if let Some(regime) = regime {
            self.regime = regime;
        }
        if let Some(size) = board_size {
            self.board_size = size;
        }
        if let Some(server) = server {
            self.server = server;
        }
        self.validate()?;
        Ok(self)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !(MIN_BOARD_SIZE..=MAX_BOARD_SIZE).contains(&self.board_size) {
            return Err(ConfigError::new(format!(
                "board_size must be between {} and {}, got {}",
                MIN_BOARD_SIZE, MAX_BOARD_SIZE, self.board_size
            )));
        }
        if self.server.trim().is_empty() {
            return Err(ConfigError::new("server address is empty".to_string()));
        }
        Ok(())
    }
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error.
    #[track_caller]
    pub fn new(message: String) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}

//! GameSession - the owner of everything one adventure needs.
//!
//! A session bundles the game state, the dice and the transcript. There is
//! no global state: run two sessions and they never see each other.

use crate::dice::Dice;
use crate::transcript::{Speaker, Transcript};
use crate::world::{GameState, Scenario};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

/// Errors from session teardown.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Unique identifier for a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// First eight hex digits, enough to tell sessions apart in file names.
    pub fn short(&self) -> String {
        self.0.simple().to_string()[..8].to_string()
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Configuration for creating a new game session.
#[derive(Debug, Clone, Default)]
pub struct SessionConfig {
    /// Where the adventure begins.
    pub scenario: Scenario,

    /// Seed for reproducible dice.
    pub seed: Option<u64>,

    /// Directory the transcript is exported to at teardown.
    pub transcript_dir: Option<PathBuf>,
}

impl SessionConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the starting location.
    pub fn with_starting_location(mut self, location: impl Into<String>) -> Self {
        self.scenario.starting_location = location.into();
        self
    }

    /// Add an objective to the opening list.
    pub fn with_objective(mut self, objective: impl Into<String>) -> Self {
        self.scenario.objectives.push(objective.into());
        self
    }

    pub fn with_weather(mut self, weather: impl Into<String>) -> Self {
        self.scenario.weather = weather.into();
        self
    }

    /// Seed the dice.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_transcript_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.transcript_dir = Some(dir.into());
        self
    }
}

/// A tabletop RPG session.
///
/// Mutating methods take `&mut self` and nothing inside is synchronized;
/// callers sharing a session across tasks serialize access themselves, as
/// the server does behind a mutex.
#[derive(Debug, Clone)]
pub struct GameSession {
    id: SessionId,
    pub state: GameState,
    pub dice: Dice,
    pub transcript: Transcript,
    transcript_dir: Option<PathBuf>,
}

impl GameSession {
    pub fn new(config: SessionConfig) -> Self {
        let dice = match config.seed {
            Some(seed) => Dice::seeded(seed),
            None => Dice::new(),
        };
        let id = SessionId::new();
        info!(session = %id, location = %config.scenario.starting_location, "Starting session");

        Self {
            id,
            state: GameState::new(config.scenario),
            dice,
            transcript: Transcript::new(),
            transcript_dir: config.transcript_dir,
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    /// Append a line to the transcript.
    pub fn record(&mut self, speaker: Speaker, text: impl Into<String>) {
        self.transcript.record(speaker, text);
    }

    /// Write the transcript to the configured directory.
    ///
    /// Returns `Ok(None)` when no directory is configured.
    pub async fn export_transcript(&self) -> Result<Option<PathBuf>, SessionError> {
        let Some(dir) = &self.transcript_dir else {
            return Ok(None);
        };
        let path = self.transcript.export(dir, &self.id).await?;
        info!(session = %self.id, path = %path.display(), "Exported transcript");
        Ok(Some(path))
    }
}

impl Default for GameSession {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}

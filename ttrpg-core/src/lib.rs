//! Tabletop RPG session engine with an AI Dungeon Master.
//!
//! This crate provides:
//! - Characters with derived ability modifiers and skill bonuses
//! - Per-session game state (rosters, turn, day, weather, phase, location, objectives)
//! - The named tools a Dungeon Master calls to read and change that state
//! - A Claude-backed narrator that drives the tools turn by turn
//!
//! # Quick Start
//!
//! ```ignore
//! use ttrpg_core::{DungeonMaster, GameSession, Narrator, SessionConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut session = GameSession::new(SessionConfig::new().with_transcript_dir("transcripts"));
//!     let mut dm = DungeonMaster::from_env()?;
//!
//!     let reply = dm.narrate("I'd like to play an elf ranger.", &mut session).await?;
//!     println!("{reply}");
//!
//!     session.export_transcript().await?;
//!     Ok(())
//! }
//! ```

pub mod calculator;
pub mod character;
pub mod dice;
pub mod dm;
pub mod error;
pub mod session;
pub mod testing;
pub mod tools;
pub mod transcript;
pub mod world;

// Re-export for convenience
pub use ttrpg_macros::Tool;

// Primary public API
pub use character::{Ability, Character, CreateCharacter, Skill};
pub use dice::Dice;
pub use dm::{Completion, DmConfig, DmError, DungeonMaster, Narrator};
pub use error::GameError;
pub use session::{GameSession, SessionConfig, SessionError, SessionId};
pub use testing::{ScriptedNarrator, ScriptedTurn};
pub use transcript::{Speaker, Transcript};
pub use world::{GamePhase, GameState, Scenario};

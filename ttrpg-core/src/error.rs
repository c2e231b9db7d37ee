//! Errors raised by game state mutations and tools.

use thiserror::Error;

/// Every failure a tool can report back to the orchestrator.
///
/// Tools never partially apply: when one of these is returned the
/// session state is exactly what it was before the call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Unknown skill: {0}")]
    UnknownSkill(String),

    #[error("Character {0} not found")]
    CharacterNotFound(String),

    #[error("Property {field} not found on character {character}")]
    FieldNotFound { character: String, field: String },

    #[error("Unknown tool: {0}")]
    UnknownTool(String),
}

impl GameError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        GameError::InvalidArgument(message.into())
    }
}

//! Game state: the two rosters plus session metadata.

use crate::character::Character;
use crate::error::GameError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::info;

// ============================================================================
// Phase
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GamePhase {
    #[default]
    Exploration,
    Combat,
    Interaction,
}

impl GamePhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            GamePhase::Exploration => "exploration",
            GamePhase::Combat => "combat",
            GamePhase::Interaction => "interaction",
        }
    }
}

impl fmt::Display for GamePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GamePhase {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "exploration" => Ok(GamePhase::Exploration),
            "combat" => Ok(GamePhase::Combat),
            "interaction" => Ok(GamePhase::Interaction),
            _ => Err(GameError::invalid(format!(
                "Unknown phase '{s}', expected exploration, combat or interaction"
            ))),
        }
    }
}

// ============================================================================
// Scenario
// ============================================================================

/// Where and how an adventure begins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    pub starting_location: String,
    pub weather: String,
    pub objectives: Vec<String>,
}

impl Default for Scenario {
    fn default() -> Self {
        Self {
            starting_location: "Dark forest at the foot of the mountain trail".to_string(),
            weather: "clear".to_string(),
            objectives: vec!["Reach the hidden cave at the top of the mountain".to_string()],
        }
    }
}

// ============================================================================
// Game State
// ============================================================================

/// Authoritative state of one session.
///
/// Owns every character; callers get references or snapshot copies.
/// Not safe for concurrent mutation: one writer at a time, each session
/// with its own instance.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GameState {
    pub players: Vec<Character>,
    pub npcs: Vec<Character>,
    pub turn: u32,
    pub day: u32,
    pub weather: String,
    pub current_phase: GamePhase,
    pub current_location: String,
    /// Visited locations in order, starting with the first.
    pub locations: Vec<String>,
    pub objectives: Vec<String>,
}

impl GameState {
    pub fn new(scenario: Scenario) -> Self {
        Self {
            players: Vec::new(),
            npcs: Vec::new(),
            turn: 1,
            day: 1,
            weather: scenario.weather,
            current_phase: GamePhase::Exploration,
            locations: vec![scenario.starting_location.clone()],
            current_location: scenario.starting_location,
            objectives: scenario.objectives,
        }
    }

    pub fn register_player(&mut self, character: Character) {
        info!(name = %character.name, "Registered player character");
        self.players.push(character);
    }

    pub fn register_npc(&mut self, character: Character) {
        info!(name = %character.name, "Registered NPC");
        self.npcs.push(character);
    }

    /// Register on whichever roster the character's `playable` flag names.
    pub fn register(&mut self, character: Character) {
        if character.playable {
            self.register_player(character);
        } else {
            self.register_npc(character);
        }
    }

    /// First character with this name, NPCs before players.
    pub fn find(&self, name: &str) -> Result<&Character, GameError> {
        self.npcs
            .iter()
            .chain(self.players.iter())
            .find(|c| c.name == name)
            .ok_or_else(|| GameError::CharacterNotFound(name.to_string()))
    }

    /// Mutable [`GameState::find`], same search order.
    pub fn find_mut(&mut self, name: &str) -> Result<&mut Character, GameError> {
        self.npcs
            .iter_mut()
            .chain(self.players.iter_mut())
            .find(|c| c.name == name)
            .ok_or_else(|| GameError::CharacterNotFound(name.to_string()))
    }

    /// Mutable lookup searching players before NPCs.
    pub fn find_player_first_mut(&mut self, name: &str) -> Result<&mut Character, GameError> {
        self.players
            .iter_mut()
            .chain(self.npcs.iter_mut())
            .find(|c| c.name == name)
            .ok_or_else(|| GameError::CharacterNotFound(name.to_string()))
    }

    pub fn find_player_mut(&mut self, name: &str) -> Result<&mut Character, GameError> {
        self.players
            .iter_mut()
            .find(|c| c.name == name)
            .ok_or_else(|| GameError::CharacterNotFound(name.to_string()))
    }

    pub fn find_npc_mut(&mut self, name: &str) -> Result<&mut Character, GameError> {
        self.npcs
            .iter_mut()
            .find(|c| c.name == name)
            .ok_or_else(|| GameError::CharacterNotFound(name.to_string()))
    }

    pub fn advance_turn(&mut self) {
        self.turn += 1;
    }

    /// Start a new day; the turn counter starts over.
    pub fn advance_day(&mut self) {
        self.day += 1;
        self.turn = 1;
    }

    pub fn set_phase(&mut self, phase: GamePhase) {
        self.current_phase = phase;
    }

    pub fn set_weather(&mut self, weather: impl Into<String>) {
        self.weather = weather.into();
    }

    pub fn move_to(&mut self, location: impl Into<String>) {
        let location = location.into();
        if self.locations.last() != Some(&location) {
            self.locations.push(location.clone());
        }
        self.current_location = location;
    }

    pub fn add_objective(&mut self, objective: impl Into<String>) {
        self.objectives.push(objective.into());
    }

    pub fn complete_objective(&mut self, objective: &str) -> Result<(), GameError> {
        let index = self
            .objectives
            .iter()
            .position(|o| o == objective)
            .ok_or_else(|| GameError::invalid(format!("No such objective: {objective}")))?;
        self.objectives.remove(index);
        Ok(())
    }

    /// Short description of where things stand, for the narrator's prompt.
    pub fn summary(&self) -> String {
        let names = |roster: &[Character]| {
            if roster.is_empty() {
                "none".to_string()
            } else {
                roster.iter().map(|c| c.name.as_str()).collect::<Vec<_>>().join(", ")
            }
        };
        let objectives = if self.objectives.is_empty() {
            "none".to_string()
        } else {
            self.objectives.join("; ")
        };

        format!(
            "Day {}, turn {}. Phase: {}. Weather: {}.\nLocation: {}\nObjectives: {}\nPlayers: {}\nNPCs: {}",
            self.day,
            self.turn,
            self.current_phase,
            self.weather,
            self.current_location,
            objectives,
            names(&self.players),
            names(&self.npcs),
        )
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::new(Scenario::default())
    }
}

//! Testing utilities.
//!
//! - `ScriptedNarrator` for deterministic turns without API calls
//! - Sample characters for fixtures

use crate::character::{Attack, CreateCharacter, PlayerDetails, Spell};
use crate::dm::{run_tool, DmError, Narrator};
use crate::session::GameSession;
use crate::transcript::Speaker;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::VecDeque;

/// A tool call inside a scripted turn.
#[derive(Debug, Clone)]
pub struct ScriptedCall {
    pub name: String,
    pub input: Value,
}

/// One canned narrator turn.
#[derive(Debug, Clone, Default)]
pub struct ScriptedTurn {
    /// Narrative text to return.
    pub narrative: String,
    /// Tool calls run, in order, before the narrative is returned.
    pub calls: Vec<ScriptedCall>,
}

impl ScriptedTurn {
    /// A turn with no mechanical effects.
    pub fn narrative(text: impl Into<String>) -> Self {
        Self {
            narrative: text.into(),
            calls: Vec::new(),
        }
    }

    /// Add a tool call to this turn.
    pub fn with_call(mut self, name: impl Into<String>, input: Value) -> Self {
        self.calls.push(ScriptedCall {
            name: name.into(),
            input,
        });
        self
    }
}

/// A narrator that replays queued turns.
///
/// Tool calls go through the real tool layer, so their effects on the
/// session are exactly what the Claude-backed narrator would produce.
#[derive(Debug, Default)]
pub struct ScriptedNarrator {
    turns: VecDeque<ScriptedTurn>,
    inputs: Vec<String>,
}

impl ScriptedNarrator {
    pub fn new(turns: impl IntoIterator<Item = ScriptedTurn>) -> Self {
        Self {
            turns: turns.into_iter().collect(),
            inputs: Vec::new(),
        }
    }

    /// Add a turn to the queue.
    pub fn queue(&mut self, turn: ScriptedTurn) -> &mut Self {
        self.turns.push_back(turn);
        self
    }

    /// Player inputs received so far.
    pub fn inputs(&self) -> &[String] {
        &self.inputs
    }

    pub fn remaining(&self) -> usize {
        self.turns.len()
    }
}

#[async_trait]
impl Narrator for ScriptedNarrator {
    async fn narrate(&mut self, input: &str, session: &mut GameSession) -> Result<String, DmError> {
        session.record(Speaker::Player, input);
        self.inputs.push(input.to_string());

        let turn = self
            .turns
            .pop_front()
            .unwrap_or_else(|| ScriptedTurn::narrative("The DM has no more scripted responses."));

        for call in &turn.calls {
            run_tool(&call.name, &call.input, session);
        }

        session.record(Speaker::DungeonMaster, turn.narrative.clone());
        Ok(turn.narrative)
    }
}

// ============================================================================
// Sample characters
// ============================================================================

/// A level 1 human fighter, playable.
///
/// STR 16, DEX 14, INT 8; proficient in athletics and intimidation.
pub fn sample_hero(name: &str) -> CreateCharacter {
    CreateCharacter {
        is_player: true,
        name: name.to_string(),
        race: "Human".to_string(),
        class_type: "Fighter".to_string(),
        alignment: "Neutral Good".to_string(),
        strength: 16,
        dexterity: 14,
        intelligence: 8,
        constitution: 15,
        wisdom: 10,
        charisma: 12,
        speed: 30,
        hp: 12,
        hit_dice: 10,
        mood: 5,
        acrobatics: 0,
        animal_handling: 0,
        arcana: 0,
        athletics: 2,
        deception: 0,
        history: 0,
        insight: 0,
        intimidation: 2,
        investigation: 0,
        medicine: 0,
        nature: 0,
        perception: 0,
        performance: 0,
        persuasion: 0,
        religion: 0,
        sleight_of_hand: 0,
        stealth: 0,
        survival: 0,
        attacks: vec![Attack {
            name: "Longsword".to_string(),
            damage: "1d8+3".to_string(),
            damage_type: "slashing".to_string(),
        }],
        spells: Vec::new(),
        resistances: Vec::new(),
        vulnerabilities: Vec::new(),
        player_details: Some(PlayerDetails {
            equipment: vec!["Chain mail".to_string(), "Shield".to_string()],
            saving_throws: vec!["STR".to_string(), "CON".to_string()],
            traits: vec!["Second Wind".to_string()],
        }),
    }
}

/// An elf wizard NPC who knows the forest.
///
/// INT 18, WIS 14; proficient in arcana, history and nature.
pub fn sample_wizard(name: &str) -> CreateCharacter {
    CreateCharacter {
        is_player: false,
        name: name.to_string(),
        race: "Elf".to_string(),
        class_type: "Wizard".to_string(),
        alignment: "Neutral Good".to_string(),
        strength: 8,
        dexterity: 12,
        intelligence: 18,
        constitution: 10,
        wisdom: 14,
        charisma: 11,
        speed: 30,
        hp: 22,
        hit_dice: 6,
        mood: 0,
        acrobatics: 0,
        animal_handling: 0,
        arcana: 4,
        athletics: 0,
        deception: 0,
        history: 4,
        insight: 0,
        intimidation: 0,
        investigation: 0,
        medicine: 0,
        nature: 4,
        perception: 0,
        performance: 0,
        persuasion: 0,
        religion: 0,
        sleight_of_hand: 0,
        stealth: 0,
        survival: 0,
        attacks: vec![Attack {
            name: "Quarterstaff".to_string(),
            damage: "1d6-1".to_string(),
            damage_type: "bludgeoning".to_string(),
        }],
        spells: vec![
            Spell {
                name: "Mage Hand".to_string(),
                level: 0,
                school: "conjuration".to_string(),
            },
            Spell {
                name: "Magic Missile".to_string(),
                level: 1,
                school: "evocation".to_string(),
            },
        ],
        resistances: Vec::new(),
        vulnerabilities: Vec::new(),
        player_details: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_scripted_narrator_applies_calls() {
        let mut session = GameSession::default();
        let mut narrator = ScriptedNarrator::new([ScriptedTurn::narrative("A storm rolls in.")
            .with_call("set_weather", json!({"weather": "storm"}))
            .with_call("advance_turn", json!({}))]);

        let reply = narrator.narrate("I wait.", &mut session).await.unwrap();
        assert_eq!(reply, "A storm rolls in.");
        assert_eq!(session.state.weather, "storm");
        assert_eq!(session.state.turn, 2);
        assert_eq!(narrator.inputs(), ["I wait.".to_string()]);
        assert_eq!(narrator.remaining(), 0);
    }

    #[tokio::test]
    async fn test_failed_calls_do_not_abort_turn() {
        let mut session = GameSession::default();
        let mut narrator = ScriptedNarrator::default();
        narrator.queue(
            ScriptedTurn::narrative("Nobody answers.")
                .with_call("set_npc_mood", json!({"name": "Ghost", "value": 1})),
        );

        let reply = narrator.narrate("Hello?", &mut session).await.unwrap();
        assert_eq!(reply, "Nobody answers.");
        // player, tool, dungeon master
        assert_eq!(session.transcript.len(), 3);
    }

    #[tokio::test]
    async fn test_exhausted_script() {
        let mut session = GameSession::default();
        let mut narrator = ScriptedNarrator::default();
        let reply = narrator.narrate("Anyone?", &mut session).await.unwrap();
        assert_eq!(reply, "The DM has no more scripted responses.");
    }
}

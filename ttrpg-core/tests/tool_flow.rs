//! End-to-end adventure flow through the scripted narrator.
//!
//! Every tool call runs through the real tool layer, so these tests cover
//! the same path the Claude-backed Dungeon Master takes, minus the network.

use serde_json::json;
use ttrpg_core::testing::{sample_hero, sample_wizard};
use ttrpg_core::{
    Ability, GamePhase, GameSession, Narrator, ScriptedNarrator, ScriptedTurn, SessionConfig,
    Speaker,
};

fn character_input(params: ttrpg_core::CreateCharacter) -> serde_json::Value {
    json!({
        "is_player": params.is_player,
        "name": params.name,
        "race": params.race,
        "class_type": params.class_type,
        "alignment": params.alignment,
        "strength": params.strength,
        "dexterity": params.dexterity,
        "intelligence": params.intelligence,
        "constitution": params.constitution,
        "wisdom": params.wisdom,
        "charisma": params.charisma,
        "hp": params.hp,
        "hit_dice": params.hit_dice,
        "mood": params.mood,
        "athletics": params.athletics,
        "arcana": params.arcana,
        "attacks": params.attacks,
        "spells": params.spells,
    })
}

// =============================================================================
// OPENING SCENE
// =============================================================================

#[tokio::test]
async fn test_opening_scene_creates_party() {
    let mut session = GameSession::new(SessionConfig::new().with_seed(5));
    let mut narrator = ScriptedNarrator::new([
        ScriptedTurn::narrative("Welcome, Jimmy. The mist parts and an old wizard steps out.")
            .with_call("create_character", character_input(sample_hero("Jimmy the Hero")))
            .with_call("create_character", character_input(sample_wizard("Eldrin"))),
    ]);

    assert!(session.state.find("Eldrin").is_err());

    let reply = narrator
        .narrate("I'm Jimmy, a human fighter.", &mut session)
        .await
        .unwrap();
    assert!(reply.contains("wizard"));

    assert_eq!(session.state.players.len(), 1);
    assert_eq!(session.state.npcs.len(), 1);
    let eldrin = session.state.find("Eldrin").unwrap();
    assert_eq!(eldrin.modifier(Ability::Intelligence), 4);
    assert_eq!(eldrin.skill_modifier("arcana").unwrap(), 8);
}

// =============================================================================
// MUTATION THROUGH TOOLS
// =============================================================================

#[tokio::test]
async fn test_training_raises_strength() {
    let mut session = GameSession::default();
    let mut narrator = ScriptedNarrator::new([
        ScriptedTurn::narrative("You are ready.")
            .with_call("create_character", character_input(sample_hero("Jimmy the Hero"))),
        ScriptedTurn::narrative("Weeks of training pay off.").with_call(
            "set_character_property",
            json!({"character_name": "Jimmy the Hero", "property": "stats['strength']", "value": 18}),
        ),
    ]);

    narrator.narrate("Let's begin.", &mut session).await.unwrap();
    narrator.narrate("I train with the wizard.", &mut session).await.unwrap();

    let hero = session.state.find("Jimmy the Hero").unwrap();
    assert_eq!(hero.score(Ability::Strength), 18);
    assert_eq!(hero.modifier(Ability::Strength), 4);
    assert_eq!(hero.skill_modifier("athletics").unwrap(), 6);
}

#[tokio::test]
async fn test_combat_turn() {
    let mut session = GameSession::default();
    session.state.register(ttrpg_core::Character::create(sample_hero("Jimmy the Hero")));
    session.state.register(ttrpg_core::Character::create(sample_wizard("Eldrin")));
    session.dice.load([11]);

    let mut narrator = ScriptedNarrator::new([ScriptedTurn::narrative("Wolves burst from the trees!")
        .with_call("set_phase", json!({"phase": "combat"}))
        .with_call("resolve_initiative", json!({"name": "Jimmy the Hero"}))
        .with_call("set_player_hp", json!({"name": "Jimmy the Hero", "value": 5}))
        .with_call("set_npc_mood", json!({"name": "Eldrin", "value": 3}))]);

    narrator.narrate("I draw my sword.", &mut session).await.unwrap();

    assert_eq!(session.state.current_phase, GamePhase::Combat);
    assert_eq!(session.state.players[0].hp, 5);
    assert_eq!(session.state.npcs[0].mood, 3);

    let initiative = session
        .transcript
        .entries()
        .iter()
        .find(|e| e.speaker == Speaker::Tool && e.text.starts_with("resolve_initiative"))
        .unwrap();
    // loaded d20 of 11 plus DEX +2
    assert!(initiative.text.ends_with("-> 13"));
}

#[tokio::test]
async fn test_failed_tool_leaves_state_alone() {
    let mut session = GameSession::default();
    session.state.register(ttrpg_core::Character::create(sample_hero("Jimmy the Hero")));
    let before = session.state.clone();

    let mut narrator = ScriptedNarrator::new([ScriptedTurn::narrative("Nothing happens.")
        .with_call("set_character_property", json!({"character_name": "Jimmy the Hero", "property": "gold", "value": 10}))
        .with_call("set_player_hp", json!({"name": "Eldrin", "value": 1}))
        .with_call("roll_dice", json!({"n": 0}))
        .with_call("summon_dragon", json!({}))]);

    narrator.narrate("I try everything.", &mut session).await.unwrap();

    assert_eq!(session.state, before);
    let failures = session
        .transcript
        .entries()
        .iter()
        .filter(|e| e.speaker == Speaker::Tool && e.text.contains(" failed "))
        .count();
    assert_eq!(failures, 4);
}

// =============================================================================
// JOURNEY
// =============================================================================

#[tokio::test]
async fn test_journey_up_the_mountain() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = GameSession::new(SessionConfig::new().with_transcript_dir(dir.path()));
    let start = session.state.current_location.clone();
    let objective = session.state.objectives[0].clone();

    let mut narrator = ScriptedNarrator::new([
        ScriptedTurn::narrative("You climb until dusk.")
            .with_call("change_location", json!({"location": "Mountain trail"}))
            .with_call("advance_turn", json!({}))
            .with_call("set_weather", json!({"weather": "snow"})),
        ScriptedTurn::narrative("At dawn you find the cave.")
            .with_call("advance_day", json!({}))
            .with_call("change_location", json!({"location": "Hidden cave"}))
            .with_call("complete_objective", json!({"objective": objective}))
            .with_call("add_objective", json!({"objective": "Recover the ancient treasure"})),
    ]);

    narrator.narrate("I head up the trail.", &mut session).await.unwrap();
    narrator.narrate("I keep going.", &mut session).await.unwrap();

    let state = &session.state;
    assert_eq!(state.day, 2);
    assert_eq!(state.turn, 1);
    assert_eq!(state.weather, "snow");
    assert_eq!(
        state.locations,
        vec![start, "Mountain trail".to_string(), "Hidden cave".to_string()]
    );
    assert_eq!(state.objectives, vec!["Recover the ancient treasure".to_string()]);

    let path = session.export_transcript().await.unwrap().unwrap();
    let written = std::fs::read_to_string(path).unwrap();
    assert!(written.contains("I head up the trail."));
    assert!(written.contains("At dawn you find the cave."));
}

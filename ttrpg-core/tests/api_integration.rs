//! Integration tests that call the real Claude API.
//!
//! These tests require ANTHROPIC_API_KEY to be set (via .env file or environment).
//! Run with: `cargo test -p ttrpg-core --test api_integration -- --ignored`
//!
//! They are marked #[ignore] so CI never pays for, or waits on, API calls.

use ttrpg_core::{DmConfig, DungeonMaster, GameSession, Narrator, SessionConfig, Speaker};

/// Load environment variables from .env file
fn setup() {
    let _ = dotenvy::dotenv();
}

/// Check if API key is available
fn has_api_key() -> bool {
    std::env::var("ANTHROPIC_API_KEY").is_ok()
}

fn test_config() -> DmConfig {
    DmConfig {
        max_tokens: 1024,
        temperature: Some(0.7),
        ..DmConfig::default()
    }
}

#[tokio::test]
#[ignore] // Run with: cargo test -p ttrpg-core --test api_integration -- --ignored
async fn test_dm_creates_player_character() {
    setup();
    if !has_api_key() {
        eprintln!("Skipping test: ANTHROPIC_API_KEY not set");
        return;
    }

    let mut session = GameSession::new(SessionConfig::new());
    let mut dm = DungeonMaster::from_env()
        .expect("Failed to create DM")
        .with_config(test_config());

    let reply = dm
        .narrate(
            "Create my character now: Jimmy the Hero, a playable human fighter, lawful good, \
             STR 16, DEX 14, INT 8, CON 15, WIS 10, CHA 12, 12 HP, d10 hit dice, mood 5.",
            &mut session,
        )
        .await
        .expect("DM should respond");

    println!("DM: {reply}");
    assert!(!reply.is_empty(), "DM should provide a narrative");

    let hero = session
        .state
        .find("Jimmy the Hero")
        .expect("DM should have called create_character");
    assert!(hero.playable);
    assert_eq!(hero.hp, 12);
}

#[tokio::test]
#[ignore]
async fn test_dm_uses_tools_for_hp() {
    setup();
    if !has_api_key() {
        eprintln!("Skipping test: ANTHROPIC_API_KEY not set");
        return;
    }

    let mut session = GameSession::new(SessionConfig::new());
    session
        .state
        .register(ttrpg_core::Character::create(ttrpg_core::testing::sample_hero("Jimmy the Hero")));
    let mut dm = DungeonMaster::from_env()
        .expect("Failed to create DM")
        .with_config(test_config());

    dm.narrate(
        "A falling rock hits me. Set my HP (Jimmy the Hero) to 7 with your tool.",
        &mut session,
    )
    .await
    .expect("DM should respond");

    let tool_calls = session
        .transcript
        .entries()
        .iter()
        .filter(|e| e.speaker == Speaker::Tool)
        .count();
    println!("Tool calls: {tool_calls}");
    assert!(tool_calls > 0, "DM should have used at least one tool");
    assert_eq!(session.state.players[0].hp, 7);
}

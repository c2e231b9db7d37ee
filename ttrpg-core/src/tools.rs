//! The named tools the Dungeon Master uses to read and change the game.
//!
//! Each tool has an argument struct deriving [`Tool`](crate::Tool), which
//! produces the JSON schema sent to the model, and a typed function doing
//! the work. [`execute`] glues the two together by name.

use crate::calculator;
use crate::character::{Ability, Character, CreateCharacter, Skill};
use crate::dice::Dice;
use crate::error::GameError;
use crate::session::GameSession;
use crate::world::{GamePhase, GameState};
use crate::Tool;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, warn};

// ============================================================================
// Argument structs
// ============================================================================

fn one() -> i64 {
    1
}

fn twenty() -> i64 {
    20
}

/// Roll one or more dice of the same size and return each result.
#[derive(Debug, Tool, Deserialize)]
#[tool(name = "roll_dice")]
pub struct RollDice {
    /// Number of dice to roll (default 1)
    #[serde(default = "one")]
    pub n: i64,
    /// Number of sides per die (default 20)
    #[serde(default = "twenty")]
    pub sides: i64,
}

/// Roll a d20 for an ability check. Add the character's modifier yourself.
#[derive(Debug, Tool, Deserialize)]
#[tool(name = "roll_ability_check")]
pub struct RollAbilityCheck {
    /// The ability being checked, e.g. "strength"
    #[serde(default)]
    pub stat: Option<String>,
}

/// Generate an ability score by rolling 4d6 and keeping the highest three.
#[derive(Debug, Tool, Deserialize)]
#[tool(name = "roll_stats")]
pub struct RollStats {
    /// The ability the score is for
    pub stat: String,
}

/// Change a property of a character. Use "stats[strength]" for ability scores, "skills[stealth]" for skill proficiency bonuses, or a field name such as "hp", "mood", "conditions" or "attacks".
#[derive(Debug, Tool, Deserialize)]
#[tool(name = "set_character_property")]
pub struct SetCharacterProperty {
    /// Name of the character to change
    pub character_name: String,
    /// Property to change
    pub property: String,
    /// New value, typed to match the property
    pub value: Value,
}

/// Set a player character's current hit points.
#[derive(Debug, Tool, Deserialize)]
#[tool(name = "set_player_hp")]
pub struct SetPlayerHp {
    /// Name of the player character
    pub name: String,
    /// New hit point value
    pub value: i32,
}

/// Set an NPC's mood toward the players. Higher is friendlier.
#[derive(Debug, Tool, Deserialize)]
#[tool(name = "set_npc_mood")]
pub struct SetNpcMood {
    /// Name of the NPC
    pub name: String,
    /// New mood value
    pub value: i32,
}

/// Roll initiative for a character: d20 plus dexterity modifier.
#[derive(Debug, Tool, Deserialize)]
#[tool(name = "resolve_initiative")]
pub struct ResolveInitiative {
    /// Name of the character
    pub name: String,
}

/// List the current objectives.
#[derive(Debug, Tool)]
#[tool(name = "read_objectives")]
pub struct ReadObjectives;

/// Read the full sheets of all player characters.
#[derive(Debug, Tool)]
#[tool(name = "read_players")]
pub struct ReadPlayers;

/// Read the full sheets of all NPCs.
#[derive(Debug, Tool)]
#[tool(name = "read_npcs")]
pub struct ReadNpcs;

/// Read the session state: turn, day, weather, phase, location, objectives and who is present.
#[derive(Debug, Tool)]
#[tool(name = "read_game_state")]
pub struct ReadGameState;

/// Evaluate an arithmetic expression using + - * / and parentheses.
#[derive(Debug, Tool, Deserialize)]
#[tool(name = "calculator")]
pub struct Calculator {
    /// The expression, e.g. "(12 + 3) * 2"
    pub expression: String,
}

/// Advance to the next turn.
#[derive(Debug, Tool)]
#[tool(name = "advance_turn")]
pub struct AdvanceTurn;

/// Advance to the next day. The turn counter resets to 1.
#[derive(Debug, Tool)]
#[tool(name = "advance_day")]
pub struct AdvanceDay;

/// Switch the game phase.
#[derive(Debug, Tool, Deserialize)]
#[tool(name = "set_phase")]
pub struct SetPhase {
    /// The new phase
    #[tool(one_of = "exploration, combat, interaction")]
    pub phase: String,
}

/// Move the party to a new location.
#[derive(Debug, Tool, Deserialize)]
#[tool(name = "change_location")]
pub struct ChangeLocation {
    /// Name or short description of the new location
    pub location: String,
}

/// Change the weather.
#[derive(Debug, Tool, Deserialize)]
#[tool(name = "set_weather")]
pub struct SetWeather {
    /// The new weather, e.g. "light rain"
    pub weather: String,
}

/// Add an objective for the party.
#[derive(Debug, Tool, Deserialize)]
#[tool(name = "add_objective")]
pub struct AddObjective {
    /// The objective text
    pub objective: String,
}

/// Mark an objective as done, removing it from the list.
#[derive(Debug, Tool, Deserialize)]
#[tool(name = "complete_objective")]
pub struct CompleteObjective {
    /// The objective text, exactly as listed
    pub objective: String,
}

/// Definitions of every tool, for the model.
pub fn definitions() -> Vec<claude::Tool> {
    vec![
        CreateCharacter::as_tool(),
        RollDice::as_tool(),
        RollAbilityCheck::as_tool(),
        RollStats::as_tool(),
        SetCharacterProperty::as_tool(),
        SetPlayerHp::as_tool(),
        SetNpcMood::as_tool(),
        ResolveInitiative::as_tool(),
        ReadObjectives::as_tool(),
        ReadPlayers::as_tool(),
        ReadNpcs::as_tool(),
        ReadGameState::as_tool(),
        Calculator::as_tool(),
        AdvanceTurn::as_tool(),
        AdvanceDay::as_tool(),
        SetPhase::as_tool(),
        ChangeLocation::as_tool(),
        SetWeather::as_tool(),
        AddObjective::as_tool(),
        CompleteObjective::as_tool(),
    ]
}

// ============================================================================
// Dispatch
// ============================================================================

/// Run the tool called `name` against the session.
///
/// On error the session is unchanged.
pub fn execute(name: &str, input: &Value, session: &mut GameSession) -> Result<Value, GameError> {
    debug!(tool = name, %input, "Executing tool");
    let result = dispatch(name, input, session);
    if let Err(e) = &result {
        warn!(tool = name, error = %e, "Tool failed");
    }
    result
}

fn dispatch(name: &str, input: &Value, session: &mut GameSession) -> Result<Value, GameError> {
    let state = &mut session.state;
    let dice = &mut session.dice;

    match name {
        "create_character" => to_json(create_character(state, args(input)?)),
        "roll_dice" => {
            let RollDice { n, sides } = args(input)?;
            Ok(json!(roll_dice(dice, n, sides)?))
        }
        "roll_ability_check" => {
            let RollAbilityCheck { stat } = args(input)?;
            Ok(json!(roll_ability_check(dice, stat.as_deref())))
        }
        "roll_stats" => {
            let RollStats { stat } = args(input)?;
            Ok(roll_stats(dice, &stat))
        }
        "set_character_property" => {
            let SetCharacterProperty {
                character_name,
                property,
                value,
            } = args(input)?;
            set_character_property(state, &character_name, &property, value)?;
            Ok(json!(format!("Set {property} on {character_name}")))
        }
        "set_player_hp" => {
            let SetPlayerHp { name, value } = args(input)?;
            set_player_hp(state, &name, value)?;
            Ok(json!(format!("{name} now has {value} HP")))
        }
        "set_npc_mood" => {
            let SetNpcMood { name, value } = args(input)?;
            set_npc_mood(state, &name, value)?;
            Ok(json!(format!("{name}'s mood is now {value}")))
        }
        "resolve_initiative" => {
            let ResolveInitiative { name } = args(input)?;
            Ok(json!(resolve_initiative(state, dice, &name)?))
        }
        "read_objectives" => Ok(json!(read_objectives(state))),
        "read_players" => to_json(read_players(state)),
        "read_npcs" => to_json(read_npcs(state)),
        "read_game_state" => to_json(read_game_state(state)),
        "calculator" => {
            let Calculator { expression } = args(input)?;
            Ok(json!(calculator::evaluate(&expression)?))
        }
        "advance_turn" => {
            state.advance_turn();
            Ok(json!({ "turn": state.turn, "day": state.day }))
        }
        "advance_day" => {
            state.advance_day();
            Ok(json!({ "turn": state.turn, "day": state.day }))
        }
        "set_phase" => {
            let SetPhase { phase } = args(input)?;
            let phase: GamePhase = phase.parse()?;
            state.set_phase(phase);
            Ok(json!(format!("Phase is now {phase}")))
        }
        "change_location" => {
            let ChangeLocation { location } = args(input)?;
            state.move_to(location);
            Ok(json!(format!("The party is now at {}", state.current_location)))
        }
        "set_weather" => {
            let SetWeather { weather } = args(input)?;
            state.set_weather(weather);
            Ok(json!(format!("Weather is now {}", state.weather)))
        }
        "add_objective" => {
            let AddObjective { objective } = args(input)?;
            state.add_objective(objective);
            Ok(json!(read_objectives(state)))
        }
        "complete_objective" => {
            let CompleteObjective { objective } = args(input)?;
            state.complete_objective(&objective)?;
            Ok(json!(read_objectives(state)))
        }
        _ => Err(GameError::UnknownTool(name.to_string())),
    }
}

fn args<T: DeserializeOwned>(input: &Value) -> Result<T, GameError> {
    serde_json::from_value(input.clone())
        .map_err(|e| GameError::invalid(format!("Bad tool arguments: {e}")))
}

fn to_json<T: Serialize>(value: T) -> Result<Value, GameError> {
    serde_json::to_value(value).map_err(|e| GameError::invalid(format!("Unserializable result: {e}")))
}

// ============================================================================
// Tools
// ============================================================================

/// Build a character and add it to the roster its `is_player` flag names.
pub fn create_character(state: &mut GameState, params: CreateCharacter) -> Character {
    let character = Character::create(params);
    state.register(character.clone());
    character
}

pub fn roll_dice(dice: &mut Dice, n: i64, sides: i64) -> Result<Vec<u32>, GameError> {
    dice.roll(n, sides)
}

/// A flat d20. The ability named is not added in; callers apply modifiers.
pub fn roll_ability_check(dice: &mut Dice, _stat: Option<&str>) -> u32 {
    dice.roll_d20()
}

/// One generated ability score, keyed by the ability it was rolled for.
pub fn roll_stats(dice: &mut Dice, stat: &str) -> Value {
    let mut result = serde_json::Map::new();
    result.insert(stat.to_string(), json!(dice.roll_ability_block()));
    Value::Object(result)
}

/// Where a `set_character_property` write lands.
#[derive(Debug, PartialEq, Eq)]
enum PropertyPath<'a> {
    Stat(&'a str),
    Skill(&'a str),
    Field(&'a str),
}

impl<'a> PropertyPath<'a> {
    fn parse(property: &'a str) -> Self {
        if let Some(ability) = bracketed(property, "stats") {
            PropertyPath::Stat(ability)
        } else if let Some(skill) = bracketed(property, "skills") {
            PropertyPath::Skill(skill)
        } else {
            PropertyPath::Field(property.trim())
        }
    }
}

/// `prefix[key]` or `prefix['key']` -> `key`.
fn bracketed<'a>(property: &'a str, prefix: &str) -> Option<&'a str> {
    let inner = property
        .trim()
        .strip_prefix(prefix)?
        .strip_prefix('[')?
        .strip_suffix(']')?;
    Some(inner.trim().trim_matches(|c| c == '\'' || c == '"'))
}

/// Integer argument; whole floats such as `18.0` count.
fn int_value(value: &Value) -> Result<i32, GameError> {
    let whole = value.as_i64().or_else(|| {
        value
            .as_f64()
            .filter(|f| f.fract() == 0.0 && *f >= i64::MIN as f64 && *f <= i64::MAX as f64)
            .map(|f| f as i64)
    });
    whole
        .and_then(|v| i32::try_from(v).ok())
        .ok_or_else(|| GameError::invalid(format!("Expected an integer, got {value}")))
}

/// Change one property of the first character named `name`, players first.
pub fn set_character_property(
    state: &mut GameState,
    name: &str,
    property: &str,
    value: Value,
) -> Result<(), GameError> {
    let character = state.find_player_first_mut(name)?;

    match PropertyPath::parse(property) {
        PropertyPath::Stat(key) => {
            let ability: Ability = key.parse().map_err(|_| GameError::FieldNotFound {
                character: character.name.clone(),
                field: property.to_string(),
            })?;
            character.set_ability_score(ability, int_value(&value)?);
        }
        PropertyPath::Skill(key) => {
            let skill: Skill = key.parse()?;
            character.set_proficiency(skill, int_value(&value)?);
        }
        PropertyPath::Field(field) => character.set_field(field, value)?,
    }
    Ok(())
}

/// Set a player's hit points. Values outside `0..=max_hp` are kept as given.
pub fn set_player_hp(state: &mut GameState, name: &str, value: i32) -> Result<(), GameError> {
    state.find_player_mut(name)?.hp = value;
    Ok(())
}

pub fn set_npc_mood(state: &mut GameState, name: &str, value: i32) -> Result<(), GameError> {
    state.find_npc_mut(name)?.mood = value;
    Ok(())
}

pub fn resolve_initiative(state: &GameState, dice: &mut Dice, name: &str) -> Result<i32, GameError> {
    let character = state.find(name)?;
    Ok(dice.roll_d20() as i32 + character.initiative_modifier())
}

pub fn read_objectives(state: &GameState) -> Vec<String> {
    state.objectives.clone()
}

pub fn read_players(state: &GameState) -> Vec<Character> {
    state.players.clone()
}

pub fn read_npcs(state: &GameState) -> Vec<Character> {
    state.npcs.clone()
}

/// Session metadata with the rosters reduced to names.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GameStateSnapshot {
    pub turn: u32,
    pub day: u32,
    pub weather: String,
    pub current_phase: GamePhase,
    pub current_location: String,
    pub locations: Vec<String>,
    pub objectives: Vec<String>,
    pub players: Vec<String>,
    pub npcs: Vec<String>,
}

pub fn read_game_state(state: &GameState) -> GameStateSnapshot {
    let names = |roster: &[Character]| roster.iter().map(|c| c.name.clone()).collect();
    GameStateSnapshot {
        turn: state.turn,
        day: state.day,
        weather: state.weather.clone(),
        current_phase: state.current_phase,
        current_location: state.current_location.clone(),
        locations: state.locations.clone(),
        objectives: state.objectives.clone(),
        players: names(&state.players),
        npcs: names(&state.npcs),
    }
}

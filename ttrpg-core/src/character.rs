//! Characters: ability scores, skills and everything else on the sheet.
//!
//! Player characters and NPCs share one [`Character`] type. The
//! `playable` flag tells them apart, and an optional [`PlayerDetails`]
//! bundle carries what only player characters track.

use crate::error::GameError;
use crate::Tool;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Ability Scores
// ============================================================================

/// The six ability scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Ability {
    Strength,
    Dexterity,
    Intelligence,
    Constitution,
    Wisdom,
    Charisma,
}

impl Ability {
    pub fn abbreviation(&self) -> &'static str {
        match self {
            Ability::Strength => "STR",
            Ability::Dexterity => "DEX",
            Ability::Intelligence => "INT",
            Ability::Constitution => "CON",
            Ability::Wisdom => "WIS",
            Ability::Charisma => "CHA",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Ability::Strength => "Strength",
            Ability::Dexterity => "Dexterity",
            Ability::Intelligence => "Intelligence",
            Ability::Constitution => "Constitution",
            Ability::Wisdom => "Wisdom",
            Ability::Charisma => "Charisma",
        }
    }

    pub fn all() -> [Ability; 6] {
        [
            Ability::Strength,
            Ability::Dexterity,
            Ability::Intelligence,
            Ability::Constitution,
            Ability::Wisdom,
            Ability::Charisma,
        ]
    }
}

impl fmt::Display for Ability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.abbreviation())
    }
}

impl FromStr for Ability {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "strength" | "str" => Ok(Ability::Strength),
            "dexterity" | "dex" => Ok(Ability::Dexterity),
            "intelligence" | "int" => Ok(Ability::Intelligence),
            "constitution" | "con" => Ok(Ability::Constitution),
            "wisdom" | "wis" => Ok(Ability::Wisdom),
            "charisma" | "cha" => Ok(Ability::Charisma),
            _ => Err(GameError::invalid(format!("Unknown ability: {s}"))),
        }
    }
}

/// Modifier for a raw ability score: `floor((score - 10) / 2)`.
///
/// Floors toward negative infinity, so 7 gives -2 and 8 gives -1.
/// Computed in `i64` so every `i32` score has a modifier.
pub fn ability_modifier(score: i32) -> i32 {
    // |(i32 - 10) / 2| always fits back into i32.
    (i64::from(score) - 10).div_euclid(2) as i32
}

/// One integer per ability.
///
/// Used for both the raw scores and the derived modifiers of a character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbilityScores {
    pub strength: i32,
    pub dexterity: i32,
    pub intelligence: i32,
    pub constitution: i32,
    pub wisdom: i32,
    pub charisma: i32,
}

impl AbilityScores {
    pub fn get(&self, ability: Ability) -> i32 {
        match ability {
            Ability::Strength => self.strength,
            Ability::Dexterity => self.dexterity,
            Ability::Intelligence => self.intelligence,
            Ability::Constitution => self.constitution,
            Ability::Wisdom => self.wisdom,
            Ability::Charisma => self.charisma,
        }
    }

    fn set(&mut self, ability: Ability, value: i32) {
        match ability {
            Ability::Strength => self.strength = value,
            Ability::Dexterity => self.dexterity = value,
            Ability::Intelligence => self.intelligence = value,
            Ability::Constitution => self.constitution = value,
            Ability::Wisdom => self.wisdom = value,
            Ability::Charisma => self.charisma = value,
        }
    }

    /// The modifier table derived from these raw scores.
    pub fn modifiers(&self) -> AbilityScores {
        AbilityScores {
            strength: ability_modifier(self.strength),
            dexterity: ability_modifier(self.dexterity),
            intelligence: ability_modifier(self.intelligence),
            constitution: ability_modifier(self.constitution),
            wisdom: ability_modifier(self.wisdom),
            charisma: ability_modifier(self.charisma),
        }
    }
}

impl Default for AbilityScores {
    fn default() -> Self {
        Self {
            strength: 10,
            dexterity: 10,
            intelligence: 10,
            constitution: 10,
            wisdom: 10,
            charisma: 10,
        }
    }
}

// ============================================================================
// Skills
// ============================================================================

/// The eighteen skills, each tied to one ability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Skill {
    Athletics,
    Acrobatics,
    SleightOfHand,
    Stealth,
    Arcana,
    History,
    Investigation,
    Nature,
    Religion,
    AnimalHandling,
    Insight,
    Medicine,
    Perception,
    Survival,
    Deception,
    Intimidation,
    Performance,
    Persuasion,
}

impl Skill {
    pub fn ability(&self) -> Ability {
        match self {
            Skill::Athletics => Ability::Strength,
            Skill::Acrobatics | Skill::SleightOfHand | Skill::Stealth => Ability::Dexterity,
            Skill::Arcana
            | Skill::History
            | Skill::Investigation
            | Skill::Nature
            | Skill::Religion => Ability::Intelligence,
            Skill::AnimalHandling
            | Skill::Insight
            | Skill::Medicine
            | Skill::Perception
            | Skill::Survival => Ability::Wisdom,
            Skill::Deception | Skill::Intimidation | Skill::Performance | Skill::Persuasion => {
                Ability::Charisma
            }
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Skill::Athletics => "Athletics",
            Skill::Acrobatics => "Acrobatics",
            Skill::SleightOfHand => "Sleight of Hand",
            Skill::Stealth => "Stealth",
            Skill::Arcana => "Arcana",
            Skill::History => "History",
            Skill::Investigation => "Investigation",
            Skill::Nature => "Nature",
            Skill::Religion => "Religion",
            Skill::AnimalHandling => "Animal Handling",
            Skill::Insight => "Insight",
            Skill::Medicine => "Medicine",
            Skill::Perception => "Perception",
            Skill::Survival => "Survival",
            Skill::Deception => "Deception",
            Skill::Intimidation => "Intimidation",
            Skill::Performance => "Performance",
            Skill::Persuasion => "Persuasion",
        }
    }

    pub fn all() -> [Skill; 18] {
        [
            Skill::Athletics,
            Skill::Acrobatics,
            Skill::SleightOfHand,
            Skill::Stealth,
            Skill::Arcana,
            Skill::History,
            Skill::Investigation,
            Skill::Nature,
            Skill::Religion,
            Skill::AnimalHandling,
            Skill::Insight,
            Skill::Medicine,
            Skill::Perception,
            Skill::Survival,
            Skill::Deception,
            Skill::Intimidation,
            Skill::Performance,
            Skill::Persuasion,
        ]
    }
}

impl fmt::Display for Skill {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Skill {
    type Err = GameError;

    /// Accepts `sleight_of_hand`, `Sleight of Hand`, `SLEIGHTOFHAND`, ...
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .chars()
            .filter(|c| !matches!(c, '_' | ' ' | '-'))
            .collect::<String>()
            .to_lowercase();
        Skill::all()
            .into_iter()
            .find(|skill| skill.name().replace(' ', "").to_lowercase() == key)
            .ok_or_else(|| GameError::UnknownSkill(s.to_string()))
    }
}

// ============================================================================
// Combat and special abilities
// ============================================================================

/// An attack the character can make.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attack {
    pub name: String,
    /// Damage dice, e.g. "1d8+2".
    #[serde(default)]
    pub damage: String,
    #[serde(default)]
    pub damage_type: String,
}

/// A spell the character knows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Spell {
    pub name: String,
    #[serde(default)]
    pub level: i32,
    #[serde(default)]
    pub school: String,
}

/// A damage resistance or vulnerability.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DamageTrait {
    pub damage_type: String,
    #[serde(default)]
    pub description: String,
}

/// Attributes only player characters carry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerDetails {
    #[serde(default)]
    pub equipment: Vec<String>,
    /// Abilities the character is proficient in saving with, e.g. "STR".
    #[serde(default)]
    pub saving_throws: Vec<String>,
    #[serde(default)]
    pub traits: Vec<String>,
}

// ============================================================================
// Character creation
// ============================================================================

fn default_speed() -> i32 {
    30
}

/// Create a character (player or NPC) with the given attributes and add it to the game.
#[derive(Debug, Clone, Tool, Deserialize)]
#[tool(name = "create_character")]
pub struct CreateCharacter {
    /// Whether this is a player character (true) or an NPC (false)
    pub is_player: bool,
    /// The name of the character
    pub name: String,
    /// The race of the character
    pub race: String,
    /// The class of the character
    pub class_type: String,
    /// The alignment of the character
    pub alignment: String,
    /// The strength score
    pub strength: i32,
    /// The dexterity score
    pub dexterity: i32,
    /// The intelligence score
    pub intelligence: i32,
    /// The constitution score
    pub constitution: i32,
    /// The wisdom score
    pub wisdom: i32,
    /// The charisma score
    pub charisma: i32,
    /// Movement speed in feet
    #[serde(default = "default_speed")]
    pub speed: i32,
    /// Current (and maximum) hit points
    pub hp: i32,
    /// Type of hit dice (e.g. 6 for d6, 8 for d8)
    pub hit_dice: i32,
    /// Disposition toward the player; higher is friendlier
    pub mood: i32,
    /// Proficiency bonus in Acrobatics (DEX)
    #[serde(default)]
    pub acrobatics: i32,
    /// Proficiency bonus in Animal Handling (WIS)
    #[serde(default)]
    pub animal_handling: i32,
    /// Proficiency bonus in Arcana (INT)
    #[serde(default)]
    pub arcana: i32,
    /// Proficiency bonus in Athletics (STR)
    #[serde(default)]
    pub athletics: i32,
    /// Proficiency bonus in Deception (CHA)
    #[serde(default)]
    pub deception: i32,
    /// Proficiency bonus in History (INT)
    #[serde(default)]
    pub history: i32,
    /// Proficiency bonus in Insight (WIS)
    #[serde(default)]
    pub insight: i32,
    /// Proficiency bonus in Intimidation (CHA)
    #[serde(default)]
    pub intimidation: i32,
    /// Proficiency bonus in Investigation (INT)
    #[serde(default)]
    pub investigation: i32,
    /// Proficiency bonus in Medicine (WIS)
    #[serde(default)]
    pub medicine: i32,
    /// Proficiency bonus in Nature (INT)
    #[serde(default)]
    pub nature: i32,
    /// Proficiency bonus in Perception (WIS)
    #[serde(default)]
    pub perception: i32,
    /// Proficiency bonus in Performance (CHA)
    #[serde(default)]
    pub performance: i32,
    /// Proficiency bonus in Persuasion (CHA)
    #[serde(default)]
    pub persuasion: i32,
    /// Proficiency bonus in Religion (INT)
    #[serde(default)]
    pub religion: i32,
    /// Proficiency bonus in Sleight of Hand (DEX)
    #[serde(default)]
    pub sleight_of_hand: i32,
    /// Proficiency bonus in Stealth (DEX)
    #[serde(default)]
    pub stealth: i32,
    /// Proficiency bonus in Survival (WIS)
    #[serde(default)]
    pub survival: i32,
    /// Attacks as objects with name, damage and damage_type
    #[serde(default)]
    pub attacks: Vec<Attack>,
    /// Spells as objects with name, level and school
    #[serde(default)]
    pub spells: Vec<Spell>,
    /// Damage resistances as objects with damage_type and description
    #[serde(default)]
    pub resistances: Vec<DamageTrait>,
    /// Damage vulnerabilities as objects with damage_type and description
    #[serde(default)]
    pub vulnerabilities: Vec<DamageTrait>,
    /// Player-only equipment, saving throw proficiencies and traits
    #[serde(default)]
    pub player_details: Option<PlayerDetails>,
}

impl CreateCharacter {
    fn ability_scores(&self) -> AbilityScores {
        AbilityScores {
            strength: self.strength,
            dexterity: self.dexterity,
            intelligence: self.intelligence,
            constitution: self.constitution,
            wisdom: self.wisdom,
            charisma: self.charisma,
        }
    }

    fn proficiency(&self, skill: Skill) -> i32 {
        match skill {
            Skill::Athletics => self.athletics,
            Skill::Acrobatics => self.acrobatics,
            Skill::SleightOfHand => self.sleight_of_hand,
            Skill::Stealth => self.stealth,
            Skill::Arcana => self.arcana,
            Skill::History => self.history,
            Skill::Investigation => self.investigation,
            Skill::Nature => self.nature,
            Skill::Religion => self.religion,
            Skill::AnimalHandling => self.animal_handling,
            Skill::Insight => self.insight,
            Skill::Medicine => self.medicine,
            Skill::Perception => self.perception,
            Skill::Survival => self.survival,
            Skill::Deception => self.deception,
            Skill::Intimidation => self.intimidation,
            Skill::Performance => self.performance,
            Skill::Persuasion => self.persuasion,
        }
    }
}

// ============================================================================
// Character
// ============================================================================

/// A player character or NPC.
///
/// Raw ability scores and their modifiers are stored side by side and can
/// only change together through [`Character::set_ability_score`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Character {
    pub name: String,
    pub playable: bool,
    pub race: String,
    pub class_type: String,
    pub alignment: String,
    stats: AbilityScores,
    stat_modifiers: AbilityScores,
    pub speed: i32,
    pub hp: i32,
    pub max_hp: i32,
    pub hit_dice: i32,
    /// Proficiency bonus per skill; 0 means not proficient.
    skills: BTreeMap<Skill, i32>,
    pub attacks: Vec<Attack>,
    pub spells: Vec<Spell>,
    pub resistances: Vec<DamageTrait>,
    pub vulnerabilities: Vec<DamageTrait>,
    pub conditions: Vec<String>,
    pub mood: i32,
    pub player_details: Option<PlayerDetails>,
}

impl Character {
    /// Build a character from a complete set of attributes.
    pub fn create(params: CreateCharacter) -> Self {
        let stats = params.ability_scores();
        let skills = Skill::all()
            .into_iter()
            .map(|skill| (skill, params.proficiency(skill)))
            .collect();

        Self {
            stat_modifiers: stats.modifiers(),
            stats,
            skills,
            playable: params.is_player,
            name: params.name,
            race: params.race,
            class_type: params.class_type,
            alignment: params.alignment,
            speed: params.speed,
            hp: params.hp,
            max_hp: params.hp,
            hit_dice: params.hit_dice,
            attacks: params.attacks,
            spells: params.spells,
            resistances: params.resistances,
            vulnerabilities: params.vulnerabilities,
            conditions: Vec::new(),
            mood: params.mood,
            player_details: params.player_details,
        }
    }

    /// Raw ability scores.
    pub fn stats(&self) -> &AbilityScores {
        &self.stats
    }

    /// Ability modifiers derived from the raw scores.
    pub fn stat_modifiers(&self) -> &AbilityScores {
        &self.stat_modifiers
    }

    pub fn score(&self, ability: Ability) -> i32 {
        self.stats.get(ability)
    }

    pub fn modifier(&self, ability: Ability) -> i32 {
        self.stat_modifiers.get(ability)
    }

    /// Change a raw ability score and its modifier in one step.
    pub fn set_ability_score(&mut self, ability: Ability, value: i32) {
        self.stats.set(ability, value);
        self.stat_modifiers.set(ability, ability_modifier(value));
    }

    pub fn initiative_modifier(&self) -> i32 {
        self.modifier(Ability::Dexterity)
    }

    /// Proficiency bonus in a skill.
    pub fn proficiency(&self, skill: Skill) -> i32 {
        self.skills.get(&skill).copied().unwrap_or(0)
    }

    pub fn set_proficiency(&mut self, skill: Skill, bonus: i32) {
        self.skills.insert(skill, bonus);
    }

    /// Ability modifier plus proficiency bonus, saturating at the `i32` bounds.
    pub fn skill_bonus(&self, skill: Skill) -> i32 {
        self.modifier(skill.ability())
            .saturating_add(self.proficiency(skill))
    }

    /// Total modifier for a skill named by the caller.
    pub fn skill_modifier(&self, skill_name: &str) -> Result<i32, GameError> {
        let skill: Skill = skill_name.parse()?;
        Ok(self.skill_bonus(skill))
    }

    /// Whether the character has a positive proficiency bonus in the named skill.
    pub fn is_proficient(&self, skill_name: &str) -> Result<bool, GameError> {
        let skill: Skill = skill_name.parse()?;
        Ok(self.proficiency(skill) > 0)
    }

    /// Every field name [`Character::set_field`] accepts.
    pub fn settable_fields() -> &'static [&'static str] {
        SETTABLE_FIELDS
    }

    /// Assign a JSON value to one of the settable fields.
    ///
    /// Unknown names are `FieldNotFound`; values of the wrong shape are
    /// `InvalidArgument`. Either way the character is left untouched.
    pub fn set_field(&mut self, field: &str, value: Value) -> Result<(), GameError> {
        if assign_field(self, field, value)? {
            Ok(())
        } else {
            Err(GameError::FieldNotFound {
                character: self.name.clone(),
                field: field.to_string(),
            })
        }
    }
}

fn decode<T: DeserializeOwned>(field: &str, value: Value) -> Result<T, GameError> {
    serde_json::from_value(value)
        .map_err(|e| GameError::invalid(format!("Bad value for {field}: {e}")))
}

/// Closed dispatch from field name to a typed assignment.
macro_rules! settable_fields {
    ($($field:ident),* $(,)?) => {
        const SETTABLE_FIELDS: &[&str] = &[$(stringify!($field)),*];

        /// Returns `Ok(false)` when `field` is not settable.
        fn assign_field(
            character: &mut Character,
            field: &str,
            value: Value,
        ) -> Result<bool, GameError> {
            match field {
                $(stringify!($field) => character.$field = decode(field, value)?,)*
                _ => return Ok(false),
            }
            Ok(true)
        }
    };
}

settable_fields!(
    playable,
    race,
    class_type,
    alignment,
    speed,
    hp,
    max_hp,
    hit_dice,
    mood,
    attacks,
    spells,
    resistances,
    vulnerabilities,
    conditions,
    player_details,
);

fn join_or_none<T>(items: &[T], show: impl Fn(&T) -> String) -> String {
    if items.is_empty() {
        "None".to_string()
    } else {
        items.iter().map(show).collect::<Vec<_>>().join(", ")
    }
}

impl fmt::Display for Character {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Character Information:")?;
        writeln!(f, "==================")?;
        writeln!(f, "Basic Attributes:")?;
        writeln!(f, "- Name: {}", self.name)?;
        writeln!(f, "- Race: {}", self.race)?;
        writeln!(f, "- Class: {}", self.class_type)?;
        writeln!(f, "- Alignment: {}", self.alignment)?;
        writeln!(f, "- Playable: {}", self.playable)?;
        writeln!(f)?;

        writeln!(f, "Combat Stats:")?;
        writeln!(f, "- HP: {}/{}", self.hp, self.max_hp)?;
        writeln!(f, "- Speed: {}", self.speed)?;
        writeln!(f, "- Hit Dice: d{}", self.hit_dice)?;
        writeln!(
            f,
            "- Attacks: {}",
            join_or_none(&self.attacks, |a| format!("{} ({} {})", a.name, a.damage, a.damage_type))
        )?;
        writeln!(
            f,
            "- Spells: {}",
            join_or_none(&self.spells, |s| format!("{} (level {})", s.name, s.level))
        )?;
        writeln!(f)?;

        writeln!(f, "Ability Scores:")?;
        for ability in Ability::all() {
            writeln!(
                f,
                "- {}: {} (Mod: {:+})",
                ability.name(),
                self.score(ability),
                self.modifier(ability)
            )?;
        }
        writeln!(f)?;

        writeln!(f, "Skills:")?;
        for ability in Ability::all() {
            let skills: Vec<Skill> = Skill::all()
                .into_iter()
                .filter(|s| s.ability() == ability)
                .collect();
            if skills.is_empty() {
                continue;
            }
            writeln!(f, "{}-based skills:", ability.name())?;
            for skill in skills {
                let mark = if self.proficiency(skill) > 0 { "✓" } else { "✗" };
                writeln!(f, "  - {}: {:+} ({mark})", skill.name(), self.skill_bonus(skill))?;
            }
        }
        writeln!(f)?;

        writeln!(f, "Status Effects:")?;
        writeln!(f, "- Conditions: {}", join_or_none(&self.conditions, String::clone))?;
        writeln!(
            f,
            "- Resistances: {}",
            join_or_none(&self.resistances, |r| r.damage_type.clone())
        )?;
        writeln!(
            f,
            "- Vulnerabilities: {}",
            join_or_none(&self.vulnerabilities, |v| v.damage_type.clone())
        )?;
        writeln!(f)?;

        writeln!(f, "Social:")?;
        write!(f, "- Mood: {}", self.mood)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{sample_hero, sample_wizard};
    use serde_json::json;

    #[test]
    fn test_modifier_floor_division() {
        assert_eq!(ability_modifier(16), 3);
        assert_eq!(ability_modifier(7), -2);
        assert_eq!(ability_modifier(8), -1);
        assert_eq!(ability_modifier(9), -1);
        assert_eq!(ability_modifier(10), 0);
        assert_eq!(ability_modifier(11), 0);
        assert_eq!(ability_modifier(1), -5);
        assert_eq!(ability_modifier(30), 10);
    }

    #[test]
    fn test_modifier_formula_over_full_range() {
        for score in 1..=30 {
            let expected = ((score - 10) as f64 / 2.0).floor() as i32;
            assert_eq!(ability_modifier(score), expected, "score {score}");
        }
    }

    #[test]
    fn test_modifier_at_integer_extremes() {
        assert_eq!(ability_modifier(i32::MIN), -1_073_741_829);
        assert_eq!(ability_modifier(i32::MAX), 1_073_741_818);

        let mut hero = Character::create(sample_hero("Jimmy the Hero"));
        hero.set_ability_score(Ability::Strength, i32::MAX);
        hero.set_proficiency(Skill::Athletics, i32::MAX);
        assert_eq!(hero.skill_bonus(Skill::Athletics), i32::MAX);

        hero.set_ability_score(Ability::Strength, i32::MIN);
        hero.set_proficiency(Skill::Athletics, i32::MIN);
        assert_eq!(hero.skill_bonus(Skill::Athletics), i32::MIN);
    }

    #[test]
    fn test_create_computes_modifiers() {
        let hero = Character::create(sample_hero("Jimmy the Hero"));
        assert_eq!(hero.score(Ability::Strength), 16);
        assert_eq!(hero.modifier(Ability::Strength), 3);
        assert_eq!(hero.modifier(Ability::Dexterity), 2);
        assert_eq!(hero.modifier(Ability::Intelligence), -1);
        assert_eq!(hero.max_hp, hero.hp);
        assert!(hero.conditions.is_empty());
    }

    #[test]
    fn test_set_ability_score_updates_modifier() {
        let mut hero = Character::create(sample_hero("Jimmy the Hero"));
        hero.set_ability_score(Ability::Strength, 18);
        assert_eq!(hero.score(Ability::Strength), 18);
        assert_eq!(hero.modifier(Ability::Strength), 4);

        hero.set_ability_score(Ability::Strength, 7);
        assert_eq!(hero.modifier(Ability::Strength), -2);
    }

    #[test]
    fn test_skill_modifier_tracks_ability_changes() {
        let mut hero = Character::create(sample_hero("Jimmy the Hero"));
        // athletics proficiency 2, STR 16
        assert_eq!(hero.skill_modifier("athletics").unwrap(), 5);

        hero.set_ability_score(Ability::Strength, 10);
        assert_eq!(hero.skill_modifier("athletics").unwrap(), 2);
    }

    #[test]
    fn test_skill_names_are_flexible() {
        let wizard = Character::create(sample_wizard("Eldrin"));
        let plain = wizard.skill_modifier("sleight_of_hand").unwrap();
        assert_eq!(wizard.skill_modifier("Sleight of Hand").unwrap(), plain);
        assert_eq!(wizard.skill_modifier("ANIMAL_HANDLING").unwrap(), wizard.modifier(Ability::Wisdom));
    }

    #[test]
    fn test_is_proficient() {
        let wizard = Character::create(sample_wizard("Eldrin"));
        assert!(wizard.is_proficient("arcana").unwrap());
        assert!(!wizard.is_proficient("athletics").unwrap());
    }

    #[test]
    fn test_unknown_skill() {
        let wizard = Character::create(sample_wizard("Eldrin"));
        assert_eq!(
            wizard.skill_modifier("basket_weaving"),
            Err(GameError::UnknownSkill("basket_weaving".to_string()))
        );
        assert!(matches!(wizard.is_proficient("cooking"), Err(GameError::UnknownSkill(_))));
    }

    #[test]
    fn test_eighteen_skills_with_bound_abilities() {
        assert_eq!(Skill::all().len(), 18);
        assert_eq!(Skill::Athletics.ability(), Ability::Strength);
        assert_eq!(Skill::Stealth.ability(), Ability::Dexterity);
        assert_eq!(Skill::Religion.ability(), Ability::Intelligence);
        assert_eq!(Skill::Survival.ability(), Ability::Wisdom);
        assert_eq!(Skill::Persuasion.ability(), Ability::Charisma);
        for skill in Skill::all() {
            assert_eq!(skill.name().parse::<Skill>().unwrap(), skill);
        }
    }

    #[test]
    fn test_parse_ability() {
        assert_eq!("strength".parse::<Ability>().unwrap(), Ability::Strength);
        assert_eq!("DEX".parse::<Ability>().unwrap(), Ability::Dexterity);
        assert_eq!(" Wisdom ".parse::<Ability>().unwrap(), Ability::Wisdom);
        assert!("luck".parse::<Ability>().is_err());
    }

    #[test]
    fn test_set_field() {
        let mut hero = Character::create(sample_hero("Jimmy the Hero"));
        hero.set_field("hp", json!(3)).unwrap();
        hero.set_field("mood", json!(-4)).unwrap();
        hero.set_field("conditions", json!(["poisoned"])).unwrap();
        hero.set_field("race", json!("Half-Orc")).unwrap();
        assert_eq!(hero.hp, 3);
        assert_eq!(hero.mood, -4);
        assert_eq!(hero.conditions, vec!["poisoned".to_string()]);
        assert_eq!(hero.race, "Half-Orc");
    }

    #[test]
    fn test_set_field_hp_not_clamped() {
        let mut hero = Character::create(sample_hero("Jimmy the Hero"));
        hero.set_field("hp", json!(-7)).unwrap();
        assert_eq!(hero.hp, -7);
        hero.set_field("hp", json!(hero.max_hp + 50)).unwrap();
        assert_eq!(hero.hp, hero.max_hp + 50);
    }

    #[test]
    fn test_set_field_unknown() {
        let mut hero = Character::create(sample_hero("Jimmy the Hero"));
        let before = hero.clone();
        let err = hero.set_field("gold", json!(100)).unwrap_err();
        assert_eq!(
            err,
            GameError::FieldNotFound {
                character: "Jimmy the Hero".to_string(),
                field: "gold".to_string(),
            }
        );
        // name is the roster key and stays out of the table
        assert!(hero.set_field("name", json!("Bob")).is_err());
        assert_eq!(hero, before);
    }

    #[test]
    fn test_set_field_wrong_type() {
        let mut hero = Character::create(sample_hero("Jimmy the Hero"));
        let err = hero.set_field("hp", json!("lots")).unwrap_err();
        assert!(matches!(err, GameError::InvalidArgument(_)));
        assert_eq!(hero.hp, 12);
    }

    #[test]
    fn test_settable_fields_enumerable() {
        let fields = Character::settable_fields();
        assert!(fields.contains(&"hp"));
        assert!(fields.contains(&"mood"));
        assert!(!fields.contains(&"name"));
        assert!(!fields.contains(&"stats"));
    }

    #[test]
    fn test_lists_are_independent() {
        let params = sample_hero("Twin");
        let mut a = Character::create(params.clone());
        let b = Character::create(params);
        a.attacks.push(Attack {
            name: "Headbutt".to_string(),
            damage: "1d4".to_string(),
            damage_type: "bludgeoning".to_string(),
        });
        a.spells.push(Spell {
            name: "Light".to_string(),
            level: 0,
            school: "evocation".to_string(),
        });
        assert_eq!(b.attacks.len(), 1);
        assert!(b.spells.is_empty());
    }

    #[test]
    fn test_create_with_defaults() {
        let params: CreateCharacter = serde_json::from_value(json!({
            "is_player": false,
            "name": "Goblin",
            "race": "Goblin",
            "class_type": "Scout",
            "alignment": "Neutral Evil",
            "strength": 8, "dexterity": 14, "intelligence": 10,
            "constitution": 10, "wisdom": 8, "charisma": 8,
            "hp": 7, "hit_dice": 6, "mood": -3
        }))
        .unwrap();
        let goblin = Character::create(params);
        assert_eq!(goblin.speed, 30);
        assert!(Skill::all().iter().all(|&s| goblin.proficiency(s) == 0));
        assert!(goblin.attacks.is_empty());
        assert!(goblin.player_details.is_none());
    }

    #[test]
    fn test_sheet_display() {
        let hero = Character::create(sample_hero("Jimmy the Hero"));
        let sheet = hero.to_string();
        assert!(sheet.contains("- Name: Jimmy the Hero"));
        assert!(sheet.contains("- Strength: 16 (Mod: +3)"));
        assert!(sheet.contains("  - Athletics: +5 (✓)"));
        assert!(sheet.contains("  - Arcana: -1 (✗)"));
        assert!(sheet.contains("- Mood: 5"));
    }

    #[test]
    fn test_serialize_exposes_both_tables() {
        let hero = Character::create(sample_hero("Jimmy the Hero"));
        let value = serde_json::to_value(&hero).unwrap();
        assert_eq!(value["stats"]["strength"], 16);
        assert_eq!(value["stat_modifiers"]["strength"], 3);
        assert_eq!(value["skills"]["athletics"], 2);
    }
}

//! Dice rolling.
//!
//! Every probabilistic operation in the game goes through [`Dice`], which
//! is owned by the session so tests and replays can seed or script it.

use crate::error::GameError;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::VecDeque;

/// Number of dice rolled when generating an ability score.
const ABILITY_DICE: i64 = 4;
/// Dice kept (highest) when generating an ability score.
const ABILITY_KEEP: usize = 3;
/// Most dice a single [`Dice::roll`] will throw.
pub const MAX_DICE: i64 = 1000;

/// Source of uniformly distributed die rolls.
#[derive(Debug, Clone)]
pub struct Dice {
    rng: StdRng,
    /// Faces returned verbatim before falling back to `rng`.
    loaded: VecDeque<u32>,
}

impl Dice {
    /// Dice seeded from OS entropy.
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
            loaded: VecDeque::new(),
        }
    }

    /// Reproducible dice for a given seed.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            loaded: VecDeque::new(),
        }
    }

    /// Dice that return `faces` in order, then roll randomly.
    ///
    /// Scripted faces are not checked against the die size.
    pub fn loaded(faces: impl IntoIterator<Item = u32>) -> Self {
        Self {
            rng: StdRng::from_entropy(),
            loaded: faces.into_iter().collect(),
        }
    }

    /// Queue more scripted faces behind any already loaded.
    pub fn load(&mut self, faces: impl IntoIterator<Item = u32>) {
        self.loaded.extend(faces);
    }

    /// Roll `n` dice with `sides` faces each.
    ///
    /// A one-sided die is legal and always shows 1. Fewer than one die,
    /// more than [`MAX_DICE`], or a side count outside `1..=u32::MAX` is an
    /// `InvalidArgument`.
    pub fn roll(&mut self, n: i64, sides: i64) -> Result<Vec<u32>, GameError> {
        if n < 1 {
            return Err(GameError::invalid("Number of dice must be at least 1."));
        }
        if n > MAX_DICE {
            return Err(GameError::invalid(format!(
                "At most {MAX_DICE} dice can be rolled at once, got {n}."
            )));
        }
        if sides < 1 {
            return Err(GameError::invalid(format!("A die needs at least one side, got {sides}.")));
        }
        let sides = u32::try_from(sides).map_err(|_| {
            GameError::invalid(format!("A die can have at most {} sides, got {sides}.", u32::MAX))
        })?;

        Ok((0..n).map(|_| self.roll_die(sides)).collect())
    }

    /// One twenty-sided die.
    pub fn roll_d20(&mut self) -> u32 {
        self.roll_die(20)
    }

    /// Generate one ability score: roll 4d6 and sum the best three.
    pub fn roll_ability_block(&mut self) -> u32 {
        let rolls: Vec<u32> = (0..ABILITY_DICE).map(|_| self.roll_die(6)).collect();
        keep_highest(&rolls, ABILITY_KEEP)
    }

    fn roll_die(&mut self, sides: u32) -> u32 {
        match self.loaded.pop_front() {
            Some(face) => face,
            None => self.rng.gen_range(1..=sides),
        }
    }
}

impl Default for Dice {
    fn default() -> Self {
        Self::new()
    }
}

/// Sum of the `keep` highest rolls.
pub fn keep_highest(rolls: &[u32], keep: usize) -> u32 {
    let mut sorted = rolls.to_vec();
    sorted.sort_unstable_by(|a, b| b.cmp(a));
    sorted.iter().take(keep).sum()
}

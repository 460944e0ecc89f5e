//! Encounter definitions handed over by the dungeon/encounter generator.
//!
//! An encounter names the templates on each side and the reward bundle that
//! is granted on victory. The engine never rolls drops itself; the bundle is
//! passed through untouched for the progression system to apply.

use serde::{Deserialize, Serialize};

use crate::template::TemplateId;

/// One unit slot in a roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterEntry {
    /// Template to build the unit from.
    pub template: TemplateId,
    /// Levels added to (or removed from) the template's base level.
    #[serde(default)]
    pub level_offset: i32,
}

impl RosterEntry {
    /// Creates an entry.
    #[must_use]
    pub fn new(template: &str, level_offset: i32) -> Self {
        Self {
            template: TemplateId::new(template),
            level_offset,
        }
    }
}

/// A possible item drop, rolled by the progression system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemDrop {
    /// Item catalog id.
    pub item: String,
    /// Quantity granted when the roll succeeds.
    #[serde(default = "one")]
    pub quantity: u32,
    /// Drop probability in `[0, 1]`.
    pub chance: f64,
}

fn one() -> u32 {
    1
}

/// Spoils granted on victory.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RewardBundle {
    /// Spirit stones (currency).
    #[serde(default)]
    pub spirit_stones: u64,
    /// Cultivation experience.
    #[serde(default)]
    pub experience: u64,
    /// Drop table for the progression system to roll.
    #[serde(default)]
    pub drops: Vec<ItemDrop>,
}

/// A complete encounter: both rosters plus the reward.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EncounterDef {
    /// Player-side roster.
    #[serde(default)]
    pub allies: Vec<RosterEntry>,
    /// Opposing roster.
    #[serde(default)]
    pub enemies: Vec<RosterEntry>,
    /// Reward granted on victory.
    #[serde(default)]
    pub reward: RewardBundle,
}

impl EncounterDef {
    /// Creates an encounter with no reward.
    #[must_use]
    pub fn new(allies: Vec<RosterEntry>, enemies: Vec<RosterEntry>) -> Self {
        Self {
            allies,
            enemies,
            reward: RewardBundle::default(),
        }
    }

    /// Sets the reward.
    #[must_use]
    pub fn with_reward(mut self, reward: RewardBundle) -> Self {
        self.reward = reward;
        self
    }
}

//! Combatant templates: the catalog blueprint a battle unit is built from.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::element::Element;
use crate::skill::SkillId;

/// Unique identifier for a combatant template.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TemplateId(String);

impl TemplateId {
    /// Creates a new `TemplateId` from a string.
    #[must_use]
    pub fn new(id: &str) -> Self {
        Self(id.to_string())
    }

    /// Returns the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TemplateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for TemplateId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Blueprint for a combatant.
///
/// Level-derived base stats are scaled by the multipliers here. A multiplier
/// of 1.0 gives the plain growth curve for the level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombatantTemplate {
    /// Catalog id.
    pub id: TemplateId,
    /// Display name.
    pub name: String,
    /// Elemental affinity.
    #[serde(default)]
    pub element: Element,
    /// Cultivation level before any encounter offset.
    #[serde(default = "default_level")]
    pub base_level: u32,
    /// Scale on level-derived hp.
    #[serde(default = "unit")]
    pub hp_multiplier: f64,
    /// Scale on level-derived attack.
    #[serde(default = "unit")]
    pub attack_multiplier: f64,
    /// Scale on level-derived defense.
    #[serde(default = "unit")]
    pub defense_multiplier: f64,
    /// Scale on level-derived speed.
    #[serde(default = "unit")]
    pub speed_multiplier: f64,
    /// Crit chance override in `[0, 1]`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crit_rate: Option<f64>,
    /// Crit damage multiplier override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crit_damage: Option<f64>,
    /// Skills the unit owns, in slot order.
    #[serde(default)]
    pub skills: Vec<SkillId>,
}

fn default_level() -> u32 {
    1
}

fn unit() -> f64 {
    1.0
}

impl CombatantTemplate {
    /// Creates a neutral level-1 template with unit multipliers and no skills.
    #[must_use]
    pub fn new(id: &str, name: &str) -> Self {
        Self {
            id: TemplateId::new(id),
            name: name.to_string(),
            element: Element::Neutral,
            base_level: 1,
            hp_multiplier: 1.0,
            attack_multiplier: 1.0,
            defense_multiplier: 1.0,
            speed_multiplier: 1.0,
            crit_rate: None,
            crit_damage: None,
            skills: Vec::new(),
        }
    }

    /// Sets the element.
    #[must_use]
    pub fn with_element(mut self, element: Element) -> Self {
        self.element = element;
        self
    }

    /// Sets the base level.
    #[must_use]
    pub fn with_level(mut self, level: u32) -> Self {
        self.base_level = level;
        self
    }

    /// Sets the hp, attack, defense and speed multipliers.
    #[must_use]
    pub fn with_multipliers(mut self, hp: f64, attack: f64, defense: f64, speed: f64) -> Self {
        self.hp_multiplier = hp;
        self.attack_multiplier = attack;
        self.defense_multiplier = defense;
        self.speed_multiplier = speed;
        self
    }

    /// Overrides crit chance and crit damage.
    #[must_use]
    pub fn with_crit(mut self, rate: f64, damage: f64) -> Self {
        self.crit_rate = Some(rate);
        self.crit_damage = Some(damage);
        self
    }

    /// Appends an owned skill.
    #[must_use]
    pub fn with_skill(mut self, skill: &str) -> Self {
        self.skills.push(SkillId::new(skill));
        self
    }

    /// Validates the numeric fields, returning a description of the first problem.
    pub fn check(&self) -> Result<(), String> {
        let multipliers = [
            ("hp", self.hp_multiplier),
            ("attack", self.attack_multiplier),
            ("defense", self.defense_multiplier),
            ("speed", self.speed_multiplier),
        ];
        for (name, value) in multipliers {
            if !value.is_finite() || value < 0.0 {
                return Err(format!("{name} multiplier must be finite and non-negative"));
            }
        }
        if let Some(rate) = self.crit_rate {
            if !(0.0..=1.0).contains(&rate) {
                return Err(format!("crit rate {rate} is outside [0, 1]"));
            }
        }
        if let Some(damage) = self.crit_damage {
            if !damage.is_finite() || damage < 1.0 {
                return Err(format!("crit damage {damage} must be at least 1.0"));
            }
        }
        Ok(())
    }
}

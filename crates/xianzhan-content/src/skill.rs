//! Skill definitions and their secondary effects.
//!
//! A [`SkillDef`] is immutable catalog data. Combatants carry clones of the
//! definitions they own alongside a per-instance cooldown counter; the catalog
//! itself is never mutated during a battle.
//!
//! # Example
//!
//! ```
//! use xianzhan_content::skill::{EffectSpec, SkillCategory, SkillDef, TargetMode};
//! use xianzhan_content::status::StatusKind;
//! use xianzhan_content::element::Element;
//!
//! let skill = SkillDef::new("flame_palm", "Flame Palm", SkillCategory::Attack)
//!     .with_element(Element::Fire)
//!     .with_cost(10)
//!     .with_cooldown(2)
//!     .with_multiplier(1.4)
//!     .with_effect(EffectSpec::dot(6.0, 3).with_chance(0.5).with_status(StatusKind::Burn));
//!
//! assert!(skill.is_hostile());
//! assert!(skill.check().is_ok());
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::element::Element;
use crate::status::{Polarity, StatusKind};

/// Status duration used when an effect spec omits one.
pub const DEFAULT_STATUS_DURATION: u32 = 2;

/// Unique identifier for a skill definition.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SkillId(String);

impl SkillId {
    /// Creates a new `SkillId` from a string.
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

impl fmt::Display for SkillId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for SkillId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for SkillId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Broad role of a skill, used by the AI decision table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkillCategory {
    /// Ordinary offensive technique.
    Attack,
    /// Guarding or warding technique.
    Defense,
    /// Healing or empowering technique.
    Support,
    /// Signature finishing technique.
    Ultimate,
}

/// Which units a skill lands on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetMode {
    /// The explicitly chosen target.
    Single,
    /// Every living unit on the affected side.
    All,
    /// The caster.
    #[serde(rename = "self")]
    SelfOnly,
    /// One living unit on the affected side, drawn at resolution time.
    Random,
}

/// The main effect of a skill, before secondary effects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrimaryEffect {
    /// Hits opponents.
    Damage,
    /// Restores allies.
    Heal,
    /// Only the secondary effects apply.
    None,
}

/// Kind of a secondary effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectKind {
    /// Immediate flat damage.
    Damage,
    /// Immediate flat healing.
    Heal,
    /// Beneficial stat status.
    Buff,
    /// Harmful status, including crowd control.
    Debuff,
    /// Damage over time.
    Dot,
    /// Healing over time.
    Hot,
}

impl EffectKind {
    /// Status applied when the spec names none, or `None` for immediate kinds.
    #[must_use]
    pub const fn default_status(self) -> Option<StatusKind> {
        match self {
            Self::Buff => Some(StatusKind::AttackUp),
            Self::Debuff => Some(StatusKind::DefenseDown),
            Self::Dot => Some(StatusKind::Burn),
            Self::Hot => Some(StatusKind::Regeneration),
            Self::Damage | Self::Heal => None,
        }
    }
}

/// One secondary effect attached to a skill.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffectSpec {
    /// What the effect does.
    pub kind: EffectKind,
    /// Flat amount (damage, heal, per-turn tick) or percentage points (buff, debuff).
    pub magnitude: f64,
    /// Status duration in turns.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<u32>,
    /// Trigger probability in `[0, 1]`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chance: Option<f64>,
    /// Status applied by buff/debuff/dot/hot kinds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<StatusKind>,
}

impl EffectSpec {
    /// Creates a spec with no duration, chance or status override.
    #[must_use]
    pub const fn new(kind: EffectKind, magnitude: f64) -> Self {
        Self {
            kind,
            magnitude,
            duration: None,
            chance: None,
            status: None,
        }
    }

    /// Stat buff of `percent` points lasting `turns`.
    #[must_use]
    pub const fn buff(status: StatusKind, percent: f64, turns: u32) -> Self {
        Self::new(EffectKind::Buff, percent)
            .with_duration(turns)
            .with_status(status)
    }

    /// Debuff of `percent` points lasting `turns`; crowd control ignores the percentage.
    #[must_use]
    pub const fn debuff(status: StatusKind, percent: f64, turns: u32) -> Self {
        Self::new(EffectKind::Debuff, percent)
            .with_duration(turns)
            .with_status(status)
    }

    /// Damage over time of `per_turn` hp lasting `turns`.
    #[must_use]
    pub const fn dot(per_turn: f64, turns: u32) -> Self {
        Self::new(EffectKind::Dot, per_turn).with_duration(turns)
    }

    /// Healing over time of `per_turn` hp lasting `turns`.
    #[must_use]
    pub const fn hot(per_turn: f64, turns: u32) -> Self {
        Self::new(EffectKind::Hot, per_turn).with_duration(turns)
    }

    /// Sets the duration.
    #[must_use]
    pub const fn with_duration(mut self, turns: u32) -> Self {
        self.duration = Some(turns);
        self
    }

    /// Sets the trigger chance.
    #[must_use]
    pub const fn with_chance(mut self, chance: f64) -> Self {
        self.chance = Some(chance);
        self
    }

    /// Sets the status kind.
    #[must_use]
    pub const fn with_status(mut self, status: StatusKind) -> Self {
        self.status = Some(status);
        self
    }

    /// Trigger chance, defaulting to certain.
    #[must_use]
    pub fn chance(&self) -> f64 {
        self.chance.unwrap_or(1.0).clamp(0.0, 1.0)
    }

    /// Duration, defaulting to [`DEFAULT_STATUS_DURATION`].
    #[must_use]
    pub fn duration(&self) -> u32 {
        self.duration.unwrap_or(DEFAULT_STATUS_DURATION)
    }

    /// The status this spec creates, if it creates one.
    #[must_use]
    pub fn status(&self) -> Option<StatusKind> {
        match self.kind {
            EffectKind::Damage | EffectKind::Heal => None,
            kind => self.status.or(kind.default_status()),
        }
    }

    /// Validates the spec, returning a description of the first problem.
    pub fn check(&self) -> Result<(), String> {
        if !self.magnitude.is_finite() || self.magnitude < 0.0 {
            return Err(format!("{:?} magnitude must be finite and non-negative", self.kind));
        }
        if let Some(chance) = self.chance {
            if !(0.0..=1.0).contains(&chance) {
                return Err(format!("trigger chance {chance} is outside [0, 1]"));
            }
        }
        if self.duration == Some(0) {
            return Err("status duration must be at least one turn".to_string());
        }
        let status = self.status();
        match (self.kind, status) {
            (EffectKind::Damage | EffectKind::Heal, _) if self.status.is_some() => {
                Err(format!("{:?} effects cannot carry a status", self.kind))
            }
            (EffectKind::Buff, Some(s)) if s.polarity() != Polarity::Buff => {
                Err(format!("buff effect names debuff status {s}"))
            }
            (EffectKind::Debuff, Some(s)) if s.polarity() != Polarity::Debuff => {
                Err(format!("debuff effect names buff status {s}"))
            }
            (EffectKind::Dot, Some(s)) if !s.is_damage_over_time() => {
                Err(format!("dot effect names non-periodic status {s}"))
            }
            (EffectKind::Hot, Some(s)) if !s.is_heal_over_time() => {
                Err(format!("hot effect names non-periodic status {s}"))
            }
            _ => Ok(()),
        }
    }
}

/// A castable technique.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillDef {
    /// Catalog id.
    pub id: SkillId,
    /// Display name.
    pub name: String,
    /// Role used by the AI.
    pub category: SkillCategory,
    /// Elemental affinity of the technique.
    #[serde(default)]
    pub element: Element,
    /// Qi (mp) cost.
    #[serde(default)]
    pub mp_cost: u32,
    /// Turns the skill stays unavailable after a cast.
    #[serde(default)]
    pub cooldown: u32,
    /// Multiplier applied to the caster's attack.
    #[serde(default = "default_multiplier")]
    pub damage_multiplier: f64,
    /// Number of hits per target.
    #[serde(default = "default_hits")]
    pub hit_count: u32,
    /// Target selection mode.
    #[serde(default = "default_target")]
    pub target: TargetMode,
    /// Explicit main effect; inferred from the category when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary: Option<PrimaryEffect>,
    /// Ordered secondary effects.
    #[serde(default)]
    pub effects: Vec<EffectSpec>,
}

fn default_multiplier() -> f64 {
    1.0
}

fn default_hits() -> u32 {
    1
}

fn default_target() -> TargetMode {
    TargetMode::Single
}

impl SkillDef {
    /// Id of the zero-cost fallback technique.
    pub const BASIC_ATTACK_ID: &'static str = "basic_attack";

    /// Creates a neutral, free, single-target, single-hit skill with multiplier 1.0.
    #[must_use]
    pub fn new(id: &str, name: &str, category: SkillCategory) -> Self {
        Self {
            id: SkillId::new(id),
            name: name.to_string(),
            category,
            element: Element::Neutral,
            mp_cost: 0,
            cooldown: 0,
            damage_multiplier: 1.0,
            hit_count: 1,
            target: TargetMode::Single,
            primary: None,
            effects: Vec::new(),
        }
    }

    /// The fallback strike: free, no cooldown, multiplier 1.0, single target.
    #[must_use]
    pub fn basic_attack() -> Self {
        Self::new(Self::BASIC_ATTACK_ID, "Basic Strike", SkillCategory::Attack)
    }

    /// Sets the element.
    #[must_use]
    pub fn with_element(mut self, element: Element) -> Self {
        self.element = element;
        self
    }

    /// Sets the mp cost.
    #[must_use]
    pub fn with_cost(mut self, mp_cost: u32) -> Self {
        self.mp_cost = mp_cost;
        self
    }

    /// Sets the cooldown length.
    #[must_use]
    pub fn with_cooldown(mut self, turns: u32) -> Self {
        self.cooldown = turns;
        self
    }

    /// Sets the damage multiplier.
    #[must_use]
    pub fn with_multiplier(mut self, multiplier: f64) -> Self {
        self.damage_multiplier = multiplier;
        self
    }

    /// Sets the hit count.
    #[must_use]
    pub fn with_hits(mut self, hits: u32) -> Self {
        self.hit_count = hits;
        self
    }

    /// Sets the target mode.
    #[must_use]
    pub fn with_target(mut self, target: TargetMode) -> Self {
        self.target = target;
        self
    }

    /// Sets the primary effect explicitly.
    #[must_use]
    pub fn with_primary(mut self, primary: PrimaryEffect) -> Self {
        self.primary = Some(primary);
        self
    }

    /// Appends a secondary effect.
    #[must_use]
    pub fn with_effect(mut self, effect: EffectSpec) -> Self {
        self.effects.push(effect);
        self
    }

    /// The main effect of the skill.
    ///
    /// When not set explicitly: support skills with a positive multiplier
    /// heal, defense and support skills without one only apply their
    /// secondary effects, and everything else deals damage.
    #[must_use]
    pub fn primary(&self) -> PrimaryEffect {
        if let Some(primary) = self.primary {
            return primary;
        }
        match self.category {
            SkillCategory::Support if self.damage_multiplier > 0.0 => PrimaryEffect::Heal,
            SkillCategory::Support | SkillCategory::Defense => PrimaryEffect::None,
            SkillCategory::Attack | SkillCategory::Ultimate => PrimaryEffect::Damage,
        }
    }

    /// Returns `true` if the skill is aimed at the caster's opponents.
    #[must_use]
    pub fn is_hostile(&self) -> bool {
        self.primary() == PrimaryEffect::Damage
    }

    /// Returns `true` for the zero-cost fallback technique.
    #[must_use]
    pub fn is_basic_attack(&self) -> bool {
        self.id.as_str() == Self::BASIC_ATTACK_ID
    }

    /// Validates the definition, returning a description of the first problem.
    pub fn check(&self) -> Result<(), String> {
        if self.hit_count == 0 {
            return Err("hit count must be at least 1".to_string());
        }
        if !self.damage_multiplier.is_finite() || self.damage_multiplier < 0.0 {
            return Err("damage multiplier must be finite and non-negative".to_string());
        }
        for (i, effect) in self.effects.iter().enumerate() {
            effect.check().map_err(|e| format!("effect #{i}: {e}"))?;
        }
        Ok(())
    }
}

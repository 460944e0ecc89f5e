//! Battle configuration: stat growth, damage tuning and pacing.
//!
//! Every field has a default, so a config file only needs to name what it
//! changes:
//!
//! ```
//! use xianzhan_core::config::BattleConfig;
//!
//! let config = BattleConfig::from_json(r#"{"max_rounds": 50, "damage": {"jitter_min": 1.0, "jitter_max": 1.0}}"#).unwrap();
//! assert_eq!(config.max_rounds, 50);
//! assert_eq!(config.mp_regen_per_turn, 5);
//! assert!((config.damage.mitigation_constant - 100.0).abs() < f64::EPSILON);
//! ```

use serde::{Deserialize, Serialize};
use xianzhan_content::SkillDef;

use crate::error::BattleError;

/// Level-derived base stats before template multipliers.
///
/// A stat at level `L` is `base + per_level * L`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatGrowth {
    /// Hp at level 0.
    pub hp_base: u32,
    /// Hp gained per level.
    pub hp_per_level: u32,
    /// Mp at level 0.
    pub mp_base: u32,
    /// Mp gained per level.
    pub mp_per_level: u32,
    /// Attack at level 0.
    pub attack_base: u32,
    /// Attack gained per level.
    pub attack_per_level: u32,
    /// Defense at level 0.
    pub defense_base: u32,
    /// Defense gained per level.
    pub defense_per_level: u32,
    /// Speed at level 0.
    pub speed_base: u32,
    /// Speed gained per level.
    pub speed_per_level: u32,
    /// Crit chance when the template sets none.
    pub crit_rate: f64,
    /// Crit damage multiplier when the template sets none.
    pub crit_damage: f64,
}

impl Default for StatGrowth {
    fn default() -> Self {
        Self {
            hp_base: 50,
            hp_per_level: 30,
            mp_base: 30,
            mp_per_level: 10,
            attack_base: 10,
            attack_per_level: 5,
            defense_base: 5,
            defense_per_level: 2,
            speed_base: 10,
            speed_per_level: 1,
            crit_rate: 0.05,
            crit_damage: 1.5,
        }
    }
}

/// Constants of the damage and healing formulas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DamageTuning {
    /// Flat term in the mitigation denominator.
    pub mitigation_constant: f64,
    /// Share of the attacker's attack added to the mitigation denominator.
    pub attack_penetration: f64,
    /// Lower bound of the damage jitter.
    pub jitter_min: f64,
    /// Upper bound of the damage jitter.
    pub jitter_max: f64,
    /// Share of attack converted into healing.
    pub heal_factor: f64,
    /// Lower bound of the healing jitter.
    pub heal_jitter_min: f64,
    /// Upper bound of the healing jitter.
    pub heal_jitter_max: f64,
}

impl Default for DamageTuning {
    fn default() -> Self {
        Self {
            mitigation_constant: 100.0,
            attack_penetration: 0.5,
            jitter_min: 0.9,
            jitter_max: 1.1,
            heal_factor: 0.5,
            heal_jitter_min: 0.95,
            heal_jitter_max: 1.05,
        }
    }
}

/// How a battle still undecided after `max_rounds` ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeoutRule {
    /// The allies failed to win in time.
    #[default]
    Defeat,
    /// The side keeping the larger share of its total max hp wins; equal
    /// shares go to whoever dealt more damage. A full tie is a defeat, so the
    /// allies have to come out strictly ahead. Timed-out victories grant no
    /// reward.
    Standing,
}

/// Everything tunable about a battle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BattleConfig {
    /// Stat growth curve used by the combatant factory.
    pub growth: StatGrowth,
    /// Damage and healing constants.
    pub damage: DamageTuning,
    /// Starting action gauge is rolled in `0..=initiative_spread`.
    pub initiative_spread: u32,
    /// Mp restored at the start of each of a unit's turns.
    pub mp_regen_per_turn: u32,
    /// Hp fraction below which the AI looks for a support skill.
    pub low_hp_threshold: f64,
    /// Rounds after which an undecided battle ends.
    pub max_rounds: u32,
    /// How the battle ends at the round limit.
    pub timeout: TimeoutRule,
    /// Fallback technique used when a chosen skill is unavailable.
    pub basic_attack: SkillDef,
}

impl Default for BattleConfig {
    fn default() -> Self {
        Self {
            growth: StatGrowth::default(),
            damage: DamageTuning::default(),
            initiative_spread: 10,
            mp_regen_per_turn: 5,
            low_hp_threshold: 0.3,
            max_rounds: 200,
            timeout: TimeoutRule::Defeat,
            basic_attack: SkillDef::basic_attack(),
        }
    }
}

impl BattleConfig {
    /// Parses a config from JSON, filling unspecified fields with defaults.
    ///
    /// # Errors
    ///
    /// Returns [`BattleError::Config`] for malformed JSON or values that
    /// fail [`BattleConfig::check`].
    pub fn from_json(json: &str) -> Result<Self, BattleError> {
        let config: Self = serde_json::from_str(json)?;
        config.check()?;
        Ok(config)
    }

    /// Config with crits disabled and jitter pinned to 1.0.
    ///
    /// Damage becomes a pure function of the stats, which is what balance
    /// tests and replays of a single formula want.
    #[must_use]
    pub fn without_variance() -> Self {
        let mut config = Self::default();
        config.growth.crit_rate = 0.0;
        config.damage.jitter_min = 1.0;
        config.damage.jitter_max = 1.0;
        config.damage.heal_jitter_min = 1.0;
        config.damage.heal_jitter_max = 1.0;
        config.initiative_spread = 0;
        config
    }

    /// Checks value ranges.
    ///
    /// # Errors
    ///
    /// Returns [`BattleError::Config`] describing the first bad value.
    pub fn check(&self) -> Result<(), BattleError> {
        let d = &self.damage;
        if d.jitter_min > d.jitter_max || d.heal_jitter_min > d.heal_jitter_max {
            return Err(BattleError::Config("jitter bounds are inverted".to_string()));
        }
        if d.jitter_min < 0.0 || d.heal_jitter_min < 0.0 || d.mitigation_constant < 0.0 {
            return Err(BattleError::Config("damage tuning must be non-negative".to_string()));
        }
        if !(0.0..=1.0).contains(&self.low_hp_threshold) {
            return Err(BattleError::Config("low_hp_threshold must be in [0, 1]".to_string()));
        }
        if !(0.0..=1.0).contains(&self.growth.crit_rate) || self.growth.crit_damage < 1.0 {
            return Err(BattleError::Config("crit settings out of range".to_string()));
        }
        if self.max_rounds == 0 {
            return Err(BattleError::Config("max_rounds must be positive".to_string()));
        }
        let basic = &self.basic_attack;
        if basic.mp_cost != 0 || basic.cooldown != 0 {
            return Err(BattleError::Config(
                "basic attack must be free and have no cooldown".to_string(),
            ));
        }
        basic.check().map_err(BattleError::Config)
    }
}

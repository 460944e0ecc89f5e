//! Plain data held by a combatant: stats, skill slots and status instances.

use serde::{Deserialize, Serialize};
use xianzhan_content::{Polarity, SkillDef, SkillId, StatusKind};

use super::CombatantId;

/// Battle-ready stats produced by the factory.
///
/// These are the unmodified values; buffs and debuffs are applied on top at
/// resolution time and never written back here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombatStats {
    /// Maximum hp.
    pub max_hp: u32,
    /// Maximum mp (qi).
    pub max_mp: u32,
    /// Offensive power.
    pub attack: u32,
    /// Damage mitigation.
    pub defense: u32,
    /// Base initiative.
    pub speed: u32,
    /// Crit chance in `[0, 1]`.
    pub crit_rate: f64,
    /// Damage multiplier on a crit.
    pub crit_damage: f64,
}

impl Default for CombatStats {
    fn default() -> Self {
        Self {
            max_hp: 100,
            max_mp: 50,
            attack: 10,
            defense: 5,
            speed: 10,
            crit_rate: 0.0,
            crit_damage: 1.5,
        }
    }
}

/// An owned skill and its remaining cooldown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillSlot {
    /// The definition, cloned from the catalog.
    pub def: SkillDef,
    /// Own turns left before the skill can be cast again.
    pub cooldown: u32,
}

impl SkillSlot {
    /// Wraps a definition with its cooldown reset.
    #[must_use]
    pub fn new(def: SkillDef) -> Self {
        Self { def, cooldown: 0 }
    }

    /// The skill id.
    #[must_use]
    pub fn id(&self) -> &SkillId {
        &self.def.id
    }

    /// Returns `true` if the skill is off cooldown and `mp` covers its cost.
    #[must_use]
    pub fn is_ready(&self, mp: u32) -> bool {
        self.cooldown == 0 && mp >= self.def.mp_cost
    }
}

/// A status carried by a combatant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusEffect {
    /// Which status.
    pub kind: StatusKind,
    /// Turns left, always at least 1 while the status is held.
    pub remaining: u32,
    /// Percentage points for stat statuses, hp per turn for periodic ones.
    pub magnitude: f64,
    /// Who applied it.
    pub source: CombatantId,
}

impl StatusEffect {
    /// Creates an instance.
    #[must_use]
    pub fn new(kind: StatusKind, remaining: u32, magnitude: f64, source: CombatantId) -> Self {
        Self {
            kind,
            remaining,
            magnitude,
            source,
        }
    }

    /// Buff or debuff.
    #[must_use]
    pub fn polarity(&self) -> Polarity {
        self.kind.polarity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use xianzhan_content::SkillCategory;

    #[test]
    fn slot_readiness_needs_cooldown_and_mp() {
        let mut slot = SkillSlot::new(
            SkillDef::new("palm", "Palm", SkillCategory::Attack).with_cost(10),
        );
        assert!(slot.is_ready(10));
        assert!(!slot.is_ready(9));
        slot.cooldown = 1;
        assert!(!slot.is_ready(100));
    }

    #[test]
    fn status_polarity_follows_kind() {
        let burn = StatusEffect::new(StatusKind::Burn, 2, 5.0, CombatantId::new(1));
        assert_eq!(burn.polarity(), Polarity::Debuff);
    }
}

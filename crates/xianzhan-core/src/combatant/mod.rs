//! Combatants: the units that fight in a battle.
//!
//! This module provides:
//! - [`CombatantId`]: unique identifier, assigned by the factory
//! - [`Side`]: which roster a unit belongs to
//! - [`Combatant`]: the unit itself, with its vitals, skills and statuses
//!
//! # Invariants
//!
//! Vitals are private and only change through clamping helpers, so
//! `hp <= max_hp` and `mp <= max_mp` always hold, and the alive flag flips in
//! the same call that brings hp to zero.
//!
//! # Example
//!
//! ```
//! use xianzhan_core::combatant::{Combatant, CombatantId, CombatStats, Side};
//!
//! let mut unit = Combatant::builder(CombatantId::new(1), "Disciple", Side::Allies)
//!     .stats(CombatStats { max_hp: 40, ..CombatStats::default() })
//!     .build();
//!
//! assert_eq!(unit.take_damage(55), 40);
//! assert_eq!(unit.hp(), 0);
//! assert!(!unit.is_alive());
//! assert_eq!(unit.heal(10), 0);
//! ```

pub mod components;

use serde::{Deserialize, Serialize};
use std::fmt;
use xianzhan_content::{CrowdControl, Element, Polarity, SkillDef, SkillId, TemplateId};

pub use components::{CombatStats, SkillSlot, StatusEffect};

/// Unique identifier for a combatant within a battle.
///
/// Ids are handed out in increasing order by the
/// [`CombatantFactory`](crate::factory::CombatantFactory) and never reused.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CombatantId(u32);

impl CombatantId {
    /// Creates a `CombatantId` from a raw value.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Returns the raw value.
    #[must_use]
    pub const fn as_u32(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for CombatantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CombatantId({})", self.0)
    }
}

impl fmt::Display for CombatantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl From<u32> for CombatantId {
    fn from(id: u32) -> Self {
        Self::new(id)
    }
}

/// Which roster a combatant fights for.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    /// The player's side. Victory means every enemy fell.
    Allies,
    /// The opposing side.
    Enemies,
}

impl Side {
    /// The other side.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Allies => Self::Enemies,
            Self::Enemies => Self::Allies,
        }
    }
}

/// A unit in battle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Combatant {
    id: CombatantId,
    name: String,
    template: TemplateId,
    level: u32,
    side: Side,
    player_controlled: bool,
    element: Element,
    stats: CombatStats,
    hp: u32,
    mp: u32,
    alive: bool,
    action_gauge: u32,
    skills: Vec<SkillSlot>,
    buffs: Vec<StatusEffect>,
    debuffs: Vec<StatusEffect>,
    damage_dealt: u64,
    healing_done: u64,
}

impl Combatant {
    /// Starts building a unit with default stats and no skills.
    #[must_use]
    pub fn builder(id: CombatantId, name: &str, side: Side) -> CombatantBuilder {
        CombatantBuilder {
            unit: Self {
                id,
                name: name.to_string(),
                template: TemplateId::new(name),
                level: 1,
                side,
                player_controlled: false,
                element: Element::Neutral,
                stats: CombatStats::default(),
                hp: 0,
                mp: 0,
                alive: false,
                action_gauge: 0,
                skills: Vec::new(),
                buffs: Vec::new(),
                debuffs: Vec::new(),
                damage_dealt: 0,
                healing_done: 0,
            },
            hp: None,
            mp: None,
        }
    }

    // =========================================================================
    // Identity
    // =========================================================================

    /// The unit's id.
    #[must_use]
    pub const fn id(&self) -> CombatantId {
        self.id
    }

    /// Display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Template the unit was built from.
    #[must_use]
    pub fn template(&self) -> &TemplateId {
        &self.template
    }

    /// Cultivation level.
    #[must_use]
    pub const fn level(&self) -> u32 {
        self.level
    }

    /// Roster side.
    #[must_use]
    pub const fn side(&self) -> Side {
        self.side
    }

    /// Returns `true` if a human decides this unit's actions.
    #[must_use]
    pub const fn is_player_controlled(&self) -> bool {
        self.player_controlled
    }

    /// Elemental affinity.
    #[must_use]
    pub const fn element(&self) -> Element {
        self.element
    }

    /// Unmodified stats.
    #[must_use]
    pub const fn stats(&self) -> &CombatStats {
        &self.stats
    }

    // =========================================================================
    // Vitals
    // =========================================================================

    /// Current hp.
    #[must_use]
    pub const fn hp(&self) -> u32 {
        self.hp
    }

    /// Maximum hp.
    #[must_use]
    pub const fn max_hp(&self) -> u32 {
        self.stats.max_hp
    }

    /// Current mp.
    #[must_use]
    pub const fn mp(&self) -> u32 {
        self.mp
    }

    /// Maximum mp.
    #[must_use]
    pub const fn max_mp(&self) -> u32 {
        self.stats.max_mp
    }

    /// Returns `true` while hp is above zero.
    #[must_use]
    pub const fn is_alive(&self) -> bool {
        self.alive
    }

    /// Lowers hp by up to `amount`, returning the hp actually lost.
    ///
    /// Reaching zero marks the unit dead and clears its statuses. Dead units
    /// take no damage.
    pub fn take_damage(&mut self, amount: u32) -> u32 {
        if !self.alive {
            return 0;
        }
        let lost = amount.min(self.hp);
        self.hp -= lost;
        if self.hp == 0 {
            self.alive = false;
            self.buffs.clear();
            self.debuffs.clear();
        }
        lost
    }

    /// Raises hp by up to `amount`, capped at max hp, returning the hp gained.
    ///
    /// Healing never revives a dead unit.
    pub fn heal(&mut self, amount: u32) -> u32 {
        if !self.alive {
            return 0;
        }
        let gained = amount.min(self.stats.max_hp.saturating_sub(self.hp));
        self.hp += gained;
        gained
    }

    /// Pays `cost` mp, saturating at zero.
    pub fn spend_mp(&mut self, cost: u32) {
        self.mp = self.mp.saturating_sub(cost);
    }

    /// Restores up to `amount` mp, capped at max mp, returning the mp gained.
    pub fn restore_mp(&mut self, amount: u32) -> u32 {
        let gained = amount.min(self.stats.max_mp.saturating_sub(self.mp));
        self.mp += gained;
        gained
    }

    /// Checks the invariants the builder and the vitals methods maintain.
    ///
    /// Units restored from a snapshot bypass the builder, so they are checked
    /// before a battle is adopted.
    ///
    /// # Errors
    ///
    /// Returns a description of the first broken invariant.
    pub fn check(&self) -> Result<(), String> {
        if self.hp > self.stats.max_hp {
            return Err(format!("{}: hp {} exceeds max {}", self.id, self.hp, self.stats.max_hp));
        }
        if self.mp > self.stats.max_mp {
            return Err(format!("{}: mp {} exceeds max {}", self.id, self.mp, self.stats.max_mp));
        }
        if self.alive != (self.hp > 0) {
            return Err(format!("{}: alive flag disagrees with hp {}", self.id, self.hp));
        }
        if !self.alive && self.statuses().next().is_some() {
            return Err(format!("{}: dead unit holds statuses", self.id));
        }
        for (list, polarity) in [(&self.buffs, Polarity::Buff), (&self.debuffs, Polarity::Debuff)] {
            for status in list {
                if status.remaining == 0 {
                    return Err(format!("{}: expired {} still held", self.id, status.kind));
                }
                if status.polarity() != polarity {
                    return Err(format!("{}: {} filed under the wrong polarity", self.id, status.kind));
                }
            }
        }
        Ok(())
    }

    // =========================================================================
    // Initiative
    // =========================================================================

    /// Starting action gauge added to speed.
    #[must_use]
    pub const fn action_gauge(&self) -> u32 {
        self.action_gauge
    }

    /// Speed after SpeedUp and SpeedDown statuses, floored at zero.
    #[must_use]
    pub fn effective_speed(&self) -> u32 {
        let percent = crate::status::stat_percent(self, xianzhan_content::Stat::Speed);
        crate::resolver::to_points(f64::from(self.stats.speed) * (1.0 + percent / 100.0))
    }

    /// Effective speed plus action gauge; higher acts earlier.
    #[must_use]
    pub fn initiative(&self) -> u64 {
        u64::from(self.effective_speed()) + u64::from(self.action_gauge)
    }

    // =========================================================================
    // Skills
    // =========================================================================

    /// Owned skills in slot order.
    #[must_use]
    pub fn skills(&self) -> &[SkillSlot] {
        &self.skills
    }

    /// Looks up an owned skill.
    #[must_use]
    pub fn skill(&self, id: &SkillId) -> Option<&SkillSlot> {
        self.skills.iter().find(|slot| slot.id() == id)
    }

    /// Owned skills that are off cooldown and affordable right now.
    pub fn ready_skills(&self) -> impl Iterator<Item = &SkillDef> + '_ {
        self.skills
            .iter()
            .filter(|slot| slot.is_ready(self.mp))
            .map(|slot| &slot.def)
    }

    /// Puts an owned skill on its full cooldown. Unknown ids are ignored.
    pub fn start_cooldown(&mut self, id: &SkillId) {
        if let Some(slot) = self.skills.iter_mut().find(|slot| slot.id() == id) {
            slot.cooldown = slot.def.cooldown;
        }
    }

    /// Ticks every cooldown down by one except `except`'s.
    pub fn tick_cooldowns(&mut self, except: Option<&SkillId>) {
        for slot in &mut self.skills {
            if except != Some(&slot.def.id) {
                slot.cooldown = slot.cooldown.saturating_sub(1);
            }
        }
    }

    // =========================================================================
    // Statuses
    // =========================================================================

    /// Active buffs in application order.
    #[must_use]
    pub fn buffs(&self) -> &[StatusEffect] {
        &self.buffs
    }

    /// Active debuffs in application order.
    #[must_use]
    pub fn debuffs(&self) -> &[StatusEffect] {
        &self.debuffs
    }

    /// Buffs then debuffs.
    pub fn statuses(&self) -> impl Iterator<Item = &StatusEffect> + '_ {
        self.buffs.iter().chain(self.debuffs.iter())
    }

    /// Crowd control imposed by the active debuffs.
    #[must_use]
    pub fn crowd_control(&self) -> CrowdControl {
        self.debuffs
            .iter()
            .fold(CrowdControl::empty(), |cc, s| cc | s.kind.crowd_control())
    }

    pub(crate) fn statuses_mut(&mut self, polarity: Polarity) -> &mut Vec<StatusEffect> {
        match polarity {
            Polarity::Buff => &mut self.buffs,
            Polarity::Debuff => &mut self.debuffs,
        }
    }

    // =========================================================================
    // Battle summary
    // =========================================================================

    /// Total hp removed from opponents by this unit.
    #[must_use]
    pub const fn damage_dealt(&self) -> u64 {
        self.damage_dealt
    }

    /// Total hp restored by this unit.
    #[must_use]
    pub const fn healing_done(&self) -> u64 {
        self.healing_done
    }

    pub(crate) fn record_damage(&mut self, amount: u32) {
        self.damage_dealt += u64::from(amount);
    }

    pub(crate) fn record_healing(&mut self, amount: u32) {
        self.healing_done += u64::from(amount);
    }
}

/// Builder for [`Combatant`].
///
/// Hp and mp start full unless set explicitly.
#[derive(Debug, Clone)]
pub struct CombatantBuilder {
    unit: Combatant,
    hp: Option<u32>,
    mp: Option<u32>,
}

impl CombatantBuilder {
    /// Sets the source template.
    #[must_use]
    pub fn template(mut self, template: TemplateId) -> Self {
        self.unit.template = template;
        self
    }

    /// Sets the level.
    #[must_use]
    pub fn level(mut self, level: u32) -> Self {
        self.unit.level = level;
        self
    }

    /// Marks the unit as driven by a human.
    #[must_use]
    pub fn player_controlled(mut self, yes: bool) -> Self {
        self.unit.player_controlled = yes;
        self
    }

    /// Sets the element.
    #[must_use]
    pub fn element(mut self, element: Element) -> Self {
        self.unit.element = element;
        self
    }

    /// Sets the stats.
    #[must_use]
    pub fn stats(mut self, stats: CombatStats) -> Self {
        self.unit.stats = stats;
        self
    }

    /// Sets the starting action gauge.
    #[must_use]
    pub fn action_gauge(mut self, gauge: u32) -> Self {
        self.unit.action_gauge = gauge;
        self
    }

    /// Adds an owned skill with its cooldown reset.
    #[must_use]
    pub fn skill(mut self, def: SkillDef) -> Self {
        self.unit.skills.push(SkillSlot::new(def));
        self
    }

    /// Starts the unit at `hp` instead of full.
    #[must_use]
    pub fn hp(mut self, hp: u32) -> Self {
        self.hp = Some(hp);
        self
    }

    /// Starts the unit at `mp` instead of full.
    #[must_use]
    pub fn mp(mut self, mp: u32) -> Self {
        self.mp = Some(mp);
        self
    }

    /// Finishes the unit, clamping vitals into range.
    #[must_use]
    pub fn build(self) -> Combatant {
        let mut unit = self.unit;
        unit.hp = self.hp.unwrap_or(unit.stats.max_hp).min(unit.stats.max_hp);
        unit.mp = self.mp.unwrap_or(unit.stats.max_mp).min(unit.stats.max_mp);
        unit.alive = unit.hp > 0;
        unit
    }
}

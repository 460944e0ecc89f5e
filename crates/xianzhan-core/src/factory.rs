//! Combatant factory: templates in, battle-ready units out.
//!
//! Every stat is `(base + per_level * level) * template multiplier`, floored,
//! at least 1 (defense may be 0). Skills are cloned from the catalog with
//! cooldowns reset. A missing template or skill aborts the build; the factory
//! never substitutes a default template.

use tracing::debug;
use xianzhan_content::{ContentCatalog, RosterEntry, TemplateId};

use crate::combatant::{CombatStats, Combatant, CombatantId, Side};
use crate::config::{BattleConfig, StatGrowth};
use crate::error::BattleError;
use crate::resolver::to_points;
use crate::rng::Dice;

/// Builds combatants and hands out their ids.
#[derive(Debug, Clone, PartialEq)]
pub struct CombatantFactory {
    next_id: u32,
    growth: StatGrowth,
    initiative_spread: u32,
}

impl CombatantFactory {
    /// Creates a factory using the growth curve and initiative spread of `config`.
    ///
    /// Ids start at 1.
    #[must_use]
    pub fn new(config: &BattleConfig) -> Self {
        Self {
            next_id: 1,
            growth: config.growth.clone(),
            initiative_spread: config.initiative_spread,
        }
    }

    /// The id the next spawned unit will get.
    #[must_use]
    pub const fn next_id(&self) -> CombatantId {
        CombatantId::new(self.next_id)
    }

    /// Level after applying an encounter offset, never below 1.
    #[must_use]
    pub fn level_for(base_level: u32, offset: i32) -> u32 {
        let level = i64::from(base_level) + i64::from(offset);
        u32::try_from(level.max(1)).unwrap_or(u32::MAX)
    }

    /// Stats for `level` before template multipliers.
    #[must_use]
    pub fn base_stats(&self, level: u32) -> CombatStats {
        let g = &self.growth;
        let grow = |base: u32, per: u32| base.saturating_add(per.saturating_mul(level));
        CombatStats {
            max_hp: grow(g.hp_base, g.hp_per_level),
            max_mp: grow(g.mp_base, g.mp_per_level),
            attack: grow(g.attack_base, g.attack_per_level),
            defense: grow(g.defense_base, g.defense_per_level),
            speed: grow(g.speed_base, g.speed_per_level),
            crit_rate: g.crit_rate,
            crit_damage: g.crit_damage,
        }
    }

    /// Builds one unit.
    ///
    /// Draws one initiative roll from `dice`, only after all content lookups
    /// succeed.
    ///
    /// # Errors
    ///
    /// Returns [`BattleError::ContentNotFound`] when the template or one of
    /// its skills is missing from the catalog.
    pub fn spawn<D: Dice>(
        &mut self,
        catalog: &ContentCatalog,
        template: &TemplateId,
        level_offset: i32,
        side: Side,
        player_controlled: bool,
        dice: &mut D,
    ) -> Result<Combatant, BattleError> {
        let tpl = catalog.template(template)?;
        let skills = tpl
            .skills
            .iter()
            .map(|id| catalog.skill(id).cloned())
            .collect::<Result<Vec<_>, _>>()?;

        let level = Self::level_for(tpl.base_level, level_offset);
        let base = self.base_stats(level);
        let scale = |value: u32, multiplier: f64| to_points(f64::from(value) * multiplier);
        let stats = CombatStats {
            max_hp: scale(base.max_hp, tpl.hp_multiplier).max(1),
            max_mp: base.max_mp,
            attack: scale(base.attack, tpl.attack_multiplier).max(1),
            defense: scale(base.defense, tpl.defense_multiplier),
            speed: scale(base.speed, tpl.speed_multiplier).max(1),
            crit_rate: tpl.crit_rate.unwrap_or(base.crit_rate),
            crit_damage: tpl.crit_damage.unwrap_or(base.crit_damage),
        };

        let id = CombatantId::new(self.next_id);
        self.next_id += 1;
        let gauge = dice.up_to(self.initiative_spread);

        debug!(%id, template = %tpl.id, level, ?side, "combatant spawned");

        let unit = skills.into_iter().fold(
            Combatant::builder(id, &tpl.name, side)
                .template(tpl.id.clone())
                .level(level)
                .element(tpl.element)
                .player_controlled(player_controlled)
                .stats(stats)
                .action_gauge(gauge),
            |builder, skill| builder.skill(skill),
        );
        Ok(unit.build())
    }

    /// Builds a whole roster in entry order.
    ///
    /// # Errors
    ///
    /// Fails on the first entry that references missing content; units built
    /// before the failure are discarded.
    pub fn build_roster<D: Dice>(
        &mut self,
        catalog: &ContentCatalog,
        entries: &[RosterEntry],
        side: Side,
        player_controlled: bool,
        dice: &mut D,
    ) -> Result<Vec<Combatant>, BattleError> {
        entries
            .iter()
            .map(|entry| {
                self.spawn(
                    catalog,
                    &entry.template,
                    entry.level_offset,
                    side,
                    player_controlled,
                    dice,
                )
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::BattleRng;
    use xianzhan_content::{CombatantTemplate, ContentError, SkillCategory, SkillDef, SkillId};

    fn catalog() -> ContentCatalog {
        ContentCatalog::new()
            .with_skill(SkillDef::new("palm", "Palm", SkillCategory::Attack).with_cooldown(2))
            .with_template(
                CombatantTemplate::new("disciple", "Disciple")
                    .with_level(2)
                    .with_multipliers(1.5, 1.0, 0.5, 1.0)
                    .with_skill("palm"),
            )
            .with_template(CombatantTemplate::new("broken", "Broken").with_skill("missing"))
    }

    fn factory() -> CombatantFactory {
        CombatantFactory::new(&BattleConfig::default())
    }

    #[test]
    fn growth_curve_matches_defaults() {
        let stats = factory().base_stats(3);
        assert_eq!(stats.max_hp, 140);
        assert_eq!(stats.max_mp, 60);
        assert_eq!(stats.attack, 25);
        assert_eq!(stats.defense, 11);
        assert_eq!(stats.speed, 13);
    }

    #[test]
    fn level_offset_never_drops_below_one() {
        assert_eq!(CombatantFactory::level_for(2, 3), 5);
        assert_eq!(CombatantFactory::level_for(2, -5), 1);
    }

    #[test]
    fn spawn_scales_and_floors() {
        let mut f = factory();
        let mut rng = BattleRng::new(1);
        let unit = f
            .spawn(&catalog(), &TemplateId::new("disciple"), 1, Side::Allies, true, &mut rng)
            .unwrap();
        // level 3: hp 140 * 1.5, defense 11 * 0.5 floored
        assert_eq!(unit.level(), 3);
        assert_eq!(unit.max_hp(), 210);
        assert_eq!(unit.hp(), 210);
        assert_eq!(unit.stats().defense, 5);
        assert!(unit.is_player_controlled());
        assert!(unit.action_gauge() <= 10);
        assert_eq!(unit.skill(&SkillId::new("palm")).unwrap().cooldown, 0);
    }

    #[test]
    fn ids_are_unique_and_increasing() {
        let mut f = factory();
        let mut rng = BattleRng::new(1);
        let roster = f
            .build_roster(
                &catalog(),
                &[RosterEntry::new("disciple", 0), RosterEntry::new("disciple", 0)],
                Side::Enemies,
                false,
                &mut rng,
            )
            .unwrap();
        assert_eq!(roster[0].id(), CombatantId::new(1));
        assert_eq!(roster[1].id(), CombatantId::new(2));
        assert_eq!(f.next_id(), CombatantId::new(3));
    }

    #[test]
    fn missing_template_hard_fails() {
        let mut f = factory();
        let mut rng = BattleRng::new(1);
        let err = f
            .spawn(&catalog(), &TemplateId::new("ghost"), 0, Side::Enemies, false, &mut rng)
            .unwrap_err();
        assert_eq!(
            err,
            BattleError::ContentNotFound(ContentError::TemplateNotFound(TemplateId::new("ghost")))
        );
        assert_eq!(f.next_id(), CombatantId::new(1));
    }

    #[test]
    fn missing_skill_hard_fails() {
        let mut f = factory();
        let mut rng = BattleRng::new(1);
        let err = f
            .spawn(&catalog(), &TemplateId::new("broken"), 0, Side::Enemies, false, &mut rng)
            .unwrap_err();
        assert!(matches!(
            err,
            BattleError::ContentNotFound(ContentError::SkillNotFound(_))
        ));
    }

    #[test]
    fn same_seed_same_gauges() {
        let entries = [RosterEntry::new("disciple", 0), RosterEntry::new("disciple", 2)];
        let build = || {
            let mut rng = BattleRng::new(77);
            factory()
                .build_roster(&catalog(), &entries, Side::Allies, false, &mut rng)
                .unwrap()
        };
        assert_eq!(build(), build());
    }
}

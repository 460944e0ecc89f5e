//! Status effect lifecycle.
//!
//! The manager owns three moments of a status's life:
//!
//! - **Application** ([`apply_status`]): a new kind is added; an existing kind
//!   is refreshed to the longer of the two durations and takes the newest
//!   magnitude. Statuses never stack.
//! - **Turn start** ([`begin_turn`]): crowd control is sampled, periodic
//!   damage then periodic healing tick, and every duration drops by one.
//! - **Turn end** ([`end_turn`]): skill cooldowns tick, including on turns
//!   lost to crowd control.

use tracing::{debug, trace};
use xianzhan_content::{CrowdControl, Polarity, SkillId, Stat};

use crate::combatant::{Combatant, CombatantId, StatusEffect};
use crate::log::{BattleEvent, BattleLog};
use crate::resolver::to_points;

/// What happened at the start of a unit's turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TurnStart {
    /// Crowd control active when the turn began. Non-empty means the turn is lost.
    pub crowd_control: CrowdControl,
    /// The unit died to periodic damage.
    pub died: bool,
    /// Source of the status that dealt the killing tick.
    pub killed_by: Option<CombatantId>,
}

impl TurnStart {
    /// Returns `true` if the unit may choose an action.
    #[must_use]
    pub fn can_act(&self) -> bool {
        !self.died && self.crowd_control.is_empty()
    }
}

/// Applies or refreshes a status. Returns `true` on refresh.
///
/// Dead units and zero-length statuses are ignored (and reported as not
/// refreshed).
pub fn apply_status(unit: &mut Combatant, effect: StatusEffect) -> bool {
    if !unit.is_alive() || effect.remaining == 0 {
        return false;
    }
    let list = unit.statuses_mut(effect.polarity());
    if let Some(existing) = list.iter_mut().find(|s| s.kind == effect.kind) {
        existing.remaining = existing.remaining.max(effect.remaining);
        existing.magnitude = effect.magnitude;
        existing.source = effect.source;
        true
    } else {
        list.push(effect);
        false
    }
}

/// Net percentage modifier on `stat` from all active statuses.
///
/// Increases add, decreases subtract: a 30% AttackUp with a 10% AttackDown
/// yields `20.0`.
#[must_use]
pub fn stat_percent(unit: &Combatant, stat: Stat) -> f64 {
    unit.statuses()
        .filter_map(|s| match s.kind.modifies() {
            Some((modified, sign)) if modified == stat => Some(f64::from(sign) * s.magnitude),
            _ => None,
        })
        .sum()
}

/// Runs the pre-turn step for `unit`.
///
/// Order: mp regeneration, crowd-control sampling, one damage tick per
/// damage-over-time debuff, one heal tick per heal-over-time buff, then
/// duration decay. Ticks stop at death, which clears every status.
pub fn begin_turn(unit: &mut Combatant, mp_regen: u32, round: u32, log: &mut BattleLog) -> TurnStart {
    let id = unit.id();
    unit.restore_mp(mp_regen);

    let mut start = TurnStart {
        crowd_control: unit.crowd_control(),
        ..TurnStart::default()
    };

    let dots: Vec<_> = unit
        .debuffs()
        .iter()
        .filter(|s| s.kind.is_damage_over_time())
        .map(|s| (s.kind, to_points(s.magnitude), s.source))
        .collect();
    for (status, per_turn, source) in dots {
        let amount = unit.take_damage(per_turn);
        trace!(unit = %id, %status, amount, "periodic damage");
        log.push(round, BattleEvent::PeriodicDamage { target: id, status, amount });
        if !unit.is_alive() {
            start.died = true;
            start.killed_by = Some(source);
            return start;
        }
    }

    let hots: Vec<_> = unit
        .buffs()
        .iter()
        .filter(|s| s.kind.is_heal_over_time())
        .map(|s| (s.kind, to_points(s.magnitude)))
        .collect();
    for (status, per_turn) in hots {
        let amount = unit.heal(per_turn);
        trace!(unit = %id, %status, amount, "periodic heal");
        log.push(round, BattleEvent::PeriodicHeal { target: id, status, amount });
    }

    for polarity in [Polarity::Buff, Polarity::Debuff] {
        let list = unit.statuses_mut(polarity);
        for status in list.iter_mut() {
            status.remaining = status.remaining.saturating_sub(1);
        }
        let expired: Vec<_> = list
            .iter()
            .filter(|s| s.remaining == 0)
            .map(|s| s.kind)
            .collect();
        list.retain(|s| s.remaining > 0);
        for status in expired {
            debug!(unit = %id, %status, "status expired");
            log.push(round, BattleEvent::StatusExpired { target: id, status });
        }
    }

    start
}

/// Runs the end-of-turn step: every cooldown except `cast`'s ticks down.
pub fn end_turn(unit: &mut Combatant, cast: Option<&SkillId>) {
    unit.tick_cooldowns(cast);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combatant::{CombatStats, Side};
    use xianzhan_content::{SkillCategory, SkillDef, StatusKind};

    fn unit() -> Combatant {
        Combatant::builder(CombatantId::new(1), "Bearer", Side::Allies)
            .stats(CombatStats {
                max_hp: 100,
                max_mp: 40,
                ..CombatStats::default()
            })
            .skill(SkillDef::new("palm", "Palm", SkillCategory::Attack).with_cooldown(2))
            .mp(0)
            .build()
    }

    fn effect(kind: StatusKind, turns: u32, magnitude: f64) -> StatusEffect {
        StatusEffect::new(kind, turns, magnitude, CombatantId::new(2))
    }

    mod apply_tests {
        use super::*;

        #[test]
        fn refresh_takes_longer_duration_not_sum() {
            let mut u = unit();
            assert!(!apply_status(&mut u, effect(StatusKind::DefenseDown, 1, 10.0)));
            assert!(apply_status(&mut u, effect(StatusKind::DefenseDown, 3, 20.0)));
            assert_eq!(u.debuffs().len(), 1);
            assert_eq!(u.debuffs()[0].remaining, 3);
            assert!((u.debuffs()[0].magnitude - 20.0).abs() < f64::EPSILON);
        }

        #[test]
        fn shorter_refresh_keeps_duration_but_updates_magnitude() {
            let mut u = unit();
            apply_status(&mut u, effect(StatusKind::AttackUp, 3, 10.0));
            apply_status(&mut u, effect(StatusKind::AttackUp, 1, 25.0));
            assert_eq!(u.buffs()[0].remaining, 3);
            assert!((u.buffs()[0].magnitude - 25.0).abs() < f64::EPSILON);
        }

        #[test]
        fn polarity_routes_to_the_right_list() {
            let mut u = unit();
            apply_status(&mut u, effect(StatusKind::SpeedUp, 2, 10.0));
            apply_status(&mut u, effect(StatusKind::Poison, 2, 3.0));
            assert_eq!(u.buffs().len(), 1);
            assert_eq!(u.debuffs().len(), 1);
        }

        #[test]
        fn dead_units_take_no_status() {
            let mut u = unit();
            u.take_damage(100);
            apply_status(&mut u, effect(StatusKind::Burn, 2, 3.0));
            assert_eq!(u.statuses().count(), 0);
        }

        #[test]
        fn stat_percent_nets_ups_and_downs() {
            let mut u = unit();
            apply_status(&mut u, effect(StatusKind::AttackUp, 2, 30.0));
            apply_status(&mut u, effect(StatusKind::AttackDown, 2, 10.0));
            apply_status(&mut u, effect(StatusKind::DefenseDown, 2, 15.0));
            assert!((stat_percent(&u, Stat::Attack) - 20.0).abs() < 1e-9);
            assert!((stat_percent(&u, Stat::Defense) + 15.0).abs() < 1e-9);
            assert!(stat_percent(&u, Stat::Speed).abs() < 1e-9);
        }
    }

    mod turn_tests {
        use super::*;

        #[test]
        fn ticks_damage_then_heal_then_decays() {
            let mut u = unit();
            let mut log = BattleLog::new();
            apply_status(&mut u, effect(StatusKind::Burn, 1, 10.0));
            apply_status(&mut u, effect(StatusKind::Poison, 2, 5.0));
            apply_status(&mut u, effect(StatusKind::Regeneration, 3, 4.0));

            let start = begin_turn(&mut u, 0, 1, &mut log);
            assert!(start.can_act());
            assert_eq!(u.hp(), 100 - 10 - 5 + 4);

            let kinds: Vec<_> = log.iter().map(|e| e.event.clone()).collect();
            assert!(matches!(kinds[0], BattleEvent::PeriodicDamage { status: StatusKind::Burn, .. }));
            assert!(matches!(kinds[1], BattleEvent::PeriodicDamage { status: StatusKind::Poison, .. }));
            assert!(matches!(kinds[2], BattleEvent::PeriodicHeal { .. }));
            assert!(matches!(kinds[3], BattleEvent::StatusExpired { status: StatusKind::Burn, .. }));

            assert_eq!(u.debuffs().len(), 1);
            assert_eq!(u.debuffs()[0].remaining, 1);
            assert_eq!(u.buffs()[0].remaining, 2);
        }

        #[test]
        fn crowd_control_is_sampled_before_decay() {
            let mut u = unit();
            let mut log = BattleLog::new();
            apply_status(&mut u, effect(StatusKind::Stun, 1, 0.0));
            let start = begin_turn(&mut u, 0, 1, &mut log);
            assert_eq!(start.crowd_control, CrowdControl::STUN);
            assert!(!start.can_act());
            assert!(u.debuffs().is_empty());
        }

        #[test]
        fn lethal_tick_stops_processing() {
            let mut u = unit();
            u.take_damage(95);
            let mut log = BattleLog::new();
            apply_status(&mut u, effect(StatusKind::Burn, 3, 10.0));
            apply_status(&mut u, effect(StatusKind::Regeneration, 3, 50.0));
            let start = begin_turn(&mut u, 0, 1, &mut log);
            assert!(start.died);
            assert_eq!(start.killed_by, Some(CombatantId::new(2)));
            assert_eq!(u.hp(), 0);
            assert_eq!(u.statuses().count(), 0);
            assert_eq!(log.len(), 1);
        }

        #[test]
        fn mp_regenerates_up_to_max() {
            let mut u = unit();
            let mut log = BattleLog::new();
            begin_turn(&mut u, 25, 1, &mut log);
            begin_turn(&mut u, 25, 2, &mut log);
            assert_eq!(u.mp(), 40);
        }

        #[test]
        fn end_turn_spares_the_cast_skill() {
            let mut u = unit();
            let palm = xianzhan_content::SkillId::new("palm");
            u.start_cooldown(&palm);
            end_turn(&mut u, Some(&palm));
            assert_eq!(u.skill(&palm).unwrap().cooldown, 2);
            end_turn(&mut u, None);
            assert_eq!(u.skill(&palm).unwrap().cooldown, 1);
        }
    }
}

//! Skill resolution.
//!
//! The resolver turns a validated cast into hp changes, statuses and log
//! entries. It works on a [`Scene`]: the battle's units in roster order, the
//! dice, and the log. Validation ([`check_cast`], [`check_target`]) is kept
//! separate from resolution so the state machine can reject an action before
//! anything is touched.
//!
//! Resolution order for one cast:
//!
//! 1. resolve the target set ([`resolve_targets`], draws for random targets)
//! 2. primary effect, per target, per hit (crit roll then jitter per hit);
//!    hits stop on a target that dies
//! 3. secondary effects, per target, per effect ([`effects::apply_effects`])
//! 4. cooldown set to its full length, mp cost paid

pub mod damage;
pub mod effects;

use tracing::debug;
use xianzhan_content::{ElementMatrix, PrimaryEffect, SkillDef, SkillId, TargetMode};

use crate::combatant::{Combatant, CombatantId, Side};
use crate::config::DamageTuning;
use crate::error::{BattleError, InvalidActionReason};
use crate::log::{BattleEvent, BattleLog};
use crate::rng::Dice;

pub use damage::{base_damage, roll_heal, roll_hit, HitRoll};
pub use effects::apply_effects;

/// Floors a non-negative amount into whole points.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn to_points(amount: f64) -> u32 {
    if amount.is_nan() || amount <= 0.0 {
        0
    } else {
        amount.floor().min(f64::from(u32::MAX)) as u32
    }
}

/// Mutable view of a battle used while resolving.
#[derive(Debug)]
pub struct Scene<'a, D: Dice> {
    /// Every unit, allies then enemies, in roster order.
    pub units: &'a mut [Combatant],
    /// Random source.
    pub dice: &'a mut D,
    /// Log to append to.
    pub log: &'a mut BattleLog,
    /// Current round, stamped on log entries.
    pub round: u32,
}

impl<D: Dice> Scene<'_, D> {
    /// Position of `id` in the unit list.
    ///
    /// # Errors
    ///
    /// Returns [`BattleError::UnknownCombatant`] if no unit has that id.
    pub fn index_of(&self, id: CombatantId) -> Result<usize, BattleError> {
        index_of(self.units, id)
    }
}

/// A cast ready to resolve.
#[derive(Debug, Clone)]
pub struct Cast<'a> {
    /// The caster.
    pub caster: CombatantId,
    /// The skill resolved.
    pub skill: &'a SkillDef,
    /// Chosen target for single-target skills.
    pub target: Option<CombatantId>,
    /// The skill originally requested, when the basic attack stands in for it.
    pub fallback_from: Option<SkillId>,
}

/// What a cast did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CastReport {
    /// Resolved targets.
    pub targets: Vec<CombatantId>,
    /// Hp removed from other units.
    pub damage: u32,
    /// Hp restored.
    pub healing: u32,
    /// Units that died during the cast.
    pub defeated: Vec<CombatantId>,
}

/// Position of `id` in `units`.
///
/// # Errors
///
/// Returns [`BattleError::UnknownCombatant`] if no unit has that id.
pub fn index_of(units: &[Combatant], id: CombatantId) -> Result<usize, BattleError> {
    units
        .iter()
        .position(|u| u.id() == id)
        .ok_or(BattleError::UnknownCombatant(id))
}

/// The side a skill lands on: opponents for damaging skills, allies otherwise.
#[must_use]
pub fn affected_side(caster: &Combatant, skill: &SkillDef) -> Side {
    if skill.is_hostile() {
        caster.side().opposite()
    } else {
        caster.side()
    }
}

/// Checks that `caster` owns `skill`, that it is off cooldown, and that it is affordable.
///
/// # Errors
///
/// Returns the first [`InvalidActionReason`] that applies.
pub fn check_cast<'u>(caster: &'u Combatant, skill: &SkillId) -> Result<&'u SkillDef, InvalidActionReason> {
    let slot = caster
        .skill(skill)
        .ok_or_else(|| InvalidActionReason::SkillNotOwned(skill.clone()))?;
    if slot.cooldown > 0 {
        return Err(InvalidActionReason::OnCooldown {
            skill: skill.clone(),
            remaining: slot.cooldown,
        });
    }
    if caster.mp() < slot.def.mp_cost {
        return Err(InvalidActionReason::InsufficientMp {
            skill: skill.clone(),
            cost: slot.def.mp_cost,
            available: caster.mp(),
        });
    }
    Ok(&slot.def)
}

/// Checks the chosen target of a single-target skill.
///
/// The target must exist, be alive and stand on the side the skill affects.
/// Other target modes ignore the chosen target.
///
/// # Errors
///
/// Returns [`InvalidActionReason::MissingTarget`] or
/// [`InvalidActionReason::IllegalTarget`].
pub fn check_target(
    units: &[Combatant],
    caster: &Combatant,
    skill: &SkillDef,
    target: Option<CombatantId>,
) -> Result<(), InvalidActionReason> {
    if skill.target != TargetMode::Single {
        return Ok(());
    }
    let id = target.ok_or(InvalidActionReason::MissingTarget)?;
    let side = affected_side(caster, skill);
    match units.iter().find(|u| u.id() == id) {
        Some(unit) if unit.is_alive() && unit.side() == side => Ok(()),
        _ => Err(InvalidActionReason::IllegalTarget(id)),
    }
}

/// Resolves the target set of a cast, as unit indices.
///
/// `Random` draws one living unit of the affected side now, at resolution
/// time. `All` takes the living units of that side in roster order. A dead
/// single target resolves to nothing.
pub fn resolve_targets<D: Dice>(
    units: &[Combatant],
    caster: usize,
    skill: &SkillDef,
    target: Option<CombatantId>,
    dice: &mut D,
) -> Vec<usize> {
    let side = affected_side(&units[caster], skill);
    let candidates = || {
        units
            .iter()
            .enumerate()
            .filter(move |(_, u)| u.is_alive() && u.side() == side)
            .map(|(i, _)| i)
    };
    match skill.target {
        TargetMode::SelfOnly => vec![caster],
        TargetMode::Single => target
            .and_then(|id| units.iter().position(|u| u.id() == id && u.is_alive()))
            .into_iter()
            .collect(),
        TargetMode::All => candidates().collect(),
        TargetMode::Random => {
            let pool: Vec<_> = candidates().collect();
            if pool.is_empty() {
                Vec::new()
            } else {
                vec![pool[dice.pick(pool.len())]]
            }
        }
    }
}

/// Resolves a cast that already passed validation.
///
/// # Errors
///
/// Returns [`BattleError::UnknownCombatant`] if the caster is not in the scene.
pub fn resolve_cast<D: Dice>(
    scene: &mut Scene<'_, D>,
    elements: &ElementMatrix,
    tuning: &DamageTuning,
    cast: &Cast<'_>,
) -> Result<CastReport, BattleError> {
    let caster = scene.index_of(cast.caster)?;
    let skill = cast.skill;
    let targets = resolve_targets(scene.units, caster, skill, cast.target, scene.dice);
    let mut report = CastReport {
        targets: targets.iter().map(|&t| scene.units[t].id()).collect(),
        ..CastReport::default()
    };

    debug!(
        caster = %cast.caster,
        skill = %skill.id,
        targets = ?report.targets,
        fallback = cast.fallback_from.is_some(),
        "skill cast"
    );
    scene.log.push(
        scene.round,
        BattleEvent::SkillCast {
            actor: cast.caster,
            skill: skill.id.clone(),
            targets: report.targets.clone(),
            fallback_from: cast.fallback_from.clone(),
        },
    );

    match skill.primary() {
        PrimaryEffect::Damage => {
            for &t in &targets {
                for _ in 0..skill.hit_count {
                    if !scene.units[t].is_alive() {
                        break;
                    }
                    let roll = roll_hit(
                        &scene.units[caster],
                        &scene.units[t],
                        skill,
                        elements,
                        tuning,
                        scene.dice,
                    );
                    let lost = scene.units[t].take_damage(roll.amount);
                    scene.units[caster].record_damage(lost);
                    report.damage += lost;
                    let target = scene.units[t].id();
                    scene.log.push(
                        scene.round,
                        BattleEvent::Hit {
                            actor: cast.caster,
                            target,
                            skill: skill.id.clone(),
                            amount: lost,
                            rolled: roll.amount,
                            crit: roll.crit,
                            relation: roll.relation,
                        },
                    );
                    if !scene.units[t].is_alive() {
                        debug!(unit = %target, by = %cast.caster, "defeated");
                        scene.log.push(
                            scene.round,
                            BattleEvent::Defeated {
                                unit: target,
                                by: Some(cast.caster),
                            },
                        );
                        report.defeated.push(target);
                    }
                }
            }
        }
        PrimaryEffect::Heal => {
            for &t in &targets {
                for _ in 0..skill.hit_count {
                    if !scene.units[t].is_alive() {
                        break;
                    }
                    let amount = roll_heal(&scene.units[caster], skill, tuning, scene.dice);
                    let gained = scene.units[t].heal(amount);
                    scene.units[caster].record_healing(gained);
                    report.healing += gained;
                    scene.log.push(
                        scene.round,
                        BattleEvent::Healed {
                            actor: cast.caster,
                            target: scene.units[t].id(),
                            amount: gained,
                        },
                    );
                }
            }
        }
        PrimaryEffect::None => {}
    }

    apply_effects(scene, caster, &targets, &skill.effects, &mut report);

    let unit = &mut scene.units[caster];
    unit.start_cooldown(&skill.id);
    unit.spend_mp(skill.mp_cost);

    Ok(report)
}

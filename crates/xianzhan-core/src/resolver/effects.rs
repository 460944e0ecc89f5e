//! Secondary effects.
//!
//! Effects are applied per target, then per effect in definition order. A
//! target that is dead (before or during the sequence) receives nothing more.
//! The trigger roll is only drawn for effects whose chance is below 1.

use tracing::debug;
use xianzhan_content::{EffectKind, EffectSpec};

use crate::combatant::StatusEffect;
use crate::log::BattleEvent;
use crate::rng::Dice;
use crate::status::apply_status;

use super::{to_points, CastReport, Scene};

/// Applies `effects` from the unit at `caster` to the units at `targets`.
pub fn apply_effects<D: Dice>(
    scene: &mut Scene<'_, D>,
    caster: usize,
    targets: &[usize],
    effects: &[EffectSpec],
    report: &mut CastReport,
) {
    let source = scene.units[caster].id();
    for &t in targets {
        for spec in effects {
            if !scene.units[t].is_alive() {
                break;
            }
            let chance = spec.chance();
            if chance < 1.0 && !scene.dice.chance(chance) {
                continue;
            }
            let target = scene.units[t].id();
            match spec.kind {
                EffectKind::Damage => {
                    let lost = scene.units[t].take_damage(to_points(spec.magnitude));
                    scene.units[caster].record_damage(lost);
                    report.damage += lost;
                    scene.log.push(
                        scene.round,
                        BattleEvent::EffectDamage {
                            actor: source,
                            target,
                            amount: lost,
                        },
                    );
                    if !scene.units[t].is_alive() {
                        scene.log.push(
                            scene.round,
                            BattleEvent::Defeated {
                                unit: target,
                                by: Some(source),
                            },
                        );
                        report.defeated.push(target);
                    }
                }
                EffectKind::Heal => {
                    let gained = scene.units[t].heal(to_points(spec.magnitude));
                    scene.units[caster].record_healing(gained);
                    report.healing += gained;
                    scene.log.push(
                        scene.round,
                        BattleEvent::Healed {
                            actor: source,
                            target,
                            amount: gained,
                        },
                    );
                }
                EffectKind::Buff | EffectKind::Debuff | EffectKind::Dot | EffectKind::Hot => {
                    let Some(status) = spec.status() else {
                        continue;
                    };
                    let refreshed = apply_status(
                        &mut scene.units[t],
                        StatusEffect::new(status, spec.duration(), spec.magnitude, source),
                    );
                    let duration = scene.units[t]
                        .statuses()
                        .find(|s| s.kind == status)
                        .map_or(0, |s| s.remaining);
                    debug!(%source, %target, %status, duration, refreshed, "status applied");
                    scene.log.push(
                        scene.round,
                        BattleEvent::StatusApplied {
                            source,
                            target,
                            status,
                            duration,
                            refreshed,
                        },
                    );
                }
            }
        }
    }
}

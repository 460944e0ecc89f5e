//! Damage and healing formulas.
//!
//! A hit goes through seven steps, in this order:
//!
//! 1. `base = attack * multiplier`
//! 2. mitigation: `base *= 1 - def / (def + C + attack * penetration)`
//! 3. elemental multiplier from the matrix
//! 4. crit roll, `*= crit_damage` on success
//! 5. jitter `*= U(jitter_min, jitter_max)`
//! 6. status modifier `*= max(0, 1 + (attack% - defense%) / 100)`
//! 7. floor, at least 1
//!
//! Crit is always rolled before jitter so the RNG stream lines up between
//! replays.

use tracing::trace;
use xianzhan_content::{Element, ElementMatrix, Relation, SkillDef, Stat};

use crate::combatant::Combatant;
use crate::config::DamageTuning;
use crate::rng::Dice;
use crate::status::stat_percent;

use super::to_points;

/// Outcome of one damage roll.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitRoll {
    /// Damage before flooring.
    pub raw: f64,
    /// Damage dealt, at least 1.
    pub amount: u32,
    /// Whether the crit roll succeeded.
    pub crit: bool,
    /// Elemental matchup used.
    pub relation: Relation,
}

/// Steps 1 and 2: multiplied attack after the defender's mitigation.
///
/// ```
/// use xianzhan_core::config::DamageTuning;
/// use xianzhan_core::resolver::damage::base_damage;
///
/// let tuning = DamageTuning::default();
/// assert!((base_damage(100, 1.0, 0, &tuning) - 100.0).abs() < 1e-9);
/// // 1 - 50 / (50 + 100 + 50) = 0.75
/// assert!((base_damage(100, 1.0, 50, &tuning) - 75.0).abs() < 1e-9);
/// ```
#[must_use]
pub fn base_damage(attack: u32, multiplier: f64, defense: u32, tuning: &DamageTuning) -> f64 {
    let attack = f64::from(attack);
    let defense = f64::from(defense);
    let denominator = defense + tuning.mitigation_constant + attack * tuning.attack_penetration;
    let mitigation = if denominator > 0.0 {
        1.0 - defense / denominator
    } else {
        1.0
    };
    attack * multiplier * mitigation
}

/// Element a skill strikes with: its own, or the caster's for neutral skills.
#[must_use]
pub fn strike_element(attacker: &Combatant, skill: &SkillDef) -> Element {
    if skill.element == Element::Neutral {
        attacker.element()
    } else {
        skill.element
    }
}

/// Rolls one hit of `skill` from `attacker` against `defender`.
///
/// Draws exactly one crit roll and then one jitter roll (the jitter draw is
/// skipped when the range is empty).
pub fn roll_hit<D: Dice>(
    attacker: &Combatant,
    defender: &Combatant,
    skill: &SkillDef,
    elements: &ElementMatrix,
    tuning: &DamageTuning,
    dice: &mut D,
) -> HitRoll {
    let stats = attacker.stats();
    let mut damage = base_damage(
        stats.attack,
        skill.damage_multiplier,
        defender.stats().defense,
        tuning,
    );

    let relation = elements.relation(strike_element(attacker, skill), defender.element());
    damage *= elements.multiplier_for(relation);

    let crit = dice.chance(stats.crit_rate);
    if crit {
        damage *= stats.crit_damage;
    }

    damage *= dice.uniform(tuning.jitter_min, tuning.jitter_max);

    let modifier = 1.0
        + (stat_percent(attacker, Stat::Attack) - stat_percent(defender, Stat::Defense)) / 100.0;
    damage *= modifier.max(0.0);

    let amount = to_points(damage).max(1);
    trace!(
        attacker = %attacker.id(),
        defender = %defender.id(),
        raw = damage,
        amount,
        crit,
        ?relation,
        "hit rolled"
    );
    HitRoll {
        raw: damage,
        amount,
        crit,
        relation,
    }
}

/// Rolls one heal of `skill` cast by `healer`.
///
/// `attack * multiplier * heal_factor * U(heal_jitter_min, heal_jitter_max)`, floored.
pub fn roll_heal<D: Dice>(healer: &Combatant, skill: &SkillDef, tuning: &DamageTuning, dice: &mut D) -> u32 {
    let jitter = dice.uniform(tuning.heal_jitter_min, tuning.heal_jitter_max);
    let amount = f64::from(healer.stats().attack) * skill.damage_multiplier * tuning.heal_factor * jitter;
    to_points(amount)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combatant::{CombatStats, CombatantId, Side, StatusEffect};
    use crate::config::BattleConfig;
    use crate::rng::BattleRng;
    use crate::status::apply_status;
    use xianzhan_content::{SkillCategory, StatusKind};

    /// Dice with scripted outcomes.
    struct Loaded {
        crit: bool,
        jitter: f64,
    }

    impl Dice for Loaded {
        fn chance(&mut self, _p: f64) -> bool {
            self.crit
        }
        fn uniform(&mut self, _low: f64, _high: f64) -> f64 {
            self.jitter
        }
        fn pick(&mut self, _len: usize) -> usize {
            0
        }
        fn up_to(&mut self, _max: u32) -> u32 {
            0
        }
    }

    const STEADY: Loaded = Loaded {
        crit: false,
        jitter: 1.0,
    };

    fn fighter(id: u32, element: Element, attack: u32, defense: u32) -> Combatant {
        Combatant::builder(CombatantId::new(id), "f", Side::Allies)
            .element(element)
            .stats(CombatStats {
                attack,
                defense,
                crit_rate: 0.0,
                crit_damage: 2.0,
                ..CombatStats::default()
            })
            .build()
    }

    fn strike() -> SkillDef {
        SkillDef::basic_attack()
    }

    mod formula_tests {
        use super::*;

        #[test]
        fn undefended_neutral_hit_is_exactly_attack() {
            let a = fighter(1, Element::Neutral, 100, 0);
            let d = fighter(2, Element::Neutral, 10, 0);
            let tuning = BattleConfig::without_variance().damage;
            let mut rng = BattleRng::new(1);
            let roll = roll_hit(&a, &d, &strike(), &ElementMatrix::default(), &tuning, &mut rng);
            assert!((roll.raw - 100.0).abs() < 1e-9);
            assert_eq!(roll.amount, 100);
            assert!(!roll.crit);
        }

        #[test]
        fn element_multipliers_are_exact() {
            let tuning = DamageTuning::default();
            let matrix = ElementMatrix::default();
            let d_wood = fighter(2, Element::Wood, 10, 0);
            let d_fire = fighter(3, Element::Fire, 10, 0);
            let d_water = fighter(4, Element::Water, 10, 0);
            let metal = fighter(1, Element::Metal, 100, 0);

            let adv = roll_hit(&metal, &d_wood, &strike(), &matrix, &tuning, &mut STEADY);
            let dis = roll_hit(&metal, &d_fire, &strike(), &matrix, &tuning, &mut STEADY);
            let even = roll_hit(&metal, &d_water, &strike(), &matrix, &tuning, &mut STEADY);

            assert_eq!(adv.relation, Relation::Advantage);
            assert!((adv.raw - 150.0).abs() < 1e-9);
            assert!((dis.raw - 70.0).abs() < 1e-9);
            assert!((even.raw - 100.0).abs() < 1e-9);
        }

        #[test]
        fn skill_element_overrides_caster_element() {
            let tuning = DamageTuning::default();
            let caster = fighter(1, Element::Neutral, 100, 0);
            let wood = fighter(2, Element::Wood, 10, 0);
            let skill = strike().with_element(Element::Metal);
            let roll = roll_hit(&caster, &wood, &skill, &ElementMatrix::default(), &tuning, &mut STEADY);
            assert_eq!(roll.relation, Relation::Advantage);
        }

        #[test]
        fn crit_multiplies() {
            let a = fighter(1, Element::Neutral, 100, 0);
            let d = fighter(2, Element::Neutral, 10, 0);
            let mut dice = Loaded {
                crit: true,
                jitter: 1.0,
            };
            let roll = roll_hit(&a, &d, &strike(), &ElementMatrix::default(), &DamageTuning::default(), &mut dice);
            assert!(roll.crit);
            assert_eq!(roll.amount, 200);
        }

        #[test]
        fn damage_is_at_least_one() {
            let a = fighter(1, Element::Neutral, 0, 0);
            let d = fighter(2, Element::Neutral, 10, 500);
            let roll = roll_hit(&a, &d, &strike(), &ElementMatrix::default(), &DamageTuning::default(), &mut STEADY);
            assert_eq!(roll.amount, 1);
        }

        #[test]
        fn status_percentages_are_additive() {
            let mut a = fighter(1, Element::Neutral, 100, 0);
            let mut d = fighter(2, Element::Neutral, 10, 0);
            let src = CombatantId::new(9);
            apply_status(&mut a, StatusEffect::new(StatusKind::AttackUp, 2, 30.0, src));
            apply_status(&mut d, StatusEffect::new(StatusKind::DefenseDown, 2, 20.0, src));
            let roll = roll_hit(&a, &d, &strike(), &ElementMatrix::default(), &DamageTuning::default(), &mut STEADY);
            // 1 + (30 - (-20)) / 100 = 1.5
            assert_eq!(roll.amount, 150);
        }

        #[test]
        fn heavy_defense_buff_floors_modifier_at_zero() {
            let a = fighter(1, Element::Neutral, 100, 0);
            let mut d = fighter(2, Element::Neutral, 10, 0);
            apply_status(&mut d, StatusEffect::new(StatusKind::DefenseUp, 2, 250.0, CombatantId::new(9)));
            let roll = roll_hit(&a, &d, &strike(), &ElementMatrix::default(), &DamageTuning::default(), &mut STEADY);
            assert_eq!(roll.amount, 1);
        }
    }

    mod heal_tests {
        use super::*;

        #[test]
        fn heal_uses_half_attack() {
            let healer = fighter(1, Element::Wood, 40, 0);
            let skill = SkillDef::new("mend", "Mend", SkillCategory::Support).with_multiplier(1.5);
            assert_eq!(roll_heal(&healer, &skill, &DamageTuning::default(), &mut STEADY), 30);
        }

        #[test]
        fn seeded_rolls_repeat() {
            let a = fighter(1, Element::Fire, 80, 0);
            let d = fighter(2, Element::Metal, 10, 20);
            let tuning = DamageTuning::default();
            let matrix = ElementMatrix::default();
            let first: Vec<_> = {
                let mut rng = BattleRng::new(42);
                (0..10).map(|_| roll_hit(&a, &d, &strike(), &matrix, &tuning, &mut rng)).collect()
            };
            let second: Vec<_> = {
                let mut rng = BattleRng::new(42);
                (0..10).map(|_| roll_hit(&a, &d, &strike(), &matrix, &tuning, &mut rng)).collect()
            };
            assert_eq!(first, second);
        }
    }
}

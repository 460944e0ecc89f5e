//! A small built-in catalog of sects, beasts and techniques.
//!
//! Used by the duel driver, benchmarks and tests. Real deployments load their
//! catalog from JSON.

use crate::catalog::ContentCatalog;
use crate::element::Element;
use crate::skill::{EffectSpec, SkillCategory, SkillDef, TargetMode};
use crate::status::StatusKind;
use crate::template::CombatantTemplate;

impl ContentCatalog {
    /// Returns the built-in catalog.
    #[must_use]
    pub fn builtin() -> Self {
        let mut catalog = Self::new();
        for skill in builtin_skills() {
            catalog.insert_skill(skill);
        }
        for template in builtin_templates() {
            catalog.insert_template(template);
        }
        catalog
    }
}

fn builtin_skills() -> Vec<SkillDef> {
    vec![
        // Metal
        SkillDef::new("azure_sword_qi", "Azure Sword Qi", SkillCategory::Attack)
            .with_element(Element::Metal)
            .with_cost(10)
            .with_cooldown(1)
            .with_multiplier(1.3),
        SkillDef::new("sweeping_sword_array", "Sweeping Sword Array", SkillCategory::Attack)
            .with_element(Element::Metal)
            .with_cost(20)
            .with_cooldown(2)
            .with_multiplier(0.7)
            .with_target(TargetMode::All),
        SkillDef::new("thousand_blades", "Thousand Blades Return", SkillCategory::Ultimate)
            .with_element(Element::Metal)
            .with_cost(35)
            .with_cooldown(4)
            .with_multiplier(0.8)
            .with_hits(3),
        // Wood
        SkillDef::new("verdant_vines", "Verdant Vines", SkillCategory::Attack)
            .with_element(Element::Wood)
            .with_cost(12)
            .with_cooldown(2)
            .with_multiplier(0.9)
            .with_effect(EffectSpec::debuff(StatusKind::SpeedDown, 20.0, 2)),
        SkillDef::new("spirit_mend", "Spirit Mend", SkillCategory::Support)
            .with_element(Element::Wood)
            .with_cost(15)
            .with_cooldown(2),
        SkillDef::new("spring_rebirth", "Spring Rebirth", SkillCategory::Support)
            .with_element(Element::Wood)
            .with_cost(20)
            .with_cooldown(3)
            .with_multiplier(1.2)
            .with_target(TargetMode::SelfOnly)
            .with_effect(EffectSpec::hot(8.0, 3)),
        // Water
        SkillDef::new("tidal_palm", "Tidal Palm", SkillCategory::Attack)
            .with_element(Element::Water)
            .with_cost(10)
            .with_cooldown(1)
            .with_multiplier(1.2)
            .with_effect(EffectSpec::debuff(StatusKind::Freeze, 0.0, 1).with_chance(0.2)),
        SkillDef::new("frost_lotus", "Frost Lotus Domain", SkillCategory::Ultimate)
            .with_element(Element::Water)
            .with_cost(30)
            .with_cooldown(4)
            .with_target(TargetMode::All)
            .with_effect(EffectSpec::debuff(StatusKind::Freeze, 0.0, 1).with_chance(0.3)),
        // Fire
        SkillDef::new("flame_palm", "Flame Palm", SkillCategory::Attack)
            .with_element(Element::Fire)
            .with_cost(10)
            .with_cooldown(1)
            .with_multiplier(1.2)
            .with_effect(
                EffectSpec::dot(6.0, 3)
                    .with_chance(0.5)
                    .with_status(StatusKind::Burn),
            ),
        SkillDef::new("phoenix_blaze", "Phoenix Blaze", SkillCategory::Ultimate)
            .with_element(Element::Fire)
            .with_cost(35)
            .with_cooldown(4)
            .with_multiplier(1.1)
            .with_hits(2)
            .with_target(TargetMode::Random),
        // Earth
        SkillDef::new("mountain_guard", "Mountain Guard", SkillCategory::Defense)
            .with_element(Element::Earth)
            .with_cost(10)
            .with_cooldown(3)
            .with_multiplier(0.0)
            .with_target(TargetMode::SelfOnly)
            .with_effect(EffectSpec::buff(StatusKind::DefenseUp, 40.0, 3)),
        SkillDef::new("earthshaker", "Earthshaker Stomp", SkillCategory::Attack)
            .with_element(Element::Earth)
            .with_cost(20)
            .with_cooldown(3)
            .with_effect(EffectSpec::debuff(StatusKind::Stun, 0.0, 1).with_chance(0.35)),
        // Unaligned
        SkillDef::new("venom_fang", "Venom Fang", SkillCategory::Attack)
            .with_cost(5)
            .with_cooldown(2)
            .with_multiplier(0.8)
            .with_effect(EffectSpec::dot(5.0, 3).with_status(StatusKind::Poison)),
        SkillDef::new("battle_focus", "Battle Focus", SkillCategory::Support)
            .with_cost(15)
            .with_cooldown(4)
            .with_multiplier(0.0)
            .with_target(TargetMode::SelfOnly)
            .with_effect(EffectSpec::buff(StatusKind::AttackUp, 30.0, 3)),
    ]
}

fn builtin_templates() -> Vec<CombatantTemplate> {
    vec![
        CombatantTemplate::new("sword_disciple", "Azure Cloud Sword Disciple")
            .with_element(Element::Metal)
            .with_level(3)
            .with_multipliers(1.0, 1.1, 0.9, 1.0)
            .with_crit(0.12, 1.6)
            .with_skill("azure_sword_qi")
            .with_skill("sweeping_sword_array")
            .with_skill("thousand_blades")
            .with_skill("battle_focus"),
        CombatantTemplate::new("herb_maiden", "Hundred Herb Valley Maiden")
            .with_element(Element::Wood)
            .with_level(3)
            .with_multipliers(0.9, 0.8, 1.0, 1.1)
            .with_skill("verdant_vines")
            .with_skill("spirit_mend")
            .with_skill("spring_rebirth"),
        CombatantTemplate::new("tide_monk", "Tide Listening Monk")
            .with_element(Element::Water)
            .with_level(3)
            .with_multipliers(1.1, 0.9, 1.1, 0.9)
            .with_skill("tidal_palm")
            .with_skill("frost_lotus")
            .with_skill("mountain_guard"),
        CombatantTemplate::new("flame_cultist", "Crimson Furnace Cultist")
            .with_element(Element::Fire)
            .with_level(3)
            .with_multipliers(0.9, 1.2, 0.8, 1.0)
            .with_skill("flame_palm")
            .with_skill("phoenix_blaze")
            .with_skill("battle_focus"),
        CombatantTemplate::new("stone_golem", "Stone Spirit Golem")
            .with_element(Element::Earth)
            .with_level(2)
            .with_multipliers(1.6, 0.9, 1.5, 0.6)
            .with_skill("earthshaker")
            .with_skill("mountain_guard"),
        CombatantTemplate::new("fox_spirit", "Nine Lantern Fox Spirit")
            .with_element(Element::Fire)
            .with_level(2)
            .with_multipliers(0.8, 1.0, 0.7, 1.3)
            .with_skill("flame_palm")
            .with_skill("venom_fang"),
        CombatantTemplate::new("venom_serpent", "Jade Venom Serpent")
            .with_element(Element::Wood)
            .with_level(2)
            .with_multipliers(0.9, 1.0, 0.8, 1.2)
            .with_skill("venom_fang")
            .with_skill("verdant_vines"),
        CombatantTemplate::new("training_dummy", "Straw Training Dummy")
            .with_multipliers(1.0, 0.0, 0.0, 0.5),
    ]
}

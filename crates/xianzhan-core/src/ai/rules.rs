//! The rules of the standard decision table, in evaluation order.

use xianzhan_content::{SkillCategory, SkillDef, TargetMode};

use super::{Action, AiContext, SkillChoice};

/// Nothing is off cooldown and affordable: basic attack on the weakest opponent.
#[must_use]
pub fn basic_when_nothing_ready(ctx: &AiContext<'_>) -> Option<Action> {
    ctx.ready
        .is_empty()
        .then(|| Action::basic(ctx.actor.id(), ctx.weakest_opponent()))
}

/// Below the low-hp threshold with a support skill ready: cast it on self.
#[must_use]
pub fn self_support_when_low(ctx: &AiContext<'_>) -> Option<Action> {
    if !ctx.is_low() {
        return None;
    }
    let skill = ctx
        .ready
        .iter()
        .find(|s| s.category == SkillCategory::Support)?;
    Some(Action {
        actor: ctx.actor.id(),
        skill: SkillChoice::of(skill),
        target: Some(ctx.actor.id()),
    })
}

/// Two or more opponents standing and an area attack ready: cast it.
///
/// The weakest opponent is passed along as the nominal target.
#[must_use]
pub fn area_when_crowded(ctx: &AiContext<'_>) -> Option<Action> {
    if ctx.opponents.len() < 2 {
        return None;
    }
    let skill = ctx
        .ready
        .iter()
        .find(|s| s.target == TargetMode::All && s.is_hostile())?;
    Some(Action {
        actor: ctx.actor.id(),
        skill: SkillChoice::of(skill),
        target: ctx.weakest_opponent(),
    })
}

/// The ready attack or ultimate with the highest multiplier, at the weakest opponent.
///
/// Equal multipliers keep slot order.
#[must_use]
pub fn strongest_attack(ctx: &AiContext<'_>) -> Option<Action> {
    let skill = ctx
        .ready
        .iter()
        .filter(|s| matches!(s.category, SkillCategory::Attack | SkillCategory::Ultimate))
        .fold(None, |best: Option<&&SkillDef>, s| match best {
            Some(b) if b.damage_multiplier >= s.damage_multiplier => Some(b),
            _ => Some(s),
        })?;
    Some(Action {
        actor: ctx.actor.id(),
        skill: SkillChoice::of(skill),
        target: ctx.weakest_opponent(),
    })
}

/// Any ready skill: hostile ones at the weakest opponent, friendly ones on self.
#[must_use]
pub fn anything_ready(ctx: &AiContext<'_>) -> Option<Action> {
    let skill = ctx.ready.first()?;
    let target = if skill.is_hostile() {
        ctx.weakest_opponent()
    } else {
        Some(ctx.actor.id())
    };
    Some(Action {
        actor: ctx.actor.id(),
        skill: SkillChoice::of(skill),
        target,
    })
}

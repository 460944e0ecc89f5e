//! Decision making for units that no human drives.
//!
//! The AI is a decision table: an ordered list of [`Rule`]s, each a named
//! function from the situation ([`AiContext`]) to an optional [`Action`]. The
//! first rule that returns an action wins. Rules are plain functions, so each
//! one can be tested on its own and the table order is visible in one place
//! ([`AiPolicy::standard`]).
//!
//! Anything that picks actions for a unit implements [`Controller`]. The
//! battle state machine only talks to that trait, so tests and replays can
//! substitute scripted input for the AI.
//!
//! # Example
//!
//! ```
//! use xianzhan_core::ai::AiPolicy;
//!
//! let policy = AiPolicy::standard();
//! let names: Vec<_> = policy.rules().iter().map(|r| r.name).collect();
//! assert_eq!(names[0], "basic_when_nothing_ready");
//! assert_eq!(names.len(), 5);
//! ```

pub mod rules;

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use tracing::debug;
use xianzhan_content::{SkillDef, SkillId};

use crate::battle::BattleState;
use crate::combatant::{Combatant, CombatantId};

// =============================================================================
// Actions
// =============================================================================

/// Which technique an action uses.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkillChoice {
    /// The configured basic attack.
    Basic,
    /// An owned skill.
    Skill(SkillId),
}

impl SkillChoice {
    /// Choice for a skill definition: the basic attack maps to [`SkillChoice::Basic`].
    #[must_use]
    pub fn of(skill: &SkillDef) -> Self {
        if skill.is_basic_attack() {
            Self::Basic
        } else {
            Self::Skill(skill.id.clone())
        }
    }
}

/// A decision for one turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    /// Who acts.
    pub actor: CombatantId,
    /// What they use.
    pub skill: SkillChoice,
    /// Chosen target; required for single-target skills.
    pub target: Option<CombatantId>,
}

impl Action {
    /// Basic attack on `target`.
    #[must_use]
    pub fn basic(actor: CombatantId, target: Option<CombatantId>) -> Self {
        Self {
            actor,
            skill: SkillChoice::Basic,
            target,
        }
    }

    /// Owned skill on `target`.
    #[must_use]
    pub fn skill(actor: CombatantId, skill: &str, target: Option<CombatantId>) -> Self {
        Self {
            actor,
            skill: SkillChoice::Skill(SkillId::new(skill)),
            target,
        }
    }
}

/// Anything that picks actions for units.
pub trait Controller {
    /// Chooses what `actor` does this turn.
    fn decide(&mut self, state: &BattleState, actor: CombatantId) -> Action;
}

// =============================================================================
// Decision table
// =============================================================================

/// Everything a rule may look at.
#[derive(Debug, Clone)]
pub struct AiContext<'a> {
    /// The deciding unit.
    pub actor: &'a Combatant,
    /// Its skills that are off cooldown and affordable, in slot order.
    pub ready: Vec<&'a SkillDef>,
    /// Living opponents in roster order.
    pub opponents: Vec<&'a Combatant>,
    /// Hp fraction below which the unit looks after itself.
    pub low_hp_threshold: f64,
}

impl<'a> AiContext<'a> {
    /// Gathers the context for `actor` from the full unit list.
    #[must_use]
    pub fn new(units: &'a [Combatant], actor: &'a Combatant, low_hp_threshold: f64) -> Self {
        Self {
            actor,
            ready: actor.ready_skills().collect(),
            opponents: units
                .iter()
                .filter(|u| u.is_alive() && u.side() != actor.side())
                .collect(),
            low_hp_threshold,
        }
    }

    /// The living opponent with the lowest hp fraction, first in roster order on ties.
    #[must_use]
    pub fn weakest_opponent(&self) -> Option<CombatantId> {
        self.opponents
            .iter()
            .copied()
            .reduce(|best, u| {
                if compare_hp_fraction(u, best) == Ordering::Less {
                    u
                } else {
                    best
                }
            })
            .map(Combatant::id)
    }

    /// Returns `true` if the actor is below the low-hp threshold.
    #[must_use]
    pub fn is_low(&self) -> bool {
        f64::from(self.actor.hp()) < self.low_hp_threshold * f64::from(self.actor.max_hp())
    }
}

/// Compares `hp / max_hp` of two units exactly, by cross-multiplying.
#[must_use]
pub fn compare_hp_fraction(a: &Combatant, b: &Combatant) -> Ordering {
    let lhs = u64::from(a.hp()) * u64::from(b.max_hp());
    let rhs = u64::from(b.hp()) * u64::from(a.max_hp());
    lhs.cmp(&rhs)
}

/// One row of the decision table.
#[derive(Clone, Copy)]
pub struct Rule {
    /// Name used in logs and tests.
    pub name: &'static str,
    /// Returns an action when the rule applies.
    pub decide: fn(&AiContext<'_>) -> Option<Action>,
}

impl std::fmt::Debug for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rule").field("name", &self.name).finish_non_exhaustive()
    }
}

/// The ordered decision table.
#[derive(Debug, Clone)]
pub struct AiPolicy {
    rules: Vec<Rule>,
}

impl Default for AiPolicy {
    fn default() -> Self {
        Self::standard()
    }
}

impl AiPolicy {
    /// The standard cascade.
    #[must_use]
    pub fn standard() -> Self {
        Self::with_rules(vec![
            Rule {
                name: "basic_when_nothing_ready",
                decide: rules::basic_when_nothing_ready,
            },
            Rule {
                name: "self_support_when_low",
                decide: rules::self_support_when_low,
            },
            Rule {
                name: "area_when_crowded",
                decide: rules::area_when_crowded,
            },
            Rule {
                name: "strongest_attack",
                decide: rules::strongest_attack,
            },
            Rule {
                name: "anything_ready",
                decide: rules::anything_ready,
            },
        ])
    }

    /// A custom table.
    #[must_use]
    pub fn with_rules(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    /// The rules in evaluation order.
    #[must_use]
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Runs the table, returning the action and the name of the rule that produced it.
    ///
    /// When no rule applies the unit falls back to a basic attack on the
    /// weakest opponent, under the name `"fallback"`.
    #[must_use]
    pub fn evaluate(&self, ctx: &AiContext<'_>) -> (Action, &'static str) {
        self.rules
            .iter()
            .find_map(|rule| (rule.decide)(ctx).map(|action| (action, rule.name)))
            .unwrap_or_else(|| (Action::basic(ctx.actor.id(), ctx.weakest_opponent()), "fallback"))
    }

    /// Chooses an action for `actor` among `units`.
    #[must_use]
    pub fn choose(&self, units: &[Combatant], actor: &Combatant, low_hp_threshold: f64) -> Action {
        let ctx = AiContext::new(units, actor, low_hp_threshold);
        let (action, rule) = self.evaluate(&ctx);
        debug!(actor = %actor.id(), rule, skill = ?action.skill, target = ?action.target, "ai decision");
        action
    }
}

impl Controller for AiPolicy {
    fn decide(&mut self, state: &BattleState, actor: CombatantId) -> Action {
        match state.unit(actor) {
            Some(unit) => self.choose(state.units(), unit, state.config().low_hp_threshold),
            None => Action::basic(actor, None),
        }
    }
}

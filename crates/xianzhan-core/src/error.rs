//! Error types for encounter setup and action submission.
//!
//! Every rejection leaves the battle untouched: validation runs to completion
//! before the first mutation.

use thiserror::Error;
use xianzhan_content::{ContentError, SkillId};

use crate::battle::BattlePhase;
use crate::combatant::{CombatantId, Side};

/// Why a submitted action cannot be resolved.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidActionReason {
    /// The actor does not own the skill.
    #[error("skill '{0}' is not owned by the actor")]
    SkillNotOwned(SkillId),

    /// The skill is still cooling down.
    #[error("skill '{skill}' is on cooldown for {remaining} more turn(s)")]
    OnCooldown {
        /// The requested skill.
        skill: SkillId,
        /// Turns left.
        remaining: u32,
    },

    /// The actor cannot pay the qi cost.
    #[error("skill '{skill}' costs {cost} mp but only {available} is available")]
    InsufficientMp {
        /// The requested skill.
        skill: SkillId,
        /// Skill cost.
        cost: u32,
        /// Actor's current mp.
        available: u32,
    },

    /// The single-target skill has no target.
    #[error("a target is required")]
    MissingTarget,

    /// The target is unknown, dead or on the wrong side.
    #[error("combatant {0} is not a legal target")]
    IllegalTarget(CombatantId),
}

/// Errors raised by the battle engine.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BattleError {
    /// A template or skill referenced during setup is missing.
    #[error("content not found: {0}")]
    ContentNotFound(#[from] ContentError),

    /// The action is illegal for the current state.
    #[error("invalid action: {0}")]
    InvalidAction(#[from] InvalidActionReason),

    /// The submitter is not the unit whose turn it is.
    #[error("combatant {actor} acted out of turn (current actor: {current:?})")]
    OutOfTurnAction {
        /// Who tried to act.
        actor: CombatantId,
        /// Who is allowed to act, if anyone.
        current: Option<CombatantId>,
    },

    /// The battle already ended.
    #[error("battle already ended in {0:?}")]
    TerminalStateViolation(BattlePhase),

    /// The battle has not been started yet.
    #[error("battle has not started")]
    NotStarted,

    /// A phase change outside `preparing -> fighting -> {victory | defeat}`.
    #[error("illegal phase transition {from:?} -> {to:?}")]
    InvalidTransition {
        /// Phase before.
        from: BattlePhase,
        /// Requested phase.
        to: BattlePhase,
    },

    /// One side has no living units at start.
    #[error("the {0:?} roster has no living units")]
    EmptyRoster(Side),

    /// The id does not belong to this battle.
    #[error("combatant {0} is not part of this battle")]
    UnknownCombatant(CombatantId),

    /// A restored battle breaks an invariant the engine maintains.
    #[error("inconsistent battle state: {0}")]
    CorruptState(String),

    /// Configuration could not be parsed or is inconsistent.
    #[error("invalid battle config: {0}")]
    Config(String),
}

impl From<serde_json::Error> for BattleError {
    fn from(err: serde_json::Error) -> Self {
        Self::Config(err.to_string())
    }
}

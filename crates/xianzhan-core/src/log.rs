//! The chronological battle log.
//!
//! The log is the engine's main output: presentation replays it to drive
//! animations, and the authority ships it inside snapshots. Every entry is
//! stamped with the round it happened in.

use serde::{Deserialize, Serialize};
use xianzhan_content::{CrowdControl, Relation, SkillId, StatusKind};

use crate::battle::BattlePhase;
use crate::combatant::{CombatantId, Side};

/// Something that happened in a battle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum BattleEvent {
    /// The battle entered the fighting phase.
    BattleStarted {
        /// Ally ids in roster order.
        allies: Vec<CombatantId>,
        /// Enemy ids in roster order.
        enemies: Vec<CombatantId>,
    },
    /// A new round began with this turn order.
    RoundStarted {
        /// Living units, fastest first.
        order: Vec<CombatantId>,
    },
    /// A unit cast a skill.
    SkillCast {
        /// Caster.
        actor: CombatantId,
        /// Skill actually resolved.
        skill: SkillId,
        /// Resolved targets.
        targets: Vec<CombatantId>,
        /// The requested skill, when it was replaced by the basic attack.
        fallback_from: Option<SkillId>,
    },
    /// One hit of a damaging skill.
    Hit {
        /// Attacker.
        actor: CombatantId,
        /// Defender.
        target: CombatantId,
        /// Skill.
        skill: SkillId,
        /// Hp actually removed.
        amount: u32,
        /// Damage rolled, including any overkill.
        rolled: u32,
        /// Whether the hit was critical.
        crit: bool,
        /// Elemental matchup.
        relation: Relation,
    },
    /// Flat damage from a secondary effect.
    EffectDamage {
        /// Caster.
        actor: CombatantId,
        /// Victim.
        target: CombatantId,
        /// Hp removed.
        amount: u32,
    },
    /// Healing from a skill or a secondary effect.
    Healed {
        /// Healer.
        actor: CombatantId,
        /// Recipient.
        target: CombatantId,
        /// Hp restored.
        amount: u32,
    },
    /// A status was applied or refreshed.
    StatusApplied {
        /// Caster.
        source: CombatantId,
        /// Bearer.
        target: CombatantId,
        /// Status.
        status: StatusKind,
        /// Remaining turns after application.
        duration: u32,
        /// `true` if an existing instance was refreshed.
        refreshed: bool,
    },
    /// A damage-over-time status ticked.
    PeriodicDamage {
        /// Bearer.
        target: CombatantId,
        /// Status.
        status: StatusKind,
        /// Hp removed.
        amount: u32,
    },
    /// A heal-over-time status ticked.
    PeriodicHeal {
        /// Bearer.
        target: CombatantId,
        /// Status.
        status: StatusKind,
        /// Hp restored.
        amount: u32,
    },
    /// A status ran out.
    StatusExpired {
        /// Former bearer.
        target: CombatantId,
        /// Status.
        status: StatusKind,
    },
    /// A unit lost its turn to crowd control.
    TurnSkipped {
        /// The unit.
        actor: CombatantId,
        /// What held it.
        crowd_control: CrowdControl,
    },
    /// A unit fell.
    Defeated {
        /// The fallen unit.
        unit: CombatantId,
        /// Whoever dealt the final blow, if known.
        by: Option<CombatantId>,
    },
    /// A side gave up.
    Surrendered {
        /// The side that gave up.
        side: Side,
    },
    /// The battle reached a terminal phase.
    BattleEnded {
        /// Victory or defeat.
        phase: BattlePhase,
        /// Rounds played.
        rounds: u32,
    },
}

/// A log event stamped with its round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Round number, starting at 1 (0 before the first round).
    pub round: u32,
    /// What happened.
    #[serde(flatten)]
    pub event: BattleEvent,
}

impl LogEntry {
    /// The acting unit, for events that have one.
    #[must_use]
    pub fn actor(&self) -> Option<CombatantId> {
        match &self.event {
            BattleEvent::SkillCast { actor, .. }
            | BattleEvent::Hit { actor, .. }
            | BattleEvent::EffectDamage { actor, .. }
            | BattleEvent::Healed { actor, .. }
            | BattleEvent::TurnSkipped { actor, .. } => Some(*actor),
            BattleEvent::StatusApplied { source, .. } => Some(*source),
            _ => None,
        }
    }

    /// The unit on the receiving end, for events that have one.
    #[must_use]
    pub fn target(&self) -> Option<CombatantId> {
        match &self.event {
            BattleEvent::Hit { target, .. }
            | BattleEvent::EffectDamage { target, .. }
            | BattleEvent::Healed { target, .. }
            | BattleEvent::StatusApplied { target, .. }
            | BattleEvent::PeriodicDamage { target, .. }
            | BattleEvent::PeriodicHeal { target, .. }
            | BattleEvent::StatusExpired { target, .. } => Some(*target),
            BattleEvent::Defeated { unit, .. } => Some(*unit),
            _ => None,
        }
    }

    /// Hp moved by this entry: damage is negative, healing positive.
    #[must_use]
    pub fn hp_delta(&self) -> i64 {
        match &self.event {
            BattleEvent::Hit { amount, .. }
            | BattleEvent::EffectDamage { amount, .. }
            | BattleEvent::PeriodicDamage { amount, .. } => -i64::from(*amount),
            BattleEvent::Healed { amount, .. } | BattleEvent::PeriodicHeal { amount, .. } => {
                i64::from(*amount)
            }
            _ => 0,
        }
    }

    /// Returns `true` for critical hits.
    #[must_use]
    pub fn is_crit(&self) -> bool {
        matches!(self.event, BattleEvent::Hit { crit: true, .. })
    }
}

/// Ordered list of everything that happened in a battle.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BattleLog {
    entries: Vec<LogEntry>,
}

impl BattleLog {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an event.
    pub fn push(&mut self, round: u32, event: BattleEvent) {
        self.entries.push(LogEntry { round, event });
    }

    /// All entries, oldest first.
    #[must_use]
    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    /// Iterates over entries, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &LogEntry> + '_ {
        self.entries.iter()
    }

    /// Entries appended since `mark` (a previous [`len`](Self::len)).
    #[must_use]
    pub fn since(&self, mark: usize) -> &[LogEntry] {
        self.entries.get(mark..).unwrap_or(&[])
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing has been logged.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The most recent entry.
    #[must_use]
    pub fn last(&self) -> Option<&LogEntry> {
        self.entries.last()
    }
}

impl<'a> IntoIterator for &'a BattleLog {
    type Item = &'a LogEntry;
    type IntoIter = std::slice::Iter<'a, LogEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

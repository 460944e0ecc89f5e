//! The battle state machine.
//!
//! A battle moves through `Preparing -> Fighting -> {Victory | Defeat}`; the
//! last two are terminal. While fighting, the loop is:
//!
//! 1. take the next actor from the round's [`TurnOrder`], starting a new
//!    round (and re-ranking initiative) when the order runs out
//! 2. run the actor's pre-turn step (mp regeneration, periodic ticks, decay)
//! 3. crowd-controlled actors lose the turn; everyone else is *awaited*
//! 4. the awaited actor's [`Action`] is validated, then resolved
//! 5. terminal conditions are checked and the turn ends (cooldowns tick)
//!
//! [`BattleState::advance`] runs steps 1–3 and stops at the first actor that
//! needs a decision. [`BattleState::act`] runs steps 4–5 for a human
//! decision and rejects anything illegal without touching the state.
//! [`BattleState::step`] does both for AI-driven actors, in one call, so an
//! auto-battle driver never exposes a half-applied turn.
//!
//! # Example
//!
//! ```
//! use xianzhan_content::{ContentCatalog, EncounterDef, RosterEntry};
//! use xianzhan_core::ai::AiPolicy;
//! use xianzhan_core::battle::{setup_encounter, BattleId, BattlePhase, ControlMode};
//! use xianzhan_core::config::BattleConfig;
//!
//! let catalog = ContentCatalog::builtin();
//! let encounter = EncounterDef::new(
//!     vec![RosterEntry::new("sword_disciple", 0)],
//!     vec![RosterEntry::new("training_dummy", 0)],
//! );
//! let mut battle = setup_encounter(
//!     BattleId::new(1),
//!     &catalog,
//!     &encounter,
//!     BattleConfig::default(),
//!     42,
//!     ControlMode::Auto,
//! )
//! .unwrap();
//!
//! let phase = battle.run(&mut AiPolicy::standard()).unwrap();
//! assert_eq!(phase, BattlePhase::Victory);
//! ```

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use tracing::{debug, info};
use xianzhan_content::{ContentCatalog, ElementMatrix, EncounterDef, RewardBundle, SkillDef, SkillId};

use crate::ai::{Action, AiContext, Controller, SkillChoice};
use crate::combatant::{Combatant, CombatantId, Side};
use crate::config::{BattleConfig, TimeoutRule};
use crate::error::BattleError;
use crate::factory::CombatantFactory;
use crate::log::{BattleEvent, BattleLog};
use crate::resolver::{check_cast, check_target, index_of, resolve_cast, Cast, CastReport, Scene};
use crate::rng::BattleRng;
use crate::scheduler::TurnOrder;
use crate::status;

// =============================================================================
// Identifiers and phases
// =============================================================================

/// Unique identifier for a battle.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BattleId(u64);

impl BattleId {
    /// Creates a `BattleId` from a raw value.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw value.
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for BattleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BattleId({})", self.0)
    }
}

impl fmt::Display for BattleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for BattleId {
    fn from(id: u64) -> Self {
        Self::new(id)
    }
}

/// Lifecycle phase of a battle.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BattlePhase {
    /// Rosters built, not started.
    Preparing,
    /// Turns are being played.
    Fighting,
    /// Every enemy fell (or the enemy side conceded).
    Victory,
    /// Every ally fell, the allies surrendered, or the round limit ran out.
    Defeat,
}

impl BattlePhase {
    /// Returns `true` for victory and defeat.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Victory | Self::Defeat)
    }

    /// Returns `true` if `self -> next` is a legal transition.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Preparing, Self::Fighting) | (Self::Fighting, Self::Victory | Self::Defeat)
        )
    }
}

/// Who drives which side.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlMode {
    /// The AI drives everyone.
    #[default]
    Auto,
    /// A player drives the allies, the AI drives the enemies.
    Skirmish,
    /// Players drive both sides.
    Duel,
}

impl ControlMode {
    /// Returns `true` if a human drives `side` under this mode.
    #[must_use]
    pub const fn is_human(self, side: Side) -> bool {
        match self {
            Self::Auto => false,
            Self::Skirmish => matches!(side, Side::Allies),
            Self::Duel => true,
        }
    }
}

/// What the battle needs next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prompt {
    /// `actor` must act.
    Awaiting {
        /// The unit whose turn it is.
        actor: CombatantId,
        /// Whether a human decides for it.
        player_controlled: bool,
    },
    /// The battle is over.
    Finished(BattlePhase),
}

/// Result of one automated step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// The AI took a turn for this unit.
    Acted(CombatantId),
    /// A human must act for this unit before the battle can continue.
    AwaitingInput(CombatantId),
    /// The battle is over.
    Finished(BattlePhase),
}

// =============================================================================
// Battle state
// =============================================================================

/// A complete battle.
///
/// Units are stored allies first, then enemies, each in roster order; that
/// order breaks every tie in the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BattleState {
    pub(crate) id: BattleId,
    pub(crate) phase: BattlePhase,
    pub(crate) round: u32,
    pub(crate) units: Vec<Combatant>,
    pub(crate) order: TurnOrder,
    pub(crate) current: Option<CombatantId>,
    pub(crate) log: BattleLog,
    pub(crate) reward: RewardBundle,
    pub(crate) granted: Option<RewardBundle>,
    pub(crate) elements: ElementMatrix,
    pub(crate) config: BattleConfig,
    pub(crate) rng: BattleRng,
}

impl BattleState {
    /// Creates a battle in the preparing phase.
    ///
    /// `reward` is granted only on victory. The element matrix defaults to
    /// the overcoming cycle.
    #[must_use]
    pub fn new(
        id: BattleId,
        allies: Vec<Combatant>,
        enemies: Vec<Combatant>,
        reward: RewardBundle,
        config: BattleConfig,
        seed: u64,
    ) -> Self {
        let mut units = allies;
        units.extend(enemies);
        Self {
            id,
            phase: BattlePhase::Preparing,
            round: 0,
            units,
            order: TurnOrder::default(),
            current: None,
            log: BattleLog::new(),
            reward,
            granted: None,
            elements: ElementMatrix::default(),
            config,
            rng: BattleRng::new(seed),
        }
    }

    /// Uses a custom element matrix.
    #[must_use]
    pub fn with_elements(mut self, elements: ElementMatrix) -> Self {
        self.elements = elements;
        self
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Battle id.
    #[must_use]
    pub const fn id(&self) -> BattleId {
        self.id
    }

    /// Current phase.
    #[must_use]
    pub const fn phase(&self) -> BattlePhase {
        self.phase
    }

    /// Current round, 0 before the battle starts.
    #[must_use]
    pub const fn round(&self) -> u32 {
        self.round
    }

    /// All units, allies first.
    #[must_use]
    pub fn units(&self) -> &[Combatant] {
        &self.units
    }

    /// Looks up a unit.
    #[must_use]
    pub fn unit(&self, id: CombatantId) -> Option<&Combatant> {
        self.units.iter().find(|u| u.id() == id)
    }

    /// Units on one side, in roster order.
    pub fn side(&self, side: Side) -> impl Iterator<Item = &Combatant> + '_ {
        self.units.iter().filter(move |u| u.side() == side)
    }

    /// Returns `true` if any unit of `side` is alive.
    #[must_use]
    pub fn side_standing(&self, side: Side) -> bool {
        self.side(side).any(Combatant::is_alive)
    }

    /// The unit awaiting a decision, if any.
    #[must_use]
    pub const fn current_actor(&self) -> Option<CombatantId> {
        self.current
    }

    /// This round's turn order.
    #[must_use]
    pub const fn turn_order(&self) -> &TurnOrder {
        &self.order
    }

    /// The chronological log.
    #[must_use]
    pub const fn log(&self) -> &BattleLog {
        &self.log
    }

    /// The reward defined by the encounter.
    #[must_use]
    pub const fn reward(&self) -> &RewardBundle {
        &self.reward
    }

    /// The reward actually granted: set only on a won battle.
    #[must_use]
    pub const fn granted_reward(&self) -> Option<&RewardBundle> {
        self.granted.as_ref()
    }

    /// Element matrix in effect.
    #[must_use]
    pub const fn elements(&self) -> &ElementMatrix {
        &self.elements
    }

    /// Config in effect.
    #[must_use]
    pub const fn config(&self) -> &BattleConfig {
        &self.config
    }

    /// The random stream.
    #[must_use]
    pub const fn rng(&self) -> &BattleRng {
        &self.rng
    }

    /// Returns `true` once the battle reached victory or defeat.
    #[must_use]
    pub const fn is_over(&self) -> bool {
        self.phase.is_terminal()
    }

    /// Checks a battle built outside the engine, typically a restored snapshot.
    ///
    /// Serde restores units and the turn order field by field, so nothing the
    /// builder or the turn loop guarantees can be assumed.
    ///
    /// # Errors
    ///
    /// - [`BattleError::Config`] if the embedded config is out of range
    /// - [`BattleError::CorruptState`] naming the first broken invariant
    pub fn check(&self) -> Result<(), BattleError> {
        self.config.check()?;
        self.elements.check().map_err(BattleError::CorruptState)?;
        for (i, unit) in self.units.iter().enumerate() {
            if self.units[..i].iter().any(|u| u.id() == unit.id()) {
                return Err(BattleError::CorruptState(format!("duplicate combatant {}", unit.id())));
            }
            unit.check().map_err(BattleError::CorruptState)?;
        }
        self.order.check(&self.units).map_err(BattleError::CorruptState)?;
        if self.round > self.config.max_rounds {
            return Err(BattleError::CorruptState(format!(
                "round {} beyond the limit of {}",
                self.round, self.config.max_rounds
            )));
        }
        match (self.phase, self.current) {
            (BattlePhase::Fighting, Some(actor)) => {
                if !self.unit(actor).is_some_and(Combatant::is_alive) {
                    return Err(BattleError::CorruptState(format!("awaited actor {actor} is not a living unit")));
                }
            }
            (BattlePhase::Fighting, None) => {}
            (phase, Some(actor)) => {
                return Err(BattleError::CorruptState(format!("{actor} awaited in the {phase:?} phase")));
            }
            (_, None) => {}
        }
        if self.granted.is_some() && self.phase != BattlePhase::Victory {
            return Err(BattleError::CorruptState("reward granted without a victory".to_string()));
        }
        Ok(())
    }

    // =========================================================================
    // Phase changes
    // =========================================================================

    /// Enters the fighting phase and starts round 1.
    ///
    /// # Errors
    ///
    /// - [`BattleError::TerminalStateViolation`] if the battle already ended
    /// - [`BattleError::InvalidTransition`] if it is already fighting
    /// - [`BattleError::EmptyRoster`] if a side has no living unit
    pub fn start(&mut self) -> Result<(), BattleError> {
        if self.phase.is_terminal() {
            return Err(BattleError::TerminalStateViolation(self.phase));
        }
        for side in [Side::Allies, Side::Enemies] {
            if !self.side_standing(side) {
                return Err(BattleError::EmptyRoster(side));
            }
        }
        self.transition(BattlePhase::Fighting)?;

        info!(
            battle = %self.id,
            allies = self.side(Side::Allies).count(),
            enemies = self.side(Side::Enemies).count(),
            seed = self.rng.seed(),
            "battle started"
        );
        let allies = self.side(Side::Allies).map(Combatant::id).collect();
        let enemies = self.side(Side::Enemies).map(Combatant::id).collect();
        self.log.push(0, BattleEvent::BattleStarted { allies, enemies });
        self.begin_round()?;
        Ok(())
    }

    /// The allies give up: immediate defeat, no reward.
    ///
    /// # Errors
    ///
    /// Fails if the battle is not fighting.
    pub fn surrender(&mut self) -> Result<(), BattleError> {
        self.forfeit(Side::Allies)
    }

    /// The enemies give up: immediate victory, no reward.
    ///
    /// Used when the defending player of a duel surrenders.
    ///
    /// # Errors
    ///
    /// Fails if the battle is not fighting.
    pub fn concede_enemies(&mut self) -> Result<(), BattleError> {
        self.forfeit(Side::Enemies)
    }

    fn forfeit(&mut self, side: Side) -> Result<(), BattleError> {
        self.ensure_fighting()?;
        info!(battle = %self.id, ?side, "side surrendered");
        self.log.push(self.round, BattleEvent::Surrendered { side });
        let phase = match side {
            Side::Allies => BattlePhase::Defeat,
            Side::Enemies => BattlePhase::Victory,
        };
        self.finish(phase, false)
    }

    fn transition(&mut self, to: BattlePhase) -> Result<(), BattleError> {
        if !self.phase.can_transition_to(to) {
            return Err(BattleError::InvalidTransition {
                from: self.phase,
                to,
            });
        }
        self.phase = to;
        Ok(())
    }

    fn finish(&mut self, phase: BattlePhase, grant_reward: bool) -> Result<(), BattleError> {
        self.transition(phase)?;
        self.current = None;
        if grant_reward && phase == BattlePhase::Victory {
            self.granted = Some(self.reward.clone());
        }
        info!(battle = %self.id, ?phase, rounds = self.round, "battle ended");
        self.log.push(
            self.round,
            BattleEvent::BattleEnded {
                phase,
                rounds: self.round,
            },
        );
        Ok(())
    }

    fn ensure_fighting(&self) -> Result<(), BattleError> {
        match self.phase {
            BattlePhase::Fighting => Ok(()),
            BattlePhase::Preparing => Err(BattleError::NotStarted),
            phase => Err(BattleError::TerminalStateViolation(phase)),
        }
    }

    /// Ends the battle if one side has fallen. Returns the terminal phase if so.
    fn settle(&mut self) -> Result<Option<BattlePhase>, BattleError> {
        if self.phase != BattlePhase::Fighting {
            return Ok(None);
        }
        let phase = if !self.side_standing(Side::Enemies) {
            BattlePhase::Victory
        } else if !self.side_standing(Side::Allies) {
            BattlePhase::Defeat
        } else {
            return Ok(None);
        };
        self.finish(phase, true)?;
        Ok(Some(phase))
    }

    /// Starts the next round, or ends the battle at the round limit.
    ///
    /// Returns `false` if the battle ended.
    fn begin_round(&mut self) -> Result<bool, BattleError> {
        if self.round >= self.config.max_rounds {
            let phase = self.timeout_phase();
            info!(battle = %self.id, max_rounds = self.config.max_rounds, ?phase, "round limit reached");
            self.finish(phase, false)?;
            return Ok(false);
        }
        self.round += 1;
        self.order = TurnOrder::new(&self.units);
        debug!(battle = %self.id, round = self.round, order = ?self.order.order(), "round started");
        self.log.push(
            self.round,
            BattleEvent::RoundStarted {
                order: self.order.order().to_vec(),
            },
        );
        Ok(true)
    }

    /// Outcome of a battle cut off by the round limit.
    fn timeout_phase(&self) -> BattlePhase {
        match self.config.timeout {
            TimeoutRule::Defeat => BattlePhase::Defeat,
            TimeoutRule::Standing => {
                let standing = |side| {
                    self.side(side).fold((0u64, 0u64), |(hp, max), u| {
                        (hp + u64::from(u.hp()), max + u64::from(u.max_hp()))
                    })
                };
                let dealt = |side| self.side(side).map(Combatant::damage_dealt).sum::<u64>();
                let (ally_hp, ally_max) = standing(Side::Allies);
                let (enemy_hp, enemy_max) = standing(Side::Enemies);
                // ally_hp / ally_max against enemy_hp / enemy_max, in integers.
                let share = (u128::from(ally_hp) * u128::from(enemy_max))
                    .cmp(&(u128::from(enemy_hp) * u128::from(ally_max)));
                match share.then_with(|| dealt(Side::Allies).cmp(&dealt(Side::Enemies))) {
                    Ordering::Greater => BattlePhase::Victory,
                    Ordering::Less | Ordering::Equal => BattlePhase::Defeat,
                }
            }
        }
    }

    // =========================================================================
    // Turn loop
    // =========================================================================

    /// Plays pre-turn steps until some unit must decide or the battle ends.
    ///
    /// Calling it again while a unit is awaited returns the same prompt.
    ///
    /// # Errors
    ///
    /// Returns [`BattleError::NotStarted`] in the preparing phase.
    pub fn advance(&mut self) -> Result<Prompt, BattleError> {
        match self.phase {
            BattlePhase::Preparing => return Err(BattleError::NotStarted),
            BattlePhase::Victory | BattlePhase::Defeat => return Ok(Prompt::Finished(self.phase)),
            BattlePhase::Fighting => {}
        }
        if let Some(actor) = self.current {
            return Ok(self.awaiting(actor));
        }

        loop {
            if let Some(phase) = self.settle()? {
                return Ok(Prompt::Finished(phase));
            }
            let Some(actor) = self.order.next_actor() else {
                if !self.begin_round()? {
                    return Ok(Prompt::Finished(self.phase));
                }
                continue;
            };
            let idx = index_of(&self.units, actor)?;
            if !self.units[idx].is_alive() {
                continue;
            }

            let start = status::begin_turn(
                &mut self.units[idx],
                self.config.mp_regen_per_turn,
                self.round,
                &mut self.log,
            );
            if start.died {
                debug!(unit = %actor, "fell to a periodic effect");
                self.log.push(
                    self.round,
                    BattleEvent::Defeated {
                        unit: actor,
                        by: start.killed_by,
                    },
                );
                self.order.reschedule_after_death(&self.units);
                continue;
            }
            if !start.crowd_control.is_empty() {
                debug!(unit = %actor, crowd_control = ?start.crowd_control, "turn skipped");
                self.log.push(
                    self.round,
                    BattleEvent::TurnSkipped {
                        actor,
                        crowd_control: start.crowd_control,
                    },
                );
                status::end_turn(&mut self.units[idx], None);
                continue;
            }

            self.current = Some(actor);
            return Ok(self.awaiting(actor));
        }
    }

    fn awaiting(&self, actor: CombatantId) -> Prompt {
        Prompt::Awaiting {
            actor,
            player_controlled: self.unit(actor).is_some_and(Combatant::is_player_controlled),
        }
    }

    /// Validates and resolves a decision for the awaited unit.
    ///
    /// Nothing is mutated unless every check passes. Unavailable skills are
    /// rejected, not replaced.
    ///
    /// # Errors
    ///
    /// - [`BattleError::NotStarted`] / [`BattleError::TerminalStateViolation`]
    ///   outside the fighting phase
    /// - [`BattleError::OutOfTurnAction`] if `action.actor` is not awaited
    /// - [`BattleError::InvalidAction`] for unowned, cooling, unaffordable
    ///   skills and illegal targets
    pub fn act(&mut self, action: &Action) -> Result<CastReport, BattleError> {
        let idx = self.check_turn(action.actor)?;
        let skill = match &action.skill {
            SkillChoice::Basic => self.config.basic_attack.clone(),
            SkillChoice::Skill(id) => check_cast(&self.units[idx], id)?.clone(),
        };
        check_target(&self.units, &self.units[idx], &skill, action.target)?;
        self.execute(idx, &skill, action.target, None)
    }

    /// Resolves an automated decision, substituting the basic attack for an
    /// unavailable skill and re-aiming an illegal target.
    ///
    /// # Errors
    ///
    /// Fails on phase and turn violations, like [`act`](Self::act).
    pub fn act_automated(&mut self, action: &Action) -> Result<CastReport, BattleError> {
        let idx = self.check_turn(action.actor)?;
        let requested = match &action.skill {
            SkillChoice::Basic => None,
            SkillChoice::Skill(id) => Some(id),
        };
        let (skill, fallback_from) = match requested.map(|id| check_cast(&self.units[idx], id)) {
            Some(Ok(def)) => (def.clone(), None),
            Some(Err(reason)) => {
                debug!(actor = %action.actor, %reason, "falling back to basic attack");
                (self.config.basic_attack.clone(), requested.cloned())
            }
            None => (self.config.basic_attack.clone(), None),
        };
        let target = if check_target(&self.units, &self.units[idx], &skill, action.target).is_ok() {
            action.target
        } else {
            self.default_target(idx, &skill)
        };
        check_target(&self.units, &self.units[idx], &skill, target)?;
        self.execute(idx, &skill, target, fallback_from)
    }

    /// Weakest opponent for hostile skills, the caster for friendly ones.
    fn default_target(&self, idx: usize, skill: &SkillDef) -> Option<CombatantId> {
        let unit = &self.units[idx];
        if skill.is_hostile() {
            AiContext::new(&self.units, unit, self.config.low_hp_threshold).weakest_opponent()
        } else {
            Some(unit.id())
        }
    }

    fn check_turn(&self, actor: CombatantId) -> Result<usize, BattleError> {
        self.ensure_fighting()?;
        if self.current != Some(actor) {
            return Err(BattleError::OutOfTurnAction {
                actor,
                current: self.current,
            });
        }
        index_of(&self.units, actor)
    }

    fn execute(
        &mut self,
        idx: usize,
        skill: &SkillDef,
        target: Option<CombatantId>,
        fallback_from: Option<SkillId>,
    ) -> Result<CastReport, BattleError> {
        let caster = self.units[idx].id();
        let report = {
            let mut scene = Scene {
                units: &mut self.units,
                dice: &mut self.rng,
                log: &mut self.log,
                round: self.round,
            };
            let cast = Cast {
                caster,
                skill,
                target,
                fallback_from,
            };
            resolve_cast(&mut scene, &self.elements, &self.config.damage, &cast)?
        };

        if !report.defeated.is_empty() {
            self.order.reschedule_after_death(&self.units);
        }
        status::end_turn(&mut self.units[idx], Some(&skill.id));
        self.current = None;
        self.settle()?;
        Ok(report)
    }

    /// Plays one turn if it belongs to an AI-driven unit.
    ///
    /// # Errors
    ///
    /// Returns [`BattleError::NotStarted`] in the preparing phase, or any
    /// error from resolving the controller's action.
    pub fn step<C: Controller + ?Sized>(&mut self, controller: &mut C) -> Result<StepOutcome, BattleError> {
        self.step_inner(controller, false)
    }

    /// Plays one turn, letting `controller` decide for human-driven units too.
    ///
    /// # Errors
    ///
    /// Same as [`step`](Self::step).
    pub fn step_all<C: Controller + ?Sized>(&mut self, controller: &mut C) -> Result<StepOutcome, BattleError> {
        self.step_inner(controller, true)
    }

    fn step_inner<C: Controller + ?Sized>(
        &mut self,
        controller: &mut C,
        drive_players: bool,
    ) -> Result<StepOutcome, BattleError> {
        match self.advance()? {
            Prompt::Finished(phase) => Ok(StepOutcome::Finished(phase)),
            Prompt::Awaiting {
                actor,
                player_controlled: true,
            } if !drive_players => Ok(StepOutcome::AwaitingInput(actor)),
            Prompt::Awaiting { actor, .. } => {
                let action = controller.decide(self, actor);
                self.act_automated(&action)?;
                Ok(StepOutcome::Acted(actor))
            }
        }
    }

    /// Plays the battle to the end with `controller` deciding for every unit.
    ///
    /// Always terminates: the round limit ends stalemates.
    ///
    /// # Errors
    ///
    /// Same as [`step`](Self::step).
    pub fn run<C: Controller + ?Sized>(&mut self, controller: &mut C) -> Result<BattlePhase, BattleError> {
        loop {
            if let StepOutcome::Finished(phase) = self.step_all(controller)? {
                return Ok(phase);
            }
        }
    }
}

// =============================================================================
// Encounter setup
// =============================================================================

/// Builds both rosters of `encounter` and starts the battle.
///
/// The seed drives starting initiative as well as every roll of the battle.
/// Duels always end on [`TimeoutRule::Standing`] at the round limit, so
/// neither player wins by stalling.
///
/// # Errors
///
/// - [`BattleError::Config`] for an invalid config
/// - [`BattleError::ContentNotFound`] if the encounter names missing content
/// - [`BattleError::EmptyRoster`] if a roster is empty
pub fn setup_encounter(
    id: BattleId,
    catalog: &ContentCatalog,
    encounter: &EncounterDef,
    mut config: BattleConfig,
    seed: u64,
    mode: ControlMode,
) -> Result<BattleState, BattleError> {
    config.check()?;
    if mode == ControlMode::Duel {
        config.timeout = TimeoutRule::Standing;
    }
    let mut rng = BattleRng::new(seed);
    let mut factory = CombatantFactory::new(&config);
    let allies = factory.build_roster(
        catalog,
        &encounter.allies,
        Side::Allies,
        mode.is_human(Side::Allies),
        &mut rng,
    )?;
    let enemies = factory.build_roster(
        catalog,
        &encounter.enemies,
        Side::Enemies,
        mode.is_human(Side::Enemies),
        &mut rng,
    )?;

    let mut state = BattleState::new(id, allies, enemies, encounter.reward.clone(), config, seed)
        .with_elements(catalog.elements().clone());
    state.rng = rng;
    state.start()?;
    Ok(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combatant::CombatStats;
    use crate::error::InvalidActionReason;
    use xianzhan_content::{EffectSpec, SkillCategory, StatusKind};

    fn fighter(id: u32, side: Side, hp: u32, attack: u32, speed: u32) -> Combatant {
        Combatant::builder(CombatantId::new(id), "f", side)
            .stats(CombatStats {
                max_hp: hp,
                max_mp: 50,
                attack,
                defense: 0,
                speed,
                crit_rate: 0.0,
                crit_damage: 1.5,
            })
            .player_controlled(side == Side::Allies)
            .build()
    }

    fn duel() -> BattleState {
        BattleState::new(
            BattleId::new(1),
            vec![fighter(1, Side::Allies, 100, 20, 20)],
            vec![fighter(2, Side::Enemies, 100, 10, 10)],
            RewardBundle {
                spirit_stones: 30,
                ..RewardBundle::default()
            },
            BattleConfig::without_variance(),
            7,
        )
    }

    mod phase_tests {
        use super::*;

        #[test]
        fn transitions_only_go_forward() {
            use BattlePhase::*;
            assert!(Preparing.can_transition_to(Fighting));
            assert!(Fighting.can_transition_to(Victory));
            assert!(Fighting.can_transition_to(Defeat));
            assert!(!Preparing.can_transition_to(Victory));
            assert!(!Victory.can_transition_to(Fighting));
            assert!(!Defeat.can_transition_to(Victory));
            assert!(!Fighting.can_transition_to(Preparing));
        }

        #[test]
        fn advance_before_start_fails() {
            let mut b = duel();
            assert_eq!(b.advance(), Err(BattleError::NotStarted));
        }

        #[test]
        fn start_twice_is_rejected() {
            let mut b = duel();
            b.start().unwrap();
            assert!(matches!(b.start(), Err(BattleError::InvalidTransition { .. })));
        }

        #[test]
        fn empty_roster_cannot_start() {
            let mut b = BattleState::new(
                BattleId::new(1),
                vec![fighter(1, Side::Allies, 100, 20, 20)],
                Vec::new(),
                RewardBundle::default(),
                BattleConfig::default(),
                1,
            );
            assert_eq!(b.start(), Err(BattleError::EmptyRoster(Side::Enemies)));
            assert_eq!(b.phase(), BattlePhase::Preparing);
        }

        #[test]
        fn surrender_is_defeat_without_reward() {
            let mut b = duel();
            b.start().unwrap();
            b.surrender().unwrap();
            assert_eq!(b.phase(), BattlePhase::Defeat);
            assert!(b.granted_reward().is_none());
            assert_eq!(b.surrender(), Err(BattleError::TerminalStateViolation(BattlePhase::Defeat)));
        }

        #[test]
        fn conceding_enemies_grant_no_reward() {
            let mut b = duel();
            b.start().unwrap();
            b.concede_enemies().unwrap();
            assert_eq!(b.phase(), BattlePhase::Victory);
            assert!(b.granted_reward().is_none());
        }
    }

    mod turn_tests {
        use super::*;

        #[test]
        fn fastest_unit_is_awaited_first() {
            let mut b = duel();
            b.start().unwrap();
            assert_eq!(
                b.advance().unwrap(),
                Prompt::Awaiting {
                    actor: CombatantId::new(1),
                    player_controlled: true
                }
            );
            // Asking again does not skip the turn.
            assert_eq!(b.current_actor(), Some(CombatantId::new(1)));
            assert!(matches!(b.advance().unwrap(), Prompt::Awaiting { .. }));
        }

        #[test]
        fn out_of_turn_action_changes_nothing() {
            let mut b = duel();
            b.start().unwrap();
            b.advance().unwrap();
            let before = b.clone();
            let err = b
                .act(&Action::basic(CombatantId::new(2), Some(CombatantId::new(1))))
                .unwrap_err();
            assert!(matches!(err, BattleError::OutOfTurnAction { .. }));
            assert_eq!(b, before);
        }

        #[test]
        fn unowned_skill_is_rejected_for_humans() {
            let mut b = duel();
            b.start().unwrap();
            b.advance().unwrap();
            let before = b.clone();
            let err = b
                .act(&Action::skill(CombatantId::new(1), "missing", Some(CombatantId::new(2))))
                .unwrap_err();
            assert!(matches!(
                err,
                BattleError::InvalidAction(InvalidActionReason::SkillNotOwned(_))
            ));
            assert_eq!(b, before);
        }

        #[test]
        fn human_turn_resolves_and_passes_the_turn() {
            let mut b = duel();
            b.start().unwrap();
            b.advance().unwrap();
            let report = b
                .act(&Action::basic(CombatantId::new(1), Some(CombatantId::new(2))))
                .unwrap();
            assert_eq!(report.damage, 20);
            assert_eq!(b.unit(CombatantId::new(2)).unwrap().hp(), 80);
            assert_eq!(b.current_actor(), None);
            assert_eq!(
                b.advance().unwrap(),
                Prompt::Awaiting {
                    actor: CombatantId::new(2),
                    player_controlled: false
                }
            );
        }

        #[test]
        fn step_waits_for_humans() {
            let mut b = duel();
            b.start().unwrap();
            let mut ai = crate::ai::AiPolicy::standard();
            assert_eq!(b.step(&mut ai).unwrap(), StepOutcome::AwaitingInput(CombatantId::new(1)));
            b.act(&Action::basic(CombatantId::new(1), Some(CombatantId::new(2))))
                .unwrap();
            assert_eq!(b.step(&mut ai).unwrap(), StepOutcome::Acted(CombatantId::new(2)));
            assert_eq!(b.unit(CombatantId::new(1)).unwrap().hp(), 90);
        }

        #[test]
        fn victory_attaches_the_reward() {
            let mut b = duel();
            b.start().unwrap();
            let phase = b.run(&mut crate::ai::AiPolicy::standard()).unwrap();
            assert_eq!(phase, BattlePhase::Victory);
            assert_eq!(b.granted_reward().map(|r| r.spirit_stones), Some(30));
            assert!(b.act(&Action::basic(CombatantId::new(1), None)).is_err());
        }

        #[test]
        fn stunned_unit_skips_but_cooldowns_tick() {
            let slam = SkillDef::new("slam", "Slam", SkillCategory::Attack).with_cooldown(3);
            let hero = Combatant::builder(CombatantId::new(1), "hero", Side::Allies)
                .stats(fighter(1, Side::Allies, 100, 20, 20).stats().clone())
                .skill(slam)
                .build();
            let mut b = BattleState::new(
                BattleId::new(1),
                vec![hero],
                vec![fighter(2, Side::Enemies, 100, 0, 10)],
                RewardBundle::default(),
                BattleConfig::without_variance(),
                3,
            );
            b.start().unwrap();
            b.advance().unwrap();
            b.act(&Action::skill(CombatantId::new(1), "slam", Some(CombatantId::new(2))))
                .unwrap();
            assert_eq!(b.units[0].skills()[0].cooldown, 3);

            status::apply_status(
                &mut b.units[0],
                crate::combatant::StatusEffect::new(StatusKind::Stun, 1, 0.0, CombatantId::new(2)),
            );
            // Enemy acts, then the hero's stunned turn passes without a prompt.
            b.advance().unwrap();
            b.act_automated(&Action::basic(CombatantId::new(2), Some(CombatantId::new(1))))
                .unwrap();
            let prompt = b.advance().unwrap();
            assert!(b
                .log()
                .iter()
                .any(|e| matches!(e.event, BattleEvent::TurnSkipped { .. })));
            assert_eq!(b.units[0].skills()[0].cooldown, 2);
            assert_eq!(
                prompt,
                Prompt::Awaiting {
                    actor: CombatantId::new(2),
                    player_controlled: false
                }
            );
        }

        #[test]
        fn automated_fallback_replaces_unaffordable_skill() {
            let costly = SkillDef::new("nova", "Nova", SkillCategory::Ultimate)
                .with_cost(500)
                .with_effect(EffectSpec::debuff(StatusKind::Stun, 0.0, 1));
            let enemy = Combatant::builder(CombatantId::new(2), "foe", Side::Enemies)
                .stats(CombatStats {
                    speed: 99,
                    crit_rate: 0.0,
                    ..CombatStats::default()
                })
                .skill(costly)
                .build();
            let mut b = BattleState::new(
                BattleId::new(1),
                vec![fighter(1, Side::Allies, 100, 20, 5)],
                vec![enemy],
                RewardBundle::default(),
                BattleConfig::without_variance(),
                3,
            );
            b.start().unwrap();
            b.advance().unwrap();
            b.act_automated(&Action::skill(CombatantId::new(2), "nova", Some(CombatantId::new(1))))
                .unwrap();
            assert!(b.log().iter().any(|e| matches!(
                &e.event,
                BattleEvent::SkillCast { fallback_from: Some(id), .. } if id.as_str() == "nova"
            )));
            assert!(b.units[0].debuffs().is_empty());
        }

        #[test]
        fn round_limit_ends_in_defeat() {
            let mut config = BattleConfig::without_variance();
            config.max_rounds = 3;
            let mut b = BattleState::new(
                BattleId::new(1),
                vec![fighter(1, Side::Allies, 1000, 1, 10)],
                vec![fighter(2, Side::Enemies, 1000, 1, 10)],
                RewardBundle::default(),
                config,
                1,
            );
            b.start().unwrap();
            let phase = b.run(&mut crate::ai::AiPolicy::standard()).unwrap();
            assert_eq!(phase, BattlePhase::Defeat);
            assert_eq!(b.round(), 3);
        }

        fn timed_out(ally_attack: u32, enemy_attack: u32) -> BattleState {
            let mut config = BattleConfig::without_variance();
            config.max_rounds = 3;
            config.timeout = TimeoutRule::Standing;
            let mut b = BattleState::new(
                BattleId::new(1),
                vec![fighter(1, Side::Allies, 1000, ally_attack, 10)],
                vec![fighter(2, Side::Enemies, 1000, enemy_attack, 10)],
                RewardBundle {
                    spirit_stones: 30,
                    ..RewardBundle::default()
                },
                config,
                1,
            );
            b.start().unwrap();
            b.run(&mut crate::ai::AiPolicy::standard()).unwrap();
            b
        }

        #[test]
        fn standing_timeout_favours_whoever_is_ahead() {
            let ahead = timed_out(5, 1);
            assert_eq!(ahead.phase(), BattlePhase::Victory);
            assert_eq!(ahead.round(), 3);
            assert_eq!(ahead.unit(CombatantId::new(2)).unwrap().hp(), 985);
            assert!(ahead.granted_reward().is_none());

            let behind = timed_out(1, 5);
            assert_eq!(behind.phase(), BattlePhase::Defeat);
        }

        #[test]
        fn standing_timeout_tie_is_a_defeat() {
            let even = timed_out(2, 2);
            assert_eq!(
                even.unit(CombatantId::new(1)).unwrap().hp(),
                even.unit(CombatantId::new(2)).unwrap().hp()
            );
            assert_eq!(even.phase(), BattlePhase::Defeat);
        }

        #[test]
        fn duels_are_decided_on_standing() {
            let encounter = EncounterDef::new(
                vec![xianzhan_content::RosterEntry::new("sword_disciple", 0)],
                vec![xianzhan_content::RosterEntry::new("training_dummy", 0)],
            );
            let catalog = ContentCatalog::builtin();
            let duel = setup_encounter(
                BattleId::new(1),
                &catalog,
                &encounter,
                BattleConfig::default(),
                3,
                ControlMode::Duel,
            )
            .unwrap();
            assert_eq!(duel.config().timeout, TimeoutRule::Standing);

            let skirmish = setup_encounter(
                BattleId::new(2),
                &catalog,
                &encounter,
                BattleConfig::default(),
                3,
                ControlMode::Skirmish,
            )
            .unwrap();
            assert_eq!(skirmish.config().timeout, TimeoutRule::Defeat);
        }
    }

    mod restore_tests {
        use super::*;

        #[test]
        fn started_battle_passes_its_check() {
            let mut b = duel();
            b.start().unwrap();
            b.check().unwrap();
            b.advance().unwrap();
            b.check().unwrap();
        }

        #[test]
        fn inconsistent_fields_are_caught() {
            let mut b = duel();
            b.start().unwrap();

            let mut early_reward = b.clone();
            early_reward.granted = Some(early_reward.reward.clone());
            assert!(matches!(early_reward.check(), Err(BattleError::CorruptState(_))));

            let mut stranger = b.clone();
            stranger.current = Some(CombatantId::new(9));
            assert!(matches!(stranger.check(), Err(BattleError::CorruptState(_))));

            let mut overtime = b.clone();
            overtime.round = overtime.config.max_rounds + 1;
            assert!(matches!(overtime.check(), Err(BattleError::CorruptState(_))));

            let mut twins = b;
            let copy = twins.units[0].clone();
            twins.units.push(copy);
            assert!(matches!(twins.check(), Err(BattleError::CorruptState(_))));
        }
    }
}

//! The authoritative battle registry.
//!
//! Clients never touch a [`BattleState`]. They hold an [`ActorToken`] seated
//! on one side of a battle and submit decisions through
//! [`BattleAuthority::submit_action`]; the authority validates the submitter,
//! lets the engine validate the action, applies it, then plays AI turns until
//! a human decision is needed again. Every reply is a [`BattleSnapshot`]
//! carrying a state digest that replays can be checked against.
//!
//! Battles without seats are auto battles. [`BattleAuthority::tick_auto`]
//! advances all of them by one turn, in parallel: separate battles share no
//! mutable state, and each owns its random stream, so the result does not
//! depend on thread scheduling.

use std::collections::BTreeMap;
use std::fmt;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use xianzhan_content::{ContentCatalog, EncounterDef, RosterEntry};
use xianzhan_core::{
    hash_battle, setup_encounter, Action, AiPolicy, BattleConfig, BattleError, BattleId,
    BattlePhase, BattleState, Combatant, CombatantId, ControlMode, Prompt, Side, SkillChoice,
    StepOutcome,
};

use crate::error::AuthorityError;

// =============================================================================
// Seats and snapshots
// =============================================================================

/// Opaque identity of a player, issued by whatever authenticates them.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ActorToken(String);

impl ActorToken {
    /// Creates a token.
    #[must_use]
    pub fn new(token: &str) -> Self {
        Self(token.to_string())
    }

    /// Returns the token as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ActorToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ActorToken {
    fn from(token: &str) -> Self {
        Self::new(token)
    }
}

/// Which side a token drives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Seat {
    /// The player.
    pub token: ActorToken,
    /// The side their decisions are accepted for.
    pub side: Side,
}

impl Seat {
    /// Seats `token` on `side`.
    #[must_use]
    pub fn new(token: ActorToken, side: Side) -> Self {
        Self { token, side }
    }
}

/// A read-only view of a battle returned to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BattleSnapshot {
    /// Battle id.
    pub battle: BattleId,
    /// Phase at the time of the snapshot.
    pub phase: BattlePhase,
    /// Current round.
    pub round: u32,
    /// The unit whose decision is pending, if any.
    pub awaiting: Option<CombatantId>,
    /// Full battle state, including the log.
    pub state: BattleState,
    /// Deterministic digest of `state`.
    pub digest: u64,
}

impl BattleSnapshot {
    /// Captures `state`.
    #[must_use]
    pub fn of(state: &BattleState) -> Self {
        Self {
            battle: state.id(),
            phase: state.phase(),
            round: state.round(),
            awaiting: state.current_actor(),
            state: state.clone(),
            digest: hash_battle(state),
        }
    }
}

#[derive(Debug, Clone)]
struct Session {
    state: BattleState,
    seats: Vec<Seat>,
}

impl Session {
    fn side_of(&self, token: &ActorToken) -> Option<Side> {
        self.seats.iter().find(|s| &s.token == token).map(|s| s.side)
    }

    fn is_auto(&self) -> bool {
        self.seats.is_empty()
    }
}

// =============================================================================
// Authority
// =============================================================================

/// Sole owner and writer of every live battle.
#[derive(Debug)]
pub struct BattleAuthority {
    catalog: ContentCatalog,
    config: BattleConfig,
    ai: AiPolicy,
    battles: BTreeMap<BattleId, Session>,
    next_id: u64,
}

impl BattleAuthority {
    /// Creates an empty authority serving `catalog` under `config`.
    #[must_use]
    pub fn new(catalog: ContentCatalog, config: BattleConfig) -> Self {
        Self {
            catalog,
            config,
            ai: AiPolicy::standard(),
            battles: BTreeMap::new(),
            next_id: 1,
        }
    }

    /// Uses a custom decision table for AI-driven units.
    #[must_use]
    pub fn with_policy(mut self, ai: AiPolicy) -> Self {
        self.ai = ai;
        self
    }

    /// Number of registered battles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.battles.len()
    }

    /// Returns `true` if no battle is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.battles.is_empty()
    }

    /// Registered battle ids in ascending order.
    pub fn ids(&self) -> impl Iterator<Item = BattleId> + '_ {
        self.battles.keys().copied()
    }

    /// Read access to a battle.
    #[must_use]
    pub fn battle(&self, id: BattleId) -> Option<&BattleState> {
        self.battles.get(&id).map(|s| &s.state)
    }

    /// Snapshot of a battle.
    ///
    /// # Errors
    ///
    /// Returns [`AuthorityError::UnknownBattle`] for an unregistered id.
    pub fn snapshot(&self, id: BattleId) -> Result<BattleSnapshot, AuthorityError> {
        self.battles
            .get(&id)
            .map(|s| BattleSnapshot::of(&s.state))
            .ok_or(AuthorityError::UnknownBattle(id))
    }

    // =========================================================================
    // Opening battles
    // =========================================================================

    /// Opens a PvE battle: `token` drives the allies, the AI drives the enemies.
    ///
    /// Enemy turns that come before the first ally turn are already played
    /// in the returned snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`AuthorityError::Rejected`] if the encounter cannot be set up.
    pub fn open_skirmish(
        &mut self,
        encounter: &EncounterDef,
        token: ActorToken,
        seed: u64,
    ) -> Result<BattleSnapshot, AuthorityError> {
        self.open(
            encounter,
            ControlMode::Skirmish,
            vec![Seat::new(token, Side::Allies)],
            seed,
        )
    }

    /// Opens a PvP battle: the challenger's roster fights as the allies, the
    /// defender's as the enemies. Duels carry no reward.
    ///
    /// # Errors
    ///
    /// Returns [`AuthorityError::Rejected`] if a roster cannot be built.
    pub fn open_duel(
        &mut self,
        challenger: ActorToken,
        challenger_roster: Vec<RosterEntry>,
        defender: ActorToken,
        defender_roster: Vec<RosterEntry>,
        seed: u64,
    ) -> Result<BattleSnapshot, AuthorityError> {
        let encounter = EncounterDef::new(challenger_roster, defender_roster);
        self.open(
            &encounter,
            ControlMode::Duel,
            vec![
                Seat::new(challenger, Side::Allies),
                Seat::new(defender, Side::Enemies),
            ],
            seed,
        )
    }

    /// Opens an auto battle with no seats, advanced by [`tick_auto`](Self::tick_auto).
    ///
    /// # Errors
    ///
    /// Returns [`AuthorityError::Rejected`] if the encounter cannot be set up.
    pub fn open_auto(&mut self, encounter: &EncounterDef, seed: u64) -> Result<BattleId, AuthorityError> {
        self.open(encounter, ControlMode::Auto, Vec::new(), seed)
            .map(|snapshot| snapshot.battle)
    }

    fn open(
        &mut self,
        encounter: &EncounterDef,
        mode: ControlMode,
        seats: Vec<Seat>,
        seed: u64,
    ) -> Result<BattleSnapshot, AuthorityError> {
        let id = BattleId::new(self.next_id);
        let state = setup_encounter(id, &self.catalog, encounter, self.config.clone(), seed, mode)?;
        self.next_id += 1;
        info!(battle = %id, ?mode, seed, "battle opened");
        self.insert(state, seats)
    }

    /// Registers an existing battle, for example one restored from a saved
    /// snapshot.
    ///
    /// # Errors
    ///
    /// - [`AuthorityError::DuplicateBattle`] if the id is taken
    /// - [`AuthorityError::Rejected`] if the battle was never started or
    ///   fails [`BattleState::check`]
    pub fn register(&mut self, state: BattleState, seats: Vec<Seat>) -> Result<BattleSnapshot, AuthorityError> {
        let id = state.id();
        if self.battles.contains_key(&id) {
            return Err(AuthorityError::DuplicateBattle(id));
        }
        if state.phase() == BattlePhase::Preparing {
            return Err(BattleError::NotStarted.into());
        }
        state.check()?;
        self.next_id = self.next_id.max(id.as_u64().saturating_add(1));
        self.insert(state, seats)
    }

    fn insert(&mut self, mut state: BattleState, seats: Vec<Seat>) -> Result<BattleSnapshot, AuthorityError> {
        let id = state.id();
        if !seats.is_empty() {
            play_ai_turns(&mut state, &mut self.ai)?;
        }
        let snapshot = BattleSnapshot::of(&state);
        self.battles.insert(id, Session { state, seats });
        Ok(snapshot)
    }

    /// Removes a battle, returning its final state.
    ///
    /// # Errors
    ///
    /// Returns [`AuthorityError::UnknownBattle`] for an unregistered id.
    pub fn close(&mut self, id: BattleId) -> Result<BattleState, AuthorityError> {
        let session = self
            .battles
            .remove(&id)
            .ok_or(AuthorityError::UnknownBattle(id))?;
        info!(battle = %id, phase = ?session.state.phase(), "battle closed");
        Ok(session.state)
    }

    // =========================================================================
    // Player requests
    // =========================================================================

    /// Applies a player's decision for the awaited unit of their side.
    ///
    /// On success the AI then plays until the next human decision or the end
    /// of the battle.
    ///
    /// # Errors
    ///
    /// - [`AuthorityError::UnknownBattle`] / [`AuthorityError::UnknownToken`]
    /// - [`AuthorityError::NotYourTurn`] if a unit of another side is awaited
    /// - [`AuthorityError::Rejected`] for terminal battles and invalid actions
    pub fn submit_action(
        &mut self,
        battle: BattleId,
        token: &ActorToken,
        skill: SkillChoice,
        target: Option<CombatantId>,
    ) -> Result<BattleSnapshot, AuthorityError> {
        self.try_submit(battle, token, skill, target)
            .inspect_err(|err| warn!(%battle, %token, %err, "submission rejected"))
    }

    fn try_submit(
        &mut self,
        battle: BattleId,
        token: &ActorToken,
        skill: SkillChoice,
        target: Option<CombatantId>,
    ) -> Result<BattleSnapshot, AuthorityError> {
        let session = self
            .battles
            .get_mut(&battle)
            .ok_or(AuthorityError::UnknownBattle(battle))?;
        let side = session
            .side_of(token)
            .ok_or_else(|| AuthorityError::UnknownToken {
                battle,
                token: token.clone(),
            })?;

        let actor = match session.state.advance()? {
            Prompt::Finished(phase) => return Err(BattleError::TerminalStateViolation(phase).into()),
            Prompt::Awaiting { actor, .. } => actor,
        };
        if session.state.unit(actor).map(Combatant::side) != Some(side) {
            return Err(AuthorityError::NotYourTurn {
                token: token.clone(),
                awaiting: Some(actor),
            });
        }

        let action = Action { actor, skill, target };
        session.state.act(&action)?;
        debug!(%battle, %token, %actor, skill = ?action.skill, "submission applied");

        play_ai_turns(&mut session.state, &mut self.ai)?;
        Ok(BattleSnapshot::of(&session.state))
    }

    /// Ends a battle on behalf of the token's side, which loses.
    ///
    /// # Errors
    ///
    /// - [`AuthorityError::UnknownBattle`] / [`AuthorityError::UnknownToken`]
    /// - [`AuthorityError::Rejected`] if the battle already ended
    pub fn surrender(&mut self, battle: BattleId, token: &ActorToken) -> Result<BattleSnapshot, AuthorityError> {
        let session = self
            .battles
            .get_mut(&battle)
            .ok_or(AuthorityError::UnknownBattle(battle))?;
        let side = session
            .side_of(token)
            .ok_or_else(|| AuthorityError::UnknownToken {
                battle,
                token: token.clone(),
            })?;
        let result = match side {
            Side::Allies => session.state.surrender(),
            Side::Enemies => session.state.concede_enemies(),
        };
        result.inspect_err(|err| warn!(%battle, %token, %err, "surrender rejected"))?;
        Ok(BattleSnapshot::of(&session.state))
    }

    // =========================================================================
    // Auto battles
    // =========================================================================

    /// Plays one turn of every unfinished auto battle, in parallel.
    ///
    /// Returns the outcome per battle, ordered by id.
    pub fn tick_auto(&mut self) -> Vec<(BattleId, Result<StepOutcome, BattleError>)> {
        let ai = &self.ai;
        let mut outcomes: Vec<_> = self
            .battles
            .par_iter_mut()
            .filter(|(_, session)| session.is_auto() && !session.state.is_over())
            .map(|(id, session)| {
                let mut ai = ai.clone();
                (*id, session.state.step_all(&mut ai))
            })
            .collect();
        outcomes.sort_by_key(|(id, _)| *id);
        outcomes
    }

    /// Ticks auto battles until every one of them is over.
    ///
    /// # Errors
    ///
    /// Returns the first engine error hit by any battle.
    pub fn run_auto(&mut self) -> Result<(), AuthorityError> {
        loop {
            let outcomes = self.tick_auto();
            if outcomes.is_empty() {
                return Ok(());
            }
            for (_, outcome) in outcomes {
                outcome?;
            }
        }
    }
}

/// Plays AI-driven turns until a human must decide or the battle ends.
fn play_ai_turns(state: &mut BattleState, ai: &mut AiPolicy) -> Result<(), BattleError> {
    while let StepOutcome::Acted(_) = state.step(ai)? {}
    Ok(())
}

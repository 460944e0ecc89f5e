//! Test helpers for setting up units, battles and scripted input.

use std::collections::VecDeque;

use xianzhan_content::{ContentCatalog, EncounterDef, RewardBundle, RosterEntry, SkillDef};

use crate::ai::{Action, AiPolicy, Controller};
use crate::battle::{setup_encounter, BattleId, BattleState, ControlMode, StepOutcome};
use crate::combatant::{CombatStats, Combatant, CombatantId, Side};
use crate::config::BattleConfig;

// =============================================================================
// Units and battles
// =============================================================================

/// A unit with zero defense and no crits.
pub fn unit(id: u32, side: Side, hp: u32, attack: u32, speed: u32) -> Combatant {
    unit_with_skills(id, side, hp, attack, speed, Vec::new())
}

/// Like [`unit`], with skills in slot order.
pub fn unit_with_skills(
    id: u32,
    side: Side,
    hp: u32,
    attack: u32,
    speed: u32,
    skills: Vec<SkillDef>,
) -> Combatant {
    skills
        .into_iter()
        .fold(
            Combatant::builder(CombatantId::new(id), "unit", side).stats(CombatStats {
                max_hp: hp,
                max_mp: 50,
                attack,
                defense: 0,
                speed,
                crit_rate: 0.0,
                crit_damage: 1.5,
            }),
            |builder, skill| builder.skill(skill),
        )
        .build()
}

/// A started battle between two hand-built rosters, without random variance.
pub fn started(allies: Vec<Combatant>, enemies: Vec<Combatant>, reward: RewardBundle) -> BattleState {
    let mut battle = BattleState::new(
        BattleId::new(1),
        allies,
        enemies,
        reward,
        BattleConfig::without_variance(),
        1,
    );
    battle.start().expect("rosters are not empty");
    battle
}

/// The three-on-three encounter used by the determinism tests.
pub fn sect_skirmish() -> EncounterDef {
    EncounterDef::new(
        vec![
            RosterEntry::new("sword_disciple", 0),
            RosterEntry::new("herb_maiden", 0),
            RosterEntry::new("tide_monk", 0),
        ],
        vec![
            RosterEntry::new("flame_cultist", 0),
            RosterEntry::new("stone_golem", 1),
            RosterEntry::new("venom_serpent", 1),
        ],
    )
    .with_reward(RewardBundle {
        spirit_stones: 120,
        experience: 300,
        drops: Vec::new(),
    })
}

/// Sets up an auto battle from builtin content.
pub fn builtin_battle(encounter: &EncounterDef, seed: u64) -> BattleState {
    setup_encounter(
        BattleId::new(seed),
        &ContentCatalog::builtin(),
        encounter,
        BattleConfig::default(),
        seed,
        ControlMode::Auto,
    )
    .expect("builtin encounter is valid")
}

/// Steps a battle to the end, returning the hash after every step.
pub fn run_hashed(battle: &mut BattleState) -> Vec<u64> {
    let mut ai = AiPolicy::standard();
    let mut hashes = Vec::new();
    loop {
        let outcome = battle.step_all(&mut ai).expect("auto battle never errors");
        hashes.push(crate::hash::hash_battle(battle));
        if let StepOutcome::Finished(_) = outcome {
            return hashes;
        }
    }
}

// =============================================================================
// Controllers
// =============================================================================

/// Plays queued actions first, then defers to the standard AI.
#[derive(Debug, Default)]
pub struct Scripted {
    queue: VecDeque<Action>,
    ai: AiPolicy,
}

impl Scripted {
    /// A controller that will play `actions` in order.
    pub fn new(actions: Vec<Action>) -> Self {
        Self {
            queue: actions.into(),
            ai: AiPolicy::standard(),
        }
    }

    /// Actions not played yet.
    pub fn pending(&self) -> usize {
        self.queue.len()
    }
}

impl Controller for Scripted {
    fn decide(&mut self, state: &BattleState, actor: CombatantId) -> Action {
        if self.queue.front().is_some_and(|next| next.actor == actor) {
            return self.queue.pop_front().unwrap();
        }
        self.ai.decide(state, actor)
    }
}

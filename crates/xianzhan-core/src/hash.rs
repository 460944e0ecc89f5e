//! State hashing for determinism verification.
//!
//! Two battles built from the same content, config and seed, and fed the same
//! actions, must produce identical hashes after every step. Replays and the
//! authority use this to detect divergence.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use crate::battle::BattleState;
use crate::combatant::Combatant;

/// Compute a deterministic hash of battle state.
///
/// This hash includes:
/// - Battle id, phase and round
/// - Every unit's vitals, cooldowns and statuses
/// - The turn order and awaited actor
/// - The random stream position
/// - The log length
#[must_use]
pub fn hash_battle(state: &BattleState) -> u64 {
    let mut hasher = DefaultHasher::new();

    state.id().hash(&mut hasher);
    state.phase().hash(&mut hasher);
    state.round().hash(&mut hasher);

    state.units().len().hash(&mut hasher);
    for unit in state.units() {
        hash_unit(unit, &mut hasher);
    }

    state.turn_order().order().hash(&mut hasher);
    state.turn_order().remaining().len().hash(&mut hasher);
    state.current_actor().hash(&mut hasher);

    state.rng().seed().hash(&mut hasher);
    state.rng().position().hash(&mut hasher);

    state.log().len().hash(&mut hasher);
    state.granted_reward().is_some().hash(&mut hasher);

    hasher.finish()
}

fn hash_unit<H: Hasher>(unit: &Combatant, hasher: &mut H) {
    unit.id().hash(hasher);
    unit.side().hash(hasher);
    unit.hp().hash(hasher);
    unit.mp().hash(hasher);
    unit.is_alive().hash(hasher);
    unit.action_gauge().hash(hasher);

    for slot in unit.skills() {
        slot.id().hash(hasher);
        slot.cooldown.hash(hasher);
    }

    // Buffs then debuffs, in application order
    for status in unit.statuses() {
        status.kind.hash(hasher);
        status.remaining.hash(hasher);
        // Floats as bits for deterministic hashing
        status.magnitude.to_bits().hash(hasher);
        status.source.hash(hasher);
    }

    unit.damage_dealt().hash(hasher);
    unit.healing_done().hash(hasher);
}

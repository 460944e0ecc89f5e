//! Turn order.
//!
//! Living units act in descending initiative (effective speed plus action
//! gauge). Ties keep roster order, allies before enemies, so two servers
//! replaying the same battle agree on who moves first. Randomness never
//! breaks a tie.
//!
//! # Example
//!
//! ```
//! use xianzhan_core::combatant::{Combatant, CombatantId, CombatStats, Side};
//! use xianzhan_core::scheduler::initiative_order;
//!
//! let fast = CombatStats { speed: 20, ..CombatStats::default() };
//! let units = vec![
//!     Combatant::builder(CombatantId::new(1), "slow", Side::Allies).build(),
//!     Combatant::builder(CombatantId::new(2), "fast", Side::Enemies).stats(fast).build(),
//! ];
//!
//! assert_eq!(initiative_order(&units), vec![CombatantId::new(2), CombatantId::new(1)]);
//! ```

use serde::{Deserialize, Serialize};
use std::cmp::Reverse;

use crate::combatant::{Combatant, CombatantId};

/// Ranks living units by initiative, fastest first, ties in roster order.
#[must_use]
pub fn initiative_order(units: &[Combatant]) -> Vec<CombatantId> {
    let mut ranked: Vec<_> = units.iter().filter(|u| u.is_alive()).collect();
    // Stable sort: equal initiative keeps the roster order of `units`.
    ranked.sort_by_key(|u| Reverse(u.initiative()));
    ranked.into_iter().map(Combatant::id).collect()
}

/// The order of one round and how far through it the battle is.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnOrder {
    order: Vec<CombatantId>,
    next: usize,
}

impl TurnOrder {
    /// Computes a fresh round order.
    #[must_use]
    pub fn new(units: &[Combatant]) -> Self {
        Self {
            order: initiative_order(units),
            next: 0,
        }
    }

    /// Hands out the next actor, or `None` when the round is over.
    pub fn next_actor(&mut self) -> Option<CombatantId> {
        let actor = self.order.get(self.next).copied()?;
        self.next += 1;
        Some(actor)
    }

    /// Drops dead units and re-ranks the units that have not acted yet.
    ///
    /// Units that already acted this round keep their place at the front.
    pub fn reschedule_after_death(&mut self, units: &[Combatant]) {
        let alive = |id: &CombatantId| units.iter().any(|u| u.id() == *id && u.is_alive());
        let acted: Vec<_> = self.order[..self.next].iter().copied().filter(alive).collect();
        let pending: Vec<_> = self.order[self.next..].iter().copied().filter(alive).collect();
        let reranked = initiative_order(units)
            .into_iter()
            .filter(|id| pending.contains(id));

        self.next = acted.len();
        self.order = acted;
        self.order.extend(reranked);
    }

    /// Returns `true` once every unit in the order has been handed out.
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.next >= self.order.len()
    }

    /// The full order of the round.
    #[must_use]
    pub fn order(&self) -> &[CombatantId] {
        &self.order
    }

    /// Units that have not been handed out yet.
    #[must_use]
    pub fn remaining(&self) -> &[CombatantId] {
        &self.order[self.next.min(self.order.len())..]
    }

    /// Checks a restored order against the units it schedules.
    ///
    /// # Errors
    ///
    /// Returns a description of the first problem: a cursor past the end, an
    /// unknown or repeated id, or a dead unit still waiting for its turn.
    pub fn check(&self, units: &[Combatant]) -> Result<(), String> {
        if self.next > self.order.len() {
            return Err(format!("turn cursor {} past the end of {}", self.next, self.order.len()));
        }
        for (i, id) in self.order.iter().enumerate() {
            if self.order[..i].contains(id) {
                return Err(format!("{id} scheduled twice"));
            }
            let Some(unit) = units.iter().find(|u| u.id() == *id) else {
                return Err(format!("{id} scheduled but not in the battle"));
            };
            if i >= self.next && !unit.is_alive() {
                return Err(format!("{id} scheduled while dead"));
            }
        }
        Ok(())
    }

    /// Returns `true` if `id` is anywhere in this round's order.
    #[must_use]
    pub fn contains(&self, id: CombatantId) -> bool {
        self.order.contains(&id)
    }
}

//! # Xianzhan Core
//!
//! Deterministic turn-based combat engine for Xianzhan.
//!
//! A battle pits a roster of allies against a roster of enemies. Units act in
//! initiative order each round, casting techniques whose damage is shaped by
//! the five-element cycle, critical strikes and status effects. Given the same
//! content, config, seed and actions, a battle always plays out the same way.
//!
//! ## Architecture
//!
//! - **Combatants**: units with vitals, skill slots and status effects
//! - **Factory**: builds combatants from content templates
//! - **Scheduler**: per-round initiative ordering
//! - **Resolver**: targeting, damage and healing rolls, secondary effects
//! - **Status**: pre-turn ticks, crowd control and decay
//! - **AI**: an ordered decision table behind the [`Controller`] trait
//! - **Battle**: the phase machine tying the above together
//!
//! Every random draw goes through [`rng::Dice`]; the battle owns a single
//! seeded [`BattleRng`] stream.
//!
//! ## Quick Start
//!
//! ```
//! use xianzhan_content::{ContentCatalog, EncounterDef, RosterEntry};
//! use xianzhan_core::{setup_encounter, AiPolicy, BattleConfig, BattleId, ControlMode};
//!
//! let catalog = ContentCatalog::builtin();
//! let encounter = EncounterDef::new(
//!     vec![RosterEntry::new("sword_disciple", 0), RosterEntry::new("herb_maiden", 0)],
//!     vec![RosterEntry::new("stone_golem", 0), RosterEntry::new("fox_spirit", 0)],
//! );
//! let mut battle = setup_encounter(
//!     BattleId::new(1),
//!     &catalog,
//!     &encounter,
//!     BattleConfig::default(),
//!     2024,
//!     ControlMode::Auto,
//! )
//! .unwrap();
//!
//! let phase = battle.run(&mut AiPolicy::standard()).unwrap();
//! assert!(phase.is_terminal());
//! assert!(!battle.log().is_empty());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod ai;
pub mod battle;
pub mod combatant;
pub mod config;
pub mod error;
pub mod factory;
pub mod hash;
pub mod log;
pub mod resolver;
pub mod rng;
pub mod scheduler;
pub mod status;

#[cfg(test)]
mod tests;

// Re-exports for convenience
pub use ai::{Action, AiPolicy, Controller, SkillChoice};
pub use battle::{setup_encounter, BattleId, BattlePhase, BattleState, ControlMode, Prompt, StepOutcome};
pub use combatant::{CombatStats, Combatant, CombatantId, Side, SkillSlot, StatusEffect};
pub use config::{BattleConfig, DamageTuning, StatGrowth, TimeoutRule};
pub use error::{BattleError, InvalidActionReason};
pub use factory::CombatantFactory;
pub use hash::hash_battle;
pub use log::{BattleEvent, BattleLog, LogEntry};
pub use resolver::CastReport;
pub use rng::{BattleRng, Dice};
pub use scheduler::TurnOrder;

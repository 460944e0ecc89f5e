//! # Xianzhan Authority
//!
//! Server-side owner of live battles.
//!
//! The authority is the only writer of battle state. Players are identified
//! by opaque tokens seated on one side of a battle; every submission is
//! checked against the seat, the turn and the engine's own validation before
//! anything changes. Auto battles are advanced in parallel.
//!
//! ## Quick Start
//!
//! ```
//! use xianzhan_authority::{ActorToken, BattleAuthority};
//! use xianzhan_content::{ContentCatalog, EncounterDef, RosterEntry};
//! use xianzhan_core::{BattleConfig, CombatantId, SkillChoice};
//!
//! let mut authority = BattleAuthority::new(ContentCatalog::builtin(), BattleConfig::default());
//! let alice = ActorToken::new("alice");
//! let encounter = EncounterDef::new(
//!     vec![RosterEntry::new("sword_disciple", 0)],
//!     vec![RosterEntry::new("training_dummy", 0)],
//! );
//!
//! let snapshot = authority.open_skirmish(&encounter, alice.clone(), 42).unwrap();
//! let snapshot = authority
//!     .submit_action(snapshot.battle, &alice, SkillChoice::Basic, Some(CombatantId::new(2)))
//!     .unwrap();
//! assert!(snapshot.round >= 1);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod authority;
pub mod error;

// Re-exports for convenience
pub use authority::{ActorToken, BattleAuthority, BattleSnapshot, Seat};
pub use error::AuthorityError;

//! # Xianzhan Content
//!
//! Read-only content for the Xianzhan combat engine.
//!
//! This crate holds everything the engine consumes but never mutates:
//!
//! - **Elements**: the five-element cycle and its advantage matrix
//! - **Skills**: technique definitions with their secondary effects
//! - **Status kinds**: the closed set of buffs, debuffs and crowd control
//! - **Templates**: blueprints combatants are built from
//! - **Encounters**: rosters and reward bundles from the encounter generator
//!
//! ## Quick Start
//!
//! ```
//! use xianzhan_content::{ContentCatalog, TemplateId};
//!
//! let catalog = ContentCatalog::builtin();
//! let golem = catalog.template(&TemplateId::new("stone_golem")).unwrap();
//! assert_eq!(golem.skills.len(), 2);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

mod builtin;
pub mod catalog;
pub mod element;
pub mod encounter;
pub mod error;
pub mod skill;
pub mod status;
pub mod template;

// Re-exports for convenience
pub use catalog::ContentCatalog;
pub use element::{Element, ElementMatrix, Relation};
pub use encounter::{EncounterDef, ItemDrop, RewardBundle, RosterEntry};
pub use error::ContentError;
pub use skill::{
    EffectKind, EffectSpec, PrimaryEffect, SkillCategory, SkillDef, SkillId, TargetMode,
    DEFAULT_STATUS_DURATION,
};
pub use status::{CrowdControl, Polarity, Stat, StatusKind};
pub use template::{CombatantTemplate, TemplateId};

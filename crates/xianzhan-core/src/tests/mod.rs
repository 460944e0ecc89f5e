//! Battle-level tests.
//!
//! - `determinism.rs`: same seed and inputs give identical battles
//! - `integration.rs`: end-to-end battles through the public operations
//! - `properties.rs`: invariants checked over random seeds and rosters
//! - `helpers.rs`: unit builders and scripted controllers

mod determinism;
mod helpers;

// Re-export for convenience
pub use helpers::*;
